use axum::http::{header, HeaderValue, StatusCode};
use axum_test::{TestResponse, TestServer};
use chrono::TimeZone;

use crate::api::test_support::{session, test_server, PASSWORD};
use crate::db::repositories::test_support::{seed_course, seed_member};
use crate::db::repositories::{BlogPostRepository, SqlxBlogPostRepository};
use crate::db::DynDatabasePool;
use crate::models::NewBlogPost;

fn set_cookies(response: &TestResponse) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .map(String::from)
        .collect()
}

/// `name=value` pair of a cookie set by the response
fn cookie_pair(response: &TestResponse, name: &str) -> Option<String> {
    let prefix = format!("{}=", name);
    set_cookies(response)
        .into_iter()
        .find(|c| c.starts_with(&prefix))
        .and_then(|c| c.split(';').next().map(String::from))
}

fn location(response: &TestResponse) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

async fn seed_post(pool: &DynDatabasePool, author: &str, title: &str, content: &str, published: bool) -> String {
    let repo = SqlxBlogPostRepository::new(pool.clone());
    let post = repo
        .create(&NewBlogPost {
            title: title.to_string(),
            content: content.to_string(),
            excerpt: Some(format!("Resumo de {}", title)),
            image_url: None,
            author_id: author.to_string(),
            published,
        })
        .await
        .unwrap()
        .unwrap();
    post.id
}

async fn set_post_date(pool: &DynDatabasePool, id: &str, year: i32, month: u32, day: u32) {
    let at = chrono::Utc.with_ymd_and_hms(year, month, day, 12, 0, 0).unwrap();
    sqlx::query("UPDATE blog_posts SET created_at = ? WHERE id = ?")
        .bind(at)
        .bind(id)
        .execute(pool.sqlite())
        .await
        .unwrap();
}

/// Register and sign in through the forms; returns the `session=...` pair
async fn sign_in_with_forms(server: &TestServer, email: &str, role: &str) -> String {
    let registered = server
        .post("/cadastro")
        .form(&[
            ("full_name", "Luiza Prado"),
            ("email", email),
            ("phone", ""),
            ("password", PASSWORD),
            ("role", role),
        ])
        .await;
    registered.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&registered), "/login");

    let signed_in = server
        .post("/login")
        .form(&[("email", email), ("password", PASSWORD)])
        .await;
    signed_in.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&signed_in), "/");
    cookie_pair(&signed_in, "session").expect("session cookie")
}

fn cookie_header(pair: &str) -> HeaderValue {
    HeaderValue::from_str(pair).unwrap()
}

#[tokio::test]
async fn test_home_for_anonymous_visitor() {
    let (server, _pool) = test_server().await;

    let response = server.get("/").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("Escola Estadual Presidente Dutra"));
    assert!(html.contains("Laboratório de Informática"));
    assert!(html.contains("href=\"/login\""));
    assert!(!html.contains("href=\"/professores\""));
}

#[tokio::test]
async fn test_courses_empty_state_and_cards() {
    let (server, pool) = test_server().await;

    let html = server.get("/cursos").await.text();
    assert!(html.contains("Nenhum curso cadastrado"));

    seed_course(&pool, "c2", "Logística", None).await;
    seed_course(&pool, "c1", "Informática", Some("Redes, , Lógica de Programação")).await;

    let html = server.get("/cursos").await.text();
    assert!(!html.contains("Nenhum curso cadastrado"));
    assert!(html.contains("<li>Redes</li>"));
    assert!(html.contains("<li>Lógica de Programação</li>"));
    assert_eq!(html.matches("<li>").count(), 2);
    let informatica = html.find("<h2>Informática</h2>").unwrap();
    let logistica = html.find("<h2>Logística</h2>").unwrap();
    assert!(informatica < logistica);
}

#[tokio::test]
async fn test_blog_listing_and_post_page() {
    let (server, pool) = test_server().await;

    assert!(server.get("/blog").await.text().contains("Nenhuma notícia publicada"));

    seed_member(&pool, "t1", None, "teacher").await;
    let older = seed_post(&pool, "t1", "Feira de Ciências", "Texto", true).await;
    let newer = seed_post(&pool, "t1", "Matrículas Abertas", "Inscreva-se <script>x</script>", true).await;
    let draft = seed_post(&pool, "t1", "Rascunho", "Ainda não", false).await;
    set_post_date(&pool, &older, 2024, 3, 5).await;
    set_post_date(&pool, &newer, 2024, 4, 1).await;

    let html = server.get("/blog").await.text();
    assert!(html.contains("05 de março de 2024"));
    assert!(html.contains("Autor desconhecido"));
    assert!(!html.contains("Rascunho"));
    assert!(html.find("Matrículas Abertas").unwrap() < html.find("Feira de Ciências").unwrap());

    let post = server.get(&format!("/blog/{}", newer)).await;
    post.assert_status_ok();
    let html = post.text();
    assert!(html.contains("01 de abril de 2024"));
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>x</script>"));

    server
        .get(&format!("/blog/{}", draft))
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server.get("/blog/nao-existe").await.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blog_malformed_page_falls_back() {
    let (server, pool) = test_server().await;
    seed_member(&pool, "t1", Some("Ana"), "teacher").await;
    seed_post(&pool, "t1", "Semana Cultural", "Texto", true).await;

    let response = server.get("/blog?page=abc").await;
    response.assert_status_ok();
    assert!(response.text().contains("Semana Cultural"));
    assert!(!server.get("/blog?page=2").await.text().contains("Semana Cultural"));
}

#[tokio::test]
async fn test_invalid_contact_never_reaches_store() {
    let (server, pool) = test_server().await;

    let response = server
        .post("/contato")
        .form(&[("name", "Jo"), ("email", "jo"), ("phone", ""), ("message", "oi")])
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let html = response.text();
    assert!(html.contains("Nome deve ter pelo menos 3 caracteres"));
    assert!(html.contains("Email inválido"));
    assert!(html.contains("Mensagem deve ter pelo menos 10 caracteres"));
    assert!(html.contains("value=\"Jo\""));

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM contact_messages")
        .fetch_one(pool.sqlite())
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_contact_success_toast_survives_redirect() {
    let (server, _pool) = test_server().await;

    let response = server
        .post("/contato")
        .form(&[
            ("name", "Joana"),
            ("email", "joana@example.com"),
            ("phone", ""),
            ("message", "Gostaria de saber sobre matrículas."),
        ])
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/contato");
    let flash = cookie_pair(&response, "flash").expect("flash cookie");

    let page = server
        .get("/contato")
        .add_header(header::COOKIE, cookie_header(&flash))
        .await;
    assert!(page.text().contains("Mensagem enviada!"));
    let cleared = cookie_pair(&page, "flash").expect("flash cleared");
    assert_eq!(cleared, "flash=");
}

#[tokio::test]
async fn test_header_follows_sign_in_and_sign_out() {
    let (server, _pool) = test_server().await;
    let pair = sign_in_with_forms(&server, "luiza@eepd.edu.br", "teacher").await;

    let html = server
        .get("/cursos")
        .add_header(header::COOKIE, cookie_header(&pair))
        .await
        .text();
    assert!(html.contains("action=\"/sair\""));
    assert!(html.contains("href=\"/professores\""));
    assert!(html.contains("href=\"/alunos\""));

    let signed_out = server
        .post("/sair")
        .add_header(header::COOKIE, cookie_header(&pair))
        .await;
    signed_out.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(cookie_pair(&signed_out, "session").as_deref(), Some("session="));

    let html = server
        .get("/cursos")
        .add_header(header::COOKIE, cookie_header(&pair))
        .await
        .text();
    assert!(html.contains("href=\"/login\""));
    assert!(!html.contains("action=\"/sair\""));
}

#[tokio::test]
async fn test_wrong_password_shows_toast() {
    let (server, _pool) = test_server().await;
    sign_in_with_forms(&server, "marcos@eepd.edu.br", "student").await;

    let response = server
        .post("/login")
        .form(&[("email", "marcos@eepd.edu.br"), ("password", "errada123")])
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
    let html = response.text();
    assert!(html.contains("Email ou senha incorretos."));
    assert!(html.contains("toast-destructive"));
    assert!(cookie_pair(&response, "session").is_none());
}

#[tokio::test]
async fn test_unknown_role_shows_generic_toast() {
    let (server, _pool) = test_server().await;

    let response = server
        .post("/cadastro")
        .form(&[
            ("full_name", "Pedro Alves"),
            ("email", "pedro@eepd.edu.br"),
            ("phone", ""),
            ("password", PASSWORD),
            ("role", "janitor"),
        ])
        .await;
    assert_ne!(response.status_code(), StatusCode::SEE_OTHER);
    assert!(response.text().contains("Falha ao criar conta. Tente novamente."));
}

#[tokio::test]
async fn test_admin_role_rejected_on_form() {
    let (server, _pool) = test_server().await;

    let response = server
        .post("/cadastro")
        .form(&[
            ("full_name", "Pedro Alves"),
            ("email", "pedro@eepd.edu.br"),
            ("password", PASSWORD),
            ("role", "admin"),
        ])
        .await;
    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    assert!(response.text().contains("Perfil inválido"));
}

#[tokio::test]
async fn test_directories_redirect_anonymous_visitors() {
    let (server, _pool) = test_server().await;

    for path in ["/professores", "/alunos"] {
        let response = server.get(path).await;
        response.assert_status(StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/login");
    }
}

#[tokio::test]
async fn test_directories_for_members() {
    let (server, pool) = test_server().await;
    let pair = sign_in_with_forms(&server, "rita@eepd.edu.br", "teacher").await;
    seed_member(&pool, "t2", None, "teacher").await;

    let html = server
        .get("/professores")
        .add_header(header::COOKIE, cookie_header(&pair))
        .await
        .text();
    assert!(html.contains("Luiza Prado"));
    assert!(html.contains("Nome não informado"));
    assert!(html.contains("Professor"));

    let html = server
        .get("/alunos")
        .add_header(header::COOKIE, cookie_header(&pair))
        .await
        .text();
    assert!(html.contains("Nenhum aluno cadastrado"));
}

#[tokio::test]
async fn test_stale_session_cookie_is_anonymous() {
    let (server, _pool) = test_server().await;
    let (name, value) = session("nao-existe");

    let html = server.get("/").add_header(name, value).await.text();
    assert!(html.contains("href=\"/login\""));
}

#[tokio::test]
async fn test_unknown_path_and_assets() {
    let (server, _pool) = test_server().await;

    let response = server.get("/nada-aqui").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert!(response.text().contains("Página não encontrada"));

    let css = server.get("/assets/site.css").await;
    css.assert_status_ok();
    assert_eq!(css.headers()[header::CONTENT_TYPE], "text/css; charset=utf-8");
    server
        .get("/assets/nada.css")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

/// Decoded toast carried by the response's flash cookie
fn flash_text(response: &TestResponse) -> String {
    let pair = cookie_pair(response, "flash").expect("flash cookie");
    let raw = pair.trim_start_matches("flash=");
    urlencoding::decode(raw).map(|s| s.into_owned()).unwrap_or_default()
}

#[tokio::test]
async fn test_sign_out_with_expired_hosted_token() {
    use axum::{http::StatusCode as MockStatus, routing::{get, post}, Json, Router};
    use serde_json::json;

    let mock = crate::hosted::mock::spawn(
        Router::new()
            .route(
                "/auth/v1/user",
                get(|| async { (MockStatus::UNAUTHORIZED, Json(json!({ "msg": "JWT expired" }))) }),
            )
            .route(
                "/auth/v1/logout",
                post(|| async { (MockStatus::UNAUTHORIZED, Json(json!({ "msg": "JWT expired" }))) }),
            ),
    )
    .await;
    let server = crate::api::test_support::hosted_test_server(mock.client.clone());

    let response = server
        .post("/sair")
        .add_header(header::COOKIE, cookie_header("session=STALE-JWT"))
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert_eq!(cookie_pair(&response, "session").as_deref(), Some("session="));
    assert_eq!(cookie_pair(&response, "refresh").as_deref(), Some("refresh="));
    assert!(flash_text(&response).contains("Logout realizado"));

    let logouts = mock.log.to_path("/auth/v1/logout");
    assert_eq!(logouts[0].authorization.as_deref(), Some("Bearer STALE-JWT"));
}

#[tokio::test]
async fn test_sign_out_outage_keeps_cookie() {
    use axum::{http::StatusCode as MockStatus, routing::{get, post}, Json, Router};
    use serde_json::json;

    let mock = crate::hosted::mock::spawn(
        Router::new()
            .route(
                "/auth/v1/user",
                get(|| async { (MockStatus::UNAUTHORIZED, Json(json!({ "msg": "JWT expired" }))) }),
            )
            .route("/auth/v1/logout", post(|| async { MockStatus::BAD_GATEWAY })),
    )
    .await;
    let server = crate::api::test_support::hosted_test_server(mock.client.clone());

    let response = server
        .post("/sair")
        .add_header(header::COOKIE, cookie_header("session=USER-JWT"))
        .await;
    response.assert_status(StatusCode::SEE_OTHER);
    assert!(cookie_pair(&response, "session").is_none());
    assert!(flash_text(&response).contains("Falha ao fazer logout."));
}
