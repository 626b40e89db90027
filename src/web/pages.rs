//! Server-rendered pages
//!
//! Every listing follows the same shape: fetch, then render the items or the
//! empty state. A failed fetch is logged, shown as a destructive toast and
//! rendered as the empty state.

use axum::{
    extract::{FromRequestParts, Path, Query, State},
    http::{header, request::Parts, HeaderMap, HeaderValue, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use tera::Context as TeraContext;

use super::flash::{clear_flash_cookie, redirect_with, Flash};
use crate::api::middleware::{
    clear_session_cookies, extract_session_token, session_cookies, AppState, SessionToken, Viewer,
};
use crate::models::{BlogPostWithAuthor, Course, CurrentUser, Profile};
use crate::services::{ContactForm, FieldErrors, LoginForm, RegisterForm, ServiceError, PAGE_SIZE};
use crate::theme::{StandardTemplateVars, Toast};

/// Per-request inputs shared by every page
#[derive(Debug, Clone)]
pub struct PageContext {
    pub viewer: Option<CurrentUser>,
    pub flash: Option<Toast>,
    pub path: String,
}

impl<S> FromRequestParts<S> for PageContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Viewer(viewer) = Viewer::from_request_parts(parts, state).await?;
        let Flash(flash) = Flash::from_request_parts(parts, state).await?;
        Ok(Self {
            viewer,
            flash,
            path: parts.uri.path().to_string(),
        })
    }
}

impl PageContext {
    fn render(self, state: &AppState, template: &str, context: &TeraContext) -> Response {
        self.render_with(state, template, context, StatusCode::OK, None)
    }

    /// Render with a status and a toast; an explicit toast wins over the flash
    fn render_with(
        self,
        state: &AppState,
        template: &str,
        context: &TeraContext,
        status: StatusCode,
        toast: Option<Toast>,
    ) -> Response {
        let shown_flash = self.flash.is_some();
        let vars = StandardTemplateVars::new(&state.config.site, self.path)
            .with_user(self.viewer)
            .with_toast(toast.or(self.flash));

        let html = state
            .theme_engine
            .render_or_error_page(template, context, &vars);
        let mut response = (status, Html(html)).into_response();

        if shown_flash {
            if let Ok(value) = HeaderValue::from_str(&clear_flash_cookie()) {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
        }
        response
    }
}

/// Course card as shown on /cursos
#[derive(Debug, Serialize)]
struct CourseCard {
    id: String,
    name: String,
    description: Option<String>,
    workload: Option<String>,
    curriculum: Vec<String>,
    image: String,
}

impl From<Course> for CourseCard {
    fn from(course: Course) -> Self {
        Self {
            image: course.card_image().to_string(),
            curriculum: course.curriculum_items(),
            id: course.id,
            name: course.name,
            description: course.description,
            workload: course.workload,
        }
    }
}

/// Post card as shown on /blog and the post page
#[derive(Debug, Serialize)]
struct PostCard {
    id: String,
    title: String,
    excerpt: Option<String>,
    image_url: Option<String>,
    created_at: DateTime<Utc>,
    author_name: Option<String>,
}

impl From<BlogPostWithAuthor> for PostCard {
    fn from(row: BlogPostWithAuthor) -> Self {
        let author_name = row.author_name().map(String::from);
        Self {
            id: row.post.id,
            title: row.post.title,
            excerpt: row.post.excerpt,
            image_url: row.post.image_url,
            created_at: row.post.created_at,
            author_name,
        }
    }
}

/// Directory entry
#[derive(Debug, Serialize)]
struct Person {
    name: String,
    email: Option<String>,
    phone: Option<String>,
}

impl From<Profile> for Person {
    fn from(profile: Profile) -> Self {
        Self {
            name: profile.display_name().to_string(),
            email: profile.email,
            phone: profile.phone,
        }
    }
}

/// Fetch result for a listing: items, or empty plus a failure toast
fn listing<T, U: From<T>>(
    result: Result<Vec<T>, ServiceError>,
    failure: &str,
) -> (Vec<U>, Option<Toast>) {
    match result {
        Ok(items) => (items.into_iter().map(U::from).collect(), None),
        Err(e) => {
            tracing::warn!("{} {}", failure, e);
            (Vec::new(), Some(Toast::error(failure)))
        }
    }
}

fn form_context<F: Serialize>(form: &F, errors: &FieldErrors) -> TeraContext {
    let mut context = TeraContext::new();
    context.insert("form", form);
    context.insert("errors", errors);
    context
}

/// GET /
pub async fn home(State(state): State<AppState>, page: PageContext) -> Response {
    let slides = state.carousel_service.slides().await;

    let mut context = TeraContext::new();
    context.insert("slides", &slides);
    page.render(&state, "home.html", &context)
}

/// GET /cursos
pub async fn courses(State(state): State<AppState>, page: PageContext) -> Response {
    let (courses, toast): (Vec<CourseCard>, _) = listing(
        state.course_service.get_all_courses().await,
        "Falha ao carregar cursos.",
    );

    let mut context = TeraContext::new();
    context.insert("courses", &courses);
    page.render_with(&state, "courses.html", &context, StatusCode::OK, toast)
}

#[derive(Debug, Deserialize)]
pub struct BlogQuery {
    /// Kept as text so a malformed value falls back to the first page
    #[serde(default)]
    page: Option<String>,
}

/// GET /blog
pub async fn blog(
    State(state): State<AppState>,
    Query(query): Query<BlogQuery>,
    page: PageContext,
) -> Response {
    let number = query
        .page
        .as_deref()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .filter(|p| *p >= 1)
        .unwrap_or(1);

    let (posts, toast): (Vec<PostCard>, _) = listing(
        state.blog_service.get_page(number).await,
        "Falha ao carregar notícias.",
    );

    let mut context = TeraContext::new();
    context.insert("prev_page", &(number > 1).then(|| number - 1));
    context.insert(
        "next_page",
        &(posts.len() as i64 == PAGE_SIZE).then(|| number + 1),
    );
    context.insert("posts", &posts);
    page.render_with(&state, "blog.html", &context, StatusCode::OK, toast)
}

/// GET /blog/{id}
pub async fn post(
    State(state): State<AppState>,
    Path(id): Path<String>,
    page: PageContext,
) -> Response {
    match state.blog_service.get_published_post(&id).await {
        Ok(Some(row)) => {
            let content_html = state.markdown.render(&row.post.content);
            let mut context = TeraContext::new();
            context.insert("post", &PostCard::from(row));
            context.insert("content_html", &content_html);
            page.render(&state, "post.html", &context)
        }
        Ok(None) => render_not_found(&state, page),
        Err(e) => {
            tracing::warn!(post_id = %id, "Failed to load post: {}", e);
            page.render_with(
                &state,
                "not_found.html",
                &TeraContext::new(),
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(Toast::error("Falha ao carregar notícias.")),
            )
        }
    }
}

/// GET /contato
pub async fn contact(State(state): State<AppState>, page: PageContext) -> Response {
    let context = form_context(&ContactForm::default(), &FieldErrors::default());
    page.render(&state, "contact.html", &context)
}

/// POST /contato
pub async fn submit_contact(
    State(state): State<AppState>,
    page: PageContext,
    Form(form): Form<ContactForm>,
) -> Response {
    let message = match form.validate() {
        Ok(message) => message,
        Err(errors) => {
            let context = form_context(&form, &errors);
            return page.render_with(
                &state,
                "contact.html",
                &context,
                StatusCode::UNPROCESSABLE_ENTITY,
                None,
            );
        }
    };

    match state.contact_service.create_contact_message(message).await {
        Ok(_) => redirect_with(
            "/contato",
            Toast::success(
                "Mensagem enviada!",
                "Obrigado pelo contato. Responderemos em breve.",
            ),
            &[],
        ),
        Err(e) => {
            tracing::warn!("Failed to store contact message: {}", e);
            let context = form_context(&form, &FieldErrors::default());
            page.render_with(
                &state,
                "contact.html",
                &context,
                StatusCode::INTERNAL_SERVER_ERROR,
                Some(Toast::error("Falha ao enviar mensagem. Tente novamente.")),
            )
        }
    }
}

/// GET /login
pub async fn login(State(state): State<AppState>, page: PageContext) -> Response {
    let context = form_context(&LoginForm::default(), &FieldErrors::default());
    page.render(&state, "login.html", &context)
}

/// POST /login
pub async fn submit_login(
    State(state): State<AppState>,
    page: PageContext,
    Form(form): Form<LoginForm>,
) -> Response {
    let credentials = match form.validate() {
        Ok(credentials) => credentials,
        Err(errors) => {
            let context = form_context(&form, &errors);
            return page.render_with(
                &state,
                "login.html",
                &context,
                StatusCode::UNPROCESSABLE_ENTITY,
                None,
            );
        }
    };

    match state.auth_service.sign_in(&credentials).await {
        Ok(session) => redirect_with(
            "/",
            Toast::success("Login realizado!", "Bem-vindo de volta."),
            &session_cookies(&session, &state.config),
        ),
        Err(e) => {
            let status = match e {
                ServiceError::AuthenticationError(_) => StatusCode::UNAUTHORIZED,
                _ => {
                    tracing::warn!("Sign-in failed: {}", e);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            let context = form_context(&form, &FieldErrors::default());
            page.render_with(
                &state,
                "login.html",
                &context,
                status,
                Some(Toast::error("Email ou senha incorretos.")),
            )
        }
    }
}

/// GET /cadastro
pub async fn register(State(state): State<AppState>, page: PageContext) -> Response {
    let context = form_context(&RegisterForm::default(), &FieldErrors::default());
    page.render(&state, "register.html", &context)
}

/// POST /cadastro
pub async fn submit_register(
    State(state): State<AppState>,
    page: PageContext,
    Form(form): Form<RegisterForm>,
) -> Response {
    let registration = match form.validate() {
        Ok(registration) => registration,
        Err(errors) => {
            let context = form_context(&form, &errors);
            return page.render_with(
                &state,
                "register.html",
                &context,
                StatusCode::UNPROCESSABLE_ENTITY,
                None,
            );
        }
    };

    match state.auth_service.sign_up(&registration).await {
        Ok(_) => redirect_with(
            "/login",
            Toast::success("Cadastro realizado!", "Entre com seu email e senha."),
            &[],
        ),
        Err(e) => {
            tracing::warn!("Registration failed: {}", e);
            let status = match e {
                ServiceError::Conflict(_) => StatusCode::CONFLICT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            let context = form_context(&form, &FieldErrors::default());
            page.render_with(
                &state,
                "register.html",
                &context,
                status,
                Some(Toast::error("Falha ao criar conta. Tente novamente.")),
            )
        }
    }
}

/// POST /sair
///
/// Signs out the renewed token when the session was just refreshed, else
/// whatever token the request carried.
pub async fn sign_out(
    State(state): State<AppState>,
    session: Option<SessionToken>,
    headers: HeaderMap,
) -> Response {
    let token = session
        .map(|SessionToken(token)| token)
        .or_else(|| extract_session_token(&headers));

    if let Some(token) = token {
        if let Err(e) = state.auth_service.sign_out(&token).await {
            tracing::warn!("Sign-out failed: {}", e);
            return redirect_with("/", Toast::error("Falha ao fazer logout."), &[]);
        }
    }

    redirect_with(
        "/",
        Toast::success("Logout realizado", "Você saiu da sua conta com sucesso."),
        &clear_session_cookies(),
    )
}

/// GET /professores
pub async fn teachers(State(state): State<AppState>, page: PageContext) -> Response {
    if let Some(redirect) = directory_guard(&state, &page) {
        return redirect;
    }

    let (people, toast): (Vec<Person>, _) = listing(
        state.profile_service.get_all_teachers().await,
        "Falha ao carregar professores.",
    );

    let mut context = TeraContext::new();
    context.insert("heading", "Professores");
    context.insert("subtitle", "Conheça nosso corpo docente qualificado e dedicado");
    context.insert("badge", "Professor");
    context.insert("empty_title", "Nenhum professor cadastrado");
    context.insert(
        "empty_text",
        "Os professores aparecerão aqui quando se cadastrarem no sistema.",
    );
    context.insert("people", &people);
    page.render_with(&state, "directory.html", &context, StatusCode::OK, toast)
}

/// GET /alunos
pub async fn students(State(state): State<AppState>, page: PageContext) -> Response {
    if let Some(redirect) = directory_guard(&state, &page) {
        return redirect;
    }

    let (people, toast): (Vec<Person>, _) = listing(
        state.profile_service.get_all_students().await,
        "Falha ao carregar alunos.",
    );

    let mut context = TeraContext::new();
    context.insert("heading", "Alunos");
    context.insert("subtitle", "Comunidade estudantil da EEPD-BH");
    context.insert("badge", "Aluno");
    context.insert("empty_title", "Nenhum aluno cadastrado");
    context.insert(
        "empty_text",
        "Os alunos aparecerão aqui quando se cadastrarem no sistema.",
    );
    context.insert("people", &people);
    page.render_with(&state, "directory.html", &context, StatusCode::OK, toast)
}

/// Anonymous visitors go to /login while the directories are members-only
fn directory_guard(state: &AppState, page: &PageContext) -> Option<Response> {
    if !state.config.site.directories_require_login || page.viewer.is_some() {
        return None;
    }
    Some(redirect_with(
        "/login",
        Toast {
            title: "Acesso restrito".to_string(),
            description: Some("Entre para ver esta página.".to_string()),
            destructive: false,
        },
        &[],
    ))
}

fn render_not_found(state: &AppState, page: PageContext) -> Response {
    page.render_with(
        state,
        "not_found.html",
        &TeraContext::new(),
        StatusCode::NOT_FOUND,
        None,
    )
}

/// Fallback for unknown paths
pub async fn not_found(State(state): State<AppState>, page: PageContext) -> Response {
    render_not_found(&state, page)
}
