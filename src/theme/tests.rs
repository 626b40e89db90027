//! Tests for the theme engine

use super::*;
use crate::models::UserRole;
use std::fs;
use tempfile::TempDir;
use tera::Context as TeraContext;

const PAGES: &[&str] = &[
    "base.html",
    "home.html",
    "courses.html",
    "blog.html",
    "post.html",
    "contact.html",
    "login.html",
    "register.html",
    "directory.html",
    "not_found.html",
];

fn vars(path: &str) -> StandardTemplateVars {
    StandardTemplateVars::new(&SiteConfig::default(), path)
}

fn member() -> CurrentUser {
    CurrentUser {
        id: "u1".to_string(),
        email: Some("ana@eepd.edu.br".to_string()),
        full_name: Some("Ana".to_string()),
        role: Some(UserRole::Teacher),
    }
}

#[test]
fn test_embedded_templates_load() {
    let engine = ThemeEngine::new(None).unwrap();

    for page in PAGES {
        assert!(engine.has_template(page), "missing template {}", page);
    }
}

#[test]
fn test_missing_override_dir_is_an_error() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope");

    let err = ThemeEngine::new(Some(&missing)).err().expect("error");
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_override_replaces_embedded_template() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("not_found.html"),
        "<p>Sumiu: {{ request_path }}</p>",
    )
    .unwrap();

    let engine = ThemeEngine::new(Some(temp_dir.path())).unwrap();
    let html = engine
        .render_with_standard_vars("not_found.html", &TeraContext::new(), &vars("/x"))
        .unwrap();

    assert_eq!(html, "<p>Sumiu: /x</p>");
}

#[test]
fn test_override_can_add_nested_templates() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("partials")).unwrap();
    fs::write(temp_dir.path().join("partials/extra.html"), "extra").unwrap();

    let engine = ThemeEngine::new(Some(temp_dir.path())).unwrap();

    assert!(engine.has_template("partials/extra.html"));
    assert!(engine.template_names().contains(&"home.html"));
}

#[test]
fn test_broken_override_fails_to_load() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("broken.html"), "{% if %}").unwrap();

    assert!(ThemeEngine::new(Some(temp_dir.path())).is_err());
}

#[test]
fn test_render_or_error_page_on_missing_template() {
    let engine = ThemeEngine::new(None).unwrap();

    let html = engine.render_or_error_page("nope.html", &TeraContext::new(), &vars("/"));

    assert!(html.contains("Não foi possível exibir esta página"));
}

#[test]
fn test_html_is_escaped() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("echo.html"), "{{ value }}").unwrap();
    let engine = ThemeEngine::new(Some(temp_dir.path())).unwrap();

    let mut context = TeraContext::new();
    context.insert("value", "<script>x</script>");
    let html = engine.render("echo.html", &context).unwrap();

    assert!(!html.contains("<script>"));
}

#[test]
fn test_date_br_filter() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("date.html"), "{{ when | date_br }}").unwrap();
    let engine = ThemeEngine::new(Some(temp_dir.path())).unwrap();

    let mut context = TeraContext::new();
    context.insert("when", "2024-03-05T10:00:00Z");
    assert_eq!(engine.render("date.html", &context).unwrap(), "05 de março de 2024");

    context.insert("when", "2023-12-25");
    assert_eq!(engine.render("date.html", &context).unwrap(), "25 de dezembro de 2023");

    context.insert("when", "ontem");
    assert!(engine.render("date.html", &context).is_err());
}

#[test]
fn test_format_date_br() {
    let date = NaiveDate::from_ymd_opt(2024, 1, 9).unwrap();
    assert_eq!(format_date_br(date), "09 de janeiro de 2024");
}

#[test]
fn test_nav_links_anonymous() {
    let nav = nav_links("/cursos", false);

    let labels: Vec<_> = nav.iter().map(|l| l.label).collect();
    assert_eq!(labels, vec!["Início", "Cursos", "Notícias", "Contato"]);
    let active: Vec<_> = nav.iter().filter(|l| l.active).map(|l| l.href).collect();
    assert_eq!(active, vec!["/cursos"]);
}

#[test]
fn test_nav_links_member_and_nested_path() {
    let nav = nav_links("/blog/abc", true);

    assert_eq!(nav.len(), 6);
    assert!(nav.iter().any(|l| l.href == "/alunos"));
    let active: Vec<_> = nav.iter().filter(|l| l.active).map(|l| l.href).collect();
    assert_eq!(active, vec!["/blog"]);
}

#[test]
fn test_home_is_only_active_on_root() {
    assert!(nav_links("/", false)[0].active);
    assert!(!nav_links("/contato", false)[0].active);
    assert!(!nav_links("/blogger", false).iter().any(|l| l.active));
}

#[test]
fn test_header_reflects_viewer() {
    let engine = ThemeEngine::new(None).unwrap();

    let anonymous = engine
        .render_with_standard_vars("not_found.html", &TeraContext::new(), &vars("/x"))
        .unwrap();
    assert!(anonymous.contains("Entrar"));
    assert!(!anonymous.contains("Sair"));

    let signed_in = engine
        .render_with_standard_vars(
            "not_found.html",
            &TeraContext::new(),
            &vars("/x").with_user(Some(member())),
        )
        .unwrap();
    assert!(signed_in.contains("Sair"));
    assert!(signed_in.contains("/professores"));
    assert!(signed_in.contains("/alunos"));
}

#[test]
fn test_toast_and_footer_year() {
    let engine = ThemeEngine::new(None).unwrap();
    let standard = vars("/").with_toast(Some(Toast::error("Falha ao carregar cursos.")));

    let html = engine
        .render_with_standard_vars("not_found.html", &TeraContext::new(), &standard)
        .unwrap();

    assert!(html.contains("Falha ao carregar cursos."));
    assert!(html.contains("toast-destructive"));
    assert!(html.contains(&format!("{} EEPD-BH", standard.year)));
}
