//! Theme engine
//!
//! This module provides template rendering using Tera.
//! Features:
//! - Templates embedded in the binary, optionally overridden from a directory
//! - Standard template variables (site names, navigation, viewer, toast)
//! - `date_br` filter for pt-BR long dates
//! - Plain error page when a template fails to render

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use rust_embed::RustEmbed;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::error::Error as StdError;
use std::fs;
use std::path::{Path, PathBuf};
use tera::{Context as TeraContext, Tera, Value};

use crate::config::SiteConfig;
use crate::models::CurrentUser;

mod error;

pub use error::ThemeError;

/// Templates shipped with the binary
#[derive(RustEmbed)]
#[folder = "templates/"]
#[include = "*.html"]
struct EmbeddedTemplates;

/// Theme engine for rendering templates
pub struct ThemeEngine {
    /// Tera template engine instance
    tera: Tera,
    /// Directory whose templates replace the embedded ones
    override_path: Option<PathBuf>,
}

impl ThemeEngine {
    /// Create a new theme engine
    ///
    /// Embedded templates are always loaded; `override_path`, when given,
    /// must exist and its `.html` files replace embedded templates with the
    /// same relative name.
    pub fn new(override_path: Option<&Path>) -> Result<Self> {
        let mut engine = Self {
            tera: Tera::default(),
            override_path: override_path.map(Path::to_path_buf),
        };
        engine.load_templates()?;
        Ok(engine)
    }

    fn load_templates(&mut self) -> Result<()> {
        let mut templates = BTreeMap::new();
        collect_embedded(&mut templates);

        if let Some(dir) = &self.override_path {
            if !dir.is_dir() {
                return Err(ThemeError::NotFound(dir.display().to_string()).into());
            }
            let before = templates.len();
            collect_templates_from_dir(dir, dir, &mut templates)?;
            tracing::info!(
                "Loaded template overrides from {} ({} new)",
                dir.display(),
                templates.len() - before
            );
        }

        let mut tera = Tera::default();
        tera.register_filter("date_br", date_br_filter);
        tera.add_raw_templates(templates)
            .map_err(|e| ThemeError::TemplateError(error_chain("Failed to load templates", &e)))?;

        self.tera = tera;
        Ok(())
    }

    /// Whether a template with this name is loaded
    pub fn has_template(&self, name: &str) -> bool {
        self.tera.get_template_names().any(|n| n == name)
    }

    /// Render a template with the given context
    pub fn render(&self, template: &str, context: &TeraContext) -> Result<String> {
        self.tera.render(template, context).map_err(|e| {
            ThemeError::TemplateError(error_chain(&format!("Failed to render '{}'", template), &e))
                .into()
        })
    }

    /// Render a template with standard variables automatically added
    pub fn render_with_standard_vars(
        &self,
        template: &str,
        context: &TeraContext,
        standard_vars: &StandardTemplateVars,
    ) -> Result<String> {
        let mut full_context = context.clone();

        full_context.insert("site_name", &standard_vars.site_name);
        full_context.insert("site_full_name", &standard_vars.site_full_name);
        full_context.insert("tagline", &standard_vars.tagline);
        full_context.insert("request_path", &standard_vars.request_path);
        full_context.insert("year", &standard_vars.year);
        full_context.insert("signed_in", &standard_vars.current_user.is_some());
        full_context.insert(
            "nav",
            &nav_links(&standard_vars.request_path, standard_vars.current_user.is_some()),
        );

        full_context.insert("current_user", &standard_vars.current_user);
        full_context.insert("toast", &standard_vars.toast);

        self.render(template, &full_context)
    }

    /// Render, or return a plain error page if the template fails
    pub fn render_or_error_page(
        &self,
        template: &str,
        context: &TeraContext,
        standard_vars: &StandardTemplateVars,
    ) -> String {
        match self.render_with_standard_vars(template, context, standard_vars) {
            Ok(html) => html,
            Err(e) => {
                tracing::error!("{}", e);
                Self::simple_error_page(&standard_vars.site_name)
            }
        }
    }

    fn simple_error_page(site_name: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="pt-BR">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Erro | {site}</title>
    <style>
        body {{ font-family: system-ui, sans-serif; max-width: 600px; margin: 50px auto; padding: 20px; }}
        h1 {{ color: #b91c1c; }}
    </style>
</head>
<body>
    <h1>Erro</h1>
    <p>Não foi possível exibir esta página. Tente novamente mais tarde.</p>
    <p><a href="/">Voltar ao início</a></p>
</body>
</html>"#,
            site = tera::escape_html(site_name)
        )
    }

    /// Loaded template names, sorted
    pub fn template_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tera.get_template_names().collect();
        names.sort_unstable();
        names
    }
}

fn collect_embedded(templates: &mut BTreeMap<String, String>) {
    for name in EmbeddedTemplates::iter() {
        if let Some(file) = EmbeddedTemplates::get(&name) {
            let content = String::from_utf8_lossy(&file.data).into_owned();
            templates.insert(name.replace('\\', "/"), content);
        }
    }
}

/// Collect `.html` files below `current_path`, named relative to `base_path`
fn collect_templates_from_dir(
    base_path: &Path,
    current_path: &Path,
    templates: &mut BTreeMap<String, String>,
) -> Result<()> {
    for entry in fs::read_dir(current_path)? {
        let path = entry?.path();

        if path.is_dir() {
            collect_templates_from_dir(base_path, &path, templates)?;
        } else if path.extension().map_or(false, |ext| ext == "html") {
            let relative_path = path
                .strip_prefix(base_path)
                .map_err(|_| ThemeError::TemplateError("Failed to get relative path".to_string()))?;

            let template_name = relative_path.to_string_lossy().replace('\\', "/");

            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read template: {:?}", path))?;

            templates.insert(template_name, content);
        }
    }

    Ok(())
}

fn error_chain(prefix: &str, e: &tera::Error) -> String {
    let mut message = format!("{}: {}", prefix, e);
    let mut source = e.source();
    while let Some(s) = source {
        message.push_str(&format!("\n  Caused by: {}", s));
        source = s.source();
    }
    message
}

// ============================================================================
// Dates
// ============================================================================

const MONTHS_PT: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

/// Long pt-BR date, e.g. `05 de março de 2024`
pub fn format_date_br(date: NaiveDate) -> String {
    format!(
        "{:02} de {} de {}",
        date.day(),
        MONTHS_PT[date.month0() as usize],
        date.year()
    )
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .ok()
        .or_else(|| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

/// `{{ post.created_at | date_br }}`
fn date_br_filter(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let s = value
        .as_str()
        .ok_or_else(|| tera::Error::msg("date_br expects a date string"))?;
    let date = parse_date(s)
        .ok_or_else(|| tera::Error::msg(format!("date_br could not parse '{}'", s)))?;
    Ok(Value::String(format_date_br(date)))
}

// ============================================================================
// Standard variables
// ============================================================================

/// Header navigation entry
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NavLink {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

const PUBLIC_NAV: &[(&str, &str)] = &[
    ("Início", "/"),
    ("Cursos", "/cursos"),
    ("Notícias", "/blog"),
    ("Contato", "/contato"),
];

const MEMBER_NAV: &[(&str, &str)] = &[("Professores", "/professores"), ("Alunos", "/alunos")];

/// Header links for a request path; members also get the directories.
pub fn nav_links(request_path: &str, signed_in: bool) -> Vec<NavLink> {
    let member: &[(&str, &str)] = if signed_in { MEMBER_NAV } else { &[] };

    PUBLIC_NAV
        .iter()
        .chain(member.iter())
        .map(|&(label, href)| NavLink {
            label,
            href,
            active: is_active(href, request_path),
        })
        .collect()
}

fn is_active(href: &str, request_path: &str) -> bool {
    if href == "/" {
        return request_path == "/";
    }
    request_path == href
        || request_path
            .strip_prefix(href)
            .map_or(false, |rest| rest.starts_with('/'))
}

/// Notification rendered by the base layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Toast {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub destructive: bool,
}

impl Toast {
    pub fn success(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: Some(description.into()),
            destructive: false,
        }
    }

    /// Destructive toast titled "Erro"
    pub fn error(description: impl Into<String>) -> Self {
        Self {
            title: "Erro".to_string(),
            description: Some(description.into()),
            destructive: true,
        }
    }
}

/// Standard template variables available to every page
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StandardTemplateVars {
    /// Short name shown in the header
    pub site_name: String,
    pub site_full_name: String,
    pub tagline: String,
    /// Signed-in viewer (optional)
    pub current_user: Option<CurrentUser>,
    pub toast: Option<Toast>,
    /// Current request path
    pub request_path: String,
    /// Current year (for the footer)
    pub year: i32,
}

impl StandardTemplateVars {
    pub fn new(site: &SiteConfig, request_path: impl Into<String>) -> Self {
        Self {
            site_name: site.name.clone(),
            site_full_name: site.full_name.clone(),
            tagline: site.tagline.clone(),
            current_user: None,
            toast: None,
            request_path: request_path.into(),
            year: Utc::now().year(),
        }
    }

    pub fn with_user(mut self, user: Option<CurrentUser>) -> Self {
        self.current_user = user;
        self
    }

    pub fn with_toast(mut self, toast: Option<Toast>) -> Self {
        self.toast = toast;
        self
    }
}

#[cfg(test)]
mod tests;
