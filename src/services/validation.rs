//! Form validation
//!
//! Contact, login and registration forms are checked here before any backend
//! call. Input is trimmed and lengths are counted in characters.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::models::NewContactMessage;

pub const MSG_NAME_TOO_SHORT: &str = "Nome deve ter pelo menos 3 caracteres";
pub const MSG_INVALID_EMAIL: &str = "Email inválido";
pub const MSG_MESSAGE_TOO_SHORT: &str = "Mensagem deve ter pelo menos 10 caracteres";
pub const MSG_PASSWORD_TOO_SHORT: &str = "Senha deve ter pelo menos 6 caracteres";
pub const MSG_ROLE_REQUIRED: &str = "Selecione um perfil";
pub const MSG_ROLE_INVALID: &str = "Perfil inválido";

const MIN_NAME_CHARS: usize = 3;
const MIN_MESSAGE_CHARS: usize = 10;
const MIN_PASSWORD_CHARS: usize = 6;

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@([A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("email pattern is valid")
});

/// Email shape check (same rules as the client-side schema)
pub fn is_valid_email(email: &str) -> bool {
    !email.starts_with('.') && !email.contains("..") && EMAIL_REGEX.is_match(email)
}

fn has_min_chars(value: &str, min: usize) -> bool {
    value.chars().count() >= min
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Per-field error messages, keyed by form field name
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, &'static str>);

impl FieldErrors {
    pub fn add(&mut self, field: &'static str, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn into_result<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let messages: Vec<_> = self.0.values().copied().collect();
        f.write_str(&messages.join("; "))
    }
}

/// Contact form as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub message: String,
}

impl ContactForm {
    /// Validate and build the row to insert. Empty phone becomes null.
    pub fn validate(&self) -> Result<NewContactMessage, FieldErrors> {
        let mut errors = FieldErrors::default();
        let name = self.name.trim();
        let email = self.email.trim();
        let message = self.message.trim();

        if !has_min_chars(name, MIN_NAME_CHARS) {
            errors.add("name", MSG_NAME_TOO_SHORT);
        }
        if !is_valid_email(email) {
            errors.add("email", MSG_INVALID_EMAIL);
        }
        if !has_min_chars(message, MIN_MESSAGE_CHARS) {
            errors.add("message", MSG_MESSAGE_TOO_SHORT);
        }

        errors.into_result(NewContactMessage {
            name: name.to_string(),
            email: email.to_string(),
            phone: optional(&self.phone),
            message: message.to_string(),
        })
    }
}

/// Login form as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
}

/// Credentials that passed validation
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> Result<Credentials, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = self.email.trim();

        if !is_valid_email(email) {
            errors.add("email", MSG_INVALID_EMAIL);
        }
        if !has_min_chars(&self.password, MIN_PASSWORD_CHARS) {
            errors.add("password", MSG_PASSWORD_TOO_SHORT);
        }

        errors.into_result(Credentials {
            email: email.to_string(),
            password: self.password.clone(),
        })
    }
}

/// Registration form as submitted
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub email: String,
    #[serde(default, skip_serializing)]
    pub password: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub role: String,
}

/// Registration that passed validation
#[derive(Debug, Clone)]
pub struct Registration {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub phone: Option<String>,
    /// Raw role tag; the store decides whether it is acceptable
    pub role: String,
}

impl RegisterForm {
    pub fn validate(&self) -> Result<Registration, FieldErrors> {
        let mut errors = FieldErrors::default();
        let email = self.email.trim();
        let full_name = self.full_name.trim();
        let role = self.role.trim();

        if !is_valid_email(email) {
            errors.add("email", MSG_INVALID_EMAIL);
        }
        if !has_min_chars(&self.password, MIN_PASSWORD_CHARS) {
            errors.add("password", MSG_PASSWORD_TOO_SHORT);
        }
        if !has_min_chars(full_name, MIN_NAME_CHARS) {
            errors.add("full_name", MSG_NAME_TOO_SHORT);
        }
        if role.is_empty() {
            errors.add("role", MSG_ROLE_REQUIRED);
        } else if role.eq_ignore_ascii_case("admin") {
            errors.add("role", MSG_ROLE_INVALID);
        }

        errors.into_result(Registration {
            email: email.to_string(),
            password: self.password.clone(),
            full_name: full_name.to_string(),
            phone: optional(&self.phone),
            role: role.to_string(),
        })
    }
}
