//! Services layer
//!
//! One stateless service per resource (profiles, courses, blog posts,
//! contact messages, carousel images) plus auth. Services sit on top of the
//! repository traits, so the same code drives the local store and the hosted
//! backend. Backend errors are propagated unchanged inside
//! [`ServiceError::InternalError`].

pub mod access;
pub mod auth;
pub mod blog;
pub mod carousel;
pub mod contact;
pub mod course;
pub mod events;
pub mod markdown;
pub mod password;
pub mod profile;
pub mod validation;

pub use access::{current_access_token, with_access_token};
pub use auth::{AuthProvider, AuthService, LocalAuthProvider};
pub use blog::{BlogService, PAGE_SIZE};
pub use carousel::CarouselService;
pub use contact::ContactService;
pub use course::CourseService;
pub use events::{AuthEvent, AuthEvents};
pub use markdown::MarkdownRenderer;
pub use profile::ProfileService;
pub use validation::{ContactForm, FieldErrors, LoginForm, RegisterForm};

/// Error type shared by the services
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Credentials rejected or session missing
    #[error("Authentication failed: {0}")]
    AuthenticationError(String),

    /// Signed in but not allowed
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Account already exists
    #[error("{0}")]
    Conflict(String),

    /// The backend returned no row where one was expected
    #[error("{0}")]
    Missing(String),

    /// Backend error, propagated unchanged
    #[error("Internal error: {0}")]
    InternalError(#[from] anyhow::Error),
}
