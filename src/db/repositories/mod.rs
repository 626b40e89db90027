//! Database repositories
//!
//! Repository traits for every resource, with their SQLite implementations.
//! The hosted client implements the same traits (see `crate::hosted`), so
//! services never know which backend they talk to.

pub mod account;
pub mod blog_post;
pub mod carousel_image;
pub mod contact_message;
pub mod course;
pub mod profile;
pub mod session;

pub use account::{AccountRepository, SqlxAccountRepository};
pub use blog_post::{BlogPostRepository, SqlxBlogPostRepository};
pub use carousel_image::{CarouselImageRepository, SqlxCarouselImageRepository};
pub use contact_message::{ContactMessageRepository, SqlxContactMessageRepository};
pub use course::{CourseRepository, SqlxCourseRepository};
pub use profile::{ProfileRepository, SqlxProfileRepository};
pub use session::{SessionRepository, SqlxSessionRepository};
