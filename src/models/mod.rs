//! Data models
//!
//! Records mirrored from the backend tables (Profile, Course, BlogPost,
//! ContactMessage, CarouselImage), the request shapes used to create and
//! update them, and the auth/session types.

mod blog_post;
mod carousel_image;
mod contact_message;
mod course;
mod profile;
mod session;

pub use blog_post::{BlogPost, BlogPostUpdate, BlogPostWithAuthor, NewBlogPost};
pub use carousel_image::{CarouselImage, Slide};
pub use contact_message::{ContactMessage, NewContactMessage};
pub use course::{parse_curriculum, Course, DEFAULT_COURSE_IMAGE};
pub use profile::{NewProfile, Profile, ProfileUpdate, UserRole};
pub use session::{Account, AuthSession, AuthUser, CurrentUser, SignedUp, StoredSession};
