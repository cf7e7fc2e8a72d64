//! Domain entities - the core business objects.

mod draft;
mod post;

pub use draft::{Draft, NormalizedDraft};
pub use post::{DISPLAY_FORMAT, Post, PostId, PostStatus, display_timestamp};
