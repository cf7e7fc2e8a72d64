//! # Quill Core
//!
//! The domain layer of the Quill post scheduler: validation, the post store
//! and the feed projection. Pure logic with zero infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod feed;
pub mod ports;
pub mod store;
pub mod validation;

pub use domain::{Draft, NormalizedDraft, Post, PostId, PostStatus};
pub use error::{DomainError, FieldErrors, SubmitError, ValidationError};
pub use store::{PostStore, Posts, Sweep};
