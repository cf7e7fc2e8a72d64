//! # Quill Shared
//!
//! Wire types shared between the server and any client of it.

pub mod dto;
pub mod response;

pub use response::{ApiResponse, ErrorResponse};
