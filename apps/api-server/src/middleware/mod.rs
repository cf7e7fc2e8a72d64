//! Request plumbing shared by handlers.

pub mod error;
