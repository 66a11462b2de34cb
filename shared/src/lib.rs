//! Shared types for the Galley floor coordinator
//!
//! Contains everything the server and its clients agree on:
//!
//! - [`models`] - domain entities and API payloads
//! - [`error`] - unified error codes, [`error::AppError`] and the API envelope
//! - [`util`] - timestamps and ID generation

pub mod error;
pub mod models;
pub mod util;

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
