//! REST backend access

pub mod backend;
pub mod client;
pub mod error;

pub use backend::Backend;
pub use client::{ApiClient, DEFAULT_API_URL};
pub use error::ApiError;
