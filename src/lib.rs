//! Inquisitorio - terminal ABM client
//!
//! Manage the inquisition's users, their ranks and item progress against
//! the ABM Express backend.

pub mod admin;
pub mod api;
pub mod config;
pub mod model;
pub mod progression;
pub mod roster;
pub mod ui;

// Re-export commonly used types
pub use admin::Admin;
pub use api::{ApiClient, ApiError, Backend};
pub use config::Config;
pub use model::{Item, User};
pub use progression::RankTable;
