//! User Interface module
//!
//! Terminal UI using ratatui: the users ABM, the items ABM and their modals.

pub mod app;
pub mod input;
pub mod widgets;

pub use app::App;
