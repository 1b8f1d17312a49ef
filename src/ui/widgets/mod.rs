//! UI widgets

pub mod badge;
pub mod progress_bar;

pub use badge::{rank_badge, tone_color};
pub use progress_bar::{progress_span, ProgressBar};
