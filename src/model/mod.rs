//! Backend records
//!
//! Users, items and the payloads sent back to the ABM Express API.

pub mod item;
pub mod user;
pub mod payload;
mod lenient;

pub use item::{Item, find_item, DEFAULT_MAX_PROGRESS};
pub use user::{User, ItemProgress, ItemRef};
pub use payload::{UserPayload, ItemPayload, ProgressEntry};
pub use lenient::{parse_number, parse_int};
