//! Admin session
//!
//! State and backend operations behind both ABM screens.

pub mod forms;
mod session;
#[cfg(test)]
pub(crate) mod fake;

pub use forms::{ItemForm, UserDraft, UserForm};
pub use session::{Admin, Command, EditSession, ItemEditSession, Stats, View};
