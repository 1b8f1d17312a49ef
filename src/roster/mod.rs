//! Roster logic
//!
//! Pure computations over the fetched users: item progress reconciliation,
//! bulk update payloads, list filtering and multi-selection.

pub mod progress;
pub mod bulk;
pub mod listing;
pub mod selection;

pub use progress::{
    clamp_progress, parse_progress, append_request, selectable_items,
    DraftEntry, ItemPicks, ProgressDraft,
};
pub use bulk::{BulkForm, BulkProgressRow, BulkUpdateRequest};
pub use listing::{filter_and_sort, matches_query, ListQuery, SortDirection, SortKey};
pub use selection::Selection;
