//! Item progress reconciliation
//!
//! Merges a user's held item progress with operator edits and appends,
//! keeping every value within `[0, max_progress]` and never letting a user
//! hold the same item twice.

use crate::model::{find_item, parse_number, Item, ItemProgress, ProgressEntry};

/// Clamp a raw progress value into `[0, max]`. Non-finite values become 0.
pub fn clamp_progress(value: f64, max: u32) -> u32 {
    if !value.is_finite() || value <= 0.0 {
        0
    } else if value >= max as f64 {
        max
    } else {
        value as u32
    }
}

/// Parse operator text and clamp it. Unparseable text becomes 0.
pub fn parse_progress(text: &str, max: u32) -> u32 {
    clamp_progress(parse_number(text).unwrap_or(0.0), max)
}

/// One held item in an edit draft
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DraftEntry {
    pub item_id: String,
    pub name: String,
    pub max_progress: u32,
    pub progress: u32,
}

impl DraftEntry {
    /// Completion ratio in `[0, 1]`
    pub fn ratio(&self) -> f64 {
        if self.max_progress == 0 {
            0.0
        } else {
            (self.progress as f64 / self.max_progress as f64).min(1.0)
        }
    }
}

/// Editable copy of a user's item progress, in the order the user holds them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProgressDraft {
    entries: Vec<DraftEntry>,
}

impl ProgressDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from held entries. Entries without an item id are skipped and a
    /// repeated item keeps its first occurrence.
    pub fn from_entries(entries: &[ItemProgress], catalogue: &[Item]) -> Self {
        let mut draft = Self::new();
        for entry in entries {
            let Some(id) = entry.item.id() else {
                continue;
            };
            if draft.contains(id) {
                log::warn!("Duplicate progress entry for item {} ignored", id);
                continue;
            }
            let max_progress = entry.item.max_progress(catalogue);
            draft.entries.push(DraftEntry {
                item_id: id.to_string(),
                name: entry.item.name(catalogue).to_string(),
                max_progress,
                progress: entry.progress.min(max_progress),
            });
        }
        draft
    }

    pub fn entries(&self) -> &[DraftEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, item_id: &str) -> bool {
        self.entries.iter().any(|e| e.item_id == item_id)
    }

    pub fn get(&self, item_id: &str) -> Option<u32> {
        self.entry(item_id).map(|e| e.progress)
    }

    fn entry(&self, item_id: &str) -> Option<&DraftEntry> {
        self.entries.iter().find(|e| e.item_id == item_id)
    }

    fn entry_mut(&mut self, item_id: &str) -> Option<&mut DraftEntry> {
        self.entries.iter_mut().find(|e| e.item_id == item_id)
    }

    /// Set progress for a held item, clamped to its bounds.
    /// Returns false if the item is not held.
    pub fn set(&mut self, item_id: &str, value: f64) -> bool {
        match self.entry_mut(item_id) {
            Some(entry) => {
                entry.progress = clamp_progress(value, entry.max_progress);
                true
            }
            None => false,
        }
    }

    /// Set progress from operator text
    pub fn set_text(&mut self, item_id: &str, text: &str) -> bool {
        let value = parse_number(text).unwrap_or(0.0);
        self.set(item_id, value)
    }

    /// Step progress up by one, stopping at the item's max
    pub fn increment(&mut self, item_id: &str) {
        if let Some(entry) = self.entry_mut(item_id) {
            entry.progress = (entry.progress + 1).min(entry.max_progress);
        }
    }

    /// Step progress down by one, stopping at zero
    pub fn decrement(&mut self, item_id: &str) {
        if let Some(entry) = self.entry_mut(item_id) {
            entry.progress = entry.progress.saturating_sub(1);
        }
    }

    /// Serialize to the `{item, progress}` list the backend expects
    pub fn to_payload(&self) -> Vec<ProgressEntry> {
        self.entries
            .iter()
            .map(|e| ProgressEntry::new(e.item_id.clone(), e.progress))
            .collect()
    }
}

/// Catalogue items a user can still be given
pub fn selectable_items<'a>(catalogue: &'a [Item], held: &ProgressDraft) -> Vec<&'a Item> {
    catalogue.iter().filter(|i| !held.contains(&i.id)).collect()
}

/// Build the body for appending an item to a user.
///
/// Returns `None` when no item is chosen, the item is unknown, or the user
/// already holds it.
pub fn append_request(
    held: &ProgressDraft,
    catalogue: &[Item],
    item_id: &str,
    progress_text: &str,
) -> Option<ProgressEntry> {
    let item_id = item_id.trim();
    if item_id.is_empty() {
        return None;
    }
    if held.contains(item_id) {
        log::warn!("Item {} already held, append rejected", item_id);
        return None;
    }
    let item = find_item(catalogue, item_id)?;
    Some(ProgressEntry::new(
        item.id.clone(),
        parse_progress(progress_text, item.max_progress),
    ))
}

/// Items picked for a user that is being created
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPicks {
    picks: Vec<DraftEntry>,
}

impl ItemPicks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the item with progress 0, or drop it if already picked
    pub fn toggle(&mut self, item: &Item) {
        if let Some(pos) = self.picks.iter().position(|p| p.item_id == item.id) {
            self.picks.remove(pos);
        } else {
            self.picks.push(DraftEntry {
                item_id: item.id.clone(),
                name: item.name.clone(),
                max_progress: item.max_progress,
                progress: 0,
            });
        }
    }

    pub fn is_picked(&self, item_id: &str) -> bool {
        self.picks.iter().any(|p| p.item_id == item_id)
    }

    pub fn progress(&self, item_id: &str) -> Option<u32> {
        self.picks.iter().find(|p| p.item_id == item_id).map(|p| p.progress)
    }

    pub fn set_progress(&mut self, item_id: &str, value: f64) {
        if let Some(pick) = self.picks.iter_mut().find(|p| p.item_id == item_id) {
            pick.progress = clamp_progress(value, pick.max_progress);
        }
    }

    pub fn picks(&self) -> &[DraftEntry] {
        &self.picks
    }

    pub fn clear(&mut self) {
        self.picks.clear();
    }

    pub fn to_payload(&self) -> Vec<ProgressEntry> {
        self.picks
            .iter()
            .map(|p| ProgressEntry::new(p.item_id.clone(), p.progress))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ItemRef;

    fn catalogue() -> Vec<Item> {
        vec![
            Item::new("sello", "Sello", 10),
            Item::new("reliquia", "Reliquia", 3),
            Item::new("tomo", "Tomo", 100),
        ]
    }

    fn held() -> Vec<ItemProgress> {
        let cat = catalogue();
        vec![
            ItemProgress { item: ItemRef::Populated(cat[0].clone()), progress: 4 },
            ItemProgress { item: ItemRef::Id("reliquia".into()), progress: 1 },
        ]
    }

    #[test]
    fn test_clamp_progress() {
        assert_eq!(clamp_progress(-5.0, 10), 0);
        assert_eq!(clamp_progress(0.0, 10), 0);
        assert_eq!(clamp_progress(7.0, 10), 7);
        assert_eq!(clamp_progress(10.0, 10), 10);
        assert_eq!(clamp_progress(1e12, 10), 10);
        assert_eq!(clamp_progress(f64::NAN, 10), 0);
        assert_eq!(clamp_progress(f64::INFINITY, 10), 0);
        assert_eq!(clamp_progress(f64::NEG_INFINITY, 10), 0);
    }

    #[test]
    fn test_clamp_stays_in_bounds() {
        for max in [1u32, 3, 10, 250] {
            for raw in [-1e9, -1.0, 0.5, 2.0, 99.9, 1e9] {
                let v = clamp_progress(raw, max);
                assert!(v <= max, "{} clamped to {} exceeds {}", raw, v, max);
            }
        }
    }

    #[test]
    fn test_parse_progress() {
        assert_eq!(parse_progress("5", 10), 5);
        assert_eq!(parse_progress("50", 10), 10);
        assert_eq!(parse_progress("-2", 10), 0);
        assert_eq!(parse_progress("mucho", 10), 0);
        assert_eq!(parse_progress("", 10), 0);
    }

    #[test]
    fn test_draft_seeds_from_entries() {
        let draft = ProgressDraft::from_entries(&held(), &catalogue());
        assert_eq!(draft.len(), 2);
        assert_eq!(draft.get("sello"), Some(4));
        assert_eq!(draft.get("reliquia"), Some(1));
        assert_eq!(draft.entries()[1].name, "Reliquia");
        assert_eq!(draft.entries()[1].max_progress, 3);
    }

    #[test]
    fn test_draft_skips_empty_and_duplicate_refs() {
        let mut entries = held();
        entries.push(ItemProgress { item: ItemRef::Id(String::new()), progress: 2 });
        entries.push(ItemProgress { item: ItemRef::Id("sello".into()), progress: 9 });
        entries.push(serde_json::from_str(r#"{"item":null,"progress":5}"#).unwrap());
        let draft = ProgressDraft::from_entries(&entries, &catalogue());
        assert_eq!(draft.len(), 2);
        assert_eq!(draft.get("sello"), Some(4));
    }

    #[test]
    fn test_draft_edits_are_clamped() {
        let mut draft = ProgressDraft::from_entries(&held(), &catalogue());
        assert!(draft.set("reliquia", 99.0));
        assert_eq!(draft.get("reliquia"), Some(3));
        assert!(draft.set_text("sello", "-4"));
        assert_eq!(draft.get("sello"), Some(0));
        assert!(draft.set_text("sello", "x"));
        assert_eq!(draft.get("sello"), Some(0));
        assert!(!draft.set("tomo", 1.0));
    }

    #[test]
    fn test_draft_stepping_saturates() {
        let mut draft = ProgressDraft::from_entries(&held(), &catalogue());
        draft.increment("reliquia");
        draft.increment("reliquia");
        draft.increment("reliquia");
        assert_eq!(draft.get("reliquia"), Some(3));
        draft.set("sello", 0.0);
        draft.decrement("sello");
        assert_eq!(draft.get("sello"), Some(0));
    }

    #[test]
    fn test_draft_payload_keeps_order() {
        let draft = ProgressDraft::from_entries(&held(), &catalogue());
        assert_eq!(
            draft.to_payload(),
            vec![ProgressEntry::new("sello", 4), ProgressEntry::new("reliquia", 1)]
        );
    }

    #[test]
    fn test_selectable_excludes_held() {
        let cat = catalogue();
        let draft = ProgressDraft::from_entries(&held(), &cat);
        let ids: Vec<&str> = selectable_items(&cat, &draft).iter().map(|i| i.id.as_str()).collect();
        assert_eq!(ids, vec!["tomo"]);
    }

    #[test]
    fn test_append_request() {
        let cat = catalogue();
        let draft = ProgressDraft::from_entries(&held(), &cat);

        assert_eq!(append_request(&draft, &cat, "tomo", ""), Some(ProgressEntry::new("tomo", 0)));
        assert_eq!(append_request(&draft, &cat, "tomo", "250"), Some(ProgressEntry::new("tomo", 100)));
        assert_eq!(append_request(&draft, &cat, "tomo", "abc"), Some(ProgressEntry::new("tomo", 0)));
        // Already held
        assert_eq!(append_request(&draft, &cat, "sello", "1"), None);
        // Nothing chosen
        assert_eq!(append_request(&draft, &cat, "  ", "1"), None);
        // Not in the catalogue
        assert_eq!(append_request(&draft, &cat, "fantasma", "1"), None);
    }

    #[test]
    fn test_item_picks_toggle() {
        let cat = catalogue();
        let mut picks = ItemPicks::new();
        picks.toggle(&cat[0]);
        picks.toggle(&cat[1]);
        assert!(picks.is_picked("sello"));
        assert_eq!(picks.progress("reliquia"), Some(0));

        picks.set_progress("reliquia", 8.0);
        assert_eq!(picks.progress("reliquia"), Some(3));

        picks.toggle(&cat[0]);
        assert!(!picks.is_picked("sello"));
        assert_eq!(picks.to_payload(), vec![ProgressEntry::new("reliquia", 3)]);
    }
}
