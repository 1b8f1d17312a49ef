//! Bulk updates across many users
//!
//! The outgoing request is sparse: a component is present only when the
//! operator actually asked for it, so untouched fields are never overwritten.

use serde::Serialize;

use crate::model::{find_item, parse_int, Item, ProgressEntry, DEFAULT_MAX_PROGRESS};
use super::progress::parse_progress;

/// Body for `POST /users/bulk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkUpdateRequest {
    pub ids: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delta_points: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_clase: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub append_items: Option<Vec<ProgressEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub set_progress_items: Option<Vec<ProgressEntry>>,
}

impl BulkUpdateRequest {
    /// True when nothing besides the id list would be sent
    pub fn is_noop(&self) -> bool {
        self.delta_points.is_none()
            && self.set_clase.is_none()
            && self.append_items.is_none()
            && self.set_progress_items.is_none()
    }
}

/// A "force this item to this progress" row in the bulk form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkProgressRow {
    pub item: String,
    pub progress: String,
}

/// Operator input for a bulk update, kept as typed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkForm {
    pub delta_points: String,
    pub clase: String,
    pub append_item: String,
    pub append_progress: String,
    pub rows: Vec<BulkProgressRow>,
}

impl Default for BulkForm {
    fn default() -> Self {
        Self {
            delta_points: String::new(),
            clase: String::new(),
            append_item: String::new(),
            append_progress: "0".to_string(),
            rows: Vec::new(),
        }
    }
}

impl BulkForm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn add_row(&mut self) {
        self.rows.push(BulkProgressRow {
            item: String::new(),
            progress: "0".to_string(),
        });
    }

    pub fn remove_row(&mut self, index: usize) {
        if index < self.rows.len() {
            self.rows.remove(index);
        }
    }

    /// Build the request for the selected users.
    ///
    /// Returns `None` for an empty selection; nothing should be sent then.
    pub fn build(&self, ids: &[String], catalogue: &[Item]) -> Option<BulkUpdateRequest> {
        if ids.is_empty() {
            return None;
        }

        let delta_points = parse_int(&self.delta_points).filter(|d| *d != 0);

        let clase = self.clase.trim();
        let set_clase = (!clase.is_empty()).then(|| clase.to_string());

        let append_items = progress_entry(&self.append_item, &self.append_progress, catalogue)
            .map(|entry| vec![entry]);

        let rows: Vec<ProgressEntry> = self
            .rows
            .iter()
            .filter_map(|row| progress_entry(&row.item, &row.progress, catalogue))
            .collect();
        let set_progress_items = (!rows.is_empty()).then_some(rows);

        Some(BulkUpdateRequest {
            ids: ids.to_vec(),
            delta_points,
            set_clase,
            append_items,
            set_progress_items,
        })
    }
}

fn progress_entry(item_id: &str, progress: &str, catalogue: &[Item]) -> Option<ProgressEntry> {
    let item_id = item_id.trim();
    if item_id.is_empty() {
        return None;
    }
    let max = find_item(catalogue, item_id)
        .map(|i| i.max_progress)
        .unwrap_or(DEFAULT_MAX_PROGRESS);
    Some(ProgressEntry::new(item_id, parse_progress(progress, max)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn ids() -> Vec<String> {
        vec!["u1".to_string(), "u2".to_string()]
    }

    fn catalogue() -> Vec<Item> {
        vec![Item::new("sello", "Sello", 10), Item::new("tomo", "Tomo", 5)]
    }

    #[test]
    fn test_empty_selection_builds_nothing() {
        let mut form = BulkForm::new();
        form.delta_points = "10".into();
        assert!(form.build(&[], &catalogue()).is_none());
    }

    #[test]
    fn test_untouched_form_is_sparse() {
        let request = BulkForm::new().build(&ids(), &catalogue()).unwrap();
        assert!(request.is_noop());
        assert_eq!(serde_json::to_value(&request).unwrap(), json!({"ids": ["u1", "u2"]}));
    }

    #[test]
    fn test_zero_or_garbage_delta_is_omitted() {
        let mut form = BulkForm::new();
        for text in ["0", "", "abc", "  "] {
            form.delta_points = text.into();
            assert_eq!(form.build(&ids(), &catalogue()).unwrap().delta_points, None, "{:?}", text);
        }
        form.delta_points = "-5".into();
        assert_eq!(form.build(&ids(), &catalogue()).unwrap().delta_points, Some(-5));
    }

    #[test]
    fn test_blank_class_is_omitted() {
        let mut form = BulkForm::new();
        form.clase = "   ".into();
        assert_eq!(form.build(&ids(), &catalogue()).unwrap().set_clase, None);
        form.clase = "  Paladín ".into();
        assert_eq!(
            form.build(&ids(), &catalogue()).unwrap().set_clase.as_deref(),
            Some("Paladín")
        );
    }

    #[test]
    fn test_append_requires_item() {
        let mut form = BulkForm::new();
        form.append_progress = "3".into();
        assert_eq!(form.build(&ids(), &catalogue()).unwrap().append_items, None);

        form.append_item = "tomo".into();
        form.append_progress = "9".into();
        assert_eq!(
            form.build(&ids(), &catalogue()).unwrap().append_items,
            Some(vec![ProgressEntry::new("tomo", 5)])
        );
    }

    #[test]
    fn test_rows_without_item_are_dropped() {
        let mut form = BulkForm::new();
        form.add_row();
        assert_eq!(form.build(&ids(), &catalogue()).unwrap().set_progress_items, None);

        form.add_row();
        form.rows[1] = BulkProgressRow { item: "sello".into(), progress: "x".into() };
        assert_eq!(
            form.build(&ids(), &catalogue()).unwrap().set_progress_items,
            Some(vec![ProgressEntry::new("sello", 0)])
        );

        form.remove_row(0);
        form.remove_row(7);
        assert_eq!(form.rows.len(), 1);
    }

    #[test]
    fn test_full_request_wire_shape() {
        let form = BulkForm {
            delta_points: "10".into(),
            clase: "Mago".into(),
            append_item: "tomo".into(),
            append_progress: "2".into(),
            rows: vec![BulkProgressRow { item: "sello".into(), progress: "4".into() }],
        };
        assert_eq!(
            serde_json::to_value(form.build(&ids(), &catalogue()).unwrap()).unwrap(),
            json!({
                "ids": ["u1", "u2"],
                "deltaPoints": 10,
                "setClase": "Mago",
                "appendItems": [{"item": "tomo", "progress": 2}],
                "setProgressItems": [{"item": "sello", "progress": 4}]
            })
        );
    }

    #[test]
    fn test_reset() {
        let mut form = BulkForm::new();
        form.clase = "Mago".into();
        form.add_row();
        form.reset();
        assert_eq!(form, BulkForm::default());
        assert_eq!(form.append_progress, "0");
    }
}
