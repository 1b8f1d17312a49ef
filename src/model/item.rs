//! Catalogue items

use serde::{Deserialize, Deserializer, Serialize};

/// Upper bound assumed when an item arrives without one
pub const DEFAULT_MAX_PROGRESS: u32 = 100;

/// An item from the catalogue
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Upper bound for any progress value referencing this item
    #[serde(
        rename = "maxProgress",
        default = "default_max_progress",
        deserialize_with = "max_progress"
    )]
    pub max_progress: u32,
}

fn default_max_progress() -> u32 {
    DEFAULT_MAX_PROGRESS
}

fn max_progress<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(super::lenient::optional_positive(deserializer)?.unwrap_or(DEFAULT_MAX_PROGRESS))
}

impl Item {
    pub fn new(id: impl Into<String>, name: impl Into<String>, max_progress: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: String::new(),
            max_progress: max_progress.max(1),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// Find an item in the catalogue by id
pub fn find_item<'a>(catalogue: &'a [Item], id: &str) -> Option<&'a Item> {
    catalogue.iter().find(|i| i.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_item() {
        let item: Item = serde_json::from_str(
            r#"{"_id":"a1","name":"Reliquia","description":"Antigua","maxProgress":5}"#,
        )
        .unwrap();
        assert_eq!(item.id, "a1");
        assert_eq!(item.max_progress, 5);
    }

    #[test]
    fn test_missing_max_progress_defaults() {
        let item: Item = serde_json::from_str(r#"{"_id":"a1","name":"Reliquia"}"#).unwrap();
        assert_eq!(item.max_progress, DEFAULT_MAX_PROGRESS);
        assert_eq!(item.description, "");

        let item: Item =
            serde_json::from_str(r#"{"_id":"a1","name":"Reliquia","maxProgress":null}"#).unwrap();
        assert_eq!(item.max_progress, DEFAULT_MAX_PROGRESS);
    }

    #[test]
    fn test_find_item() {
        let catalogue = vec![Item::new("a", "A", 3), Item::new("b", "B", 4)];
        assert_eq!(find_item(&catalogue, "b").map(|i| i.max_progress), Some(4));
        assert!(find_item(&catalogue, "c").is_none());
    }
}
