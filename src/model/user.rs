//! Users and their item progress

use serde::{Deserialize, Deserializer, Serialize};

use super::item::{find_item, Item, DEFAULT_MAX_PROGRESS};

/// A user as returned by `GET /users`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "super::lenient::non_negative")]
    pub points: u32,
    #[serde(rename = "clase", default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(rename = "steamId", default, skip_serializing_if = "Option::is_none")]
    pub steam_id: Option<String>,
    /// Avatar URL resolved by the backend from the Steam ID
    #[serde(rename = "steamFoto", default, skip_serializing_if = "Option::is_none")]
    pub steam_avatar: Option<String>,
    #[serde(default)]
    pub items: Vec<ItemProgress>,
}

/// Reference to an item inside a progress entry.
///
/// The backend populates the reference on list endpoints and returns bare
/// ids from some mutation endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemRef {
    Populated(Item),
    Id(String),
}

impl ItemRef {
    /// Reference whose item was deleted; it has no id
    pub fn missing() -> Self {
        ItemRef::Id(String::new())
    }

    /// Item id, if the reference carries a non-empty one
    pub fn id(&self) -> Option<&str> {
        let id = match self {
            ItemRef::Populated(item) => item.id.as_str(),
            ItemRef::Id(id) => id.as_str(),
        };
        if id.is_empty() { None } else { Some(id) }
    }

    /// Display name, looked up in the catalogue for bare ids
    pub fn name<'a>(&'a self, catalogue: &'a [Item]) -> &'a str {
        match self {
            ItemRef::Populated(item) => &item.name,
            ItemRef::Id(id) => find_item(catalogue, id).map(|i| i.name.as_str()).unwrap_or(id),
        }
    }

    /// Upper bound for this item's progress
    pub fn max_progress(&self, catalogue: &[Item]) -> u32 {
        match self {
            ItemRef::Populated(item) => item.max_progress,
            ItemRef::Id(id) => find_item(catalogue, id)
                .map(|i| i.max_progress)
                .unwrap_or(DEFAULT_MAX_PROGRESS),
        }
    }
}

/// The backend nulls references to deleted items
fn item_or_missing<'de, D>(deserializer: D) -> Result<ItemRef, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<ItemRef>::deserialize(deserializer)?.unwrap_or_else(ItemRef::missing))
}

/// A user's progress on one item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemProgress {
    #[serde(default = "ItemRef::missing", deserialize_with = "item_or_missing")]
    pub item: ItemRef,
    #[serde(default, deserialize_with = "super::lenient::non_negative")]
    pub progress: u32,
}

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, points: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            points,
            ..Default::default()
        }
    }

    /// Class label, empty when unset
    pub fn class_label(&self) -> &str {
        self.class.as_deref().unwrap_or("")
    }

    /// Whether the user already holds progress on the given item
    pub fn holds_item(&self, item_id: &str) -> bool {
        self.items.iter().any(|e| e.item.id() == Some(item_id))
    }
}
