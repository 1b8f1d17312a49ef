//! Request bodies sent to the backend

use serde::{Deserialize, Serialize};

/// One `{item, progress}` pair as the backend expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEntry {
    pub item: String,
    pub progress: u32,
}

impl ProgressEntry {
    pub fn new(item: impl Into<String>, progress: u32) -> Self {
        Self { item: item.into(), progress }
    }
}

/// Body for `POST /users` and `PUT /users/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPayload {
    pub name: String,
    pub points: u32,
    pub clase: String,
    #[serde(rename = "steamId")]
    pub steam_id: String,
    pub items: Vec<ProgressEntry>,
}

/// Body for `POST /items` and `PUT /items/:id`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemPayload {
    pub name: String,
    pub description: String,
    #[serde(rename = "maxProgress")]
    pub max_progress: u32,
}
