//! The backend seam
//!
//! Everything the admin session needs from the REST API. The real
//! implementation is [`super::ApiClient`]; tests plug in an in-memory one.

use crate::model::{Item, ItemPayload, ItemProgress, ProgressEntry, User, UserPayload};
use crate::roster::BulkUpdateRequest;

use super::ApiError;

pub trait Backend {
    /// Wake the backend (hosted instances sleep when idle)
    fn health(&self) -> Result<(), ApiError>;

    fn list_users(&self) -> Result<Vec<User>, ApiError>;
    fn create_user(&self, payload: &UserPayload) -> Result<(), ApiError>;
    fn update_user(&self, id: &str, payload: &UserPayload) -> Result<(), ApiError>;
    fn delete_user(&self, id: &str) -> Result<(), ApiError>;
    fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<(), ApiError>;
    /// Give a user one more item; returns the user's updated item list
    fn append_item(&self, user_id: &str, entry: &ProgressEntry) -> Result<Vec<ItemProgress>, ApiError>;

    fn list_items(&self) -> Result<Vec<Item>, ApiError>;
    fn create_item(&self, payload: &ItemPayload) -> Result<(), ApiError>;
    fn update_item(&self, id: &str, payload: &ItemPayload) -> Result<(), ApiError>;
    fn delete_item(&self, id: &str) -> Result<(), ApiError>;
}
