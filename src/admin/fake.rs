//! In-memory backend for tests

use std::cell::RefCell;
use std::rc::Rc;

use crate::api::{ApiError, Backend};
use crate::model::{Item, ItemPayload, ItemProgress, ItemRef, ProgressEntry, User, UserPayload};
use crate::roster::BulkUpdateRequest;

#[derive(Debug, Default)]
pub struct FakeState {
    pub users: Vec<User>,
    pub items: Vec<Item>,
    /// Every request as "METHOD /path"
    pub calls: Vec<String>,
    /// Make every request fail with HTTP 500
    pub fail: bool,
    pub last_user_payload: Option<UserPayload>,
    pub last_bulk: Option<BulkUpdateRequest>,
    next_id: u32,
}

/// Clones share state, so a test can keep a handle after boxing one
#[derive(Debug, Clone, Default)]
pub struct FakeBackend {
    pub state: Rc<RefCell<FakeState>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.borrow().calls.clone()
    }

    fn record(&self, method: &str, path: &str) -> Result<(), ApiError> {
        let mut state = self.state.borrow_mut();
        state.calls.push(format!("{} {}", method, path));
        if state.fail {
            return Err(ApiError::Status {
                method: method.to_string(),
                url: path.to_string(),
                status: 500,
            });
        }
        Ok(())
    }

    fn next_id(&self, prefix: &str) -> String {
        let mut state = self.state.borrow_mut();
        state.next_id += 1;
        format!("{}{}", prefix, state.next_id)
    }
}

fn progress_entries(entries: &[ProgressEntry]) -> Vec<ItemProgress> {
    entries
        .iter()
        .map(|e| ItemProgress { item: ItemRef::Id(e.item.clone()), progress: e.progress })
        .collect()
}

fn user_from_payload(id: String, payload: &UserPayload) -> User {
    User {
        id,
        name: payload.name.clone(),
        points: payload.points,
        class: Some(payload.clase.clone()).filter(|c| !c.is_empty()),
        steam_id: Some(payload.steam_id.clone()).filter(|s| !s.is_empty()),
        steam_avatar: None,
        items: progress_entries(&payload.items),
    }
}

impl Backend for FakeBackend {
    fn health(&self) -> Result<(), ApiError> {
        self.record("GET", "/healthz")
    }

    fn list_users(&self) -> Result<Vec<User>, ApiError> {
        self.record("GET", "/users")?;
        Ok(self.state.borrow().users.clone())
    }

    fn create_user(&self, payload: &UserPayload) -> Result<(), ApiError> {
        self.record("POST", "/users")?;
        let id = self.next_id("u");
        let mut state = self.state.borrow_mut();
        state.users.push(user_from_payload(id, payload));
        state.last_user_payload = Some(payload.clone());
        Ok(())
    }

    fn update_user(&self, id: &str, payload: &UserPayload) -> Result<(), ApiError> {
        self.record("PUT", &format!("/users/{}", id))?;
        let mut state = self.state.borrow_mut();
        if let Some(user) = state.users.iter_mut().find(|u| u.id == id) {
            *user = user_from_payload(id.to_string(), payload);
        }
        state.last_user_payload = Some(payload.clone());
        Ok(())
    }

    fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.record("DELETE", &format!("/users/{}", id))?;
        self.state.borrow_mut().users.retain(|u| u.id != id);
        Ok(())
    }

    fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<(), ApiError> {
        self.record("POST", "/users/bulk")?;
        let mut state = self.state.borrow_mut();
        for user in state.users.iter_mut().filter(|u| request.ids.contains(&u.id)) {
            if let Some(delta) = request.delta_points {
                user.points = (user.points as i64 + delta).max(0) as u32;
            }
            if let Some(clase) = &request.set_clase {
                user.class = Some(clase.clone());
            }
        }
        state.last_bulk = Some(request.clone());
        Ok(())
    }

    fn append_item(&self, user_id: &str, entry: &ProgressEntry) -> Result<Vec<ItemProgress>, ApiError> {
        self.record("POST", &format!("/users/{}/items/append", user_id))?;
        let mut state = self.state.borrow_mut();
        let user = state
            .users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| ApiError::Decode(format!("no user {}", user_id)))?;
        user.items.push(ItemProgress {
            item: ItemRef::Id(entry.item.clone()),
            progress: entry.progress,
        });
        Ok(user.items.clone())
    }

    fn list_items(&self) -> Result<Vec<Item>, ApiError> {
        self.record("GET", "/items")?;
        Ok(self.state.borrow().items.clone())
    }

    fn create_item(&self, payload: &ItemPayload) -> Result<(), ApiError> {
        self.record("POST", "/items")?;
        let id = self.next_id("i");
        let item = Item::new(id, payload.name.clone(), payload.max_progress)
            .with_description(payload.description.clone());
        self.state.borrow_mut().items.push(item);
        Ok(())
    }

    fn update_item(&self, id: &str, payload: &ItemPayload) -> Result<(), ApiError> {
        self.record("PUT", &format!("/items/{}", id))?;
        let mut state = self.state.borrow_mut();
        if let Some(item) = state.items.iter_mut().find(|i| i.id == id) {
            item.name = payload.name.clone();
            item.description = payload.description.clone();
            item.max_progress = payload.max_progress;
        }
        Ok(())
    }

    fn delete_item(&self, id: &str) -> Result<(), ApiError> {
        self.record("DELETE", &format!("/items/{}", id))?;
        self.state.borrow_mut().items.retain(|i| i.id != id);
        Ok(())
    }
}
