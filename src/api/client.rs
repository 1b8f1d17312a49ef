//! HTTP client for the ABM Express API

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::model::{Item, ItemPayload, ItemProgress, ProgressEntry, User, UserPayload};
use crate::roster::BulkUpdateRequest;

use super::{ApiError, Backend};

/// Hosted backend used when nothing else is configured
pub const DEFAULT_API_URL: &str = "https://abm-express.onrender.com";

/// Blocking client for the users/items endpoints
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn send<B: Serialize>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Response, ApiError> {
        let url = self.url(path);
        log::debug!("{} {}", method, url);

        let mut request = self.http.request(method.clone(), &url);
        if let Some(body) = body {
            request = request.json(body);
        }
        let response = request.send()?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                method: method.to_string(),
                url,
                status: status.as_u16(),
            });
        }
        Ok(response)
    }

    fn get_value(&self, path: &str) -> Result<Value, ApiError> {
        Ok(self.send::<()>(Method::GET, path, None)?.json()?)
    }

    fn send_json<B: Serialize>(&self, method: Method, path: &str, body: &B) -> Result<(), ApiError> {
        self.send(method, path, Some(body)).map(|_| ())
    }
}

/// Decode a list endpoint. A body that is not an array counts as empty.
pub fn list_from_value<T: DeserializeOwned>(value: Value) -> Result<Vec<T>, ApiError> {
    match value {
        Value::Array(_) => Ok(serde_json::from_value(value)?),
        other => {
            log::warn!("Expected a JSON array, got {}", kind(&other));
            Ok(Vec::new())
        }
    }
}

/// Pull the updated item list out of an append response, which comes either
/// as `{items: [...]}` or as `{user: {items: [...]}}`.
pub fn items_from_append_response(value: Value) -> Result<Vec<ItemProgress>, ApiError> {
    let items = value
        .get("items")
        .or_else(|| value.get("user").and_then(|u| u.get("items")))
        .cloned();
    match items {
        Some(items @ Value::Array(_)) => Ok(serde_json::from_value(items)?),
        _ => Ok(Vec::new()),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

impl Backend for ApiClient {
    fn health(&self) -> Result<(), ApiError> {
        self.send::<()>(Method::GET, "/healthz", None).map(|_| ())
    }

    fn list_users(&self) -> Result<Vec<User>, ApiError> {
        list_from_value(self.get_value("/users")?)
    }

    fn create_user(&self, payload: &UserPayload) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/users", payload)
    }

    fn update_user(&self, id: &str, payload: &UserPayload) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("/users/{}", id), payload)
    }

    fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, &format!("/users/{}", id), None).map(|_| ())
    }

    fn bulk_update(&self, request: &BulkUpdateRequest) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/users/bulk", request)
    }

    fn append_item(&self, user_id: &str, entry: &ProgressEntry) -> Result<Vec<ItemProgress>, ApiError> {
        let path = format!("/users/{}/items/append", user_id);
        let value: Value = self.send(Method::POST, &path, Some(entry))?.json()?;
        items_from_append_response(value)
    }

    fn list_items(&self) -> Result<Vec<Item>, ApiError> {
        list_from_value(self.get_value("/items")?)
    }

    fn create_item(&self, payload: &ItemPayload) -> Result<(), ApiError> {
        self.send_json(Method::POST, "/items", payload)
    }

    fn update_item(&self, id: &str, payload: &ItemPayload) -> Result<(), ApiError> {
        self.send_json(Method::PUT, &format!("/items/{}", id), payload)
    }

    fn delete_item(&self, id: &str) -> Result<(), ApiError> {
        self.send::<()>(Method::DELETE, &format!("/items/{}", id), None).map(|_| ())
    }
}
