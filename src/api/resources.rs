use super::client::ApiClient;
use crate::error::ApiError;
use crate::models::ResourceKind;
use serde_json::Value;
use std::sync::Arc;

/// CRUD calls for every resource kind, routed through the shared client.
#[derive(Clone)]
pub struct ResourceClient {
    client: Arc<ApiClient>,
}

impl ResourceClient {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Arc<ApiClient> {
        &self.client
    }

    pub async fn list(&self, kind: ResourceKind) -> Result<Vec<Value>, ApiError> {
        let value = self
            .client
            .get(&format!("{}/", kind.collection_path()))
            .await?;
        into_list(value)
    }

    pub async fn get(&self, kind: ResourceKind, id: &str) -> Result<Value, ApiError> {
        self.client.get(&item_path(kind, id)?).await
    }

    pub async fn create(&self, kind: ResourceKind, body: &Value) -> Result<Value, ApiError> {
        self.client
            .post(&format!("{}/", kind.collection_path()), body)
            .await
    }

    pub async fn update(&self, kind: ResourceKind, id: &str, body: &Value) -> Result<Value, ApiError> {
        self.client.put(&item_path(kind, id)?, body).await
    }

    pub async fn delete(&self, kind: ResourceKind, id: &str) -> Result<Value, ApiError> {
        self.client.delete(&item_path(kind, id)?).await
    }

    /// Passenger or reservation by passport number.
    pub async fn by_passport(&self, kind: ResourceKind, passport: &str) -> Result<Value, ApiError> {
        if !kind.supports_passport_lookup() {
            return Err(ApiError::Request(format!(
                "{} cannot be looked up by passport",
                kind.plural()
            )));
        }
        let passport = path_segment(passport)?;
        self.client
            .get(&format!("{}/passport/{}", kind.collection_path(), passport))
            .await
    }

    pub async fn set_flight_state(&self, vol_num: &str, state: &str) -> Result<Value, ApiError> {
        let path = format!("{}/state", item_path(ResourceKind::Flight, vol_num)?);
        self.client.patch_query(&path, &[("new_state", state)]).await
    }
}

fn item_path(kind: ResourceKind, id: &str) -> Result<String, ApiError> {
    Ok(format!("{}/{}", kind.collection_path(), path_segment(id)?))
}

/// Ids are interpolated into the path, so they must be a single plain segment.
fn path_segment(id: &str) -> Result<&str, ApiError> {
    let id = id.trim();
    if id.is_empty() || !id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(ApiError::Request(format!("invalid identifier '{}'", id)));
    }
    Ok(id)
}

/// Lists come back either as a bare array or wrapped in an object.
fn into_list(value: Value) -> Result<Vec<Value>, ApiError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Null => Ok(Vec::new()),
        Value::Object(mut map) => {
            for key in ["items", "data", "results"] {
                if let Some(Value::Array(items)) = map.remove(key) {
                    return Ok(items);
                }
            }
            Err(ApiError::Decode("expected a list of records".to_string()))
        }
        _ => Err(ApiError::Decode("expected a list of records".to_string())),
    }
}
