//! The seam between the controller and the REST backend.

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiError;

/// CRUD operations on named backend collections.
///
/// [`RestClient`](crate::api::RestClient) is the production implementation;
/// tests substitute an in-memory fake.
#[async_trait]
pub trait CollectionBackend: Send + Sync {
    /// `GET /<collection>`. Returns the raw body (array, object, or null).
    async fn list(&self, collection: &str) -> Result<Value, ApiError>;

    /// `GET /<collection>/<id>`.
    async fn fetch(&self, collection: &str, id: &str) -> Result<Value, ApiError>;

    /// `POST /<collection>`. `None` when the backend does not echo a body.
    async fn create(&self, collection: &str, body: &Value) -> Result<Option<Value>, ApiError>;

    /// `PUT /<collection>/<id>`. `None` when the backend does not echo a body.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        body: &Value,
    ) -> Result<Option<Value>, ApiError>;

    /// `DELETE /<collection>/<id>`.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), ApiError>;
}
