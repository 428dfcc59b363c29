//! Remote resource service client.
//!
//! The engine consumes one remote collection per entity (cart, wishlist)
//! through the [`RemoteCollectionService`] seam: `list` returns a full
//! snapshot, `add`/`update`/`remove` mutate single items. All calls carry an
//! opaque bearer credential supplied by the external auth collaborator.
//!
//! [`HttpRemoteService`] is the production implementation: plain JSON REST
//! over `reqwest`. Tests substitute an in-process implementation.

use std::future::Future;
use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use driftwood_core::{Price, ResourceId};

use crate::config::RemoteConfig;
use crate::model::CartLine;

/// Errors from the remote resource service.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Bearer credential rejected.
    #[error("unauthorized")]
    Unauthorized,

    /// Resource not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Rate limited by the service.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Any other non-success response.
    #[error("remote returned {status}: {message}")]
    Status { status: u16, message: String },
}

/// One item of a remote collection snapshot.
///
/// The wire shape is shared between carts and wishlists; wishlist items
/// simply omit variant, quantity, and pricing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteItem {
    /// Resource identifier; the service sends numbers or strings, both
    /// normalize through [`ResourceId`].
    pub resource_id: ResourceId,
    #[serde(default)]
    pub variant: Option<String>,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit_price: Option<Price>,
    #[serde(default)]
    pub reference_price: Option<Price>,
    #[serde(default)]
    pub image: Option<String>,
}

const fn default_quantity() -> u32 {
    1
}

impl RemoteItem {
    /// Convert a snapshot item into a cart line. Missing display fields
    /// default to empty; the next product-detail fetch backfills them.
    #[must_use]
    pub fn into_cart_line(self) -> CartLine {
        CartLine {
            id: self.resource_id,
            name: self.name.unwrap_or_default(),
            unit_price: self.unit_price.unwrap_or_default(),
            reference_price: self.reference_price,
            image: self.image,
            variant: self.variant,
            quantity: self.quantity,
        }
    }
}

/// The remote resource service seam, one instance per entity collection.
///
/// Implementations must be cheap to clone behind an `Arc`; the dual-mode
/// store moves clones into fire-and-forget background tasks.
pub trait RemoteCollectionService: Send + Sync + 'static {
    /// Fetch the full canonical snapshot of the collection.
    fn list(&self) -> impl Future<Output = Result<Vec<RemoteItem>, RemoteError>> + Send;

    /// Add an item (service merges same-key items its own way).
    fn add(
        &self,
        id: &ResourceId,
        variant: Option<&str>,
        quantity: u32,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Set an item's absolute quantity.
    fn update(
        &self,
        id: &ResourceId,
        variant: Option<&str>,
        quantity: u32,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;

    /// Remove an item. Removing an absent item is not an error.
    fn remove(
        &self,
        id: &ResourceId,
        variant: Option<&str>,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}

// =============================================================================
// HTTP implementation
// =============================================================================

#[derive(Debug, Serialize)]
struct AddItemRequest<'a> {
    resource_id: &'a ResourceId,
    variant: Option<&'a str>,
    quantity: u32,
}

#[derive(Debug, Serialize)]
struct UpdateItemRequest<'a> {
    variant: Option<&'a str>,
    quantity: u32,
}

#[derive(Debug, Deserialize)]
struct ListResponse {
    items: Vec<RemoteItem>,
}

/// JSON REST client for one remote entity collection.
///
/// Routes:
/// - `GET    {base}/{version}/{entity}` - full snapshot
/// - `POST   {base}/{version}/{entity}/items` - add item
/// - `PATCH  {base}/{version}/{entity}/items/{id}` - set absolute quantity
/// - `DELETE {base}/{version}/{entity}/items/{id}` - remove item
#[derive(Clone)]
pub struct HttpRemoteService {
    inner: Arc<HttpRemoteServiceInner>,
}

struct HttpRemoteServiceInner {
    client: reqwest::Client,
    /// `{base}/{version}/{entity}`, no trailing slash.
    endpoint: String,
    entity: String,
    token: SecretString,
}

impl HttpRemoteService {
    /// Create a client for one entity collection (e.g., `"cart"`).
    #[must_use]
    pub fn new(config: &RemoteConfig, entity: &str) -> Self {
        let endpoint = format!(
            "{}/{}/{entity}",
            config.base_url.trim_end_matches('/'),
            config.api_version
        );

        Self {
            inner: Arc::new(HttpRemoteServiceInner {
                client: reqwest::Client::new(),
                endpoint,
                entity: entity.to_string(),
                token: config.api_token.clone(),
            }),
        }
    }

    fn item_url(&self, id: &ResourceId) -> String {
        format!(
            "{}/items/{}",
            self.inner.endpoint,
            urlencoding::encode(id.as_str())
        )
    }

    /// Send a request and map the response status to the error taxonomy,
    /// returning the body text of a successful response.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, RemoteError> {
        let response = request
            .bearer_auth(self.inner.token.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            return Err(RemoteError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(RemoteError::Unauthorized);
        }

        // Read the body first so failures carry diagnostics.
        let body = response.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(RemoteError::NotFound(self.inner.entity.clone()));
        }

        if !status.is_success() {
            tracing::error!(
                entity = %self.inner.entity,
                status = %status,
                body = %body.chars().take(500).collect::<String>(),
                "remote resource service returned non-success status"
            );
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message: body.chars().take(200).collect(),
            });
        }

        Ok(body)
    }
}

impl RemoteCollectionService for HttpRemoteService {
    #[instrument(skip(self), fields(entity = %self.inner.entity))]
    async fn list(&self) -> Result<Vec<RemoteItem>, RemoteError> {
        let body = self
            .send(self.inner.client.get(&self.inner.endpoint))
            .await?;

        let response: ListResponse = serde_json::from_str(&body).inspect_err(|e| {
            tracing::error!(
                entity = %self.inner.entity,
                error = %e,
                body = %body.chars().take(500).collect::<String>(),
                "failed to parse remote snapshot"
            );
        })?;

        Ok(response.items)
    }

    #[instrument(skip(self), fields(entity = %self.inner.entity, id = %id))]
    async fn add(
        &self,
        id: &ResourceId,
        variant: Option<&str>,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        let request = self
            .inner
            .client
            .post(format!("{}/items", self.inner.endpoint))
            .json(&AddItemRequest {
                resource_id: id,
                variant,
                quantity,
            });

        self.send(request).await.map(|_| ())
    }

    #[instrument(skip(self), fields(entity = %self.inner.entity, id = %id))]
    async fn update(
        &self,
        id: &ResourceId,
        variant: Option<&str>,
        quantity: u32,
    ) -> Result<(), RemoteError> {
        let request = self
            .inner
            .client
            .patch(self.item_url(id))
            .json(&UpdateItemRequest { variant, quantity });

        self.send(request).await.map(|_| ())
    }

    #[instrument(skip(self), fields(entity = %self.inner.entity, id = %id))]
    async fn remove(&self, id: &ResourceId, variant: Option<&str>) -> Result<(), RemoteError> {
        let mut request = self.inner.client.delete(self.item_url(id));
        if let Some(variant) = variant {
            request = request.query(&[("variant", variant)]);
        }

        self.send(request).await.map(|_| ())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_item_defaults() {
        // Wishlist payloads omit everything but the id.
        let item: RemoteItem = serde_json::from_str(r#"{"resource_id": 7}"#).unwrap();
        assert_eq!(item.resource_id, ResourceId::from(7));
        assert_eq!(item.quantity, 1);
        assert!(item.variant.is_none());
        assert!(item.unit_price.is_none());
    }

    #[test]
    fn test_remote_item_into_cart_line() {
        let item: RemoteItem = serde_json::from_str(
            r#"{"resource_id": "7", "variant": "red", "quantity": 3, "name": "Mug"}"#,
        )
        .unwrap();

        let line = item.into_cart_line();
        assert_eq!(line.id, ResourceId::from(7));
        assert_eq!(line.variant.as_deref(), Some("red"));
        assert_eq!(line.quantity, 3);
        assert_eq!(line.name, "Mug");
    }

    #[test]
    fn test_list_response_shape() {
        let response: ListResponse =
            serde_json::from_str(r#"{"items": [{"resource_id": 1}, {"resource_id": "two"}]}"#)
                .unwrap();
        assert_eq!(response.items.len(), 2);
    }
}
