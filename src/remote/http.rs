use super::{DocumentBackend, RemoteDocument, CREATED_FIELD};
use crate::auth::AuthState;
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::time::Duration;

/// JSON document service reached over HTTP.
///
/// Routes:
/// - `POST   {base}/v1/collections/{collection}/documents` -> `{"id": ...}`
/// - `GET    {base}/v1/collections/{collection}/documents?orderBy=createdDatetime&direction=desc`
///   -> `{"documents": [{"id": ..., "fields": {...}}]}`
/// - `DELETE {base}/v1/collections/{collection}/documents/{id}`
///
/// Requests carry the signed-in user's id token as a bearer token when present.
#[derive(Debug, Clone)]
pub struct HttpDocumentBackend {
    client: Client,
    base_url: String,
    auth: AuthState,
}

#[derive(Debug, Deserialize)]
struct CreatedDocument {
    id: String,
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<WireDocument>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    id: String,
    #[serde(default)]
    fields: Map<String, Value>,
}

impl HttpDocumentBackend {
    pub fn new(base_url: &str, auth: AuthState, timeout: Duration) -> AppResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("HTTP client build failed: {}", error)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            auth,
        })
    }

    fn collection_url(&self, collection: &str) -> AppResult<String> {
        validate_collection_name(collection)?;
        Ok(format!("{}/v1/collections/{}/documents", self.base_url, collection))
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match self.auth.bearer_token().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }
}

fn validate_collection_name(collection: &str) -> AppResult<()> {
    let valid = !collection.is_empty()
        && collection
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!("Invalid collection name '{}'", collection)))
    }
}

async fn ensure_success(response: Response, action: &str) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Storage(format!(
        "{} failed with HTTP {}: {}",
        action,
        status,
        body.chars().take(200).collect::<String>()
    )))
}

#[async_trait]
impl DocumentBackend for HttpDocumentBackend {
    async fn add_document(&self, collection: &str, fields: Map<String, Value>) -> AppResult<String> {
        let url = self.collection_url(collection)?;
        let request = self.authorized(self.client.post(&url).json(&fields)).await;
        let response = ensure_success(request.send().await?, "add document").await?;
        let created: CreatedDocument = response.json().await?;
        Ok(created.id)
    }

    async fn list_documents(&self, collection: &str) -> AppResult<Vec<RemoteDocument>> {
        let url = self.collection_url(collection)?;
        let request = self
            .authorized(
                self.client
                    .get(&url)
                    .query(&[("orderBy", CREATED_FIELD), ("direction", "desc")]),
            )
            .await;
        let response = request.send().await?;
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let response = ensure_success(response, "list documents").await?;
        let listed: DocumentList = response.json().await?;
        Ok(listed
            .documents
            .into_iter()
            .map(|document| RemoteDocument {
                id: document.id,
                fields: document.fields,
            })
            .collect())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> AppResult<()> {
        let url = format!("{}/{}", self.collection_url(collection)?, id);
        let request = self.authorized(self.client.delete(&url)).await;
        ensure_success(request.send().await?, "delete document").await?;
        Ok(())
    }
}
