pub mod http;
pub mod memory;

use crate::cleaning::{prepare_document, record_from_value};
use crate::errors::AppResult;
use crate::models::{NoteRecord, RemotePolicy, StoredNote};
use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const CREATED_FIELD: &str = "createdDatetime";

#[derive(Debug, Clone, PartialEq)]
pub struct RemoteDocument {
    pub id: String,
    pub fields: Map<String, Value>,
}

impl RemoteDocument {
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        created_at_of(&self.fields)
    }
}

pub fn created_at_of(fields: &Map<String, Value>) -> Option<DateTime<Utc>> {
    fields
        .get(CREATED_FIELD)
        .and_then(Value::as_str)
        .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
        .map(|moment| moment.with_timezone(&Utc))
}

#[async_trait]
pub trait DocumentBackend: Send + Sync {
    async fn add_document(&self, collection: &str, fields: Map<String, Value>) -> AppResult<String>;
    async fn list_documents(&self, collection: &str) -> AppResult<Vec<RemoteDocument>>;
    async fn delete_document(&self, collection: &str, id: &str) -> AppResult<()>;
}

/// Note-aware view over a [`DocumentBackend`] with an explicit save policy.
///
/// With [`RemotePolicy::AppendOnly`] every save grows the collection and the
/// newest document is the current one. With [`RemotePolicy::ReplaceAll`] the
/// new document is written first and all older ones are deleted afterwards, so
/// an interrupted save can leave a stale extra document but never an empty
/// collection.
#[derive(Clone)]
pub struct RemoteDocumentStore {
    backend: Arc<dyn DocumentBackend>,
    policy: RemotePolicy,
}

impl RemoteDocumentStore {
    pub fn new(backend: Arc<dyn DocumentBackend>, policy: RemotePolicy) -> Self {
        Self { backend, policy }
    }

    pub async fn append(&self, collection: &str, record: &NoteRecord) -> AppResult<StoredNote> {
        let mut stamped = record.clone();
        stamped.created_at = Some(Utc::now().trunc_subsecs(3));
        let fields = prepare_document(&stamped)?;

        let id = self.backend.add_document(collection, fields).await?;
        tracing::info!(
            collection = %collection,
            document_id = %id,
            policy = self.policy.as_str(),
            "remote note document written"
        );

        if self.policy == RemotePolicy::ReplaceAll {
            self.delete_all_except(collection, &id).await?;
        }

        Ok(StoredNote { id, record: stamped })
    }

    pub async fn list_ordered(&self, collection: &str) -> AppResult<Vec<StoredNote>> {
        let mut documents = self.backend.list_documents(collection).await?;
        documents.sort_by(|left, right| right.created_at().cmp(&left.created_at()));

        documents
            .into_iter()
            .map(|document| {
                let record = record_from_value(Value::Object(document.fields))?;
                Ok(StoredNote {
                    id: document.id,
                    record,
                })
            })
            .collect()
    }

    pub async fn latest(&self, collection: &str) -> AppResult<Option<StoredNote>> {
        Ok(self.list_ordered(collection).await?.into_iter().next())
    }

    async fn delete_all_except(&self, collection: &str, keep_id: &str) -> AppResult<()> {
        let existing = self.backend.list_documents(collection).await?;
        let mut removed = 0usize;
        for document in existing.iter().filter(|document| document.id != keep_id) {
            self.backend.delete_document(collection, &document.id).await?;
            removed += 1;
        }
        if removed > 0 {
            tracing::debug!(collection = %collection, removed, "cleared superseded note documents");
        }
        Ok(())
    }
}
