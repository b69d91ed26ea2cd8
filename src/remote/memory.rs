use super::{created_at_of, DocumentBackend, RemoteDocument};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Clone)]
struct Slot {
    seq: u64,
    document: RemoteDocument,
}

#[derive(Debug, Default)]
struct Collections {
    by_name: HashMap<String, Vec<Slot>>,
    next_seq: u64,
    failing_writes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentBackend {
    inner: Arc<Mutex<Collections>>,
}

impl InMemoryDocumentBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn document_count(&self, collection: &str) -> usize {
        let inner = self.inner.lock().await;
        inner.by_name.get(collection).map(Vec::len).unwrap_or(0)
    }

    pub async fn raw_documents(&self, collection: &str) -> Vec<RemoteDocument> {
        let inner = self.inner.lock().await;
        inner
            .by_name
            .get(collection)
            .map(|slots| slots.iter().map(|slot| slot.document.clone()).collect())
            .unwrap_or_default()
    }

    pub async fn fail_next_writes(&self, count: usize) {
        let mut inner = self.inner.lock().await;
        inner.failing_writes = count;
    }

    fn take_failure(inner: &mut Collections) -> AppResult<()> {
        if inner.failing_writes > 0 {
            inner.failing_writes -= 1;
            return Err(AppError::Storage("document backend unreachable".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentBackend for InMemoryDocumentBackend {
    async fn add_document(&self, collection: &str, fields: Map<String, Value>) -> AppResult<String> {
        let mut inner = self.inner.lock().await;
        Self::take_failure(&mut inner)?;

        let id = Uuid::new_v4().to_string();
        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner
            .by_name
            .entry(collection.to_string())
            .or_default()
            .push(Slot {
                seq,
                document: RemoteDocument {
                    id: id.clone(),
                    fields,
                },
            });
        Ok(id)
    }

    async fn list_documents(&self, collection: &str) -> AppResult<Vec<RemoteDocument>> {
        let inner = self.inner.lock().await;
        let mut slots = inner.by_name.get(collection).cloned().unwrap_or_default();
        slots.sort_by(|left, right| {
            created_at_of(&right.document.fields)
                .cmp(&created_at_of(&left.document.fields))
                .then(right.seq.cmp(&left.seq))
        });
        Ok(slots.into_iter().map(|slot| slot.document).collect())
    }

    async fn delete_document(&self, collection: &str, id: &str) -> AppResult<()> {
        let mut inner = self.inner.lock().await;
        Self::take_failure(&mut inner)?;
        if let Some(slots) = inner.by_name.get_mut(collection) {
            slots.retain(|slot| slot.document.id != id);
        }
        Ok(())
    }
}
