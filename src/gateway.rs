use crate::auth::AuthState;
use crate::date_key::{date_key, storage_key};
use crate::db::LocalNoteStore;
use crate::errors::{AppError, AppResult};
use crate::models::{NoteRecord, StorageMode};
use crate::remote::RemoteDocumentStore;
use chrono::NaiveDate;
use std::sync::Arc;

#[derive(Clone)]
pub struct PersistenceGateway {
    local: Arc<LocalNoteStore>,
    remote: RemoteDocumentStore,
    auth: AuthState,
}

impl PersistenceGateway {
    pub fn new(local: Arc<LocalNoteStore>, remote: RemoteDocumentStore, auth: AuthState) -> Self {
        Self { local, remote, auth }
    }

    pub async fn load(&self, mode: StorageMode, date: NaiveDate) -> AppResult<NoteRecord> {
        let key = storage_key(date);
        let loaded = match mode {
            StorageMode::Local => self.local.get(&key)?,
            StorageMode::Remote => self.remote.latest(&key).await?.map(|stored| stored.record),
        };

        match loaded {
            Some(record) => {
                tracing::debug!(key = %key, mode = mode.as_str(), "loaded notes");
                Ok(record)
            }
            None => {
                tracing::debug!(key = %key, mode = mode.as_str(), "no stored notes, starting empty");
                Ok(NoteRecord::default())
            }
        }
    }

    /// Writes the whole record. Remote writes require a signed-in user and are
    /// stamped with the date and a fresh creation time.
    pub async fn save(&self, mode: StorageMode, date: NaiveDate, record: &NoteRecord) -> AppResult<NoteRecord> {
        record.validate()?;
        let key = storage_key(date);
        match mode {
            StorageMode::Local => {
                self.local.put(&key, record)?;
                tracing::info!(key = %key, "notes saved locally");
                Ok(record.body())
            }
            StorageMode::Remote => {
                if !self.auth.is_authenticated().await {
                    return Err(AppError::AuthRequired(
                        "You must be logged in to save notes remotely".to_string(),
                    ));
                }
                let mut stamped = record.body();
                stamped.date = Some(date_key(date));
                let stored = self.remote.append(&key, &stamped).await?;
                Ok(stored.record)
            }
        }
    }
}
