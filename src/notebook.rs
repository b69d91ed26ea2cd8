use crate::auth::{AuthProvider, AuthState, DisabledAuthProvider, IdentityToolkitProvider};
use crate::config::{NotebookConfig, LOCAL_DB_FILE_NAME};
use crate::date_key::export_file_name;
use crate::db::LocalNoteStore;
use crate::enrichment::build_vocabulary_entry;
use crate::errors::{AppError, AppResult};
use crate::gateway::PersistenceGateway;
use crate::lookup::http::{http_client, ChatCompletionClient, DictionaryApiClient, LinkPreviewClient};
use crate::lookup::{word_prompt, ChatService, DictionaryService, LinkPreviewService};
use crate::models::{
    AuthStatus, ExampleStrategy, ExportFile, LinkEntry, LoadResponse, NoteRecord, SaveReceipt, StorageMode,
    VocabularyEntry,
};
use crate::redaction::Redactor;
use crate::remote::http::HttpDocumentBackend;
use crate::remote::memory::InMemoryDocumentBackend;
use crate::remote::{DocumentBackend, RemoteDocumentStore};
use crate::secrets::{SecretStore, AUTH_API_KEY_ENTRY, CHAT_API_KEY_ENTRY, LINK_PREVIEW_KEY_ENTRY};
use crate::session::{LoadTicket, NoteEditingSession};
use chrono::{Local, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Clone)]
pub struct LookupServices {
    pub dictionary: Arc<dyn DictionaryService>,
    pub link_preview: Option<Arc<dyn LinkPreviewService>>,
    pub chat: Arc<dyn ChatService>,
}

pub struct NotebookParts {
    pub local: Arc<LocalNoteStore>,
    pub remote: RemoteDocumentStore,
    pub auth_state: AuthState,
    pub auth_provider: Arc<dyn AuthProvider>,
    pub lookups: LookupServices,
    pub secrets: Option<SecretStore>,
    pub example_strategy: ExampleStrategy,
    pub default_mode: StorageMode,
    pub start_date: NaiveDate,
}

#[derive(Clone)]
pub struct NotebookCore {
    gateway: PersistenceGateway,
    session: NoteEditingSession,
    auth_state: AuthState,
    auth_provider: Arc<dyn AuthProvider>,
    lookups: LookupServices,
    secrets: Option<SecretStore>,
    example_strategy: ExampleStrategy,
    redactor: Redactor,
}

impl NotebookCore {
    pub fn from_parts(parts: NotebookParts) -> Self {
        let gateway = PersistenceGateway::new(parts.local, parts.remote, parts.auth_state.clone());
        Self {
            gateway,
            session: NoteEditingSession::new(parts.start_date, parts.default_mode),
            auth_state: parts.auth_state,
            auth_provider: parts.auth_provider,
            lookups: parts.lookups,
            secrets: parts.secrets,
            example_strategy: parts.example_strategy,
            redactor: Redactor::new(),
        }
    }

    pub async fn from_config(app_data_dir: &Path, config: &NotebookConfig) -> AppResult<Arc<Self>> {
        let secrets = SecretStore::default();
        let timeout = config.http_timeout();
        let client = http_client(timeout)?;
        let local = Arc::new(LocalNoteStore::open(&app_data_dir.join(LOCAL_DB_FILE_NAME))?);
        let auth_state = AuthState::new();

        let backend: Arc<dyn DocumentBackend> = match config.remote.base_url.as_deref() {
            Some(base_url) => Arc::new(HttpDocumentBackend::new(base_url, auth_state.clone(), timeout)?),
            None => {
                tracing::info!("no remote document service configured, remote notes stay in memory");
                Arc::new(InMemoryDocumentBackend::new())
            }
        };

        let auth_provider: Arc<dyn AuthProvider> = match config.auth.base_url.as_deref() {
            Some(base_url) => {
                let api_key = configured_or_stored(&secrets, config.auth.api_key.clone(), AUTH_API_KEY_ENTRY)
                    .await
                    .unwrap_or_default();
                Arc::new(IdentityToolkitProvider::new(base_url, &api_key, timeout)?)
            }
            None => Arc::new(DisabledAuthProvider),
        };

        let link_preview: Option<Arc<dyn LinkPreviewService>> = match config.link_preview.endpoint.as_deref() {
            Some(endpoint) => {
                let api_key =
                    configured_or_stored(&secrets, config.link_preview.api_key.clone(), LINK_PREVIEW_KEY_ENTRY).await;
                Some(Arc::new(LinkPreviewClient::new(client.clone(), endpoint, api_key)))
            }
            None => None,
        };
        let chat_key = configured_or_stored(&secrets, config.chat.api_key.clone(), CHAT_API_KEY_ENTRY).await;

        let core = Self::from_parts(NotebookParts {
            local,
            remote: RemoteDocumentStore::new(backend, config.remote.policy),
            auth_state,
            auth_provider,
            lookups: LookupServices {
                dictionary: Arc::new(DictionaryApiClient::new(
                    client.clone(),
                    &config.dictionary.base_url,
                    &config.dictionary.language,
                )),
                link_preview,
                chat: Arc::new(ChatCompletionClient::new(
                    client,
                    &config.chat.base_url,
                    &config.chat.model,
                    chat_key,
                )),
            },
            secrets: Some(secrets),
            example_strategy: config.enrichment.example_strategy,
            default_mode: config.default_storage_mode,
            start_date: Local::now().date_naive(),
        });
        core.restore_login().await;

        tracing::info!(
            mode = config.default_storage_mode.as_str(),
            remote_policy = config.remote.policy.as_str(),
            "notebook ready"
        );
        Ok(Arc::new(core))
    }

    pub async fn current_notes(&self) -> NoteRecord {
        self.session.snapshot().await.record
    }

    pub async fn storage_mode(&self) -> StorageMode {
        self.session.mode().await
    }

    pub async fn select_date(&self, date: NaiveDate) -> AppResult<LoadResponse> {
        let ticket = self.session.select_date(date).await;
        self.load_for(ticket).await
    }

    pub async fn reload(&self) -> AppResult<LoadResponse> {
        let ticket = self.session.begin_reload().await;
        self.load_for(ticket).await
    }

    async fn load_for(&self, ticket: LoadTicket) -> AppResult<LoadResponse> {
        let record = self
            .gateway
            .load(ticket.mode, ticket.date)
            .await
            .map_err(|error| self.report("load notes", &ticket.key, error))?;

        let applied = self.session.apply_loaded(&ticket, record).await;
        if !applied {
            tracing::debug!(key = %ticket.key, "discarded stale load response");
        }
        let current = self.session.snapshot().await;
        Ok(LoadResponse {
            key: current.key,
            mode: current.mode,
            applied,
            notes: current.record,
        })
    }

    pub async fn set_storage_mode(&self, mode: StorageMode) -> StorageMode {
        if self.session.set_mode(mode).await {
            tracing::info!(mode = mode.as_str(), "storage mode changed");
        }
        mode
    }

    /// Only a record loaded for the current key and mode may be written.
    pub async fn save(&self) -> AppResult<SaveReceipt> {
        let (ticket, snapshot) = self.session.checkout().await;
        if !snapshot.loaded {
            return Err(self.report(
                "save notes",
                &snapshot.key,
                AppError::Storage("current notes were not loaded; reload first".to_string()),
            ));
        }
        let persisted = self
            .gateway
            .save(snapshot.mode, snapshot.date, &snapshot.record)
            .await
            .map_err(|error| self.report("save notes", &snapshot.key, error))?;

        let saved_at = persisted.created_at.unwrap_or_else(Utc::now);
        if snapshot.mode == StorageMode::Remote {
            self.session
                .edit_if_current(&ticket, |record| {
                    record.date = persisted.date.clone();
                    record.created_at = persisted.created_at;
                    Ok(())
                })
                .await?;
        }

        Ok(SaveReceipt {
            key: snapshot.key,
            mode: snapshot.mode,
            saved_at,
        })
    }

    /// Looks `word` up and prepends the entry. `Ok(None)` when nothing was found
    /// or the lookup failed; the record is then unchanged.
    pub async fn add_vocabulary(&self, word: &str) -> AppResult<Option<VocabularyEntry>> {
        let word = word.trim();
        if word.is_empty() {
            return Err(AppError::InvalidInput("Word cannot be empty".to_string()));
        }
        let ticket = self.session.current_ticket().await;

        let entries = match self.lookups.dictionary.lookup(word).await {
            Ok(entries) => entries,
            Err(error) => {
                tracing::warn!(word = %word, error = %self.redactor.redact(&error.to_string()), "dictionary lookup failed");
                return Ok(None);
            }
        };
        let entry = match build_vocabulary_entry(word, &entries, self.example_strategy) {
            Ok(entry) => entry,
            Err(error) if error.is_benign() => {
                tracing::warn!(word = %word, error = %error, "no vocabulary entry added");
                return Ok(None);
            }
            Err(error) => return Err(error),
        };

        let added = self
            .session
            .edit_if_current(&ticket, |record| {
                record.prepend_vocabulary(entry.clone());
                Ok(())
            })
            .await?;
        if added.is_none() {
            tracing::debug!(word = %word, key = %ticket.key, "selection changed during lookup, entry dropped");
            return Ok(None);
        }
        Ok(Some(entry))
    }

    pub async fn select_meaning(&self, entry_index: usize, meaning_index: usize) -> AppResult<VocabularyEntry> {
        let strategy = self.example_strategy;
        self.session
            .edit(|record| {
                record
                    .select_meaning(entry_index, meaning_index, strategy)
                    .cloned()
            })
            .await
    }

    pub async fn delete_vocabulary(&self, entry_index: usize) -> AppResult<NoteRecord> {
        self.session
            .edit(|record| {
                record.remove_vocabulary(entry_index)?;
                Ok(record.clone())
            })
            .await
    }

    pub async fn set_text(&self, text: &str) -> AppResult<NoteRecord> {
        self.session
            .edit(|record| {
                record.set_text(text);
                Ok(record.clone())
            })
            .await
    }

    pub async fn clear_text(&self) -> AppResult<NoteRecord> {
        self.session
            .edit(|record| {
                record.clear_text();
                Ok(record.clone())
            })
            .await
    }

    pub async fn add_link(&self, url: &str) -> AppResult<Option<LinkEntry>> {
        let url = url.trim();
        if url.is_empty() {
            return Err(AppError::InvalidInput("Link URL cannot be empty".to_string()));
        }
        let ticket = self.session.current_ticket().await;

        let description = match &self.lookups.link_preview {
            Some(preview) => match preview.describe(url).await {
                Ok(description) => description,
                Err(error) => {
                    tracing::warn!(error = %self.redactor.redact(&error.to_string()), "link preview failed");
                    None
                }
            },
            None => None,
        };
        let link = LinkEntry {
            url: url.to_string(),
            description,
        };

        let added = self
            .session
            .edit_if_current(&ticket, |record| record.prepend_link(link.clone()))
            .await?;
        Ok(added.map(|_| link))
    }

    pub async fn delete_link(&self, link_index: usize) -> AppResult<NoteRecord> {
        self.session
            .edit(|record| {
                record.remove_link(link_index)?;
                Ok(record.clone())
            })
            .await
    }

    pub async fn lookup_in_chat(&self, word: &str) -> AppResult<String> {
        if word.trim().is_empty() {
            return Err(AppError::InvalidInput("Word cannot be empty".to_string()));
        }
        self.lookups
            .chat
            .complete(&word_prompt(word))
            .await
            .map_err(|error| {
                let message = self.redactor.redact(&error.to_string());
                tracing::warn!(error = %message, "chat lookup failed");
                AppError::Enrichment(message)
            })
    }

    pub async fn export_notes(&self) -> AppResult<ExportFile> {
        let snapshot = self.session.snapshot().await;
        Ok(ExportFile {
            file_name: export_file_name(snapshot.date),
            mime_type: "application/json".to_string(),
            contents: serde_json::to_string_pretty(&snapshot.record)?,
        })
    }

    pub async fn write_export(&self, dir: &Path) -> AppResult<PathBuf> {
        let export = self.export_notes().await?;
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&export.file_name);
        std::fs::write(&path, export.contents.as_bytes())?;
        tracing::info!(path = %path.display(), "notes exported");
        Ok(path)
    }

    pub async fn register(&self, email: &str, password: &str) -> AppResult<AuthStatus> {
        self.auth_provider
            .register(email, password)
            .await
            .map_err(|error| self.report("register", email, error))?;
        tracing::info!(email = %email, "account registered");
        Ok(self.auth_state.status().await)
    }

    pub async fn login(&self, email: &str, password: &str) -> AppResult<AuthStatus> {
        let session = self
            .auth_provider
            .login(email, password)
            .await
            .map_err(|error| self.report("login", email, error))?;

        if let Some(secrets) = &self.secrets {
            if let Err(error) = secrets.save_session(&session).await {
                tracing::warn!(error = %error, "failed to persist auth session");
            }
        }
        self.auth_state.sign_in(session).await;
        tracing::info!(email = %email, "logged in");
        Ok(self.auth_state.status().await)
    }

    pub async fn logout(&self) -> AppResult<AuthStatus> {
        if let Some(session) = self.auth_state.sign_out().await {
            if let Err(error) = self.auth_provider.logout(&session).await {
                tracing::warn!(error = %self.redactor.redact(&error.to_string()), "remote logout failed");
            }
        }
        if let Some(secrets) = &self.secrets {
            if let Err(error) = secrets.clear_session().await {
                tracing::warn!(error = %error, "failed to clear stored auth session");
            }
        }
        self.session.reset().await;
        tracing::info!("logged out");
        Ok(self.auth_state.status().await)
    }

    pub async fn auth_status(&self) -> AuthStatus {
        self.auth_state.status().await
    }

    pub async fn store_api_key(&self, entry: &str, value: &str) -> AppResult<()> {
        if ![CHAT_API_KEY_ENTRY, AUTH_API_KEY_ENTRY, LINK_PREVIEW_KEY_ENTRY].contains(&entry) {
            return Err(AppError::InvalidInput(format!("Unknown API key entry '{}'", entry)));
        }
        let Some(secrets) = &self.secrets else {
            return Err(AppError::Internal("No keyring is available".to_string()));
        };
        if value.trim().is_empty() {
            secrets.clear(entry).await?;
        } else {
            secrets.save(entry, value.trim()).await?;
        }
        tracing::info!(entry = entry, "api key updated");
        Ok(())
    }

    async fn restore_login(&self) {
        let Some(secrets) = &self.secrets else {
            return;
        };
        match secrets.load_session().await {
            Ok(Some(session)) => {
                tracing::info!(email = %session.email, "restored auth session");
                self.auth_state.sign_in(session).await;
            }
            Ok(None) => {}
            Err(error) => tracing::warn!(error = %error, "could not read stored auth session"),
        }
    }

    fn report(&self, action: &str, subject: &str, error: AppError) -> AppError {
        tracing::warn!(
            action = action,
            subject = %subject,
            error = %self.redactor.redact(&error.to_string()),
            "notebook operation failed"
        );
        error
    }
}

async fn configured_or_stored(secrets: &SecretStore, configured: Option<String>, entry: &str) -> Option<String> {
    if let Some(value) = configured.filter(|value| !value.trim().is_empty()) {
        return Some(value);
    }
    match secrets.load(entry).await {
        Ok(value) => value,
        Err(error) => {
            tracing::warn!(entry = entry, error = %error, "keyring lookup failed");
            None
        }
    }
}
