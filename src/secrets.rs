use crate::auth::AuthSession;
use crate::errors::{AppError, AppResult};
use std::sync::Arc;
use tokio::sync::Mutex;

pub const KEYRING_SERVICE: &str = "daily-notebook";
pub const AUTH_SESSION_ENTRY: &str = "auth-session";
pub const CHAT_API_KEY_ENTRY: &str = "chat-api-key";
pub const AUTH_API_KEY_ENTRY: &str = "auth-api-key";
pub const LINK_PREVIEW_KEY_ENTRY: &str = "link-preview-api-key";

#[derive(Debug, Clone)]
pub struct SecretStore {
    service: String,
    lock: Arc<Mutex<()>>,
}

impl Default for SecretStore {
    fn default() -> Self {
        Self::new(KEYRING_SERVICE)
    }
}

impl SecretStore {
    pub fn new(service: &str) -> Self {
        Self {
            service: service.to_string(),
            lock: Arc::new(Mutex::new(())),
        }
    }

    pub async fn load(&self, name: &str) -> AppResult<Option<String>> {
        let _guard = self.lock.lock().await;
        let entry = keyring::Entry::new(&self.service, name)?;
        match entry.get_password() {
            Ok(value) if value.is_empty() => Ok(None),
            Ok(value) => Ok(Some(value)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    pub async fn save(&self, name: &str, value: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let entry = keyring::Entry::new(&self.service, name)?;
        entry.set_password(value)?;
        Ok(())
    }

    pub async fn clear(&self, name: &str) -> AppResult<()> {
        let _guard = self.lock.lock().await;
        let entry = keyring::Entry::new(&self.service, name)?;
        match entry.delete_credential() {
            Ok(_) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(error) => Err(AppError::Io(error.to_string())),
        }
    }

    pub async fn load_session(&self) -> AppResult<Option<AuthSession>> {
        match self.load(AUTH_SESSION_ENTRY).await? {
            Some(raw) => match serde_json::from_str::<AuthSession>(&raw) {
                Ok(session) => Ok(Some(session)),
                Err(error) => {
                    tracing::warn!(error = %error, "discarding unreadable stored auth session");
                    self.clear(AUTH_SESSION_ENTRY).await?;
                    Ok(None)
                }
            },
            None => Ok(None),
        }
    }

    pub async fn save_session(&self, session: &AuthSession) -> AppResult<()> {
        let raw = serde_json::to_string(session)?;
        self.save(AUTH_SESSION_ENTRY, &raw).await
    }

    pub async fn clear_session(&self) -> AppResult<()> {
        self.clear(AUTH_SESSION_ENTRY).await
    }
}
