use crate::errors::{AppError, AppResult};
use crate::models::AuthStatus;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub user_id: String,
    pub email: String,
    pub id_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn register(&self, email: &str, password: &str) -> AppResult<AuthSession>;
    async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession>;
    async fn logout(&self, _session: &AuthSession) -> AppResult<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthState {
    current: Arc<RwLock<Option<AuthSession>>>,
}

impl AuthState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn is_authenticated(&self) -> bool {
        self.current.read().await.is_some()
    }

    pub async fn bearer_token(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|session| session.id_token.clone())
    }

    pub async fn sign_in(&self, session: AuthSession) {
        let mut writer = self.current.write().await;
        *writer = Some(session);
    }

    pub async fn sign_out(&self) -> Option<AuthSession> {
        let mut writer = self.current.write().await;
        writer.take()
    }

    pub async fn status(&self) -> AuthStatus {
        let reader = self.current.read().await;
        AuthStatus {
            authenticated: reader.is_some(),
            email: reader.as_ref().map(|session| session.email.clone()),
        }
    }
}

pub fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
    let email = email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::InvalidInput("A valid email address is required".to_string()));
    }
    if password.is_empty() {
        return Err(AppError::InvalidInput("Password cannot be empty".to_string()));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAuthProvider;

#[async_trait]
impl AuthProvider for DisabledAuthProvider {
    async fn register(&self, _email: &str, _password: &str) -> AppResult<AuthSession> {
        Err(AppError::AuthRequired("No accounts service is configured".to_string()))
    }

    async fn login(&self, _email: &str, _password: &str) -> AppResult<AuthSession> {
        Err(AppError::AuthRequired("No accounts service is configured".to_string()))
    }
}

#[derive(Debug, Clone)]
pub struct IdentityToolkitProvider {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CredentialRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CredentialResponse {
    local_id: String,
    email: String,
    id_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

impl IdentityToolkitProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|error| AppError::Internal(format!("HTTP client build failed: {}", error)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    async fn exchange(&self, action: &str, email: &str, password: &str) -> AppResult<AuthSession> {
        validate_credentials(email, password)?;
        let url = format!("{}/v1/accounts:{}", self.base_url, action);
        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&CredentialRequest {
                email: email.trim(),
                password,
                return_secure_token: true,
            })
            .send()
            .await
            .map_err(|error| AppError::Io(format!("Auth request failed: {}", error.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorEnvelope>()
                .await
                .map(|envelope| envelope.error.message)
                .unwrap_or_else(|_| status.to_string());
            return Err(AppError::AuthRequired(format!("{} rejected: {}", action, message)));
        }

        let body: CredentialResponse = response
            .json()
            .await
            .map_err(|error| AppError::Io(format!("Malformed auth response: {}", error.without_url())))?;
        Ok(AuthSession {
            user_id: body.local_id,
            email: body.email,
            id_token: body.id_token,
            refresh_token: body.refresh_token,
        })
    }
}

#[async_trait]
impl AuthProvider for IdentityToolkitProvider {
    async fn register(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        self.exchange("signUp", email, password).await
    }

    async fn login(&self, email: &str, password: &str) -> AppResult<AuthSession> {
        self.exchange("signInWithPassword", email, password).await
    }
}
