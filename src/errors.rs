use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("STORAGE_FAILURE: {0}")]
    Storage(String),
    #[error("AUTH_REQUIRED: {0}")]
    AuthRequired(String),
    #[error("NOT_FOUND: {0}")]
    NotFound(String),
    #[error("ENRICHMENT_FAILED: {0}")]
    Enrichment(String),
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),
    #[error("IO_FAILURE: {0}")]
    Io(String),
    #[error("INTERNAL: {0}")]
    Internal(String),
}

impl AppError {
    pub fn is_benign(&self) -> bool {
        matches!(self, Self::NotFound(_) | Self::Enrichment(_))
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<reqwest::Error> for AppError {
    fn from(value: reqwest::Error) -> Self {
        Self::Storage(value.to_string())
    }
}

impl From<keyring::Error> for AppError {
    fn from(value: keyring::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Internal(value.to_string())
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::AppError;

    #[test]
    fn error_codes_prefix_messages() {
        let error = AppError::AuthRequired("log in first".to_string());
        assert_eq!(error.to_string(), "AUTH_REQUIRED: log in first");
        assert!(!error.is_benign());
        assert!(AppError::Enrichment("no entries".to_string()).is_benign());
    }

    #[test]
    fn serde_failures_map_to_storage() {
        let parse = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(AppError::from(parse), AppError::Storage(_)));
    }
}
