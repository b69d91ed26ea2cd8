use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::errors::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StorageMode {
    Local,
    Remote,
}

impl StorageMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
        }
    }
}

impl Default for StorageMode {
    fn default() -> Self {
        Self::Local
    }
}

impl FromStr for StorageMode {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "remote" => Ok(Self::Remote),
            other => Err(AppError::InvalidInput(format!("Unknown storage mode '{}'", other))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RemotePolicy {
    AppendOnly,
    ReplaceAll,
}

impl RemotePolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::AppendOnly => "append-only",
            Self::ReplaceAll => "replace-all",
        }
    }
}

impl Default for RemotePolicy {
    fn default() -> Self {
        Self::ReplaceAll
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExampleStrategy {
    UpToThree,
    FirstOnly,
}

impl ExampleStrategy {
    pub fn cap(self) -> usize {
        match self {
            Self::UpToThree => 3,
            Self::FirstOnly => 1,
        }
    }
}

impl Default for ExampleStrategy {
    fn default() -> Self {
        Self::UpToThree
    }
}

/// All notes recorded for one calendar date.
///
/// `date` and `created_at` are only stamped on documents written to the remote
/// store; local entries carry the three note fields alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, rename = "createdDatetime", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub vocabulary: Vec<VocabularyEntry>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub link: Vec<LinkEntry>,
}

impl NoteRecord {
    pub fn is_empty(&self) -> bool {
        self.vocabulary.is_empty() && self.text.is_empty() && self.link.is_empty()
    }

    pub fn body(&self) -> Self {
        Self {
            date: None,
            created_at: None,
            vocabulary: self.vocabulary.clone(),
            text: self.text.clone(),
            link: self.link.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyEntry {
    pub vocab: String,
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub pronunciation: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio: Option<String>,
    #[serde(default)]
    pub definitions: Vec<String>,
    #[serde(default)]
    pub examples: Vec<String>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
    #[serde(default)]
    pub selected_meaning: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meaning {
    #[serde(default)]
    pub part_of_speech: String,
    #[serde(default)]
    pub definitions: Vec<Sense>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sense {
    #[serde(default)]
    pub definition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub example: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkEntry {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredNote {
    pub id: String,
    pub record: NoteRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadResponse {
    pub key: String,
    pub mode: StorageMode,
    pub applied: bool,
    pub notes: NoteRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveReceipt {
    pub key: String,
    pub mode: StorageMode,
    pub saved_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub file_name: String,
    pub mime_type: String,
    pub contents: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthStatus {
    pub authenticated: bool,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanResponse {
    pub success: bool,
}
