use super::{ChatService, DictionaryEntry, DictionaryService, LinkPreviewService};
use crate::errors::{AppError, AppResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub fn http_client(timeout: Duration) -> AppResult<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("daily-notebook/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|error| AppError::Internal(format!("HTTP client build failed: {}", error)))
}

fn lookup_error(what: &str, error: reqwest::Error) -> AppError {
    AppError::Enrichment(format!("{} request failed: {}", what, error.without_url()))
}

/// `GET {base}/api/v2/entries/{language}/{word}`; a 404 means no entries.
#[derive(Debug, Clone)]
pub struct DictionaryApiClient {
    client: Client,
    base_url: String,
    language: String,
}

impl DictionaryApiClient {
    pub fn new(client: Client, base_url: &str, language: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            language: language.to_string(),
        }
    }
}

#[async_trait]
impl DictionaryService for DictionaryApiClient {
    async fn lookup(&self, word: &str) -> AppResult<Vec<DictionaryEntry>> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|error| AppError::Internal(format!("Invalid dictionary URL: {}", error)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Internal("Dictionary URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["api", "v2", "entries", self.language.as_str(), word.trim()]);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|error| lookup_error("Dictionary", error))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        if !response.status().is_success() {
            return Err(AppError::Enrichment(format!(
                "Dictionary returned HTTP {}",
                response.status()
            )));
        }
        response
            .json::<Vec<DictionaryEntry>>()
            .await
            .map_err(|error| lookup_error("Dictionary", error))
    }
}

#[derive(Debug, Clone)]
pub struct LinkPreviewClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkPreview {
    #[serde(default)]
    description: Option<String>,
}

impl LinkPreviewClient {
    pub fn new(client: Client, endpoint: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl LinkPreviewService for LinkPreviewClient {
    async fn describe(&self, url: &str) -> AppResult<Option<String>> {
        let mut request = self.client.get(&self.endpoint);
        if let Some(key) = &self.api_key {
            request = request.query(&[("key", key.as_str())]);
        }
        let response = request
            .query(&[("q", url)])
            .send()
            .await
            .map_err(|error| lookup_error("Link preview", error))?;
        if !response.status().is_success() {
            return Err(AppError::Enrichment(format!(
                "Link preview returned HTTP {}",
                response.status()
            )));
        }
        let preview: LinkPreview = response
            .json()
            .await
            .map_err(|error| lookup_error("Link preview", error))?;
        Ok(preview.description.filter(|text| !text.trim().is_empty()))
    }
}

#[derive(Debug, Clone)]
pub struct ChatCompletionClient {
    client: Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: String,
}

impl ChatCompletionClient {
    pub fn new(client: Client, base_url: &str, model: &str, api_key: Option<String>) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl ChatService for ChatCompletionClient {
    async fn complete(&self, prompt: &str) -> AppResult<String> {
        let Some(api_key) = self.api_key.as_deref() else {
            return Err(AppError::Enrichment("No chat API key configured".to_string()));
        };
        let response = self
            .client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&ChatRequest {
                model: &self.model,
                messages: vec![ChatMessage {
                    role: "user",
                    content: prompt,
                }],
            })
            .send()
            .await
            .map_err(|error| lookup_error("Chat", error))?;
        if !response.status().is_success() {
            return Err(AppError::Enrichment(format!("Chat returned HTTP {}", response.status())));
        }
        let body: ChatResponse = response.json().await.map_err(|error| lookup_error("Chat", error))?;
        body.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AppError::Enrichment("Chat returned no content".to_string()))
    }
}
