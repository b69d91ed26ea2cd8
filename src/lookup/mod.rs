pub mod http;

use crate::errors::AppResult;
use crate::models::Meaning;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DictionaryEntry {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub phonetic: Option<String>,
    #[serde(default)]
    pub phonetics: Vec<Phonetic>,
    #[serde(default)]
    pub meanings: Vec<Meaning>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phonetic {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub audio: Option<String>,
}

#[async_trait]
pub trait DictionaryService: Send + Sync {
    async fn lookup(&self, word: &str) -> AppResult<Vec<DictionaryEntry>>;
}

#[async_trait]
pub trait LinkPreviewService: Send + Sync {
    async fn describe(&self, url: &str) -> AppResult<Option<String>>;
}

#[async_trait]
pub trait ChatService: Send + Sync {
    async fn complete(&self, prompt: &str) -> AppResult<String>;
}

pub fn word_prompt(word: &str) -> String {
    format!(
        "Tell me about the word \"{}\". Provide usage examples and definitions.",
        word.trim()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_dictionary_payload_shape() {
        let raw = r#"[{
            "word": "hello",
            "phonetics": [{ "audio": "https://audio.example/hello.mp3" }, { "text": "/həˈləʊ/" }],
            "meanings": [{
                "partOfSpeech": "exclamation",
                "definitions": [{ "definition": "used as a greeting", "example": "hello there", "synonyms": [] }],
                "antonyms": []
            }],
            "license": { "name": "CC BY-SA 3.0" }
        }]"#;
        let entries: Vec<DictionaryEntry> = serde_json::from_str(raw).expect("parse");
        assert_eq!(entries[0].phonetic, None);
        assert_eq!(entries[0].phonetics[1].text.as_deref(), Some("/həˈləʊ/"));
        assert_eq!(entries[0].meanings[0].part_of_speech, "exclamation");
        assert_eq!(
            entries[0].meanings[0].definitions[0].example.as_deref(),
            Some("hello there")
        );
    }

    #[test]
    fn prompt_quotes_trimmed_word() {
        assert_eq!(
            word_prompt(" serendipity "),
            "Tell me about the word \"serendipity\". Provide usage examples and definitions."
        );
    }
}
