use std::env;

use serde::{Deserialize, Serialize};

use crate::env_parse;

fn default_url() -> String {
    "http://127.0.0.1:8765".to_string()
}

fn default_deck() -> String {
    "Fluent English".to_string()
}

fn default_model() -> String {
    "Word+Example+Definition".to_string()
}

fn default_tags() -> Vec<String> {
    vec![
        "reverso".to_string(),
        "reverso::english-definition".to_string(),
        "needs_tts".to_string(),
    ]
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(default)]
pub struct AnkiConfig {
    /// AnkiConnect URL
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default = "default_deck")]
    pub deck: String,
    /// Note type name
    #[serde(default = "default_model")]
    pub model: String,
    pub field_mapping: FieldMapping,
    /// Tags applied to every new note
    #[serde(default = "default_tags")]
    pub tags: Vec<String>,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for AnkiConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            deck: default_deck(),
            model: default_model(),
            field_mapping: FieldMapping::default(),
            tags: default_tags(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

impl AnkiConfig {
    pub fn new() -> Self {
        let defaults = Self::default();

        let tags = env::var("ANKI_TAGS")
            .ok()
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|t| !t.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or(defaults.tags);

        Self {
            url: env::var("ANKI_CONNECT_URL").unwrap_or(defaults.url),
            deck: env::var("ANKI_DECK").unwrap_or(defaults.deck),
            model: env::var("ANKI_MODEL").unwrap_or(defaults.model),
            field_mapping: defaults.field_mapping,
            tags,
            timeout_ms: env_parse("ANKI_TIMEOUT_MS").unwrap_or(defaults.timeout_ms),
        }
    }
}

/// Note type field names each part of a card is written to
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(default)]
pub struct FieldMapping {
    pub word: String,
    pub definition: String,
    pub example: String,
    /// Translation side
    pub back: String,
    /// Left empty, filled later by a TTS add-on
    pub audio: String,
}

impl Default for FieldMapping {
    fn default() -> Self {
        Self {
            word: "Word".to_string(),
            definition: "Definition".to_string(),
            example: "Example".to_string(),
            back: "Back".to_string(),
            audio: "Audio".to_string(),
        }
    }
}

impl FieldMapping {
    pub fn field_names(&self) -> [&str; 5] {
        [
            self.word.as_str(),
            self.definition.as_str(),
            self.example.as_str(),
            self.back.as_str(),
            self.audio.as_str(),
        ]
    }
}
