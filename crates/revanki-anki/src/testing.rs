//! In-memory bridge for tests

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use revanki_config::anki::AnkiConfig;
use serde_json::{Value, json};

use crate::client::{AnkiBridge, BridgeError};

/// Answers each action with a canned result and records every call
#[derive(Default)]
pub struct FakeBridge {
    responses: Mutex<HashMap<String, Result<Value, BridgeError>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl FakeBridge {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store where the configured deck, note type and fields all exist
    /// and no word has cards yet
    pub fn healthy(config: &AnkiConfig) -> Self {
        let bridge = Self::new();
        bridge.respond("version", json!(6));
        bridge.respond("deckNames", json!(["Default", config.deck]));
        bridge.respond("modelNames", json!(["Basic", config.model]));
        bridge.respond("modelFieldNames", json!(config.field_mapping.field_names()));
        bridge.respond("findNotes", json!([]));
        bridge.respond("findCards", json!([]));
        bridge.respond("addNote", json!(1_700_000_000_000u64));
        bridge.respond("answerCards", json!([true]));
        bridge
    }

    pub fn respond(&self, action: &str, result: Value) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(action.to_string(), Ok(result));
    }

    pub fn fail(&self, action: &str, error: BridgeError) {
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(action.to_string(), Err(error));
    }

    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn called(&self, action: &str) -> bool {
        self.calls().iter().any(|(a, _)| a == action)
    }

    pub fn call_count(&self, action: &str) -> usize {
        self.calls().iter().filter(|(a, _)| a == action).count()
    }

    pub fn last_call(&self, action: &str) -> Option<(String, Value)> {
        self.calls().into_iter().rev().find(|(a, _)| a == action)
    }
}

#[async_trait::async_trait]
impl AnkiBridge for FakeBridge {
    async fn invoke(&self, action: &str, params: Value) -> Result<Value, BridgeError> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((action.to_string(), params));

        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(action)
            .cloned()
            .unwrap_or_else(|| Err(BridgeError::Remote("unsupported action".to_string())))
    }
}
