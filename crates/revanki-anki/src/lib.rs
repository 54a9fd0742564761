mod client;
mod note;
mod preflight;
#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use client::{API_VERSION, AnkiBridge, AnkiConnectClient, BridgeError};
pub use note::{add_note_params, duplicate_query, note_fields, word_query};
pub use preflight::{PreflightError, check_connection, verify};

use std::collections::HashSet;

use revanki_config::anki::AnkiConfig;
use revanki_types::Card;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

/// "Again" in AnkiConnect's answerCards
const EASE_AGAIN: u8 = 1;

/// Invoke an action and decode its result
pub(crate) async fn call<T>(bridge: &dyn AnkiBridge, action: &str, params: Value) -> Result<T, BridgeError>
where
    T: DeserializeOwned,
{
    let result = bridge.invoke(action, params).await?;
    serde_json::from_value(result).map_err(|e| {
        tracing::warn!("Unexpected result shape for {action}: {e}");
        BridgeError::BadResponse
    })
}

/// Add a card as a new note, returns the note id
pub async fn add_card(bridge: &dyn AnkiBridge, config: &AnkiConfig, card: &Card) -> Result<u64, BridgeError> {
    let note_id: u64 = call(bridge, "addNote", add_note_params(config, card)).await?;
    tracing::info!("Added note to Anki: note_id={note_id}, word={}", card.word);
    Ok(note_id)
}

/// Whether the deck already mentions the word. Only used for messaging,
/// a failed search counts as no duplicate.
pub async fn has_duplicate(bridge: &dyn AnkiBridge, config: &AnkiConfig, word: &str) -> bool {
    let query = duplicate_query(config, word);
    match call::<Vec<u64>>(bridge, "findNotes", json!({ "query": query })).await {
        Ok(ids) => !ids.is_empty(),
        Err(e) => {
            tracing::warn!("Duplicate check failed for {word:?}: {e}");
            false
        }
    }
}

pub async fn find_card_ids(bridge: &dyn AnkiBridge, config: &AnkiConfig, word: &str) -> Result<Vec<u64>, BridgeError> {
    let query = word_query(config, word);
    call(bridge, "findCards", json!({ "query": query })).await
}

/// Whether the word has cards in the store, search errors count as absent
pub async fn word_exists(bridge: &dyn AnkiBridge, config: &AnkiConfig, word: &str) -> bool {
    match find_card_ids(bridge, config, word).await {
        Ok(ids) => !ids.is_empty(),
        Err(e) => {
            tracing::error!("Error checking {word:?} in Anki: {e}");
            false
        }
    }
}

/// Grade every card of the word as "again". Returns how many were answered;
/// nothing is sent when no card matches.
pub async fn mark_again(bridge: &dyn AnkiBridge, config: &AnkiConfig, word: &str) -> Result<usize, BridgeError> {
    let card_ids = find_card_ids(bridge, config, word).await?;

    let mut seen = HashSet::new();
    let answers: Vec<Value> = card_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .map(|id| json!({ "cardId": id, "ease": EASE_AGAIN }))
        .collect();

    if answers.is_empty() {
        return Ok(0);
    }

    let count = answers.len();
    bridge
        .invoke("answerCards", json!({ "answers": answers }))
        .await?;

    tracing::info!("Marked {count} card(s) of {word:?} as again");
    Ok(count)
}
