use revanki_config::anki::AnkiConfig;
use serde_json::json;

use crate::client::{AnkiBridge, BridgeError};
use crate::call;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PreflightError {
    #[error("AnkiConnect not available. Is Anki running?")]
    Unavailable,

    #[error("Deck \"{0}\" not found")]
    MissingDeck(String),

    #[error("Note Type \"{0}\" not found")]
    MissingModel(String),

    #[error("Fields not found in Note Type: {}", .0.join(", "))]
    MissingFields(Vec<String>),

    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

/// Capability probe
pub async fn check_connection(bridge: &dyn AnkiBridge) -> Result<u32, BridgeError> {
    call(bridge, "version", json!({})).await
}

/// Verify the configured deck, note type and mapped fields exist.
/// Runs once before the page is observed.
pub async fn verify(bridge: &dyn AnkiBridge, config: &AnkiConfig) -> Result<(), PreflightError> {
    if let Err(e) = check_connection(bridge).await {
        tracing::error!("AnkiConnect probe failed: {e}");
        return Err(PreflightError::Unavailable);
    }

    let decks: Vec<String> = call(bridge, "deckNames", json!({})).await?;
    if !decks.contains(&config.deck) {
        return Err(PreflightError::MissingDeck(config.deck.clone()));
    }

    let models: Vec<String> = call(bridge, "modelNames", json!({})).await?;
    if !models.contains(&config.model) {
        return Err(PreflightError::MissingModel(config.model.clone()));
    }

    let fields: Vec<String> =
        call(bridge, "modelFieldNames", json!({ "modelName": config.model })).await?;

    let missing: Vec<String> = config
        .field_mapping
        .field_names()
        .into_iter()
        .filter(|name| !fields.iter().any(|f| f == name))
        .map(str::to_string)
        .collect();

    if !missing.is_empty() {
        return Err(PreflightError::MissingFields(missing));
    }

    tracing::info!(
        "AnkiConnect config verified: deck={}, model={}",
        config.deck,
        config.model
    );
    Ok(())
}
