use std::sync::Arc;

use revanki_anki::{AnkiBridge, PreflightError};
use revanki_config::anki::AnkiConfig;
use revanki_config::page::PageConfig;

use crate::events::start_observing;
use crate::state::PageSession;

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("Not on a Reverso definition page: {0}")]
    WrongPage(String),

    #[error("AnkiConnect not available. Is Anki running?")]
    Unavailable,

    #[error("Anki config error: {0}")]
    Config(PreflightError),
}

pub fn check_page(config: &PageConfig, url: &str) -> Result<(), StartupError> {
    if config.matches(url) {
        Ok(())
    } else {
        Err(StartupError::WrongPage(url.to_string()))
    }
}

/// Service reachable, deck, note type and fields present
pub async fn check_anki(bridge: &dyn AnkiBridge, config: &AnkiConfig) -> Result<(), StartupError> {
    revanki_anki::verify(bridge, config).await.map_err(|e| match e {
        PreflightError::Unavailable => StartupError::Unavailable,
        other => StartupError::Config(other),
    })
}

/// Preflight, then the first observer pass. On a failed preflight the page
/// only gets an error toast; no button or badge is added.
/// Returns the words whose status controls need a delayed repair.
pub async fn activate(session: &mut PageSession) -> Result<Vec<String>, StartupError> {
    let config = Arc::clone(&session.config);
    let bridge = Arc::clone(&session.bridge);

    if let Err(e) = check_anki(bridge.as_ref(), &config.anki).await {
        session.toaster.error(&mut session.doc, &e.to_string());
        return Err(e);
    }

    let pending_repairs = start_observing(session).await;
    session.toaster.success(&mut session.doc, "Reverso→Anki ready!");
    Ok(pending_repairs)
}
