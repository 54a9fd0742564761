use std::sync::Arc;

use revanki_page::{current_headword, inject, selectors};

use crate::events::update_control;
use crate::state::PageSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgainOutcome {
    NoWord,
    /// Word not in the store, or a request already running
    Disabled,
    /// No card of the word in the store, nothing was graded
    NotFound { word: String },
    Marked { word: String, count: usize },
    Failed(String),
}

/// "Mark as again" next to the headword
pub async fn handle_mark_again(session: &mut PageSession) -> AgainOutcome {
    let config = Arc::clone(&session.config);
    let bridge = Arc::clone(&session.bridge);

    let Some(word) = current_headword(&session.doc) else {
        session
            .toaster
            .error(&mut session.doc, "Could not determine the current word");
        return AgainOutcome::NoWord;
    };

    let button = inject::again_button(&session.doc);
    if button.is_some_and(|id| inject::is_disabled(&session.doc, id)) {
        tracing::debug!("Mark as again button is disabled, ignoring click");
        return AgainOutcome::Disabled;
    }

    let previous_label = button
        .map(|id| inject::label(&session.doc, id))
        .unwrap_or_else(|| inject::AGAIN_LABEL.to_string());
    update_control(&mut session.doc, button, |doc, id| {
        inject::begin_busy(doc, id, "Marking...").map(drop)
    });
    session
        .toaster
        .info(&mut session.doc, &format!("Marking \"{word}\" as again..."));

    match revanki_anki::mark_again(bridge.as_ref(), &config.anki, &word).await {
        Ok(0) => {
            session
                .toaster
                .error(&mut session.doc, &format!("\"{word}\" not found in Anki"));
            update_control(&mut session.doc, button, |doc, id| {
                inject::restore(doc, id, &previous_label)
            });
            AgainOutcome::NotFound { word }
        }
        Ok(count) => {
            let suffix = if count > 1 {
                format!(" ({count} cards)")
            } else {
                String::new()
            };
            session
                .toaster
                .success(&mut session.doc, &format!("\"{word}\" marked as again{suffix}"));
            update_control(&mut session.doc, button, |doc, id| {
                inject::finish(doc, id, "✓ Marked as again")
            });
            AgainOutcome::Marked { word, count }
        }
        Err(e) => {
            session.toaster.error(&mut session.doc, &format!("Failed: {e}"));
            tracing::error!("Mark as again failed: {e}");
            update_control(&mut session.doc, button, |doc, id| {
                inject::restore(doc, id, &previous_label)?;
                doc.add_class(id, selectors::ERROR_CLASS)
            });
            AgainOutcome::Failed(e.to_string())
        }
    }
}
