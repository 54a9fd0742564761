use std::sync::Arc;

use revanki_page::{current_headword, extract_card, inject};
use revanki_types::ExtractFailure;

use crate::events::update_control;
use crate::state::PageSession;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddOutcome {
    /// Window wider than the layout the page contract targets
    WrongLayout { width: u32 },
    NoSuchEntry(usize),
    /// Click on a button that is busy or already done
    Disabled(usize),
    ParseFailed(ExtractFailure),
    Added { word: String, duplicate: bool },
    Failed(String),
}

/// "+ Add to Anki" on one entry. Every failure ends in a toast and a
/// re-enabled button; nothing is returned as an error.
pub async fn handle_add_card(session: &mut PageSession, index: usize) -> AddOutcome {
    let config = Arc::clone(&session.config);
    let bridge = Arc::clone(&session.bridge);

    let entry = inject::entries(&session.doc).get(index).copied();
    let Some((entry, button)) =
        entry.and_then(|e| inject::add_button(&session.doc, e).map(|b| (e, b)))
    else {
        session
            .toaster
            .error(&mut session.doc, &format!("No card #{index} on this page"));
        return AddOutcome::NoSuchEntry(index);
    };

    // Saving or already saved, a disabled button takes no clicks
    if inject::is_disabled(&session.doc, button) {
        tracing::debug!("Add button of entry {index} is disabled, ignoring click");
        return AddOutcome::Disabled(index);
    }

    let width = session.doc.viewport_width();
    if !config.ui.viewport_supported(width) {
        let max = config.ui.max_width_px;
        session.toaster.error(
            &mut session.doc,
            &format!("⚠️ Wrong layout. Resize window to {max}px or less."),
        );
        tracing::warn!("Viewport width {width}px exceeds maximum {max}px");
        return AddOutcome::WrongLayout { width };
    }

    let previous_label = inject::label(&session.doc, button);
    update_control(&mut session.doc, Some(button), |doc, id| {
        inject::begin_busy(doc, id, "Saving...").map(drop)
    });
    session.toaster.info(&mut session.doc, "Saving to Anki...");

    let card = match extract_card(&session.doc, entry) {
        Ok(card) => card,
        Err(reason) => {
            session
                .toaster
                .error(&mut session.doc, &format!("Parse failed: {reason}"));
            update_control(&mut session.doc, Some(button), |doc, id| {
                inject::restore(doc, id, &previous_label)
            });
            return AddOutcome::ParseFailed(reason);
        }
    };

    // Added either way, the same word can carry several senses
    let duplicate = revanki_anki::has_duplicate(bridge.as_ref(), &config.anki, &card.word).await;

    if let Err(e) = revanki_anki::add_card(bridge.as_ref(), &config.anki, &card).await {
        session.toaster.error(&mut session.doc, &format!("Failed: {e}"));
        tracing::error!("Add failed: {e}");
        update_control(&mut session.doc, Some(button), |doc, id| {
            inject::restore(doc, id, &previous_label)
        });
        return AddOutcome::Failed(e.to_string());
    }

    let (message, done_label) = if duplicate {
        (
            format!("\"{}\" added to Anki (duplicate word, different meaning)", card.word),
            "✓ Added (duplicate)",
        )
    } else {
        (format!("\"{}\" added to Anki!", card.word), "✓ Added")
    };
    session.toaster.success(&mut session.doc, &message);
    update_control(&mut session.doc, Some(button), |doc, id| {
        inject::finish(doc, id, done_label)
    });

    let shows_word = current_headword(&session.doc)
        .is_some_and(|word| word.to_lowercase() == card.word.to_lowercase());
    if shows_word && let Err(e) = inject::show_status(&mut session.doc, true) {
        tracing::warn!("Could not flip status badge: {e}");
    }

    AddOutcome::Added {
        word: card.word,
        duplicate,
    }
}
