use std::sync::Arc;
use std::time::{Duration, Instant};

use kanal::{AsyncReceiver, AsyncSender};
use revanki_page::{Document, DomError, NodeId};
use revanki_types::AppEvent;

use crate::state::PageSession;

pub mod add_card;
pub mod mark_again;

use add_card::handle_add_card;
use mark_again::handle_mark_again;

/// Page event loop. One event at a time; the page is settled after each one.
pub async fn event_loop(
    mut session: PageSession,
    events_rx: AsyncReceiver<AppEvent>,
    events_tx: AsyncSender<AppEvent>,
) -> anyhow::Result<()> {
    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let Ok(event) = events_rx.recv().await else {
            tracing::info!("[EVENT_LOOP] Event channel closed");
            break;
        };
        if matches!(event, AppEvent::Shutdown) {
            tracing::info!("[EVENT_LOOP] Shutdown requested");
            break;
        }

        handle_event(&mut session, event).await;

        let delay = session.repair_delay();
        for word in settle(&mut session).await {
            schedule_repair(&events_tx, word, delay);
        }
    }

    Ok(())
}

async fn handle_event(session: &mut PageSession, event: AppEvent) {
    match event {
        AppEvent::PageSnapshot(html) => {
            tracing::debug!("Host page re-rendered ({} bytes)", html.len());
            session.doc.replace_body(&html);
        }
        AppEvent::AddCard { entry } => {
            let outcome = handle_add_card(session, entry).await;
            tracing::debug!("Add entry {entry}: {outcome:?}");
        }
        AppEvent::MarkAgain => {
            let outcome = handle_mark_again(session).await;
            tracing::debug!("Mark as again: {outcome:?}");
        }
        AppEvent::RepairDue { word } => {
            if session.observer.repair_due(&session.doc, &word) {
                refresh_status(session, &word).await;
            } else {
                tracing::debug!("Skipping repair for {word:?}, page moved on");
            }
        }
        AppEvent::Tick => {
            session.toaster.expire(&mut session.doc, Instant::now());
        }
        AppEvent::Shutdown => {}
    }
}

/// First pass over a loaded page: buttons, then the headword's status
pub async fn start_observing(session: &mut PageSession) -> Vec<String> {
    match session.observer.start(&mut session.doc) {
        Ok(reaction) => {
            if let Some(word) = reaction.check_word {
                refresh_status(session, &word).await;
            } else {
                tracing::info!("Could not extract current word");
            }
        }
        Err(e) => tracing::error!("Observer start failed: {e}"),
    }

    settle(session).await
}

/// Feed pending mutation records to the observer until none are left, then
/// free what they removed. Returns the words whose status controls need a
/// delayed repair.
pub async fn settle(session: &mut PageSession) -> Vec<String> {
    let mut repairs = Vec::new();

    loop {
        let records = session.doc.take_records();
        if records.is_empty() {
            break;
        }

        match session.observer.on_mutations(&mut session.doc, &records) {
            Ok(reaction) => {
                repairs.extend(reaction.schedule_repair);
                if let Some(word) = reaction.check_word {
                    refresh_status(session, &word).await;
                }
            }
            Err(e) => tracing::error!("Mutation pass failed: {e}"),
        }
    }

    // Removed subtrees are only needed while their records are handled
    let freed = session.doc.collect_detached();
    if freed > 0 {
        tracing::trace!("Freed {freed} detached node(s)");
    }

    repairs
}

/// Look the word up in the store and update the badge
pub async fn refresh_status(session: &mut PageSession, word: &str) {
    tracing::info!("Checking if word exists in Anki: {word}");

    let bridge = Arc::clone(&session.bridge);
    let exists = revanki_anki::word_exists(bridge.as_ref(), &session.config.anki, word).await;

    if let Err(e) = session.observer.apply_status(&mut session.doc, word, exists) {
        tracing::error!("Could not update status for {word:?}: {e}");
    }
}

fn schedule_repair(events_tx: &AsyncSender<AppEvent>, word: String, delay: Duration) {
    let tx = events_tx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(delay).await;
        if tx.send(AppEvent::RepairDue { word }).await.is_err() {
            tracing::debug!("Event loop gone, repair dropped");
        }
    });
}

/// Apply a change to an optional control; failures only get logged
pub(crate) fn update_control(
    doc: &mut Document,
    control: Option<NodeId>,
    update: impl FnOnce(&mut Document, NodeId) -> Result<(), DomError>,
) {
    if let Some(id) = control
        && let Err(e) = update(doc, id)
    {
        tracing::warn!("Could not update control {id:?}: {e}");
    }
}
