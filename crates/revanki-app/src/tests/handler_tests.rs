use std::sync::Arc;

use revanki_anki::BridgeError;
use revanki_anki::testing::FakeBridge;
use revanki_config::anki::AnkiConfig;
use revanki_page::{inject, selectors};
use revanki_types::ExtractFailure;
use serde_json::json;

use super::{entry, page, rat_page, session};
use crate::events::add_card::{AddOutcome, handle_add_card};
use crate::events::mark_again::{AgainOutcome, handle_mark_again};
use crate::events::start_observing;
use crate::state::PageSession;

fn healthy() -> Arc<FakeBridge> {
    Arc::new(FakeBridge::healthy(&AnkiConfig::default()))
}

fn add_button(session: &PageSession, index: usize) -> revanki_page::NodeId {
    let entry = inject::entries(&session.doc)[index];
    inject::add_button(&session.doc, entry).unwrap()
}

fn toasts(session: &PageSession) -> Vec<String> {
    session.toaster.visible(&session.doc)
}

#[tokio::test]
async fn test_add_card_flips_badge() {
    let bridge = healthy();
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;
    assert_eq!(inject::badge_state(&session.doc), Some(false));

    let outcome = handle_add_card(&mut session, 0).await;
    assert_eq!(
        outcome,
        AddOutcome::Added {
            word: "rat".to_string(),
            duplicate: false
        }
    );

    let (_, params) = bridge.last_call("addNote").unwrap();
    assert_eq!(params["note"]["fields"]["Word"], "rat");
    assert_eq!(params["note"]["fields"]["Definition"], "a large, mouse-like rodent");
    assert_eq!(params["note"]["fields"]["Back"], "крыса");

    let button = add_button(&session, 0);
    assert_eq!(inject::label(&session.doc, button), "✓ Added");
    assert!(inject::is_disabled(&session.doc, button));
    assert!(session.doc.has_class(button, selectors::SUCCESS_CLASS));
    assert!(toasts(&session).contains(&"\"rat\" added to Anki!".to_string()));

    assert_eq!(inject::badge_state(&session.doc), Some(true));
}

#[tokio::test]
async fn test_add_duplicate_meaning() {
    let bridge = healthy();
    bridge.respond("findNotes", json!([1_600_000_000_000u64]));
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;

    let outcome = handle_add_card(&mut session, 1).await;
    assert_eq!(
        outcome,
        AddOutcome::Added {
            word: "rat".to_string(),
            duplicate: true
        }
    );
    assert_eq!(
        inject::label(&session.doc, add_button(&session, 1)),
        "✓ Added (duplicate)"
    );
    assert!(
        toasts(&session)
            .contains(&"\"rat\" added to Anki (duplicate word, different meaning)".to_string())
    );
}

#[tokio::test]
async fn test_add_failure_reenables_button() {
    let bridge = healthy();
    bridge.fail("addNote", BridgeError::Remote("deck not found".to_string()));
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;

    let outcome = handle_add_card(&mut session, 0).await;
    assert_eq!(outcome, AddOutcome::Failed("deck not found".to_string()));

    let button = add_button(&session, 0);
    assert!(!inject::is_disabled(&session.doc, button));
    assert_eq!(inject::label(&session.doc, button), inject::ADD_LABEL);
    assert!(toasts(&session).iter().any(|t| t.contains("deck not found")));
    assert_eq!(inject::badge_state(&session.doc), Some(false));
}

#[tokio::test]
async fn test_wide_viewport_blocks_add() {
    let bridge = healthy();
    let mut session = session(&bridge, "rat", &rat_page(), 800);
    start_observing(&mut session).await;

    let outcome = handle_add_card(&mut session, 0).await;
    assert_eq!(outcome, AddOutcome::WrongLayout { width: 800 });

    assert!(!bridge.called("addNote"));
    assert!(!bridge.called("findNotes"));
    let button = add_button(&session, 0);
    assert!(!inject::is_disabled(&session.doc, button));
    assert!(
        toasts(&session).contains(&"⚠️ Wrong layout. Resize window to 767px or less.".to_string())
    );
}

#[tokio::test]
async fn test_unparseable_entry() {
    let bridge = healthy();
    let broken = r#"<app-definition-example>
                      <div class="definition-example__example-text-block">Rats!</div>
                    </app-definition-example>"#;
    let html = page("rat", &[broken.to_string(), entry("a rodent")]);
    let mut session = session(&bridge, "rat", &html, 767);
    start_observing(&mut session).await;

    let outcome = handle_add_card(&mut session, 0).await;
    assert_eq!(outcome, AddOutcome::ParseFailed(ExtractFailure::MissingDefinition));

    assert!(!bridge.called("addNote"));
    let button = add_button(&session, 0);
    assert!(!inject::is_disabled(&session.doc, button));
    assert!(
        toasts(&session).contains(&"Parse failed: Could not find definition in card".to_string())
    );
}

#[tokio::test]
async fn test_add_unknown_entry() {
    let bridge = healthy();
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;

    assert_eq!(handle_add_card(&mut session, 5).await, AddOutcome::NoSuchEntry(5));
    assert!(!bridge.called("addNote"));
}

#[tokio::test]
async fn test_mark_again_without_cards() {
    let bridge = healthy();
    bridge.respond("findCards", json!([11]));
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;
    assert_eq!(inject::badge_state(&session.doc), Some(true));

    // cards deleted in Anki since the page was checked
    bridge.respond("findCards", json!([]));
    let outcome = handle_mark_again(&mut session).await;
    assert_eq!(
        outcome,
        AgainOutcome::NotFound {
            word: "rat".to_string()
        }
    );

    assert!(!bridge.called("answerCards"));
    let button = inject::again_button(&session.doc).unwrap();
    assert!(!inject::is_disabled(&session.doc, button));
    assert_eq!(inject::label(&session.doc, button), inject::AGAIN_LABEL);
    assert!(toasts(&session).contains(&"\"rat\" not found in Anki".to_string()));
}

#[tokio::test]
async fn test_mark_again_answers_every_card() {
    let bridge = healthy();
    bridge.respond("findCards", json!([11, 12, 12]));
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;
    assert_eq!(inject::badge_state(&session.doc), Some(true));

    let outcome = handle_mark_again(&mut session).await;
    assert_eq!(
        outcome,
        AgainOutcome::Marked {
            word: "rat".to_string(),
            count: 2
        }
    );

    let (_, params) = bridge.last_call("answerCards").unwrap();
    assert_eq!(
        params,
        json!({ "answers": [{ "cardId": 11, "ease": 1 }, { "cardId": 12, "ease": 1 }] })
    );
    let button = inject::again_button(&session.doc).unwrap();
    assert_eq!(inject::label(&session.doc, button), "✓ Marked as again");
    assert!(toasts(&session).contains(&"\"rat\" marked as again (2 cards)".to_string()));
}

#[tokio::test]
async fn test_mark_again_store_error() {
    let bridge = healthy();
    bridge.respond("findCards", json!([11]));
    bridge.fail("answerCards", BridgeError::Timeout);
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;

    let outcome = handle_mark_again(&mut session).await;
    assert_eq!(
        outcome,
        AgainOutcome::Failed("AnkiConnect request timed out".to_string())
    );

    let button = inject::again_button(&session.doc).unwrap();
    assert!(!inject::is_disabled(&session.doc, button));
    assert!(session.doc.has_class(button, selectors::ERROR_CLASS));
    assert!(toasts(&session).contains(&"Failed: AnkiConnect request timed out".to_string()));
}

#[tokio::test]
async fn test_added_entry_ignores_further_clicks() {
    let bridge = healthy();
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;

    assert!(matches!(
        handle_add_card(&mut session, 0).await,
        AddOutcome::Added { .. }
    ));
    let shown = toasts(&session).len();

    assert_eq!(handle_add_card(&mut session, 0).await, AddOutcome::Disabled(0));
    assert_eq!(bridge.call_count("addNote"), 1);
    assert_eq!(toasts(&session).len(), shown);
    assert_eq!(inject::label(&session.doc, add_button(&session, 0)), "✓ Added");

    // the other entry is still clickable
    assert!(matches!(
        handle_add_card(&mut session, 1).await,
        AddOutcome::Added { .. }
    ));
    assert_eq!(bridge.call_count("addNote"), 2);
}

#[tokio::test]
async fn test_mark_again_disabled_when_not_in_anki() {
    let bridge = healthy();
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;
    assert_eq!(inject::badge_state(&session.doc), Some(false));
    let lookups = bridge.call_count("findCards");

    assert_eq!(handle_mark_again(&mut session).await, AgainOutcome::Disabled);

    assert_eq!(bridge.call_count("findCards"), lookups);
    assert!(!bridge.called("answerCards"));
    let button = inject::again_button(&session.doc).unwrap();
    assert!(inject::is_disabled(&session.doc, button));
    assert_eq!(inject::label(&session.doc, button), inject::AGAIN_LABEL);
    assert!(toasts(&session).is_empty());
}

#[tokio::test]
async fn test_marked_word_ignores_further_clicks() {
    let bridge = healthy();
    bridge.respond("findCards", json!([11]));
    let mut session = session(&bridge, "rat", &rat_page(), 767);
    start_observing(&mut session).await;

    assert!(matches!(
        handle_mark_again(&mut session).await,
        AgainOutcome::Marked { count: 1, .. }
    ));
    assert_eq!(handle_mark_again(&mut session).await, AgainOutcome::Disabled);
    assert_eq!(bridge.call_count("answerCards"), 1);
}
