use crate::dom::{Document, DomError, NodeId};
use crate::selectors;

pub const ADD_LABEL: &str = "+ Add to Anki";
pub const AGAIN_LABEL: &str = "Mark as again";
const IN_STORE_LABEL: &str = "✓ In Anki";
const NOT_IN_STORE_LABEL: &str = "✗ Not in Anki";

/// Entries on the page, in document order
pub fn entries(doc: &Document) -> Vec<NodeId> {
    doc.query_all(doc.body(), &selectors::ENTRY)
}

/// Give every entry without the marker an add button. Returns how many were
/// added; running it again on an unchanged page adds none.
pub fn inject_add_buttons(doc: &mut Document) -> Result<usize, DomError> {
    let mut injected = 0;

    for entry in entries(doc) {
        if doc.attr(entry, selectors::INJECTED_ATTR).is_some() {
            continue;
        }

        let button = doc.create_element("button");
        doc.add_class(button, selectors::ADD_BUTTON_CLASS)?;
        doc.set_text(button, ADD_LABEL)?;

        match doc.query(entry, &selectors::ACTIONS) {
            Some(actions) => doc.insert_after(actions, button)?,
            None => {
                doc.append_child(entry, button)?;
                tracing::warn!("No actions block in entry {entry:?}, add button appended to the entry");
            }
        }

        doc.set_attr(entry, selectors::INJECTED_ATTR, "true")?;
        injected += 1;
    }

    if injected > 0 {
        tracing::debug!("Injected {injected} add button(s)");
    }
    Ok(injected)
}

pub fn add_button(doc: &Document, entry: NodeId) -> Option<NodeId> {
    doc.query(entry, &selectors::ADD_BUTTON)
}

pub fn again_button(doc: &Document) -> Option<NodeId> {
    doc.query(doc.body(), &selectors::AGAIN_BUTTON)
}

/// Badge and again button both on the page
pub fn status_controls_present(doc: &Document) -> bool {
    doc.query(doc.body(), &selectors::BADGE).is_some() && again_button(doc).is_some()
}

/// Badge state shown next to the headword, if any
pub fn badge_state(doc: &Document) -> Option<bool> {
    let badge = doc.query(doc.body(), &selectors::BADGE)?;
    Some(doc.has_class(badge, selectors::IN_STORE_CLASS))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusUpdate {
    /// No headword element to attach to
    NoHeadword,
    /// Correct badge and button already follow the headword
    Unchanged,
    Rebuilt,
}

/// Show whether the current headword is in the store: a badge right after
/// the headword followed by the "mark as again" button. Badges and buttons
/// anywhere else (left over from a previous word) are removed first.
pub fn show_status(doc: &mut Document, in_store: bool) -> Result<StatusUpdate, DomError> {
    let Some(headword) = doc.query(doc.body(), &selectors::HEADWORD) else {
        return Ok(StatusUpdate::NoHeadword);
    };

    let badge = doc
        .next_element_sibling(headword)
        .filter(|id| doc.has_class(*id, selectors::BADGE_CLASS));
    let again = badge
        .and_then(|id| doc.next_element_sibling(id))
        .filter(|id| doc.has_class(*id, selectors::AGAIN_BUTTON_CLASS));

    for orphan in doc.query_all(doc.body(), &selectors::BADGE) {
        if Some(orphan) != badge {
            doc.remove(orphan)?;
        }
    }
    for orphan in doc.query_all(doc.body(), &selectors::AGAIN_BUTTON) {
        if Some(orphan) != again {
            doc.remove(orphan)?;
        }
    }

    let wanted_class = if in_store {
        selectors::IN_STORE_CLASS
    } else {
        selectors::NOT_IN_STORE_CLASS
    };
    let correct = badge.is_some_and(|id| doc.has_class(id, wanted_class));
    if correct && again.is_some() {
        tracing::debug!("Status controls already show in_store={in_store}");
        return Ok(StatusUpdate::Unchanged);
    }

    if let Some(id) = badge {
        doc.remove(id)?;
    }
    if let Some(id) = again {
        doc.remove(id)?;
    }

    let badge = doc.create_element("span");
    doc.add_class(badge, selectors::BADGE_CLASS)?;
    doc.add_class(badge, wanted_class)?;
    doc.set_text(
        badge,
        if in_store { IN_STORE_LABEL } else { NOT_IN_STORE_LABEL },
    )?;

    let again = doc.create_element("button");
    doc.add_class(again, selectors::AGAIN_BUTTON_CLASS)?;
    doc.set_text(again, AGAIN_LABEL)?;
    set_disabled(doc, again, !in_store)?;

    doc.insert_after(headword, badge)?;
    doc.insert_after(badge, again)?;

    tracing::info!(
        "Status controls added: {}",
        if in_store { "In Anki" } else { "Not in Anki" }
    );
    Ok(StatusUpdate::Rebuilt)
}

pub fn is_disabled(doc: &Document, control: NodeId) -> bool {
    doc.attr(control, "disabled").is_some()
}

pub fn set_disabled(doc: &mut Document, control: NodeId, disabled: bool) -> Result<(), DomError> {
    if disabled {
        doc.set_attr(control, "disabled", "")
    } else {
        doc.remove_attr(control, "disabled")
    }
}

pub fn label(doc: &Document, control: NodeId) -> String {
    doc.text_content(control)
}

/// Disable a control and show a progress label. Returns the previous label.
pub fn begin_busy(doc: &mut Document, control: NodeId, busy_label: &str) -> Result<String, DomError> {
    let previous = label(doc, control);
    set_disabled(doc, control, true)?;
    doc.set_text(control, busy_label)?;
    Ok(previous)
}

/// Re-enable a control with its previous label so the action can be retried
pub fn restore(doc: &mut Document, control: NodeId, previous_label: &str) -> Result<(), DomError> {
    set_disabled(doc, control, false)?;
    doc.set_text(control, previous_label)
}

/// Final state after a completed action, the control stays disabled
pub fn finish(doc: &mut Document, control: NodeId, done_label: &str) -> Result<(), DomError> {
    doc.set_text(control, done_label)?;
    doc.add_class(control, selectors::SUCCESS_CLASS)
}
