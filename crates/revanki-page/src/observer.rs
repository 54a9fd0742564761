use crate::dom::{Document, DomError, MutationRecord, NodeId};
use crate::headword::current_headword;
use crate::inject::{self, StatusUpdate};
use crate::selectors;

/// What the caller has to do after a batch of mutations
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// Headword changed: look it up in the store, then call
    /// [`PageObserver::apply_status`]
    pub check_word: Option<String>,
    /// Status controls were stripped: wait for the host page to settle, then
    /// call [`PageObserver::repair_due`] with this word
    pub schedule_repair: Option<String>,
    /// Add buttons injected by this pass
    pub injected: usize,
}

/// Keeps the page decorated while the host page re-renders underneath.
///
/// Tracks the displayed headword to detect in-page navigation, and bounds how
/// often status controls are rebuilt after the host strips them.
#[derive(Debug)]
pub struct PageObserver {
    tracked_word: Option<String>,
    repair_attempts: u32,
    max_repair_attempts: u32,
}

impl PageObserver {
    pub fn new(max_repair_attempts: u32) -> Self {
        Self {
            tracked_word: None,
            repair_attempts: 0,
            max_repair_attempts,
        }
    }

    pub fn tracked_word(&self) -> Option<&str> {
        self.tracked_word.as_deref()
    }

    pub fn repair_attempts(&self) -> u32 {
        self.repair_attempts
    }

    /// Initial pass over a freshly loaded page
    pub fn start(&mut self, doc: &mut Document) -> Result<Reaction, DomError> {
        self.tracked_word = current_headword(doc);
        self.repair_attempts = 0;

        let injected = inject::inject_add_buttons(doc)?;
        tracing::info!(
            "Observer started: word={:?}, {injected} entries",
            self.tracked_word
        );

        Ok(Reaction {
            check_word: self.tracked_word.clone(),
            schedule_repair: None,
            injected,
        })
    }

    /// Process one batch of mutation records
    pub fn on_mutations(
        &mut self,
        doc: &mut Document,
        records: &[MutationRecord],
    ) -> Result<Reaction, DomError> {
        let mut reaction = Reaction::default();

        if !inject::status_controls_present(doc)
            && records
                .iter()
                .flat_map(|r| &r.removed)
                .any(|id| holds_status_control(doc, *id))
        {
            if self.repair_attempts < self.max_repair_attempts {
                self.repair_attempts += 1;
                tracing::debug!(
                    "Status controls removed by the page, repair {}/{}",
                    self.repair_attempts,
                    self.max_repair_attempts
                );
                reaction.schedule_repair = self.tracked_word.clone();
            } else {
                tracing::warn!(
                    "Status controls keep disappearing for {:?}, not rebuilding",
                    self.tracked_word
                );
            }
        }

        if let Some(word) = current_headword(doc)
            && self.tracked_word.as_deref() != Some(word.as_str())
        {
            tracing::info!("Word changed from {:?} to {word:?}", self.tracked_word);
            self.tracked_word = Some(word.clone());
            self.repair_attempts = 0;
            reaction.check_word = Some(word);
        }

        if records.iter().any(|r| is_relevant(doc, r)) {
            reaction.injected = inject::inject_add_buttons(doc)?;
        }

        Ok(reaction)
    }

    /// A delayed repair fired: rebuild only if the page still shows the word
    /// the repair was scheduled for
    pub fn repair_due(&self, doc: &Document, word: &str) -> bool {
        self.tracked_word.as_deref() == Some(word)
            && current_headword(doc).as_deref() == Some(word)
    }

    /// Apply a store lookup result. Results for a word that is no longer
    /// displayed are dropped.
    pub fn apply_status(
        &self,
        doc: &mut Document,
        word: &str,
        in_store: bool,
    ) -> Result<Option<StatusUpdate>, DomError> {
        if self.tracked_word.as_deref() != Some(word) {
            tracing::debug!("Dropping stale status for {word:?}");
            return Ok(None);
        }
        inject::show_status(doc, in_store).map(Some)
    }
}

fn holds_status_control(doc: &Document, node: NodeId) -> bool {
    doc.matches(node, &selectors::STATUS_CONTROLS)
        || doc.query(node, &selectors::STATUS_CONTROLS).is_some()
}

/// Records caused only by our own buttons, badges and toasts are ignored
fn is_relevant(doc: &Document, record: &MutationRecord) -> bool {
    let target = record.target;
    if doc.matches(target, &selectors::OWN_ELEMENTS)
        || doc.closest(target, &selectors::TOAST_CONTAINER).is_some()
    {
        return false;
    }

    !record
        .added
        .iter()
        .any(|id| doc.matches(*id, &selectors::OWN_ELEMENTS))
}
