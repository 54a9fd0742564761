use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Fresh page HTML from the host, replaces the current body
    PageSnapshot(String),
    /// "+ Add to Anki" clicked on the entry with this index
    AddCard { entry: usize },
    /// "Mark as again" clicked next to the headword
    MarkAgain,
    /// Delayed status-control repair for the word tracked when it was scheduled
    RepairDue { word: String },
    /// Toast expiry tick
    Tick,
    Shutdown,
}

/// One dictionary entry scraped from the page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub word: String,
    pub definition: String,
    pub examples: Vec<String>,
    /// Translation chips joined with `<br>`
    pub translation: String,
    pub source_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum ExtractFailure {
    #[error("Could not find word in card")]
    MissingWord,
    #[error("Could not find definition in card")]
    MissingDefinition,
    #[error("Card layout has changed")]
    LayoutChanged,
    #[error("Unknown parsing error")]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Success,
    Error,
}

impl ToastKind {
    pub fn class_name(&self) -> &'static str {
        match self {
            ToastKind::Info => "info",
            ToastKind::Success => "success",
            ToastKind::Error => "error",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_failure_messages() {
        assert_eq!(ExtractFailure::MissingWord.to_string(), "Could not find word in card");
        assert_eq!(
            ExtractFailure::MissingDefinition.to_string(),
            "Could not find definition in card"
        );
        assert_eq!(ExtractFailure::LayoutChanged.to_string(), "Card layout has changed");
        assert_eq!(ExtractFailure::Unknown.to_string(), "Unknown parsing error");
    }
}
