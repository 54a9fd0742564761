pub mod dom;
pub mod extract;
pub mod headword;
pub mod inject;
pub mod observer;
pub mod selectors;
pub mod toast;

pub use dom::{Document, DomError, MutationRecord, NodeId, Selector};
pub use extract::extract_card;
pub use headword::{current_headword, normalize_whitespace};
pub use observer::{PageObserver, Reaction};
pub use toast::Toaster;
