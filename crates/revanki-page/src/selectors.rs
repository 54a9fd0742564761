//! Markup contract with the dictionary page, plus the classes of our own
//! injected elements. The host classes are unversioned; when they drift,
//! extraction reports `LayoutChanged` or a missing part instead of failing
//! silently.

use crate::dom::Selector;

/// One definition block with its own examples and translation chips
pub const ENTRY: Selector<'static> = Selector::Tag("app-definition-example");
/// Page-wide headword, shared by every entry
pub const HEADWORD: Selector<'static> = Selector::Class("definition-list__blue-word");
/// Level/frequency badges rendered inside the headword
pub const HEADWORD_DECORATIONS: Selector<'static> =
    Selector::Any(&[Selector::Tag("app-badge"), Selector::Class("badge")]);
pub const DEFINITION: Selector<'static> = Selector::Class("definition-example__mention-sentence");
pub const EXAMPLE: Selector<'static> = Selector::Class("definition-example__example-text-block");
pub const TRANSLATION_CHIP: Selector<'static> = Selector::Tag("app-translation-chip");
/// Anchor the add button is placed after
pub const ACTIONS: Selector<'static> = Selector::Class("definition-example__actions");

pub const ADD_BUTTON_CLASS: &str = "reverso-anki-button";
pub const BADGE_CLASS: &str = "reverso-anki-badge";
pub const AGAIN_BUTTON_CLASS: &str = "reverso-anki-again-button";
pub const TOAST_CONTAINER_CLASS: &str = "reverso-anki-toast-container";
pub const TOAST_CONTAINER_ID: &str = "reverso-anki-toast-container";
pub const TOAST_CLASS: &str = "reverso-anki-toast";
pub const INJECTED_ATTR: &str = "data-anki-button-injected";

pub const IN_STORE_CLASS: &str = "in-anki";
pub const NOT_IN_STORE_CLASS: &str = "not-in-anki";
pub const SUCCESS_CLASS: &str = "success";
pub const ERROR_CLASS: &str = "error";

pub const ADD_BUTTON: Selector<'static> = Selector::Class(ADD_BUTTON_CLASS);
pub const BADGE: Selector<'static> = Selector::Class(BADGE_CLASS);
pub const AGAIN_BUTTON: Selector<'static> = Selector::Class(AGAIN_BUTTON_CLASS);
pub const TOAST_CONTAINER: Selector<'static> = Selector::Class(TOAST_CONTAINER_CLASS);
pub const STATUS_CONTROLS: Selector<'static> = Selector::Any(&[BADGE, AGAIN_BUTTON]);
/// Everything this crate injects into the page
pub const OWN_ELEMENTS: Selector<'static> =
    Selector::Any(&[ADD_BUTTON, BADGE, AGAIN_BUTTON, TOAST_CONTAINER]);
