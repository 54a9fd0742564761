mod handler_tests;

use std::sync::Arc;

use revanki_anki::testing::FakeBridge;
use revanki_config::Config;
use revanki_page::Document;

use crate::state::PageSession;

pub(crate) fn url(word: &str) -> String {
    format!("https://dictionary.reverso.net/english-definition/{word}")
}

pub(crate) fn entry(definition: &str) -> String {
    format!(
        r#"<app-definition-example>
             <p class="definition-example__mention-sentence">{definition}</p>
             <div class="definition-example__example-text-block">A {definition} was seen.</div>
             <app-translation-chip>крыса</app-translation-chip>
             <div class="definition-example__actions"></div>
           </app-definition-example>"#
    )
}

pub(crate) fn page(word: &str, entries: &[String]) -> String {
    format!(
        r#"<div class="definition-list">
             <h1><span class="definition-list__blue-word">{word}</span></h1>
             {}
           </div>"#,
        entries.concat()
    )
}

pub(crate) fn rat_page() -> String {
    page(
        "rat",
        &[entry("a large, mouse-like rodent"), entry("a disloyal person")],
    )
}

pub(crate) fn session(bridge: &Arc<FakeBridge>, word: &str, html: &str, viewport: u32) -> PageSession {
    let mut doc = Document::parse(url(word), html);
    doc.set_viewport_width(viewport);
    PageSession::new(Arc::new(Config::default()), bridge.clone(), doc)
}
