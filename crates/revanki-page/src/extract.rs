use revanki_types::{Card, ExtractFailure};

use crate::dom::{Document, DomError, NodeId};
use crate::headword::normalize_whitespace;
use crate::selectors;

/// Separator between translation chips, rendered as a line break by Anki
const TRANSLATION_SEPARATOR: &str = "<br>";

impl From<DomError> for ExtractFailure {
    fn from(_: DomError) -> Self {
        ExtractFailure::Unknown
    }
}

/// Read one dictionary entry into a card.
///
/// The headword comes from the page header rather than the entry. Missing
/// examples or translations are fine; a missing word or definition is not.
/// Faults while walking the page map to [`ExtractFailure::Unknown`].
pub fn extract_card(doc: &Document, entry: NodeId) -> Result<Card, ExtractFailure> {
    let result = try_extract(doc, entry);
    if let Err(reason) = &result {
        tracing::error!("Failed to parse entry {entry:?}: {reason}");
    }
    result
}

fn try_extract(doc: &Document, entry: NodeId) -> Result<Card, ExtractFailure> {
    let element = doc.element(entry)?;
    if !selectors::ENTRY.matches(element) || !doc.is_connected(entry) {
        return Err(ExtractFailure::LayoutChanged);
    }

    let word = doc
        .query(doc.body(), &selectors::HEADWORD)
        .map(|id| {
            normalize_whitespace(
                &doc.text_content_excluding(id, &selectors::HEADWORD_DECORATIONS),
            )
        })
        .filter(|word| !word.is_empty())
        .ok_or(ExtractFailure::MissingWord)?;

    let definition = doc
        .query(entry, &selectors::DEFINITION)
        .map(|id| normalize_whitespace(&doc.text_content(id)))
        .filter(|text| !text.is_empty())
        .ok_or(ExtractFailure::MissingDefinition)?;

    let examples = texts(doc, entry, &selectors::EXAMPLE);

    let translation = texts(doc, entry, &selectors::TRANSLATION_CHIP).join(TRANSLATION_SEPARATOR);
    if translation.is_empty() {
        tracing::warn!("No translation found for entry {entry:?} of {word:?}");
    }

    Ok(Card {
        word,
        definition,
        examples,
        translation,
        source_url: doc.url().to_string(),
    })
}

/// Non-blank normalized texts of matching descendants, in page order
fn texts(doc: &Document, scope: NodeId, selector: &crate::dom::Selector<'_>) -> Vec<String> {
    doc.query_all(scope, selector)
        .into_iter()
        .map(|id| normalize_whitespace(&doc.text_content(id)))
        .filter(|text| !text.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Selector;

    const URL: &str = "https://dictionary.reverso.net/english-definition/rat";

    fn page(entry_body: &str) -> String {
        format!(
            r#"<div class="definition-list">
                 <h1><span class="definition-list__blue-word">rat <app-badge class="badge">B1</app-badge></span></h1>
                 <app-definition-example>{entry_body}</app-definition-example>
               </div>"#
        )
    }

    fn first_entry(doc: &Document) -> NodeId {
        doc.query(doc.body(), &selectors::ENTRY).unwrap()
    }

    #[test]
    fn test_full_entry() {
        let html = page(
            r#"<p class="definition-example__mention-sentence"> a large,
                 mouse-like   rodent </p>
               <div class="definition-example__example-text-block">A rat ran across the road.</div>
               <div class="definition-example__example-text-block">  Rats   carry disease. </div>
               <app-translation-chip>крыса</app-translation-chip>
               <app-translation-chip> предатель </app-translation-chip>
               <div class="definition-example__actions"></div>"#,
        );
        let doc = Document::parse(URL, &html);

        let card = extract_card(&doc, first_entry(&doc)).unwrap();
        assert_eq!(card.word, "rat");
        assert_eq!(card.definition, "a large, mouse-like rodent");
        assert_eq!(
            card.examples,
            vec!["A rat ran across the road.", "Rats carry disease."]
        );
        assert_eq!(card.translation, "крыса<br>предатель");
        assert_eq!(card.source_url, URL);
    }

    #[test]
    fn test_examples_and_translation_are_optional() {
        let html = page(r#"<p class="definition-example__mention-sentence">a rodent</p>"#);
        let doc = Document::parse(URL, &html);

        let card = extract_card(&doc, first_entry(&doc)).unwrap();
        assert!(card.examples.is_empty());
        assert_eq!(card.translation, "");
    }

    #[test]
    fn test_missing_definition() {
        let html = page(r#"<div class="definition-example__example-text-block">Rats!</div>"#);
        let doc = Document::parse(URL, &html);

        assert_eq!(
            extract_card(&doc, first_entry(&doc)),
            Err(ExtractFailure::MissingDefinition)
        );
    }

    #[test]
    fn test_blank_definition_is_missing() {
        let html = page(r#"<p class="definition-example__mention-sentence">  </p>"#);
        let doc = Document::parse(URL, &html);

        assert_eq!(
            extract_card(&doc, first_entry(&doc)),
            Err(ExtractFailure::MissingDefinition)
        );
    }

    #[test]
    fn test_missing_word() {
        let doc = Document::parse(
            URL,
            r#"<app-definition-example><p class="definition-example__mention-sentence">x</p></app-definition-example>"#,
        );
        assert_eq!(
            extract_card(&doc, first_entry(&doc)),
            Err(ExtractFailure::MissingWord)
        );
    }

    #[test]
    fn test_badge_only_headword_is_missing_word() {
        let doc = Document::parse(
            URL,
            r#"<span class="definition-list__blue-word"><app-badge>B1</app-badge></span>
               <app-definition-example><p class="definition-example__mention-sentence">x</p></app-definition-example>"#,
        );
        assert_eq!(
            extract_card(&doc, first_entry(&doc)),
            Err(ExtractFailure::MissingWord)
        );
    }

    #[test]
    fn test_wrong_element_is_layout_change() {
        let html = page(r#"<p class="definition-example__mention-sentence">a rodent</p>"#);
        let doc = Document::parse(URL, &html);
        let header = doc.query(doc.body(), &Selector::Tag("h1")).unwrap();

        assert_eq!(extract_card(&doc, header), Err(ExtractFailure::LayoutChanged));
    }

    #[test]
    fn test_detached_entry_is_layout_change() {
        let html = page(r#"<p class="definition-example__mention-sentence">a rodent</p>"#);
        let mut doc = Document::parse(URL, &html);
        let entry = first_entry(&doc);
        doc.remove(entry).unwrap();

        assert_eq!(extract_card(&doc, entry), Err(ExtractFailure::LayoutChanged));
    }

    #[test]
    fn test_text_node_is_unknown() {
        let mut doc = Document::parse(URL, &page(""));
        let text = doc.create_text("stray");

        assert_eq!(extract_card(&doc, text), Err(ExtractFailure::Unknown));
    }
}
