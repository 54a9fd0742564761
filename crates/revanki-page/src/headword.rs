use url::Url;

use crate::dom::Document;
use crate::selectors;

/// URL path segment that precedes the looked-up word
const DEFINITION_PATH: &str = "/english-definition/";

/// Collapse whitespace runs into single spaces and trim the ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// The word the page currently shows.
///
/// The rendered headword wins over the URL, since the URL can briefly reflect
/// a partial query while the page updates.
pub fn current_headword(doc: &Document) -> Option<String> {
    doc.query(doc.body(), &selectors::HEADWORD)
        .map(|id| normalize_whitespace(&doc.own_text(id)))
        .filter(|word| !word.is_empty())
        .or_else(|| headword_from_url(doc.url()))
}

pub fn headword_from_url(url: &str) -> Option<String> {
    let path = Url::parse(url)
        .map(|u| u.path().to_string())
        .unwrap_or_else(|_| url.to_string());

    let (_, rest) = path.split_once(DEFINITION_PATH)?;
    let segment = rest.split('/').next().unwrap_or_default();
    let decoded = urlencoding::decode(segment).ok()?;
    let word = normalize_whitespace(&decoded.replace(['+', '_'], " "));

    (!word.is_empty()).then_some(word)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a \n\t large   rodent "), "a large rodent");
        assert_eq!(normalize_whitespace(" \n "), "");
    }

    #[test]
    fn test_headword_prefers_rendered_word() {
        let doc = Document::parse(
            "https://dictionary.reverso.net/english-definition/ra",
            r#"<div><span class="definition-list__blue-word"> rat <app-badge>C1</app-badge></span></div>"#,
        );
        assert_eq!(current_headword(&doc).as_deref(), Some("rat"));
    }

    #[test]
    fn test_headword_falls_back_to_url() {
        let doc = Document::parse(
            "https://dictionary.reverso.net/english-definition/look%20up_to+someone",
            "<div></div>",
        );
        assert_eq!(current_headword(&doc).as_deref(), Some("look up to someone"));
    }

    #[test]
    fn test_url_without_word() {
        assert_eq!(headword_from_url("https://dictionary.reverso.net/english-definition/"), None);
        assert_eq!(headword_from_url("https://example.com/rat"), None);
    }
}
