use revanki_config::anki::AnkiConfig;
use revanki_types::Card;
use serde_json::{Map, Value, json};

/// Separator between examples inside the example field
const EXAMPLE_SEPARATOR: &str = "<br><br>";

/// Map a scraped card onto the configured note type fields
pub fn note_fields(config: &AnkiConfig, card: &Card) -> Map<String, Value> {
    let mapping = &config.field_mapping;
    let mut fields = Map::new();

    fields.insert(mapping.word.clone(), json!(card.word));
    fields.insert(mapping.definition.clone(), json!(card.definition));
    fields.insert(mapping.example.clone(), json!(card.examples.join(EXAMPLE_SEPARATOR)));
    fields.insert(mapping.back.clone(), json!(card.translation));
    // Filled later by the TTS add-on
    fields.insert(mapping.audio.clone(), json!(""));

    fields
}

/// `addNote` params for a card
pub fn add_note_params(config: &AnkiConfig, card: &Card) -> Value {
    json!({
        "note": {
            "deckName": config.deck,
            "modelName": config.model,
            "fields": note_fields(config, card),
            "tags": config.tags,
        }
    })
}

fn escape_query_value(value: &str) -> String {
    value.replace('"', "\\\"")
}

/// Any note in the deck mentioning the word
pub fn duplicate_query(config: &AnkiConfig, word: &str) -> String {
    format!("\"deck:{}\" \"{}\"", config.deck, escape_query_value(word))
}

/// Cards whose headword field is exactly the word
pub fn word_query(config: &AnkiConfig, word: &str) -> String {
    format!(
        "\"deck:{}\" \"note:{}\" \"{}:{}\"",
        config.deck,
        config.model,
        config.field_mapping.word,
        escape_query_value(word)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card() -> Card {
        Card {
            word: "rat".to_string(),
            definition: "a large, mouse-like rodent".to_string(),
            examples: vec!["A rat ran past.".to_string(), "Rats carry fleas.".to_string()],
            translation: "крыса<br>предатель".to_string(),
            source_url: "https://dictionary.reverso.net/english-definition/rat".to_string(),
        }
    }

    #[test]
    fn test_fields_follow_mapping() {
        let config = AnkiConfig::default();
        let fields = note_fields(&config, &card());

        assert_eq!(fields["Word"], "rat");
        assert_eq!(fields["Definition"], "a large, mouse-like rodent");
        assert_eq!(fields["Example"], "A rat ran past.<br><br>Rats carry fleas.");
        assert_eq!(fields["Back"], "крыса<br>предатель");
        assert_eq!(fields["Audio"], "");
    }

    #[test]
    fn test_add_note_params_carry_deck_model_tags() {
        let config = AnkiConfig::default();
        let params = add_note_params(&config, &card());

        assert_eq!(params["note"]["deckName"], "Fluent English");
        assert_eq!(params["note"]["modelName"], "Word+Example+Definition");
        assert_eq!(params["note"]["tags"][2], "needs_tts");
    }

    #[test]
    fn test_word_query_escapes_quotes() {
        let config = AnkiConfig::default();
        assert_eq!(
            word_query(&config, "say \"hi\""),
            "\"deck:Fluent English\" \"note:Word+Example+Definition\" \"Word:say \\\"hi\\\"\""
        );
    }
}
