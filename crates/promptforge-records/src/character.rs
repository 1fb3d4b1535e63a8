//! Character profiles.
//!
//! A character is a name, a handful of verbs and adjectives, and four
//! categories of emoji-tagged traits. Every field is required. A run writes
//! one aggregate artifact, `characters_<timestamp>.json`, wrapped in
//! `"students"`.

use serde::{Deserialize, Serialize};
use serde_json::json;

use promptforge_contracts::{
    artifact::ArtifactLayout,
    chat::PromptSpec,
    verify::RecordSchema,
};
use promptforge_core::traits::GeneratedRecord;

const PREAMBLE: &str = "Generate a character profile with the following traits:";
const INSTRUCTIONS: &str = include_str!("../prompts/character.txt");

// ── Record types ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryItem {
    pub text: String,
    pub emoji: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Categories {
    pub character: Vec<CategoryItem>,
    pub business: Vec<CategoryItem>,
    pub psychology: Vec<CategoryItem>,
    pub desires: Vec<CategoryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Character {
    pub name: String,
    pub verbs: Vec<String>,
    pub adjectives: Vec<String>,
    pub categories: Categories,
}

// ── Schema ────────────────────────────────────────────────────────────────────

fn item_list() -> serde_json::Value {
    json!({
        "type": "array",
        "items": {
            "type": "object",
            "properties": {
                "text": { "type": "string" },
                "emoji": { "type": "string" }
            },
            "required": ["text", "emoji"]
        }
    })
}

impl GeneratedRecord for Character {
    const KIND: &'static str = "character";
    const WRAPPER_KEY: &'static str = "students";

    fn schema() -> RecordSchema {
        RecordSchema {
            schema_id: "character-v1".to_string(),
            json_schema: json!({
                "type": "object",
                "properties": {
                    "name": { "type": "string" },
                    "verbs": { "type": "array", "items": { "type": "string" } },
                    "adjectives": { "type": "array", "items": { "type": "string" } },
                    "categories": {
                        "type": "object",
                        "properties": {
                            "character": item_list(),
                            "business": item_list(),
                            "psychology": item_list(),
                            "desires": item_list()
                        },
                        "required": ["character", "business", "psychology", "desires"]
                    }
                },
                "required": ["name", "verbs", "adjectives", "categories"]
            }),
            sections: vec![],
            checks: vec![],
        }
    }

    fn prompt() -> PromptSpec {
        PromptSpec::new(PREAMBLE, INSTRUCTIONS)
    }

    fn layout() -> ArtifactLayout {
        ArtifactLayout::Aggregate {
            prefix: "characters".to_string(),
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use promptforge_contracts::error::ForgeError;
    use promptforge_core::traits::GeneratedRecord;
    use promptforge_verify::SchemaVerifier;

    use super::Character;
    use crate::samples;

    #[test]
    fn sample_character_validates() {
        let verifier = SchemaVerifier::new();
        let character: Character = verifier
            .validate_record(&samples::character_value(), &Character::schema())
            .unwrap();

        assert_eq!(character.name, "Maya Okafor");
        assert_eq!(character.categories.desires.len(), 2);
    }

    #[test]
    fn missing_category_names_the_field() {
        let verifier = SchemaVerifier::new();
        let mut candidate = samples::character_value();
        candidate["categories"]
            .as_object_mut()
            .unwrap()
            .remove("desires");

        let err = verifier
            .validate_record::<Character>(&candidate, &Character::schema())
            .unwrap_err();

        assert_eq!(err.field(), Some("categories.desires"));
    }

    #[test]
    fn item_without_emoji_fails() {
        let verifier = SchemaVerifier::new();
        let mut candidate = samples::character_value();
        candidate["categories"]["business"][1] = json!({ "text": "Negotiation" });

        let err = verifier
            .validate_record::<Character>(&candidate, &Character::schema())
            .unwrap_err();

        match err {
            ForgeError::SchemaValidation { field, .. } => {
                assert_eq!(field, "categories.business.1.emoji")
            }
            other => panic!("expected SchemaValidation, got {:?}", other),
        }
    }

    #[test]
    fn prompt_keeps_preamble_then_template() {
        let rendered = Character::prompt().render();
        assert!(rendered.starts_with(
            "Generate a character profile with the following traits:\nGenerate a character profile following this exact JSON structure:"
        ));
        assert!(rendered.contains("Each category should have exactly 2 items"));
    }

    #[test]
    fn serialized_fields_follow_declaration_order() {
        let character: Character = serde_json::from_value(samples::character_value()).unwrap();
        let value = serde_json::to_value(&character).unwrap();
        let keys: Vec<&String> = value.as_object().unwrap().keys().collect();

        assert_eq!(keys, ["name", "verbs", "adjectives", "categories"]);
    }
}
