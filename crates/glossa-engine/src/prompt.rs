//! Request body for generating and analysing a text in one streamed call.

use serde::Serialize;
use serde_json::{Value, json};

pub const SYSTEM_PROMPT: &str = "You are a language expert. Write a text of several sentences \
for the given prompt that is suited to language learners and uses frequent, everyday words. \
Then analyse the text sentence by sentence and give detailed grammatical information. \
Return an array with one element per sentence. Tokens are meaningful units of the language and \
may span several words when their joint translation differs from the sum of the parts. Never \
split a word in the middle. Set rtl to true when the language is written right to left, and \
give a transliteration only when the language does not use Latin script.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonSchemaFormat {
    pub name: &'static str,
    pub strict: bool,
    pub schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub json_schema: JsonSchemaFormat,
}

/// Streaming chat completion request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompletionRequest {
    pub model: String,
    pub stream: bool,
    pub messages: Vec<Message>,
    pub response_format: ResponseFormat,
}

impl CompletionRequest {
    pub fn for_topic(model: impl Into<String>, topic: &str) -> Self {
        Self {
            model: model.into(),
            stream: true,
            messages: vec![
                Message {
                    role: Role::System,
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: Role::User,
                    content: topic.trim().to_string(),
                },
            ],
            response_format: ResponseFormat {
                kind: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "language_analysis",
                    strict: false,
                    schema: analysis_schema(),
                },
            },
        }
    }
}

/// JSON schema of [`Analysis`](crate::model::Analysis).
///
/// `rtl` and `language` must stay ahead of `analysis` in property order.
pub fn analysis_schema() -> Value {
    let token = json!({
        "type": "object",
        "properties": {
            "original": { "type": "string" },
            "transliteration": { "type": "string" },
            "translation": { "type": "string" },
            "part_of_speech": { "type": "string" }
        },
        "required": ["original", "translation", "part_of_speech"]
    });

    let syntax = json!({
        "anyOf": [
            {
                "type": "object",
                "properties": {
                    "type": { "type": "string" },
                    "index": { "type": "integer" }
                },
                "required": ["type", "index"]
            },
            {
                "type": "object",
                "properties": {
                    "type": { "type": "string" },
                    "indices": { "type": "array", "items": { "type": "integer" } }
                },
                "required": ["type", "indices"]
            }
        ]
    });

    json!({
        "type": "object",
        "properties": {
            "rtl": { "type": "boolean" },
            "language": { "type": "string" },
            "analysis": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "original_sentence": { "type": "string" },
                        "transliteration": {
                            "type": "string",
                            "description": "The transliteration if the language uses non-latin characters."
                        },
                        "translation": { "type": "string" },
                        "tokens": { "type": "array", "items": token },
                        "syntax": { "type": "array", "items": syntax },
                        "grammatical_notes": { "type": "array", "items": { "type": "string" } }
                    },
                    "required": ["original_sentence", "translation", "tokens", "syntax", "grammatical_notes"]
                }
            }
        },
        "required": ["language", "analysis"]
    })
}
