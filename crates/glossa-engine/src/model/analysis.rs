use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::RevealLayer;

/// A meaningful unit of the generated text together with its analysis.
///
/// While a response is streaming any field may still be missing, and a
/// string field may hold only the characters received so far.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Token {
    pub original: Option<String>,
    pub transliteration: Option<String>,
    pub part_of_speech: Option<String>,
    pub translation: Option<String>,
}

impl Token {
    pub fn new(original: impl Into<String>) -> Self {
        Self {
            original: Some(original.into()),
            ..Self::default()
        }
    }

    pub fn with_transliteration(mut self, value: impl Into<String>) -> Self {
        self.transliteration = Some(value.into());
        self
    }

    pub fn with_part_of_speech(mut self, value: impl Into<String>) -> Self {
        self.part_of_speech = Some(value.into());
        self
    }

    pub fn with_translation(mut self, value: impl Into<String>) -> Self {
        self.translation = Some(value.into());
        self
    }

    /// A token becomes navigable once its original text has started arriving.
    pub fn is_valid(&self) -> bool {
        self.original.is_some()
    }

    /// Raw value of a layer, empty strings included.
    pub fn field(&self, layer: RevealLayer) -> Option<&str> {
        match layer {
            RevealLayer::Original => self.original.as_deref(),
            RevealLayer::Transliteration => self.transliteration.as_deref(),
            RevealLayer::PartOfSpeech => self.part_of_speech.as_deref(),
            RevealLayer::Translation => self.translation.as_deref(),
        }
    }

    /// Value of a layer when it is present and non-empty.
    pub fn layer(&self, layer: RevealLayer) -> Option<&str> {
        self.field(layer).filter(|value| !value.is_empty())
    }

    pub fn has_layer(&self, layer: RevealLayer) -> bool {
        self.layer(layer).is_some()
    }
}

/// Link between a grammatical role and one or more token indices.
///
/// Indices that are not non-negative integers are dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyntaxLink {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(deserialize_with = "lenient_index")]
    pub index: Option<u64>,
    #[serde(deserialize_with = "lenient_indices")]
    pub indices: Option<Vec<u64>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Sentence {
    pub original_sentence: Option<String>,
    pub transliteration: Option<String>,
    pub translation: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub tokens: Vec<Option<Token>>,
    #[serde(deserialize_with = "null_as_empty")]
    pub syntax: Vec<Option<SyntaxLink>>,
    #[serde(deserialize_with = "null_as_empty")]
    pub grammatical_notes: Vec<Option<String>>,
}

impl Sentence {
    pub fn from_tokens(tokens: impl IntoIterator<Item = Token>) -> Self {
        Self {
            tokens: tokens.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }

    /// Tokens that can be navigated, in order.
    pub fn valid_tokens(&self) -> impl Iterator<Item = (usize, &Token)> {
        self.tokens
            .iter()
            .enumerate()
            .filter_map(|(slot, token)| token.as_ref().map(|t| (slot, t)))
            .filter(|(_, token)| token.is_valid())
    }
}

/// Top-level response: the generated text split into analysed sentences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Analysis {
    pub rtl: Option<bool>,
    pub language: Option<String>,
    #[serde(deserialize_with = "null_as_empty")]
    pub analysis: Vec<Option<Sentence>>,
}

impl Analysis {
    pub fn from_sentences(sentences: impl IntoIterator<Item = Sentence>) -> Self {
        Self {
            analysis: sentences.into_iter().map(Some).collect(),
            ..Self::default()
        }
    }

    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    pub fn sentences(&self) -> &[Option<Sentence>] {
        &self.analysis
    }

    pub fn is_empty(&self) -> bool {
        self.analysis.iter().all(|sentence| sentence.is_none())
    }
}

/// `null` reads as an empty list, like a missing key.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_index<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_u64())
}

fn lenient_indices<'de, D>(deserializer: D) -> Result<Option<Vec<u64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_array()
        .map(|items| items.iter().filter_map(Value::as_u64).collect()))
}
