use crate::model::{Sentence, Token};

/// A navigable token with its stable place in the flattened sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatToken {
    /// Index in the flattened sequence.
    pub position: usize,
    /// Index of the sentence the token belongs to.
    pub sentence: usize,
    /// Index of the token inside its sentence, placeholders included.
    pub slot: usize,
    pub token: Token,
}

/// Concatenates the valid tokens of all sentences, sentence order first.
///
/// Null sentences, null tokens and tokens without `original` are skipped.
pub fn flatten(sentences: &[Option<Sentence>]) -> Vec<FlatToken> {
    sentences
        .iter()
        .enumerate()
        .filter_map(|(index, sentence)| sentence.as_ref().map(|s| (index, s)))
        .flat_map(|(sentence_index, sentence)| {
            sentence
                .valid_tokens()
                .map(move |(slot, token)| (sentence_index, slot, token))
        })
        .enumerate()
        .map(|(position, (sentence, slot, token))| FlatToken {
            position,
            sentence,
            slot,
            token: token.clone(),
        })
        .collect()
}

/// Splits a flattened sequence into runs that share a sentence.
pub fn sentence_groups(tokens: &[FlatToken]) -> Vec<&[FlatToken]> {
    tokens
        .chunk_by(|a, b| a.sentence == b.sentence)
        .collect()
}
