//! Shared builders for unit tests.

use crate::model::{Sentence, Token};

/// Tokens carrying only their original text.
pub fn words(originals: &[&str]) -> Vec<Token> {
    originals.iter().map(|w| Token::new(*w)).collect()
}

/// A token with every layer filled in.
pub fn full_token(original: &str) -> Token {
    Token::new(original)
        .with_transliteration(format!("{original}-tl"))
        .with_part_of_speech("noun")
        .with_translation(format!("{original}-tr"))
}

/// A sentence whose tokens have not received their original text yet.
pub fn placeholder_sentence(len: usize) -> Sentence {
    Sentence {
        tokens: (0..len)
            .map(|_| {
                Some(Token {
                    translation: Some("pending".into()),
                    ..Token::default()
                })
            })
            .collect(),
        ..Sentence::default()
    }
}

/// A sentence of `originals` with one placeholder token inserted at `at`.
pub fn sentence_with_placeholder(originals: &[&str], at: usize) -> Sentence {
    let mut sentence = Sentence::from_tokens(words(originals));
    sentence.tokens.insert(at, Some(Token::default()));
    sentence
}

/// Two sentences, three plus two valid tokens, one placeholder in the second.
pub fn five_token_snapshot() -> Vec<Option<Sentence>> {
    vec![
        Some(Sentence::from_tokens([
            full_token("uno"),
            full_token("dos"),
            full_token("tres"),
        ])),
        Some(Sentence {
            tokens: vec![
                Some(full_token("cuatro")),
                Some(Token::default()),
                Some(full_token("cinco")),
            ],
            ..Sentence::default()
        }),
    ]
}
