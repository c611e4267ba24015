use serde::{Deserialize, Serialize};

/// Which field of a token is currently displayed.
///
/// The declaration order is the cycling order used by the navigator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealLayer {
    #[default]
    Original,
    Transliteration,
    PartOfSpeech,
    Translation,
}

impl RevealLayer {
    /// All layers in cycling order.
    pub const ALL: [RevealLayer; 4] = [
        RevealLayer::Original,
        RevealLayer::Transliteration,
        RevealLayer::PartOfSpeech,
        RevealLayer::Translation,
    ];

    /// Position of this layer in [`RevealLayer::ALL`].
    pub fn ordinal(self) -> usize {
        match self {
            RevealLayer::Original => 0,
            RevealLayer::Transliteration => 1,
            RevealLayer::PartOfSpeech => 2,
            RevealLayer::Translation => 3,
        }
    }

    /// Layer reached by moving `offset` steps around the cycle.
    pub fn offset(self, offset: isize) -> RevealLayer {
        let len = Self::ALL.len() as isize;
        let index = (self.ordinal() as isize + offset).rem_euclid(len);
        Self::ALL[index as usize]
    }

    /// Short label shown next to a revealed value.
    pub fn badge(self) -> Option<&'static str> {
        match self {
            RevealLayer::Original => None,
            RevealLayer::Transliteration => Some("TL"),
            RevealLayer::PartOfSpeech => Some("POS"),
            RevealLayer::Translation => Some("TR"),
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            RevealLayer::Original => "original",
            RevealLayer::Transliteration => "transliteration",
            RevealLayer::PartOfSpeech => "part of speech",
            RevealLayer::Translation => "translation",
        }
    }
}
