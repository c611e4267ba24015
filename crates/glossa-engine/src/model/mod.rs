pub mod analysis;
pub mod layer;

pub use analysis::{Analysis, Sentence, SyntaxLink, Token};
pub use layer::RevealLayer;
