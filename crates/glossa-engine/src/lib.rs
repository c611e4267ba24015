pub mod model;
pub mod navigation;
pub mod parsing;
pub mod prompt;
pub mod session;
pub mod stream;

#[cfg(test)]
pub mod tests;

// Re-export key types for easier usage
pub use model::*;
pub use navigation::{Command, FlatToken, NavigationCursor, Navigator, Step};
pub use session::{GenerationId, ReadingSession, SessionStatus};
pub use stream::{AnalysisStream, StreamError};
