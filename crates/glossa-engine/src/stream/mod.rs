//! Decoding of a streamed model response into analysis snapshots.
//!
//! Bytes flow through three stages: [`Utf8Accumulator`] turns chunks into
//! text, [`SseDecoder`] unwraps server-sent event framing when the body is
//! an event stream, and [`AnalysisStream`] re-parses the accumulated JSON
//! after every piece and hands out the newest [`Analysis`](crate::model::Analysis).

pub mod decoder;
pub mod sse;
pub mod utf8;

pub use decoder::AnalysisStream;
pub use sse::{SseDecoder, SseEvent, completion_delta};
pub use utf8::Utf8Accumulator;

use crate::parsing::ParseError;

#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    #[error("malformed response: {0}")]
    Parse(#[from] ParseError),
    #[error("response does not match the analysis shape: {0}")]
    Shape(#[from] serde_json::Error),
    #[error("response ended before the document was complete")]
    Incomplete,
    #[error("model service reported an error: {0}")]
    Service(String),
}
