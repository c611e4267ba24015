use crate::model::Analysis;
use crate::parsing::parse_partial;

use super::StreamError;

/// Accumulates the response text and tracks the newest snapshot.
#[derive(Debug, Default)]
pub struct AnalysisStream {
    text: String,
    latest: Option<Analysis>,
}

impl AnalysisStream {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `chunk` and returns the snapshot if it changed.
    ///
    /// On error the previous snapshot stays the latest one.
    pub fn push(&mut self, chunk: &str) -> Result<Option<Analysis>, StreamError> {
        if chunk.is_empty() {
            return Ok(None);
        }
        self.text.push_str(chunk);

        let parsed = parse_partial(&self.text).inspect_err(|e| {
            log::debug!("response text stopped parsing after {} bytes: {e}", self.text.len());
        });
        let Some(partial) = parsed? else {
            return Ok(None);
        };
        let analysis = Analysis::from_value(partial.value)?;
        if self.latest.as_ref() == Some(&analysis) {
            return Ok(None);
        }

        self.latest = Some(analysis.clone());
        Ok(Some(analysis))
    }

    /// Parses the final text, which must be a complete document.
    pub fn finish(&mut self) -> Result<Analysis, StreamError> {
        let partial = parse_partial(&self.text)?.ok_or(StreamError::Incomplete)?;
        if !partial.complete {
            return Err(StreamError::Incomplete);
        }
        let analysis = Analysis::from_value(partial.value)?;
        self.latest = Some(analysis.clone());
        Ok(analysis)
    }

    pub fn latest(&self) -> Option<&Analysis> {
        self.latest.as_ref()
    }

    /// Raw response text received so far.
    pub fn text(&self) -> &str {
        &self.text
    }
}
