use serde::Deserialize;

use super::StreamError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    Data(String),
    /// The `[DONE]` sentinel closing a chat completion stream.
    Done,
}

/// Incremental server-sent events framing.
///
/// Only `data` fields are kept; comments and other fields are ignored.
#[derive(Debug, Default)]
pub struct SseDecoder {
    line: String,
    data: Vec<String>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds text and returns the events it completed.
    pub fn push(&mut self, text: &str) -> Vec<SseEvent> {
        let mut events = Vec::new();
        for piece in text.split_inclusive('\n') {
            self.line.push_str(piece);
            if !self.line.ends_with('\n') {
                continue;
            }
            let line = std::mem::take(&mut self.line);
            if let Some(event) = self.process_line(line.trim_end_matches(['\n', '\r'])) {
                events.push(event);
            }
        }
        events
    }

    /// Completes a final event that was not followed by a blank line.
    pub fn finish(&mut self) -> Option<SseEvent> {
        let line = std::mem::take(&mut self.line);
        let line = line.trim_end_matches('\r');
        if !line.is_empty() {
            self.process_line(line);
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) -> Option<SseEvent> {
        if line.is_empty() {
            return self.dispatch();
        }
        if line.starts_with(':') {
            return None;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };
        if field == "data" {
            self.data.push(value.to_string());
        }
        None
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data.is_empty() {
            return None;
        }
        let payload = self.data.join("\n");
        self.data.clear();
        if payload.trim() == "[DONE]" {
            Some(SseEvent::Done)
        } else {
            Some(SseEvent::Data(payload))
        }
    }
}

#[derive(Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<Choice>,
    error: Option<ServiceError>,
}

#[derive(Deserialize)]
struct Choice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Default, Deserialize)]
struct Delta {
    content: Option<String>,
}

#[derive(Deserialize)]
struct ServiceError {
    message: String,
}

/// Extracts the text delta from a chat completion chunk.
pub fn completion_delta(payload: &str) -> Result<Option<String>, StreamError> {
    let chunk: CompletionChunk = serde_json::from_str(payload)?;
    if let Some(error) = chunk.error {
        return Err(StreamError::Service(error.message));
    }
    Ok(chunk
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.delta.content)
        .filter(|content| !content.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn splits_events_on_blank_lines() {
        let mut sse = SseDecoder::new();
        let events = sse.push("data: one\n\ndata: two\n\n");
        assert_eq!(
            events,
            vec![SseEvent::Data("one".into()), SseEvent::Data("two".into())]
        );
    }

    #[test]
    fn events_may_span_chunks() {
        let mut sse = SseDecoder::new();
        assert!(sse.push("da").is_empty());
        assert!(sse.push("ta: {\"a\":").is_empty());
        assert!(sse.push(" 1}\r\n").is_empty());
        assert_eq!(
            sse.push("\r\n"),
            vec![SseEvent::Data("{\"a\": 1}".into())]
        );
    }

    #[test]
    fn joins_multi_line_data_and_ignores_other_fields() {
        let mut sse = SseDecoder::new();
        let events = sse.push(": keep-alive\nevent: message\nid: 7\ndata: a\ndata:b\n\n");
        assert_eq!(events, vec![SseEvent::Data("a\nb".into())]);
    }

    #[test]
    fn recognises_done_sentinel() {
        let mut sse = SseDecoder::new();
        assert_eq!(sse.push("data: [DONE]\n\n"), vec![SseEvent::Done]);
    }

    #[test]
    fn finish_flushes_unterminated_event() {
        let mut sse = SseDecoder::new();
        assert!(sse.push("data: last").is_empty());
        assert_eq!(sse.finish(), Some(SseEvent::Data("last".into())));
        assert_eq!(sse.finish(), None);
    }

    #[test]
    fn extracts_delta_content() {
        let payload = r#"{"id":"c1","choices":[{"index":0,"delta":{"content":"{\"rtl\""}}]}"#;
        assert_eq!(
            completion_delta(payload).unwrap(),
            Some("{\"rtl\"".to_string())
        );
    }

    #[test]
    fn chunk_without_content_yields_nothing() {
        assert_eq!(
            completion_delta(r#"{"choices":[{"delta":{"role":"assistant"}}]}"#).unwrap(),
            None
        );
        assert_eq!(
            completion_delta(r#"{"choices":[{"delta":{},"finish_reason":"stop"}]}"#).unwrap(),
            None
        );
        assert_eq!(completion_delta(r#"{"choices":[]}"#).unwrap(), None);
    }

    #[test]
    fn service_error_is_reported() {
        let err = completion_delta(r#"{"error":{"message":"quota exceeded"}}"#).unwrap_err();
        assert!(matches!(err, StreamError::Service(message) if message == "quota exceeded"));
    }
}
