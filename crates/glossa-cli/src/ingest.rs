//! Background worker that turns a response body into session events.

use anyhow::{Context, Result};
use glossa_engine::model::Analysis;
use glossa_engine::session::GenerationId;
use glossa_engine::stream::{
    AnalysisStream, SseDecoder, SseEvent, StreamError, Utf8Accumulator, completion_delta,
};
use std::collections::HashSet;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::Sender;
use std::thread::{self, JoinHandle};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum IngestEvent {
    Progress { id: GenerationId, analysis: Analysis },
    Completed { id: GenerationId },
    Failed { id: GenerationId, message: String },
}

/// Drops every progress snapshot superseded by a later one for the same
/// generation in `events`. Everything else keeps its order.
pub fn coalesce(events: Vec<IngestEvent>) -> Vec<IngestEvent> {
    let mut seen = HashSet::new();
    let mut kept: Vec<IngestEvent> = events
        .into_iter()
        .rev()
        .filter(|event| match event {
            IngestEvent::Progress { id, .. } => seen.insert(*id),
            _ => true,
        })
        .collect();
    kept.reverse();
    kept
}

/// How the body is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// Chat completion server-sent events.
    Sse,
    /// The JSON document itself.
    Raw,
}

impl Transport {
    /// Guesses the framing of a recorded body from its first line.
    pub fn detect(head: &str) -> Self {
        let first = head.trim_start().lines().next().unwrap_or_default();
        if first.starts_with("data:") || first.starts_with(':') {
            Transport::Sse
        } else {
            Transport::Raw
        }
    }
}

/// Decodes body bytes into analysis snapshots.
pub struct ResponseDecoder {
    transport: Transport,
    utf8: Utf8Accumulator,
    sse: SseDecoder,
    stream: AnalysisStream,
    done: bool,
}

impl ResponseDecoder {
    pub fn new(transport: Transport) -> Self {
        Self {
            transport,
            utf8: Utf8Accumulator::new(),
            sse: SseDecoder::new(),
            stream: AnalysisStream::new(),
            done: false,
        }
    }

    /// Feeds body bytes and returns the snapshots they produced.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<Vec<Analysis>, StreamError> {
        let text = self.utf8.push(bytes);
        self.feed_text(&text)
    }

    /// True once an event stream sent its closing sentinel.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Final snapshot after the body ended.
    pub fn finish(&mut self) -> Result<Analysis, StreamError> {
        let rest = self.utf8.finish();
        self.feed_text(&rest)?;
        if self.transport == Transport::Sse
            && let Some(SseEvent::Data(payload)) = self.sse.finish()
        {
            self.push_delta(&payload)?;
        }
        self.stream.finish()
    }

    /// Response text accumulated so far.
    pub fn transcript(&self) -> &str {
        self.stream.text()
    }

    fn feed_text(&mut self, text: &str) -> Result<Vec<Analysis>, StreamError> {
        let mut snapshots = Vec::new();
        match self.transport {
            Transport::Raw => snapshots.extend(self.stream.push(text)?),
            Transport::Sse => {
                for event in self.sse.push(text) {
                    match event {
                        SseEvent::Data(payload) if !self.done => {
                            snapshots.extend(self.push_delta(&payload)?);
                        }
                        SseEvent::Data(_) => {}
                        SseEvent::Done => self.done = true,
                    }
                }
            }
        }
        Ok(snapshots)
    }

    fn push_delta(&mut self, payload: &str) -> Result<Option<Analysis>, StreamError> {
        match completion_delta(payload)? {
            Some(delta) => self.stream.push(&delta),
            None => Ok(None),
        }
    }
}

/// Reads in small pieces with a pause before each, to replay a recording
/// at a streaming pace.
pub struct ThrottledReader<R> {
    inner: R,
    chunk_size: usize,
    delay: Duration,
}

impl<R: Read> ThrottledReader<R> {
    pub fn new(inner: R, chunk_size: usize, delay: Duration) -> Self {
        Self {
            inner,
            chunk_size: chunk_size.max(1),
            delay,
        }
    }
}

impl<R: Read> Read for ThrottledReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        if !self.delay.is_zero() {
            thread::sleep(self.delay);
        }
        let len = buf.len().min(self.chunk_size);
        self.inner.read(&mut buf[..len])
    }
}

/// Drives `reader` to the end, sending one event per new snapshot.
///
/// Returns the response transcript on success. Stops quietly when
/// `cancel` is raised or the receiving side has gone away.
pub fn pump<R: Read>(
    mut reader: R,
    transport: Transport,
    id: GenerationId,
    events: &Sender<IngestEvent>,
    cancel: &AtomicBool,
) -> Result<Option<String>> {
    let mut decoder = ResponseDecoder::new(transport);
    let mut buf = [0u8; 4096];

    loop {
        if cancel.load(Ordering::Relaxed) {
            log::debug!("generation {} cancelled", id.value());
            return Ok(None);
        }
        let read = reader.read(&mut buf).context("Failed to read response")?;
        if read == 0 {
            break;
        }
        for analysis in decoder.feed(&buf[..read])? {
            if events.send(IngestEvent::Progress { id, analysis }).is_err() {
                return Ok(None);
            }
        }
        if decoder.is_done() {
            break;
        }
    }

    let analysis = decoder.finish()?;
    if cancel.load(Ordering::Relaxed) {
        return Ok(None);
    }
    // Receiver gone means the app is shutting down.
    let _ = events.send(IngestEvent::Progress { id, analysis });
    let _ = events.send(IngestEvent::Completed { id });
    Ok(Some(decoder.transcript().to_string()))
}

/// Opens the response body for a generation.
pub type Opener = Box<dyn FnOnce() -> Result<(Box<dyn Read + Send>, Transport)> + Send>;

/// Handle on a running generation worker.
pub struct Worker {
    id: GenerationId,
    cancel: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(
        id: GenerationId,
        open: Opener,
        events: Sender<IngestEvent>,
        record: Option<PathBuf>,
    ) -> Result<Self> {
        let cancel = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancel);

        let handle = thread::Builder::new()
            .name(format!("ingest-{}", id.value()))
            .spawn(move || {
                let outcome = open().and_then(|(reader, transport)| {
                    pump(reader, transport, id, &events, &flag)
                });
                match outcome {
                    Ok(Some(transcript)) => {
                        if let Some(path) = record
                            && let Err(e) = std::fs::write(&path, transcript)
                        {
                            log::warn!("Failed to record response to {}: {e}", path.display());
                        }
                    }
                    Ok(None) => {}
                    Err(e) => {
                        if !flag.load(Ordering::Relaxed) {
                            let _ = events.send(IngestEvent::Failed {
                                id,
                                message: format!("{e:#}"),
                            });
                        }
                    }
                }
            })
            .context("Failed to start ingest worker")?;

        Ok(Self {
            id,
            cancel,
            handle: Some(handle),
        })
    }

    pub fn id(&self) -> GenerationId {
        self.id
    }

    /// Asks the worker to stop. Events it still sends are stale.
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Relaxed);
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.cancel();
        if let Some(handle) = self.handle.take() {
            reap(self.id, handle);
        }
    }
}

/// Joins a thread that has already returned. A blocking read cannot be
/// interrupted, so a running thread is detached and exits on its own once
/// it sees the cancel flag. Returns whether the thread was joined.
fn reap(id: GenerationId, handle: JoinHandle<()>) -> bool {
    if !handle.is_finished() {
        log::debug!("detaching ingest worker {}", id.value());
        return false;
    }
    if handle.join().is_err() {
        log::warn!("ingest worker {} panicked", id.value());
    }
    true
}
