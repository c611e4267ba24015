use crate::model::Analysis;
use crate::navigation::{Command, Navigator};

/// Identifies one generation request within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GenerationId(u64);

impl GenerationId {
    pub fn value(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Streaming,
    Complete,
    Failed(String),
}

/// One reader's view: the current response snapshot and the cursor over it.
///
/// Progress for anything but the current generation is dropped, which is
/// how results of a cancelled request are kept out of a newer one.
#[derive(Debug, Default)]
pub struct ReadingSession {
    topic: Option<String>,
    analysis: Analysis,
    language: Option<String>,
    navigator: Navigator,
    current: Option<GenerationId>,
    next_id: u64,
    status: SessionStatus,
}

impl ReadingSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new generation, discarding the previous snapshot.
    pub fn begin(&mut self, topic: impl Into<String>) -> GenerationId {
        self.next_id += 1;
        let id = GenerationId(self.next_id);
        self.clear();
        self.topic = Some(topic.into());
        self.current = Some(id);
        self.status = SessionStatus::Streaming;
        log::debug!("generation {} started", id.0);
        id
    }

    /// Replaces the snapshot. Returns false when the update was dropped.
    pub fn apply_progress(&mut self, id: GenerationId, analysis: Analysis) -> bool {
        if !self.accepts(id) {
            log::debug!("dropping progress for stale generation {}", id.0);
            return false;
        }

        if let Some(rtl) = analysis.rtl {
            self.navigator.set_rtl(rtl);
        }
        if let Some(language) = &analysis.language {
            self.language = Some(language.to_lowercase());
        }
        self.navigator.sync(analysis.sentences());
        self.analysis = analysis;
        true
    }

    /// Marks the generation finished. The snapshot no longer changes.
    pub fn finish(&mut self, id: GenerationId) -> bool {
        if !self.accepts(id) {
            return false;
        }
        self.status = SessionStatus::Complete;
        log::debug!(
            "generation {} complete with {} tokens",
            id.0,
            self.navigator.len()
        );
        true
    }

    /// Marks the generation failed, keeping what arrived so far.
    pub fn fail(&mut self, id: GenerationId, message: impl Into<String>) -> bool {
        if !self.accepts(id) {
            return false;
        }
        let message = message.into();
        log::warn!("generation {} failed: {message}", id.0);
        self.status = SessionStatus::Failed(message);
        true
    }

    /// Clears everything and invalidates the in-flight generation.
    pub fn reset(&mut self) {
        self.clear();
        self.topic = None;
        self.current = None;
        self.status = SessionStatus::Idle;
    }

    pub fn apply(&mut self, command: Command) {
        self.navigator.apply(command);
    }

    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    pub fn analysis(&self) -> &Analysis {
        &self.analysis
    }

    pub fn topic(&self) -> Option<&str> {
        self.topic.as_deref()
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn current_generation(&self) -> Option<GenerationId> {
        self.current
    }

    pub fn is_streaming(&self) -> bool {
        self.status == SessionStatus::Streaming
    }

    fn accepts(&self, id: GenerationId) -> bool {
        self.current == Some(id) && self.is_streaming()
    }

    fn clear(&mut self) {
        self.analysis = Analysis::default();
        self.language = None;
        self.navigator.reset();
    }
}
