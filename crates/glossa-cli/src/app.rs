use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use glossa_engine::navigation::{Command, Step};
use glossa_engine::session::ReadingSession;
use ratatui::layout::Rect;
use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::Duration;

use crate::client::CompletionClient;
use crate::ingest::{IngestEvent, Opener, ThrottledReader, Transport, Worker, coalesce};
use crate::layout::TokenLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Topic,
    Reading,
}

/// Where response bodies come from.
pub enum Source {
    Api(Arc<CompletionClient>),
    Replay {
        path: PathBuf,
        chunk_size: usize,
        delay: Duration,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Navigate(Command),
    EditTopic,
    Reset,
    Quit,
}

/// Key bindings of the reading view.
pub fn reading_action(key: KeyEvent) -> Option<Action> {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let action = match key.code {
        KeyCode::Char('c') if ctrl => Action::Quit,
        KeyCode::Char('l') if ctrl => Action::Reset,
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Right => Action::Navigate(Command::move_forward()),
        KeyCode::Left => Action::Navigate(Command::move_backward()),
        KeyCode::Down => Action::Navigate(Command::cycle_forward()),
        KeyCode::Up => Action::Navigate(Command::cycle_backward()),
        KeyCode::Char('t') => Action::Navigate(Command::toggle_transliteration()),
        KeyCode::Char('p') => Action::Navigate(Command::toggle_part_of_speech()),
        KeyCode::Char('r') => Action::Navigate(Command::toggle_translation()),
        KeyCode::Esc => Action::EditTopic,
        _ => return None,
    };
    Some(action)
}

/// Reading area as last drawn, kept for mouse hit testing.
#[derive(Debug, Clone, Default)]
pub struct TextView {
    pub area: Rect,
    pub layout: TokenLayout,
    pub offset: u16,
}

impl TextView {
    pub fn hit(&self, column: u16, row: u16) -> Option<usize> {
        let area = self.area;
        if column < area.x || row < area.y || column >= area.right() || row >= area.bottom() {
            return None;
        }
        self.layout
            .hit(column - area.x, row - area.y + self.offset)
    }
}

pub struct App {
    pub session: ReadingSession,
    pub mode: Mode,
    pub input: String,
    pub should_quit: bool,
    pub scroll: u16,
    pub view: TextView,
    source: Source,
    record: Option<PathBuf>,
    sender: Sender<IngestEvent>,
    events: Receiver<IngestEvent>,
    worker: Option<Worker>,
}

impl App {
    pub fn new(source: Source, record: Option<PathBuf>) -> Self {
        let (sender, events) = mpsc::channel();
        Self {
            session: ReadingSession::new(),
            mode: Mode::Topic,
            input: String::new(),
            should_quit: false,
            scroll: 0,
            view: TextView::default(),
            source,
            record,
            sender,
            events,
            worker: None,
        }
    }

    /// Cancels any running generation and starts a new one.
    pub fn start_generation(&mut self, topic: String) -> Result<()> {
        self.cancel_worker();
        let id = self.session.begin(topic.clone());
        self.scroll = 0;
        self.mode = Mode::Reading;

        let open = self.opener(topic);
        self.worker = Some(Worker::spawn(
            id,
            open,
            self.sender.clone(),
            self.record.clone(),
        )?);
        Ok(())
    }

    /// Applies everything the worker has sent so far, in arrival order.
    /// Only the newest snapshot of each generation is applied.
    pub fn drain_events(&mut self) {
        let batch: Vec<IngestEvent> = self.events.try_iter().collect();
        for event in coalesce(batch) {
            self.apply_event(event);
        }
    }

    pub fn apply_event(&mut self, event: IngestEvent) {
        match event {
            IngestEvent::Progress { id, analysis } => {
                self.session.apply_progress(id, analysis);
            }
            IngestEvent::Completed { id } => {
                self.session.finish(id);
            }
            IngestEvent::Failed { id, message } => {
                self.session.fail(id, message);
            }
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Result<()> {
        match self.mode {
            Mode::Topic => self.on_topic_key(key),
            Mode::Reading => {
                if let Some(action) = reading_action(key) {
                    self.perform(action);
                }
                Ok(())
            }
        }
    }

    /// Left click focuses a token and reveals its first layer.
    pub fn on_mouse(&mut self, mouse: MouseEvent) {
        if self.mode != Mode::Reading {
            return;
        }
        if let MouseEventKind::Down(MouseButton::Left) = mouse.kind
            && let Some(position) = self.view.hit(mouse.column, mouse.row)
        {
            self.session.apply(Command::set_focus(position));
            self.session.apply(Command::CycleLayer {
                direction: Step::Forward,
                reset: true,
            });
        }
    }

    pub fn perform(&mut self, action: Action) {
        match action {
            Action::Navigate(command) => self.session.apply(command),
            Action::EditTopic => {
                self.input = self.session.topic().unwrap_or_default().to_string();
                self.mode = Mode::Topic;
            }
            Action::Reset => self.reset(),
            Action::Quit => self.should_quit = true,
        }
    }

    pub fn reset(&mut self) {
        self.cancel_worker();
        self.session.reset();
        self.input.clear();
        self.scroll = 0;
        self.view = TextView::default();
        self.mode = Mode::Topic;
    }

    fn on_topic_key(&mut self, key: KeyEvent) -> Result<()> {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') if ctrl => self.should_quit = true,
            KeyCode::Char('l') if ctrl => self.reset(),
            KeyCode::Char(c) if !ctrl => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                let topic = self.input.trim().to_string();
                if !topic.is_empty() {
                    self.start_generation(topic)?;
                }
            }
            KeyCode::Esc if self.session.topic().is_some() => self.mode = Mode::Reading,
            _ => {}
        }
        Ok(())
    }

    fn cancel_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            log::debug!("cancelling generation {}", worker.id().value());
            worker.cancel();
        }
    }

    fn opener(&self, topic: String) -> Opener {
        match &self.source {
            Source::Api(client) => {
                let client = Arc::clone(client);
                Box::new(move || -> Result<(Box<dyn Read + Send>, Transport)> {
                    let response = client.stream(&topic)?;
                    let reader: Box<dyn Read + Send> = Box::new(response);
                    Ok((reader, Transport::Sse))
                })
            }
            Source::Replay {
                path,
                chunk_size,
                delay,
            } => {
                let path = path.clone();
                let (chunk_size, delay) = (*chunk_size, *delay);
                Box::new(move || -> Result<(Box<dyn Read + Send>, Transport)> {
                    let body = std::fs::read(&path)
                        .with_context(|| format!("Failed to read replay file {}", path.display()))?;
                    let transport = Transport::detect(&String::from_utf8_lossy(&body));
                    log::info!("replaying {} as {transport:?}", path.display());
                    let reader: Box<dyn Read + Send> =
                        Box::new(ThrottledReader::new(Cursor::new(body), chunk_size, delay));
                    Ok((reader, transport))
                })
            }
        }
    }
}
