use crate::model::{RevealLayer, Sentence};

use super::commands::{Command, Step};
use super::flatten::{FlatToken, flatten};

/// Focused token and the layer shown on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigationCursor {
    pub focused_index: usize,
    pub reveal: RevealLayer,
}

/// Cursor state over the flattened tokens of the current snapshot.
///
/// Every operation is total: out-of-range input is clamped and commands
/// that cannot apply leave the state untouched.
#[derive(Debug, Clone, Default)]
pub struct Navigator {
    tokens: Vec<FlatToken>,
    cursor: NavigationCursor,
    rtl: bool,
}

impl Navigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tokens(&self) -> &[FlatToken] {
        &self.tokens
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn cursor(&self) -> NavigationCursor {
        self.cursor
    }

    pub fn focused_index(&self) -> usize {
        self.cursor.focused_index
    }

    pub fn reveal_state(&self) -> RevealLayer {
        self.cursor.reveal
    }

    pub fn focused(&self) -> Option<&FlatToken> {
        self.tokens.get(self.cursor.focused_index)
    }

    pub fn is_rtl(&self) -> bool {
        self.rtl
    }

    pub fn set_rtl(&mut self, rtl: bool) {
        self.rtl = rtl;
    }

    /// Layer displayed for the token at `position`.
    pub fn reveal_for(&self, position: usize) -> RevealLayer {
        if !self.is_empty() && position == self.cursor.focused_index {
            self.cursor.reveal
        } else {
            RevealLayer::Original
        }
    }

    /// Rebuilds the flattened view from a new snapshot.
    pub fn sync(&mut self, sentences: &[Option<Sentence>]) {
        self.tokens = flatten(sentences);
        self.cursor.focused_index = self.clamp(self.cursor.focused_index as isize);
    }

    /// Back to the initial state with no tokens.
    pub fn reset(&mut self) {
        self.tokens.clear();
        self.cursor = NavigationCursor::default();
        self.rtl = false;
    }

    pub fn apply(&mut self, command: Command) {
        match command {
            Command::MoveFocus(step) => self.move_focus(step),
            Command::CycleLayer { direction, reset } => self.cycle_layer(direction, reset),
            Command::ToggleLayer(layer) => self.toggle_layer(layer),
            Command::SetFocus(index) => self.set_focus(index),
        }
    }

    /// Moves one token in visual direction `step`.
    pub fn move_focus(&mut self, step: Step) {
        if self.is_empty() {
            return;
        }
        let step = if self.rtl { step.reversed() } else { step };
        let target = self.clamp(self.cursor.focused_index as isize + step.delta());
        if target != self.cursor.focused_index {
            self.cursor.focused_index = target;
            self.cursor.reveal = RevealLayer::Original;
        }
    }

    /// Shows `layer` on the focused token, or hides it when already shown.
    ///
    /// Does nothing when the focused token has no value for `layer`.
    pub fn toggle_layer(&mut self, layer: RevealLayer) {
        if layer == RevealLayer::Original {
            return;
        }
        let Some(focused) = self.focused() else {
            return;
        };
        if !focused.token.has_layer(layer) {
            return;
        }
        self.cursor.reveal = if self.cursor.reveal == layer {
            RevealLayer::Original
        } else {
            layer
        };
    }

    /// Steps around the layer cycle to the next layer with a value.
    ///
    /// Starts from `original` when `reset` is set. `original` always
    /// qualifies, so at most one full turn is taken.
    pub fn cycle_layer(&mut self, direction: Step, reset: bool) {
        let Some(focused) = self.focused() else {
            return;
        };
        let start = if reset {
            RevealLayer::Original
        } else {
            self.cursor.reveal
        };

        let next = (1..=RevealLayer::ALL.len() as isize)
            .map(|k| start.offset(k * direction.delta()))
            .find(|layer| *layer == RevealLayer::Original || focused.token.has_layer(*layer))
            .unwrap_or(RevealLayer::Original);
        self.cursor.reveal = next;
    }

    /// Jumps to `index`, clamped. Keeps the current layer.
    pub fn set_focus(&mut self, index: usize) {
        if self.is_empty() {
            return;
        }
        self.cursor.focused_index = self.clamp(index.min(isize::MAX as usize) as isize);
    }

    fn clamp(&self, index: isize) -> usize {
        match self.tokens.len() {
            0 => 0,
            len => index.clamp(0, len as isize - 1) as usize,
        }
    }
}
