use crate::model::RevealLayer;

/// One step along the token line or the layer cycle.
///
/// For focus movement `Forward` means rightward in an LTR line; the
/// navigator mirrors it for right-to-left text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Forward,
    Backward,
}

impl Step {
    pub fn delta(self) -> isize {
        match self {
            Step::Forward => 1,
            Step::Backward => -1,
        }
    }

    pub fn reversed(self) -> Step {
        match self {
            Step::Forward => Step::Backward,
            Step::Backward => Step::Forward,
        }
    }
}

/// Commands accepted by the navigator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveFocus(Step),
    CycleLayer { direction: Step, reset: bool },
    ToggleLayer(RevealLayer),
    SetFocus(usize),
}

impl Command {
    pub fn move_forward() -> Self {
        Command::MoveFocus(Step::Forward)
    }

    pub fn move_backward() -> Self {
        Command::MoveFocus(Step::Backward)
    }

    pub fn cycle_forward() -> Self {
        Command::CycleLayer {
            direction: Step::Forward,
            reset: false,
        }
    }

    pub fn cycle_backward() -> Self {
        Command::CycleLayer {
            direction: Step::Backward,
            reset: false,
        }
    }

    pub fn toggle_transliteration() -> Self {
        Command::ToggleLayer(RevealLayer::Transliteration)
    }

    pub fn toggle_part_of_speech() -> Self {
        Command::ToggleLayer(RevealLayer::PartOfSpeech)
    }

    pub fn toggle_translation() -> Self {
        Command::ToggleLayer(RevealLayer::Translation)
    }

    pub fn set_focus(index: usize) -> Self {
        Command::SetFocus(index)
    }
}
