//! Placement of token cells in the reading area.
//!
//! Each sentence starts a new line and wraps greedily on token
//! boundaries. Right-to-left text is mirrored line by line, so the first
//! token of a line sits at its right edge.

use glossa_engine::model::RevealLayer;
use glossa_engine::navigation::{Navigator, sentence_groups};
use unicode_width::UnicodeWidthStr;

pub const LOADING: &str = "Loading...";

const GAP: u16 = 1;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub position: usize,
    pub x: u16,
    pub y: u16,
    pub width: u16,
    pub layer: RevealLayer,
    pub badge: Option<&'static str>,
    pub text: String,
    /// The revealed layer has no value yet.
    pub loading: bool,
    pub focused: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenLayout {
    pub cells: Vec<Cell>,
    pub height: u16,
}

impl TokenLayout {
    pub fn new(nav: &Navigator, width: u16) -> Self {
        let width = width.max(1);
        let mut cells = Vec::with_capacity(nav.len());
        let mut y = 0;

        for group in sentence_groups(nav.tokens()) {
            let mut line = Vec::new();
            let mut x: u16 = 0;

            for flat in group {
                let layer = nav.reveal_for(flat.position);
                let (text, loading) = match layer {
                    RevealLayer::Original => (flat.token.original.clone().unwrap_or_default(), false),
                    other => match flat.token.layer(other) {
                        Some(value) => (value.to_string(), false),
                        None => (LOADING.to_string(), true),
                    },
                };
                let badge = layer.badge();
                let cell_width = cell_width(badge, &text).min(width);

                if x > 0 && x.saturating_add(cell_width) > width {
                    place_line(&mut cells, &mut line, width, nav.is_rtl());
                    y += 1;
                    x = 0;
                }

                line.push(Cell {
                    position: flat.position,
                    x,
                    y,
                    width: cell_width,
                    layer,
                    badge,
                    text,
                    loading,
                    focused: !nav.is_empty() && flat.position == nav.focused_index(),
                });
                x = x.saturating_add(cell_width).saturating_add(GAP);
            }

            place_line(&mut cells, &mut line, width, nav.is_rtl());
            y += 1;
        }

        Self { cells, height: y }
    }

    /// Token position under a point relative to the layout origin.
    pub fn hit(&self, x: u16, y: u16) -> Option<usize> {
        self.cells
            .iter()
            .find(|cell| cell.y == y && x >= cell.x && x < cell.x + cell.width)
            .map(|cell| cell.position)
    }

    /// First line to show so that the focused token stays in view.
    pub fn scroll_offset(&self, viewport_height: u16, current: u16) -> u16 {
        let Some(focused) = self.cells.iter().find(|cell| cell.focused) else {
            return 0;
        };
        let viewport_height = viewport_height.max(1);
        if focused.y < current {
            focused.y
        } else if focused.y >= current + viewport_height {
            focused.y + 1 - viewport_height
        } else {
            current.min(self.height.saturating_sub(1))
        }
    }
}

fn cell_width(badge: Option<&str>, text: &str) -> u16 {
    let badge_width = badge.map_or(0, |b| b.width() + 1);
    let width = badge_width + text.width().max(1);
    u16::try_from(width).unwrap_or(u16::MAX)
}

fn place_line(cells: &mut Vec<Cell>, line: &mut Vec<Cell>, width: u16, rtl: bool) {
    for mut cell in line.drain(..) {
        if rtl {
            cell.x = width.saturating_sub(cell.x + cell.width);
        }
        cells.push(cell);
    }
}
