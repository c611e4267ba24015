use glossa_engine::model::RevealLayer;
use glossa_engine::session::SessionStatus;
use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::app::{App, Mode, TextView};
use crate::layout::{Cell, TokenLayout};

pub fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_topic(f, app, chunks[0]);
    render_text(f, app, chunks[1]);
    render_status(f, app, chunks[2]);
    render_help(f, app, chunks[3]);
}

fn render_topic(f: &mut Frame, app: &App, area: Rect) {
    let editing = app.mode == Mode::Topic;
    let text = if editing {
        app.input.as_str()
    } else {
        app.session.topic().unwrap_or_default()
    };
    let border = if editing {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };

    let topic = Paragraph::new(text).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(border)
            .title("Topic"),
    );
    f.render_widget(topic, area);

    if editing {
        let column = area.x + 1 + u16::try_from(app.input.width()).unwrap_or(u16::MAX);
        f.set_cursor_position((column.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn render_text(f: &mut Frame, app: &mut App, area: Rect) {
    let nav = app.session.navigator();
    let title = match app.session.language() {
        Some(language) => format!("Text ({language})"),
        None => "Text".to_string(),
    };
    let alignment = if nav.is_rtl() {
        Alignment::Right
    } else {
        Alignment::Left
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .title(title)
        .title_alignment(alignment);
    let inner = block.inner(area);
    f.render_widget(block, area);

    if nav.is_empty() {
        let hint = if app.session.is_streaming() {
            "Waiting for the model..."
        } else {
            "Type a topic and press Enter to generate a text"
        };
        let hint = Paragraph::new(hint)
            .style(Style::default().fg(Color::DarkGray))
            .alignment(alignment)
            .wrap(Wrap { trim: true });
        f.render_widget(hint, inner);
        app.view = TextView {
            area: inner,
            ..TextView::default()
        };
        return;
    }

    let layout = TokenLayout::new(nav, inner.width);
    let offset = layout.scroll_offset(inner.height, app.scroll);

    for cell in &layout.cells {
        if cell.y < offset || cell.y >= offset + inner.height {
            continue;
        }
        let rect = Rect::new(inner.x + cell.x, inner.y + cell.y - offset, cell.width, 1);
        f.render_widget(cell_line(cell), rect);
    }

    app.scroll = offset;
    app.view = TextView {
        area: inner,
        layout,
        offset,
    };
}

fn cell_line(cell: &Cell) -> Line<'static> {
    let base = if cell.focused {
        Style::default().bg(Color::Yellow).fg(Color::Black)
    } else {
        Style::default()
    };
    let text_style = match cell.layer {
        _ if cell.loading => base.fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        RevealLayer::Original => base,
        _ => base.add_modifier(Modifier::BOLD),
    };

    let mut spans = Vec::with_capacity(3);
    if let Some(badge) = cell.badge {
        spans.push(Span::styled(badge, base.fg(Color::Cyan)));
        spans.push(Span::styled(" ", base));
    }
    spans.push(Span::styled(cell.text.clone(), text_style));
    Line::from(spans)
}

fn render_status(f: &mut Frame, app: &App, area: Rect) {
    let nav = app.session.navigator();
    let (state, state_style) = match app.session.status() {
        SessionStatus::Idle => ("Idle".to_string(), Style::default()),
        SessionStatus::Streaming => ("Streaming...".to_string(), Style::default().fg(Color::Cyan)),
        SessionStatus::Complete => ("Complete".to_string(), Style::default().fg(Color::Green)),
        SessionStatus::Failed(message) => {
            (format!("Failed: {message}"), Style::default().fg(Color::Red))
        }
    };

    let mut spans = vec![Span::styled(state, state_style)];
    if !nav.is_empty() {
        spans.push(Span::raw(format!(
            " | Token {}/{} | {}",
            nav.focused_index() + 1,
            nav.len(),
            nav.reveal_state().label()
        )));
    }

    let status = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title("Status"))
        .wrap(Wrap { trim: true });
    f.render_widget(status, area);
}

fn render_help(f: &mut Frame, app: &App, area: Rect) {
    let help_text = match app.mode {
        Mode::Topic => Line::from(vec![
            Span::raw("Enter: Generate | "),
            Span::raw("Esc: Back to text | "),
            Span::raw("Ctrl-L: Reset | "),
            Span::raw("Ctrl-C: Quit"),
        ]),
        Mode::Reading => Line::from(vec![
            Span::raw("q: Quit | "),
            Span::raw("←/→: Move | "),
            Span::raw("↓/↑: Cycle | "),
            Span::raw("t/p/r: Transliteration/Part of speech/Translation | "),
            Span::raw("Click: Reveal | "),
            Span::raw("Esc: Topic | Ctrl-L: Reset"),
        ]),
    };

    f.render_widget(Paragraph::new(help_text), area);
}
