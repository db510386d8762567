// Chat widget: the chat line currently playing, the latest notification and
// the chat input.
//
// Chat lines play one at a time at the session's pulse rate; the widget only
// shows whatever the snapshot says is playing now.

use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Frame;

use snakedraft_core::protocol::{Notification, Severity};

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let line = if state.chat_mode {
        Line::from(vec![
            Span::styled("> ", Style::default().fg(Color::Cyan)),
            Span::raw(state.chat_input.clone()),
            Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
        ])
    } else {
        status_line(state)
    };

    let title = if state.chat_mode { "Say something" } else { "Chat" };
    let paragraph =
        Paragraph::new(line).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

/// Playing chat first, then the latest notification, then the end reason.
fn status_line(state: &ViewState) -> Line<'static> {
    if let Some(reason) = &state.ended {
        return Line::styled(
            format!("Session ended: {reason}"),
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        );
    }
    let playing = state.snapshot.as_ref().and_then(|s| s.now_playing.as_ref());
    if let Some(item) = playing {
        return Line::from(vec![
            Span::styled(
                format!("{}: ", item.sender),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ),
            Span::raw(item.text.clone()),
        ]);
    }
    match state.latest_notification() {
        Some(notification) => notification_line(notification),
        None => Line::styled("", Style::default()),
    }
}

pub fn notification_line(notification: &Notification) -> Line<'static> {
    Line::styled(
        format!(
            "[{}] {}",
            notification.at.format("%H:%M:%S"),
            notification.message
        ),
        Style::default().fg(severity_color(notification.severity)),
    )
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::Info => Color::White,
        Severity::Success => Color::Green,
        Severity::Warning => Color::Yellow,
        Severity::Error => Color::Red,
    }
}
