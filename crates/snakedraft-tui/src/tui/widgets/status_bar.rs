// Status bar widget: connection, league, pick counter and pick clock.

use chrono::Utc;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use snakedraft_core::board;
use snakedraft_core::draft::dispatcher::{ConnectionStatus, SessionSnapshot};

use crate::tui::ViewState;

/// Render the status bar into the given area.
///
/// Layout: [connection] [league] | [pick counter] [round label] | [clock] [turn]
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let mut spans = Vec::new();

    match &state.snapshot {
        Some(snapshot) => {
            let (dot, color, label) = connection_indicator(snapshot.connection);
            spans.push(Span::styled(format!(" {dot} "), Style::default().fg(color)));
            spans.push(Span::styled(
                format!("{label} | {} | ", snapshot.state.league().name),
                Style::default().fg(Color::Gray),
            ));
            spans.push(Span::styled(
                progress_text(snapshot),
                Style::default().fg(Color::White),
            ));
            if let Some(clock) = clock_text(snapshot) {
                spans.push(Span::styled(
                    format!(" | {clock}"),
                    Style::default().fg(Color::Yellow),
                ));
            }
            if let Some(turn) = turn_text(snapshot) {
                spans.push(Span::styled(
                    format!(" | {turn}"),
                    Style::default()
                        .fg(Color::Green)
                        .add_modifier(Modifier::BOLD),
                ));
            }
        }
        None => spans.push(Span::styled(" Loading draft...", Style::default().fg(Color::Gray))),
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(paragraph, area);
}

/// Dot, color and label for a connection state.
pub fn connection_indicator(status: ConnectionStatus) -> (&'static str, Color, String) {
    match status {
        ConnectionStatus::Connecting => ("●", Color::Yellow, "Connecting".to_string()),
        ConnectionStatus::Connected => ("●", Color::Green, "Connected".to_string()),
        ConnectionStatus::Reconnecting { attempt } => {
            ("●", Color::Yellow, format!("Reconnecting ({attempt})"))
        }
        ConnectionStatus::Disconnected => ("●", Color::Red, "Disconnected".to_string()),
    }
}

/// "Pick 4/30 (R:1 P:4)", or "Draft complete".
pub fn progress_text(snapshot: &SessionSnapshot) -> String {
    let draft = &snapshot.state;
    if draft.is_complete() {
        return format!("Draft complete ({} picks)", draft.total_picks());
    }
    let current = draft.current_pick();
    format!(
        "Pick {}/{} ({})",
        current + 1,
        draft.total_picks(),
        board::slot_label(current, draft.league().teams.len())
    )
}

/// "0:42" left on the pick clock, when the league runs one.
pub fn clock_text(snapshot: &SessionSnapshot) -> Option<String> {
    let remaining = board::pick_clock_remaining(&snapshot.state, Utc::now())?;
    let secs = remaining.num_seconds();
    Some(format!("{}:{:02}", secs / 60, secs % 60))
}

fn turn_text(snapshot: &SessionSnapshot) -> Option<&'static str> {
    if snapshot.pending.is_some() {
        Some("Pick sent...")
    } else if snapshot.my_turn() {
        Some("Your pick!")
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
