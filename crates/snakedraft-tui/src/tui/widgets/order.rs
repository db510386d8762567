// Draft order widget: the next two rounds of picks.
//
// Each row shows the slot label, team name and the team's latest smack.
// Colors follow the slot highlight: green on the clock, red when the
// manager on the clock is away, gray for away managers further down.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table};
use ratatui::Frame;

use snakedraft_core::board::{self, SlotHighlight, UpcomingPick};

use crate::tui::ViewState;

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let block = Block::default().borders(Borders::ALL).title("Draft Order");
    let Some(snapshot) = state.snapshot.as_ref() else {
        frame.render_widget(block, area);
        return;
    };

    let upcoming = board::upcoming(&snapshot.state, &snapshot.presence);
    let rows: Vec<Row> = upcoming
        .iter()
        .map(|pick| {
            let smack = snapshot
                .smacks
                .get(&pick.team)
                .map(String::as_str)
                .unwrap_or("");
            let marker = if Some(pick.team) == snapshot.my_team { "*" } else { "" };
            Row::new(vec![
                Cell::from(format!("R:{} P:{}", pick.round, pick.pick_in_round)),
                Cell::from(format!("{}{marker}", pick.team_name)),
                Cell::from(smack.to_string()),
            ])
            .style(highlight_style(pick))
        })
        .collect();

    let widths = [
        Constraint::Length(9),
        Constraint::Length(18),
        Constraint::Min(10),
    ];
    let table = Table::new(rows, widths).block(block);
    frame.render_widget(table, area);
}

pub fn highlight_style(pick: &UpcomingPick) -> Style {
    match pick.highlight {
        SlotHighlight::OnClock => Style::default()
            .fg(Color::Black)
            .bg(Color::Green)
            .add_modifier(Modifier::BOLD),
        SlotHighlight::OnClockAway => Style::default()
            .fg(Color::White)
            .bg(Color::Red)
            .add_modifier(Modifier::BOLD),
        SlotHighlight::Upcoming => Style::default().fg(Color::White),
        SlotHighlight::UpcomingAway => Style::default().fg(Color::DarkGray),
    }
}
