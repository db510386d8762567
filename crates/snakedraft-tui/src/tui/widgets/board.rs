// Board widget: the main panel.
//
// Shows one of four views: the paged pick summary, a player's stat sheet, a
// team's roster grouped by position, or every team's roster once the draft
// is over. A finished draft ignores focus.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};
use ratatui::Frame;

use snakedraft_core::board::{self, DEFAULT_POINTS_COLUMN};
use snakedraft_core::draft::dispatcher::SessionSnapshot;
use snakedraft_core::draft::model::{PlayerId, TeamId};
use snakedraft_core::focus::FocusContext;

use super::pool::cell_text;
use crate::tui::ViewState;

/// What the board should draw for a snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardView {
    Summary { page: usize },
    Player(PlayerId),
    Team(TeamId),
    Final,
}

pub fn board_view(snapshot: &SessionSnapshot, page: usize) -> BoardView {
    if snapshot.state.is_complete() {
        return BoardView::Final;
    }
    match snapshot.focus {
        FocusContext::Summary => BoardView::Summary { page },
        FocusContext::PlayerDetail(id) => BoardView::Player(id),
        FocusContext::TeamDetail(id) => BoardView::Team(id),
    }
}

pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = state.snapshot.as_ref() else {
        let block = Block::default().borders(Borders::ALL).title("Draft Board");
        frame.render_widget(Paragraph::new("Loading...").block(block), area);
        return;
    };

    match board_view(snapshot, state.summary_page()) {
        BoardView::Summary { page } => render_summary(frame, area, snapshot, page),
        BoardView::Player(id) => render_player(frame, area, snapshot, id),
        BoardView::Team(id) => render_team(frame, area, snapshot, id),
        BoardView::Final => render_final(frame, area, snapshot),
    }
}

fn render_summary(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot, page: usize) {
    let current = snapshot.state.current_pick();
    let rows: Vec<Row> = board::summary_page(&snapshot.state, page)
        .into_iter()
        .map(|row| {
            let style = if row.slot == current {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else if row.player_name.is_none() {
                Style::default().fg(Color::DarkGray)
            } else {
                Style::default()
            };
            Row::new(vec![
                Cell::from(row.label),
                Cell::from(row.team_name),
                Cell::from(row.player_name.unwrap_or_else(|| "--".to_string())),
            ])
            .style(style)
        })
        .collect();

    let title = format!(
        "Draft Board (page {}/{})",
        page + 1,
        board::page_count(snapshot.state.total_picks()).max(1)
    );
    let widths = [
        Constraint::Length(10),
        Constraint::Length(18),
        Constraint::Min(16),
    ];
    let table = Table::new(rows, widths)
        .header(
            Row::new(vec!["Pick", "Team", "Player"])
                .style(Style::default().add_modifier(Modifier::BOLD)),
        )
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(table, area);
}

/// One "Label: value" line per schema column the player carries.
pub fn player_lines(snapshot: &SessionSnapshot, id: PlayerId) -> Vec<Line<'static>> {
    let Some(player) = snapshot.state.pool().get(id) else {
        return vec![Line::from(format!("Unknown player {id}"))];
    };
    let mut lines: Vec<Line> = snapshot
        .schema
        .columns
        .iter()
        .filter(|c| player.cell(&c.key).is_some())
        .map(|c| {
            Line::from(vec![
                Span::styled(
                    format!("{}: ", c.label),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(cell_text(player, &c.key)),
            ])
        })
        .collect();
    if !snapshot.state.is_available(id) {
        lines.push(Line::styled("Drafted", Style::default().fg(Color::Red)));
    }
    lines
}

fn render_player(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot, id: PlayerId) {
    let title = format!("Player: {}", snapshot.state.pool().player_name(id));
    let paragraph = Paragraph::new(player_lines(snapshot, id))
        .wrap(Wrap { trim: true })
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

/// Position groups with point totals, then the picks in draft order.
pub fn team_lines(snapshot: &SessionSnapshot, team: TeamId) -> Vec<Line<'static>> {
    let state = &snapshot.state;
    let team_count = state.league().teams.len();
    let mut lines = Vec::new();
    for group in board::roster_breakdown(state, team, DEFAULT_POINTS_COLUMN) {
        let position = if group.position.is_empty() {
            "--".to_string()
        } else {
            group.position
        };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{position} ({:.1}): ", group.points),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(group.players.join(", ")),
        ]));
    }
    if lines.is_empty() {
        lines.push(Line::from("No picks yet"));
        return lines;
    }
    lines.push(Line::from(""));
    for entry in board::team_roster(state, team) {
        lines.push(Line::from(format!(
            "{}  {}",
            board::slot_label(entry.slot, team_count),
            entry.name()
        )));
    }
    lines
}

fn render_team(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot, team: TeamId) {
    let title = format!("Team: {}", snapshot.state.league().team_name(team));
    let paragraph = Paragraph::new(team_lines(snapshot, team))
        .block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(paragraph, area);
}

fn render_final(frame: &mut Frame, area: Rect, snapshot: &SessionSnapshot) {
    let mut lines = Vec::new();
    for summary in board::final_summaries(&snapshot.state) {
        lines.push(Line::styled(
            summary.team.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ));
        let names: Vec<String> = summary
            .picks
            .iter()
            .map(|p| format!("{} ({})", p.name(), p.position()))
            .collect();
        lines.push(Line::from(format!("  {}", names.join(", "))));
    }
    let paragraph = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::ALL).title("Final Rosters"));
    frame.render_widget(paragraph, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::fixtures;
    use snakedraft_core::focus::FocusEvent;

    fn line_text(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn view_follows_focus_until_complete() {
        let mut d = fixtures::dispatcher();
        assert_eq!(
            board_view(&fixtures::snapshot(&d), 0),
            BoardView::Summary { page: 0 }
        );
        d.handle_focus(FocusEvent::SelectTeam(TeamId(2)));
        assert_eq!(board_view(&fixtures::snapshot(&d), 0), BoardView::Team(TeamId(2)));

        // Snake order for three teams: 1, 2, 3, 3, 2, 1.
        for (pick, (player, team)) in [(1, 1), (2, 2), (3, 3), (4, 3)].into_iter().enumerate() {
            d.dispatch_raw(&format!(
                r#"{{"Kind":"draft","Pick":{pick},"Player":{player},"Team":{team}}}"#
            ));
        }
        d.handle_focus(FocusEvent::SelectPlayer(PlayerId(1)));
        assert_eq!(board_view(&fixtures::snapshot(&d), 0), BoardView::Player(PlayerId(1)));

        d.dispatch_raw(r#"{"Kind":"draft","Pick":4,"Player":5,"Team":2}"#);
        d.dispatch_raw(r#"{"Kind":"draft","Pick":5,"Player":6,"Team":1}"#);
        d.handle_focus(FocusEvent::SelectTeam(TeamId(2)));
        assert_eq!(board_view(&fixtures::snapshot(&d), 0), BoardView::Final);
    }

    #[test]
    fn player_sheet_uses_schema_labels() {
        let mut d = fixtures::dispatcher();
        let lines: Vec<String> = player_lines(&fixtures::snapshot(&d), PlayerId(2))
            .iter()
            .map(line_text)
            .collect();
        assert_eq!(
            lines,
            vec!["Name: Alpha", "Position: RB", "Team: DAL", "Fantasy Points: 30"]
        );

        d.dispatch_raw(r#"{"Kind":"draft","Pick":0,"Player":2,"Team":1}"#);
        let lines = player_lines(&fixtures::snapshot(&d), PlayerId(2));
        assert_eq!(line_text(lines.last().unwrap()), "Drafted");
    }

    #[test]
    fn team_sheet_groups_by_position() {
        let mut d = fixtures::dispatcher();
        assert_eq!(
            line_text(&team_lines(&fixtures::snapshot(&d), TeamId(1))[0]),
            "No picks yet"
        );
        d.dispatch_raw(r#"{"Kind":"draft","Pick":0,"Player":2,"Team":1}"#);
        let lines: Vec<String> = team_lines(&fixtures::snapshot(&d), TeamId(1))
            .iter()
            .map(line_text)
            .collect();
        assert_eq!(lines[0], "RB (30.0): Alpha");
        assert_eq!(lines.last().unwrap(), "R:1 P:1  Alpha");
    }

    #[test]
    fn every_view_renders() {
        let backend = ratatui::backend::TestBackend::new(80, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let mut d = fixtures::dispatcher();
        let mut state = ViewState::default();
        terminal.draw(|f| render(f, f.area(), &state)).unwrap();

        state.apply_snapshot(fixtures::snapshot(&d));
        terminal.draw(|f| render(f, f.area(), &state)).unwrap();

        d.handle_focus(FocusEvent::SelectPlayer(PlayerId(3)));
        state.apply_snapshot(fixtures::snapshot(&d));
        terminal.draw(|f| render(f, f.area(), &state)).unwrap();

        d.handle_focus(FocusEvent::SelectTeam(TeamId(3)));
        state.apply_snapshot(fixtures::snapshot(&d));
        terminal.draw(|f| render(f, f.area(), &state)).unwrap();

        let picks = [(1, 1), (2, 2), (3, 3), (4, 3), (5, 2), (6, 1)];
        for (pick, (player, team)) in picks.into_iter().enumerate() {
            d.dispatch_raw(&format!(
                r#"{{"Kind":"draft","Pick":{pick},"Player":{player},"Team":{team}}}"#
            ));
        }
        state.apply_snapshot(fixtures::snapshot(&d));
        assert!(state.snapshot.as_ref().unwrap().state.is_complete());
        terminal.draw(|f| render(f, f.area(), &state)).unwrap();
    }
}
