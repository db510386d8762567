// Available players widget: sortable table of undrafted players.
//
// Columns come from the stat schema, limited to keys the pool actually
// carries. The header marks the sorted column; the cursor row is highlighted
// and rows the user cannot draft right now are dimmed.

use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Cell, Row, Table, TableState};
use ratatui::Frame;
use serde_json::Value;

use snakedraft_core::draft::dispatcher::SessionSnapshot;
use snakedraft_core::draft::model::Player;
use snakedraft_core::pool::{SortDirection, StatColumn};

use crate::tui::ViewState;

/// Widest table we render; the rest of the schema is reachable via details.
pub const MAX_COLUMNS: usize = 8;

/// Render the available players table into the given area.
pub fn render(frame: &mut Frame, area: Rect, state: &ViewState) {
    let Some(snapshot) = state.snapshot.as_ref() else {
        let block = Block::default()
            .borders(Borders::ALL)
            .title("Available Players");
        frame.render_widget(block, area);
        return;
    };

    let columns = table_columns(snapshot);
    let header = Row::new(
        columns
            .iter()
            .map(|c| Cell::from(header_label(snapshot, c)))
            .collect::<Vec<_>>(),
    )
    .style(
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::BOLD),
    );

    let my_turn = snapshot.my_turn() && snapshot.pending.is_none();
    let rows: Vec<Row> = snapshot
        .table
        .iter()
        .map(|player| {
            let style = if my_turn {
                Style::default()
            } else {
                Style::default().fg(Color::Gray)
            };
            Row::new(
                columns
                    .iter()
                    .map(|c| Cell::from(cell_text(player, &c.key)))
                    .collect::<Vec<_>>(),
            )
            .style(style)
        })
        .collect();

    let widths: Vec<Constraint> = columns
        .iter()
        .map(|c| match c.key.as_str() {
            "Name" => Constraint::Min(16),
            _ => Constraint::Length(8),
        })
        .collect();

    let title = format!("Available Players ({})", snapshot.table.len());
    let table = Table::new(rows, widths)
        .header(header)
        .block(Block::default().borders(Borders::ALL).title(title))
        .row_highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol(">> ");

    let mut table_state = TableState::default().with_selected(Some(state.selected_row));
    frame.render_stateful_widget(table, area, &mut table_state);
}

/// Schema columns present in the pool, in schema order.
pub fn table_columns(snapshot: &SessionSnapshot) -> Vec<&StatColumn> {
    let Some(sample) = snapshot.state.pool().players().first() else {
        return Vec::new();
    };
    snapshot
        .schema
        .columns
        .iter()
        .filter(|c| sample.cell(&c.key).is_some())
        .take(MAX_COLUMNS)
        .collect()
}

/// Column abbreviation with a sort arrow on the sorted column.
pub fn header_label(snapshot: &SessionSnapshot, column: &StatColumn) -> String {
    match &snapshot.sort {
        Some(sort) if sort.column == column.key => {
            let arrow = match sort.direction {
                SortDirection::Ascending => "▲",
                SortDirection::Descending => "▼",
            };
            format!("{}{arrow}", column.abbreviation)
        }
        _ => column.abbreviation.clone(),
    }
}

/// Display text for one cell; missing values show as `--`.
pub fn cell_text(player: &Player, key: &str) -> String {
    match player.cell(key) {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => format!("{:.1}", n.as_f64().unwrap_or(0.0)),
        },
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Null) | None => "--".to_string(),
        Some(other) => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::fixtures;

    #[test]
    fn columns_follow_schema_order_and_pool_keys() {
        let d = fixtures::dispatcher();
        let snap = fixtures::snapshot(&d);
        let keys: Vec<&str> = table_columns(&snap).iter().map(|c| c.key.as_str()).collect();
        assert_eq!(keys, vec!["Name", "Position", "Team", "FantasyPoints"]);
    }

    #[test]
    fn sorted_column_gets_an_arrow() {
        let mut d = fixtures::dispatcher();
        d.sort_pool("FantasyPoints");
        let snap = fixtures::snapshot(&d);
        let columns = table_columns(&snap);
        let labels: Vec<String> = columns.iter().map(|c| header_label(&snap, c)).collect();
        assert_eq!(labels[0], "Name");
        assert!(labels[3].ends_with('▲') || labels[3].ends_with('▼'));
    }

    #[test]
    fn cell_text_formats_values() {
        let d = fixtures::dispatcher();
        let snap = fixtures::snapshot(&d);
        let zeta = snap.table.iter().find(|p| p.name == "Zeta").unwrap();
        assert_eq!(cell_text(zeta, "Name"), "Zeta");
        assert_eq!(cell_text(zeta, "FantasyPoints"), "10.5");
        assert_eq!(cell_text(zeta, "RushYards"), "--");
        let alpha = snap.table.iter().find(|p| p.name == "Alpha").unwrap();
        assert_eq!(cell_text(alpha, "FantasyPoints"), "30");
    }

    #[test]
    fn render_does_not_panic() {
        let backend = ratatui::backend::TestBackend::new(100, 20);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        let d = fixtures::dispatcher();
        let mut state = ViewState::default();
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
        state.apply_snapshot(fixtures::snapshot(&d));
        terminal
            .draw(|frame| render(frame, frame.area(), &state))
            .unwrap();
    }
}
