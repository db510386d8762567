// Screen layout: panel arrangement and sizing.
//
// +--------------------------------------------------+
// | Status Bar (1 row)                                |
// +-----------------------------+--------------------+
// | Board (45%)                 | Draft Order        |
// +-----------------------------+ (40%)              |
// | Available Players (55%)     |                    |
// +-----------------------------+--------------------+
// | Chat (3 rows)                                     |
// +--------------------------------------------------+
// | Help Bar (1 row)                                  |
// +--------------------------------------------------+

use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Resolved screen areas for each panel.
#[derive(Debug, Clone)]
pub struct AppLayout {
    /// Connection, league, pick counter, clock.
    pub status_bar: Rect,
    /// Summary page, player or team detail, or final rosters.
    pub board: Rect,
    /// Available-player table.
    pub pool: Rect,
    /// Upcoming picks with presence and smack text.
    pub order: Rect,
    /// Chat pulse, latest notification and chat input.
    pub chat: Rect,
    pub help_bar: Rect,
}

pub fn build_layout(area: Rect) -> AppLayout {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Min(10),   // middle
            Constraint::Length(3), // chat
            Constraint::Length(1), // help bar
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(vertical[1]);

    let left = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(horizontal[0]);

    AppLayout {
        status_bar: vertical[0],
        board: left[0],
        pool: left[1],
        order: horizontal[1],
        chat: vertical[2],
        help_bar: vertical[3],
    }
}
