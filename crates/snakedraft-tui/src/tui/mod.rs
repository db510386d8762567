// TUI draft board: layout, input handling, and widget rendering.
//
// The session publishes `SessionSnapshot`s over a `watch` channel and pushes
// notifications over mpsc. The TUI keeps the latest snapshot plus a little
// local state (cursor, page, chat input) in `ViewState` and re-renders at
// ~30 fps.

pub mod input;
pub mod layout;
pub mod widgets;

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream};
use futures_util::StreamExt;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use ratatui::Frame;
use tokio::sync::{mpsc, watch};

use snakedraft_app::protocol::{UiUpdate, UserCommand};
use snakedraft_core::board;
use snakedraft_core::draft::dispatcher::SessionSnapshot;
use snakedraft_core::protocol::Notification;

use layout::{build_layout, AppLayout};

/// Notifications kept for display.
const NOTIFICATION_HISTORY: usize = 5;

// ---------------------------------------------------------------------------
// ViewState
// ---------------------------------------------------------------------------

/// TUI-local state: the latest session snapshot plus cursor and input state.
#[derive(Default)]
pub struct ViewState {
    /// Latest published session state; `None` until the first snapshot.
    pub snapshot: Option<Arc<SessionSnapshot>>,
    /// Most recent notifications, oldest first.
    pub notifications: VecDeque<Notification>,
    /// Cursor row in the available-player table.
    pub selected_row: usize,
    /// Summary page chosen by the user; `None` follows the current pick.
    pub page: Option<usize>,
    /// Index into the league's team list for team selection.
    pub team_cursor: Option<usize>,
    /// Whether keystrokes go to the chat input.
    pub chat_mode: bool,
    pub chat_input: String,
    /// Set when the session has stopped for good.
    pub ended: Option<String>,
}

impl ViewState {
    /// Replace the snapshot and keep the cursor on the table.
    pub fn apply_snapshot(&mut self, snapshot: Arc<SessionSnapshot>) {
        let rows = snapshot.table.len();
        self.selected_row = self.selected_row.min(rows.saturating_sub(1));
        self.snapshot = Some(snapshot);
    }

    /// Summary page to show: the user's choice, else the current pick's.
    pub fn summary_page(&self) -> usize {
        match (&self.page, &self.snapshot) {
            (Some(page), _) => *page,
            (None, Some(snap)) => board::initial_page(snap.state.current_pick()),
            (None, None) => 0,
        }
    }

    pub fn page_count(&self) -> usize {
        self.snapshot
            .as_ref()
            .map_or(0, |s| board::page_count(s.state.total_picks()))
    }

    pub fn latest_notification(&self) -> Option<&Notification> {
        self.notifications.back()
    }
}

// ---------------------------------------------------------------------------
// UiUpdate processing
// ---------------------------------------------------------------------------

/// Apply a single UiUpdate to the ViewState.
fn apply_ui_update(state: &mut ViewState, update: UiUpdate) {
    match update {
        UiUpdate::Notify(notification) => {
            state.notifications.push_back(notification);
            while state.notifications.len() > NOTIFICATION_HISTORY {
                state.notifications.pop_front();
            }
        }
        UiUpdate::SessionEnded { reason } => {
            state.chat_mode = false;
            state.ended = Some(reason);
        }
    }
}

// ---------------------------------------------------------------------------
// Render frame
// ---------------------------------------------------------------------------

fn render_frame(frame: &mut Frame, state: &ViewState) {
    let layout = build_layout(frame.area());

    widgets::status_bar::render(frame, layout.status_bar, state);
    widgets::board::render(frame, layout.board, state);
    widgets::pool::render(frame, layout.pool, state);
    widgets::order::render(frame, layout.order, state);
    widgets::chat::render(frame, layout.chat, state);
    render_help_bar(frame, &layout, state);
}

fn help_text(state: &ViewState) -> &'static str {
    if state.ended.is_some() {
        " q:Quit"
    } else if state.chat_mode {
        " Enter:Send | Esc:Cancel"
    } else {
        " q:Quit | j/k:Move | Enter:Details | d:Draft | t:Team | Esc:Back | [/]:Page | 1-9:Sort | c:Chat"
    }
}

fn render_help_bar(frame: &mut Frame, layout: &AppLayout, state: &ViewState) {
    let paragraph = Paragraph::new(Line::from(vec![Span::styled(
        help_text(state),
        Style::default()
            .fg(Color::White)
            .add_modifier(Modifier::DIM),
    )]))
    .style(Style::default().bg(Color::DarkGray));
    frame.render_widget(paragraph, layout.help_bar);
}

// ---------------------------------------------------------------------------
// Main TUI loop
// ---------------------------------------------------------------------------

/// Run the TUI event loop.
///
/// 1. Initializes the terminal (raw mode, alternate screen).
/// 2. Installs a panic hook to restore the terminal on crash.
/// 3. Runs a select loop: snapshots, UI updates, keyboard input, render ticks.
/// 4. Restores the terminal on exit.
pub async fn run(
    mut snapshots: watch::Receiver<Arc<SessionSnapshot>>,
    mut ui_rx: mpsc::Receiver<UiUpdate>,
    cmd_tx: mpsc::Sender<UserCommand>,
) -> anyhow::Result<()> {
    let mut terminal = ratatui::init();

    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        ratatui::restore();
        original_hook(panic_info);
    }));

    let mut view_state = ViewState::default();
    view_state.apply_snapshot(snapshots.borrow_and_update().clone());
    let mut snapshots_open = true;
    let mut updates_open = true;

    let mut event_stream = EventStream::new();

    let mut render_tick = tokio::time::interval(Duration::from_millis(33));
    render_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    let result = loop {
        tokio::select! {
            changed = snapshots.changed(), if snapshots_open => {
                match changed {
                    Ok(()) => {
                        let snapshot = snapshots.borrow_and_update().clone();
                        view_state.apply_snapshot(snapshot);
                    }
                    // Session gone; keep showing the last board.
                    Err(_) => snapshots_open = false,
                }
            }

            update = ui_rx.recv(), if updates_open => {
                match update {
                    Some(update) => apply_ui_update(&mut view_state, update),
                    None => updates_open = false,
                }
            }

            maybe_event = event_stream.next() => {
                match maybe_event {
                    Some(Ok(Event::Key(key_event))) => {
                        if let Some(cmd) = input::handle_key(key_event, &mut view_state) {
                            let quit = cmd == UserCommand::Quit;
                            let _ = cmd_tx.send(cmd).await;
                            if quit {
                                break Ok(());
                            }
                        }
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => break Err(anyhow::Error::new(e).context("terminal input failed")),
                    None => break Ok(()),
                }
            }

            _ = render_tick.tick() => {
                if let Err(e) = terminal.draw(|frame| render_frame(frame, &view_state)) {
                    break Err(anyhow::Error::new(e).context("failed to draw frame"));
                }
            }
        }
    };

    ratatui::restore();
    result
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fixtures {
    use std::sync::Arc;

    use serde_json::json;
    use snakedraft_core::draft::dispatcher::{EventDispatcher, SessionSnapshot};
    use snakedraft_core::draft::model::{
        DraftPool, LeagueId, LeagueInfo, ManagerId, Player, Team,
    };
    use snakedraft_core::draft::state::DraftState;
    use snakedraft_core::pool::StatSchema;

    /// Dispatcher for manager 10 (team 1) in a 3-team, 2-round draft.
    pub fn dispatcher() -> EventDispatcher {
        let teams: Vec<Team> = serde_json::from_value(json!([
            {"ID": 1, "Name": "Ones", "Slot": 1, "Manager": {"ID": 10, "name": "Ann", "email": ""}},
            {"ID": 2, "Name": "Twos", "Slot": 2, "Manager": {"ID": 20, "name": "Bo", "email": ""}},
            {"ID": 3, "Name": "Threes", "Slot": 3, "Manager": {"ID": 30, "name": "", "email": ""}}
        ]))
        .unwrap();
        let players: Vec<Player> = serde_json::from_value(json!([
            {"ID": 1, "Name": "Zeta", "Position": "WR", "Team": "NYJ", "FantasyPoints": 10.5},
            {"ID": 2, "Name": "Alpha", "Position": "RB", "Team": "DAL", "FantasyPoints": 30},
            {"ID": 3, "Name": "Mu", "Position": "QB", "Team": "KC", "FantasyPoints": 20},
            {"ID": 4, "Name": "Kappa", "Position": "TE", "Team": "SF", "FantasyPoints": 5},
            {"ID": 5, "Name": "Omega", "Position": "WR", "Team": "MIA", "FantasyPoints": 15},
            {"ID": 6, "Name": "Beta", "Position": "RB", "Team": "GB", "FantasyPoints": 25}
        ]))
        .unwrap();
        let league = LeagueInfo {
            id: LeagueId(1),
            name: "Render League".into(),
            teams,
            rounds: 2,
            draft_clock: 60,
        };
        let state =
            DraftState::new(Arc::new(league), Arc::new(DraftPool::new(players)), Vec::new()).unwrap();
        EventDispatcher::new(state, StatSchema::football(), ManagerId(10))
    }

    pub fn snapshot(dispatcher: &EventDispatcher) -> Arc<SessionSnapshot> {
        dispatcher.subscribe().borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use snakedraft_core::protocol::Severity;

    #[test]
    fn view_state_default_is_empty() {
        let state = ViewState::default();
        assert!(state.snapshot.is_none());
        assert!(state.notifications.is_empty());
        assert_eq!(state.selected_row, 0);
        assert_eq!(state.summary_page(), 0);
        assert_eq!(state.page_count(), 0);
        assert!(!state.chat_mode);
        assert!(state.ended.is_none());
    }

    #[test]
    fn apply_snapshot_clamps_cursor() {
        let mut d = fixtures::dispatcher();
        let mut state = ViewState {
            selected_row: 9,
            ..ViewState::default()
        };
        d.dispatch_raw(r#"{"Kind":"draft","Pick":0,"Player":2,"Team":1}"#);
        state.apply_snapshot(fixtures::snapshot(&d));
        assert_eq!(state.selected_row, 4);
        assert_eq!(state.page_count(), 1);
    }

    #[test]
    fn summary_page_follows_current_pick_unless_chosen() {
        let d = fixtures::dispatcher();
        let mut state = ViewState::default();
        state.apply_snapshot(fixtures::snapshot(&d));
        assert_eq!(state.summary_page(), 0);
        state.page = Some(4);
        assert_eq!(state.summary_page(), 4);
    }

    #[test]
    fn notifications_are_capped() {
        let mut state = ViewState::default();
        for i in 0..8 {
            apply_ui_update(
                &mut state,
                UiUpdate::Notify(Notification::new(Severity::Info, format!("n{i}"))),
            );
        }
        assert_eq!(state.notifications.len(), NOTIFICATION_HISTORY);
        assert_eq!(state.latest_notification().unwrap().message, "n7");
        assert_eq!(state.notifications.front().unwrap().message, "n3");
    }

    #[test]
    fn session_end_leaves_chat_mode() {
        let mut state = ViewState {
            chat_mode: true,
            ..ViewState::default()
        };
        apply_ui_update(
            &mut state,
            UiUpdate::SessionEnded {
                reason: "gave up".into(),
            },
        );
        assert!(!state.chat_mode);
        assert_eq!(state.ended.as_deref(), Some("gave up"));
        assert_eq!(help_text(&state), " q:Quit");
    }

    #[test]
    fn full_frame_renders_without_panicking() {
        let d = fixtures::dispatcher();
        let mut state = ViewState::default();
        state.apply_snapshot(fixtures::snapshot(&d));
        let backend = ratatui::backend::TestBackend::new(140, 40);
        let mut terminal = ratatui::Terminal::new(backend).unwrap();
        terminal.draw(|frame| render_frame(frame, &state)).unwrap();

        let empty = ViewState::default();
        terminal.draw(|frame| render_frame(frame, &empty)).unwrap();
    }
}
