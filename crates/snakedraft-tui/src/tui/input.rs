// Keyboard input handling and command dispatch.
//
// Translates crossterm key events into UserCommand messages for the session
// loop, or into local ViewState changes (cursor, page, chat input).

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use snakedraft_app::protocol::UserCommand;
use snakedraft_core::draft::model::PlayerId;
use snakedraft_core::focus::FocusEvent;

use super::widgets::pool;
use super::ViewState;

/// Handle a keyboard event.
///
/// Returns `Some(UserCommand)` when the key should reach the session loop,
/// `None` when it was handled locally.
pub fn handle_key(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    // crossterm reports releases on some platforms.
    if key_event.kind != KeyEventKind::Press {
        return None;
    }

    if key_event.modifiers.contains(KeyModifiers::CONTROL)
        && key_event.code == KeyCode::Char('c')
    {
        return Some(UserCommand::Quit);
    }

    if view_state.ended.is_some() {
        return match key_event.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(UserCommand::Quit),
            _ => None,
        };
    }

    if view_state.chat_mode {
        return handle_chat_mode(key_event, view_state);
    }

    match key_event.code {
        KeyCode::Char('q') => Some(UserCommand::Quit),

        KeyCode::Up | KeyCode::Char('k') => {
            view_state.selected_row = view_state.selected_row.saturating_sub(1);
            None
        }
        KeyCode::Down | KeyCode::Char('j') => {
            let rows = table_len(view_state);
            if view_state.selected_row + 1 < rows {
                view_state.selected_row += 1;
            }
            None
        }

        KeyCode::Enter => {
            selected_player(view_state).map(|id| UserCommand::Focus(FocusEvent::SelectPlayer(id)))
        }
        KeyCode::Char('d') => selected_player(view_state).map(UserCommand::SubmitPick),
        KeyCode::Char('t') => next_team(view_state),
        KeyCode::Esc => {
            view_state.team_cursor = None;
            Some(UserCommand::Focus(FocusEvent::Back))
        }

        KeyCode::Char('[') => {
            let page = view_state.summary_page();
            view_state.page = Some(page.saturating_sub(1));
            None
        }
        KeyCode::Char(']') => {
            let page = view_state.summary_page();
            let last = view_state.page_count().saturating_sub(1);
            view_state.page = Some((page + 1).min(last));
            None
        }
        KeyCode::Char('0') => {
            view_state.page = None;
            None
        }

        KeyCode::Char(c @ '1'..='9') => {
            let index = c as usize - '1' as usize;
            let snapshot = view_state.snapshot.as_ref()?;
            pool::table_columns(snapshot)
                .get(index)
                .map(|column| UserCommand::SortBy(column.key.clone()))
        }

        KeyCode::Char('c') | KeyCode::Char('i') => {
            view_state.chat_mode = true;
            None
        }

        _ => None,
    }
}

/// Keys while typing a chat message.
fn handle_chat_mode(key_event: KeyEvent, view_state: &mut ViewState) -> Option<UserCommand> {
    match key_event.code {
        KeyCode::Esc => {
            view_state.chat_mode = false;
            view_state.chat_input.clear();
            None
        }
        KeyCode::Enter => {
            view_state.chat_mode = false;
            let text = std::mem::take(&mut view_state.chat_input);
            if text.trim().is_empty() {
                None
            } else {
                Some(UserCommand::SendChat(text))
            }
        }
        KeyCode::Backspace => {
            view_state.chat_input.pop();
            None
        }
        KeyCode::Char(c) => {
            view_state.chat_input.push(c);
            None
        }
        _ => None,
    }
}

fn table_len(view_state: &ViewState) -> usize {
    view_state.snapshot.as_ref().map_or(0, |s| s.table.len())
}

fn selected_player(view_state: &ViewState) -> Option<PlayerId> {
    view_state
        .snapshot
        .as_ref()?
        .table
        .get(view_state.selected_row)
        .map(|p| p.id)
}

/// Advance the team cursor and focus that team.
fn next_team(view_state: &mut ViewState) -> Option<UserCommand> {
    let teams = &view_state.snapshot.as_ref()?.state.league().teams;
    if teams.is_empty() {
        return None;
    }
    let next = view_state.team_cursor.map_or(0, |i| (i + 1) % teams.len());
    let team = teams[next].id;
    view_state.team_cursor = Some(next);
    Some(UserCommand::Focus(FocusEvent::SelectTeam(team)))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
