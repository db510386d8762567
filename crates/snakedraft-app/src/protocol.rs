// Messages between the session loop and a front-end.

use snakedraft_core::draft::model::PlayerId;
use snakedraft_core::focus::FocusEvent;
use snakedraft_core::protocol::Notification;

/// Commands sent from the front-end to the session loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserCommand {
    /// Draft a player for the local user's team.
    SubmitPick(PlayerId),
    SendChat(String),
    Focus(FocusEvent),
    /// Toggle the available-player table sort on a raw column key.
    SortBy(String),
    Quit,
}

/// Updates pushed from the session loop to the front-end. Board state
/// itself travels on the snapshot `watch` channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiUpdate {
    Notify(Notification),
    /// The session stopped and will not reconnect.
    SessionEnded { reason: String },
}
