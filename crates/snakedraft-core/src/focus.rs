// Board navigation: what the main panel is showing.

use crate::draft::model::{PlayerId, TeamId};

/// Content of the main board panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FocusContext {
    /// Paged pick history.
    #[default]
    Summary,
    PlayerDetail(PlayerId),
    TeamDetail(TeamId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusEvent {
    SelectPlayer(PlayerId),
    SelectTeam(TeamId),
    Back,
    /// A committed pick was applied to the board.
    PickAccepted,
}

/// Tracks the board's focus. Selections replace each other directly; back
/// and accepted picks both return to the summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FocusStateMachine {
    current: FocusContext,
}

impl FocusStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> FocusContext {
        self.current
    }

    /// Apply an event and return the new focus.
    pub fn handle(&mut self, event: FocusEvent) -> FocusContext {
        self.current = match event {
            FocusEvent::SelectPlayer(id) => FocusContext::PlayerDetail(id),
            FocusEvent::SelectTeam(id) => FocusContext::TeamDetail(id),
            FocusEvent::Back | FocusEvent::PickAccepted => FocusContext::Summary,
        };
        self.current
    }

    pub fn reset(&mut self) {
        self.current = FocusContext::Summary;
    }
}
