// Pick submissions awaiting the server's `draft` echo.

use std::time::Duration;

use tokio::time::Instant;

use super::history::DraftHistory;
use super::model::PlayerId;
use crate::protocol::DraftPayload;

/// A pick we sent that the server has not yet committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPick {
    pub request_id: u64,
    pub slot: usize,
    pub player: PlayerId,
    pub sent_at: Instant,
}

/// How a pending pick ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PickResolution {
    /// The server committed our player to our slot.
    Confirmed,
    /// The slot was committed with someone else.
    Superseded { by: PlayerId },
    /// No echo arrived in time.
    TimedOut,
}

impl PickResolution {
    /// Whether the local mirror should be re-fetched after this outcome.
    pub fn needs_resync(&self) -> bool {
        !matches!(self, PickResolution::Confirmed)
    }
}

impl PendingPick {
    pub fn new(request_id: u64, slot: usize, player: PlayerId) -> Self {
        PendingPick {
            request_id,
            slot,
            player,
            sent_at: Instant::now(),
        }
    }

    pub fn deadline(&self, timeout: Duration) -> Instant {
        self.sent_at + timeout
    }

    /// Match a `draft` broadcast against this pick. The request id wins when
    /// the server echoes one; otherwise the slot decides.
    pub fn resolve(&self, draft: &DraftPayload) -> Option<PickResolution> {
        let ours = match draft.request {
            Some(id) => id == self.request_id || draft.pick == self.slot,
            None => draft.pick == self.slot,
        };
        if !ours {
            return None;
        }
        Some(self.outcome(draft.player))
    }

    /// Match against a freshly fetched history. An open slot leaves the pick
    /// pending.
    pub fn resolve_against(&self, history: &DraftHistory) -> Option<PickResolution> {
        let filled = history.get(self.slot)?.player?;
        Some(self.outcome(filled))
    }

    fn outcome(&self, committed: PlayerId) -> PickResolution {
        if committed == self.player {
            PickResolution::Confirmed
        } else {
            PickResolution::Superseded { by: committed }
        }
    }
}
