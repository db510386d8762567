// Client-side legality gate for pick submissions.
//
// The arbiter never touches the draft state. It only decides whether a pick
// request may be sent; the server's `draft` echo is what changes the board.

use thiserror::Error;

use super::model::{LeagueId, PlayerId, TeamId};
use super::pending::PendingPick;
use super::state::DraftState;
use crate::protocol::PickRequest;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PickRejection {
    #[error("you do not manage a team in this league")]
    NoTeam,

    #[error("the draft is complete")]
    DraftComplete,

    #[error("it is not your pick; team {on_clock} is on the clock")]
    NotOnClock { on_clock: TeamId },

    #[error("player {0} is not available")]
    PlayerUnavailable(PlayerId),

    #[error("your pick for slot {slot} is still awaiting confirmation")]
    PickPending { slot: usize },

    #[error("slot {slot} is already filled; the board is out of sync")]
    OutOfSync { slot: usize },
}

/// Gatekeeper for one participant's picks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickArbiter {
    team: Option<TeamId>,
    league: LeagueId,
}

impl PickArbiter {
    /// `team` is `None` for a participant watching without a team.
    pub fn new(league: LeagueId, team: Option<TeamId>) -> Self {
        PickArbiter { team, league }
    }

    pub fn team(&self) -> Option<TeamId> {
        self.team
    }

    /// Check a pick against the current snapshot and return the slot it
    /// would fill.
    pub fn check(
        &self,
        state: &DraftState,
        pending: Option<&PendingPick>,
        player: PlayerId,
    ) -> Result<usize, PickRejection> {
        let team = self.team.ok_or(PickRejection::NoTeam)?;
        let slot = state.on_clock().ok_or(PickRejection::DraftComplete)?;
        if slot.player.is_some() {
            return Err(PickRejection::OutOfSync { slot: slot.slot });
        }
        if slot.team != team {
            return Err(PickRejection::NotOnClock {
                on_clock: slot.team,
            });
        }
        if let Some(pending) = pending {
            return Err(PickRejection::PickPending {
                slot: pending.slot,
            });
        }
        if !state.is_available(player) {
            return Err(PickRejection::PlayerUnavailable(player));
        }
        Ok(slot.slot)
    }

    /// Whether the pick action should be enabled for this player.
    pub fn can_pick(&self, state: &DraftState, pending: Option<&PendingPick>, player: PlayerId) -> bool {
        self.check(state, pending, player).is_ok()
    }

    /// Build the outbound request for a legal pick.
    pub fn request(
        &self,
        state: &DraftState,
        pending: Option<&PendingPick>,
        player: PlayerId,
        request_id: u64,
    ) -> Result<PickRequest, PickRejection> {
        let slot = self.check(state, pending, player)?;
        let team = self.team.ok_or(PickRejection::NoTeam)?;
        Ok(PickRequest {
            player,
            pick: slot,
            team,
            league: self.league,
            request: Some(request_id),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::model::fixtures;
    use crate::draft::state::CommittedPick;
    use std::sync::Arc;

    fn state() -> DraftState {
        DraftState::new(
            Arc::new(fixtures::league(2, 2)),
            Arc::new(fixtures::pool(6)),
            Vec::new(),
        )
        .unwrap()
    }

    #[test]
    fn on_clock_team_may_pick_available_player() {
        let arbiter = PickArbiter::new(LeagueId(1), Some(TeamId(1)));
        let request = arbiter.request(&state(), None, PlayerId(100), 1).unwrap();
        assert_eq!(request.pick, 0);
        assert_eq!(request.team, TeamId(1));
        assert_eq!(request.league, LeagueId(1));
        assert_eq!(request.request, Some(1));
    }

    #[test]
    fn off_clock_team_is_rejected() {
        let arbiter = PickArbiter::new(LeagueId(1), Some(TeamId(2)));
        assert_eq!(
            arbiter.check(&state(), None, PlayerId(100)),
            Err(PickRejection::NotOnClock {
                on_clock: TeamId(1)
            })
        );
    }

    #[test]
    fn drafted_or_unknown_player_is_rejected() {
        let state = state()
            .apply_pick(CommittedPick {
                slot: 0,
                player: PlayerId(100),
                team: TeamId(1),
            })
            .unwrap();
        let arbiter = PickArbiter::new(LeagueId(1), Some(TeamId(2)));
        assert_eq!(
            arbiter.check(&state, None, PlayerId(100)),
            Err(PickRejection::PlayerUnavailable(PlayerId(100)))
        );
        assert!(!arbiter.can_pick(&state, None, PlayerId(999)));
        assert!(arbiter.can_pick(&state, None, PlayerId(101)));
    }

    #[test]
    fn second_submission_waits_for_echo() {
        let arbiter = PickArbiter::new(LeagueId(1), Some(TeamId(1)));
        let pending = PendingPick::new(1, 0, PlayerId(100));
        assert_eq!(
            arbiter.check(&state(), Some(&pending), PlayerId(101)),
            Err(PickRejection::PickPending { slot: 0 })
        );
    }

    #[test]
    fn filled_on_clock_slot_is_rejected() {
        // Slot 1 committed before slot 0 leaves the filled slot 1 on the clock.
        let state = state()
            .apply_pick(CommittedPick {
                slot: 1,
                player: PlayerId(100),
                team: TeamId(2),
            })
            .unwrap();
        assert_eq!(state.current_pick(), 1);
        let arbiter = PickArbiter::new(LeagueId(1), Some(TeamId(2)));
        assert_eq!(
            arbiter.check(&state, None, PlayerId(101)),
            Err(PickRejection::OutOfSync { slot: 1 })
        );
    }

    #[test]
    fn spectators_and_finished_drafts_cannot_pick() {
        let spectator = PickArbiter::new(LeagueId(1), None);
        assert_eq!(
            spectator.check(&state(), None, PlayerId(100)),
            Err(PickRejection::NoTeam)
        );

        let mut done = state();
        for (slot, (player, team)) in [(100, 1), (101, 2), (102, 2), (103, 1)].into_iter().enumerate() {
            done = done
                .apply_pick(CommittedPick {
                    slot,
                    player: PlayerId(player),
                    team: TeamId(team),
                })
                .unwrap();
        }
        let arbiter = PickArbiter::new(LeagueId(1), Some(TeamId(1)));
        assert_eq!(
            arbiter.check(&done, None, PlayerId(104)),
            Err(PickRejection::DraftComplete)
        );
    }
}
