// Draft state: the client's mirror of the pick history and available pool.
//
// A `DraftState` is an immutable snapshot. Applying a committed pick returns
// a new snapshot and leaves the old one untouched, so a duplicate or stale
// event can never corrupt the mirror halfway through an update.

use std::collections::BTreeSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::warn;

use super::history::{DraftHistory, DraftSlot};
use super::model::{DraftPool, LeagueInfo, PlayerId, TeamId};
use super::order::{extend_history, OrderError};

/// A pick the server has committed and broadcast.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommittedPick {
    pub slot: usize,
    pub player: PlayerId,
    pub team: TeamId,
}

/// Why a committed pick was not applied to the mirror.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PickConflict {
    #[error("slot {slot} already holds player {player}")]
    AlreadyApplied { slot: usize, player: PlayerId },

    #[error("slot {slot} holds player {existing}, server says {incoming}")]
    SlotTaken {
        slot: usize,
        existing: PlayerId,
        incoming: PlayerId,
    },

    #[error("slot {slot} is outside the {len}-pick draft")]
    SlotOutOfRange { slot: usize, len: usize },

    #[error("player {player} was already drafted at slot {slot}")]
    PlayerAlreadyDrafted { player: PlayerId, slot: usize },
}

impl PickConflict {
    /// Duplicates are harmless; everything else means the mirror diverged
    /// from the server.
    pub fn is_divergence(&self) -> bool {
        !matches!(self, PickConflict::AlreadyApplied { .. })
    }
}

/// The complete state of the draft as mirrored locally.
#[derive(Debug, Clone)]
pub struct DraftState {
    league: Arc<LeagueInfo>,
    pool: Arc<DraftPool>,
    history: DraftHistory,
    /// Undrafted player IDs.
    available: BTreeSet<PlayerId>,
    /// Filled slot count.
    current_pick: usize,
    /// When the current pick came on the clock.
    on_clock_since: DateTime<Utc>,
}

impl DraftState {
    /// Build the initial state from the league, the roster and whatever
    /// history the server has persisted.
    pub fn new(
        league: Arc<LeagueInfo>,
        pool: Arc<DraftPool>,
        persisted: Vec<DraftSlot>,
    ) -> Result<Self, OrderError> {
        let history = extend_history(persisted, &league.teams, league.rounds)?;
        let available = pool
            .ids()
            .filter(|id| history.slot_of(*id).is_none())
            .collect();
        let current_pick = history.filled();

        Ok(DraftState {
            league,
            pool,
            history,
            available,
            current_pick,
            on_clock_since: Utc::now(),
        })
    }

    /// Rebuild from a freshly fetched history, keeping league and roster.
    pub fn rebuild(&self, persisted: Vec<DraftSlot>) -> Result<DraftState, OrderError> {
        DraftState::new(Arc::clone(&self.league), Arc::clone(&self.pool), persisted)
    }

    /// Apply a committed pick, producing the next snapshot.
    ///
    /// Re-applying a pick already in the history returns
    /// [`PickConflict::AlreadyApplied`] and leaves state unchanged.
    pub fn apply_pick(&self, pick: CommittedPick) -> Result<DraftState, PickConflict> {
        let Some(slot) = self.history.get(pick.slot) else {
            return Err(PickConflict::SlotOutOfRange {
                slot: pick.slot,
                len: self.history.len(),
            });
        };

        if let Some(existing) = slot.player {
            return Err(if existing == pick.player {
                PickConflict::AlreadyApplied {
                    slot: pick.slot,
                    player: existing,
                }
            } else {
                PickConflict::SlotTaken {
                    slot: pick.slot,
                    existing,
                    incoming: pick.player,
                }
            });
        }

        if let Some(other) = self.history.slot_of(pick.player) {
            return Err(PickConflict::PlayerAlreadyDrafted {
                player: pick.player,
                slot: other,
            });
        }

        if slot.team != pick.team {
            warn!(
                "Pick {} scheduled for team {} but committed by team {}",
                pick.slot, slot.team, pick.team
            );
        }
        if !self.pool.contains(pick.player) {
            warn!("Committed pick references unknown player {}", pick.player);
        }

        let mut available = self.available.clone();
        available.remove(&pick.player);

        Ok(DraftState {
            league: Arc::clone(&self.league),
            pool: Arc::clone(&self.pool),
            history: self.history.with_pick(pick.slot, pick.player),
            available,
            current_pick: self.current_pick + 1,
            on_clock_since: Utc::now(),
        })
    }

    pub fn league(&self) -> &LeagueInfo {
        &self.league
    }

    pub fn pool(&self) -> &DraftPool {
        &self.pool
    }

    pub fn history(&self) -> &DraftHistory {
        &self.history
    }

    pub fn current_pick(&self) -> usize {
        self.current_pick
    }

    pub fn total_picks(&self) -> usize {
        self.history.len()
    }

    pub fn is_complete(&self) -> bool {
        self.current_pick >= self.total_picks()
    }

    /// The slot currently on the clock, or `None` once the draft is over.
    pub fn on_clock(&self) -> Option<&DraftSlot> {
        self.history.get(self.current_pick)
    }

    pub fn on_clock_since(&self) -> DateTime<Utc> {
        self.on_clock_since
    }

    pub fn is_available(&self, player: PlayerId) -> bool {
        self.available.contains(&player)
    }

    pub fn available(&self) -> &BTreeSet<PlayerId> {
        &self.available
    }

    /// Human-readable announcement for a committed pick.
    pub fn describe_pick(&self, pick: CommittedPick) -> String {
        format!(
            "{} has selected {}",
            self.league.team_name(pick.team),
            self.pool.player_name(pick.player)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::model::fixtures;

    fn fresh(teams: i64, rounds: usize) -> DraftState {
        DraftState::new(
            Arc::new(fixtures::league(teams, rounds)),
            Arc::new(fixtures::pool(20)),
            Vec::new(),
        )
        .unwrap()
    }

    fn pick(slot: usize, player: i64, team: i64) -> CommittedPick {
        CommittedPick {
            slot,
            player: PlayerId(player),
            team: TeamId(team),
        }
    }

    #[test]
    fn fresh_state_has_open_history() {
        let state = fresh(4, 3);
        assert_eq!(state.total_picks(), 12);
        assert_eq!(state.current_pick(), 0);
        assert_eq!(state.available().len(), 20);
        assert_eq!(state.on_clock().map(|s| s.team), Some(TeamId(1)));
        assert!(!state.is_complete());
    }

    #[test]
    fn persisted_picks_are_removed_from_pool() {
        let state = DraftState::new(
            Arc::new(fixtures::league(2, 2)),
            Arc::new(fixtures::pool(5)),
            vec![DraftSlot {
                slot: 0,
                team: TeamId(1),
                player: Some(PlayerId(101)),
            }],
        )
        .unwrap();
        assert_eq!(state.current_pick(), 1);
        assert!(!state.is_available(PlayerId(101)));
        assert_eq!(state.available().len(), 4);
        assert_eq!(state.on_clock().map(|s| s.team), Some(TeamId(2)));
    }

    #[test]
    fn apply_pick_fills_slot_and_advances() {
        let state = fresh(4, 3);
        let next = state.apply_pick(pick(0, 100, 1)).unwrap();

        assert_eq!(next.history().get(0).unwrap().player, Some(PlayerId(100)));
        assert!(!next.is_available(PlayerId(100)));
        assert_eq!(next.current_pick(), 1);
        assert_eq!(next.on_clock().map(|s| s.team), Some(TeamId(2)));

        // The previous snapshot is untouched.
        assert_eq!(state.current_pick(), 0);
        assert!(state.is_available(PlayerId(100)));
    }

    #[test]
    fn duplicate_pick_is_rejected_without_change() {
        let state = fresh(4, 3).apply_pick(pick(0, 100, 1)).unwrap();
        let err = state.apply_pick(pick(0, 100, 1)).unwrap_err();
        assert_eq!(
            err,
            PickConflict::AlreadyApplied {
                slot: 0,
                player: PlayerId(100)
            }
        );
        assert!(!err.is_divergence());
        assert_eq!(state.current_pick(), 1);
    }

    #[test]
    fn different_player_in_filled_slot_is_divergence() {
        let state = fresh(4, 3).apply_pick(pick(0, 100, 1)).unwrap();
        let err = state.apply_pick(pick(0, 101, 1)).unwrap_err();
        assert!(matches!(err, PickConflict::SlotTaken { slot: 0, .. }));
        assert!(err.is_divergence());
    }

    #[test]
    fn player_drafted_twice_is_divergence() {
        let state = fresh(4, 3).apply_pick(pick(0, 100, 1)).unwrap();
        let err = state.apply_pick(pick(1, 100, 2)).unwrap_err();
        assert_eq!(
            err,
            PickConflict::PlayerAlreadyDrafted {
                player: PlayerId(100),
                slot: 0
            }
        );
    }

    #[test]
    fn slot_out_of_range() {
        let state = fresh(2, 1);
        assert_eq!(
            state.apply_pick(pick(2, 100, 1)).unwrap_err(),
            PickConflict::SlotOutOfRange { slot: 2, len: 2 }
        );
    }

    #[test]
    fn draft_completes_after_last_pick() {
        let mut state = fresh(2, 1);
        state = state.apply_pick(pick(0, 100, 1)).unwrap();
        state = state.apply_pick(pick(1, 101, 2)).unwrap();
        assert!(state.is_complete());
        assert!(state.on_clock().is_none());
    }

    #[test]
    fn rebuild_replaces_history() {
        let state = fresh(2, 2).apply_pick(pick(0, 100, 1)).unwrap();
        let rebuilt = state
            .rebuild(vec![
                DraftSlot {
                    slot: 0,
                    team: TeamId(1),
                    player: Some(PlayerId(105)),
                },
                DraftSlot {
                    slot: 1,
                    team: TeamId(2),
                    player: Some(PlayerId(106)),
                },
            ])
            .unwrap();
        assert_eq!(rebuilt.current_pick(), 2);
        assert!(rebuilt.is_available(PlayerId(100)));
        assert!(!rebuilt.is_available(PlayerId(105)));
        assert_eq!(rebuilt.league().name, state.league().name);
    }

    #[test]
    fn describe_pick_names_team_and_player() {
        let state = fresh(2, 1);
        assert_eq!(state.describe_pick(pick(0, 100, 1)), "Team 1 has selected Player 0");
    }
}
