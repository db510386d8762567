// Draft history: the fixed sequence of pick slots and who filled them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{PlayerId, TeamId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    #[error("slot {found} recorded at position {index}; history must be contiguous from 0")]
    NonContiguous { index: usize, found: usize },

    #[error("player {player} drafted at both slot {first} and slot {second}")]
    DuplicatePlayer {
        player: PlayerId,
        first: usize,
        second: usize,
    },
}

/// One position in the pick sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DraftSlot {
    /// 0-based position in the draft sequence.
    #[serde(rename = "Slot")]
    pub slot: usize,
    /// The team scheduled to pick here.
    #[serde(rename = "Team")]
    pub team: TeamId,
    /// Set exactly once, when the pick is committed.
    #[serde(rename = "Player", default)]
    pub player: Option<PlayerId>,
}

impl DraftSlot {
    pub fn open(slot: usize, team: TeamId) -> Self {
        DraftSlot {
            slot,
            team,
            player: None,
        }
    }

    pub fn is_filled(&self) -> bool {
        self.player.is_some()
    }
}

/// Ordered pick slots with `slots[i].slot == i` and no player in two slots.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftHistory {
    slots: Vec<DraftSlot>,
    /// Player -> slot index for every filled slot.
    drafted: HashMap<PlayerId, usize>,
}

impl DraftHistory {
    /// Validate and wrap a slot sequence.
    pub fn from_slots(slots: Vec<DraftSlot>) -> Result<Self, HistoryError> {
        let mut drafted = HashMap::new();
        for (index, slot) in slots.iter().enumerate() {
            if slot.slot != index {
                return Err(HistoryError::NonContiguous {
                    index,
                    found: slot.slot,
                });
            }
            if let Some(player) = slot.player {
                if let Some(&first) = drafted.get(&player) {
                    return Err(HistoryError::DuplicatePlayer {
                        player,
                        first,
                        second: index,
                    });
                }
                drafted.insert(player, index);
            }
        }
        Ok(DraftHistory { slots, drafted })
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, slot: usize) -> Option<&DraftSlot> {
        self.slots.get(slot)
    }

    pub fn slots(&self) -> &[DraftSlot] {
        &self.slots
    }

    pub fn iter(&self) -> impl Iterator<Item = &DraftSlot> {
        self.slots.iter()
    }

    /// Number of filled slots.
    pub fn filled(&self) -> usize {
        self.drafted.len()
    }

    /// Slot at which a player was drafted, if any.
    pub fn slot_of(&self, player: PlayerId) -> Option<usize> {
        self.drafted.get(&player).copied()
    }

    /// Filled slots belonging to one team, in pick order.
    pub fn picks_by(&self, team: TeamId) -> impl Iterator<Item = &DraftSlot> {
        self.slots
            .iter()
            .filter(move |s| s.team == team && s.is_filled())
    }

    /// Copy of this history with `slot` filled by `player`.
    ///
    /// Callers must have checked that the slot exists, is open, and that the
    /// player is not drafted elsewhere.
    pub(crate) fn with_pick(&self, slot: usize, player: PlayerId) -> DraftHistory {
        let mut next = self.clone();
        next.slots[slot].player = Some(player);
        next.drafted.insert(player, slot);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn slot(i: usize, team: i64, player: Option<i64>) -> DraftSlot {
        DraftSlot {
            slot: i,
            team: TeamId(team),
            player: player.map(PlayerId),
        }
    }

    #[test]
    fn deserializes_persisted_row() {
        let row: DraftSlot = serde_json::from_str(r#"{"Slot":4,"Player":77,"Team":2}"#).unwrap();
        assert_eq!(row, slot(4, 2, Some(77)));

        let open: DraftSlot = serde_json::from_str(r#"{"Slot":5,"Player":null,"Team":2}"#).unwrap();
        assert!(!open.is_filled());
    }

    #[test]
    fn accepts_contiguous_history() {
        let history =
            DraftHistory::from_slots(vec![slot(0, 1, Some(10)), slot(1, 2, None)]).unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history.filled(), 1);
        assert_eq!(history.slot_of(PlayerId(10)), Some(0));
    }

    #[test]
    fn rejects_gap_in_slots() {
        let err = DraftHistory::from_slots(vec![slot(0, 1, None), slot(2, 2, None)]).unwrap_err();
        assert_eq!(err, HistoryError::NonContiguous { index: 1, found: 2 });
    }

    #[test]
    fn rejects_player_drafted_twice() {
        let err = DraftHistory::from_slots(vec![slot(0, 1, Some(5)), slot(1, 2, Some(5))])
            .unwrap_err();
        assert_eq!(
            err,
            HistoryError::DuplicatePlayer {
                player: PlayerId(5),
                first: 0,
                second: 1
            }
        );
    }

    #[test]
    fn with_pick_leaves_original_untouched() {
        let history = DraftHistory::from_slots(vec![slot(0, 1, None), slot(1, 2, None)]).unwrap();
        let next = history.with_pick(1, PlayerId(9));
        assert_eq!(history.filled(), 0);
        assert_eq!(next.filled(), 1);
        assert_eq!(next.get(1).and_then(|s| s.player), Some(PlayerId(9)));
        assert_eq!(next.picks_by(TeamId(2)).count(), 1);
        assert_eq!(next.picks_by(TeamId(1)).count(), 0);
    }
}
