// Snake draft order generation.
//
// Odd rounds visit teams ascending by draft slot, even rounds descending.
// When resuming a draft, persisted slots are kept as-is and only the missing
// tail of the sequence is generated.

use thiserror::Error;

use super::history::{DraftHistory, DraftSlot, HistoryError};
use super::model::{Team, TeamId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("a draft needs at least one team")]
    NoTeams,

    #[error("a draft needs at least one round")]
    NoRounds,

    #[error("team {team} has no draft slot assigned")]
    MissingSlot { team: TeamId },

    #[error("team {team} has draft slot {slot}, outside 1..={team_count}")]
    SlotOutOfRange {
        team: TeamId,
        slot: u32,
        team_count: usize,
    },

    #[error("teams {first} and {second} share draft slot {slot}")]
    DuplicateSlot {
        slot: u32,
        first: TeamId,
        second: TeamId,
    },

    #[error("persisted history has {persisted} picks but the draft only has {capacity}")]
    HistoryTooLong { persisted: usize, capacity: usize },

    #[error("invalid persisted history: {0}")]
    History(#[from] HistoryError),
}

/// One entry of the generated pick sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderEntry {
    /// 1-based round number.
    pub round: usize,
    pub team: TeamId,
    /// The team's 1-based draft slot.
    pub team_slot: u32,
}

/// Check that team slots are exactly `1..=N` and return the teams sorted by
/// slot.
fn teams_by_slot(teams: &[Team]) -> Result<Vec<&Team>, OrderError> {
    if teams.is_empty() {
        return Err(OrderError::NoTeams);
    }

    let team_count = teams.len();
    let mut by_slot: Vec<Option<&Team>> = vec![None; team_count];
    for team in teams {
        if team.slot == 0 {
            return Err(OrderError::MissingSlot { team: team.id });
        }
        let idx = team.slot as usize - 1;
        if idx >= team_count {
            return Err(OrderError::SlotOutOfRange {
                team: team.id,
                slot: team.slot,
                team_count,
            });
        }
        if let Some(existing) = by_slot[idx] {
            return Err(OrderError::DuplicateSlot {
                slot: team.slot,
                first: existing.id,
                second: team.id,
            });
        }
        by_slot[idx] = Some(team);
    }

    // N teams with distinct slots in 1..=N fill every position.
    Ok(by_slot.into_iter().flatten().collect())
}

/// Full snake order for `rounds` rounds: `teams.len() * rounds` entries.
pub fn snake_order(teams: &[Team], rounds: usize) -> Result<Vec<OrderEntry>, OrderError> {
    if rounds == 0 {
        return Err(OrderError::NoRounds);
    }
    let ordered = teams_by_slot(teams)?;

    let mut order = Vec::with_capacity(ordered.len() * rounds);
    for round in 1..=rounds {
        let entry = |t: &&Team| OrderEntry {
            round,
            team: t.id,
            team_slot: t.slot,
        };
        if round % 2 == 1 {
            order.extend(ordered.iter().map(entry));
        } else {
            order.extend(ordered.iter().rev().map(entry));
        }
    }
    Ok(order)
}

/// Build the full draft history from whatever the server has persisted.
///
/// Persisted rows are sorted by slot, validated, and kept verbatim; open
/// slots are appended for every remaining position of the snake order.
pub fn extend_history(
    mut persisted: Vec<DraftSlot>,
    teams: &[Team],
    rounds: usize,
) -> Result<DraftHistory, OrderError> {
    let order = snake_order(teams, rounds)?;
    if persisted.len() > order.len() {
        return Err(OrderError::HistoryTooLong {
            persisted: persisted.len(),
            capacity: order.len(),
        });
    }

    persisted.sort_by_key(|s| s.slot);
    let start = persisted.len();
    persisted.extend(
        order
            .iter()
            .enumerate()
            .skip(start)
            .map(|(i, entry)| DraftSlot::open(i, entry.team)),
    );

    Ok(DraftHistory::from_slots(persisted)?)
}
