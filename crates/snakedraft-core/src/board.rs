// Read-only views of the draft board for display.
//
// Everything here is a pure function of a `DraftState` (plus presence where
// highlighting depends on it); nothing mutates the mirror.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::draft::model::{Player, PlayerId, Team, TeamId};
use crate::draft::state::DraftState;
use crate::presence::PresenceTracker;

/// Rows per summary page.
pub const PAGE_SIZE: usize = 10;

/// Stat column summed in roster breakdowns.
pub const DEFAULT_POINTS_COLUMN: &str = "FantasyPoints";

// ---------------------------------------------------------------------------
// Slot labels
// ---------------------------------------------------------------------------

/// 1-based (round, pick within round) for a 0-based slot.
pub fn round_and_pick(slot: usize, team_count: usize) -> (usize, usize) {
    if team_count == 0 {
        return (0, 0);
    }
    (slot / team_count + 1, slot % team_count + 1)
}

/// "R:2 P:3" style label for a slot.
pub fn slot_label(slot: usize, team_count: usize) -> String {
    let (round, pick) = round_and_pick(slot, team_count);
    format!("R:{round} P:{pick}")
}

// ---------------------------------------------------------------------------
// Upcoming order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotHighlight {
    /// On the clock, manager connected.
    OnClock,
    /// On the clock, manager away.
    OnClockAway,
    Upcoming,
    UpcomingAway,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpcomingPick {
    pub slot: usize,
    pub round: usize,
    pub pick_in_round: usize,
    pub team: TeamId,
    pub team_name: String,
    pub highlight: SlotHighlight,
}

/// The next two rounds' worth of slots starting at the current pick.
pub fn upcoming(state: &DraftState, presence: &PresenceTracker) -> Vec<UpcomingPick> {
    let league = state.league();
    let team_count = league.teams.len();
    let start = state.current_pick();

    state
        .history()
        .iter()
        .skip(start)
        .take(2 * team_count)
        .map(|slot| {
            let active = league
                .team(slot.team)
                .is_some_and(|t| presence.is_active(t.manager.id));
            let on_clock = slot.slot == start && !slot.is_filled();
            let highlight = match (on_clock, active) {
                (true, true) => SlotHighlight::OnClock,
                (true, false) => SlotHighlight::OnClockAway,
                (false, true) => SlotHighlight::Upcoming,
                (false, false) => SlotHighlight::UpcomingAway,
            };
            let (round, pick_in_round) = round_and_pick(slot.slot, team_count);
            UpcomingPick {
                slot: slot.slot,
                round,
                pick_in_round,
                team: slot.team,
                team_name: league.team_name(slot.team),
                highlight,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Summary pages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRow {
    pub slot: usize,
    pub label: String,
    pub team_name: String,
    /// `None` until the slot is filled.
    pub player_name: Option<String>,
}

pub fn page_count(total_picks: usize) -> usize {
    if total_picks == 0 {
        return 0;
    }
    (total_picks - 1) / PAGE_SIZE + 1
}

/// The page holding the current pick.
pub fn initial_page(current_pick: usize) -> usize {
    current_pick / PAGE_SIZE
}

/// Rows of one summary page. Out-of-range pages are empty.
pub fn summary_page(state: &DraftState, page: usize) -> Vec<SummaryRow> {
    let league = state.league();
    let team_count = league.teams.len();
    state
        .history()
        .iter()
        .skip(page * PAGE_SIZE)
        .take(PAGE_SIZE)
        .map(|slot| SummaryRow {
            slot: slot.slot,
            label: slot_label(slot.slot, team_count),
            team_name: league.team_name(slot.team),
            player_name: slot.player.map(|id| state.pool().player_name(id)),
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Rosters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct RosterEntry {
    pub slot: usize,
    pub player_id: PlayerId,
    /// `None` when the roster collaborator does not know the player.
    pub player: Option<Arc<Player>>,
}

impl RosterEntry {
    pub fn name(&self) -> String {
        self.player
            .as_ref()
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Player {}", self.player_id))
    }

    pub fn position(&self) -> &str {
        self.player.as_ref().map(|p| p.position.as_str()).unwrap_or("")
    }
}

/// Players drafted by `team`, in pick order.
pub fn team_roster(state: &DraftState, team: TeamId) -> Vec<RosterEntry> {
    state
        .history()
        .picks_by(team)
        .filter_map(|slot| slot.player.map(|id| (slot.slot, id)))
        .map(|(slot, player_id)| RosterEntry {
            slot,
            player_id,
            player: state.pool().get(player_id).cloned(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamSummary {
    pub team: Team,
    pub picks: Vec<RosterEntry>,
}

/// One roster per team, in league order. Shown once the draft is over.
pub fn final_summaries(state: &DraftState) -> Vec<TeamSummary> {
    state
        .league()
        .teams
        .iter()
        .map(|team| TeamSummary {
            team: team.clone(),
            picks: team_roster(state, team.id),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionGroup {
    pub position: String,
    pub players: Vec<String>,
    pub points: f64,
}

/// A team's roster grouped by position, with each group's points total.
pub fn roster_breakdown(state: &DraftState, team: TeamId, points_column: &str) -> Vec<PositionGroup> {
    let mut groups: BTreeMap<String, PositionGroup> = BTreeMap::new();
    for entry in team_roster(state, team) {
        let position = entry.position().to_string();
        let points = entry
            .player
            .as_ref()
            .and_then(|p| p.stat_f64(points_column))
            .unwrap_or(0.0);
        let group = groups
            .entry(position.clone())
            .or_insert_with(|| PositionGroup {
                position,
                players: Vec::new(),
                points: 0.0,
            });
        group.players.push(entry.name());
        group.points += points;
    }
    groups.into_values().collect()
}

// ---------------------------------------------------------------------------
// Pick clock
// ---------------------------------------------------------------------------

/// Time left on the current pick, or `None` when the league has no clock or
/// the draft is over. Never negative. The clock is advisory; nothing happens
/// when it reaches zero.
pub fn pick_clock_remaining(state: &DraftState, now: DateTime<Utc>) -> Option<chrono::Duration> {
    let clock = state.league().draft_clock;
    if clock == 0 || state.is_complete() {
        return None;
    }
    let elapsed = now - state.on_clock_since();
    let remaining = chrono::Duration::seconds(i64::from(clock)) - elapsed;
    Some(remaining.max(chrono::Duration::zero()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::draft::model::{fixtures, LeagueInfo, ManagerId};
    use crate::draft::state::CommittedPick;

    fn state_with(league: LeagueInfo, picks: &[(i64, i64)]) -> DraftState {
        let mut state = DraftState::new(Arc::new(league), Arc::new(fixtures::pool(30)), Vec::new())
            .unwrap();
        for &(player, team) in picks {
            let slot = state.current_pick();
            state = state
                .apply_pick(CommittedPick {
                    slot,
                    player: PlayerId(player),
                    team: TeamId(team),
                })
                .unwrap();
        }
        state
    }

    #[test]
    fn labels_are_one_based() {
        assert_eq!(slot_label(0, 4), "R:1 P:1");
        assert_eq!(slot_label(5, 4), "R:2 P:2");
        assert_eq!(round_and_pick(11, 4), (3, 4));
    }

    #[test]
    fn upcoming_window_covers_two_rounds() {
        let state = state_with(fixtures::league(4, 3), &[(100, 1)]);
        let mut presence = PresenceTracker::new(&state.league().teams);
        presence.seed(&[ManagerId(20), ManagerId(40)]);

        let window = upcoming(&state, &presence);
        assert_eq!(window.len(), 8);
        assert_eq!(window[0].slot, 1);
        assert_eq!(window[0].team, TeamId(2));
        assert_eq!(window[0].highlight, SlotHighlight::OnClock);
        assert_eq!(window[1].highlight, SlotHighlight::UpcomingAway);
        assert_eq!(window[2].highlight, SlotHighlight::Upcoming);
        assert_eq!(window[3].team, TeamId(4));
        assert_eq!((window[3].round, window[3].pick_in_round), (2, 1));
    }

    #[test]
    fn filled_slot_is_never_on_clock() {
        let state = DraftState::new(
            Arc::new(fixtures::league(2, 2)),
            Arc::new(fixtures::pool(30)),
            Vec::new(),
        )
        .unwrap()
        .apply_pick(CommittedPick {
            slot: 1,
            player: PlayerId(100),
            team: TeamId(2),
        })
        .unwrap();
        let mut presence = PresenceTracker::new(&state.league().teams);
        presence.seed(&[ManagerId(10), ManagerId(20)]);

        let window = upcoming(&state, &presence);
        assert_eq!(window[0].slot, 1);
        assert_eq!(window[0].highlight, SlotHighlight::Upcoming);
    }

    #[test]
    fn upcoming_window_clips_at_end() {
        let state = state_with(fixtures::league(2, 2), &[(100, 1), (101, 2), (102, 2)]);
        let presence = PresenceTracker::new(&state.league().teams);
        let window = upcoming(&state, &presence);
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].highlight, SlotHighlight::OnClockAway);
    }

    #[test]
    fn paging() {
        assert_eq!(page_count(12), 2);
        assert_eq!(page_count(10), 1);
        assert_eq!(page_count(0), 0);
        assert_eq!(initial_page(9), 0);
        assert_eq!(initial_page(10), 1);

        let state = state_with(fixtures::league(4, 3), &[(100, 1), (101, 2)]);
        let first = summary_page(&state, 0);
        assert_eq!(first.len(), 10);
        assert_eq!(first[0].player_name.as_deref(), Some("Player 0"));
        assert_eq!(first[2].player_name, None);
        assert_eq!(summary_page(&state, 1).len(), 2);
        assert!(summary_page(&state, 2).is_empty());
    }

    #[test]
    fn rosters_and_breakdown() {
        let state = state_with(
            fixtures::league(2, 2),
            &[(100, 1), (101, 2), (102, 2), (103, 1)],
        );
        let roster = team_roster(&state, TeamId(1));
        assert_eq!(roster.iter().map(|e| e.slot).collect::<Vec<_>>(), vec![0, 3]);

        let summaries = final_summaries(&state);
        assert_eq!(summaries.len(), 2);
        assert_eq!(summaries[1].picks.len(), 2);

        let breakdown = roster_breakdown(&state, TeamId(1), DEFAULT_POINTS_COLUMN);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].position, "RB");
        // Player 0 (300) + Player 3 (297).
        assert_eq!(breakdown[0].points, 597.0);
    }

    #[test]
    fn pick_clock_counts_down_and_stops_at_zero() {
        let mut league = fixtures::league(2, 1);
        league.draft_clock = 90;
        let state = state_with(league, &[]);
        let since = state.on_clock_since();

        let left = pick_clock_remaining(&state, since + chrono::Duration::seconds(30)).unwrap();
        assert_eq!(left, chrono::Duration::seconds(60));
        let left = pick_clock_remaining(&state, since + chrono::Duration::seconds(500)).unwrap();
        assert_eq!(left, chrono::Duration::zero());
    }

    #[test]
    fn pick_clock_disabled() {
        let state = state_with(fixtures::league(2, 1), &[]);
        assert!(pick_clock_remaining(&state, Utc::now()).is_none());
    }
}
