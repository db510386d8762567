// League, team and player records shared by every draft component.
//
// Field names follow the coordination server's JSON (PascalCase keys, except
// the manager's `name`/`email`), so these types deserialize directly from the
// collaborator responses and protocol payloads.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Team identifier within a league.
    TeamId
);
id_type!(
    /// User account identifier of a team's manager.
    ManagerId
);
id_type!(
    /// Player identifier from the roster collaborator.
    PlayerId
);
id_type!(
    /// League identifier; also names the draft room on the server.
    LeagueId
);

// ---------------------------------------------------------------------------
// Teams
// ---------------------------------------------------------------------------

/// The user account that runs a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manager {
    #[serde(rename = "ID")]
    pub id: ManagerId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
}

/// A team taking part in the draft.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "ID")]
    pub id: TeamId,
    #[serde(rename = "Name")]
    pub name: String,
    /// 1-based draft position. Zero means the league never assigned one.
    #[serde(rename = "Slot", default)]
    pub slot: u32,
    #[serde(rename = "Manager")]
    pub manager: Manager,
}

/// Everything the engine needs to know about the league hosting the draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeagueInfo {
    pub id: LeagueId,
    pub name: String,
    pub teams: Vec<Team>,
    pub rounds: usize,
    /// Seconds allowed per pick. Zero disables the pick clock.
    pub draft_clock: u32,
}

impl LeagueInfo {
    /// Total number of picks in the draft (`rounds * teams`).
    pub fn total_picks(&self) -> usize {
        self.rounds * self.teams.len()
    }

    pub fn team(&self, id: TeamId) -> Option<&Team> {
        self.teams.iter().find(|t| t.id == id)
    }

    /// The team run by the given manager, if any.
    pub fn team_of_manager(&self, manager: ManagerId) -> Option<&Team> {
        self.teams.iter().find(|t| t.manager.id == manager)
    }

    /// Display name for a team, falling back to its numeric ID.
    pub fn team_name(&self, id: TeamId) -> String {
        self.team(id)
            .map(|t| t.name.clone())
            .unwrap_or_else(|| format!("Team {id}"))
    }
}

// ---------------------------------------------------------------------------
// Players
// ---------------------------------------------------------------------------

/// A draftable player. Everything beyond ID/Name/Position is sport-specific
/// and kept as raw JSON keyed by the collaborator's field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "ID")]
    pub id: PlayerId,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Position", default)]
    pub position: String,
    #[serde(flatten)]
    pub stats: Map<String, Value>,
}

impl Player {
    /// Look up any column by its raw key, including the fixed fields.
    pub fn cell(&self, key: &str) -> Option<Value> {
        match key {
            "ID" => Some(Value::from(self.id.0)),
            "Name" => Some(Value::from(self.name.clone())),
            "Position" => Some(Value::from(self.position.clone())),
            other => self.stats.get(other).cloned(),
        }
    }

    /// Numeric value of a stat column, if it holds a number.
    pub fn stat_f64(&self, key: &str) -> Option<f64> {
        self.cell(key).and_then(|v| v.as_f64())
    }
}

/// The draftable roster, indexed by player ID.
#[derive(Debug, Clone, Default)]
pub struct DraftPool {
    players: Vec<Arc<Player>>,
    index: HashMap<PlayerId, usize>,
}

impl DraftPool {
    /// Build a pool from the collaborator's roster, keeping its order.
    /// Later duplicates of an ID are dropped.
    pub fn new(players: Vec<Player>) -> Self {
        let mut pool = DraftPool::default();
        for player in players {
            if pool.index.contains_key(&player.id) {
                continue;
            }
            pool.index.insert(player.id, pool.players.len());
            pool.players.push(Arc::new(player));
        }
        pool
    }

    pub fn get(&self, id: PlayerId) -> Option<&Arc<Player>> {
        self.index.get(&id).map(|&i| &self.players[i])
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.index.contains_key(&id)
    }

    /// Display name for a player, falling back to its numeric ID.
    pub fn player_name(&self, id: PlayerId) -> String {
        self.get(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Player {id}"))
    }

    pub fn players(&self) -> &[Arc<Player>] {
        &self.players
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.players.iter().map(|p| p.id)
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Test fixtures
// ---------------------------------------------------------------------------

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;
    use serde_json::json;

    /// Teams 1..=n with slot == id and manager id == id * 10.
    pub fn teams(n: i64) -> Vec<Team> {
        (1..=n)
            .map(|i| Team {
                id: TeamId(i),
                name: format!("Team {i}"),
                slot: i as u32,
                manager: Manager {
                    id: ManagerId(i * 10),
                    name: format!("Manager {i}"),
                    email: format!("m{i}@example.com"),
                },
            })
            .collect()
    }

    pub fn league(n: i64, rounds: usize) -> LeagueInfo {
        LeagueInfo {
            id: LeagueId(1),
            name: "Test League".into(),
            teams: teams(n),
            rounds,
            draft_clock: 0,
        }
    }

    pub fn player(id: i64, name: &str, position: &str, points: i64) -> Player {
        let stats = json!({ "FantasyPoints": points, "Team": "NYG" });
        Player {
            id: PlayerId(id),
            name: name.into(),
            position: position.into(),
            stats: stats.as_object().cloned().unwrap_or_default(),
        }
    }

    /// `n` players with ids 100.. and descending points.
    pub fn pool(n: i64) -> DraftPool {
        DraftPool::new(
            (0..n)
                .map(|i| player(100 + i, &format!("Player {i}"), "RB", 300 - i))
                .collect(),
        )
    }
}
