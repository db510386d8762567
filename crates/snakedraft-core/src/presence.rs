// Manager presence: who currently has the draft room open.

use std::collections::BTreeMap;

use tracing::debug;

use crate::draft::model::{ManagerId, Team};

/// Online/offline flags for every manager in the league.
///
/// Only managers who run a team are tracked; IDs from outside the league are
/// ignored. Until the server's `users` snapshot arrives everyone reads as
/// inactive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PresenceTracker {
    active: BTreeMap<ManagerId, bool>,
    seeded: bool,
}

impl PresenceTracker {
    pub fn new(teams: &[Team]) -> Self {
        PresenceTracker {
            active: teams.iter().map(|t| (t.manager.id, false)).collect(),
            seeded: false,
        }
    }

    /// Apply the `users` snapshot: listed managers become active, every
    /// other league manager inactive.
    pub fn seed(&mut self, connected: &[ManagerId]) {
        for (manager, active) in self.active.iter_mut() {
            *active = connected.contains(manager);
        }
        for id in connected {
            if !self.active.contains_key(id) {
                debug!("Ignoring presence for manager {id} outside the league");
            }
        }
        self.seeded = true;
    }

    /// Apply one `status` delta. Returns whether anything changed.
    pub fn update(&mut self, manager: ManagerId, active: bool) -> bool {
        match self.active.get_mut(&manager) {
            Some(entry) if *entry != active => {
                *entry = active;
                true
            }
            Some(_) => false,
            None => {
                debug!("Ignoring status for manager {manager} outside the league");
                false
            }
        }
    }

    /// Forget all presence after the connection drops; the next `users`
    /// snapshot re-seeds it.
    pub fn discard(&mut self) {
        for active in self.active.values_mut() {
            *active = false;
        }
        self.seeded = false;
    }

    pub fn is_active(&self, manager: ManagerId) -> bool {
        self.active.get(&manager).copied().unwrap_or(false)
    }

    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    pub fn active_count(&self) -> usize {
        self.active.values().filter(|a| **a).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ManagerId, bool)> + '_ {
        self.active.iter().map(|(id, active)| (*id, *active))
    }
}
