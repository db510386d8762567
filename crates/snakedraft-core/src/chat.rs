// Chat playback: one visible "pulse" at a time, in arrival order.
//
// Messages can arrive faster than they can be shown. The sequencer queues
// them and hands out one `Playback` at a time; the caller runs the timer and
// reports completion. Playback speeds up while a backlog is building.

use std::collections::{HashMap, VecDeque};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::draft::model::TeamId;

/// Playback length while the queue is short.
pub const PULSE_LONG: Duration = Duration::from_millis(2500);

/// Playback length once the queue (including the playing item) exceeds
/// [`BACKLOG_THRESHOLD`].
pub const PULSE_SHORT: Duration = Duration::from_millis(1250);

pub const BACKLOG_THRESHOLD: usize = 3;

/// A chat line waiting for, or in, playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatItem {
    pub team: TeamId,
    /// Display name of the sender.
    pub sender: String,
    pub text: String,
    pub received_at: DateTime<Utc>,
}

impl ChatItem {
    pub fn new(team: TeamId, sender: impl Into<String>, text: impl Into<String>) -> Self {
        ChatItem {
            team,
            sender: sender.into(),
            text: text.into(),
            received_at: Utc::now(),
        }
    }
}

/// Instruction to show an item for `duration`, then call
/// [`ChatSequencer::complete`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playback {
    pub item: ChatItem,
    pub duration: Duration,
}

/// Result of finishing the active playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completed {
    pub finished: ChatItem,
    pub next: Option<Playback>,
}

/// FIFO of pending chat plus the per-team "smack" text shown in the draft
/// order panel.
#[derive(Debug, Clone, Default)]
pub struct ChatSequencer {
    /// Head is the playing item whenever `playing` is set.
    queue: VecDeque<ChatItem>,
    playing: bool,
    smacks: HashMap<TeamId, String>,
}

impl ChatSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an item. Returns a playback to start if the sequencer was idle.
    pub fn enqueue(&mut self, item: ChatItem) -> Option<Playback> {
        self.queue.push_back(item);
        if self.playing {
            return None;
        }
        self.start_head()
    }

    /// Finish the active playback: record its smack and start the next item.
    /// Returns `None` when nothing was playing.
    pub fn complete(&mut self) -> Option<Completed> {
        if !self.playing {
            return None;
        }
        self.playing = false;
        let finished = self.queue.pop_front()?;
        self.smacks.insert(finished.team, finished.text.clone());
        let next = self.start_head();
        Some(Completed { finished, next })
    }

    fn start_head(&mut self) -> Option<Playback> {
        let duration = pulse_duration(self.queue.len());
        let item = self.queue.front()?.clone();
        self.playing = true;
        Some(Playback { item, duration })
    }

    pub fn now_playing(&self) -> Option<&ChatItem> {
        if self.playing {
            self.queue.front()
        } else {
            None
        }
    }

    /// Queue depth including the playing item.
    pub fn depth(&self) -> usize {
        self.queue.len()
    }

    pub fn is_idle(&self) -> bool {
        !self.playing
    }

    /// Latest finished chat text for a team; empty if none yet.
    pub fn smack(&self, team: TeamId) -> &str {
        self.smacks.get(&team).map(String::as_str).unwrap_or("")
    }

    pub fn smacks(&self) -> &HashMap<TeamId, String> {
        &self.smacks
    }
}

/// Pick the playback length for a queue of `depth` items.
pub fn pulse_duration(depth: usize) -> Duration {
    if depth > BACKLOG_THRESHOLD {
        PULSE_SHORT
    } else {
        PULSE_LONG
    }
}
