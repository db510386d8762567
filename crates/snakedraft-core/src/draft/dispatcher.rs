// Event dispatcher: the single point of mutation for a draft session.
//
// Inbound protocol messages, chat playback completions, user actions and
// resyncs all go through `EventDispatcher`. Each call returns the side
// effects the session loop must carry out (timers, notifications, resyncs)
// and publishes a fresh `SessionSnapshot` to every subscriber.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::arbiter::{PickArbiter, PickRejection};
use super::model::{ManagerId, Player, PlayerId, TeamId};
use super::pending::{PendingPick, PickResolution};
use super::state::DraftState;
use crate::chat::{ChatItem, ChatSequencer, Playback};
use crate::focus::{FocusContext, FocusEvent, FocusStateMachine};
use crate::pool::{sort_rows, PoolSorter, SortApplied, StatSchema};
use crate::presence::PresenceTracker;
use crate::protocol::{
    ChatPayload, ClientMessage, DraftPayload, Notification, ServerMessage, Severity,
};

// ---------------------------------------------------------------------------
// Snapshot published to observers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Disconnected,
}

/// Everything a front-end needs to render one frame.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub state: Arc<DraftState>,
    pub presence: PresenceTracker,
    pub smacks: HashMap<TeamId, String>,
    pub now_playing: Option<ChatItem>,
    pub focus: FocusContext,
    /// Available players in display order.
    pub table: Vec<Arc<Player>>,
    pub sort: Option<SortApplied>,
    pub schema: Arc<StatSchema>,
    pub pending: Option<PendingPick>,
    pub connection: ConnectionStatus,
    pub my_team: Option<TeamId>,
}

impl SessionSnapshot {
    /// Whether the local user may pick right now, ignoring which player.
    pub fn my_turn(&self) -> bool {
        match (self.my_team, self.state.on_clock()) {
            (Some(team), Some(slot)) => slot.team == team,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Effects
// ---------------------------------------------------------------------------

/// Work the session loop must do after a dispatch.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Notify(Notification),
    /// Show a chat line and call `complete_playback` after its duration.
    StartPlayback(Playback),
    PickResolved {
        pending: PendingPick,
        resolution: PickResolution,
    },
    /// The mirror can no longer be trusted; fetch the history again.
    ResyncRequired { reason: String },
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

pub struct EventDispatcher {
    state: Arc<DraftState>,
    presence: PresenceTracker,
    chat: ChatSequencer,
    focus: FocusStateMachine,
    sorter: PoolSorter,
    sort: Option<SortApplied>,
    table: Vec<Arc<Player>>,
    schema: Arc<StatSchema>,
    arbiter: PickArbiter,
    pending: Option<PendingPick>,
    next_request_id: u64,
    connection: ConnectionStatus,
    snapshot_tx: watch::Sender<Arc<SessionSnapshot>>,
}

impl EventDispatcher {
    /// Create a dispatcher for the participant `user`. A user who manages
    /// no team can watch but not pick.
    pub fn new(state: DraftState, schema: StatSchema, user: ManagerId) -> Self {
        let my_team = state.league().team_of_manager(user).map(|t| t.id);
        if my_team.is_none() {
            info!("Manager {user} has no team in this league; joining as spectator");
        }
        let arbiter = PickArbiter::new(state.league().id, my_team);
        let presence = PresenceTracker::new(&state.league().teams);
        let table = available_rows(&state);
        let state = Arc::new(state);
        let schema = Arc::new(schema);

        let initial = SessionSnapshot {
            state: Arc::clone(&state),
            presence: presence.clone(),
            smacks: HashMap::new(),
            now_playing: None,
            focus: FocusContext::Summary,
            table: table.clone(),
            sort: None,
            schema: Arc::clone(&schema),
            pending: None,
            connection: ConnectionStatus::Connecting,
            my_team,
        };
        let (snapshot_tx, _) = watch::channel(Arc::new(initial));

        EventDispatcher {
            state,
            presence,
            chat: ChatSequencer::new(),
            focus: FocusStateMachine::new(),
            sorter: PoolSorter::new(),
            sort: None,
            table,
            schema,
            arbiter,
            pending: None,
            next_request_id: 1,
            connection: ConnectionStatus::Connecting,
            snapshot_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.snapshot_tx.subscribe()
    }

    pub fn state(&self) -> &Arc<DraftState> {
        &self.state
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    pub fn chat(&self) -> &ChatSequencer {
        &self.chat
    }

    pub fn focus(&self) -> FocusContext {
        self.focus.current()
    }

    pub fn pending(&self) -> Option<&PendingPick> {
        self.pending.as_ref()
    }

    pub fn my_team(&self) -> Option<TeamId> {
        self.arbiter.team()
    }

    pub fn table(&self) -> &[Arc<Player>] {
        &self.table
    }

    pub fn connection(&self) -> ConnectionStatus {
        self.connection
    }

    // -- Inbound ------------------------------------------------------------

    /// Decode and dispatch one text frame. Malformed frames are logged and
    /// dropped.
    pub fn dispatch_raw(&mut self, text: &str) -> Vec<Effect> {
        match ServerMessage::decode(text) {
            Ok(msg) => self.dispatch(msg),
            Err(e) => {
                warn!("Dropping malformed frame: {e}");
                Vec::new()
            }
        }
    }

    pub fn dispatch(&mut self, msg: ServerMessage) -> Vec<Effect> {
        debug!("Dispatching {} message", msg.kind());
        let effects = match msg {
            ServerMessage::Users(users) => {
                self.presence.seed(&users);
                info!(
                    "Presence seeded: {} of {} managers connected",
                    self.presence.active_count(),
                    self.state.league().teams.len()
                );
                Vec::new()
            }
            ServerMessage::Status(status) => {
                self.presence.update(status.user, status.active);
                Vec::new()
            }
            ServerMessage::Draft(draft) => self.on_draft(draft),
            ServerMessage::Chat(chat) => self.on_chat(chat),
            ServerMessage::Unknown { kind } => {
                warn!("Ignoring unknown message kind `{kind}`");
                Vec::new()
            }
        };
        self.publish();
        effects
    }

    fn on_draft(&mut self, draft: DraftPayload) -> Vec<Effect> {
        let pick = draft.committed();
        let first_open = self
            .state
            .history()
            .iter()
            .position(|slot| !slot.is_filled());
        let mut effects = Vec::new();

        match self.state.apply_pick(pick) {
            Ok(next) => {
                if let Some(open) = first_open.filter(|&open| open < pick.slot) {
                    warn!(
                        "Draft event for slot {} arrived while slot {open} is still open",
                        pick.slot
                    );
                    effects.push(Effect::ResyncRequired {
                        reason: format!("pick {} committed before pick {open}", pick.slot),
                    });
                }
                let announcement = next.describe_pick(pick);
                info!("Pick {}: {announcement}", pick.slot);
                self.state = Arc::new(next);
                self.table.retain(|p| p.id != pick.player);
                self.focus.handle(FocusEvent::PickAccepted);
                effects.push(Effect::Notify(Notification::new(
                    Severity::Success,
                    announcement,
                )));
                if self.state.is_complete() {
                    info!("Draft complete");
                    effects.push(Effect::Notify(Notification::new(
                        Severity::Info,
                        "The draft is complete",
                    )));
                }
            }
            Err(conflict) if !conflict.is_divergence() => {
                debug!("Ignoring duplicate draft event: {conflict}");
            }
            Err(conflict) => {
                warn!("Draft event diverges from local history: {conflict}");
                effects.push(Effect::ResyncRequired {
                    reason: conflict.to_string(),
                });
            }
        }

        if let Some(pending) = self.pending {
            if let Some(resolution) = pending.resolve(&draft) {
                self.pending = None;
                effects.extend(self.resolution_effects(pending, resolution));
            }
        }
        effects
    }

    fn on_chat(&mut self, chat: ChatPayload) -> Vec<Effect> {
        let Some(team) = self.state.league().team_of_manager(chat.user) else {
            warn!("Dropping chat from manager {} who runs no team", chat.user);
            return Vec::new();
        };
        let sender = if team.manager.name.is_empty() {
            team.name.clone()
        } else {
            team.manager.name.clone()
        };
        let item = ChatItem::new(team.id, sender, chat.text);
        self.chat
            .enqueue(item)
            .map(Effect::StartPlayback)
            .into_iter()
            .collect()
    }

    /// The active chat playback finished. Starts the next one, if queued.
    pub fn complete_playback(&mut self) -> Vec<Effect> {
        let effects = match self.chat.complete() {
            Some(done) => done.next.map(Effect::StartPlayback).into_iter().collect(),
            None => Vec::new(),
        };
        self.publish();
        effects
    }

    // -- Outbound -----------------------------------------------------------

    /// Validate a pick and build the message to send. The board does not
    /// change until the server echoes the pick back.
    pub fn submit_pick(&mut self, player: PlayerId) -> Result<ClientMessage, PickRejection> {
        let request_id = self.next_request_id;
        let request = self
            .arbiter
            .request(&self.state, self.pending.as_ref(), player, request_id)?;
        self.next_request_id += 1;
        self.pending = Some(PendingPick::new(request_id, request.pick, player));
        info!(
            "Submitting pick {} ({}) as request {request_id}",
            request.pick,
            self.state.pool().player_name(player)
        );
        self.publish();
        Ok(ClientMessage::Pick(request))
    }

    pub fn can_pick(&self, player: PlayerId) -> bool {
        self.arbiter
            .can_pick(&self.state, self.pending.as_ref(), player)
    }

    /// Build a chat message. Blank text sends nothing.
    pub fn submit_chat(&self, text: &str) -> Option<ClientMessage> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        Some(ClientMessage::Message(text.to_string()))
    }

    /// When the pending pick, if any, times out.
    pub fn pick_deadline(&self, timeout: Duration) -> Option<Instant> {
        self.pending.map(|p| p.deadline(timeout))
    }

    /// Give up waiting for the pending pick's echo.
    pub fn expire_pending(&mut self) -> Vec<Effect> {
        let Some(pending) = self.pending.take() else {
            return Vec::new();
        };
        warn!("No echo for pick request {} (slot {})", pending.request_id, pending.slot);
        let effects = self.resolution_effects(pending, PickResolution::TimedOut);
        self.publish();
        effects
    }

    fn resolution_effects(&self, pending: PendingPick, resolution: PickResolution) -> Vec<Effect> {
        let mut effects = Vec::new();
        let pool = self.state.pool();
        match resolution {
            PickResolution::Confirmed => {
                debug!("Pick request {} confirmed", pending.request_id);
            }
            PickResolution::Superseded { by } => {
                effects.push(Effect::Notify(Notification::new(
                    Severity::Warning,
                    format!(
                        "Pick {} went to {} before {} could be drafted",
                        pending.slot + 1,
                        pool.player_name(by),
                        pool.player_name(pending.player)
                    ),
                )));
            }
            PickResolution::TimedOut => {
                effects.push(Effect::Notify(Notification::new(
                    Severity::Warning,
                    format!(
                        "The server did not confirm {}; refreshing the board",
                        pool.player_name(pending.player)
                    ),
                )));
            }
        }
        effects.push(Effect::PickResolved {
            pending,
            resolution,
        });
        if resolution.needs_resync() {
            effects.push(Effect::ResyncRequired {
                reason: format!("pick request {} not confirmed", pending.request_id),
            });
        }
        effects
    }

    // -- Session control ----------------------------------------------------

    /// Replace the mirror with a freshly fetched state, e.g. after a
    /// reconnect or a divergence.
    pub fn resync(&mut self, state: DraftState) -> Vec<Effect> {
        info!(
            "Resynced draft state: {} of {} picks made",
            state.current_pick(),
            state.total_picks()
        );
        self.state = Arc::new(state);
        self.table = available_rows(&self.state);
        if let Some(sort) = &self.sort {
            sort_rows(&mut self.table, sort);
        }
        self.focus.reset();

        let mut effects = Vec::new();
        if let Some(pending) = self.pending {
            if let Some(resolution) = pending.resolve_against(self.state.history()) {
                self.pending = None;
                // Superseded here needs no further resync; the state is fresh.
                effects.extend(
                    self.resolution_effects(pending, resolution)
                        .into_iter()
                        .filter(|e| !matches!(e, Effect::ResyncRequired { .. })),
                );
            }
        }
        self.publish();
        effects
    }

    pub fn set_connection(&mut self, status: ConnectionStatus) {
        if status != ConnectionStatus::Connected && self.presence.is_seeded() {
            debug!("Discarding presence after disconnect");
            self.presence.discard();
        }
        self.connection = status;
        self.publish();
    }

    pub fn handle_focus(&mut self, event: FocusEvent) -> FocusContext {
        let focus = self.focus.handle(event);
        self.publish();
        focus
    }

    /// Toggle the table sort on `column`.
    pub fn sort_pool(&mut self, column: &str) -> Option<SortApplied> {
        let applied = self.sorter.toggle(&mut self.table, column);
        if applied.is_some() {
            self.sort = applied.clone();
            self.publish();
        }
        applied
    }

    fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: Arc::clone(&self.state),
            presence: self.presence.clone(),
            smacks: self.chat.smacks().clone(),
            now_playing: self.chat.now_playing().cloned(),
            focus: self.focus.current(),
            table: self.table.clone(),
            sort: self.sort.clone(),
            schema: Arc::clone(&self.schema),
            pending: self.pending,
            connection: self.connection,
            my_team: self.arbiter.team(),
        }
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(Arc::new(self.snapshot()));
    }
}

fn available_rows(state: &DraftState) -> Vec<Arc<Player>> {
    state
        .pool()
        .players()
        .iter()
        .filter(|p| state.is_available(p.id))
        .cloned()
        .collect()
}

