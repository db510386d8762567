// Session event loop.
//
// One task owns the `EventDispatcher` and serializes every input through
// `tokio::select!`: draft-room frames, front-end commands, the chat playback
// deadline, the pick echo timeout and the reconnect timer. Nothing else
// mutates engine state, so no locks are needed.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::time::{sleep_until, Instant};
use tracing::{debug, error, info, warn};

use snakedraft_core::config::{Config, SessionConfig, TimingConfig};
use snakedraft_core::draft::dispatcher::{ConnectionStatus, Effect, EventDispatcher, SessionSnapshot};
use snakedraft_core::protocol::{ClientMessage, Notification, Severity};
use snakedraft_core::transport::{Connection, DraftConnector, TransportEvent};

use crate::bootstrap;
use crate::collaborator::LeagueData;
use crate::protocol::{UiUpdate, UserCommand};

#[derive(Debug, Clone, Copy)]
struct Reconnect {
    /// 1-based attempt number.
    attempt: u32,
    at: Instant,
}

/// A live draft session for one participant.
pub struct Session {
    dispatcher: EventDispatcher,
    data: Arc<dyn LeagueData>,
    connector: Arc<dyn DraftConnector>,
    session: SessionConfig,
    timing: TimingConfig,
    ui_tx: mpsc::Sender<UiUpdate>,
    connection: Option<Connection>,
    chat_deadline: Option<Instant>,
    reconnect: Option<Reconnect>,
    /// Reconnect attempt that opened the current connection. Reset to 0 by
    /// the first frame the room delivers.
    streak: u32,
}

impl Session {
    pub fn new(
        dispatcher: EventDispatcher,
        data: Arc<dyn LeagueData>,
        connector: Arc<dyn DraftConnector>,
        config: &Config,
        ui_tx: mpsc::Sender<UiUpdate>,
    ) -> Self {
        Session {
            dispatcher,
            data,
            connector,
            session: config.session,
            timing: config.timing,
            ui_tx,
            connection: None,
            chat_deadline: None,
            reconnect: None,
            streak: 0,
        }
    }

    /// Fetch the initial state from the collaborators and build a session.
    pub async fn load(
        config: &Config,
        data: Arc<dyn LeagueData>,
        connector: Arc<dyn DraftConnector>,
        ui_tx: mpsc::Sender<UiUpdate>,
    ) -> anyhow::Result<Self> {
        let boot = bootstrap::load(data.as_ref(), config.session.league_id).await?;
        let dispatcher = EventDispatcher::new(boot.state, boot.schema, config.session.user_id);
        Ok(Session::new(dispatcher, data, connector, config, ui_tx))
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SessionSnapshot>> {
        self.dispatcher.subscribe()
    }

    /// Run until the front-end quits or reconnecting gives up.
    pub async fn run(mut self, mut cmd_rx: mpsc::Receiver<UserCommand>) -> anyhow::Result<()> {
        info!("Session loop started");
        if !self.connect().await && !self.schedule_reconnect(1) {
            self.end("could not reach the draft room").await;
            return Ok(());
        }

        loop {
            let pick_deadline = self.dispatcher.pick_deadline(self.timing.pick_echo_timeout());
            let chat_deadline = self.chat_deadline;
            let reconnect = self.reconnect;

            tokio::select! {
                // --- Draft room ---
                event = next_event(&mut self.connection) => {
                    match event {
                        Some(TransportEvent::Message(text)) => {
                            self.streak = 0;
                            let effects = self.dispatcher.dispatch_raw(&text);
                            self.apply(effects).await;
                        }
                        Some(TransportEvent::Closed) | None => {
                            warn!("Draft room connection lost");
                            self.connection = None;
                            // A room that drops us before saying anything
                            // counts against the same attempt budget.
                            let attempt = self.streak + 1;
                            if !self.schedule_reconnect(attempt) {
                                self.end(&format!(
                                    "gave up reconnecting after {} attempts",
                                    attempt - 1
                                ))
                                .await;
                                break;
                            }
                        }
                    }
                }

                // --- Front-end commands ---
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(UserCommand::Quit) | None => {
                            info!("Quit requested, leaving the draft room");
                            break;
                        }
                        Some(cmd) => self.handle_command(cmd).await,
                    }
                }

                // --- Chat playback finished ---
                _ = sleep_until(chat_deadline.unwrap_or_else(Instant::now)), if chat_deadline.is_some() => {
                    self.chat_deadline = None;
                    let effects = self.dispatcher.complete_playback();
                    self.apply(effects).await;
                }

                // --- Pick echo timeout ---
                _ = sleep_until(pick_deadline.unwrap_or_else(Instant::now)), if pick_deadline.is_some() => {
                    let effects = self.dispatcher.expire_pending();
                    self.apply(effects).await;
                }

                // --- Reconnect backoff elapsed ---
                _ = sleep_until(reconnect.map_or_else(Instant::now, |r| r.at)), if reconnect.is_some() => {
                    let attempt = reconnect.map_or(1, |r| r.attempt);
                    self.reconnect = None;
                    if self.connect().await {
                        self.streak = attempt;
                    } else if !self.schedule_reconnect(attempt + 1) {
                        self.end(&format!(
                            "gave up reconnecting after {attempt} attempts"
                        ))
                        .await;
                        break;
                    }
                }
            }
        }

        self.connection = None;
        self.dispatcher.set_connection(ConnectionStatus::Disconnected);
        info!("Session loop exiting");
        Ok(())
    }

    /// Open the draft room and bring the mirror up to date. Returns whether
    /// the connection succeeded.
    async fn connect(&mut self) -> bool {
        let SessionConfig { league_id, user_id } = self.session;
        match self.connector.connect(league_id, user_id).await {
            Ok(connection) => {
                self.connection = Some(connection);
                self.dispatcher.set_connection(ConnectionStatus::Connected);
                // The room does not replay history, so anything committed
                // while we were away comes from the collaborator.
                let effects = self.resync("connected").await;
                self.apply(effects).await;
                true
            }
            Err(e) => {
                warn!("Draft room connection failed: {e}");
                false
            }
        }
    }

    /// Arm the reconnect timer. Returns `false` once attempts are exhausted.
    fn schedule_reconnect(&mut self, attempt: u32) -> bool {
        if attempt > self.timing.reconnect_max_attempts {
            return false;
        }
        let delay = self.timing.reconnect_backoff(attempt);
        info!("Reconnect attempt {attempt} in {delay:?}");
        self.reconnect = Some(Reconnect {
            attempt,
            at: Instant::now() + delay,
        });
        self.dispatcher
            .set_connection(ConnectionStatus::Reconnecting { attempt });
        true
    }

    async fn end(&mut self, reason: &str) {
        error!("Session ended: {reason}");
        self.notify(Notification::new(
            Severity::Error,
            format!("Disconnected: {reason}"),
        ))
        .await;
        let _ = self
            .ui_tx
            .send(UiUpdate::SessionEnded {
                reason: reason.to_string(),
            })
            .await;
    }

    async fn resync(&mut self, reason: &str) -> Vec<Effect> {
        info!("Refreshing draft state ({reason})");
        match bootstrap::refetch(self.data.as_ref(), self.dispatcher.state()).await {
            Ok(state) => self.dispatcher.resync(state),
            Err(e) => {
                error!("Draft state refresh failed: {e:#}");
                self.notify(Notification::new(
                    Severity::Error,
                    format!("Could not refresh the draft board: {e:#}"),
                ))
                .await;
                Vec::new()
            }
        }
    }

    /// Carry out dispatcher effects. At most one resync runs per batch.
    async fn apply(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();
        let mut resynced = false;
        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::Notify(notification) => self.notify(notification).await,
                Effect::StartPlayback(playback) => {
                    debug!("Playing chat from {} for {:?}", playback.item.sender, playback.duration);
                    self.chat_deadline = Some(Instant::now() + playback.duration);
                }
                Effect::PickResolved {
                    pending,
                    resolution,
                } => {
                    info!("Pick request {} resolved: {resolution:?}", pending.request_id);
                }
                Effect::ResyncRequired { reason } => {
                    if resynced {
                        continue;
                    }
                    resynced = true;
                    let more = self.resync(&reason).await;
                    queue.extend(more);
                }
            }
        }
    }

    async fn handle_command(&mut self, cmd: UserCommand) {
        match cmd {
            UserCommand::SubmitPick(player) => {
                if self.connection.is_none() {
                    self.notify(Notification::new(
                        Severity::Warning,
                        "Not connected to the draft room",
                    ))
                    .await;
                    return;
                }
                match self.dispatcher.submit_pick(player) {
                    Ok(msg) => self.send(msg).await,
                    Err(rejection) => {
                        info!("Pick rejected locally: {rejection}");
                        self.notify(Notification::new(Severity::Warning, rejection.to_string()))
                            .await;
                    }
                }
            }
            UserCommand::SendChat(text) => {
                if let Some(msg) = self.dispatcher.submit_chat(&text) {
                    self.send(msg).await;
                }
            }
            UserCommand::Focus(event) => {
                self.dispatcher.handle_focus(event);
            }
            UserCommand::SortBy(column) => {
                if self.dispatcher.sort_pool(&column).is_none() {
                    debug!("Column {column} cannot be sorted");
                }
            }
            UserCommand::Quit => {}
        }
    }

    async fn send(&mut self, msg: ClientMessage) {
        let Some(connection) = &self.connection else {
            self.notify(Notification::new(
                Severity::Warning,
                "Not connected to the draft room",
            ))
            .await;
            return;
        };
        if connection.outbound.send(msg).await.is_err() {
            warn!("Outbound channel closed; message dropped");
        }
    }

    async fn notify(&self, notification: Notification) {
        let _ = self.ui_tx.send(UiUpdate::Notify(notification)).await;
    }
}

/// Next event from the connection, or never when disconnected.
async fn next_event(connection: &mut Option<Connection>) -> Option<TransportEvent> {
    match connection {
        Some(connection) => connection.events.recv().await,
        None => std::future::pending().await,
    }
}
