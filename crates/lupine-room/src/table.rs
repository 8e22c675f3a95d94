//! Table actor: an isolated Tokio task that owns one group's game.
//!
//! The actor waits on two things at once: commands from its
//! [`TableHandle`]s and the next phase deadline. Whichever comes first is
//! applied to the game, and the effects the game queued are executed
//! before the next wait.

use std::sync::Arc;

use lupine_core::{Effect, Game, GameConfig, Lobby, Outcome, PhaseKind, PlayerProfile, TimerId};
use lupine_protocol::{GroupId, PlayerId, Recipient, Verb};
use lupine_tick::DeadlineScheduler;
use tokio::sync::{mpsc, oneshot};

use crate::{NotificationSink, TableError, TableState};

/// Commands sent to a table actor through its channel.
///
/// The `oneshot::Sender` in each variant is the reply channel: the caller
/// sends a command and waits for the response on it.
pub(crate) enum TableCommand {
    Join {
        profile: PlayerProfile,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    Leave {
        player: PlayerId,
        reply: oneshot::Sender<Result<bool, TableError>>,
    },
    Start {
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    Submit {
        actor: PlayerId,
        verb: Verb,
        raw: String,
        reply: oneshot::Sender<Result<(), TableError>>,
    },
    GetInfo {
        reply: oneshot::Sender<TableInfo>,
    },
    Shutdown,
}

/// A snapshot of table metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub group: GroupId,
    pub state: TableState,
    /// Players in the lobby, or seated once the game started.
    pub players: usize,
    pub phase: Option<PhaseKind>,
    pub turn: Option<u32>,
    pub outcome: Option<Outcome>,
}

/// Handle to a running table actor.
///
/// Cheap to clone; the registry holds one per group.
#[derive(Debug, Clone)]
pub struct TableHandle {
    group: GroupId,
    sender: mpsc::Sender<TableCommand>,
}

impl std::fmt::Debug for TableCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Join { profile, .. } => write!(f, "Join({})", profile.id),
            Self::Leave { player, .. } => write!(f, "Leave({player})"),
            Self::Start { .. } => write!(f, "Start"),
            Self::Submit { actor, verb, .. } => write!(f, "Submit({actor}, {verb})"),
            Self::GetInfo { .. } => write!(f, "GetInfo"),
            Self::Shutdown => write!(f, "Shutdown"),
        }
    }
}

impl TableHandle {
    pub fn group(&self) -> GroupId {
        self.group
    }

    async fn request<T>(
        &self,
        command: impl FnOnce(oneshot::Sender<T>) -> TableCommand,
    ) -> Result<T, TableError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(command(reply_tx))
            .await
            .map_err(|_| TableError::Unavailable(self.group))?;
        reply_rx
            .await
            .map_err(|_| TableError::Unavailable(self.group))
    }

    /// Adds a player to the lobby.
    pub async fn join(&self, profile: PlayerProfile) -> Result<(), TableError> {
        self.request(|reply| TableCommand::Join { profile, reply })
            .await?
    }

    /// Removes a player from the lobby. Returns whether they were in it.
    pub async fn leave(&self, player: PlayerId) -> Result<bool, TableError> {
        self.request(|reply| TableCommand::Leave { player, reply })
            .await?
    }

    /// Deals roles and enters the first night.
    pub async fn start(&self) -> Result<(), TableError> {
        self.request(|reply| TableCommand::Start { reply }).await?
    }

    /// Delivers one player command. A rejected command is also reported
    /// to the player through the sink.
    pub async fn submit(
        &self,
        actor: PlayerId,
        verb: Verb,
        raw: impl Into<String>,
    ) -> Result<(), TableError> {
        let raw = raw.into();
        self.request(|reply| TableCommand::Submit {
            actor,
            verb,
            raw,
            reply,
        })
        .await?
    }

    pub async fn info(&self) -> Result<TableInfo, TableError> {
        self.request(|reply| TableCommand::GetInfo { reply }).await
    }

    /// Tells the table to shut down.
    pub async fn shutdown(&self) -> Result<(), TableError> {
        self.sender
            .send(TableCommand::Shutdown)
            .await
            .map_err(|_| TableError::Unavailable(self.group))
    }
}

/// The internal table actor state. Runs inside a Tokio task.
struct TableActor {
    group: GroupId,
    state: TableState,
    lobby: Lobby,
    game: Option<Game>,
    deadlines: DeadlineScheduler<TimerId>,
    sink: Arc<dyn NotificationSink>,
    receiver: mpsc::Receiver<TableCommand>,
}

impl TableActor {
    /// Runs the actor loop until shutdown or until every handle is gone.
    async fn run(mut self) {
        tracing::info!(group = %self.group, "table actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => match cmd {
                    Some(TableCommand::Shutdown) | None => break,
                    Some(cmd) => self.handle(cmd),
                },
                fired = self.deadlines.wait_for_deadline() => {
                    tracing::trace!(group = %self.group, timer = %fired.key, "phase deadline reached");
                    if let Some(game) = self.game.as_mut() {
                        game.on_timer(fired.key);
                    }
                    self.flush();
                }
            }
        }

        self.state = TableState::Destroying;
        self.deadlines.clear();
        tracing::info!(group = %self.group, "table actor stopped");
    }

    fn handle(&mut self, cmd: TableCommand) {
        tracing::trace!(group = %self.group, ?cmd, "table command");
        match cmd {
            TableCommand::Join { profile, reply } => {
                let result = self.handle_join(profile);
                let _ = reply.send(result);
            }
            TableCommand::Leave { player, reply } => {
                let result = self.handle_leave(player);
                let _ = reply.send(result);
            }
            TableCommand::Start { reply } => {
                let result = self.handle_start();
                let _ = reply.send(result);
            }
            TableCommand::Submit {
                actor,
                verb,
                raw,
                reply,
            } => {
                let result = self.handle_submit(actor, verb, &raw);
                let _ = reply.send(result);
            }
            TableCommand::GetInfo { reply } => {
                let _ = reply.send(self.info());
            }
            TableCommand::Shutdown => {}
        }
    }

    fn handle_join(&mut self, profile: PlayerProfile) -> Result<(), TableError> {
        if !self.state.is_joinable() {
            return Err(TableError::InvalidState(format!(
                "cannot join a table in state {}",
                self.state
            )));
        }
        self.lobby.join(profile)?;
        Ok(())
    }

    fn handle_leave(&mut self, player: PlayerId) -> Result<bool, TableError> {
        if !self.state.is_joinable() {
            return Err(TableError::InvalidState(format!(
                "cannot leave a table in state {}",
                self.state
            )));
        }
        Ok(self.lobby.leave(player))
    }

    fn handle_start(&mut self) -> Result<(), TableError> {
        if !self.state.can_transition_to(TableState::InProgress) {
            return Err(TableError::InvalidState(format!(
                "cannot start a table in state {}",
                self.state
            )));
        }
        let game = self.lobby.start(&mut rand::rng())?;
        self.game = Some(game);
        self.advance(TableState::InProgress);
        tracing::info!(group = %self.group, players = self.lobby.len(), "game started");
        self.flush();
        Ok(())
    }

    fn handle_submit(&mut self, actor: PlayerId, verb: Verb, raw: &str) -> Result<(), TableError> {
        let game = match self.game.as_mut() {
            Some(game) if self.state.is_active() => game,
            _ => {
                return Err(TableError::InvalidState(format!(
                    "no game running, table is {}",
                    self.state
                )));
            }
        };
        let result = game.submit(actor, verb, raw);
        self.flush();
        result.map_err(TableError::from)
    }

    /// Executes the effects the game queued since the last flush.
    fn flush(&mut self) {
        let Some(game) = self.game.as_mut() else {
            return;
        };
        for effect in game.take_effects() {
            match effect {
                Effect::Notify {
                    to: Recipient::Group,
                    notice,
                } => self.sink.broadcast(self.group, &notice),
                Effect::Notify {
                    to: Recipient::Player(player),
                    notice,
                } => self.sink.direct(self.group, player, &notice),
                Effect::ArmTimer { id, after } => self.deadlines.arm(id, after),
                Effect::CancelTimer { id } => {
                    self.deadlines.cancel(&id);
                }
            }
        }

        let outcome = game.outcome();
        if game.is_finished() && self.state.is_active() {
            self.deadlines.clear();
            self.advance(TableState::Finished);
            tracing::info!(group = %self.group, ?outcome, "game finished");
        }
    }

    fn advance(&mut self, target: TableState) {
        if self.state.can_transition_to(target) {
            self.state = target;
        } else {
            tracing::warn!(group = %self.group, from = %self.state, to = %target, "invalid table state transition");
        }
    }

    fn info(&self) -> TableInfo {
        TableInfo {
            group: self.group,
            state: self.state,
            players: self
                .game
                .as_ref()
                .map_or(self.lobby.len(), |game| game.roster().len()),
            phase: self.game.as_ref().map(Game::phase_kind),
            turn: self.game.as_ref().map(Game::turn),
            outcome: self.game.as_ref().and_then(Game::outcome),
        }
    }
}

/// Spawns a new table actor task and returns a handle to it.
///
/// `channel_size` bounds the command queue; senders wait when it is full.
pub(crate) fn spawn_table(
    group: GroupId,
    config: GameConfig,
    sink: Arc<dyn NotificationSink>,
    channel_size: usize,
) -> TableHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let actor = TableActor {
        group,
        state: TableState::Lobby,
        lobby: Lobby::new(config),
        game: None,
        deadlines: DeadlineScheduler::new(),
        sink,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    TableHandle { group, sender: tx }
}
