//! Room actor: an isolated Tokio task that owns one game instance.
//!
//! Each room runs in its own task and is the single point of mutation
//! for its game state. Client actions and timer ticks arrive through the
//! same serialized stream (the mailbox plus the `select!`ed scheduler),
//! so transitions never race and every broadcast reflects a state the
//! room actually passed through.

use std::collections::HashMap;
use std::sync::Arc;

use parlor_games::{GameAction, GameEvent, GameKind, GameState, Outcome};
use parlor_protocol::{Identity, PlayerId, RoomKey, ServerMessage};
use parlor_score::ResultRecorder;
use parlor_tick::TickScheduler;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::{mpsc, oneshot};

use crate::{RoomConfig, RoomError};

/// Channel on which a member receives the room's outbound messages.
pub type MemberSender = mpsc::UnboundedSender<ServerMessage>;

/// Commands sent to a room actor through its mailbox.
///
/// Join and leave carry a reply channel because the caller needs the
/// result (seat assignment, or a refusal). Action and restart are
/// fire-and-forget: their failures are silent no-ops and the outcome,
/// if any, arrives as a broadcast.
pub(crate) enum RoomCommand {
    Join {
        identity: Identity,
        sender: MemberSender,
        reply: oneshot::Sender<Result<Option<usize>, RoomError>>,
    },
    Leave {
        player_id: PlayerId,
        reply: oneshot::Sender<Result<(), RoomError>>,
    },
    Action {
        player_id: PlayerId,
        action: GameAction,
    },
    Restart {
        player_id: PlayerId,
    },
    Info {
        reply: oneshot::Sender<RoomInfo>,
    },
}

/// A snapshot of room metadata (not the game state itself).
#[derive(Debug, Clone)]
pub struct RoomInfo {
    pub game: GameKind,
    pub key: RoomKey,
    /// Seated members; the game starts when this reaches the quota.
    pub seated: usize,
    /// All members, spectators included.
    pub members: usize,
    /// Whether the game state is terminal.
    pub over: bool,
}

/// Handle to a running room actor. Cheap to clone; the registry hands
/// one of these to every caller.
#[derive(Clone)]
pub struct RoomHandle {
    game: GameKind,
    key: RoomKey,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn game(&self) -> GameKind {
        self.game
    }

    pub fn key(&self) -> &RoomKey {
        &self.key
    }

    fn unavailable(&self) -> RoomError {
        RoomError::Unavailable(self.game, self.key.clone())
    }

    /// Joins the room. On success returns the assigned seat, or `None`
    /// for a spectator.
    pub async fn join(
        &self,
        identity: Identity,
        sender: MemberSender,
    ) -> Result<Option<usize>, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Join {
                identity,
                sender,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Removes a player from the room's member and seat lists.
    pub async fn leave(&self, player_id: PlayerId) -> Result<(), RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Leave {
                player_id,
                reply: reply_tx,
            })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())?
    }

    /// Delivers a game action (fire-and-forget).
    pub async fn action(
        &self,
        player_id: PlayerId,
        action: GameAction,
    ) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Action { player_id, action })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Asks the room to replace its game state with a fresh one
    /// (fire-and-forget). Seats are kept.
    pub async fn restart(&self, player_id: PlayerId) -> Result<(), RoomError> {
        self.sender
            .send(RoomCommand::Restart { player_id })
            .await
            .map_err(|_| self.unavailable())
    }

    /// Requests the current room metadata.
    pub async fn info(&self) -> Result<RoomInfo, RoomError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.sender
            .send(RoomCommand::Info { reply: reply_tx })
            .await
            .map_err(|_| self.unavailable())?;
        reply_rx.await.map_err(|_| self.unavailable())
    }
}

struct Member {
    identity: Identity,
    sender: MemberSender,
}

/// The internal room actor state. Runs inside a Tokio task.
struct RoomActor {
    game: GameKind,
    key: RoomKey,
    config: RoomConfig,
    /// Seated players in join order; the index is the seat number. A
    /// departure shifts later seats down.
    seats: Vec<PlayerId>,
    members: HashMap<PlayerId, Member>,
    state: GameState,
    rng: StdRng,
    scheduler: TickScheduler,
    recorder: Arc<dyn ResultRecorder>,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl RoomActor {
    async fn run(mut self) {
        tracing::info!(game = %self.game, key = %self.key, "room actor started");

        loop {
            tokio::select! {
                cmd = self.receiver.recv() => {
                    let Some(cmd) = cmd else { break };
                    self.handle_command(cmd);
                }
                _ = self.scheduler.wait_for_tick() => {
                    self.handle_tick();
                }
            }
        }

        tracing::info!(game = %self.game, key = %self.key, "room actor stopped");
    }

    fn handle_command(&mut self, cmd: RoomCommand) {
        match cmd {
            RoomCommand::Join {
                identity,
                sender,
                reply,
            } => {
                let result = self.handle_join(identity, sender);
                let _ = reply.send(result);
            }
            RoomCommand::Leave { player_id, reply } => {
                let result = self.handle_leave(player_id);
                let _ = reply.send(result);
            }
            RoomCommand::Action { player_id, action } => {
                self.handle_action(player_id, action);
            }
            RoomCommand::Restart { player_id } => {
                self.handle_restart(player_id);
            }
            RoomCommand::Info { reply } => {
                let _ = reply.send(self.info());
            }
        }
    }

    fn handle_join(
        &mut self,
        identity: Identity,
        sender: MemberSender,
    ) -> Result<Option<usize>, RoomError> {
        let player_id = identity.player_id;
        if self.members.contains_key(&player_id) {
            return Err(RoomError::AlreadyInRoom(
                player_id,
                self.game,
                self.key.clone(),
            ));
        }

        let seat = if self.seats.len() < self.config.seat_capacity {
            self.seats.push(player_id);
            Some(self.seats.len() - 1)
        } else if self.config.allow_spectators {
            None
        } else {
            return Err(RoomError::RoomFull(self.game, self.key.clone()));
        };

        self.members.insert(player_id, Member { identity, sender });
        tracing::info!(
            game = %self.game,
            key = %self.key,
            %player_id,
            ?seat,
            members = self.members.len(),
            "player joined"
        );

        // Everyone, joiner included, learns about the join; the joiner
        // reads their seat and the current state from this message.
        self.broadcast(ServerMessage::Joined {
            game: self.game,
            room: self.key.clone(),
            player_id,
            seat,
            state: self.state.clone(),
        });

        // Quota reached: announce and start the timers. Pong announces
        // through its own ready exchange instead.
        if seat.is_some() && self.seats.len() == self.config.seat_quota {
            if self.game != GameKind::Pong {
                self.broadcast(ServerMessage::Started {
                    game: self.game,
                    room: self.key.clone(),
                });
            }
            if !self.state.is_over() {
                self.scheduler.resume();
            }
        }

        Ok(seat)
    }

    fn handle_leave(&mut self, player_id: PlayerId) -> Result<(), RoomError> {
        if self.members.remove(&player_id).is_none() {
            return Err(RoomError::NotInRoom(
                player_id,
                self.game,
                self.key.clone(),
            ));
        }
        if let Some(pos) = self.seats.iter().position(|p| *p == player_id) {
            self.seats.remove(pos);
        }

        tracing::info!(
            game = %self.game,
            key = %self.key,
            %player_id,
            members = self.members.len(),
            "player left"
        );

        // Below quota the game idles; the timers stop until someone
        // fills the seat again.
        if self.seats.len() < self.config.seat_quota {
            self.scheduler.pause();
        }

        Ok(())
    }

    fn handle_action(&mut self, player_id: PlayerId, action: GameAction) {
        let Some(seat) = self.seats.iter().position(|p| *p == player_id) else {
            tracing::debug!(
                game = %self.game,
                key = %self.key,
                %player_id,
                "action from non-seated player, ignoring"
            );
            return;
        };

        let events = self.state.apply(seat, action, &mut self.rng);

        // The echo goes out whether or not the action changed anything;
        // clients treat the broadcast as the authoritative resync point.
        if self.config.broadcast_on_every_action || !events.is_empty() {
            self.broadcast_update();
        }
        self.process_events(events);
    }

    fn handle_tick(&mut self) {
        if self.state.is_over() {
            self.scheduler.pause();
            return;
        }

        let events = self.state.tick(&mut self.rng);
        self.broadcast_update();
        self.process_events(events);
    }

    fn handle_restart(&mut self, player_id: PlayerId) {
        if !self.seats.contains(&player_id) {
            tracing::debug!(
                game = %self.game,
                key = %self.key,
                %player_id,
                "restart from non-seated player, ignoring"
            );
            return;
        }

        // Wholesale replacement: seats survive, the game state doesn't.
        self.state = GameState::new(self.game, &mut self.rng);
        if self.seats.len() >= self.config.seat_quota {
            self.scheduler.resume();
        }

        tracing::info!(game = %self.game, key = %self.key, %player_id, "room restarted");
        self.broadcast_update();
    }

    fn process_events(&mut self, events: Vec<GameEvent>) {
        for event in events {
            match event {
                GameEvent::Started => {
                    self.broadcast(ServerMessage::Started {
                        game: self.game,
                        room: self.key.clone(),
                    });
                }
                GameEvent::GameOver(outcome) => {
                    tracing::info!(
                        game = %self.game,
                        key = %self.key,
                        "game over"
                    );
                    self.scheduler.pause();
                    self.record(outcome);
                }
            }
        }
    }

    /// Credits the outcome to recognized identities. Guests played the
    /// same game; they just leave no record.
    fn record(&self, outcome: Outcome) {
        match outcome {
            Outcome::PerSeat(rows) => {
                for (seat, score) in rows {
                    if let Some(player_id) = self.seats.get(seat) {
                        self.record_for(*player_id, score);
                    }
                }
            }
            Outcome::Shared(score) => {
                for player_id in &self.seats {
                    self.record_for(*player_id, score);
                }
            }
        }
    }

    fn record_for(&self, player_id: PlayerId, score: f64) {
        if let Some(member) = self.members.get(&player_id) {
            if member.identity.recognized {
                self.recorder.record(player_id, self.game, score);
            }
        }
    }

    fn broadcast_update(&self) {
        self.broadcast(ServerMessage::Update {
            game: self.game,
            room: self.key.clone(),
            state: self.state.clone(),
        });
    }

    /// Fans a message out to every member. A closed receiver means the
    /// connection is tearing down; the send is silently dropped.
    fn broadcast(&self, msg: ServerMessage) {
        for member in self.members.values() {
            let _ = member.sender.send(msg.clone());
        }
    }

    fn info(&self) -> RoomInfo {
        RoomInfo {
            game: self.game,
            key: self.key.clone(),
            seated: self.seats.len(),
            members: self.members.len(),
            over: self.state.is_over(),
        }
    }
}

/// Spawns a room actor task and returns its handle.
///
/// The scheduler starts paused; it only runs while the seat quota is
/// met and the game isn't over.
pub(crate) fn spawn_room(
    game: GameKind,
    key: RoomKey,
    config: RoomConfig,
    recorder: Arc<dyn ResultRecorder>,
    channel_size: usize,
) -> RoomHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let mut rng = StdRng::from_os_rng();
    let state = GameState::new(game, &mut rng);
    let mut scheduler = TickScheduler::with_rate(config.tick_rate_hz);
    scheduler.pause();

    let actor = RoomActor {
        game,
        key: key.clone(),
        config,
        seats: Vec::new(),
        members: HashMap::new(),
        state,
        rng,
        scheduler,
        recorder,
        receiver: rx,
    };

    tokio::spawn(actor.run());

    RoomHandle {
        game,
        key,
        sender: tx,
    }
}
