// Game task and its handle.
//
// Each game is owned by one spawned task. Callers talk to it through a
// cloneable `GameHandle`: operations travel over an mpsc command channel
// with a oneshot reply, clock ticks arrive on the same channel, and the
// task publishes a fresh `GameSnapshot` on a watch channel after every
// change. All mutations of one game are therefore applied strictly one
// after another.

use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, info};

use super::clock::{self, ClockHandle};
use super::entry::PlayerId;
use super::error::GameError;
use super::snapshot::GameSnapshot;
use super::state::{Game, GameRules};
use super::vote::{CampaignId, VoteResolution};

/// Capacity of a game's command channel.
const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<Result<T, GameError>>;

/// Messages processed by the game task.
pub(crate) enum GameCommand {
    AddEntry {
        text: String,
        author: PlayerId,
        reply: Reply<()>,
    },
    EndGame {
        entries: u32,
        reply: Reply<()>,
    },
    Kick {
        player: PlayerId,
        reply: Reply<()>,
    },
    TriggerVoteKick {
        issuer: PlayerId,
        target: PlayerId,
        acceptance_ratio: f64,
        time_limit: u32,
        reply: Reply<()>,
    },
    Vote {
        voter: PlayerId,
        reply: Reply<()>,
    },
    /// One second elapsed on the turn clock.
    TurnTick,
    /// One second elapsed on the timer of the given campaign.
    VoteTick(CampaignId),
}

impl std::fmt::Debug for GameCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameCommand::AddEntry { author, .. } => write!(f, "AddEntry({author})"),
            GameCommand::EndGame { entries, .. } => write!(f, "EndGame({entries})"),
            GameCommand::Kick { player, .. } => write!(f, "Kick({player})"),
            GameCommand::TriggerVoteKick { target, .. } => write!(f, "TriggerVoteKick({target})"),
            GameCommand::Vote { voter, .. } => write!(f, "Vote({voter})"),
            GameCommand::TurnTick => write!(f, "TurnTick"),
            GameCommand::VoteTick(id) => write!(f, "VoteTick({id})"),
        }
    }
}

/// Start a game and the task that owns it.
///
/// The initiator takes the first turn. A turn clock is started when
/// `rules.turn_time_limit > 0`. Must be called from within a tokio runtime.
/// The game task runs until every clone of the returned handle is dropped.
pub fn start_game<I>(initiator: &str, players: I, rules: GameRules) -> GameHandle
where
    I: IntoIterator,
    I::Item: Into<PlayerId>,
{
    let game = Game::start(initiator, players, rules);
    let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_BUFFER);
    let (snapshot_tx, snapshot_rx) = watch::channel(GameSnapshot::from(&game));

    let actor = GameActor {
        game,
        cmd_tx: cmd_tx.downgrade(),
        snapshot_tx,
        turn_clock: None,
        vote_timer: None,
    };
    tokio::spawn(actor.run(cmd_rx));

    GameHandle {
        cmd_tx,
        snapshot_rx,
    }
}

/// Cloneable access to a running game.
#[derive(Debug, Clone)]
pub struct GameHandle {
    cmd_tx: mpsc::Sender<GameCommand>,
    snapshot_rx: watch::Receiver<GameSnapshot>,
}

impl GameHandle {
    /// Submit an entry on behalf of `author`.
    pub async fn add_entry(
        &self,
        text: impl Into<String>,
        author: impl Into<PlayerId>,
    ) -> Result<(), GameError> {
        let (text, author) = (text.into(), author.into());
        self.request(|reply| GameCommand::AddEntry {
            text,
            author,
            reply,
        })
        .await
    }

    /// Schedule the story to end after `entries` more entries.
    pub async fn end_game(&self, entries: u32) -> Result<(), GameError> {
        self.request(|reply| GameCommand::EndGame { entries, reply })
            .await
    }

    /// Remove a player immediately.
    pub async fn kick(&self, player: impl Into<PlayerId>) -> Result<(), GameError> {
        let player = player.into();
        self.request(|reply| GameCommand::Kick { player, reply })
            .await
    }

    /// Open a vote to remove `target`. `acceptance_ratio` is the share of
    /// players that must vote for the kick; `time_limit` is in seconds.
    pub async fn trigger_vote_kick(
        &self,
        issuer: impl Into<PlayerId>,
        target: impl Into<PlayerId>,
        acceptance_ratio: f64,
        time_limit: u32,
    ) -> Result<(), GameError> {
        let (issuer, target) = (issuer.into(), target.into());
        self.request(|reply| GameCommand::TriggerVoteKick {
            issuer,
            target,
            acceptance_ratio,
            time_limit,
            reply,
        })
        .await
    }

    /// Vote for the running kick campaign.
    pub async fn vote(&self, voter: impl Into<PlayerId>) -> Result<(), GameError> {
        let voter = voter.into();
        self.request(|reply| GameCommand::Vote { voter, reply }).await
    }

    /// Latest published state. Reflects every operation that has returned.
    pub fn snapshot(&self) -> GameSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn is_finished(&self) -> bool {
        self.snapshot_rx.borrow().finished
    }

    /// Receiver that is notified whenever the game changes, including
    /// changes made by the clocks.
    pub fn subscribe(&self) -> watch::Receiver<GameSnapshot> {
        self.snapshot_rx.clone()
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> GameCommand,
    ) -> Result<T, GameError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.cmd_tx
            .send(build(reply_tx))
            .await
            .map_err(|_| GameError::Closed)?;
        reply_rx.await.map_err(|_| GameError::Closed)?
    }
}

/// The task-side owner of a game and its clocks.
struct GameActor {
    game: Game,
    /// Weak so clocks spawned from here never keep the game alive.
    cmd_tx: mpsc::WeakSender<GameCommand>,
    snapshot_tx: watch::Sender<GameSnapshot>,
    turn_clock: Option<ClockHandle>,
    vote_timer: Option<(CampaignId, ClockHandle)>,
}

impl GameActor {
    async fn run(mut self, mut cmd_rx: mpsc::Receiver<GameCommand>) {
        self.sync_clocks();

        while let Some(cmd) = cmd_rx.recv().await {
            self.handle(cmd);
        }

        info!("All handles to the game dropped, stopping game task");
        self.stop_clocks();
    }

    fn handle(&mut self, cmd: GameCommand) {
        match cmd {
            GameCommand::AddEntry {
                text,
                author,
                reply,
            } => {
                let result = self.game.add_entry(&text, &author);
                self.settle(reply, result);
            }
            GameCommand::EndGame { entries, reply } => {
                let result = self.game.end_game(entries);
                self.settle(reply, result);
            }
            GameCommand::Kick { player, reply } => {
                let result = self.game.kick(&player);
                self.settle(reply, result);
            }
            GameCommand::TriggerVoteKick {
                issuer,
                target,
                acceptance_ratio,
                time_limit,
                reply,
            } => {
                let result = self
                    .game
                    .trigger_vote_kick(&issuer, &target, acceptance_ratio, time_limit)
                    .map(|_| ());
                self.settle(reply, result);
            }
            GameCommand::Vote { voter, reply } => {
                let result = self.game.vote_kick(&voter);
                self.settle(reply, result);
            }
            GameCommand::TurnTick => {
                if self.game.turn_clock_enabled() {
                    self.game.tick_turn_clock();
                    self.sync_clocks();
                    self.publish();
                }
            }
            GameCommand::VoteTick(id) => {
                let resolution = self.game.tick_vote(id);
                if resolution != VoteResolution::Stale {
                    self.sync_clocks();
                    self.publish();
                }
            }
        }
    }

    /// Bring clocks and the published snapshot in line with the game, then
    /// answer the caller.
    fn settle(&mut self, reply: Reply<()>, result: Result<(), GameError>) {
        if result.is_ok() {
            self.sync_clocks();
            self.publish();
        }
        // The caller may have given up waiting; the change still stands.
        let _ = reply.send(result);
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(GameSnapshot::from(&self.game));
    }

    /// Start or stop clocks so that exactly the clocks the game needs are
    /// running: the turn clock while a timed game is unfinished, and one
    /// timer for the active campaign.
    fn sync_clocks(&mut self) {
        if self.game.turn_clock_enabled() {
            if self.turn_clock.is_none() {
                self.turn_clock = Some(clock::spawn_turn_clock(self.cmd_tx.clone()));
            }
        } else if let Some(turn_clock) = self.turn_clock.take() {
            turn_clock.stop();
            debug!("Turn clock cancelled");
        }

        let active = self.game.vote().campaign().map(|c| c.id);
        let running = self.vote_timer.as_ref().map(|(id, _)| *id);
        if active != running {
            if let Some((id, timer)) = self.vote_timer.take() {
                timer.stop();
                debug!("Vote timer for campaign #{} cancelled", id);
            }
            if let Some(id) = active {
                self.vote_timer = Some((id, clock::spawn_vote_timer(self.cmd_tx.clone(), id)));
            }
        }
    }

    fn stop_clocks(&mut self) {
        if let Some(turn_clock) = self.turn_clock.take() {
            turn_clock.stop();
        }
        if let Some((_, timer)) = self.vote_timer.take() {
            timer.stop();
        }
    }
}
