// Background clocks: the per-turn countdown and the vote-kick timer.
//
// Clocks never touch the game directly. Each one wakes once per second and
// posts a tick command to the game's command channel, so ticks are applied
// in order with every other operation. A clock stops when its cancel signal
// fires, when its `ClockHandle` is dropped, or when the game task is gone.

use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tracing::debug;

use super::engine::GameCommand;
use super::vote::CampaignId;

/// Cadence of both clocks.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Owner side of a running clock task.
#[derive(Debug)]
pub(crate) struct ClockHandle {
    cancel: watch::Sender<bool>,
}

impl ClockHandle {
    /// Signal the clock to stop. The task exits at its next wake-up.
    pub(crate) fn stop(self) {
        let _ = self.cancel.send(true);
    }
}

/// Start the turn clock for a game.
pub(crate) fn spawn_turn_clock(cmd_tx: mpsc::WeakSender<GameCommand>) -> ClockHandle {
    spawn_clock(cmd_tx, "turn clock", || GameCommand::TurnTick)
}

/// Start the timer for vote campaign `id`.
pub(crate) fn spawn_vote_timer(
    cmd_tx: mpsc::WeakSender<GameCommand>,
    id: CampaignId,
) -> ClockHandle {
    spawn_clock(cmd_tx, "vote timer", move || GameCommand::VoteTick(id))
}

fn spawn_clock<F>(cmd_tx: mpsc::WeakSender<GameCommand>, name: &'static str, tick: F) -> ClockHandle
where
    F: Fn() -> GameCommand + Send + 'static,
{
    let (cancel, cancel_rx) = watch::channel(false);
    tokio::spawn(run_clock(cmd_tx, cancel_rx, name, tick));
    ClockHandle { cancel }
}

async fn run_clock<F>(
    cmd_tx: mpsc::WeakSender<GameCommand>,
    mut cancel_rx: watch::Receiver<bool>,
    name: &'static str,
    tick: F,
) where
    F: Fn() -> GameCommand,
{
    let mut interval = tokio::time::interval(TICK_INTERVAL);
    // The first tick completes immediately; consume it so the first real
    // tick lands one full second after the clock starts.
    interval.tick().await;

    loop {
        tokio::select! {
            _ = interval.tick() => {
                // Only a weak reference is held so a discarded game can shut
                // down even while its clocks are running.
                let Some(tx) = cmd_tx.upgrade() else {
                    break;
                };
                if tx.send(tick()).await.is_err() {
                    break;
                }
            }
            changed = cancel_rx.changed() => {
                if changed.is_err() || *cancel_rx.borrow() {
                    break;
                }
            }
        }
    }
    debug!("{} stopped", name);
}
