// Room slot: owns the room's current game and keeps the last finished one
// readable until the next game replaces it.
//
// Membership and admin checks happen before these methods are called.

use thiserror::Error;
use tracing::info;

use crate::config::VotePolicy;
use crate::game::{start_game, GameError, GameHandle, GameRules, GameSnapshot, PlayerId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RoomError {
    #[error("there is already a running game in room \"{0}\"")]
    GameInProgress(String),

    #[error("no games have been started in room \"{0}\"")]
    NoGame(String),

    #[error("there is no running game in room \"{0}\"")]
    NoRunningGame(String),

    #[error("cannot start a game without players")]
    NoPlayers,

    #[error("player \"{0}\" must be in the room to start a game")]
    InitiatorNotPresent(String),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// A room in which one game at a time is played.
#[derive(Debug)]
pub struct Room {
    pub name: String,
    pub rules: GameRules,
    pub vote_policy: VotePolicy,
    game: Option<GameHandle>,
}

impl Room {
    pub fn new(name: impl Into<String>, rules: GameRules, vote_policy: VotePolicy) -> Self {
        Room {
            name: name.into(),
            rules,
            vote_policy,
            game: None,
        }
    }

    /// Start a game with the room's rules and the players currently present.
    /// The previous game, if finished, is discarded.
    pub fn start_game(
        &mut self,
        initiator: &str,
        players: &[PlayerId],
    ) -> Result<GameHandle, RoomError> {
        self.start_game_with(initiator, players, self.rules)
    }

    /// Like [`Room::start_game`] but with rules chosen for this game only.
    pub fn start_game_with(
        &mut self,
        initiator: &str,
        players: &[PlayerId],
        rules: GameRules,
    ) -> Result<GameHandle, RoomError> {
        if self.game.as_ref().is_some_and(|g| !g.is_finished()) {
            return Err(RoomError::GameInProgress(self.name.clone()));
        }
        if players.is_empty() {
            return Err(RoomError::NoPlayers);
        }
        if !players.iter().any(|p| p == initiator) {
            return Err(RoomError::InitiatorNotPresent(initiator.to_string()));
        }

        info!("Room {}: {} starts a new game", self.name, initiator);
        let handle = start_game(initiator, players.iter().cloned(), rules);
        self.game = Some(handle.clone());
        Ok(handle)
    }

    /// Snapshot of the current game, or of the last one if it has finished.
    pub fn game(&self) -> Result<GameSnapshot, RoomError> {
        self.game
            .as_ref()
            .map(GameHandle::snapshot)
            .ok_or_else(|| RoomError::NoGame(self.name.clone()))
    }

    /// Handle to the game if it is still running.
    pub fn running_game(&self) -> Result<&GameHandle, RoomError> {
        match &self.game {
            Some(game) if !game.is_finished() => Ok(game),
            _ => Err(RoomError::NoRunningGame(self.name.clone())),
        }
    }

    /// Open a vote kick using the room's vote policy.
    pub async fn trigger_vote_kick(&self, issuer: &str, target: &str) -> Result<(), RoomError> {
        let policy = self.vote_policy;
        self.running_game()?
            .trigger_vote_kick(issuer, target, policy.acceptance_ratio, policy.time_limit)
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(names: &[&str]) -> Vec<PlayerId> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn room() -> Room {
        Room::new(
            "tavern",
            GameRules {
                turn_time_limit: 0,
                max_entry_length: 100,
                entries_count: 1,
            },
            VotePolicy::default(),
        )
    }

    #[tokio::test]
    async fn no_game_before_first_start() {
        let room = room();
        assert_eq!(room.game(), Err(RoomError::NoGame("tavern".into())));
        assert!(matches!(
            room.running_game(),
            Err(RoomError::NoRunningGame(_))
        ));
    }

    #[tokio::test]
    async fn second_start_rejected_while_running() {
        let mut room = room();
        room.start_game("alice", &players(&["alice", "bob"])).unwrap();
        assert_eq!(
            room.start_game("bob", &players(&["alice", "bob"])).unwrap_err(),
            RoomError::GameInProgress("tavern".into())
        );
    }

    #[tokio::test]
    async fn finished_game_stays_readable_until_replaced() {
        let mut room = room();
        let game = room.start_game("alice", &players(&["alice", "bob"])).unwrap();
        game.add_entry("The end.", "alice").await.unwrap();

        let last = room.game().unwrap();
        assert!(last.finished);
        assert_eq!(last.story.len(), 1);
        assert!(room.running_game().is_err());

        room.start_game("bob", &players(&["alice", "bob"])).unwrap();
        let current = room.game().unwrap();
        assert!(!current.finished);
        assert!(current.story.is_empty());
        assert_eq!(current.turn.as_deref(), Some("bob"));
    }

    #[tokio::test]
    async fn initiator_must_be_present() {
        let mut room = room();
        assert_eq!(
            room.start_game("zed", &players(&["alice"])).unwrap_err(),
            RoomError::InitiatorNotPresent("zed".into())
        );
        assert_eq!(
            room.start_game("zed", &[]).unwrap_err(),
            RoomError::NoPlayers
        );
    }

    #[tokio::test]
    async fn vote_kick_uses_room_policy() {
        let mut room = room();
        room.start_game("alice", &players(&["alice", "bob", "carol"]))
            .unwrap();
        room.trigger_vote_kick("alice", "bob").await.unwrap();

        let vote = room.game().unwrap().vote_kick.unwrap();
        assert_eq!(vote.vote_threshold, 2);
        assert_eq!(vote.time_left, 60);

        assert_eq!(
            room.trigger_vote_kick("bob", "alice").await.unwrap_err(),
            RoomError::Game(GameError::VoteAlreadyActive {
                target: "bob".into()
            })
        );
    }
}
