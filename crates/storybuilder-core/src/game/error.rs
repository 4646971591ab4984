// Errors returned synchronously by game operations.

use thiserror::Error;

/// Every way a game operation can be refused. None of these are fatal: the
/// game is left untouched and the caller decides how to report it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("not this player's turn")]
    NotYourTurn,

    #[error("entry is above max length ({limit})")]
    EntryTooLong { limit: usize },

    #[error("there is no running game")]
    NoRunningGame,

    #[error("player \"{0}\" is not in the game")]
    PlayerNotInGame(String),

    #[error("there is an ongoing vote to kick player \"{target}\"")]
    VoteAlreadyActive { target: String },

    #[error("there is no ongoing vote")]
    NoActiveVote,

    #[error("player \"{0}\" cannot vote as they are not part of the game")]
    VoterNotInGame(String),

    #[error("player \"{0}\" has already voted for this vote")]
    AlreadyVoted(String),

    /// The task owning the game has stopped, so the command could not be
    /// delivered or answered.
    #[error("game task is no longer running")]
    Closed,
}
