// Game engine: turn order, entries, turn clock, and vote kicks.

pub mod clock;
pub mod engine;
pub mod entry;
pub mod error;
pub mod render;
pub mod snapshot;
pub mod state;
pub mod vote;

pub use engine::{start_game, GameHandle};
pub use entry::{Entry, PlayerId};
pub use error::GameError;
pub use snapshot::{GameSnapshot, VoteSnapshot};
pub use state::{Game, GameRules};
pub use vote::{VoteCampaign, VoteResolution};
