// Read-only view of a game, published after every change.

use serde::{Deserialize, Serialize};

use super::entry::{Entry, PlayerId};
use super::state::Game;
use super::vote::VoteCampaign;

/// Serializable summary of a running vote campaign.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteSnapshot {
    /// The player the vote would remove.
    pub player: PlayerId,
    pub issuer: PlayerId,
    pub vote_count: usize,
    pub vote_threshold: usize,
    pub time_left: u32,
}

impl From<&VoteCampaign> for VoteSnapshot {
    fn from(campaign: &VoteCampaign) -> Self {
        VoteSnapshot {
            player: campaign.target.clone(),
            issuer: campaign.issuer.clone(),
            vote_count: campaign.votes_received(),
            vote_threshold: campaign.votes_needed,
            time_left: campaign.seconds_remaining,
        }
    }
}

/// Everything a caller may see about a game at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSnapshot {
    /// Player holding the turn; `None` once nobody is left.
    pub turn: Option<PlayerId>,
    pub story: Vec<Entry>,
    pub players: Vec<PlayerId>,
    pub finished: bool,
    pub time_left: u32,
    pub turn_time_limit: u32,
    pub max_length: usize,
    pub max_entries: u32,
    pub entries_left: u32,
    /// Set once an end has been scheduled, including `end 0`.
    pub countdown_armed: bool,
    pub vote_kick: Option<VoteSnapshot>,
}

impl From<&Game> for GameSnapshot {
    fn from(game: &Game) -> Self {
        GameSnapshot {
            turn: game.current_turn().map(str::to_string),
            story: game.story().to_vec(),
            players: game.players().to_vec(),
            finished: game.is_finished(),
            time_left: game.seconds_left_in_turn(),
            turn_time_limit: game.turn_time_limit(),
            max_length: game.max_entry_length(),
            max_entries: game.max_entries(),
            entries_left: game.entries_remaining(),
            countdown_armed: game.has_countdown(),
            vote_kick: game.vote().campaign().map(VoteSnapshot::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::state::GameRules;

    #[test]
    fn snapshot_mirrors_game() {
        let mut game = Game::start(
            "alice",
            ["alice", "bob", "carol"],
            GameRules {
                turn_time_limit: 30,
                max_entry_length: 80,
                entries_count: 5,
            },
        );
        game.add_entry("It was a dark night.", "alice").unwrap();
        game.trigger_vote_kick("bob", "carol", 0.65, 45).unwrap();
        game.vote_kick("bob").unwrap();

        let snapshot = GameSnapshot::from(&game);
        assert_eq!(snapshot.turn.as_deref(), Some("bob"));
        assert_eq!(snapshot.story.len(), 1);
        assert_eq!(snapshot.players, ["alice", "bob", "carol"]);
        assert!(!snapshot.finished);
        assert_eq!(snapshot.time_left, 30);
        assert_eq!(snapshot.max_length, 80);
        assert_eq!(snapshot.max_entries, 5);
        assert_eq!(snapshot.entries_left, 4);
        assert!(snapshot.countdown_armed);
        assert_eq!(
            snapshot.vote_kick,
            Some(VoteSnapshot {
                player: "carol".into(),
                issuer: "bob".into(),
                vote_count: 1,
                vote_threshold: 2,
                time_left: 45,
            })
        );
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut game = Game::start("alice", ["alice", "bob"], GameRules::default());
        game.trigger_vote_kick("alice", "bob", 0.65, 60).unwrap();

        let json = serde_json::to_value(GameSnapshot::from(&game)).unwrap();
        assert_eq!(json["turn"], "alice");
        assert_eq!(json["timeLeft"], 60);
        assert_eq!(json["maxLength"], 100);
        assert_eq!(json["entriesLeft"], 0);
        assert_eq!(json["countdownArmed"], false);
        assert_eq!(json["voteKick"]["player"], "bob");
        assert_eq!(json["voteKick"]["voteThreshold"], 2);
    }
}
