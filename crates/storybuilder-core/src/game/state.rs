// Game state: players, turn rotation, story, end-of-game countdown, and the
// vote-kick sub-state.
//
// Everything here is synchronous and lock-free. A `Game` is owned by exactly
// one task (see `engine`), which applies commands and clock ticks one at a
// time, so every read/modify pair below is atomic with respect to the others.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::entry::{Entry, PlayerId};
use super::error::GameError;
use super::vote::{votes_needed, CampaignId, VoteCampaign, VoteResolution, VoteState};

/// Per-game rules chosen when the game is started.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GameRules {
    /// Seconds per turn. 0 disables the turn clock.
    pub turn_time_limit: u32,
    /// Maximum characters per entry. 0 means unlimited.
    pub max_entry_length: usize,
    /// Entries until the story ends. 0 means no countdown.
    pub entries_count: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        GameRules {
            turn_time_limit: 60,
            max_entry_length: 100,
            entries_count: 0,
        }
    }
}

/// Scheduled end of the story.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Countdown {
    configured: u32,
    remaining: u32,
}

/// The complete state of one story builder game.
#[derive(Debug, Clone)]
pub struct Game {
    /// Unique players; position is turn order.
    players: Vec<PlayerId>,
    current_turn: Option<PlayerId>,
    /// 1-based pointer into `players` for the player holding the turn.
    turn_index: usize,
    story: Vec<Entry>,
    finished: bool,
    seconds_left_in_turn: u32,
    turn_time_limit: u32,
    max_entry_length: usize,
    countdown: Option<Countdown>,
    vote: VoteState,
    next_campaign_id: CampaignId,
}

impl Game {
    /// Start a game with the players present in the room. The initiator is
    /// moved to the front and takes the first turn; the other players keep
    /// their relative order. Duplicate names are collapsed.
    pub fn start<I>(initiator: &str, players: I, rules: GameRules) -> Self
    where
        I: IntoIterator,
        I::Item: Into<PlayerId>,
    {
        let mut ordered: Vec<PlayerId> = vec![initiator.to_string()];
        for player in players {
            let player = player.into();
            if !ordered.contains(&player) {
                ordered.push(player);
            }
        }

        info!(
            "Starting game: initiator={}, {} players, turn limit {}s, max length {}, entries {}",
            initiator,
            ordered.len(),
            rules.turn_time_limit,
            rules.max_entry_length,
            rules.entries_count
        );

        Game {
            players: ordered,
            current_turn: Some(initiator.to_string()),
            turn_index: 1,
            story: Vec::new(),
            finished: false,
            seconds_left_in_turn: rules.turn_time_limit,
            turn_time_limit: rules.turn_time_limit,
            max_entry_length: rules.max_entry_length,
            countdown: (rules.entries_count > 0).then_some(Countdown {
                configured: rules.entries_count,
                remaining: rules.entries_count,
            }),
            vote: VoteState::Idle,
            next_campaign_id: 1,
        }
    }

    // -- accessors ----------------------------------------------------------

    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn current_turn(&self) -> Option<&str> {
        self.current_turn.as_deref()
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    pub fn story(&self) -> &[Entry] {
        &self.story
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn seconds_left_in_turn(&self) -> u32 {
        self.seconds_left_in_turn
    }

    pub fn turn_time_limit(&self) -> u32 {
        self.turn_time_limit
    }

    pub fn max_entry_length(&self) -> usize {
        self.max_entry_length
    }

    /// Entries the story was last scheduled to run for (0 = no countdown).
    pub fn max_entries(&self) -> u32 {
        self.countdown.map_or(0, |c| c.configured)
    }

    /// Entries left before the story ends (0 when no countdown is armed).
    pub fn entries_remaining(&self) -> u32 {
        self.countdown.map_or(0, |c| c.remaining)
    }

    pub fn has_countdown(&self) -> bool {
        self.countdown.is_some()
    }

    pub fn vote(&self) -> &VoteState {
        &self.vote
    }

    /// Whether the turn clock should be ticking for this game.
    pub fn turn_clock_enabled(&self) -> bool {
        self.turn_time_limit > 0 && !self.finished
    }

    // -- operations ---------------------------------------------------------

    /// Append an entry on behalf of the player holding the turn and pass the
    /// turn on. The entry that exhausts the countdown is still recorded.
    pub fn add_entry(&mut self, text: &str, author: &str) -> Result<(), GameError> {
        self.ensure_running()?;
        if self.current_turn.as_deref() != Some(author) {
            return Err(GameError::NotYourTurn);
        }
        if self.max_entry_length > 0 && text.chars().count() > self.max_entry_length {
            return Err(GameError::EntryTooLong {
                limit: self.max_entry_length,
            });
        }

        self.story.push(Entry::new(text, author));
        debug!("Entry #{} accepted from {}", self.story.len(), author);
        self.advance_turn();

        if let Some(countdown) = self.countdown.as_mut() {
            countdown.remaining = countdown.remaining.saturating_sub(1);
            if countdown.remaining == 0 {
                self.finish();
            }
        }
        Ok(())
    }

    /// Schedule the story to end after `entries` more entries, replacing any
    /// earlier schedule. With 0 the next accepted entry ends the story.
    /// Running vote campaigns are left alone.
    pub fn end_game(&mut self, entries: u32) -> Result<(), GameError> {
        self.ensure_running()?;
        info!("Story end scheduled after {} more entries", entries);
        self.countdown = Some(Countdown {
            configured: entries,
            remaining: entries,
        });
        Ok(())
    }

    /// Remove a player immediately. If they held the turn, the turn rotates
    /// over the remaining players; with nobody left the game finishes.
    pub fn kick(&mut self, player: &str) -> Result<(), GameError> {
        self.ensure_running()?;
        let position = self
            .players
            .iter()
            .position(|p| p == player)
            .ok_or_else(|| GameError::PlayerNotInGame(player.to_string()))?;

        self.players.remove(position);
        info!("Player {} removed ({} left)", player, self.players.len());

        if self.current_turn.as_deref() == Some(player) {
            self.advance_turn();
        } else if position + 1 < self.turn_index {
            // Keep the pointer on the same player after the list shifted.
            self.turn_index -= 1;
        }
        Ok(())
    }

    /// Open a vote to remove `target`. Returns the id the vote timer must
    /// carry in its ticks.
    pub fn trigger_vote_kick(
        &mut self,
        issuer: &str,
        target: &str,
        acceptance_ratio: f64,
        time_limit: u32,
    ) -> Result<CampaignId, GameError> {
        self.ensure_running()?;
        if let VoteState::Active(campaign) = &self.vote {
            return Err(GameError::VoteAlreadyActive {
                target: campaign.target.clone(),
            });
        }
        if !self.players.iter().any(|p| p == target) {
            return Err(GameError::PlayerNotInGame(target.to_string()));
        }

        let id = self.next_campaign_id;
        self.next_campaign_id += 1;
        let needed = votes_needed(self.players.len(), acceptance_ratio);
        info!(
            "Vote #{} to kick {} opened by {}: {} of {} votes needed within {}s",
            id,
            target,
            issuer,
            needed,
            self.players.len(),
            time_limit
        );
        self.vote = VoteState::Active(VoteCampaign::new(id, issuer, target, needed, time_limit));
        Ok(id)
    }

    /// Cast a ballot in the running campaign.
    pub fn vote_kick(&mut self, voter: &str) -> Result<(), GameError> {
        self.ensure_running()?;
        let VoteState::Active(campaign) = &mut self.vote else {
            return Err(GameError::NoActiveVote);
        };
        if !self.players.iter().any(|p| p == voter) {
            return Err(GameError::VoterNotInGame(voter.to_string()));
        }
        campaign.record_vote(voter)?;
        debug!(
            "{} voted to kick {} ({}/{})",
            voter,
            campaign.target,
            campaign.votes_received(),
            campaign.votes_needed
        );
        Ok(())
    }

    // -- clock ticks --------------------------------------------------------

    /// One second of the turn clock. When the budget runs out the player in
    /// turn forfeits and the turn rotates. Returns `true` on a forfeit.
    pub fn tick_turn_clock(&mut self) -> bool {
        if !self.turn_clock_enabled() {
            return false;
        }
        self.seconds_left_in_turn = self.seconds_left_in_turn.saturating_sub(1);
        if self.seconds_left_in_turn > 0 {
            return false;
        }

        let forfeited = self.current_turn.clone().unwrap_or_default();
        self.advance_turn();
        info!(
            "Turn of {} timed out, next: {}",
            forfeited,
            self.current_turn.as_deref().unwrap_or("-")
        );
        true
    }

    /// One second of the vote timer for campaign `id`. Quorum is checked
    /// before the countdown so a vote that passes on its last second kicks.
    pub fn tick_vote(&mut self, id: CampaignId) -> VoteResolution {
        let campaign = match &mut self.vote {
            VoteState::Active(campaign) if campaign.id == id => campaign,
            _ => return VoteResolution::Stale,
        };

        if campaign.has_quorum() {
            let target = campaign.target.clone();
            self.vote = VoteState::Idle;
            info!("Vote #{} passed, kicking {}", id, target);
            if let Err(e) = self.kick(&target) {
                debug!("Vote #{} target {} already gone: {}", id, target, e);
            }
            return VoteResolution::Kicked { target };
        }

        if campaign.countdown() {
            let target = campaign.target.clone();
            self.vote = VoteState::Idle;
            info!("Vote #{} to kick {} expired", id, target);
            return VoteResolution::Expired { target };
        }

        VoteResolution::Pending
    }

    // -- internals ----------------------------------------------------------

    fn ensure_running(&self) -> Result<(), GameError> {
        if self.finished {
            Err(GameError::NoRunningGame)
        } else {
            Ok(())
        }
    }

    /// Rotation rule: step the 1-based pointer, wrapping past the end, and
    /// hand the turn (with a fresh time budget) to whoever sits there.
    fn advance_turn(&mut self) {
        self.turn_index += 1;
        if self.turn_index > self.players.len() {
            self.turn_index = 1;
        }

        match self.players.get(self.turn_index - 1) {
            Some(next) => {
                self.current_turn = Some(next.clone());
                self.seconds_left_in_turn = self.turn_time_limit;
            }
            None => {
                self.current_turn = None;
                self.finish();
            }
        }
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if let VoteState::Active(campaign) = std::mem::take(&mut self.vote) {
            info!("Vote #{} dismissed because the game ended", campaign.id);
        }
        info!(
            "Game finished with {} entries and {} players",
            self.story.len(),
            self.players.len()
        );
    }
}
