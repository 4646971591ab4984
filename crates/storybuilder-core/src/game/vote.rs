// Vote-kick campaigns: quorum math, ballots, and expiry countdown.

use super::entry::PlayerId;
use super::error::GameError;

/// Identifies one campaign for the lifetime of a game. Timer ticks carry the
/// id of the campaign they were spawned for so ticks that arrive after the
/// campaign resolved can be recognised and dropped.
pub type CampaignId = u64;

/// Minimum distinct votes required to pass a kick: the ceiling of
/// `player_count * acceptance_ratio`, never below one.
pub fn votes_needed(player_count: usize, acceptance_ratio: f64) -> usize {
    let needed = (player_count as f64 * acceptance_ratio).ceil();
    if needed.is_nan() || needed < 1.0 {
        1
    } else {
        needed as usize
    }
}

/// An in-progress democratic removal vote.
#[derive(Debug, Clone, PartialEq)]
pub struct VoteCampaign {
    pub id: CampaignId,
    /// Player on whose behalf the vote was opened.
    pub issuer: PlayerId,
    /// Player who will be removed if the vote passes.
    pub target: PlayerId,
    pub votes_needed: usize,
    pub seconds_remaining: u32,
    /// Distinct voters in the order they voted. The received count is
    /// derived from this list.
    voters: Vec<PlayerId>,
}

impl VoteCampaign {
    pub fn new(
        id: CampaignId,
        issuer: impl Into<PlayerId>,
        target: impl Into<PlayerId>,
        votes_needed: usize,
        seconds_remaining: u32,
    ) -> Self {
        VoteCampaign {
            id,
            issuer: issuer.into(),
            target: target.into(),
            votes_needed: votes_needed.max(1),
            seconds_remaining,
            voters: Vec::new(),
        }
    }

    pub fn votes_received(&self) -> usize {
        self.voters.len()
    }

    pub fn voters(&self) -> &[PlayerId] {
        &self.voters
    }

    pub fn has_voted(&self, player: &str) -> bool {
        self.voters.iter().any(|v| v == player)
    }

    pub fn has_quorum(&self) -> bool {
        self.votes_received() >= self.votes_needed
    }

    /// Record a ballot. Each player may vote once per campaign.
    pub(crate) fn record_vote(&mut self, voter: &str) -> Result<(), GameError> {
        if self.has_voted(voter) {
            return Err(GameError::AlreadyVoted(voter.to_string()));
        }
        self.voters.push(voter.to_string());
        Ok(())
    }

    /// Advance the countdown by one second. Returns `true` once time is up.
    pub(crate) fn countdown(&mut self) -> bool {
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        self.seconds_remaining == 0
    }
}

/// Whether the game currently has a vote campaign running.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum VoteState {
    #[default]
    Idle,
    Active(VoteCampaign),
}

impl VoteState {
    pub fn campaign(&self) -> Option<&VoteCampaign> {
        match self {
            VoteState::Idle => None,
            VoteState::Active(campaign) => Some(campaign),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, VoteState::Active(_))
    }
}

/// Outcome of one vote timer tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoteResolution {
    /// Still collecting votes.
    Pending,
    /// Quorum reached; the target was removed (if still present).
    Kicked { target: PlayerId },
    /// Time ran out before quorum; nobody was removed.
    Expired { target: PlayerId },
    /// The tick belongs to a campaign that is no longer active.
    Stale,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_rounds_up() {
        assert_eq!(votes_needed(3, 0.65), 2);
        assert_eq!(votes_needed(4, 0.65), 3);
        assert_eq!(votes_needed(10, 0.65), 7);
        assert_eq!(votes_needed(2, 0.5), 1);
        assert_eq!(votes_needed(3, 1.0), 3);
    }

    #[test]
    fn threshold_never_below_one() {
        assert_eq!(votes_needed(1, 0.01), 1);
        assert_eq!(votes_needed(5, 0.0), 1);
        assert_eq!(votes_needed(0, 0.65), 1);
        assert_eq!(votes_needed(3, f64::NAN), 1);
    }

    #[test]
    fn duplicate_ballot_rejected() {
        let mut campaign = VoteCampaign::new(1, "alice", "bob", 2, 60);
        campaign.record_vote("alice").unwrap();
        assert_eq!(
            campaign.record_vote("alice"),
            Err(GameError::AlreadyVoted("alice".into()))
        );
        assert_eq!(campaign.votes_received(), 1);
        assert_eq!(campaign.voters(), ["alice".to_string()]);
    }

    #[test]
    fn quorum_reached_at_threshold() {
        let mut campaign = VoteCampaign::new(1, "alice", "bob", 2, 60);
        campaign.record_vote("alice").unwrap();
        assert!(!campaign.has_quorum());
        campaign.record_vote("carol").unwrap();
        assert!(campaign.has_quorum());
    }

    #[test]
    fn countdown_expires_at_zero() {
        let mut campaign = VoteCampaign::new(1, "alice", "bob", 2, 2);
        assert!(!campaign.countdown());
        assert!(campaign.countdown());
        // Already at zero: stays expired.
        assert!(campaign.countdown());
    }

    #[test]
    fn zero_threshold_clamped() {
        let campaign = VoteCampaign::new(1, "alice", "bob", 0, 60);
        assert_eq!(campaign.votes_needed, 1);
    }
}
