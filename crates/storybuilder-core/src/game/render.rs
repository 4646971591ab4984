// Human-readable rendering of game snapshots for console and HTTP bodies.

use std::fmt;

use super::snapshot::{GameSnapshot, VoteSnapshot};

const RULE: &str = "--------------------------------";

impl fmt::Display for VoteSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Triggered by: \"{}\"", self.issuer)?;
        writeln!(f, "Player to kick: \"{}\"", self.player)?;
        writeln!(f, "Required votes: {}", self.vote_threshold)?;
        writeln!(f, "Votes so far: {}", self.vote_count)?;
        writeln!(f, "Time left until vote end: {} seconds", self.time_left)
    }
}

impl fmt::Display for GameSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f)?;
        if let Some(vote) = &self.vote_kick {
            writeln!(f, "ATTENTION: There is a kick vote going on!")?;
            write!(f, "{vote}")?;
            writeln!(f, "\nYou can cast your vote using the vote command.\n")?;
        }

        writeln!(f, "Players in the game: {}", self.players.join(", "))?;
        writeln!(f, "{RULE}")?;
        for entry in &self.story {
            writeln!(f, "{entry}")?;
        }
        writeln!(f, "{RULE}")?;

        if self.finished {
            return writeln!(f, "The game has finished. You can now start the next one!");
        }

        if let Some(turn) = &self.turn {
            writeln!(f, "Next turn: Player \"{turn}\"")?;
        }
        if self.max_length > 0 {
            writeln!(f, "Max length: {} symbols", self.max_length)?;
        }
        if self.turn_time_limit > 0 {
            writeln!(f, "Time left: {} seconds", self.time_left)?;
        }
        if self.countdown_armed {
            if self.entries_left <= 1 {
                writeln!(f, "\nNext entry will be the story ending. Make it a good one!")?;
            } else {
                writeln!(f, "Entries left: {}", self.entries_left)?;
            }
        }
        Ok(())
    }
}
