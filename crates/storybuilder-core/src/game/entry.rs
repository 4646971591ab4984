// Story entries: one accepted contribution per turn.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Player identifier as supplied by the room (the player's username).
pub type PlayerId = String;

/// A single accepted story fragment. Entries are never modified once they
/// are appended to the story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// The submitted text.
    pub text: String,
    /// The player who wrote it.
    #[serde(rename = "player")]
    pub author: PlayerId,
}

impl Entry {
    pub fn new(text: impl Into<String>, author: impl Into<PlayerId>) -> Self {
        Entry {
            text: text.into(),
            author: author.into(),
        }
    }
}

impl fmt::Display for Entry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.author, self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_author() {
        let entry = Entry::new("Once upon a time", "alice");
        assert_eq!(entry.to_string(), "alice: Once upon a time");
    }

    #[test]
    fn serializes_author_as_player() {
        let entry = Entry::new("The end.", "bob");
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["player"], "bob");
        assert_eq!(json["text"], "The end.");
    }
}
