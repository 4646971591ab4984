// Line-oriented console: parses player commands and drives one room.

use storybuilder_core::game::PlayerId;
use storybuilder_core::room::{Room, RoomError};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info};

pub const HELP: &str = "\
Commands:
  start <initiator> <player>...   start a game with the listed players
  add <author> <text...>          submit an entry
  end <n>                         end the story after n more entries
  kick <player>                   remove a player immediately
  votekick <issuer> <target>      open a vote to remove a player
  vote <voter>                    vote for the running kick
  show                            print the game
  json                            print the game as JSON
  help                            print this help
  quit                            leave";

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    Start {
        initiator: PlayerId,
        players: Vec<PlayerId>,
    },
    Add {
        author: PlayerId,
        text: String,
    },
    End(u32),
    Kick(PlayerId),
    VoteKick {
        issuer: PlayerId,
        target: PlayerId,
    },
    Vote(PlayerId),
    Show,
    Json,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty command")]
    Empty,

    #[error("unknown command `{0}`, type `help` for the list")]
    Unknown(String),

    #[error("usage: {0}")]
    Usage(&'static str),
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<ConsoleCommand, ParseError> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    let args: Vec<&str> = rest.split_whitespace().collect();

    match verb {
        "" => Err(ParseError::Empty),
        "start" => match args.split_first() {
            Some((initiator, others)) => {
                let mut players = vec![initiator.to_string()];
                players.extend(others.iter().map(|p| p.to_string()));
                Ok(ConsoleCommand::Start {
                    initiator: initiator.to_string(),
                    players,
                })
            }
            None => Err(ParseError::Usage("start <initiator> <player>...")),
        },
        "add" => match rest.split_once(char::is_whitespace) {
            Some((author, text)) if !text.trim().is_empty() => Ok(ConsoleCommand::Add {
                author: author.to_string(),
                text: text.trim().to_string(),
            }),
            _ => Err(ParseError::Usage("add <author> <text...>")),
        },
        "end" => match args.as_slice() {
            [n] => n
                .parse()
                .map(ConsoleCommand::End)
                .map_err(|_| ParseError::Usage("end <n>")),
            _ => Err(ParseError::Usage("end <n>")),
        },
        "kick" => match args.as_slice() {
            [player] => Ok(ConsoleCommand::Kick(player.to_string())),
            _ => Err(ParseError::Usage("kick <player>")),
        },
        "votekick" => match args.as_slice() {
            [issuer, target] => Ok(ConsoleCommand::VoteKick {
                issuer: issuer.to_string(),
                target: target.to_string(),
            }),
            _ => Err(ParseError::Usage("votekick <issuer> <target>")),
        },
        "vote" => match args.as_slice() {
            [voter] => Ok(ConsoleCommand::Vote(voter.to_string())),
            _ => Err(ParseError::Usage("vote <voter>")),
        },
        "show" => Ok(ConsoleCommand::Show),
        "json" => Ok(ConsoleCommand::Json),
        "help" => Ok(ConsoleCommand::Help),
        "quit" | "exit" => Ok(ConsoleCommand::Quit),
        other => Err(ParseError::Unknown(other.to_string())),
    }
}

/// Apply a command to the room and return the text to print.
pub async fn execute(room: &mut Room, cmd: ConsoleCommand) -> Result<String, RoomError> {
    debug!("Executing {:?}", cmd);
    match cmd {
        ConsoleCommand::Start { initiator, players } => {
            room.start_game(&initiator, &players)?;
            Ok(format!("Game successfully started in room \"{}\".", room.name))
        }
        ConsoleCommand::Add { author, text } => {
            room.running_game()?.add_entry(text, author).await?;
            Ok("Entry successfully submitted.".to_string())
        }
        ConsoleCommand::End(entries) => {
            room.running_game()?.end_game(entries).await?;
            Ok(format!(
                "Game end successfully triggered in room \"{}\".",
                room.name
            ))
        }
        ConsoleCommand::Kick(player) => {
            room.running_game()?.kick(player.as_str()).await?;
            Ok(format!("Player \"{player}\" was kicked from the game."))
        }
        ConsoleCommand::VoteKick { issuer, target } => {
            room.trigger_vote_kick(&issuer, &target).await?;
            Ok(format!("Vote to kick player \"{target}\" started."))
        }
        ConsoleCommand::Vote(voter) => {
            room.running_game()?.vote(voter).await?;
            Ok("Vote successfully submitted.".to_string())
        }
        ConsoleCommand::Show => Ok(room.game()?.to_string()),
        ConsoleCommand::Json => {
            let snapshot = room.game()?;
            Ok(serde_json::to_string_pretty(&snapshot)
                .unwrap_or_else(|e| format!("failed to serialize game: {e}")))
        }
        ConsoleCommand::Help => Ok(HELP.to_string()),
        ConsoleCommand::Quit => Ok(String::new()),
    }
}

/// Read commands line by line from `input` until `quit` or end of input,
/// writing results and errors to `output`.
pub async fn run<R, W>(room: &mut Room, input: R, mut output: W) -> std::io::Result<()>
where
    R: tokio::io::AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = BufReader::new(input).lines();
    while let Some(line) = lines.next_line().await? {
        let reply = match parse_command(&line) {
            Ok(ConsoleCommand::Quit) => {
                info!("Quit command received");
                break;
            }
            Ok(cmd) => match execute(room, cmd).await {
                Ok(text) => text,
                Err(e) => format!("Error: {e}"),
            },
            Err(ParseError::Empty) => continue,
            Err(e) => format!("Error: {e}"),
        };
        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }
    Ok(())
}
