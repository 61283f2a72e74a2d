//! Interactive player commands

use cadence_playback::RemoteCommand;
use std::fmt;
use std::str::FromStr;

/// One line typed at the player prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    List,
    Reload,
    /// Play the n-th listed track (1-based)
    Play(usize),
    Pause,
    Toggle,
    All,
    Next,
    Prev,
    Seek(u64),
    Volume(u8),
    Mute,
    Unmute,
    Shuffle(bool),
    Clear,
    /// Press a host media key
    Media(RemoteCommand),
    Status,
    Help,
    Logout,
    Quit,
}

/// Why a line could not be understood
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseCommandError(String);

impl fmt::Display for ParseCommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (type `help` for commands)", self.0)
    }
}

impl std::error::Error for ParseCommandError {}

impl FromStr for Command {
    type Err = ParseCommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(ParseCommandError("Empty command".to_string()));
        };
        let argument = words.next();

        let command = match name.to_ascii_lowercase().as_str() {
            "list" | "ls" => Command::List,
            "reload" => Command::Reload,
            "play" | "p" => {
                let index: usize = parse_argument(name, argument)?;
                if index == 0 {
                    return Err(ParseCommandError("Track numbers start at 1".to_string()));
                }
                Command::Play(index)
            }
            "pause" => Command::Pause,
            "toggle" | "t" => Command::Toggle,
            "all" => Command::All,
            "next" | "n" => Command::Next,
            "prev" | "previous" => Command::Prev,
            "seek" => Command::Seek(parse_argument(name, argument)?),
            "vol" | "volume" => {
                let level: u8 = parse_argument(name, argument)?;
                if level > 100 {
                    return Err(ParseCommandError("Volume must be 0-100".to_string()));
                }
                Command::Volume(level)
            }
            "mute" => Command::Mute,
            "unmute" => Command::Unmute,
            "shuffle" => match argument {
                Some("on") => Command::Shuffle(true),
                Some("off") => Command::Shuffle(false),
                _ => return Err(ParseCommandError("Usage: shuffle on|off".to_string())),
            },
            "clear" | "stop" => Command::Clear,
            "media" => match argument {
                Some("play") => Command::Media(RemoteCommand::Play),
                Some("pause") => Command::Media(RemoteCommand::Pause),
                Some("next") => Command::Media(RemoteCommand::Next),
                Some("prev") => Command::Media(RemoteCommand::Previous),
                _ => {
                    return Err(ParseCommandError(
                        "Usage: media play|pause|next|prev".to_string(),
                    ))
                }
            },
            "status" | "s" => Command::Status,
            "help" | "?" => Command::Help,
            "logout" => Command::Logout,
            "quit" | "exit" | "q" => Command::Quit,
            other => return Err(ParseCommandError(format!("Unknown command: {other}"))),
        };

        Ok(command)
    }
}

fn parse_argument<T: FromStr>(name: &str, argument: Option<&str>) -> Result<T, ParseCommandError> {
    argument
        .and_then(|value| value.parse().ok())
        .ok_or_else(|| ParseCommandError(format!("`{name}` needs a number")))
}

pub const HELP: &str = "\
Commands:
  list              show the library
  reload            fetch the library again
  play <n>          play track n
  pause             pause the current track
  toggle            play/pause the current track
  all               play all / pause all
  next, prev        skip forward / back (prev twice quickly to go back)
  seek <secs>       jump within the current track
  vol <0-100>       set volume
  mute, unmute      silence output
  shuffle on|off    random order
  clear             stop and unload
  media <key>       press a media key (play, pause, next, prev)
  status            show what is playing
  logout            sign out and leave the player
  quit              leave the player";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_commands() {
        assert_eq!("list".parse::<Command>(), Ok(Command::List));
        assert_eq!("  NEXT ".parse::<Command>(), Ok(Command::Next));
        assert_eq!("prev".parse::<Command>(), Ok(Command::Prev));
        assert_eq!("all".parse::<Command>(), Ok(Command::All));
        assert_eq!("quit".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn parses_arguments() {
        assert_eq!("play 3".parse::<Command>(), Ok(Command::Play(3)));
        assert_eq!("seek 90".parse::<Command>(), Ok(Command::Seek(90)));
        assert_eq!("vol 55".parse::<Command>(), Ok(Command::Volume(55)));
        assert_eq!("shuffle on".parse::<Command>(), Ok(Command::Shuffle(true)));
        assert_eq!("shuffle off".parse::<Command>(), Ok(Command::Shuffle(false)));
        assert_eq!(
            "media prev".parse::<Command>(),
            Ok(Command::Media(RemoteCommand::Previous))
        );
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!("play".parse::<Command>().is_err());
        assert!("play 0".parse::<Command>().is_err());
        assert!("play x".parse::<Command>().is_err());
        assert!("vol 101".parse::<Command>().is_err());
        assert!("shuffle maybe".parse::<Command>().is_err());
        assert!("media stop".parse::<Command>().is_err());
    }

    #[test]
    fn rejects_unknown_and_empty() {
        let err = "dance".parse::<Command>().unwrap_err();
        assert!(err.to_string().contains("Unknown command: dance"));
        assert!("   ".parse::<Command>().is_err());
    }
}
