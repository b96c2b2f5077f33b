//! Interactive commands read from stdin.
//!
//! ```text
//! login <user_id>            sign in
//! logout                     sign out
//! open <room_id>             open a conversation
//! close                      leave the conversation view
//! send <room_id> <text...>   send a message
//! chat <product_id> <seller> [name...]
//!                            start a chat about a listing
//! click <n>                  follow notification n
//! dismiss <n>                dismiss notification n
//! retry                      reconnect after giving up
//! quit                       tear down and exit
//! ```

use std::str::FromStr;

use barter_app::{NotificationId, NotifierEvent};
use barter_core::{RoomId, UserId};
use thiserror::Error;

/// Command could not be parsed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Blank line.
    #[error("empty command")]
    Empty,

    /// First word is not a command.
    #[error("unknown command: {0} (try: login, logout, open, close, send, chat, click, dismiss, retry, quit)")]
    Unknown(String),

    /// A required argument is missing.
    #[error("{command}: missing {argument}")]
    MissingArgument {
        /// Command name.
        command: &'static str,
        /// Argument name.
        argument: &'static str,
    },

    /// Notification number is not a number.
    #[error("not a notification number: {0}")]
    BadNotification(String),
}

/// One parsed command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Sign in.
    Login(UserId),
    /// Sign out.
    Logout,
    /// Notifier input.
    Notifier(NotifierEvent),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (name, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
        let rest = rest.trim();

        let command = match name {
            "" => return Err(CommandError::Empty),
            "login" => Self::Login(UserId::new(word(rest, "login", "user id")?)),
            "logout" => Self::Logout,
            "open" => Self::Notifier(NotifierEvent::OpenRoom { room_id: RoomId::new(word(rest, "open", "room id")?) }),
            "close" => Self::Notifier(NotifierEvent::CloseRoom),
            "send" => {
                let (room, text) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let room = word(room, "send", "room id")?;
                Self::Notifier(NotifierEvent::SendMessage { room_id: RoomId::new(room), text: text.to_string() })
            },
            "chat" => {
                let (product, rest) = rest.split_once(char::is_whitespace).unwrap_or((rest, ""));
                let (seller, name) = rest.trim().split_once(char::is_whitespace).unwrap_or((rest, ""));
                let product_id = word(product, "chat", "product id")?.to_string();
                let seller_id = UserId::new(word(seller, "chat", "seller id")?);

                // Listing title defaults to its id
                let name = name.trim();
                let product_name = if name.is_empty() { product_id.clone() } else { name.to_string() };
                Self::Notifier(NotifierEvent::StartChat { product_id, product_name, seller_id })
            },
            "click" => Self::Notifier(NotifierEvent::NotificationClicked { id: notification(rest, "click")? }),
            "dismiss" => Self::Notifier(NotifierEvent::NotificationDismissed { id: notification(rest, "dismiss")? }),
            "retry" => Self::Notifier(NotifierEvent::RetryNow),
            "quit" | "exit" => Self::Notifier(NotifierEvent::Teardown),
            other => return Err(CommandError::Unknown(other.to_string())),
        };

        Ok(command)
    }
}

fn word<'a>(input: &'a str, command: &'static str, argument: &'static str) -> Result<&'a str, CommandError> {
    let word = input.trim();
    if word.is_empty() {
        return Err(CommandError::MissingArgument { command, argument });
    }
    Ok(word)
}

fn notification(input: &str, command: &'static str) -> Result<NotificationId, CommandError> {
    let raw = word(input, command, "notification number")?;
    let raw = raw.strip_prefix('n').unwrap_or(raw);
    raw.parse().map(NotificationId).map_err(|_| CommandError::BadNotification(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_session_commands() {
        assert_eq!("login u-1".parse::<Command>(), Ok(Command::Login(UserId::new("u-1"))));
        assert_eq!("  logout ".parse::<Command>(), Ok(Command::Logout));
    }

    #[test]
    fn send_keeps_the_rest_of_the_line() {
        let command: Command = "send r-1 would you take   two books?".parse().unwrap();
        assert_eq!(
            command,
            Command::Notifier(NotifierEvent::SendMessage {
                room_id: RoomId::new("r-1"),
                text: "would you take   two books?".into(),
            })
        );
    }

    #[test]
    fn chat_takes_an_optional_listing_title() {
        assert_eq!(
            "chat p-1 u-2 Blue road bike".parse::<Command>(),
            Ok(Command::Notifier(NotifierEvent::StartChat {
                product_id: "p-1".into(),
                product_name: "Blue road bike".into(),
                seller_id: UserId::new("u-2"),
            }))
        );
        assert_eq!(
            "chat p-1 u-2".parse::<Command>(),
            Ok(Command::Notifier(NotifierEvent::StartChat {
                product_id: "p-1".into(),
                product_name: "p-1".into(),
                seller_id: UserId::new("u-2"),
            }))
        );
    }

    #[test]
    fn notification_numbers_accept_prefix() {
        assert_eq!(
            "click n3".parse::<Command>(),
            Ok(Command::Notifier(NotifierEvent::NotificationClicked { id: NotificationId(3) }))
        );
        assert_eq!("dismiss x".parse::<Command>(), Err(CommandError::BadNotification("x".into())));
    }

    #[test]
    fn errors_read_well() {
        insta::assert_snapshot!("chat p-1".parse::<Command>().unwrap_err(), @"chat: missing seller id");
        insta::assert_snapshot!("open".parse::<Command>().unwrap_err(), @"open: missing room id");
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert!(matches!("dance".parse::<Command>(), Err(CommandError::Unknown(_))));
    }
}
