//! Special commands parser for interactive chat
//!
//! Commands are prefixed with `/` and are case-insensitive. Session ids
//! passed to `/open` keep their original case.

use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Start a fresh conversation
    NewChat,

    /// Resend the last message that failed to reach the backend
    Retry,

    /// Show the messages of the current conversation
    ShowHistory,

    /// List stored conversations
    ListSessions,

    /// Continue a stored conversation by id or unique id prefix
    OpenSession(String),

    /// Display help information
    Help,

    /// Exit the interactive session
    Exit,

    /// Not a special command; send the input as a chat message
    None,
}

/// Parse a user input string into a special command
///
/// # Errors
///
/// Returns [`CommandError`] if the input starts with `/` but is not a valid
/// command or has an invalid argument.
///
/// # Examples
///
/// ```
/// use nitro::commands::special_commands::{parse_special_command, SpecialCommand};
///
/// assert_eq!(parse_special_command("/retry").unwrap(), SpecialCommand::Retry);
/// assert_eq!(parse_special_command("hello").unwrap(), SpecialCommand::None);
/// assert!(parse_special_command("/foo").is_err());
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') && lower != "exit" && lower != "quit" {
        return Ok(SpecialCommand::None);
    }

    match lower.as_str() {
        "/new" | "/clear" => Ok(SpecialCommand::NewChat),
        "/retry" => Ok(SpecialCommand::Retry),
        "/history" => Ok(SpecialCommand::ShowHistory),
        "/sessions" => Ok(SpecialCommand::ListSessions),
        "/help" | "/?" => Ok(SpecialCommand::Help),

        "/open" => Err(CommandError::MissingArgument {
            command: "/open".to_string(),
            usage: "/open <session_id>".to_string(),
        }),
        input if input.starts_with("/open ") => {
            let id = trimmed.get(6..).unwrap_or_default().trim();
            if id.contains(char::is_whitespace) {
                Err(CommandError::UnsupportedArgument {
                    command: "/open".to_string(),
                    arg: id.to_string(),
                })
            } else {
                Ok(SpecialCommand::OpenSession(id.to_string()))
            }
        }

        "exit" | "quit" | "/exit" | "/quit" => Ok(SpecialCommand::Exit),

        input => {
            let cmd = input.split_whitespace().next().unwrap_or(input);
            Err(CommandError::UnknownCommand(cmd.to_string()))
        }
    }
}

/// Display help text for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

CONVERSATIONS:
  /new            - Start a new conversation
  /history        - Show messages of the current conversation
  /sessions       - List stored conversations
  /open <id>      - Continue a stored conversation (id prefix is enough)

DELIVERY:
  /retry          - Resend the last message that failed to send

OTHER:
  /help           - Show this help
  /exit, exit     - Leave the chat
"#
    );
}
