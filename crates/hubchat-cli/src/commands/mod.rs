//! Slash commands for interactive mode

mod session;

pub use session::SessionCommand;

use hubchat_ai::Assistant;
use hubchat_relay::ChatRelay;

/// Result of executing a slash command
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Show a message to the user (not sent to the assistant)
    Message(String),
    /// Exit the application
    Exit,
    /// Unknown command
    Unknown(String),
}

/// Parse and execute a slash command.
///
/// Returns `None` when `input` is not a command and should be sent as a
/// question instead.
pub fn execute_command(
    input: &str,
    relay: &ChatRelay,
    assistant: &Assistant,
) -> Option<CommandResult> {
    let command = input.trim().strip_prefix('/')?;
    let command = command
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_lowercase();

    Some(match command.as_str() {
        "help" | "h" | "?" => CommandResult::Message(help_message()),

        "session" | "s" => SessionCommand::execute(relay, assistant),

        "quit" | "exit" | "q" => CommandResult::Exit,

        _ => CommandResult::Unknown(command),
    })
}

fn help_message() -> String {
    r#"Available commands:
  /help, /h, /?        Show this help message
  /session, /s         Show conversation and assistant info
  /quit, /exit, /q     Exit hubchat

Anything else is sent to the assistant as a question."#
        .to_string()
}
