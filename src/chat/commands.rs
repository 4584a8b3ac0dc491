//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the backend.

use crate::types::ChatMode;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Start a fresh conversation.
    NewChat,

    /// Switch between general chat and diagnosis mode.
    Mode(ChatMode),

    /// Show the current credit balance.
    Balance,

    /// Sign in with email and password.
    Login,

    /// Create an account.
    Signup,

    /// Sign out and discard the stored credential.
    Logout,

    /// Show past chat sessions and credit transactions.
    History,

    /// Continue a past session by its number in the history listing.
    Restore(usize),

    /// Delete all past chat sessions.
    ClearHistory,

    /// List the credit packages on offer.
    Packages,

    /// Buy a credit package by its number in the listing.
    Buy(usize),

    /// Show subscription status.
    Subscription,

    /// Display session statistics (message count, mode, balance).
    Stats,

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Report a parsing error back to the caller.
    Invalid(String),
}

/// Parses user input for slash commands.
///
/// Returns `Some(ChatCommand)` if the input is a valid command,
/// or `None` if it should be treated as a regular message.
///
/// # Examples
///
/// ```
/// # use gemidoc::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/mode diagnosis").is_some());
/// assert!(parse_command("I have a headache").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();

    if !input.starts_with('/') {
        return None;
    }

    let mut parts = input[1..].splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "new" | "newchat" => ChatCommand::NewChat,
        "mode" => match argument {
            Some(arg) => match arg.parse::<ChatMode>() {
                Ok(mode) => ChatCommand::Mode(mode),
                Err(_) => {
                    ChatCommand::Invalid("/mode expects 'general' or 'diagnosis'".to_string())
                }
            },
            None => ChatCommand::Invalid("/mode expects 'general' or 'diagnosis'".to_string()),
        },
        "balance" | "credits" => ChatCommand::Balance,
        "login" => ChatCommand::Login,
        "signup" | "register" => ChatCommand::Signup,
        "logout" => ChatCommand::Logout,
        "history" => ChatCommand::History,
        "restore" | "continue" => parse_index_command(argument, ChatCommand::Restore, "/restore"),
        "clearhistory" => ChatCommand::ClearHistory,
        "packages" => ChatCommand::Packages,
        "buy" => parse_index_command(argument, ChatCommand::Buy, "/buy"),
        "subscription" => ChatCommand::Subscription,
        "stats" | "status" => ChatCommand::Stats,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        _ => ChatCommand::Invalid(format!("Unknown command: /{command}")),
    };

    Some(result)
}

/// Parses a 1-based listing number into a command.
fn parse_index_command(
    argument: Option<&str>,
    make: fn(usize) -> ChatCommand,
    name: &str,
) -> ChatCommand {
    match argument.map(|arg| arg.parse::<usize>()) {
        Some(Ok(n)) if n >= 1 => make(n - 1),
        Some(Ok(_)) => ChatCommand::Invalid(format!("{name} numbering starts at 1")),
        Some(Err(_)) => ChatCommand::Invalid(format!("{name} expects a listing number")),
        None => ChatCommand::Invalid(format!("{name} expects a listing number")),
    }
}

/// Returns the help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /new                 - Start a fresh conversation
  /mode <general|diagnosis> - Switch chat mode (diagnosis costs more credits)
  /balance             - Show your credit balance
  /login               - Sign in
  /signup              - Create an account
  /logout              - Sign out
  /history             - List past sessions and transactions
  /restore <n>         - Continue past session n
  /clearhistory        - Delete all past chat sessions
  /packages            - List credit packages
  /buy <n>             - Buy credit package n
  /subscription        - Show subscription status
  /stats               - Show session statistics
  /help, /?            - Show this help
  /quit, /exit, /q     - Exit the chat"#
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_not_a_command() {
        assert!(parse_command("I have a headache").is_none());
        assert!(parse_command("").is_none());
        assert!(parse_command("  hello  ").is_none());
    }

    #[test]
    fn parse_simple_commands() {
        assert_eq!(parse_command("/new"), Some(ChatCommand::NewChat));
        assert_eq!(parse_command("/balance"), Some(ChatCommand::Balance));
        assert_eq!(parse_command("/credits"), Some(ChatCommand::Balance));
        assert_eq!(parse_command("/logout"), Some(ChatCommand::Logout));
        assert_eq!(parse_command("/history"), Some(ChatCommand::History));
        assert_eq!(parse_command("/packages"), Some(ChatCommand::Packages));
        assert_eq!(parse_command("/quit"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/q"), Some(ChatCommand::Quit));
        assert_eq!(parse_command("/?"), Some(ChatCommand::Help));
    }

    #[test]
    fn parse_mode() {
        assert_eq!(
            parse_command("/mode diagnosis"),
            Some(ChatCommand::Mode(ChatMode::Diagnosis))
        );
        assert_eq!(
            parse_command("/mode general"),
            Some(ChatCommand::Mode(ChatMode::General))
        );
        assert!(matches!(
            parse_command("/mode surgery"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/mode"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn parse_indexed_commands() {
        assert_eq!(parse_command("/restore 1"), Some(ChatCommand::Restore(0)));
        assert_eq!(parse_command("/buy 3"), Some(ChatCommand::Buy(2)));
        assert!(matches!(
            parse_command("/restore 0"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/buy soon"),
            Some(ChatCommand::Invalid(_))
        ));
        assert!(matches!(
            parse_command("/buy"),
            Some(ChatCommand::Invalid(_))
        ));
    }

    #[test]
    fn commands_are_case_insensitive() {
        assert_eq!(parse_command("/NEW"), Some(ChatCommand::NewChat));
        assert_eq!(parse_command("/Quit"), Some(ChatCommand::Quit));
    }

    #[test]
    fn unknown_command_is_invalid() {
        assert!(matches!(
            parse_command("/frobnicate"),
            Some(ChatCommand::Invalid(_))
        ));
    }
}
