//! Slash command parsing for the chat application.
//!
//! This module handles parsing of special commands that start with `/`,
//! allowing users to control the chat session without sending messages
//! to the backend.

use crate::sidebar::SidebarTab;

/// A parsed chat command.
///
/// These commands control the chat session and are not sent to the backend.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatCommand {
    /// Clear the conversation history.
    Clear,

    /// Show the revealing reply in full.
    Skip,

    /// Set the base typing speed in milliseconds per character.
    Speed(u64),

    /// Set the delay before a reply starts, in milliseconds.
    Delay(u64),

    /// Set the punctuation pause factor.
    Pause(f64),

    /// Turn typing-speed variation on or off.
    Jitter(bool),

    /// Fetch analysis content for the sidebar.
    Generate,

    /// Show one sidebar tab, or all of them.
    Tab(Option<SidebarTab>),

    /// Set the auto-save transcript path.
    TranscriptPath(String),

    /// Clear the auto-save transcript path.
    ClearTranscriptPath,

    /// Save the transcript to a specific file immediately.
    SaveTranscript(String),

    /// Load conversation history from a file.
    LoadTranscript(String),

    /// Display help information.
    Help,

    /// Exit the chat application.
    Quit,

    /// Display session statistics.
    Stats,

    /// Show the current configuration.
    ShowConfig,

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
/// # use thinkchat::chat::parse_command;
/// assert!(parse_command("/quit").is_some());
/// assert!(parse_command("/speed 20").is_some());
/// assert!(parse_command("What is my market?").is_none());
/// ```
pub fn parse_command(input: &str) -> Option<ChatCommand> {
    let input = input.trim();
    let rest = input.strip_prefix('/')?;

    let mut parts = rest.splitn(2, ' ');
    let command = parts.next()?.to_lowercase();
    let argument = parts.next().map(|s| s.trim()).filter(|s| !s.is_empty());

    let result = match command.as_str() {
        "clear" => ChatCommand::Clear,
        "skip" => ChatCommand::Skip,
        "help" | "?" => ChatCommand::Help,
        "quit" | "exit" | "q" => ChatCommand::Quit,
        "stats" | "status" => ChatCommand::Stats,
        "config" => ChatCommand::ShowConfig,
        "generate" => ChatCommand::Generate,
        "speed" => parse_millis_command(argument, ChatCommand::Speed, "/speed"),
        "delay" => parse_millis_command(argument, ChatCommand::Delay, "/delay"),
        "pause" => match argument {
            Some(arg) => match arg.parse::<f64>() {
                Ok(value) if value.is_finite() && value >= 0.0 => ChatCommand::Pause(value),
                _ => ChatCommand::Invalid("/pause expects a non-negative factor".to_string()),
            },
            None => ChatCommand::Invalid("/pause requires a value".to_string()),
        },
        "jitter" => match argument.and_then(parse_on_off) {
            Some(value) => ChatCommand::Jitter(value),
            None => ChatCommand::Invalid("/jitter expects 'on' or 'off'".to_string()),
        },
        "tab" => match argument {
            Some(arg) => match arg.parse::<SidebarTab>() {
                Ok(tab) => ChatCommand::Tab(Some(tab)),
                Err(err) => ChatCommand::Invalid(format!("/tab: {err}")),
            },
            None => ChatCommand::Tab(None),
        },
        "transcript" => match argument {
            Some(arg) if arg.eq_ignore_ascii_case("clear") => ChatCommand::ClearTranscriptPath,
            Some(arg) => ChatCommand::TranscriptPath(arg.to_string()),
            None => ChatCommand::Invalid("/transcript requires a file path".to_string()),
        },
        "save" => match argument {
            Some(arg) => ChatCommand::SaveTranscript(arg.to_string()),
            None => ChatCommand::Invalid("/save requires a file path".to_string()),
        },
        "load" => match argument {
            Some(arg) => ChatCommand::LoadTranscript(arg.to_string()),
            None => ChatCommand::Invalid("/load requires a file path".to_string()),
        },
        _ => ChatCommand::Invalid(format!("Unknown command: /{}", command)),
    };

    Some(result)
}

fn parse_millis_command<F>(argument: Option<&str>, constructor: F, name: &str) -> ChatCommand
where
    F: Fn(u64) -> ChatCommand,
{
    match argument {
        Some(arg) => match arg.parse::<u64>() {
            Ok(value) => constructor(value),
            Err(_) => ChatCommand::Invalid(format!("{} expects milliseconds", name)),
        },
        None => ChatCommand::Invalid(format!("{} requires a value", name)),
    }
}

fn parse_on_off(value: &str) -> Option<bool> {
    match value.to_lowercase().as_str() {
        "on" | "true" | "yes" => Some(true),
        "off" | "false" | "no" => Some(false),
        _ => None,
    }
}

/// Returns help text describing available commands.
pub fn help_text() -> &'static str {
    r#"Available commands:
  /skip                  Show the current reply in full (also Ctrl+C)
  /clear                 Clear conversation history
  /speed <ms>            Set milliseconds per revealed character
  /delay <ms>            Set milliseconds before a reply starts
  /pause <factor>        Set the punctuation pause factor
  /jitter on|off         Vary the typing speed
  /generate              Fetch business analysis for the sidebar
  /tab [name]            Show business, market, swot, simulation or graphs
  /transcript <file>     Enable auto-saving transcripts (or 'clear')
  /save <file>           Save the current transcript immediately
  /load <file>           Load a transcript from disk
  /stats                 Show session statistics
  /config                Show current configuration
  /help                  Show this help message
  /quit                  Exit the chat"#
}
