//! Configuration types for the chat application.
//!
//! This module provides CLI argument parsing via `arrrg` and configuration
//! structures for controlling chat behavior.

use std::path::PathBuf;
use std::time::Duration;

use arrrg_derive::CommandLine;

use crate::reveal::RevealConfig;

/// Command-line arguments for the thinkchat tool.
#[derive(CommandLine, Debug, Default, Eq, PartialEq)]
pub struct ChatArgs {
    /// Base URL of the analysis backend.
    #[arrrg(
        optional,
        "Backend base URL (default: $THINKCHAT_API_URL or http://localhost:3001/api/)",
        "URL"
    )]
    pub api_url: Option<String>,

    /// Base delay between revealed characters.
    #[arrrg(optional, "Milliseconds per revealed character (default: 30)", "MS")]
    pub typing_speed_ms: Option<u64>,

    /// Delay before the first revealed character.
    #[arrrg(optional, "Milliseconds before a reply starts (default: 300)", "MS")]
    pub initial_delay_ms: Option<u64>,

    /// Factor applied to delays that reveal punctuation.
    #[arrrg(optional, "Punctuation pause factor (default: 2)", "FACTOR")]
    pub pause_multiplier: Option<String>,

    /// Reveal at a constant pace.
    #[arrrg(flag, "Disable random variation of the typing speed")]
    pub no_jitter: bool,

    /// Seed for the typing-speed variation.
    #[arrrg(optional, "Seed for reproducible typing jitter", "SEED")]
    pub seed: Option<u64>,

    /// Disable ANSI colors and styles.
    #[arrrg(flag, "Disable ANSI colors/styles")]
    pub no_color: bool,

    /// File to save the transcript to after every reply.
    #[arrrg(optional, "Auto-save the transcript to this file", "FILE")]
    pub transcript: Option<String>,

    /// File to append backend traffic to.
    #[arrrg(optional, "Log backend requests as JSON lines to this file", "FILE")]
    pub log_file: Option<String>,
}

/// Configuration for a chat session.
///
/// This struct holds the resolved configuration values after processing
/// command-line arguments with appropriate defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatConfig {
    /// Backend base URL; `None` defers to the environment and then the built-in default.
    pub api_url: Option<String>,

    /// Pacing of revealed replies.
    pub reveal: RevealConfig,

    /// Seed for the jitter source; `None` seeds from entropy.
    pub seed: Option<u64>,

    /// Whether to use ANSI colors and styles in output.
    pub use_color: bool,

    /// Path to persist transcripts automatically after each assistant turn.
    pub transcript_path: Option<PathBuf>,

    /// Path of the backend traffic log.
    pub log_path: Option<PathBuf>,
}

impl ChatConfig {
    /// Creates a new ChatConfig with default values.
    ///
    /// Defaults:
    /// - Backend: environment or built-in default
    /// - Reveal pacing: [`RevealConfig::new`]
    /// - Color: enabled
    /// - No auto-save, no traffic log
    pub fn new() -> Self {
        Self {
            api_url: None,
            reveal: RevealConfig::new(),
            seed: None,
            use_color: true,
            transcript_path: None,
            log_path: None,
        }
    }

    /// Sets the backend base URL.
    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    /// Sets the reveal pacing.
    pub fn with_reveal(mut self, reveal: RevealConfig) -> Self {
        self.reveal = reveal;
        self
    }

    /// Sets the jitter seed.
    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    /// Disables ANSI color output.
    pub fn without_color(mut self) -> Self {
        self.use_color = false;
        self
    }

    /// Sets the transcript auto-save path.
    pub fn with_transcript_path(mut self, path: Option<PathBuf>) -> Self {
        self.transcript_path = path;
        self
    }

    /// Sets the backend traffic log path.
    pub fn with_log_path(mut self, path: Option<PathBuf>) -> Self {
        self.log_path = path;
        self
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl From<ChatArgs> for ChatConfig {
    fn from(args: ChatArgs) -> Self {
        let mut reveal = RevealConfig::new();
        if let Some(ms) = args.typing_speed_ms {
            reveal = reveal.with_typing_speed(Duration::from_millis(ms));
        }
        if let Some(ms) = args.initial_delay_ms {
            reveal = reveal.with_initial_delay(Duration::from_millis(ms));
        }
        if let Some(factor) = args.pause_multiplier.as_deref().and_then(parse_factor) {
            reveal = reveal.with_punctuation_pause_multiplier(factor);
        }
        if args.no_jitter {
            reveal = reveal.with_randomize_speed(false);
        }

        ChatConfig {
            api_url: args.api_url,
            reveal,
            seed: args.seed,
            use_color: !args.no_color,
            transcript_path: args.transcript.map(PathBuf::from),
            log_path: args.log_file.map(PathBuf::from),
        }
    }
}

/// Parses a pause factor; only finite, non-negative values are accepted.
fn parse_factor(raw: &str) -> Option<f64> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|factor| factor.is_finite() && *factor >= 0.0)
}
