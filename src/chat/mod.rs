//! Chat application module for conversations with the analysis backend.
//!
//! This module provides the interactive loop behind the `thinkchat` binary.
//! It supports:
//!
//! - Typewriter reveal of replies, skippable with Ctrl+C or `/skip`
//! - Replies that arrive mid-reveal wait their turn
//! - Slash commands for pacing, the analysis sidebar and transcripts
//!
//! # Architecture
//!
//! - [`config`]: CLI argument parsing and configuration
//! - [`session`]: the event loop that drives the session controller
//! - [`commands`]: Slash command parsing

mod commands;
mod config;
mod session;

pub use crate::render::{PlainTextRenderer, Renderer, TranscriptView};
pub use commands::{ChatCommand, help_text, parse_command};
pub use config::{ChatArgs, ChatConfig};
pub use session::{ChatSession, UserEvent};
