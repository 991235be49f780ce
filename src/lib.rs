//! A chat client for a business-analysis backend.
//!
//! Replies are revealed character by character with a typewriter effect.
//! The pieces, bottom up:
//!
//! - [`reveal`]: the timed reveal engine, a pure state machine driven by instants.
//! - [`transcript`]: the ordered list of chat turns and its file format.
//! - [`session`]: sequencing of user turns, replies and the active reveal.
//! - [`client`]: the HTTP backend and the traits the chat loop talks to.
//! - [`sidebar`]: text formatting of generated analysis content.
//! - [`chat`]: the interactive loop behind the `thinkchat` binary.

// Public modules
pub mod chat;
pub mod client;
pub mod client_logger;
pub mod error;
pub mod render;
pub mod reveal;
pub mod session;
pub mod sidebar;
pub mod transcript;
pub mod types;
pub mod utils;

mod observability;

// Re-exports
pub use client::{Backend, ContentSource, ReplySource};
pub use client_logger::{ClientLogger, JsonLinesLogger};
pub use error::{Error, Result};
pub use observability::register_biometrics;
pub use render::{PlainTextRenderer, Renderer, TranscriptView};
pub use reveal::{
    FixedJitter, Jitter, NoJitter, RandomJitter, RevealConfig, RevealEngine, RevealHandle,
    RevealId, RevealSink,
};
pub use session::{
    FALLBACK_REPLY, ReplyDisposition, SessionController, SessionState, SessionStats,
};
pub use sidebar::{GraphSeries, SidebarSections, SidebarTab, ThinkingNode};
pub use transcript::{Speaker, Transcript, Turn, TurnId};
pub use types::*;
