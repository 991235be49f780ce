//! Sequencing of user turns and revealed assistant replies.
//!
//! [`SessionController`] owns the transcript and at most one active reveal.
//! It is a plain state machine: every method takes the current instant and
//! returns without waiting, and the caller is expected to call
//! [`SessionController::tick`] once [`SessionController::next_deadline`] has
//! passed.  The interactive driver in `chat` does this from a single tokio
//! task, which is what keeps transcript mutations free of locking.
//!
//! Replies that arrive while a reveal is running wait in a FIFO queue.  New
//! user input drains the queue first: every pending reveal is cancelled, and
//! thereby fully shown and finalized, before the user turn is appended.

use std::collections::VecDeque;

use tokio::time::Instant;

use crate::error::{Error, Result};
use crate::observability::{
    SESSION_REPLIES_QUEUED, SESSION_REPLY_FAILURES, SESSION_STALE_CALLBACKS, SESSION_USER_TURNS,
};
use crate::reveal::{Jitter, RandomJitter, RevealConfig, RevealEngine, RevealHandle, RevealSink};
use crate::transcript::{Speaker, Transcript, Turn, TurnId};

/// Reply shown when the backend could not produce one.
pub const FALLBACK_REPLY: &str = "Sorry, an error occurred while processing your request.";

/// Whether a reveal is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No reveal is running.
    Idle,
    /// A reveal is filling the last assistant turn.
    Revealing,
}

/// What happened to a reply handed to [`SessionController::reply_arrived`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyDisposition {
    /// The reply started revealing into the given turn.
    Started(TurnId),
    /// The reply is waiting behind the active reveal; the value is the queue length.
    Queued(usize),
}

/// Aggregated counts for a session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionStats {
    /// Turns currently in the transcript.
    pub turns: usize,
    /// User turns currently in the transcript.
    pub user_turns: usize,
    /// Assistant turns currently in the transcript.
    pub assistant_turns: usize,
    /// Replies waiting to be revealed.
    pub queued_replies: usize,
    /// Reveals started over the life of the session.
    pub reveals_started: u64,
    /// Reveals that ran to the last character.
    pub reveals_completed: u64,
    /// Reveals cut short by input or a skip.
    pub reveals_cancelled: u64,
    /// Replies replaced by the fallback text.
    pub reply_failures: u64,
    /// Snapshot or finalize calls that hit an already-finalized turn.
    pub stale_callbacks: u64,
}

impl SessionStats {
    /// Reveals that have been finalized, by either path.
    pub fn reveals_finished(&self) -> u64 {
        self.reveals_completed + self.reveals_cancelled
    }
}

struct ActiveReveal {
    turn: TurnId,
    handle: RevealHandle,
}

/// Coordinates the transcript with the reveal engine.
pub struct SessionController<J: Jitter = RandomJitter> {
    transcript: Transcript,
    engine: RevealEngine<J>,
    active: Option<ActiveReveal>,
    queue: VecDeque<String>,
    stats: SessionStats,
}

impl SessionController<RandomJitter> {
    /// Creates a controller with random jitter.
    pub fn new(config: RevealConfig) -> Self {
        Self::with_jitter(config, RandomJitter::new())
    }
}

impl<J: Jitter> SessionController<J> {
    /// Creates a controller with the given jitter source.
    pub fn with_jitter(config: RevealConfig, jitter: J) -> Self {
        Self {
            transcript: Transcript::new(),
            engine: RevealEngine::new(config, jitter),
            active: None,
            queue: VecDeque::new(),
            stats: SessionStats::default(),
        }
    }

    /// Returns whether a reveal is in flight.
    pub fn state(&self) -> SessionState {
        if self.active.is_some() {
            SessionState::Revealing
        } else {
            SessionState::Idle
        }
    }

    /// Returns the transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Returns all turns in order.
    pub fn turns(&self) -> &[Turn] {
        self.transcript.turns()
    }

    /// Returns the number of replies waiting behind the active reveal.
    pub fn queued_replies(&self) -> usize {
        self.queue.len()
    }

    /// Returns the pacing configuration.
    pub fn config(&self) -> &RevealConfig {
        self.engine.config()
    }

    /// Replaces the pacing configuration.
    pub fn set_config(&mut self, config: RevealConfig) {
        self.engine.set_config(config);
    }

    /// Returns the instant at which [`Self::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.active.as_ref().and_then(|active| active.handle.deadline())
    }

    /// Returns session statistics.
    pub fn stats(&self) -> SessionStats {
        let mut stats = self.stats.clone();
        stats.turns = self.transcript.len();
        stats.user_turns = self.count_speaker(Speaker::User);
        stats.assistant_turns = self.count_speaker(Speaker::Assistant);
        stats.queued_replies = self.queue.len();
        stats
    }

    /// Records user input.
    ///
    /// Any reveal in flight, and every queued reply after it, is cancelled
    /// and finalized before the user turn is appended.
    pub fn submit_user_input(&mut self, text: &str, now: Instant) -> Result<TurnId> {
        if text.trim().is_empty() {
            return Err(Error::validation(
                "message must not be empty",
                Some("text".to_string()),
            ));
        }
        self.drain(now);
        let id = self.transcript.append_final(Speaker::User, text)?;
        SESSION_USER_TURNS.click();
        Ok(id)
    }

    /// Accepts a reply from the backend, revealing it now or queueing it.
    pub fn reply_arrived(
        &mut self,
        text: impl Into<String>,
        now: Instant,
    ) -> Result<ReplyDisposition> {
        let text = text.into();
        if self.active.is_some() || !self.queue.is_empty() {
            self.queue.push_back(text);
            SESSION_REPLIES_QUEUED.click();
            let queued = self.queue.len();
            if self.active.is_none() {
                self.start_next(now)?;
            }
            return Ok(ReplyDisposition::Queued(queued));
        }
        let turn = self.start_reveal(text, now)?;
        Ok(ReplyDisposition::Started(turn))
    }

    /// Substitutes [`FALLBACK_REPLY`] for a reply that failed.
    pub fn reply_failed(&mut self, now: Instant) -> Result<ReplyDisposition> {
        self.stats.reply_failures += 1;
        SESSION_REPLY_FAILURES.click();
        self.reply_arrived(FALLBACK_REPLY, now)
    }

    /// Routes a backend result through [`Self::reply_arrived`] or [`Self::reply_failed`].
    pub fn reply_result(
        &mut self,
        reply: Result<String>,
        now: Instant,
    ) -> Result<ReplyDisposition> {
        match reply {
            Ok(text) => self.reply_arrived(text, now),
            Err(_) => self.reply_failed(now),
        }
    }

    /// Shows the active reveal in full and finalizes it.
    ///
    /// The next queued reply, if any, starts revealing at `now`.  Returns
    /// false if nothing was revealing.
    pub fn cancel_active_reveal(&mut self, now: Instant) -> bool {
        let Some(mut active) = self.active.take() else {
            return false;
        };
        let mut sink = TurnSink::new(&mut self.transcript, &active);
        let cancelled = self.engine.cancel(&mut active.handle, &mut sink);
        self.stats.stale_callbacks += sink.stale;
        if cancelled {
            self.stats.reveals_cancelled += 1;
        }
        // The queued reply has no placeholder yet, so there is nothing to conflict with.
        let _ = self.start_next(now);
        true
    }

    /// Advances the active reveal to `now`.
    ///
    /// Returns the number of reveals finalized during the call.
    pub fn tick(&mut self, now: Instant) -> usize {
        let mut finalized = 0;
        while let Some(active) = self.active.as_mut() {
            let mut sink = TurnSink::new(&mut self.transcript, active);
            self.engine.tick(&mut active.handle, now, &mut sink);
            let done = sink.done;
            self.stats.stale_callbacks += sink.stale;
            if !done {
                break;
            }
            self.active = None;
            self.stats.reveals_completed += 1;
            finalized += 1;
            if self.start_next(now).is_err() {
                break;
            }
        }
        finalized
    }

    /// Cancels everything in flight and empties the transcript.
    pub fn clear(&mut self, now: Instant) -> Result<()> {
        self.drain(now);
        self.transcript.clear()
    }

    /// Cancels everything in flight and replaces the transcript.
    ///
    /// Ids issued afterwards stay above every id issued before.
    pub fn replace_transcript(&mut self, mut transcript: Transcript, now: Instant) {
        self.drain(now);
        transcript.continue_ids_from(&self.transcript);
        self.transcript = transcript;
    }

    fn drain(&mut self, now: Instant) {
        while self.cancel_active_reveal(now) {}
    }

    fn start_next(&mut self, now: Instant) -> Result<()> {
        if self.active.is_some() || self.queue.is_empty() {
            return Ok(());
        }
        // The reply leaves the queue only once its placeholder exists.
        let turn = self.transcript.append_placeholder(Speaker::Assistant)?;
        if let Some(text) = self.queue.pop_front() {
            self.begin_reveal(turn, text, now);
        }
        Ok(())
    }

    fn start_reveal(&mut self, text: String, now: Instant) -> Result<TurnId> {
        let turn = self.transcript.append_placeholder(Speaker::Assistant)?;
        self.begin_reveal(turn, text, now);
        Ok(turn)
    }

    fn begin_reveal(&mut self, turn: TurnId, text: String, now: Instant) {
        let handle = self.engine.reveal(text, now);
        self.active = Some(ActiveReveal { turn, handle });
        self.stats.reveals_started += 1;
    }

    fn count_speaker(&self, speaker: Speaker) -> usize {
        self.transcript
            .turns()
            .iter()
            .filter(|turn| turn.speaker == speaker)
            .count()
    }
}

/// Writes reveal progress into one transcript turn.
struct TurnSink<'a> {
    transcript: &'a mut Transcript,
    turn: TurnId,
    latest: String,
    done: bool,
    stale: u64,
}

impl<'a> TurnSink<'a> {
    fn new(transcript: &'a mut Transcript, active: &ActiveReveal) -> Self {
        Self {
            transcript,
            turn: active.turn,
            latest: active.handle.revealed().to_string(),
            done: false,
            stale: 0,
        }
    }

    fn discard(&mut self, err: Error) {
        debug_assert!(err.is_not_found(), "unexpected transcript error: {err}");
        SESSION_STALE_CALLBACKS.click();
        self.stale += 1;
    }
}

impl RevealSink for TurnSink<'_> {
    fn on_snapshot(&mut self, prefix: &str) {
        self.latest.clear();
        self.latest.push_str(prefix);
        if let Err(err) = self.transcript.update_revealing(self.turn, prefix) {
            self.discard(err);
        }
    }

    fn on_done(&mut self) {
        self.done = true;
        if let Err(err) = self.transcript.finalize_revealing(self.turn, &self.latest) {
            self.discard(err);
        }
    }
}
