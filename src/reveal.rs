//! Timed character-by-character reveal of assistant replies.
//!
//! A reveal turns a complete string into a sequence of growing prefixes that
//! are delivered to a [`RevealSink`] over time.  The engine never sleeps: it
//! records the instant at which the next character is due in the
//! [`RevealHandle`], and the owner of the handle calls [`RevealEngine::tick`]
//! once that instant has passed.  This keeps every callback on the caller's
//! event loop and makes the pacing testable with a virtual clock.
//!
//! Cancelling a reveal clears the pending deadline first and then delivers the
//! full text followed by `on_done`, so a late tick can never overwrite the
//! completed text with a shorter prefix.

use std::time::Duration;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tokio::time::Instant;

use crate::observability::{
    REVEAL_LENGTH, REVEAL_SNAPSHOTS, REVEALS_CANCELLED, REVEALS_COMPLETED, REVEALS_STARTED,
};

/// Smallest jitter factor applied to the typing speed.
pub const JITTER_MIN: f64 = 0.7;

/// Largest jitter factor applied to the typing speed.
pub const JITTER_MAX: f64 = 1.3;

/// Characters that earn a longer pause.
pub const PAUSE_CHARACTERS: [char; 6] = ['.', '!', '?', ',', ';', ':'];

const DEFAULT_TYPING_SPEED: Duration = Duration::from_millis(30);
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(300);
const DEFAULT_PAUSE_MULTIPLIER: f64 = 2.0;

/// Pacing options for a reveal.
#[derive(Debug, Clone, PartialEq)]
pub struct RevealConfig {
    /// Base delay between two characters.
    pub typing_speed: Duration,

    /// Delay before the first character appears.
    pub initial_delay: Duration,

    /// Whether to scale each delay by a factor drawn from [`JITTER_MIN`, `JITTER_MAX`].
    pub randomize_speed: bool,

    /// Factor applied to the delay of an interval that reveals punctuation.
    pub punctuation_pause_multiplier: f64,
}

impl RevealConfig {
    /// Creates a RevealConfig with default values.
    ///
    /// Defaults:
    /// - Typing speed: 30ms
    /// - Initial delay: 300ms
    /// - Randomized speed: enabled
    /// - Punctuation pause multiplier: 2
    pub fn new() -> Self {
        Self {
            typing_speed: DEFAULT_TYPING_SPEED,
            initial_delay: DEFAULT_INITIAL_DELAY,
            randomize_speed: true,
            punctuation_pause_multiplier: DEFAULT_PAUSE_MULTIPLIER,
        }
    }

    /// Sets the base inter-character delay.
    pub fn with_typing_speed(mut self, typing_speed: Duration) -> Self {
        self.typing_speed = typing_speed;
        self
    }

    /// Sets the delay before the first character.
    pub fn with_initial_delay(mut self, initial_delay: Duration) -> Self {
        self.initial_delay = initial_delay;
        self
    }

    /// Enables or disables jitter.
    pub fn with_randomize_speed(mut self, randomize_speed: bool) -> Self {
        self.randomize_speed = randomize_speed;
        self
    }

    /// Sets the punctuation pause multiplier.
    pub fn with_punctuation_pause_multiplier(mut self, multiplier: f64) -> Self {
        self.punctuation_pause_multiplier = multiplier;
        self
    }

    fn pause_multiplier_for(&self, next: char) -> f64 {
        if !PAUSE_CHARACTERS.contains(&next) {
            return 1.0;
        }
        let multiplier = self.punctuation_pause_multiplier;
        if multiplier.is_finite() && multiplier >= 0.0 {
            multiplier
        } else {
            1.0
        }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self::new()
    }
}

///////////////////////////////////////////// Jitter ////////////////////////////////////////////

/// Source of the per-character speed factor.
pub trait Jitter {
    /// Returns a factor in [`JITTER_MIN`, `JITTER_MAX`].
    fn factor(&mut self) -> f64;
}

/// Uniformly random jitter.
#[derive(Debug, Clone)]
pub struct RandomJitter {
    rng: StdRng,
}

impl RandomJitter {
    /// Creates jitter seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates reproducible jitter from a seed.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomJitter {
    fn default() -> Self {
        Self::new()
    }
}

impl Jitter for RandomJitter {
    fn factor(&mut self) -> f64 {
        self.rng.gen_range(JITTER_MIN..=JITTER_MAX)
    }
}

/// Jitter that replays a fixed sequence of factors, wrapping around at the end.
#[derive(Debug, Clone, Default)]
pub struct FixedJitter {
    factors: Vec<f64>,
    next: usize,
}

impl FixedJitter {
    /// Creates jitter from a sequence.  Factors outside the legal range are clamped.
    pub fn new(factors: impl Into<Vec<f64>>) -> Self {
        Self {
            factors: factors.into(),
            next: 0,
        }
    }
}

impl Jitter for FixedJitter {
    fn factor(&mut self) -> f64 {
        if self.factors.is_empty() {
            return 1.0;
        }
        let factor = self.factors[self.next % self.factors.len()];
        self.next = self.next.wrapping_add(1);
        if factor.is_nan() {
            1.0
        } else {
            factor.clamp(JITTER_MIN, JITTER_MAX)
        }
    }
}

/// Jitter that never changes the speed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoJitter;

impl Jitter for NoJitter {
    fn factor(&mut self) -> f64 {
        1.0
    }
}

///////////////////////////////////////////// Reveal ////////////////////////////////////////////

/// Receiver of reveal progress.
///
/// For a single handle, `on_snapshot` is called with strictly longer prefixes
/// of the target and `on_done` is called exactly once, after the last snapshot.
pub trait RevealSink {
    /// Called with the text revealed so far.
    fn on_snapshot(&mut self, prefix: &str);

    /// Called once when the reveal is complete, whether by finishing or by cancellation.
    fn on_done(&mut self);
}

/// Identifies one reveal for the lifetime of an engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RevealId(u64);

impl RevealId {
    /// Returns the raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// State of one in-progress reveal.
///
/// The handle is inert on its own; it only advances when passed to
/// [`RevealEngine::tick`] or [`RevealEngine::cancel`].
#[derive(Debug)]
pub struct RevealHandle {
    id: RevealId,
    target: String,
    cursor: usize,
    deadline: Option<Instant>,
    cancelled: bool,
    finished: bool,
}

impl RevealHandle {
    /// Returns the id of this reveal.
    pub fn id(&self) -> RevealId {
        self.id
    }

    /// Returns the complete text being revealed.
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Returns the text revealed so far.
    pub fn revealed(&self) -> &str {
        &self.target[..self.cursor]
    }

    /// Returns the instant at which the next step is due, or `None` once finished.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns true once `on_done` has been delivered.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Returns true if the reveal was cut short by [`RevealEngine::cancel`].
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn next_char(&self) -> Option<char> {
        self.target[self.cursor..].chars().next()
    }
}

/// Schedules and advances reveals.
pub struct RevealEngine<J: Jitter = RandomJitter> {
    config: RevealConfig,
    jitter: J,
    next_id: u64,
}

impl RevealEngine<RandomJitter> {
    /// Creates an engine with random jitter.
    pub fn with_random_jitter(config: RevealConfig) -> Self {
        Self::new(config, RandomJitter::new())
    }
}

impl<J: Jitter> RevealEngine<J> {
    /// Creates an engine from a configuration and a jitter source.
    pub fn new(config: RevealConfig, jitter: J) -> Self {
        Self {
            config,
            jitter,
            next_id: 1,
        }
    }

    /// Returns the pacing configuration.
    pub fn config(&self) -> &RevealConfig {
        &self.config
    }

    /// Replaces the pacing configuration.  Reveals already scheduled keep their
    /// next deadline and pick up the new pacing from the following character.
    pub fn set_config(&mut self, config: RevealConfig) {
        self.config = config;
    }

    /// Starts revealing `text`; the first character is due `initial_delay` after `now`.
    pub fn reveal(&mut self, text: impl Into<String>, now: Instant) -> RevealHandle {
        let target = text.into();
        let id = RevealId(self.next_id);
        self.next_id += 1;
        REVEALS_STARTED.click();
        REVEAL_LENGTH.add(target.chars().count() as f64);
        RevealHandle {
            id,
            target,
            cursor: 0,
            deadline: Some(now + self.config.initial_delay),
            cancelled: false,
            finished: false,
        }
    }

    /// Delivers every step of `handle` that is due at `now`.
    ///
    /// Deadlines chain from the previous deadline rather than from `now`, so a
    /// late call catches up to where an on-time caller would be.  Returns the
    /// number of snapshots delivered.
    pub fn tick(
        &mut self,
        handle: &mut RevealHandle,
        now: Instant,
        sink: &mut dyn RevealSink,
    ) -> usize {
        let mut delivered = 0;
        while let Some(deadline) = handle.deadline {
            if deadline > now {
                break;
            }
            handle.deadline = None;
            if let Some(ch) = handle.next_char() {
                handle.cursor += ch.len_utf8();
                REVEAL_SNAPSHOTS.click();
                sink.on_snapshot(&handle.target[..handle.cursor]);
                delivered += 1;
            }
            match handle.next_char() {
                Some(next) => {
                    handle.deadline = Some(deadline + self.delay_before(next));
                }
                None => {
                    handle.finished = true;
                    REVEALS_COMPLETED.click();
                    sink.on_done();
                }
            }
        }
        delivered
    }

    /// Cuts `handle` short: clears the pending step, delivers the full text and
    /// then `on_done`.  Returns false, delivering nothing, if the reveal already
    /// finished.
    pub fn cancel(&self, handle: &mut RevealHandle, sink: &mut dyn RevealSink) -> bool {
        if handle.finished {
            return false;
        }
        handle.deadline = None;
        handle.cancelled = true;
        handle.cursor = handle.target.len();
        handle.finished = true;
        REVEALS_CANCELLED.click();
        sink.on_snapshot(&handle.target);
        sink.on_done();
        true
    }

    fn delay_before(&mut self, next: char) -> Duration {
        let jitter = if self.config.randomize_speed {
            self.jitter.factor()
        } else {
            1.0
        };
        let factor = jitter * self.config.pause_multiplier_for(next);
        let nanos = self.config.typing_speed.as_nanos() as f64 * factor;
        Duration::from_nanos(nanos.round() as u64)
    }
}
