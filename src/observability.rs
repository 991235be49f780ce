use biometrics::{Collector, Counter, Moments};

pub(crate) static REVEALS_STARTED: Counter = Counter::new("thinkchat.reveal.started");
pub(crate) static REVEALS_COMPLETED: Counter = Counter::new("thinkchat.reveal.completed");
pub(crate) static REVEALS_CANCELLED: Counter = Counter::new("thinkchat.reveal.cancelled");
pub(crate) static REVEAL_SNAPSHOTS: Counter = Counter::new("thinkchat.reveal.snapshots");
pub(crate) static REVEAL_LENGTH: Moments = Moments::new("thinkchat.reveal.length_chars");

pub(crate) static SESSION_USER_TURNS: Counter = Counter::new("thinkchat.session.user_turns");
pub(crate) static SESSION_REPLIES_QUEUED: Counter = Counter::new("thinkchat.session.replies_queued");
pub(crate) static SESSION_REPLY_FAILURES: Counter =
    Counter::new("thinkchat.session.reply_failures");
pub(crate) static SESSION_STALE_CALLBACKS: Counter =
    Counter::new("thinkchat.session.stale_callbacks");

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("thinkchat.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("thinkchat.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("thinkchat.client.request_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&REVEALS_STARTED);
    collector.register_counter(&REVEALS_COMPLETED);
    collector.register_counter(&REVEALS_CANCELLED);
    collector.register_counter(&REVEAL_SNAPSHOTS);
    collector.register_moments(&REVEAL_LENGTH);

    collector.register_counter(&SESSION_USER_TURNS);
    collector.register_counter(&SESSION_REPLIES_QUEUED);
    collector.register_counter(&SESSION_REPLY_FAILURES);
    collector.register_counter(&SESSION_STALE_CALLBACKS);

    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);
}
