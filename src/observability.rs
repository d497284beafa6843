use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("blunder.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("blunder.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("blunder.client.request_duration_seconds");

pub(crate) static STREAM_EVENTS: Counter = Counter::new("blunder.stream.events");
pub(crate) static STREAM_ERRORS: Counter = Counter::new("blunder.stream.errors");
pub(crate) static STREAM_BYTES: Counter = Counter::new("blunder.stream.bytes");

pub(crate) static DRIVER_CHUNKS: Counter = Counter::new("blunder.driver.chunks");
pub(crate) static DRIVER_TTFC: Moments = Moments::new("blunder.driver.time_to_first_chunk_seconds");
pub(crate) static DRIVER_DURATION: Moments = Moments::new("blunder.driver.duration_seconds");

pub(crate) static SESSION_TURNS: Counter = Counter::new("blunder.session.turns");
pub(crate) static SESSION_TURN_FAILURES: Counter = Counter::new("blunder.session.turn_failures");
pub(crate) static SESSION_REJECTED: Counter = Counter::new("blunder.session.rejected");
pub(crate) static SESSION_CLEARS: Counter = Counter::new("blunder.session.clears");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&STREAM_EVENTS);
    collector.register_counter(&STREAM_ERRORS);
    collector.register_counter(&STREAM_BYTES);

    collector.register_counter(&DRIVER_CHUNKS);
    collector.register_moments(&DRIVER_TTFC);
    collector.register_moments(&DRIVER_DURATION);

    collector.register_counter(&SESSION_TURNS);
    collector.register_counter(&SESSION_TURN_FAILURES);
    collector.register_counter(&SESSION_REJECTED);
    collector.register_counter(&SESSION_CLEARS);
}
