use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("nyaai.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("nyaai.client.request_errors");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("nyaai.client.request_duration_seconds");

pub(crate) static SESSION_SUBMISSIONS: Counter = Counter::new("nyaai.session.submissions");
pub(crate) static SESSION_REJECTED: Counter = Counter::new("nyaai.session.rejected");
pub(crate) static SESSION_DISCARDED: Counter = Counter::new("nyaai.session.discarded");

pub(crate) static TYPEWRITER_REVEALS: Counter = Counter::new("nyaai.typewriter.reveals");
pub(crate) static TYPEWRITER_CANCELLED: Counter = Counter::new("nyaai.typewriter.cancelled");

pub(crate) static PROXY_FORWARDS: Counter = Counter::new("nyaai.proxy.forwards");
pub(crate) static PROXY_UPSTREAM_ERRORS: Counter = Counter::new("nyaai.proxy.upstream_errors");
pub(crate) static PROXY_FORWARD_DURATION: Moments =
    Moments::new("nyaai.proxy.forward_duration_seconds");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&SESSION_SUBMISSIONS);
    collector.register_counter(&SESSION_REJECTED);
    collector.register_counter(&SESSION_DISCARDED);

    collector.register_counter(&TYPEWRITER_REVEALS);
    collector.register_counter(&TYPEWRITER_CANCELLED);

    collector.register_counter(&PROXY_FORWARDS);
    collector.register_counter(&PROXY_UPSTREAM_ERRORS);
    collector.register_moments(&PROXY_FORWARD_DURATION);
}
