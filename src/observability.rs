use biometrics::{Collector, Counter, Moments};

pub(crate) static CLIENT_REQUESTS: Counter = Counter::new("gemidoc.client.requests");
pub(crate) static CLIENT_REQUEST_ERRORS: Counter = Counter::new("gemidoc.client.request_errors");
pub(crate) static CLIENT_AUTH_EXPIRED: Counter = Counter::new("gemidoc.client.auth_expired");
pub(crate) static CLIENT_REQUEST_DURATION: Moments =
    Moments::new("gemidoc.client.request_duration_seconds");

pub(crate) static CHAT_SENDS: Counter = Counter::new("gemidoc.chat.sends");
pub(crate) static CHAT_SEND_ERRORS: Counter = Counter::new("gemidoc.chat.send_errors");
pub(crate) static CHAT_CREDIT_DENIALS: Counter = Counter::new("gemidoc.chat.credit_denials");
pub(crate) static CHAT_TURN_DURATION: Moments =
    Moments::new("gemidoc.chat.turn_duration_seconds");

pub(crate) static AUTH_LOGINS: Counter = Counter::new("gemidoc.auth.logins");
pub(crate) static AUTH_LOGOUTS: Counter = Counter::new("gemidoc.auth.logouts");

pub(crate) static PAYMENTS_VERIFIED: Counter = Counter::new("gemidoc.credits.payments_verified");
pub(crate) static PAYMENTS_CANCELLED: Counter = Counter::new("gemidoc.credits.payments_cancelled");

/// Register this crate's biometrics with the provided collector.
pub fn register_biometrics(collector: Collector) {
    collector.register_counter(&CLIENT_REQUESTS);
    collector.register_counter(&CLIENT_REQUEST_ERRORS);
    collector.register_counter(&CLIENT_AUTH_EXPIRED);
    collector.register_moments(&CLIENT_REQUEST_DURATION);

    collector.register_counter(&CHAT_SENDS);
    collector.register_counter(&CHAT_SEND_ERRORS);
    collector.register_counter(&CHAT_CREDIT_DENIALS);
    collector.register_moments(&CHAT_TURN_DURATION);

    collector.register_counter(&AUTH_LOGINS);
    collector.register_counter(&AUTH_LOGOUTS);

    collector.register_counter(&PAYMENTS_VERIFIED);
    collector.register_counter(&PAYMENTS_CANCELLED);
}
