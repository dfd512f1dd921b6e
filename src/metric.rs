use opentelemetry::{KeyValue, metrics::UpDownCounter};
use std::sync::LazyLock;

static STATDS: LazyLock<UpDownCounter<i64>> = LazyLock::new(|| {
    logfire::i64_up_down_counter("policy_relay_statds")
        .with_description("Policy relay webhook statistics")
        .with_unit("event")
        .build()
});

fn incr_statds(metric: String, value: String) {
    STATDS.add(1, &[KeyValue::new(metric, value)]);
}

pub fn incr_relay_outcome_statds(outcome: &str) {
    incr_statds("relay_outcome".to_string(), outcome.into())
}

pub fn incr_handshake_statds(result: &str) {
    incr_statds("handshake".to_string(), result.into())
}

pub fn incr_completion_statds(result: &str) {
    incr_statds("completion".to_string(), result.into())
}
