//! Hook metrics.
//!
//! # Metrics
//! - `lifecycle_hooks_registered_total` (counter): registrations by phase
//! - `lifecycle_hook_invocations_total` (counter): callbacks run by phase
//! - `lifecycle_hook_failures_total` (counter): failed callbacks by phase
//! - `lifecycle_phase_duration_seconds` (histogram): pass duration by phase
//!
//! Recording goes through the `metrics` facade; without an installed
//! recorder every call is a no-op.

use std::time::Duration;

use crate::registry::Phase;

pub fn record_registration(phase: Phase) {
    ::metrics::counter!("lifecycle_hooks_registered_total", "phase" => phase.as_str()).increment(1);
}

pub fn record_invocation(phase: Phase) {
    ::metrics::counter!("lifecycle_hook_invocations_total", "phase" => phase.as_str()).increment(1);
}

pub fn record_failure(phase: Phase) {
    ::metrics::counter!("lifecycle_hook_failures_total", "phase" => phase.as_str()).increment(1);
}

pub fn record_phase_duration(phase: Phase, elapsed: Duration) {
    ::metrics::histogram!("lifecycle_phase_duration_seconds", "phase" => phase.as_str())
        .record(elapsed.as_secs_f64());
}
