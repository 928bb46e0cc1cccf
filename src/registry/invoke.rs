//! Running a single hook callback.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use uuid::Uuid;

use super::entry::{HookEntry, HookStatus};
use super::report::HookFailure;
use crate::observability::metrics;

/// Call the entry's callback and update its status.
///
/// The callback is consumed; a second call reports a failure instead of
/// running anything.
pub(crate) fn invoke(
    entry: &mut HookEntry,
    registry: Uuid,
    catch_panics: bool,
) -> Result<(), HookFailure> {
    let Some(callback) = entry.callback.take() else {
        entry.status = HookStatus::Failed;
        return Err(HookFailure::from_entry(entry, "callback already consumed".to_string()));
    };

    entry.status = HookStatus::Running;
    metrics::record_invocation(entry.phase);
    tracing::debug!(
        registry = %registry,
        hook = %entry.name,
        seq = entry.handle.sequence(),
        phase = %entry.phase,
        "Invoking hook"
    );

    let outcome = if catch_panics {
        match panic::catch_unwind(AssertUnwindSafe(callback)) {
            Ok(result) => result.map_err(|e| e.to_string()),
            Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
    } else {
        callback().map_err(|e| e.to_string())
    };

    match outcome {
        Ok(()) => {
            entry.status = HookStatus::Completed;
            Ok(())
        }
        Err(message) => {
            entry.status = HookStatus::Failed;
            metrics::record_failure(entry.phase);
            tracing::warn!(
                registry = %registry,
                hook = %entry.name,
                seq = entry.handle.sequence(),
                phase = %entry.phase,
                error = %message,
                "Hook failed"
            );
            Err(HookFailure::from_entry(entry, message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic payload"
    }
}
