//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! registry and loader produce:
//!     → logging.rs (structured log events per hook and phase)
//!     → metrics.rs (counters, phase duration histogram)
//! ```
//!
//! # Design Decisions
//! - Every registry and hook event carries the registry ID so plugin increments can be told apart
//! - Metrics are cheap and exporter-agnostic

pub mod logging;
pub mod metrics;
