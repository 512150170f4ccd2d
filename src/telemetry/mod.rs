//! Telemetry: structured logging, call spans and metrics counters.

mod logging;
pub(crate) mod counters;
mod spans;

pub use logging::{build_filter, init_logging, LogConfig, LogError, LogFormat};
pub use counters::{
    describe_metrics, record_hit, record_miss, record_preset, record_reset, CACHE_HITS,
    CACHE_MISSES, PRESETS, RESETS,
};
pub use spans::{CallSpan, SpanExt};
