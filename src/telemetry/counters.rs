//! Counters exported through the `metrics` facade.
//!
//! Nothing is recorded unless the host application installs a recorder.

use metrics::{counter, describe_counter};

pub const CACHE_HITS: &str = "memo_cache_hits_total";
pub const CACHE_MISSES: &str = "memo_cache_misses_total";
pub const PRESETS: &str = "memo_presets_total";
pub const RESETS: &str = "memo_resets_total";

/// Register descriptions for all counters. Safe to call more than once.
pub fn describe_metrics() {
    describe_counter!(CACHE_HITS, "Memoized calls answered from the cache");
    describe_counter!(CACHE_MISSES, "Memoized calls that ran the method body");
    describe_counter!(PRESETS, "Cache entries written by preset");
    describe_counter!(
        RESETS,
        "Reset operations, labelled by scope and, when one is targeted, method"
    );
}

pub fn record_hit(method: &str) {
    counter!(CACHE_HITS, "method" => method.to_string()).increment(1);
}

pub fn record_miss(method: &str) {
    counter!(CACHE_MISSES, "method" => method.to_string()).increment(1);
}

pub fn record_preset(method: &str) {
    counter!(PRESETS, "method" => method.to_string()).increment(1);
}

/// `scope` is one of `all`, `method`, `entry`. Whole-store resets carry no
/// method label.
pub fn record_reset(scope: &'static str, method: Option<&str>) {
    match method {
        Some(method) => {
            counter!(RESETS, "scope" => scope, "method" => method.to_string()).increment(1)
        }
        None => counter!(RESETS, "scope" => scope).increment(1),
    }
}
