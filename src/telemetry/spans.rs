//! Span helpers for memoized dispatch.

use tracing::{debug_span, Span};
use uuid::Uuid;

/// Extension trait for recording an operation's result on a span.
pub trait SpanExt {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display;
}

impl SpanExt for Span {
    fn record_result<T, E>(&self, result: &Result<T, E>)
    where
        E: std::fmt::Display,
    {
        match result {
            Ok(_) => {
                self.record("status", "ok");
            }
            Err(e) => {
                self.record("status", "error");
                self.record("error.message", e.to_string().as_str());
            }
        }
    }
}

/// Factory for method call spans.
pub struct CallSpan;

impl CallSpan {
    /// Span for one method call on one instance.
    ///
    /// `outcome` (`hit`, `miss`, `uncached`) and `key` are filled in during
    /// dispatch; `status` and `error.message` by [`SpanExt::record_result`].
    pub fn new(instance_id: &Uuid, class: &str, method: &str) -> Span {
        debug_span!(
            "memo_call",
            instance_id = %instance_id,
            class = %class,
            method = %method,
            key = tracing::field::Empty,
            outcome = tracing::field::Empty,
            status = tracing::field::Empty,
            error.message = tracing::field::Empty,
        )
    }
}
