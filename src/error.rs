//! Error types for memoized dispatch.
//!
//! Every failure is a synchronous validation error: nothing is retried and
//! no cache state is modified when an operation is rejected.

use thiserror::Error;

/// Errors raised by class registration, dispatch, preset and reset.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MemoError {
    #[error("Undefined method: {0}")]
    UnknownMethod(String),

    #[error("Cannot memoize {0}: methods taking a block parameter cannot be cached")]
    BlockParameter(String),

    #[error("Method {0} is not memoized")]
    NotMemoized(String),

    #[error("No value producer given to preset {0}")]
    MissingValue(String),

    #[error("Arguments given to reset without a method name")]
    ArgsWithoutMethod,

    #[error("Private method called: {0}")]
    PrivateMethod(String),

    #[error("Wrong number of arguments for {method}: given {given}, expected {expected}")]
    ArgumentCount {
        method: String,
        given: usize,
        expected: String,
    },

    #[error("Missing keyword for {method}: {keyword}")]
    MissingKeyword { method: String, keyword: String },

    #[error("Unknown keyword for {method}: {keyword}")]
    UnknownKeyword { method: String, keyword: String },

    #[error("Duplicate parameter {param} in signature of {method}")]
    DuplicateParameter { method: String, param: String },

    #[error("Method {method} failed: {message}")]
    Failed { method: String, message: String },
}

impl MemoError {
    /// Failure raised from inside a method body. Never cached.
    pub fn failed(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Failed {
            method: method.into(),
            message: message.into(),
        }
    }

    /// Returns true if the caller misused the memoization API itself
    /// (as opposed to passing bad arguments to a method).
    pub fn is_usage_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownMethod(_)
                | Self::BlockParameter(_)
                | Self::NotMemoized(_)
                | Self::MissingValue(_)
                | Self::ArgsWithoutMethod
                | Self::DuplicateParameter { .. }
        )
    }

    /// Returns true if the call arguments did not fit the method signature.
    pub fn is_argument_error(&self) -> bool {
        matches!(
            self,
            Self::ArgumentCount { .. } | Self::MissingKeyword { .. } | Self::UnknownKeyword { .. }
        )
    }
}
