//! memo-core
//!
//! Per-instance memoization: declare a method memoized and each distinct
//! argument list is computed at most once per object. Cached results can be
//! inspected, preset without running the method, or reset per entry, per
//! method, or wholesale.
//!
//! # Model
//!
//! - **Class**: a shared method table. Each method has a [`Signature`], a
//!   visibility and a body. [`Class::memoize`] turns caching on for a method.
//! - **Instance**: state plus a private [`MemoStore`]. Calls go through
//!   [`Instance::call`]; cached methods consult the store first.
//! - **ArgKey**: the canonical key derived from a call's arguments according
//!   to the method's [`CallShape`].
//!
//! # Example
//!
//! ```
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! use memo_core::{CallArgs, Class, ResetTarget, Signature};
//!
//! let runs = Arc::new(AtomicUsize::new(0));
//! let counter = Arc::clone(&runs);
//!
//! let class: Class<(), i64> = Class::new("Math");
//! class
//!     .define("square", Signature::new().required("n"), move |_, args| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         let n = args.int(0).unwrap_or_default();
//!         Ok(n * n)
//!     })
//!     .unwrap();
//! class.memoize("square").unwrap();
//!
//! let math = class.instantiate(());
//! assert_eq!(math.call("square", CallArgs::positional([2i64])).unwrap(), 4);
//! assert_eq!(math.call("square", CallArgs::positional([2i64])).unwrap(), 4);
//! assert_eq!(runs.load(Ordering::SeqCst), 1);
//!
//! math.reset(ResetTarget::Entry("square", CallArgs::positional([2i64]))).unwrap();
//! assert_eq!(math.call("square", CallArgs::positional([2i64])).unwrap(), 4);
//! assert_eq!(runs.load(Ordering::SeqCst), 2);
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod memo;
pub mod object;
pub mod telemetry;

pub use config::{EnvConfig, MemoConfig};
pub use error::MemoError;
pub use memo::{ArgKey, ArgValue, CallArgs, CallShape, MemoStore, Signature, StatsSnapshot};
pub use object::{Class, Instance, ResetTarget, Visibility};
