//! Classes and instances: the wiring that routes method calls through a
//! per-instance memo store.

mod class;
mod instance;

pub use class::{Class, MethodBody, Visibility};
pub use instance::{Instance, ResetTarget};
