//! Memoization core: argument values, signatures, cache keys and the
//! per-instance store.

mod args;
mod key;
mod signature;
mod slot;
mod store;
mod value;

pub use args::CallArgs;
pub use key::ArgKey;
pub use signature::{CallShape, Param, ParamKind, Signature};
pub use slot::CacheSlot;
pub use store::{
    normalize_shard_amount, Lookup, MemoStore, StatsSnapshot, DEFAULT_SHARD_AMOUNT,
    MAX_SHARD_AMOUNT, MIN_SHARD_AMOUNT,
};
pub use value::ArgValue;
