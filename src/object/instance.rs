//! Objects with a private memo store.

use std::fmt;

use tracing::{debug, warn};
use uuid::Uuid;

use super::class::{Class, MethodDef, Visibility};
use crate::config::MemoConfig;
use crate::error::MemoError;
use crate::memo::{ArgKey, CallArgs, Lookup, MemoStore, StatsSnapshot};
use crate::telemetry::{self, CallSpan, SpanExt};

/// What a reset clears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetTarget<'a> {
    /// Every entry of every method.
    All,
    /// Every entry of one method.
    Method(&'a str),
    /// The entry of one method for one argument list.
    Entry(&'a str, CallArgs),
}

/// An object of a [`Class`] owning state `S` and caching results `V`.
///
/// The memo store is created with the instance and dropped with it. Two
/// instances never share cache entries.
pub struct Instance<S, V> {
    id: Uuid,
    class: Class<S, V>,
    state: S,
    store: MemoStore<V>,
    config: MemoConfig,
}

impl<S, V> fmt::Debug for Instance<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("id", &self.id)
            .field("class", &self.class.name())
            .finish_non_exhaustive()
    }
}

impl<S, V: Clone> Instance<S, V> {
    pub fn new(class: Class<S, V>, state: S) -> Self {
        Self::with_config(class, state, MemoConfig::default())
    }

    pub fn with_config(class: Class<S, V>, state: S, config: MemoConfig) -> Self {
        let config = config.normalized();
        Self {
            id: Uuid::new_v4(),
            store: MemoStore::with_capacity_and_shards(
                config.initial_capacity,
                config.shard_amount,
            ),
            class,
            state,
            config,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn class(&self) -> &Class<S, V> {
        &self.class
    }

    pub fn state(&self) -> &S {
        &self.state
    }

    /// Mutable access to the state. Cached results are left untouched; reset
    /// them explicitly if they depend on what was changed.
    pub fn state_mut(&mut self) -> &mut S {
        &mut self.state
    }

    pub fn config(&self) -> &MemoConfig {
        &self.config
    }

    /// Invoke a public method. Memoized methods return their cached result
    /// when one exists for these arguments.
    pub fn call(&self, name: &str, args: CallArgs) -> Result<V, MemoError> {
        let def = self.resolve(name)?;
        if def.visibility == Visibility::Private {
            warn!(instance_id = %self.id, method = name, "private method called");
            return Err(MemoError::PrivateMethod(name.to_string()));
        }
        self.dispatch(name, &def, args)
    }

    /// Invoke a method regardless of visibility.
    pub fn send(&self, name: &str, args: CallArgs) -> Result<V, MemoError> {
        let def = self.resolve(name)?;
        self.dispatch(name, &def, args)
    }

    fn resolve(&self, name: &str) -> Result<MethodDef<S, V>, MemoError> {
        self.class
            .method(name)
            .ok_or_else(|| MemoError::UnknownMethod(name.to_string()))
    }

    fn dispatch(&self, name: &str, def: &MethodDef<S, V>, args: CallArgs) -> Result<V, MemoError> {
        let span = CallSpan::new(&self.id, self.class.name(), name);
        let _enter = span.enter();

        let result = self.dispatch_inner(name, def, args, &span);
        span.record_result(&result);
        result
    }

    fn dispatch_inner(
        &self,
        name: &str,
        def: &MethodDef<S, V>,
        args: CallArgs,
        span: &tracing::Span,
    ) -> Result<V, MemoError> {
        def.signature.check_args(name, &args)?;

        if !def.memoized {
            span.record("outcome", "uncached");
            return (def.body)(self, &args);
        }

        let key = ArgKey::derive(&def.signature, &args);
        let key_field = self.key_field(key.as_ref());
        span.record("key", key_field.as_str());

        match self.store.lookup(name, key.as_ref()) {
            Lookup::Hit(value) => {
                span.record("outcome", "hit");
                debug!(method = name, key = %key_field, "memo hit");
                if self.config.record_metrics {
                    telemetry::record_hit(name);
                }
                Ok(value)
            }
            Lookup::Miss => {
                span.record("outcome", "miss");
                debug!(method = name, key = %key_field, "memo miss, computing");
                if self.config.record_metrics {
                    telemetry::record_miss(name);
                }
                let value = (def.body)(self, &args)?;
                Ok(self.store.insert_if_absent(name, key, value))
            }
        }
    }

    fn key_field(&self, key: Option<&ArgKey>) -> String {
        match key {
            None => "()".to_string(),
            Some(key) if self.config.trace_keys => key.to_string(),
            Some(key) => key.fingerprint(),
        }
    }

    fn memoized(&self, name: &str) -> Result<MethodDef<S, V>, MemoError> {
        match self.class.method(name) {
            Some(def) if def.memoized => Ok(def),
            _ => {
                warn!(instance_id = %self.id, method = name, "method is not memoized");
                Err(MemoError::NotMemoized(name.to_string()))
            }
        }
    }

    /// Store `producer()` as the cached result for `args`, without running
    /// the method. Arguments are not checked against the signature.
    pub fn preset<F>(&self, name: &str, args: CallArgs, producer: F) -> Result<(), MemoError>
    where
        F: FnOnce() -> V,
    {
        let def = self.memoized(name)?;
        let key = ArgKey::derive(&def.signature, &args);
        debug!(
            instance_id = %self.id,
            method = name,
            key = %self.key_field(key.as_ref()),
            "memo preset"
        );
        self.store.preset(name, key, producer());
        if self.config.record_metrics {
            telemetry::record_preset(name);
        }
        Ok(())
    }

    /// [`preset`](Self::preset) for callers that may not have a producer.
    pub fn try_preset<F>(
        &self,
        name: &str,
        args: CallArgs,
        producer: Option<F>,
    ) -> Result<(), MemoError>
    where
        F: FnOnce() -> V,
    {
        match producer {
            Some(producer) => self.preset(name, args, producer),
            None => Err(MemoError::MissingValue(name.to_string())),
        }
    }

    /// Clear cached results. Returns the number of entries removed.
    pub fn reset(&self, target: ResetTarget<'_>) -> Result<usize, MemoError> {
        let (scope, method, removed) = match target {
            ResetTarget::All => ("all", None, self.store.reset_all()),
            ResetTarget::Method(name) => {
                self.memoized(name)?;
                ("method", Some(name), self.store.reset_method(name))
            }
            ResetTarget::Entry(name, args) => {
                let def = self.memoized(name)?;
                let key = ArgKey::derive(&def.signature, &args);
                let removed = usize::from(self.store.reset_entry(name, key.as_ref()));
                ("entry", Some(name), removed)
            }
        };
        debug!(instance_id = %self.id, scope, method, removed, "memo reset");
        if self.config.record_metrics {
            telemetry::record_reset(scope, method);
        }
        Ok(removed)
    }

    /// Reset selected by which inputs are present: no method clears
    /// everything, a method alone clears that method, a method with
    /// arguments clears one entry.
    pub fn reset_memo(&self, method: Option<&str>, args: CallArgs) -> Result<usize, MemoError> {
        match method {
            None if !args.is_empty() => {
                warn!(instance_id = %self.id, "reset: arguments given without a method");
                Err(MemoError::ArgsWithoutMethod)
            }
            None => self.reset(ResetTarget::All),
            Some(name) if args.is_empty() => self.reset(ResetTarget::Method(name)),
            Some(name) => self.reset(ResetTarget::Entry(name, args)),
        }
    }

    /// Whether a result is cached for these arguments.
    pub fn is_cached(&self, name: &str, args: &CallArgs) -> bool {
        match self.class.method(name) {
            Some(def) if def.memoized => {
                let key = ArgKey::derive(&def.signature, args);
                self.store.contains(name, key.as_ref())
            }
            _ => false,
        }
    }

    /// The cached result for these arguments, without computing anything.
    pub fn cached(&self, name: &str, args: &CallArgs) -> Option<V> {
        let def = self.class.method(name).filter(|def| def.memoized)?;
        let key = ArgKey::derive(&def.signature, args);
        self.store.get(name, key.as_ref())
    }

    /// Number of cached entries across all methods.
    pub fn cached_len(&self) -> usize {
        self.store.len()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.store.stats()
    }

    /// Whether the cache map has been created. It is created by the first
    /// cached result or preset.
    pub fn has_cache_storage(&self) -> bool {
        self.store.is_allocated()
    }

    /// Shard count of this instance's cache map.
    pub fn cache_shards(&self) -> usize {
        self.store.shard_amount()
    }
}

impl<S: Clone, V: Clone> Instance<S, V> {
    /// Copy of this instance with a fresh id and an independent copy of the
    /// cached results.
    pub fn duplicate(&self) -> Self {
        Self {
            id: Uuid::new_v4(),
            class: self.class.clone(),
            state: self.state.clone(),
            store: self.store.clone(),
            config: self.config,
        }
    }
}
