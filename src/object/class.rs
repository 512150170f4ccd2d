//! Method tables.
//!
//! A `Class` maps method names to a signature, a visibility and a callable
//! body. Declaring a method memoized flips a flag on its entry; dispatch in
//! `Instance` then routes the call through the instance's memo store.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, warn};

use super::instance::Instance;
use crate::config::MemoConfig;
use crate::error::MemoError;
use crate::memo::{CallArgs, CallShape, Signature};

/// Callable body of a method. Receives the instance it was called on, so a
/// body can dispatch further calls (including recursive ones) through it.
pub type MethodBody<S, V> =
    Arc<dyn Fn(&Instance<S, V>, &CallArgs) -> Result<V, MemoError> + Send + Sync>;

/// Method visibility.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Visibility {
    #[default]
    Public,
    /// Only reachable through `Instance::send`.
    Private,
}

/// A defined method.
pub(crate) struct MethodDef<S, V> {
    pub(crate) signature: Signature,
    pub(crate) visibility: Visibility,
    pub(crate) body: MethodBody<S, V>,
    pub(crate) memoized: bool,
}

impl<S, V> Clone for MethodDef<S, V> {
    fn clone(&self) -> Self {
        Self {
            signature: self.signature.clone(),
            visibility: self.visibility,
            body: Arc::clone(&self.body),
            memoized: self.memoized,
        }
    }
}

struct ClassInner<S, V> {
    name: String,
    methods: RwLock<HashMap<String, MethodDef<S, V>>>,
}

/// Shared handle to a method table.
///
/// Cloning the handle shares the table: methods defined or memoized later
/// are visible to every instance already created from it.
pub struct Class<S, V> {
    inner: Arc<ClassInner<S, V>>,
}

impl<S, V> Clone for Class<S, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, V> fmt::Debug for Class<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.inner.name)
            .field("methods", &self.method_names())
            .finish()
    }
}

impl<S, V> Class<S, V> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ClassInner {
                name: name.into(),
                methods: RwLock::new(HashMap::new()),
            }),
        }
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Define (or redefine) a public method.
    ///
    /// Redefining a memoized method replaces it with a plain one; call
    /// [`memoize`](Self::memoize) again to cache the new body.
    pub fn define<F>(&self, name: &str, signature: Signature, body: F) -> Result<(), MemoError>
    where
        F: Fn(&Instance<S, V>, &CallArgs) -> Result<V, MemoError> + Send + Sync + 'static,
    {
        self.define_with(name, signature, Visibility::Public, body)
    }

    /// Define a method reachable only through `Instance::send`.
    pub fn define_private<F>(
        &self,
        name: &str,
        signature: Signature,
        body: F,
    ) -> Result<(), MemoError>
    where
        F: Fn(&Instance<S, V>, &CallArgs) -> Result<V, MemoError> + Send + Sync + 'static,
    {
        self.define_with(name, signature, Visibility::Private, body)
    }

    pub fn define_with<F>(
        &self,
        name: &str,
        signature: Signature,
        visibility: Visibility,
        body: F,
    ) -> Result<(), MemoError>
    where
        F: Fn(&Instance<S, V>, &CallArgs) -> Result<V, MemoError> + Send + Sync + 'static,
    {
        signature.validate(name)?;
        let def = MethodDef {
            signature,
            visibility,
            body: Arc::new(body),
            memoized: false,
        };
        self.inner.methods.write().insert(name.to_string(), def);
        Ok(())
    }

    /// Declare a defined method memoized.
    ///
    /// Fails if the method does not exist or takes a block parameter.
    /// Declaring an already memoized method again is a no-op.
    pub fn memoize(&self, name: &str) -> Result<(), MemoError> {
        let mut methods = self.inner.methods.write();
        let def = match methods.get_mut(name) {
            Some(def) => def,
            None => {
                warn!(class = %self.inner.name, method = name, "memoize: undefined method");
                return Err(MemoError::UnknownMethod(name.to_string()));
            }
        };
        if def.signature.has_block() {
            warn!(class = %self.inner.name, method = name, "memoize: block parameter");
            return Err(MemoError::BlockParameter(name.to_string()));
        }
        if !def.memoized {
            def.memoized = true;
            info!(
                class = %self.inner.name,
                method = name,
                shape = ?def.signature.shape(),
                "memoized method"
            );
        }
        Ok(())
    }

    /// Memoize several methods, stopping at the first failure.
    pub fn memoize_all(&self, names: &[&str]) -> Result<(), MemoError> {
        names.iter().try_for_each(|name| self.memoize(name))
    }

    pub fn has_method(&self, name: &str) -> bool {
        self.inner.methods.read().contains_key(name)
    }

    pub fn is_memoized(&self, name: &str) -> bool {
        self.inner
            .methods
            .read()
            .get(name)
            .map(|def| def.memoized)
            .unwrap_or(false)
    }

    pub fn visibility(&self, name: &str) -> Option<Visibility> {
        self.inner.methods.read().get(name).map(|def| def.visibility)
    }

    pub fn shape(&self, name: &str) -> Option<CallShape> {
        self.inner
            .methods
            .read()
            .get(name)
            .map(|def| def.signature.shape())
    }

    /// Sorted method names.
    pub fn method_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.inner.methods.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Names of memoized methods, sorted.
    pub fn memoized_methods(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .inner
            .methods
            .read()
            .iter()
            .filter(|(_, def)| def.memoized)
            .map(|(name, _)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// New class starting from a copy of this class's method table,
    /// memoized flags included.
    ///
    /// The copy is a snapshot, not a live link: methods the parent defines
    /// or memoizes after this call never reach the subclass, and changes
    /// made on the subclass never reach the parent. Declare memoization on
    /// the parent before deriving subclasses, or repeat it on each subclass.
    pub fn subclass(&self, name: impl Into<String>) -> Self {
        let methods = self.inner.methods.read().clone();
        Self {
            inner: Arc::new(ClassInner {
                name: name.into(),
                methods: RwLock::new(methods),
            }),
        }
    }

    /// Snapshot of one method entry, taken so no lock is held while the
    /// body runs.
    pub(crate) fn method(&self, name: &str) -> Option<MethodDef<S, V>> {
        self.inner.methods.read().get(name).cloned()
    }
}

impl<S, V: Clone> Class<S, V> {
    /// Create an instance with default configuration.
    pub fn instantiate(&self, state: S) -> Instance<S, V> {
        Instance::new(self.clone(), state)
    }

    pub fn instantiate_with(&self, state: S, config: MemoConfig) -> Instance<S, V> {
        Instance::with_config(self.clone(), state, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class() -> Class<(), i64> {
        let class = Class::new("Calc");
        class
            .define("one", Signature::new(), |_, _| Ok(1))
            .unwrap();
        class
            .define("with_block", Signature::new().required("a").block("blk"), |_, _| Ok(0))
            .unwrap();
        class
    }

    #[test]
    fn test_memoize_unknown_method() {
        assert_eq!(
            class().memoize("nope"),
            Err(MemoError::UnknownMethod("nope".into()))
        );
    }

    #[test]
    fn test_memoize_block_method() {
        let class = class();
        assert_eq!(
            class.memoize("with_block"),
            Err(MemoError::BlockParameter("with_block".into()))
        );
        assert!(!class.is_memoized("with_block"));
    }

    #[test]
    fn test_memoize_is_idempotent() {
        let class = class();
        class.memoize("one").unwrap();
        class.memoize("one").unwrap();
        assert!(class.is_memoized("one"));
        assert_eq!(class.memoized_methods(), vec!["one".to_string()]);
    }

    #[test]
    fn test_redefine_clears_memoized_flag() {
        let class = class();
        class.memoize("one").unwrap();
        class.define("one", Signature::new(), |_, _| Ok(2)).unwrap();
        assert!(!class.is_memoized("one"));
    }

    #[test]
    fn test_subclass_copies_table() {
        let parent = class();
        parent.memoize("one").unwrap();
        let child = parent.subclass("Child");
        assert!(child.is_memoized("one"));

        child.define("two", Signature::new(), |_, _| Ok(2)).unwrap();
        assert!(child.has_method("two"));
        assert!(!parent.has_method("two"));
    }

    #[test]
    fn test_subclass_does_not_see_later_parent_changes() {
        let parent = class();
        let child = parent.subclass("Child");
        parent.memoize("one").unwrap();
        parent.define("late", Signature::new(), |_, _| Ok(3)).unwrap();

        assert!(parent.is_memoized("one"));
        assert!(!child.is_memoized("one"));
        assert!(!child.has_method("late"));
    }

    #[test]
    fn test_memoize_all_stops_on_error() {
        let class = class();
        let result = class.memoize_all(&["one", "missing"]);
        assert!(matches!(result, Err(MemoError::UnknownMethod(_))));
        assert!(class.is_memoized("one"));
    }
}
