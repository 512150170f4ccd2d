//! Call arguments: an ordered positional list plus named keywords.

use std::collections::BTreeMap;

use super::value::ArgValue;

/// The arguments of a single method call.
///
/// Keywords are held in a `BTreeMap`, so the order in which they were
/// supplied never affects equality or the derived cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct CallArgs {
    positional: Vec<ArgValue>,
    keywords: BTreeMap<String, ArgValue>,
}

impl CallArgs {
    /// An empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Positional arguments only.
    pub fn positional<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<ArgValue>,
    {
        Self {
            positional: values.into_iter().map(Into::into).collect(),
            keywords: BTreeMap::new(),
        }
    }

    /// Append a positional argument.
    pub fn arg(mut self, value: impl Into<ArgValue>) -> Self {
        self.positional.push(value.into());
        self
    }

    /// Set a keyword argument; a repeated name replaces the earlier value.
    pub fn kwarg(mut self, name: impl Into<String>, value: impl Into<ArgValue>) -> Self {
        self.keywords.insert(name.into(), value.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }

    /// Total number of supplied arguments.
    pub fn len(&self) -> usize {
        self.positional.len() + self.keywords.len()
    }

    pub fn positional_len(&self) -> usize {
        self.positional.len()
    }

    pub fn get(&self, index: usize) -> Option<&ArgValue> {
        self.positional.get(index)
    }

    pub fn keyword(&self, name: &str) -> Option<&ArgValue> {
        self.keywords.get(name)
    }

    pub fn positional_values(&self) -> &[ArgValue] {
        &self.positional
    }

    pub fn keywords(&self) -> &BTreeMap<String, ArgValue> {
        &self.keywords
    }

    /// Integer positional argument, the common case for method bodies.
    pub fn int(&self, index: usize) -> Option<i64> {
        self.get(index).and_then(ArgValue::as_int)
    }

    /// Integer keyword argument.
    pub fn int_kw(&self, name: &str) -> Option<i64> {
        self.keyword(name).and_then(ArgValue::as_int)
    }
}
