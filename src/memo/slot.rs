//! Per-method cache slot.

use std::collections::HashMap;

use super::key::ArgKey;

/// Cached results of one method on one instance.
///
/// Zero-argument methods use `Scalar`; every other method uses `Keyed`.
/// The shape follows the key: `None` keys address a scalar slot.
#[derive(Debug, Clone)]
pub enum CacheSlot<V> {
    Scalar(Option<V>),
    Keyed(HashMap<ArgKey, V>),
}

impl<V> CacheSlot<V> {
    /// Empty slot shaped for `key`.
    pub fn for_key(key: Option<&ArgKey>) -> Self {
        match key {
            None => Self::Scalar(None),
            Some(_) => Self::Keyed(HashMap::new()),
        }
    }

    fn fits(&self, key: Option<&ArgKey>) -> bool {
        matches!(
            (self, key),
            (Self::Scalar(_), None) | (Self::Keyed(_), Some(_))
        )
    }

    pub fn get(&self, key: Option<&ArgKey>) -> Option<&V> {
        match (self, key) {
            (Self::Scalar(value), None) => value.as_ref(),
            (Self::Keyed(map), Some(key)) => map.get(key),
            _ => None,
        }
    }

    pub fn contains(&self, key: Option<&ArgKey>) -> bool {
        self.get(key).is_some()
    }

    /// Store `value`, replacing any previous entry. A slot of the wrong shape
    /// (the method was redefined with a different signature) is reshaped.
    pub fn insert(&mut self, key: Option<ArgKey>, value: V) {
        if !self.fits(key.as_ref()) {
            *self = Self::for_key(key.as_ref());
        }
        match (self, key) {
            (Self::Scalar(slot), None) => *slot = Some(value),
            (Self::Keyed(map), Some(key)) => {
                map.insert(key, value);
            }
            _ => unreachable!("slot reshaped to fit key"),
        }
    }

    /// Store `value` only if no entry exists; return the entry that remains.
    pub fn insert_if_absent(&mut self, key: Option<ArgKey>, value: V) -> &V {
        if !self.fits(key.as_ref()) {
            *self = Self::for_key(key.as_ref());
        }
        match (self, key) {
            (Self::Scalar(slot), None) => slot.get_or_insert(value),
            (Self::Keyed(map), Some(key)) => map.entry(key).or_insert(value),
            _ => unreachable!("slot reshaped to fit key"),
        }
    }

    /// Remove one entry. Returns true if something was cached.
    pub fn remove(&mut self, key: Option<&ArgKey>) -> bool {
        match (self, key) {
            (Self::Scalar(slot), None) => slot.take().is_some(),
            (Self::Keyed(map), Some(key)) => map.remove(key).is_some(),
            _ => false,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Scalar(value) => usize::from(value.is_some()),
            Self::Keyed(map) => map.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
