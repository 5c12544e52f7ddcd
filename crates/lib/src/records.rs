//! Keyed record collections and their wire format.
//!
//! Both the remote store and the local cache hold a mapping as a JSON array of
//! `[key, value]` pairs, the shape the browser client produces when it
//! serializes a `Map`. A `null` payload is read as an empty mapping, and when a
//! key repeats the later pair wins.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A string-keyed mapping serialized as an array of `[key, value]` pairs.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyedRecords<T>(BTreeMap<String, T>);

impl<T> KeyedRecords<T> {
    /// Creates an empty mapping.
    pub fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Returns the first record matching `predicate` together with its key.
    ///
    /// This is a linear scan; lookups by anything other than the key pay O(n).
    pub fn find<P>(&self, mut predicate: P) -> Option<(&String, &T)>
    where
        P: FnMut(&T) -> bool,
    {
        self.0.iter().find(|(_, value)| predicate(value))
    }

    /// Like [`find`](Self::find) but yields a mutable reference to the record.
    pub fn find_mut<P>(&mut self, mut predicate: P) -> Option<(&String, &mut T)>
    where
        P: FnMut(&T) -> bool,
    {
        self.0.iter_mut().find(|(_, value)| predicate(value))
    }

    /// Consumes the collection, returning the underlying map.
    pub fn into_inner(self) -> BTreeMap<String, T> {
        self.0
    }
}

impl<T> Default for KeyedRecords<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Deref for KeyedRecords<T> {
    type Target = BTreeMap<String, T>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for KeyedRecords<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

impl<T> FromIterator<(String, T)> for KeyedRecords<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<T: Serialize> Serialize for KeyedRecords<T> {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_seq(self.0.iter())
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for KeyedRecords<T> {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let pairs = Option::<Vec<(String, T)>>::deserialize(deserializer)?;
        Ok(pairs.unwrap_or_default().into_iter().collect())
    }
}
