//! State channels and merge semantics.
//!
//! A state type declares each field as a channel. The channel type fixes how
//! updates to that field are merged:
//! - `WriteOnce<T>`: may be set once per run; a second write is a conflict.
//! - `Overwrite<T>`: the latest write wins.
//! - `Append<T>`: updates are concatenated in arrival order.
//!
//! Fields absent from an update (None / empty) are left untouched.

use litgraph_core::{Error, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStrategy {
    WriteOnce,
    Overwrite,
    Append,
}

impl std::fmt::Display for MergeStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WriteOnce => write!(f, "write_once"),
            Self::Overwrite => write!(f, "overwrite"),
            Self::Append => write!(f, "append"),
        }
    }
}

/// A declared field: name plus merge strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSpec {
    pub name: &'static str,
    pub strategy: MergeStrategy,
}

impl FieldSpec {
    /// Declare a field whose strategy is taken from its channel type.
    pub const fn of<C: Channel>(name: &'static str) -> Self {
        Self {
            name,
            strategy: C::STRATEGY,
        }
    }
}

/// A single mergeable field.
pub trait Channel {
    /// What a node supplies for this field in a partial update.
    type Update;

    const STRATEGY: MergeStrategy;

    /// Fold an update into the field. Returns whether anything was written.
    fn merge(&mut self, field: &'static str, update: Self::Update) -> Result<bool>;
}

/// Shared state threaded through one run.
pub trait GraphState: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Sparse update returned by nodes. `Default` is the empty update.
    type Update: Default + Send + std::fmt::Debug;

    /// Field declarations, in a stable order.
    fn schema() -> &'static [FieldSpec];

    /// Merge an update, returning the names of the fields it wrote.
    fn merge(&mut self, update: Self::Update) -> Result<Vec<&'static str>>;
}

/// Merge one field and record its name when it was written.
pub fn merge_field<C: Channel>(
    touched: &mut Vec<&'static str>,
    field: &'static str,
    channel: &mut C,
    update: C::Update,
) -> Result<()> {
    if channel.merge(field, update)? {
        touched.push(field);
    }
    Ok(())
}

// ============================================================
// WriteOnce
// ============================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WriteOnce<T>(Option<T>);

impl<T> Default for WriteOnce<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> WriteOnce<T> {
    pub fn new(value: T) -> Self {
        Self(Some(value))
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Channel for WriteOnce<T> {
    type Update = Option<T>;
    const STRATEGY: MergeStrategy = MergeStrategy::WriteOnce;

    fn merge(&mut self, field: &'static str, update: Option<T>) -> Result<bool> {
        match update {
            None => Ok(false),
            Some(_) if self.0.is_some() => Err(Error::StateConflict { field }),
            Some(value) => {
                self.0 = Some(value);
                Ok(true)
            }
        }
    }
}

// ============================================================
// Overwrite
// ============================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Overwrite<T>(Option<T>);

impl<T> Default for Overwrite<T> {
    fn default() -> Self {
        Self(None)
    }
}

impl<T> Overwrite<T> {
    pub fn new(value: T) -> Self {
        Self(Some(value))
    }

    pub fn get(&self) -> Option<&T> {
        self.0.as_ref()
    }

    pub fn is_set(&self) -> bool {
        self.0.is_some()
    }

    pub fn into_inner(self) -> Option<T> {
        self.0
    }
}

impl<T> Channel for Overwrite<T> {
    type Update = Option<T>;
    const STRATEGY: MergeStrategy = MergeStrategy::Overwrite;

    fn merge(&mut self, _field: &'static str, update: Option<T>) -> Result<bool> {
        match update {
            None => Ok(false),
            Some(value) => {
                self.0 = Some(value);
                Ok(true)
            }
        }
    }
}

// ============================================================
// Append
// ============================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Append<T>(Vec<T>);

impl<T> Default for Append<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Append<T> {
    pub fn new(items: Vec<T>) -> Self {
        Self(items)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn last(&self) -> Option<&T> {
        self.0.last()
    }

    pub fn into_inner(self) -> Vec<T> {
        self.0
    }
}

impl<T> Channel for Append<T> {
    type Update = Vec<T>;
    const STRATEGY: MergeStrategy = MergeStrategy::Append;

    fn merge(&mut self, _field: &'static str, update: Vec<T>) -> Result<bool> {
        if update.is_empty() {
            return Ok(false);
        }
        self.0.extend(update);
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_once_rejects_second_write() {
        let mut field = WriteOnce::default();
        assert!(field.merge("plan", Some(1)).unwrap());
        assert!(!field.merge("plan", None).unwrap());
        let err = field.merge("plan", Some(2)).unwrap_err();
        assert!(matches!(err, Error::StateConflict { field: "plan" }));
        assert_eq!(field.get(), Some(&1));
    }

    #[test]
    fn overwrite_keeps_latest() {
        let mut field = Overwrite::default();
        field.merge("draft", Some("a")).unwrap();
        field.merge("draft", None).unwrap();
        field.merge("draft", Some("b")).unwrap();
        assert_eq!(field.get(), Some(&"b"));
    }

    #[test]
    fn append_concatenates_in_order() {
        let mut field = Append::new(vec![1]);
        assert!(!field.merge("log", vec![]).unwrap());
        field.merge("log", vec![2, 3]).unwrap();
        field.merge("log", vec![4]).unwrap();
        assert_eq!(field.as_slice(), &[1, 2, 3, 4]);
    }

    #[test]
    fn field_spec_takes_strategy_from_channel() {
        const FIELD: FieldSpec = FieldSpec::of::<Append<String>>("conversation");
        assert_eq!(FIELD.strategy, MergeStrategy::Append);
        assert_eq!(FieldSpec::of::<WriteOnce<u8>>("x").strategy, MergeStrategy::WriteOnce);
    }
}
