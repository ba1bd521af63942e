//! A string-keyed bag of values handed to constructors.

use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Options passed to an object constructor, either per `get_object` call or
/// per declared reference.
///
/// Values are stored as JSON values so that options can be loaded from any
/// serde-compatible configuration source and read back as concrete types.
///
/// ```
/// use fibre_factory::Options;
///
/// let options = Options::new().with("id", "HUB01").with("spokes", 32);
/// assert_eq!(options.get::<String>("id").unwrap().as_deref(), Some("HUB01"));
/// assert_eq!(options.get::<u32>("spokes").unwrap(), Some(32));
/// assert_eq!(options.get::<u32>("missing").unwrap(), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options {
  values: HashMap<String, Value>,
}

impl Options {
  /// Creates an empty `Options`.
  pub fn new() -> Self {
    Self::default()
  }

  /// Returns the options with `key` set to `value`.
  pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
    self.values.insert(key.into(), value.into());
    self
  }

  /// Sets `key` to `value`, returning the previous value if any.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
    self.values.insert(key.into(), value.into())
  }

  /// Serializes `value` and stores it under `key`.
  pub fn insert_serialized<T: Serialize>(
    &mut self,
    key: impl Into<String>,
    value: &T,
  ) -> Result<()> {
    let key = key.into();
    let value = serde_json::to_value(value).map_err(|source| Error::OptionType {
      key: key.clone(),
      source,
    })?;
    self.values.insert(key, value);
    Ok(())
  }

  /// Reads `key` as a `T`.
  ///
  /// Returns `Ok(None)` when the key is absent and an error when the stored
  /// value cannot be converted.
  pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
    match self.values.get(key) {
      None => Ok(None),
      Some(value) => T::deserialize(value)
        .map(Some)
        .map_err(|source| Error::OptionType {
          key: key.to_owned(),
          source,
        }),
    }
  }

  /// Returns the raw value stored under `key`.
  pub fn get_value(&self, key: &str) -> Option<&Value> {
    self.values.get(key)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.values.contains_key(key)
  }

  pub fn remove(&mut self, key: &str) -> Option<Value> {
    self.values.remove(key)
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
    self.values.iter().map(|(k, v)| (k.as_str(), v))
  }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Options {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    Self {
      values: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
    }
  }
}
