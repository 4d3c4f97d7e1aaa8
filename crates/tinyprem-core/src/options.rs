//! Editor options embedded as raw script expressions.
//!
//! Values are code, not data: `"300"` becomes the number 300 in the
//! browser, `"'advcode'"` the string `advcode`. Each value is checked with
//! [`check_fragment`] at render time; a value that fails is logged and left
//! out so one bad option never blanks the others.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::PremiumError;
use crate::script::check_fragment;

/// Ordered option name -> script expression mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionSet {
    entries: Vec<(String, String)>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets `key` to `value`, keeping the key's original position when it
    /// already exists. A blank value removes the key.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        if value.trim().is_empty() {
            self.remove(&key);
            return;
        }
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        let idx = self.entries.iter().position(|(k, _)| k == key)?;
        Some(self.entries.remove(idx).1)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Splits entries into those that pass fragment validation and the
    /// errors for those that do not.
    pub fn validate(&self) -> (Vec<(&str, &str)>, Vec<PremiumError>) {
        let mut valid = Vec::with_capacity(self.entries.len());
        let mut invalid = Vec::new();
        for (key, value) in self.iter() {
            match check_fragment(value) {
                Ok(()) => valid.push((key, value)),
                Err(source) => invalid.push(PremiumError::InvalidScriptFragment {
                    key: key.to_string(),
                    source,
                }),
            }
        }
        (valid, invalid)
    }

    /// Renders the set as one object-literal expression:
    /// `{ "key": value, ... }`, or `{}` when nothing survives validation.
    pub fn render(&self) -> String {
        let (valid, invalid) = self.validate();
        for err in &invalid {
            if let PremiumError::InvalidScriptFragment { key, .. } = err {
                tracing::warn!(
                    key = %key,
                    value = self.get(key).unwrap_or_default(),
                    "dropping option: {}",
                    err
                );
            }
        }
        if valid.is_empty() {
            return "{}".to_string();
        }
        let body = valid
            .iter()
            .map(|(key, value)| format!("{}: {}", quote_key(key), value))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{{ {} }}", body)
    }
}

/// JSON string quoting is valid script for an object key.
fn quote_key(key: &str) -> String {
    serde_json::Value::from(key).to_string()
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut set = OptionSet::new();
        for (k, v) in iter {
            set.set(k, v);
        }
        set
    }
}

impl Serialize for OptionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for OptionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct OptionSetVisitor;

        impl<'de> Visitor<'de> for OptionSetVisitor {
            type Value = OptionSet;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a table of javascript options given as strings")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<OptionSet, A::Error> {
                let mut set = OptionSet::new();
                while let Some((k, v)) = map.next_entry::<String, String>()? {
                    set.set(k, v);
                }
                Ok(set)
            }
        }

        deserializer.deserialize_map(OptionSetVisitor)
    }
}
