use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};
use crate::fields::ACTION;

/// Raw field values keyed by field label
///
/// Values are kept exactly as entered; they are parsed per photo, once the
/// image dimensions are known.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    values: BTreeMap<String, String>,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value
    pub fn set<K: Into<String>, V: Into<String>>(mut self, label: K, value: V) -> Self {
        self.insert(label, value);
        self
    }

    pub fn insert<K: Into<String>, V: Into<String>>(&mut self, label: K, value: V) {
        self.values.insert(label.into(), value.into());
    }

    pub fn get(&self, label: &str) -> Option<&str> {
        self.values.get(label).map(String::as_str)
    }

    /// Name of the selected effect
    pub fn effect(&self) -> Option<&str> {
        self.get(ACTION)
    }

    /// Select an effect
    pub fn with_effect<S: Into<String>>(self, effect: S) -> Self {
        self.set(ACTION, effect)
    }

    /// Overlay `other` on top of these settings
    pub fn merge(mut self, other: &Settings) -> Self {
        for (label, value) in &other.values {
            self.values.insert(label.clone(), value.clone());
        }
        self
    }

    /// Parse a `Label=value` assignment, as given on the command line
    pub fn parse_assignment(assignment: &str) -> Result<(String, String)> {
        let (label, value) = assignment.split_once('=').ok_or_else(|| ConfigError::InvalidValue {
            key: "assignment".to_string(),
            value: assignment.to_string(),
        })?;

        let label = label.trim();
        if label.is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "assignment".to_string(),
                value: assignment.to_string(),
            }
            .into());
        }
        Ok((label.to_string(), value.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FromIterator<(String, String)> for Settings {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}
