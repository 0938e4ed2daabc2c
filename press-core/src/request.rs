use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Number of concurrent jobs the compiler may use.
///
/// Always at least 1; zero and negative values are rejected on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Jobs(NonZeroU32);

impl Jobs {
    /// Creates a `Jobs` value from a raw integer.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidJobs`] if `value` is below 1 or exceeds `u32::MAX`.
    pub fn new(value: i64) -> Result<Self, CoreError> {
        u32::try_from(value)
            .ok()
            .and_then(NonZeroU32::new)
            .map(Self)
            .ok_or(CoreError::InvalidJobs { value })
    }

    /// Returns the job count.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

impl TryFrom<i64> for Jobs {
    type Error = CoreError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NonZeroU32> for Jobs {
    fn from(value: NonZeroU32) -> Self {
        Self(value)
    }
}

impl fmt::Display for Jobs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Input bindings injected into the compiler's evaluation context.
///
/// Keys are unique. Each key is non-empty and free of `=`, since the binding
/// reaches the compiler as a single `key=value` argument split on the first `=`.
/// Iteration is sorted by key, but no consumer may depend on that order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Variables(BTreeMap<String, String>);

impl Variables {
    /// Creates an empty set of bindings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a binding, replacing any previous value for `key`.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidVariableKey`] if `key` is empty or contains `=`.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, CoreError> {
        let key = key.into();
        validate_key(&key)?;
        Ok(self.0.insert(key, value.into()))
    }

    /// Returns the value bound to `key`, if any.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Iterates over `(key, value)` pairs.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }

    /// Number of bindings.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no bindings.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for Variables {
    type Error = CoreError;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        map.keys().try_for_each(|key| validate_key(key))?;
        Ok(Self(map))
    }
}

impl<'a> IntoIterator for &'a Variables {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn validate_key(key: &str) -> Result<(), CoreError> {
    if key.is_empty() {
        return Err(CoreError::InvalidVariableKey {
            key: key.to_owned(),
            reason: "key must not be empty",
        });
    }
    if key.contains('=') {
        return Err(CoreError::InvalidVariableKey {
            key: key.to_owned(),
            reason: "key must not contain '='",
        });
    }
    Ok(())
}

/// A validated request to compile one document.
///
/// Holding a `CompileRequest` means every field already satisfies its
/// constraints; no further checks are needed before spawning the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub struct CompileRequest {
    /// Document source. May be empty; the compiler decides whether that is an error.
    pub template: String,
    /// Concurrency hint for the compiler.
    pub jobs: Option<Jobs>,
    /// Input bindings, passed as `--input key=value`.
    pub variables: Variables,
}

impl CompileRequest {
    /// Creates a request with no job count and no variables.
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            jobs: None,
            variables: Variables::new(),
        }
    }

    /// Sets the job count.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidJobs`] if `jobs` is zero or out of range.
    pub fn with_jobs(mut self, jobs: i64) -> Result<Self, CoreError> {
        self.jobs = Some(Jobs::new(jobs)?);
        Ok(self)
    }

    /// Adds one input binding.
    ///
    /// # Errors
    /// Returns [`CoreError::InvalidVariableKey`] if `key` is empty or contains `=`.
    pub fn with_variable(
        mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, CoreError> {
        self.variables.insert(key, value)?;
        Ok(self)
    }

    /// Replaces all input bindings.
    #[must_use]
    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = variables;
        self
    }
}
