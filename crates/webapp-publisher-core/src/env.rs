//! Environment variable access.
//!
//! Stages never read the process environment directly. A single
//! [`EnvSource`] is consulted once while building the run configuration,
//! which keeps the pipeline testable with an in-memory [`MapEnv`].

use std::collections::BTreeMap;
use std::env::VarError;

use crate::error::{PublisherError, Result};

/// Names of every environment variable the pipeline consumes.
pub mod vars {
    pub const GITHUB_WORKSPACE: &str = "GITHUB_WORKSPACE";
    pub const PROJECT_NAME: &str = "PROJECT_NAME";
    pub const PROJECT_TYPE: &str = "PROJECT_TYPE";
    pub const AZION_TOKEN: &str = "AZION_TOKEN";
    pub const FORCE_INIT: &str = "FORCE_INIT";
    pub const SETUP_KV: &str = "SETUP_KV";
    pub const KV_BUCKET: &str = "KV_BUCKET";
    pub const KV_REGION: &str = "KV_REGION";
    pub const KV_PATH: &str = "KV_PATH";
    pub const AWS_ACCESS_KEY_ID: &str = "AWS_ACCESS_KEY_ID";
    pub const AWS_SECRET_ACCESS_KEY: &str = "AWS_SECRET_ACCESS_KEY";
    pub const SHOULD_COMMIT: &str = "SHOULD_COMMIT";
    pub const PUSH_USER: &str = "PUSH_USER";
    pub const PUSH_TOKEN: &str = "PUSH_TOKEN";
}

/// Read-only view of named variables.
///
/// `None` means the variable is unset; `Some("")` means it is set to the
/// empty string. Several checks depend on presence rather than value.
/// Values that cannot be represented as UTF-8 are a `Configuration` error.
pub trait EnvSource: Send + Sync {
    fn lookup(&self, name: &str) -> Result<Option<String>>;
}

/// The real process environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn lookup(&self, name: &str) -> Result<Option<String>> {
        match std::env::var(name) {
            Ok(value) => Ok(Some(value)),
            Err(VarError::NotPresent) => Ok(None),
            Err(VarError::NotUnicode(_)) => Err(PublisherError::Configuration(format!(
                "environment variable {name} is not valid UTF-8"
            ))),
        }
    }
}

/// In-memory environment, used by tests and embedders.
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: BTreeMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter.
    pub fn with(mut self, name: &str, value: &str) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: &str, value: &str) {
        self.vars.insert(name.to_string(), value.to_string());
    }

    pub fn remove(&mut self, name: &str) {
        self.vars.remove(name);
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MapEnv {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            vars: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl EnvSource for MapEnv {
    fn lookup(&self, name: &str) -> Result<Option<String>> {
        Ok(self.vars.get(name).cloned())
    }
}

/// Parse a boolean flag. Only the literal tokens `true` and `false` are
/// accepted; anything else is reported against `name`.
pub fn parse_bool(name: &str, raw: &str) -> Result<bool> {
    match raw {
        "true" => Ok(true),
        "false" => Ok(false),
        other => Err(PublisherError::Configuration(format!(
            "you must provide either true or false for {name}, got {other:?}"
        ))),
    }
}

/// Look up an optional boolean flag. Unset yields `None`.
pub fn lookup_bool(env: &dyn EnvSource, name: &str) -> Result<Option<bool>> {
    env.lookup(name)?
        .map(|raw| parse_bool(name, &raw))
        .transpose()
}

/// Look up a variable that must be set to a non-empty value.
pub fn require(env: &dyn EnvSource, name: &str) -> Result<String> {
    match env.lookup(name)? {
        Some(value) if !value.is_empty() => Ok(value),
        Some(_) => Err(PublisherError::Configuration(format!(
            "environment variable {name} is set but empty"
        ))),
        None => Err(PublisherError::Configuration(format!(
            "missing required environment variable {name}"
        ))),
    }
}
