//! In-process fakes for the external collaborators (testing only)
//!
//! Provides `ScriptedRunner` in place of real child processes and
//! `StubBinarySource` in place of the HTTP download.

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::command::{CommandOutcome, CommandRunner, CommandSpec};
use crate::error::{PublisherError, Result};
use crate::provision::{BinarySource, ProvisionedBinary};

// ---------------------------------------------------------------------------
// ScriptedRunner
// ---------------------------------------------------------------------------

/// Records every command and answers with scripted outcomes.
///
/// Responses are matched in registration order by [`CommandSpec::has_args`];
/// commands without a matching response succeed with empty output.
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    responses: Vec<(Vec<String>, CommandOutcome)>,
    calls: Mutex<Vec<CommandSpec>>,
}

impl ScriptedRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands containing `tokens` with `outcome`.
    pub fn respond(mut self, tokens: &[&str], outcome: CommandOutcome) -> Self {
        self.responses
            .push((tokens.iter().map(|t| t.to_string()).collect(), outcome));
        self
    }

    /// Every command run so far, in order.
    pub fn calls(&self) -> Vec<CommandSpec> {
        self.calls.lock().unwrap().clone()
    }

    /// Whether any recorded command contains `tokens`.
    pub fn invoked(&self, tokens: &[&str]) -> bool {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .any(|spec| spec.has_args(tokens))
    }
}

#[async_trait]
impl CommandRunner for ScriptedRunner {
    async fn run(&self, spec: &CommandSpec) -> Result<CommandOutcome> {
        self.calls.lock().unwrap().push(spec.clone());

        let outcome = self
            .responses
            .iter()
            .find(|(tokens, _)| {
                let tokens: Vec<&str> = tokens.iter().map(String::as_str).collect();
                spec.has_args(&tokens)
            })
            .map(|(_, outcome)| outcome.clone())
            .unwrap_or_else(|| CommandOutcome::ok(""));
        Ok(outcome)
    }
}

// ---------------------------------------------------------------------------
// StubBinarySource
// ---------------------------------------------------------------------------

/// Writes a small shell script instead of downloading the real binary.
#[derive(Debug, Default)]
pub struct StubBinarySource {
    fail_with: Option<String>,
    calls: Mutex<usize>,
}

impl StubBinarySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every provision attempt fail with a `RemoteFetch` error.
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            calls: Mutex::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl BinarySource for StubBinarySource {
    async fn provision(&self, destination: &Path) -> Result<ProvisionedBinary> {
        *self.calls.lock().unwrap() += 1;

        if let Some(reason) = &self.fail_with {
            return Err(PublisherError::RemoteFetch {
                url: "stub://azioncli".to_string(),
                reason: reason.clone(),
            });
        }

        tokio::fs::write(destination, b"#!/bin/sh\nexit 0\n")
            .await
            .map_err(|e| PublisherError::io(destination, e))?;
        ProvisionedBinary::finalize(destination).await
    }
}
