//! Pipeline stage value object
//!
//! The build is a one-pass state machine:
//! `Start → ManifestLoaded → DepsSynced → PayloadInstalled → RuntimeActivated → Serving`.
//! Any stage may fail into `Failed`, which is terminal.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Start,
    ManifestLoaded,
    DepsSynced,
    PayloadInstalled,
    RuntimeActivated,
    Serving,
    Failed,
}

impl Stage {
    /// The only stage reachable from `self` on success.
    pub fn next(self) -> Option<Stage> {
        match self {
            Stage::Start => Some(Stage::ManifestLoaded),
            Stage::ManifestLoaded => Some(Stage::DepsSynced),
            Stage::DepsSynced => Some(Stage::PayloadInstalled),
            Stage::PayloadInstalled => Some(Stage::RuntimeActivated),
            Stage::RuntimeActivated => Some(Stage::Serving),
            Stage::Serving | Stage::Failed => None,
        }
    }

    pub fn can_transition_to(self, to: Stage) -> bool {
        match to {
            Stage::Failed => !self.is_terminal(),
            _ => self.next() == Some(to),
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Stage::Serving | Stage::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Start => "start",
            Stage::ManifestLoaded => "manifest_loaded",
            Stage::DepsSynced => "deps_synced",
            Stage::PayloadInstalled => "payload_installed",
            Stage::RuntimeActivated => "runtime_activated",
            Stage::Serving => "serving",
            Stage::Failed => "failed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tracks the current stage and refuses out-of-order transitions.
#[derive(Debug, Clone)]
pub struct StageTracker {
    current: Stage,
    history: Vec<Stage>,
}

impl Default for StageTracker {
    fn default() -> Self {
        Self::starting_at(Stage::Start)
    }
}

impl StageTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume from a stage recorded by an earlier build.
    pub fn starting_at(stage: Stage) -> Self {
        Self {
            current: stage,
            history: vec![stage],
        }
    }

    pub fn current(&self) -> Stage {
        self.current
    }

    pub fn history(&self) -> &[Stage] {
        &self.history
    }

    /// Move to `to`. Returns false, leaving the tracker untouched, for an illegal move.
    pub fn advance(&mut self, to: Stage) -> bool {
        if !self.current.can_transition_to(to) {
            return false;
        }
        self.current = to;
        self.history.push(to);
        true
    }

    pub fn fail(&mut self) {
        self.advance(Stage::Failed);
    }
}
