// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Core types for multi-agent orchestration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::AgentsConfig;

use super::ipc::transport::agent_socket_path;

// ============================================================================
// Agent Identity
// ============================================================================

/// Logical name and IPC address of an agent process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentIdentity {
    pub name: String,
    pub socket_path: PathBuf,
}

impl AgentIdentity {
    pub fn new(name: impl Into<String>, socket_path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            socket_path: socket_path.into(),
        }
    }

    /// Identity at the conventional address under the configured socket dir.
    pub fn from_config(config: &AgentsConfig, name: impl Into<String>) -> Self {
        let name = name.into();
        let socket_path = agent_socket_path(&config.socket_dir, &config.socket_prefix, &name);
        Self { name, socket_path }
    }

    pub fn manager(config: &AgentsConfig) -> Self {
        Self::from_config(config, config.manager_name())
    }

    /// Worker `number` (1-based).
    pub fn worker(config: &AgentsConfig, number: usize) -> Self {
        Self::from_config(config, config.worker_name(number))
    }

    pub fn socket_path(&self) -> &Path {
        &self.socket_path
    }
}

// ============================================================================
// Decomposition
// ============================================================================

/// One independently dispatchable piece of a phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subtask {
    pub instruction: String,
}

/// A named stage of subtasks that may run in parallel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
}

impl Phase {
    pub fn new(name: impl Into<String>, subtasks: Vec<Subtask>) -> Self {
        Self {
            name: name.into(),
            subtasks,
        }
    }

    /// Phase name, `phase<index>` when the decomposition left it blank.
    pub fn display_name(&self, index: usize) -> String {
        if self.name.is_empty() {
            format!("phase{}", index)
        } else {
            self.name.clone()
        }
    }
}

/// Structured output of the decomposition step.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decomposition {
    #[serde(default)]
    pub phases: Vec<Phase>,
    #[serde(default)]
    pub strategy: Option<String>,
}

impl Decomposition {
    pub fn subtask_count(&self) -> usize {
        self.phases.iter().map(|p| p.subtasks.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_paths() {
        let mut config = AgentsConfig::default();
        config.socket_dir = PathBuf::from("/run/pets");

        let manager = AgentIdentity::manager(&config);
        assert_eq!(manager.name, "yadoran");
        assert_eq!(manager.socket_path, PathBuf::from("/run/pets/yadon-agent-yadoran.sock"));

        let worker = AgentIdentity::worker(&config, 2);
        assert_eq!(worker.name, "yadon-2");
        assert_eq!(worker.socket_path, PathBuf::from("/run/pets/yadon-agent-yadon-2.sock"));
    }

    #[test]
    fn test_phase_display_name() {
        let named = Phase::new("docs", vec![]);
        assert_eq!(named.display_name(1), "docs");
        let blank = Phase::new("", vec![]);
        assert_eq!(blank.display_name(2), "phase2");
    }

    #[test]
    fn test_decomposition_defaults() {
        let d: Decomposition = serde_json::from_str(r#"{"phases": [{"name": "implement"}]}"#).unwrap();
        assert_eq!(d.phases.len(), 1);
        assert!(d.phases[0].subtasks.is_empty());
        assert!(d.strategy.is_none());
        assert_eq!(d.subtask_count(), 0);
    }
}
