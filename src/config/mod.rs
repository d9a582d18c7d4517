// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration module for the yadon agents.
//!
//! Sources, highest precedence first:
//! - Environment: `YADON_COUNT`, `LLM_BACKEND`, `YADON_<N>_BACKEND`
//! - Workspace config: .yadon.json, .yadon.yaml, .yadon.yml or .yadon/config.json
//! - Global config: ~/.yadon/config.json
//! - Built-in defaults
//!
//! The first config file found is used as a whole; fields it omits keep
//! their defaults.

mod loader;
mod types;

pub use loader::{
    apply_env_overrides, apply_overrides_from, get_global_config_path, load_config_file,
    load_global_config, load_workspace_config, CONFIG_FILES, GLOBAL_CONFIG_DIR, GLOBAL_CONFIG_FILE,
};

pub use types::{
    AgentsConfig, BubbleTemplates, LimitsConfig, PromptsConfig, RolesConfig, TimeoutsConfig,
    WorkerCountConfig,
};

use crate::error::ConfigError;
use std::path::Path;

/// Load configuration for a workspace and apply environment overrides.
pub fn load_config(workspace_root: &Path) -> Result<AgentsConfig, ConfigError> {
    let mut config = match load_workspace_config(workspace_root)? {
        Some(config) => config,
        None => load_global_config()?.unwrap_or_default(),
    };
    apply_env_overrides(&mut config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_config_with_workspace_config() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".yadon.json"),
            r#"{"socketPrefix": "ws", "roles": {"manager": "boss"}}"#,
        )
        .unwrap();

        let config = load_config(temp.path()).unwrap();
        assert_eq!(config.socket_prefix, "ws");
        assert_eq!(config.manager_name(), "boss");
        assert_eq!(config.roles.worker, "yadon");
    }
}
