// Copyright 2026 Layne Penney
// SPDX-License-Identifier: AGPL-3.0-or-later

//! Configuration loading from files and the environment.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::runner::{is_known_backend, DEFAULT_BACKEND};

use super::types::AgentsConfig;

/// Workspace config file names to search for (in order).
pub const CONFIG_FILES: &[&str] = &[".yadon.json", ".yadon.yaml", ".yadon.yml", ".yadon/config.json"];

/// Global config directory name.
pub const GLOBAL_CONFIG_DIR: &str = ".yadon";

/// Global config file name.
pub const GLOBAL_CONFIG_FILE: &str = "config.json";

/// Get the global config file path.
pub fn get_global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(GLOBAL_CONFIG_DIR).join(GLOBAL_CONFIG_FILE))
}

/// Load global configuration from ~/.yadon/config.json.
pub fn load_global_config() -> Result<Option<AgentsConfig>, ConfigError> {
    let path = match get_global_config_path() {
        Some(p) => p,
        None => return Ok(None),
    };

    if !path.exists() {
        return Ok(None);
    }

    load_config_file(&path).map(Some)
}

/// Load the first workspace config file found under `workspace_root`.
pub fn load_workspace_config(workspace_root: &Path) -> Result<Option<AgentsConfig>, ConfigError> {
    for filename in CONFIG_FILES {
        let path = workspace_root.join(filename);
        if path.exists() {
            return load_config_file(&path).map(Some);
        }
    }
    Ok(None)
}

/// Load a configuration file (JSON or YAML, by extension).
pub fn load_config_file(path: &Path) -> Result<AgentsConfig, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    debug!(path = %path.display(), "Loading config file");

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("");

    match extension.to_lowercase().as_str() {
        "yaml" | "yml" => serde_yaml::from_str(&content).map_err(ConfigError::from),
        _ => serde_json::from_str(&content).map_err(ConfigError::from),
    }
}

/// Apply `YADON_COUNT`, `LLM_BACKEND` and `YADON_<N>_BACKEND` from the process environment.
pub fn apply_env_overrides(config: &mut AgentsConfig) {
    apply_overrides_from(config, |key| std::env::var(key).ok());
}

/// Apply environment-style overrides read through `lookup`.
pub fn apply_overrides_from<F>(config: &mut AgentsConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup("YADON_COUNT").filter(|v| !v.is_empty()) {
        match raw.trim().parse::<usize>() {
            Ok(n) => config.workers.count = config.workers.clamp(n),
            Err(_) => warn!(value = %raw, "Ignoring non-numeric YADON_COUNT"),
        }
    }

    if let Some(raw) = lookup("LLM_BACKEND").filter(|v| !v.is_empty()) {
        let name = raw.to_lowercase();
        if is_known_backend(&name) {
            config.backend = name;
        } else {
            warn!(backend = %raw, "Unknown LLM_BACKEND, using {}", DEFAULT_BACKEND);
            config.backend = DEFAULT_BACKEND.to_string();
        }
    }

    for number in 1..=config.workers.max.max(config.worker_count()) {
        let key = format!("YADON_{}_BACKEND", number);
        if let Some(raw) = lookup(&key).filter(|v| !v.is_empty()) {
            let name = raw.to_lowercase();
            if is_known_backend(&name) {
                config.worker_backends.insert(number, name);
            } else {
                warn!(key = %key, backend = %raw, "Ignoring unknown worker backend");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_files_order() {
        assert_eq!(CONFIG_FILES[0], ".yadon.json");
        assert_eq!(CONFIG_FILES[3], ".yadon/config.json");
    }

    #[test]
    fn test_global_config_path() {
        if let Some(path) = get_global_config_path() {
            assert!(path.ends_with(".yadon/config.json"));
        }
    }

    #[test]
    fn test_load_workspace_config_not_found() {
        let temp = TempDir::new().unwrap();
        let result = load_workspace_config(temp.path()).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_load_workspace_config_json() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".yadon.json"), r#"{"socketPrefix": "test"}"#).unwrap();

        let config = load_workspace_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.socket_prefix, "test");
    }

    #[test]
    fn test_load_workspace_config_yaml() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(".yadon.yaml"),
            "socketDir: /var/run/yadon\nworkers:\n  count: 3\n",
        )
        .unwrap();

        let config = load_workspace_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.socket_dir, PathBuf::from("/var/run/yadon"));
        assert_eq!(config.worker_count(), 3);
    }

    #[test]
    fn test_first_file_wins() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".yadon.json"), r#"{"backend": "gemini"}"#).unwrap();
        std::fs::write(temp.path().join(".yadon.yml"), "backend: copilot\n").unwrap();

        let config = load_workspace_config(temp.path()).unwrap().unwrap();
        assert_eq!(config.backend, "gemini");
    }

    #[test]
    fn test_invalid_json_is_error() {
        let temp = TempDir::new().unwrap();
        std::fs::write(temp.path().join(".yadon.json"), "{nope").unwrap();
        let err = load_workspace_config(temp.path()).unwrap_err();
        assert!(matches!(err, ConfigError::JsonError(_)));
    }

    #[test]
    fn test_yadon_count_clamped() {
        let mut config = AgentsConfig::default();
        apply_overrides_from(&mut config, env(&[("YADON_COUNT", "20")]));
        assert_eq!(config.worker_count(), 8);

        apply_overrides_from(&mut config, env(&[("YADON_COUNT", "0")]));
        assert_eq!(config.worker_count(), 1);
    }

    #[test]
    fn test_yadon_count_non_numeric_ignored() {
        let mut config = AgentsConfig::default();
        apply_overrides_from(&mut config, env(&[("YADON_COUNT", "many")]));
        assert_eq!(config.worker_count(), 4);
    }

    #[test]
    fn test_llm_backend() {
        let mut config = AgentsConfig::default();
        apply_overrides_from(&mut config, env(&[("LLM_BACKEND", "Gemini")]));
        assert_eq!(config.backend, "gemini");

        apply_overrides_from(&mut config, env(&[("LLM_BACKEND", "mystery")]));
        assert_eq!(config.backend, "claude");
    }

    #[test]
    fn test_worker_backend_override() {
        let mut config = AgentsConfig::default();
        apply_overrides_from(
            &mut config,
            env(&[("YADON_2_BACKEND", "copilot"), ("YADON_3_BACKEND", "bogus")]),
        );
        assert_eq!(config.worker_backend(2), "copilot");
        assert_eq!(config.worker_backend(3), "claude");
    }
}
