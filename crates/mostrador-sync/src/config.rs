//! # Session Configuration
//!
//! Configuration for the session engine.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     MOSTRADOR_BACKEND_URL=https://pos.example.com                      │
//! │     MOSTRADOR_STORE=BA001GC                                            │
//! │     MOSTRADOR_DEBOUNCE_MS=400                                          │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/mostrador/mostrador.toml (Linux)                         │
//! │     ~/Library/Application Support/com.mostrador.pos (macOS)            │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     store BA001GC, 400 ms debounce, remote-wins conflicts              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # mostrador.toml
//! [backend]
//! base_url = "https://pos.example.com"
//!
//! [store]
//! default_store = "BA001GC"
//!
//! [persistence]
//! debounce_ms = 400
//! conflict_policy = "remote_wins"  # remote_wins | prompt
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::error::{SyncError, SyncResult};

/// Default debounce window for remote cart writes, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 400;

// =============================================================================
// Sections
// =============================================================================

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendSettings {
    /// Base URL of the quoting backend.
    pub base_url: String,
}

impl Default for BackendSettings {
    fn default() -> Self {
        BackendSettings {
            base_url: "http://localhost:8000".to_string(),
        }
    }
}

/// Store selection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSettings {
    /// Store assumed before any preference is recorded.
    #[serde(default = "default_store")]
    pub default_store: String,
}

fn default_store() -> String {
    mostrador_core::DEFAULT_STORE.to_string()
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            default_store: default_store(),
        }
    }
}

/// How hydration behaves when both cart tiers hold different carts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictPolicyKind {
    /// The remote copy is adopted silently.
    #[default]
    RemoteWins,
    /// An installed prompt lets the operator pick a copy; with no
    /// prompt installed this behaves as remote-wins.
    Prompt,
}

/// Persistence bridge settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceSettings {
    /// Debounce window for remote writes (milliseconds).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default)]
    pub conflict_policy: ConflictPolicyKind,

    /// Cache database file. Defaults to `mostrador-cache.db` in the
    /// platform data directory.
    #[serde(default)]
    pub cache_path: Option<PathBuf>,
}

fn default_debounce_ms() -> u64 {
    DEFAULT_DEBOUNCE_MS
}

impl Default for PersistenceSettings {
    fn default() -> Self {
        PersistenceSettings {
            debounce_ms: default_debounce_ms(),
            conflict_policy: ConflictPolicyKind::default(),
            cache_path: None,
        }
    }
}

// =============================================================================
// Session Config
// =============================================================================

/// Full session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub backend: BackendSettings,

    #[serde(default)]
    pub store: StoreSettings,

    #[serde(default)]
    pub persistence: PersistenceSettings,
}

impl SessionConfig {
    /// Loads configuration: TOML file (if present) with environment
    /// overrides on top.
    pub fn load() -> SyncResult<Self> {
        let mut config = match Self::config_file_path() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => {
                debug!("No config file found, using defaults");
                SessionConfig::default()
            }
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parses a TOML config file.
    pub fn from_file(path: &Path) -> SyncResult<Self> {
        info!(path = %path.display(), "Loading session config");
        let raw = std::fs::read_to_string(path)
            .map_err(|e| SyncError::ConfigLoadFailed(format!("{}: {e}", path.display())))?;
        toml::from_str(&raw)
            .map_err(|e| SyncError::ConfigLoadFailed(format!("{}: {e}", path.display())))
    }

    /// Platform config file location (`mostrador/mostrador.toml`).
    pub fn config_file_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("MOSTRADOR_CONFIG") {
            return Some(PathBuf::from(path));
        }
        directories::ProjectDirs::from("com", "mostrador", "mostrador")
            .map(|dirs| dirs.config_dir().join("mostrador.toml"))
    }

    /// Cache database location: configured path, or the platform data
    /// directory.
    pub fn cache_path(&self) -> PathBuf {
        if let Some(path) = &self.persistence.cache_path {
            return path.clone();
        }
        directories::ProjectDirs::from("com", "mostrador", "mostrador")
            .map(|dirs| dirs.data_dir().join("mostrador-cache.db"))
            .unwrap_or_else(|| PathBuf::from("mostrador-cache.db"))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("MOSTRADOR_BACKEND_URL") {
            self.backend.base_url = url;
        }
        if let Ok(store) = std::env::var("MOSTRADOR_STORE") {
            self.store.default_store = store;
        }
        if let Ok(ms) = std::env::var("MOSTRADOR_DEBOUNCE_MS") {
            if let Ok(ms) = ms.parse() {
                self.persistence.debounce_ms = ms;
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.store.default_store, "BA001GC");
        assert_eq!(config.persistence.debounce_ms, 400);
        assert_eq!(
            config.persistence.conflict_policy,
            ConflictPolicyKind::RemoteWins
        );
    }

    #[test]
    fn test_parse_toml() {
        let raw = r#"
            [backend]
            base_url = "https://pos.example.com"

            [persistence]
            debounce_ms = 250
            conflict_policy = "prompt"
        "#;
        let config: SessionConfig = toml::from_str(raw).unwrap();
        assert_eq!(config.backend.base_url, "https://pos.example.com");
        assert_eq!(config.persistence.debounce_ms, 250);
        assert_eq!(config.persistence.conflict_policy, ConflictPolicyKind::Prompt);
        // untouched sections keep their defaults
        assert_eq!(config.store.default_store, "BA001GC");
    }
}
