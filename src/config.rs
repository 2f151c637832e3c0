//! Configuration for the emulator core

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::parser::TokenizerOptions;

/// Character encoding of the session byte stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Encoding {
    #[default]
    #[serde(rename = "utf-8")]
    Utf8,
    #[serde(rename = "latin-1")]
    Latin1,
}

/// Session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Initial width in columns
    pub columns: u16,
    /// Initial height in rows
    pub rows: u16,
    /// Distance between default tab stops
    pub tab_size: usize,
    pub encoding: Encoding,
    /// Treat bytes >= 0x80 as non-printable
    pub strict_7bit: bool,
    /// Abort-and-replay cycles before pending bytes become an error token
    pub max_sequence_replays: u32,
    /// Longest window title or icon name kept
    pub max_graph_mode_len: usize,
    /// Reply to ENQ; empty sends nothing
    pub answerback: String,
    /// Reply to primary device attributes (`ESC [ c`)
    pub primary_da: String,
    /// Reply to secondary device attributes (`ESC [ > c`)
    pub secondary_da: String,
    /// Program started by `vterm-run` when no command is given
    pub shell: Option<String>,
    /// Fallback `tracing` filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            columns: 80,
            rows: 24,
            tab_size: 8,
            encoding: Encoding::Utf8,
            strict_7bit: false,
            max_sequence_replays: 8,
            max_graph_mode_len: 1024,
            answerback: String::new(),
            primary_da: "\x1b[?1;2c".to_string(),
            secondary_da: "\x1b[>0;95;0c".to_string(),
            shell: None,
            log_filter: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load `~/.config/vterm/config.json`, or the defaults when it is
    /// missing or unreadable
    pub fn load_or_default() -> Self {
        let Some(path) = default_config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("ignoring {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Tokenizer switches derived from this configuration
    pub fn tokenizer_options(&self) -> TokenizerOptions {
        TokenizerOptions {
            utf8: self.encoding == Encoding::Utf8,
            strict_7bit: self.strict_7bit,
            max_sequence_replays: self.max_sequence_replays,
            max_graph_mode_len: self.max_graph_mode_len,
        }
    }

    /// Shell to run: the configured one, then `$SHELL`, then `/bin/sh`
    pub fn shell_command(&self) -> String {
        self.shell
            .clone()
            .or_else(|| std::env::var("SHELL").ok())
            .unwrap_or_else(|| "/bin/sh".to_string())
    }
}

/// Location of the user configuration file
pub fn default_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("vterm")
            .join("config.json")
    })
}

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.columns, 80);
        assert_eq!(config.rows, 24);
        assert_eq!(config.tab_size, 8);
        assert_eq!(config.primary_da, "\x1b[?1;2c");
        assert!(config.answerback.is_empty());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config = serde_json::from_str(r#"{"rows": 50, "encoding": "latin-1"}"#).unwrap();
        assert_eq!(config.rows, 50);
        assert_eq!(config.columns, 80);
        assert_eq!(config.encoding, Encoding::Latin1);
        assert!(!config.tokenizer_options().utf8);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config {
            columns: 132,
            answerback: "vterm".to_string(),
            max_sequence_replays: 3,
            ..Config::default()
        };
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.tokenizer_options().max_sequence_replays, 3);
    }

    #[test]
    fn test_load_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.json");
        assert!(matches!(Config::load(&missing), Err(ConfigError::Io(_))));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{ not json").unwrap();
        assert!(matches!(Config::load(&broken), Err(ConfigError::Json(_))));
    }

    #[test]
    fn test_encoding_names() {
        assert_eq!(serde_json::to_string(&Encoding::Utf8).unwrap(), "\"utf-8\"");
        assert_eq!(serde_json::to_string(&Encoding::Latin1).unwrap(), "\"latin-1\"");
    }
}
