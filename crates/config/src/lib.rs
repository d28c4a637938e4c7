//! User configuration
//!
//! Read from `<config_dir>/mi-gui/config.toml`. Every setting is optional:
//!
//! ```toml
//! [disassembly]
//! context_lines = 10
//! mode = 4
//!
//! [history]
//! limit = 100
//!
//! [state]
//! path = "/home/me/.local/share/mi-gui/state.json"
//! ```
use std::path::{Path, PathBuf};

use eyre::WrapErr;
use serde::{Deserialize, Serialize};

const APP_DIR: &str = "mi-gui";
const CONFIG_FILE: &str = "config.toml";
const STATE_FILE: &str = "state.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub disassembly: Disassembly,
    pub history: History,
    pub state: State,
}

impl Config {
    /// Where persisted state lives, falling back to the platform data directory
    pub fn state_path(&self) -> eyre::Result<PathBuf> {
        if let Some(path) = &self.state.path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_local_dir()
            .ok_or_else(|| eyre::eyre!("could not determine local data directory"))?;
        Ok(data_dir.join(APP_DIR).join(STATE_FILE))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Disassembly {
    /// Lines above the current line to start disassembling from
    pub context_lines: usize,
    /// `-data-disassemble` output mode
    pub mode: u8,
}

impl Default for Disassembly {
    fn default() -> Self {
        Self {
            context_lines: 10,
            mode: 4,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct History {
    /// Maximum number of remembered commands and binaries
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct State {
    pub path: Option<PathBuf>,
}

/// Default location of the config file
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE))
}

/// Load the config file from its default location
///
/// A missing file is not an error: the defaults are used instead.
pub fn load() -> eyre::Result<Config> {
    match default_path() {
        Some(path) if path.is_file() => load_from(&path),
        Some(path) => {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            Ok(Config::default())
        }
        None => {
            tracing::warn!("cannot determine config directory, using defaults");
            Ok(Config::default())
        }
    }
}

pub fn load_from(path: impl AsRef<Path>) -> eyre::Result<Config> {
    let path = path.as_ref();
    tracing::debug!(path = %path.display(), "loading config");
    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("reading config file {}", path.display()))?;
    parse(&contents).wrap_err_with(|| format!("parsing config file {}", path.display()))
}

pub fn parse(contents: &str) -> eyre::Result<Config> {
    toml::from_str(contents).wrap_err("invalid config")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.disassembly.context_lines, 10);
        assert_eq!(config.disassembly.mode, 4);
        assert_eq!(config.history.limit, None);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = parse(
            r#"
            [disassembly]
            mode = 5

            [history]
            limit = 20
            "#,
        )
        .unwrap();
        assert_eq!(config.disassembly.context_lines, 10);
        assert_eq!(config.disassembly.mode, 5);
        assert_eq!(config.history.limit, Some(20));
    }

    #[test]
    fn explicit_state_path() {
        let config = parse("[state]\npath = \"/tmp/state.json\"\n").unwrap();
        assert_eq!(
            config.state_path().unwrap(),
            PathBuf::from("/tmp/state.json")
        );
    }

    #[test]
    fn unknown_keys_are_rejected() {
        assert!(parse("[disassembly]\ncontext = 3\n").is_err());
    }
}
