//! The state module handles persisting what the user did between sessions:
//! the binaries they debugged and the commands they issued.

use std::{
    io::Read,
    io::Write,
    path::{Path, PathBuf},
};

use eyre::Context;
use serde::{Deserialize, Deserializer, Serialize};

pub const CURRENT_VERSION: &str = "1";

pub struct StateManager {
    save_path: PathBuf,
    current: Persistence,
}

impl StateManager {
    pub fn new(path: impl Into<PathBuf>) -> eyre::Result<Self> {
        let path = path.into();
        let span = tracing::debug_span!("StateManager", state_path = %path.display());
        let _guard = span.enter();

        if !path.exists() {
            tracing::debug!("no state file, creating one");
            let state = Persistence::default();
            crate::save_to(&state, &path).wrap_err("saving state file")?;
            return Ok(Self {
                save_path: path,
                current: state,
            });
        }

        tracing::debug!("attempting to load state");
        let state = crate::load_from(&path).wrap_err("loading state file")?;
        tracing::debug!(
            binaries = state.past_binaries.len(),
            history = state.history.len(),
            "state loaded"
        );
        Ok(Self {
            save_path: path,
            current: state,
        })
    }

    pub fn load(mut self) -> eyre::Result<Self> {
        let state = crate::load_from(&self.save_path).wrap_err("loading state")?;
        self.current = state;
        Ok(self)
    }

    pub fn save(self) -> eyre::Result<Self> {
        crate::save_to(&self.current, &self.save_path).wrap_err("saving state")?;
        Ok(self)
    }

    pub fn current(&self) -> &Persistence {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Persistence {
        &mut self.current
    }

    pub fn path(&self) -> &Path {
        &self.save_path
    }
}

/// State that is persisted
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Persistence {
    pub version: String,
    /// Executables loaded into GDB, most recent first
    #[serde(default)]
    pub past_binaries: RecentList,
    /// Commands issued, most recent first
    #[serde(default)]
    pub history: RecentList,
}

impl Default for Persistence {
    fn default() -> Self {
        Self {
            version: CURRENT_VERSION.to_string(),
            past_binaries: RecentList::default(),
            history: RecentList::default(),
        }
    }
}

impl Persistence {
    pub fn record_binary(&mut self, path: impl Into<String>, limit: Option<usize>) {
        self.past_binaries.push(path);
        self.past_binaries.truncate(limit);
    }

    pub fn record_command(&mut self, command: impl Into<String>, limit: Option<usize>) {
        self.history.push(command);
        self.history.truncate(limit);
    }
}

/// Most-recent-first list without duplicates
#[derive(Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(transparent)]
pub struct RecentList(Vec<String>);

impl RecentList {
    /// Put `item` at the front, moving it there if it is already present
    pub fn push(&mut self, item: impl Into<String>) {
        let item = item.into();
        self.0.retain(|existing| existing != &item);
        self.0.insert(0, item);
    }

    /// Drop the oldest entries beyond `limit`
    pub fn truncate(&mut self, limit: Option<usize>) {
        if let Some(limit) = limit {
            self.0.truncate(limit);
        }
    }

    pub fn most_recent(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }
}

impl FromIterator<String> for RecentList {
    /// Keeps the first occurrence of each item
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut items: Vec<String> = Vec::new();
        for item in iter {
            if !items.contains(&item) {
                items.push(item);
            }
        }
        Self(items)
    }
}

impl<'de> Deserialize<'de> for RecentList {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<String>::deserialize(deserializer)?;
        Ok(items.into_iter().collect())
    }
}

pub fn save(state: &Persistence, writer: impl Write) -> eyre::Result<()> {
    serde_json::to_writer(writer, state).context("saving session state")?;
    Ok(())
}

pub fn save_to(state: &Persistence, path: impl AsRef<Path>) -> eyre::Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating state directory {}", parent.display()))?;
    }
    let f = std::fs::File::create(path).context("creating file for saving")?;
    save(state, &f).context("saving state")?;
    Ok(())
}

pub fn load(reader: impl Read) -> eyre::Result<Persistence> {
    let st = serde_json::from_reader(reader).context("reading session state")?;
    Ok(st)
}

pub fn load_from(path: impl AsRef<Path>) -> eyre::Result<Persistence> {
    let path = path.as_ref();
    let f = std::fs::File::open(path)
        .with_context(|| format!("opening save state {}", path.display()))?;
    let state = load(f).context("reading from state file")?;
    Ok(state)
}
