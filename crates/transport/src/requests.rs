//! Requests sent from the front-end to the debugger backend
use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "request", rename_all = "snake_case")]
pub enum Request {
    /// Run one or more commands, in order
    RunGdbCommand { commands: Commands },
    /// Collect whatever output the debugger produced since the last request
    GetGdbResponse,
    /// Terminate the debugger process
    StopGdb,
    /// Fetch the contents of a source file by absolute path
    ReadFile { path: String },
}

/// One command, or an ordered list of commands to run in sequence
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Commands(Vec<String>);

impl Commands {
    /// True when there is nothing but whitespace to send
    pub fn is_blank(&self) -> bool {
        self.0.iter().all(|c| c.trim().is_empty())
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
}

impl fmt::Display for Commands {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(", "))
    }
}

impl From<&str> for Commands {
    fn from(value: &str) -> Self {
        Self(vec![value.to_string()])
    }
}

impl From<String> for Commands {
    fn from(value: String) -> Self {
        Self(vec![value])
    }
}

impl From<Vec<String>> for Commands {
    fn from(value: Vec<String>) -> Self {
        Self(value)
    }
}

impl<const N: usize> From<[&str; N]> for Commands {
    fn from(value: [&str; N]) -> Self {
        Self(value.iter().map(|s| s.to_string()).collect())
    }
}

impl FromIterator<String> for Commands {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
