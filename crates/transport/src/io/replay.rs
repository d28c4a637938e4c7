//! Transport that replays a recorded session

use std::{
    collections::VecDeque,
    io::BufRead,
    path::{Path, PathBuf},
};

use eyre::WrapErr;

use super::{MiTransport, read_local_file};
use crate::{Batch, Commands, TransportError, types::SourceFile};

/// Replays a recording, one batch per command or poll
///
/// A recording is a JSON-lines document where every non-blank line is one
/// batch (a JSON array of records). Commands are not executed; they only
/// advance the recording. Source files are read from the local filesystem,
/// optionally relative to a source root.
#[derive(Debug, Default)]
pub struct ReplayTransport {
    batches: VecDeque<Batch>,
    sent: Vec<Commands>,
    source_root: Option<PathBuf>,
    stopped: bool,
}

impl ReplayTransport {
    pub fn from_reader(reader: impl BufRead) -> eyre::Result<Self> {
        let mut batches = VecDeque::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line.wrap_err("reading recording")?;
            if line.trim().is_empty() {
                continue;
            }
            let batch: Batch = serde_json::from_str(&line)
                .with_context(|| format!("parsing batch on line {}", i + 1))?;
            batches.push_back(batch);
        }
        tracing::debug!(batches = batches.len(), "loaded recording");

        Ok(Self {
            batches,
            ..Default::default()
        })
    }

    pub fn from_path(path: impl AsRef<Path>) -> eyre::Result<Self> {
        let path = path.as_ref();
        let f = std::fs::File::open(path)
            .with_context(|| format!("opening recording {}", path.display()))?;
        Self::from_reader(std::io::BufReader::new(f))
    }

    /// Resolve relative source paths against `root`
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    /// Number of batches not yet delivered
    pub fn remaining(&self) -> usize {
        self.batches.len()
    }

    /// Commands submitted so far
    pub fn sent(&self) -> &[Commands] {
        &self.sent
    }

    fn next_batch(&mut self) -> Result<Batch, TransportError> {
        if self.stopped {
            return Err(TransportError::bad_request("gdb is not running"));
        }
        Ok(self.batches.pop_front().unwrap_or_default())
    }
}

impl MiTransport for ReplayTransport {
    fn run_commands(&mut self, commands: &Commands) -> Result<Batch, TransportError> {
        tracing::debug!(%commands, "replaying response to commands");
        self.sent.push(commands.clone());
        self.next_batch()
    }

    fn poll(&mut self) -> Result<Batch, TransportError> {
        self.next_batch()
    }

    fn stop(&mut self) -> Result<(), TransportError> {
        if self.stopped {
            return Err(TransportError::bad_request("gdb is not running"));
        }
        self.stopped = true;
        self.batches.clear();
        Ok(())
    }

    fn read_file(&mut self, path: &str) -> Result<SourceFile, TransportError> {
        match &self.source_root {
            Some(root) if Path::new(path).is_relative() => read_local_file(root.join(path)),
            _ => read_local_file(path),
        }
    }
}
