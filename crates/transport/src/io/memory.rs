//! In-memory transport implementation for testing

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, PoisonError},
};

use crossbeam_channel::{Receiver, Sender, TryRecvError};

use super::MiTransport;
use crate::{Batch, Commands, Request, TransportError, types::SourceFile};

type Files = Arc<Mutex<HashMap<String, Vec<String>>>>;

enum Reply {
    Records(Batch),
    Error(TransportError),
}

/// In-memory transport for testing
///
/// This transport uses channels to connect the front-end to a scripted
/// debugger without a backend process. Every request is forwarded to the
/// [`InMemoryDebugger`] half so tests can assert on what was sent, and each
/// command or poll consumes at most one queued reply. When no reply is
/// queued the request returns an empty batch, like a poll with no output.
pub struct InMemoryTransport {
    requests: Sender<Request>,
    replies: Receiver<Reply>,
    files: Files,
}

/// Debugger half of an in-memory transport
pub struct InMemoryDebugger {
    requests: Receiver<Request>,
    replies: Sender<Reply>,
    files: Files,
}

impl InMemoryTransport {
    /// Create a connected transport and scripted debugger
    pub fn pair() -> (Self, InMemoryDebugger) {
        let (request_tx, request_rx) = crossbeam_channel::unbounded();
        let (reply_tx, reply_rx) = crossbeam_channel::unbounded();
        let files = Files::default();

        let transport = Self {
            requests: request_tx,
            replies: reply_rx,
            files: Arc::clone(&files),
        };
        let debugger = InMemoryDebugger {
            requests: request_rx,
            replies: reply_tx,
            files,
        };
        (transport, debugger)
    }

    fn forward(&self, request: Request) -> Result<(), TransportError> {
        self.requests
            .send(request)
            .map_err(|_| TransportError::bad_request("gdb is not running"))
    }

    fn next_reply(&self) -> Result<Batch, TransportError> {
        match self.replies.try_recv() {
            Ok(Reply::Records(batch)) => Ok(batch),
            Ok(Reply::Error(e)) => Err(e),
            Err(TryRecvError::Empty) => Ok(Vec::new()),
            Err(TryRecvError::Disconnected) => {
                Err(TransportError::bad_request("gdb is not running"))
            }
        }
    }
}

impl MiTransport for InMemoryTransport {
    fn run_commands(&mut self, commands: &Commands) -> Result<Batch, TransportError> {
        self.forward(Request::RunGdbCommand {
            commands: commands.clone(),
        })?;
        self.next_reply()
    }

    fn poll(&mut self) -> Result<Batch, TransportError> {
        self.forward(Request::GetGdbResponse)?;
        self.next_reply()
    }

    fn stop(&mut self) -> Result<(), TransportError> {
        self.forward(Request::StopGdb)
    }

    fn read_file(&mut self, path: &str) -> Result<SourceFile, TransportError> {
        self.forward(Request::ReadFile {
            path: path.to_string(),
        })?;
        let files = self.files.lock().unwrap_or_else(PoisonError::into_inner);
        match files.get(path) {
            Some(lines) => Ok(SourceFile {
                source_code: lines.clone(),
                path: Some(path.to_string()),
            }),
            None => Err(TransportError::bad_request(format!(
                "File not found: {path}"
            ))),
        }
    }
}

impl InMemoryDebugger {
    /// Queue the batch returned by the next command or poll
    pub fn reply(&self, batch: Batch) {
        let _ = self.replies.send(Reply::Records(batch));
    }

    /// Queue a failure for the next command or poll
    pub fn fail(&self, error: TransportError) {
        let _ = self.replies.send(Reply::Error(error));
    }

    /// Make a source file available to [`MiTransport::read_file`]
    pub fn add_file<S: Into<String>>(&self, path: impl Into<String>, lines: impl IntoIterator<Item = S>) {
        self.files
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(path.into(), lines.into_iter().map(Into::into).collect());
    }

    /// Drain the requests received so far
    pub fn received(&self) -> Vec<Request> {
        self.requests.try_iter().collect()
    }
}
