//! IO abstraction layer for the GDB/MI transport
//!
//! The front-end never talks to GDB directly. It submits commands, polls for
//! output, stops the debugger and fetches source files through a backend. The
//! [`MiTransport`] trait abstracts over that backend so the session logic can
//! run against a live backend, a recorded session, or an in-memory fake.
//!
//! # Examples
//!
//! ## Using In-Memory Transport for Testing
//!
//! ```
//! use transport::{InMemoryTransport, MiTransport, ProtocolRecord, RecordType};
//!
//! let (mut client, debugger) = InMemoryTransport::pair();
//! debugger.reply(vec![ProtocolRecord::new(RecordType::Result).with_message("done")]);
//!
//! let records = client.run_commands(&"-break-list".into())?;
//! assert_eq!(records.len(), 1);
//! # Ok::<(), transport::TransportError>(())
//! ```

use std::path::Path;

use crate::{Batch, Commands, TransportError, types::SourceFile};

mod memory;
mod replay;

pub use memory::{InMemoryDebugger, InMemoryTransport};
pub use replay::ReplayTransport;

/// Request/response channel to a debugger backend
///
/// Every method is a single round trip. A batch returned from
/// [`MiTransport::run_commands`] or [`MiTransport::poll`] holds the records in
/// the order the debugger emitted them; an empty batch is valid.
pub trait MiTransport {
    /// Submit commands to be run in order
    fn run_commands(&mut self, commands: &Commands) -> Result<Batch, TransportError>;

    /// Collect output produced since the previous request
    fn poll(&mut self) -> Result<Batch, TransportError>;

    /// Terminate the debugger
    fn stop(&mut self) -> Result<(), TransportError>;

    /// Fetch a source file by absolute path
    fn read_file(&mut self, path: &str) -> Result<SourceFile, TransportError>;
}

impl<T: MiTransport + ?Sized> MiTransport for Box<T> {
    fn run_commands(&mut self, commands: &Commands) -> Result<Batch, TransportError> {
        (**self).run_commands(commands)
    }

    fn poll(&mut self) -> Result<Batch, TransportError> {
        (**self).poll()
    }

    fn stop(&mut self) -> Result<(), TransportError> {
        (**self).stop()
    }

    fn read_file(&mut self, path: &str) -> Result<SourceFile, TransportError> {
        (**self).read_file(path)
    }
}

/// Read a source file from the local filesystem, one entry per line
pub fn read_local_file(path: impl AsRef<Path>) -> Result<SourceFile, TransportError> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(TransportError::bad_request(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path)?;
    Ok(SourceFile {
        source_code: contents.lines().map(str::to_string).collect(),
        path: Some(path.display().to_string()),
    })
}
