//! GDB/MI transport
//!
//! This crate contains the wire types of a GDB/MI session as delivered to the
//! front-end, and the transport abstraction used to exchange them.
mod error;
pub mod io;
pub mod records;
pub mod requests;
pub mod types;

pub use error::TransportError;
pub use io::{InMemoryDebugger, InMemoryTransport, MiTransport, ReplayTransport};
pub use records::{Batch, Payload, ProtocolRecord, RecordType, ResultData, StructuredPayload};
pub use requests::{Commands, Request};
