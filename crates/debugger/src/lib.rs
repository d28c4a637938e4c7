//! GDB/MI response dispatch and front-end state
//!
//! [`Session`] drives a [`transport::MiTransport`]; each batch of records it
//! receives goes through the [`Dispatcher`], which keeps the breakpoint,
//! source and register stores in sync and publishes [`Event`]s for the
//! front-end to render.
mod breakpoints;
pub mod classify;
pub mod commands;
mod disassembly;
mod dispatcher;
mod registers;
mod session;
mod source;
mod state;
pub mod status;
mod table;
pub mod text;

pub use breakpoints::BreakpointStore;
pub use disassembly::{DisassemblyRow, DisassemblyView};
pub use dispatcher::{DisplayedSource, Dispatcher, FollowUpRequest};
pub use registers::{Correlation, RegisterCorrelator, RegisterRow};
pub use session::Session;
pub use source::{FetchSource, Lookup, SourceFileCache, SourceFileEntry, SourceLine, SourceView};
pub use state::Event;
pub use table::Table;
