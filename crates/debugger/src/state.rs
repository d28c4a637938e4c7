use serde::Serialize;
use transport::ProtocolRecord;

use crate::{
    disassembly::DisassemblyView, registers::RegisterRow, source::SourceView, table::Table,
};

/// Updates published to the front-end
///
/// Stream events (`ProgramOutput`, `Console`, `MiRecord`) are sent in the
/// order their records arrived. View events are sent once per batch, after
/// every record has been applied, followed by the status line.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "body", rename_all = "snake_case")]
pub enum Event {
    ProgramOutput(String),
    Console(String),
    /// A record exactly as received, for the MI log pane
    MiRecord(ProtocolRecord),
    Breakpoints(Table),
    Source(SourceView),
    Stack(Table),
    Registers(Vec<RegisterRow>),
    Disassembly(DisassemblyView),
    SourceFiles(Vec<String>),
    Status(String),
    /// All session state was discarded
    Cleared,
}

impl Event {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status(message.into())
    }
}
