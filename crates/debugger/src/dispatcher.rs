//! Batch dispatch
//!
//! A batch is processed in two phases. The apply phase walks the records in
//! arrival order, classifies each one and mutates the stores accordingly,
//! remembering which views went stale. The render phase then derives each
//! stale view once from the stores and publishes it, and finally the status
//! line is built from the last record.
//!
//! Anything that needs the transport (fetching a source file, issuing more
//! commands) is returned to the caller as a [`FollowUpRequest`] instead of
//! being performed here, so that processing a batch never blocks.
use crossbeam_channel::Sender;
use transport::{
    Commands, ProtocolRecord, RecordType, ResultData, TransportError,
    types::{AsmSourceLine, Frame, RegisterValue, SourceFileInfo},
};

use crate::{
    breakpoints::BreakpointStore,
    classify::{self, Tag},
    commands,
    disassembly::DisassemblyView,
    registers::RegisterCorrelator,
    source::{FetchSource, Lookup, SourceFileCache},
    state::Event,
    status,
    table::Table,
    text,
};

pub(crate) const MISSING_DISASSEMBLY_CONTEXT: &str =
    "Not sure which file and line to disassemble. Reach a breakpoint, then try again.";

pub(crate) const NO_SOURCE_FILE: &str = "No source file is displayed";

/// Work the dispatcher needs the transport for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FollowUpRequest {
    /// Read a source file; hand the result to [`Dispatcher::source_loaded`]
    FetchSource(FetchSource),
    /// Issue commands and dispatch their response
    RunCommands(Commands),
}

/// The file currently shown in the source pane
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedSource {
    pub fullname: String,
    pub line: Option<usize>,
}

/// Views made stale by the apply phase
#[derive(Debug, Default)]
struct Dirty {
    breakpoints: bool,
    source: bool,
    stack: Option<Vec<Frame>>,
    registers: Option<Vec<RegisterValue>>,
    disassembly: Option<Vec<AsmSourceLine>>,
    source_files: Option<Vec<SourceFileInfo>>,
}

pub struct Dispatcher {
    publisher: Sender<Event>,

    breakpoints: BreakpointStore,
    sources: SourceFileCache,
    registers: RegisterCorrelator,

    current_frame: Option<Frame>,
    displayed: Option<DisplayedSource>,
}

impl Dispatcher {
    pub fn new(publisher: Sender<Event>) -> Self {
        Self::with_stores(
            publisher,
            BreakpointStore::new(),
            SourceFileCache::new(),
            RegisterCorrelator::new(),
        )
    }

    pub fn with_stores(
        publisher: Sender<Event>,
        breakpoints: BreakpointStore,
        sources: SourceFileCache,
        registers: RegisterCorrelator,
    ) -> Self {
        Self {
            publisher,
            breakpoints,
            sources,
            registers,
            current_frame: None,
            displayed: None,
        }
    }

    pub fn breakpoints(&self) -> &BreakpointStore {
        &self.breakpoints
    }

    pub fn sources(&self) -> &SourceFileCache {
        &self.sources
    }

    pub fn registers(&self) -> &RegisterCorrelator {
        &self.registers
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.current_frame.as_ref()
    }

    pub fn displayed(&self) -> Option<&DisplayedSource> {
        self.displayed.as_ref()
    }

    /// Process one batch of records
    #[tracing::instrument(skip_all, fields(records = batch.len()))]
    pub fn dispatch(&mut self, batch: &[ProtocolRecord]) -> Vec<FollowUpRequest> {
        let mut dirty = Dirty::default();
        let mut follow_ups = Vec::new();

        for record in batch {
            self.apply(record, &mut dirty, &mut follow_ups);
        }

        self.render(dirty);

        if let Some(status) = status::for_batch(batch) {
            self.emit(Event::Status(status));
        }

        follow_ups
    }

    fn apply(
        &mut self,
        record: &ProtocolRecord,
        dirty: &mut Dirty,
        follow_ups: &mut Vec<FollowUpRequest>,
    ) {
        if record.kind != RecordType::Output {
            self.emit(Event::MiRecord(record.clone()));
        }

        for tag in classify::classify(record) {
            tracing::debug!(?tag, kind = ?record.kind, "applying record");
            match tag {
                Tag::ProgramOutput => {
                    if let Some(output) = record.text() {
                        self.emit(Event::ProgramOutput(text::normalise_output(output)));
                    }
                }
                Tag::ConsoleText => {
                    if let Some(console) = record.text() {
                        self.emit(Event::Console(text::unescape_console(console)));
                    }
                }
                Tag::AsynchronousStop => {
                    if let Some(frame) = record.frame() {
                        self.current_frame = Some(frame.clone());
                        match &frame.fullname {
                            Some(fullname) => {
                                self.open(fullname, frame.line, dirty, follow_ups);
                            }
                            None => tracing::debug!("stop frame has no source file"),
                        }
                    }
                }
                Tag::Other => {}
                structured => {
                    if let Some(payload) = record.structured() {
                        self.apply_result(structured, &payload.result, dirty, follow_ups);
                    }
                }
            }
        }

        if classify::reports_exit(record) {
            tracing::debug!("debuggee exited, clearing current line");
            if let Some(frame) = self.current_frame.as_mut() {
                frame.line = None;
            }
            if let Some(displayed) = self.displayed.clone() {
                self.open(&displayed.fullname, None, dirty, follow_ups);
            }
        }
    }

    fn apply_result(
        &mut self,
        tag: Tag,
        result: &ResultData,
        dirty: &mut Dirty,
        follow_ups: &mut Vec<FollowUpRequest>,
    ) {
        match result {
            ResultData::Breakpoint(bkpt) => {
                self.breakpoints.add(bkpt.clone());
                dirty.breakpoints = true;
                match (self.displayed.clone(), &bkpt.fullname) {
                    (Some(displayed), _) => {
                        self.open(&displayed.fullname, displayed.line, dirty, follow_ups)
                    }
                    (None, Some(fullname)) => self.open(fullname, None, dirty, follow_ups),
                    (None, None) => {}
                }
            }
            ResultData::BreakpointTable(table) => {
                self.breakpoints.replace_all(table.body.clone());
                dirty.breakpoints = true;
                if let Some(displayed) = self.displayed.clone() {
                    self.open(&displayed.fullname, displayed.line, dirty, follow_ups);
                }
            }
            ResultData::Stack(frames) => dirty.stack = Some(frames.clone()),
            ResultData::RegisterNames(names) => self.registers.set_names(names.clone()),
            ResultData::RegisterValues(values) => {
                if self.registers.has_names() {
                    dirty.registers = Some(values.clone());
                } else {
                    tracing::debug!("register values before register names, ignoring");
                }
            }
            ResultData::Disassembly(lines) => dirty.disassembly = Some(lines.clone()),
            ResultData::Files(files) => dirty.source_files = Some(files.clone()),
            ResultData::Unknown => {
                tracing::debug!(?tag, "tag without matching result data");
            }
        }
    }

    /// Show `fullname` with `line` highlighted, fetching it first if needed
    fn open(
        &mut self,
        fullname: &str,
        line: Option<usize>,
        dirty: &mut Dirty,
        follow_ups: &mut Vec<FollowUpRequest>,
    ) {
        match self.sources.get_or_fetch(fullname, line) {
            Lookup::Cached(_) => {
                self.displayed = Some(DisplayedSource {
                    fullname: fullname.to_string(),
                    line,
                });
                dirty.source = true;
            }
            Lookup::Fetch(fetch) => follow_ups.push(FollowUpRequest::FetchSource(fetch)),
        }
    }

    fn render(&mut self, dirty: Dirty) {
        if dirty.breakpoints {
            self.emit(Event::Breakpoints(self.breakpoints.table()));
        }

        if let Some(frames) = dirty.stack {
            self.emit(Event::Stack(Table::from_serializable(&frames)));
        }

        if let Some(values) = dirty.registers {
            if let Some(correlation) = self.registers.correlate(&values) {
                self.emit(Event::Registers(correlation.rows));
            }
        }

        if let Some(lines) = dirty.disassembly {
            self.emit(Event::Disassembly(DisassemblyView::derive(&lines)));
        }

        if let Some(files) = dirty.source_files {
            let mut paths: Vec<String> = files.into_iter().filter_map(|f| f.fullname).collect();
            paths.sort();
            paths.dedup();
            self.emit(Event::SourceFiles(paths));
        }

        if dirty.source {
            self.render_source();
        }
    }

    fn render_source(&mut self) {
        let Some(displayed) = &self.displayed else {
            return;
        };
        match self
            .sources
            .render_target(&displayed.fullname, displayed.line, &self.breakpoints)
        {
            Some(view) => self.emit(Event::Source(view)),
            None => tracing::warn!(fullname = %displayed.fullname, "displayed file is not cached"),
        }
    }

    /// Store fetched source content and show it
    ///
    /// A file fetched for a stop frame is highlighted at the frame's line as
    /// it is now, which is no line once the debuggee has exited. If the
    /// debuggee has since stopped in another file the content is only cached.
    #[tracing::instrument(skip(self, lines), fields(lines = lines.len()))]
    pub fn source_loaded(&mut self, fetch: FetchSource, lines: Vec<String>) {
        self.sources.insert(fetch.fullname.clone(), lines);

        let line = match fetch.line {
            None => None,
            Some(_) => match self
                .current_frame
                .as_ref()
                .filter(|frame| frame.fullname.as_deref() == Some(fetch.fullname.as_str()))
            {
                Some(frame) => frame.line,
                None => {
                    tracing::debug!(fullname = %fetch.fullname, "stop frame moved on, not displaying");
                    return;
                }
            },
        };

        self.displayed = Some(DisplayedSource {
            fullname: fetch.fullname,
            line,
        });
        self.render_source();
    }

    /// Open a file with no highlighted line
    pub fn open_source_file(&mut self, fullname: &str) -> Vec<FollowUpRequest> {
        let mut dirty = Dirty::default();
        let mut follow_ups = Vec::new();
        self.open(fullname, None, &mut dirty, &mut follow_ups);
        self.render(dirty);
        follow_ups
    }

    /// Commands that toggle a breakpoint on `line` of the displayed file
    ///
    /// Existing breakpoints on the line are deleted; otherwise one is inserted.
    /// Either way the store is refreshed from a full listing afterwards.
    pub fn toggle_breakpoint(&mut self, line: usize) -> Option<Commands> {
        let Some(displayed) = &self.displayed else {
            self.emit(Event::status(NO_SOURCE_FILE));
            return None;
        };

        let existing = self.breakpoints.find(&displayed.fullname, line);
        let mut cmds: Vec<String> = if existing.is_empty() {
            vec![commands::break_insert(&displayed.fullname, line)]
        } else {
            existing
                .iter()
                .map(|b| commands::break_delete(&b.number))
                .collect()
        };
        cmds.push(commands::BREAK_LIST.to_string());
        Some(Commands::from(cmds))
    }

    /// Command that disassembles around the displayed line
    pub fn disassembly_command(&mut self, context_lines: usize, mode: u8) -> Option<String> {
        if let Some(DisplayedSource {
            fullname,
            line: Some(line),
        }) = &self.displayed
        {
            return Some(commands::data_disassemble(
                fullname,
                *line,
                context_lines,
                mode,
            ));
        }
        self.emit(Event::status(MISSING_DISASSEMBLY_CONTEXT));
        None
    }

    /// Report a failed transport operation on the status line
    pub fn transport_failed(&mut self, error: &TransportError) {
        tracing::debug!(%error, "transport request failed");
        self.emit(Event::Status(error.status_message()));
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.emit(Event::Status(status.into()));
    }

    /// Forget everything learned from the debugger
    pub fn clear(&mut self) {
        self.breakpoints.clear();
        self.sources.clear();
        self.registers.clear();
        self.current_frame = None;
        self.displayed = None;
        self.emit(Event::Cleared);
    }

    pub(crate) fn emit(&mut self, event: Event) {
        let _ = self.publisher.send(event);
    }
}
