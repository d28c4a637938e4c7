use std::{collections::VecDeque, path::Path};

use transport::{Batch, Commands, MiTransport};

use crate::{
    commands,
    dispatcher::{Dispatcher, FollowUpRequest},
    state::Event,
};

pub(crate) const POLLING: &str = "Getting GDB response";
pub(crate) const EXITED: &str = "gdb has exited";

#[derive(Debug, Clone, PartialEq, Eq)]
enum Pending {
    FollowUp(FollowUpRequest),
    Poll,
    Stop,
}

impl From<FollowUpRequest> for Pending {
    fn from(request: FollowUpRequest) -> Self {
        Self::FollowUp(request)
    }
}

/// A front-end session with one GDB process
///
/// Operations are queued and executed in order by [`Session::process_pending`].
/// Responses are handed to the dispatcher, and any follow-up work it asks for
/// joins the back of the same queue. Transport failures never stop
/// processing; they are reported on the status line.
pub struct Session<T> {
    transport: T,
    dispatcher: Dispatcher,
    pending: VecDeque<Pending>,
    disassembly: config::Disassembly,
    events: crossbeam_channel::Receiver<Event>,
}

impl<T> Session<T>
where
    T: MiTransport,
{
    pub fn new(transport: T, config: &config::Config) -> Self {
        let (tx, rx) = crossbeam_channel::unbounded();
        Self::with_dispatcher(transport, Dispatcher::new(tx), rx, config)
    }

    pub fn with_dispatcher(
        transport: T,
        dispatcher: Dispatcher,
        events: crossbeam_channel::Receiver<Event>,
        config: &config::Config,
    ) -> Self {
        Self {
            transport,
            dispatcher,
            pending: VecDeque::new(),
            disassembly: config.disassembly.clone(),
            events,
        }
    }

    pub fn events(&self) -> crossbeam_channel::Receiver<Event> {
        self.events.clone()
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Number of queued operations
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    pub fn run_commands(&mut self, commands: impl Into<Commands>) {
        let commands = commands.into();
        if commands.is_blank() {
            tracing::debug!("ignoring blank command");
            return;
        }
        self.enqueue(FollowUpRequest::RunCommands(commands));
    }

    pub fn poll(&mut self) {
        self.enqueue(Pending::Poll);
    }

    pub fn stop(&mut self) {
        self.enqueue(Pending::Stop);
    }

    /// Show a file in the source pane with no line highlighted
    ///
    /// A leading `~` is expanded to the home directory.
    pub fn open_source_file(&mut self, path: &str) {
        let path = expand_tilde(Path::new(path));
        let follow_ups = self.dispatcher.open_source_file(&path);
        self.pending.extend(follow_ups.into_iter().map(Pending::from));
    }

    /// Add a breakpoint on `line` of the displayed file, or remove the ones there
    pub fn toggle_breakpoint(&mut self, line: usize) {
        if let Some(commands) = self.dispatcher.toggle_breakpoint(line) {
            self.enqueue(FollowUpRequest::RunCommands(commands));
        }
    }

    /// Disassemble around the current line of the displayed file
    pub fn refresh_disassembly(&mut self) {
        let config::Disassembly {
            context_lines,
            mode,
        } = self.disassembly;
        if let Some(command) = self.dispatcher.disassembly_command(context_lines, mode) {
            self.enqueue(FollowUpRequest::RunCommands(command.into()));
        }
    }

    /// Load an executable and its symbols
    pub fn set_target_binary(&mut self, path: &str) {
        let path = expand_tilde(Path::new(path));
        self.enqueue(FollowUpRequest::RunCommands(
            commands::file_exec_and_symbols(&path).into(),
        ));
    }

    fn enqueue(&mut self, request: impl Into<Pending>) {
        let request = request.into();
        tracing::trace!(?request, "queueing request");
        self.pending.push_back(request);
    }

    /// Execute queued operations, including any they trigger, until none remain
    ///
    /// Returns the number of operations executed.
    #[tracing::instrument(skip(self), fields(queued = self.pending.len()))]
    pub fn process_pending(&mut self) -> usize {
        let mut processed = 0;
        while let Some(request) = self.pending.pop_front() {
            self.execute(request);
            processed += 1;
        }
        tracing::debug!(processed, "queue drained");
        processed
    }

    fn execute(&mut self, request: Pending) {
        match request {
            Pending::FollowUp(FollowUpRequest::RunCommands(commands)) => {
                self.dispatcher
                    .set_status(format!("running command \"{commands}\""));
                match self.transport.run_commands(&commands) {
                    Ok(batch) => self.dispatch(&batch),
                    Err(e) => self.dispatcher.transport_failed(&e),
                }
            }
            Pending::FollowUp(FollowUpRequest::FetchSource(fetch)) => {
                match self.transport.read_file(&fetch.fullname) {
                    Ok(file) => self.dispatcher.source_loaded(fetch, file.source_code),
                    Err(e) => self.dispatcher.transport_failed(&e),
                }
            }
            Pending::Poll => {
                self.dispatcher.set_status(POLLING);
                match self.transport.poll() {
                    Ok(batch) => self.dispatch(&batch),
                    Err(e) => self.dispatcher.transport_failed(&e),
                }
            }
            Pending::Stop => match self.transport.stop() {
                Ok(()) => {
                    self.pending.clear();
                    self.dispatcher.clear();
                    self.dispatcher.set_status(EXITED);
                }
                Err(e) => self.dispatcher.transport_failed(&e),
            },
        }
    }

    fn dispatch(&mut self, batch: &Batch) {
        let follow_ups = self.dispatcher.dispatch(batch);
        self.pending.extend(follow_ups.into_iter().map(Pending::from));
    }
}

fn expand_tilde(path: &Path) -> String {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped).to_string_lossy().into_owned();
        }
        tracing::warn!("cannot determine home directory, using path as-is");
    }
    path.to_string_lossy().into_owned()
}
