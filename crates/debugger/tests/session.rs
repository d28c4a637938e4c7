use std::io::IsTerminal;

use debugger::{Event, Session};
use serde_json::json;
use tracing_subscriber::EnvFilter;
use transport::{Commands, InMemoryDebugger, InMemoryTransport, ProtocolRecord, Request};

#[ctor::ctor]
fn init() {
    let in_ci = std::env::var("CI")
        .map(|val| val == "true")
        .unwrap_or(false);

    if std::io::stderr().is_terminal() || in_ci {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    } else {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .json()
            .try_init();
    }

    // error traces
    let _ = color_eyre::install();
}

/// Session connected to a scripted debugger, with buffered events
struct SessionTestHarness {
    session: Session<InMemoryTransport>,
    gdb: InMemoryDebugger,
    events: crossbeam_channel::Receiver<Event>,
}

impl SessionTestHarness {
    fn new() -> Self {
        let (transport, gdb) = InMemoryTransport::pair();
        let session = Session::new(transport, &config::Config::default());
        let events = session.events();
        Self {
            session,
            gdb,
            events,
        }
    }

    fn drain(&self) -> Vec<Event> {
        self.events.try_iter().collect()
    }

    fn statuses(&self) -> Vec<String> {
        self.drain()
            .into_iter()
            .filter_map(|e| match e {
                Event::Status(s) => Some(s),
                _ => None,
            })
            .collect()
    }

    fn file_reads(&self) -> Vec<String> {
        self.gdb
            .received()
            .into_iter()
            .filter_map(|r| match r {
                Request::ReadFile { path } => Some(path),
                _ => None,
            })
            .collect()
    }

    fn breakpoint_numbers(&self) -> Vec<String> {
        self.session
            .dispatcher()
            .breakpoints()
            .iter()
            .map(|b| b.number.clone())
            .collect()
    }
}

fn batch(value: serde_json::Value) -> Vec<ProtocolRecord> {
    serde_json::from_value(value).unwrap()
}

fn bkpt(number: &str, fullname: &str, line: usize) -> serde_json::Value {
    json!({
        "number": number,
        "type": "breakpoint",
        "disp": "keep",
        "enabled": "y",
        "fullname": fullname,
        "line": line.to_string(),
    })
}

fn table(bkpts: Vec<serde_json::Value>) -> serde_json::Value {
    json!({"type": "result", "message": "done", "payload": {
        "BreakpointTable": {"nr_rows": bkpts.len().to_string(), "body": bkpts}
    }})
}

#[test]
fn test_breakpoint_table_is_authoritative() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();

    h.gdb.reply(batch(json!([table(vec![
        bkpt("3", "/src/a.c", 7),
        bkpt("1", "/src/a.c", 2),
    ])])));
    h.session.run_commands("-break-list");
    h.session.process_pending();

    assert_eq!(h.breakpoint_numbers(), vec!["3", "1"]);
    Ok(())
}

#[test]
fn test_insert_then_table_replaces() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();
    h.gdb.add_file("/src/a.c", ["int main() {", "  return 0;", "}"]);

    h.gdb.reply(batch(json!([
        {"type": "result", "message": "done", "payload": {"bkpt": bkpt("1", "/src/a.c", 2)}},
        table(vec![bkpt("2", "/src/a.c", 3)]),
    ])));
    h.session
        .run_commands(Commands::from(["-break-insert /src/a.c:2", "-break-list"]));
    h.session.process_pending();

    assert_eq!(h.breakpoint_numbers(), vec!["2"]);

    let views: Vec<_> = h
        .drain()
        .into_iter()
        .filter_map(|e| match e {
            Event::Source(view) => Some(view),
            _ => None,
        })
        .collect();
    // the file was fetched because of the insert, and rendered with the final table
    assert_eq!(views.len(), 1);
    assert_eq!(views[0].breakpoint_lines(), vec![3]);
    Ok(())
}

#[test]
fn test_fetches_are_not_coalesced_but_cached() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();
    h.gdb.add_file("/src/a.c", ["a", "b"]);

    h.session.open_source_file("/src/a.c");
    h.session.open_source_file("/src/a.c");
    h.session.process_pending();
    assert_eq!(h.file_reads(), vec!["/src/a.c", "/src/a.c"]);

    h.session.open_source_file("/src/a.c");
    h.session.process_pending();
    assert!(h.file_reads().is_empty());
    assert_eq!(h.session.dispatcher().sources().len(), 1);
    Ok(())
}

#[test]
fn test_stop_highlights_and_exit_clears_line() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();
    h.gdb
        .add_file("/src/hello.c", (1..=20).map(|i| format!("line {i}")));

    h.gdb.reply(batch(json!([
        {"type": "notify", "message": "stopped", "payload": {
            "reason": "breakpoint-hit",
            "bkptno": "1",
            "frame": {"addr": "0x1", "func": "main", "file": "hello.c", "fullname": "/src/hello.c", "line": "10"},
        }},
    ])));
    h.session.poll();
    h.session.process_pending();

    let events = h.drain();
    let view = events
        .iter()
        .find_map(|e| match e {
            Event::Source(view) => Some(view),
            _ => None,
        })
        .expect("source view after fetch");
    assert_eq!(view.highlighted().map(|l| l.number), Some(10));
    assert!(events.contains(&Event::status(
        "stopped, breakpoint-hit, file: hello.c, func: main, line: 10"
    )));

    h.gdb.reply(batch(json!([
        {"type": "notify", "message": "stopped", "payload": {"reason": "exited-normally"}},
    ])));
    h.session.poll();
    h.session.process_pending();

    let events = h.drain();
    let view = events
        .iter()
        .find_map(|e| match e {
            Event::Source(view) => Some(view),
            _ => None,
        })
        .expect("re-rendered source view");
    assert!(view.highlighted().is_none());
    assert_eq!(events.last(), Some(&Event::status("stopped, exited-normally")));
    assert!(h.file_reads().iter().filter(|p| *p == "/src/hello.c").count() == 1);
    Ok(())
}

#[test]
fn test_status_sequence_for_command() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();

    h.gdb.reply(batch(json!([
        {"type": "result", "message": "error", "payload": {"msg": "No symbol table is loaded."}},
    ])));
    h.session.run_commands("info locals");
    h.session.process_pending();

    assert_eq!(
        h.statuses(),
        vec!["running command \"info locals\"", "error, No symbol table is loaded."]
    );
    Ok(())
}

#[test]
fn test_blank_command_is_ignored() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();
    h.session.run_commands("   ");
    assert_eq!(h.session.process_pending(), 0);
    assert!(h.gdb.received().is_empty());
    Ok(())
}

#[test]
fn test_empty_poll_keeps_previous_status() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();
    h.session.poll();
    h.session.process_pending();

    assert_eq!(h.statuses(), vec!["Getting GDB response"]);
    Ok(())
}

#[test]
fn test_transport_failure_becomes_status() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();

    h.session.open_source_file("/missing.c");
    h.session.process_pending();
    assert_eq!(h.statuses(), vec!["File not found: /missing.c"]);

    h.gdb
        .fail(transport::TransportError::Status {
            code: 500,
            status_text: "INTERNAL SERVER ERROR".to_string(),
            message: None,
        });
    h.session.poll();
    h.session.process_pending();
    assert_eq!(
        h.statuses(),
        vec!["Getting GDB response", "INTERNAL SERVER ERROR (500 error)"]
    );
    Ok(())
}

#[test]
fn test_toggle_breakpoint_round_trip() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();
    h.gdb.add_file("/src/a.c", ["a", "b", "c", "d"]);
    h.session.open_source_file("/src/a.c");
    h.session.process_pending();
    h.gdb.received();

    h.gdb.reply(batch(json!([
        {"type": "result", "message": "done", "payload": {"bkpt": bkpt("1", "/src/a.c", 3)}},
    ])));
    h.session.toggle_breakpoint(3);
    h.session.process_pending();

    h.gdb.reply(batch(json!([{"type": "result", "message": "done", "payload": null}])));
    h.session.toggle_breakpoint(3);
    h.session.process_pending();

    let commands: Vec<_> = h
        .gdb
        .received()
        .into_iter()
        .filter_map(|r| match r {
            Request::RunGdbCommand { commands } => Some(commands),
            _ => None,
        })
        .collect();
    assert_eq!(
        commands,
        vec![
            Commands::from(["-break-insert /src/a.c:3", "-break-list"]),
            Commands::from(["-break-delete 1", "-break-list"]),
        ]
    );
    Ok(())
}

#[test]
fn test_refresh_disassembly_uses_config() -> eyre::Result<()> {
    let (transport, gdb) = InMemoryTransport::pair();
    let config = config::parse("[disassembly]\ncontext_lines = 3\nmode = 5\n")?;
    let mut session = Session::new(transport, &config);
    let events = session.events();

    session.refresh_disassembly();
    session.process_pending();
    assert!(gdb.received().is_empty());
    assert!(matches!(events.try_recv(), Ok(Event::Status(_))));

    gdb.add_file("/src/a.c", (1..=10).map(|i| i.to_string()));
    gdb.reply(batch(json!([
        {"type": "notify", "message": "stopped", "payload": {
            "frame": {"fullname": "/src/a.c", "file": "a.c", "line": "8"},
        }},
    ])));
    session.poll();
    session.process_pending();
    gdb.received();

    session.refresh_disassembly();
    session.process_pending();
    assert_eq!(
        gdb.received(),
        vec![Request::RunGdbCommand {
            commands: Commands::from("-data-disassemble -f /src/a.c -l 5 -- 5"),
        }]
    );
    Ok(())
}

#[test]
fn test_stop_clears_state() -> eyre::Result<()> {
    let mut h = SessionTestHarness::new();
    h.gdb.reply(batch(json!([table(vec![bkpt("1", "/src/a.c", 1)])])));
    h.session.run_commands("-break-list");
    h.session.process_pending();
    h.drain();

    h.session.stop();
    h.session.process_pending();

    assert!(h.session.dispatcher().breakpoints().is_empty());
    assert_eq!(
        h.drain(),
        vec![Event::Cleared, Event::status("gdb has exited")]
    );
    Ok(())
}
