//! Replay a recorded GDB/MI session through the dispatcher
//!
//! Every batch in the recording is delivered by a poll, and the events the
//! session publishes are written out as they are produced.
use std::io::Write;

use debugger::{Event, Session, Table};
use eyre::WrapErr;
use transport::ReplayTransport;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Counts gathered while replaying
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub batches: usize,
    pub events: usize,
}

/// Execute everything queued on the session, then poll until the recording is exhausted
pub fn replay(
    session: &mut Session<ReplayTransport>,
    mut out: impl Write,
    format: Format,
) -> eyre::Result<Summary> {
    let events = session.events();
    let mut summary = Summary::default();

    loop {
        session.process_pending();
        for event in events.try_iter() {
            write_event(&mut out, &event, format).wrap_err("writing event")?;
            summary.events += 1;
        }

        if session.transport().remaining() == 0 {
            break;
        }
        session.poll();
        summary.batches += 1;
    }

    tracing::debug!(?summary, "replay finished");
    Ok(summary)
}

pub fn write_event(out: &mut impl Write, event: &Event, format: Format) -> eyre::Result<()> {
    match format {
        Format::Json => {
            serde_json::to_writer(&mut *out, event).wrap_err("serialising event")?;
            writeln!(out)?;
        }
        Format::Text => {
            for line in render_text(event) {
                writeln!(out, "{line}")?;
            }
        }
    }
    Ok(())
}

/// Human readable lines for one event
pub fn render_text(event: &Event) -> Vec<String> {
    match event {
        Event::ProgramOutput(output) => prefixed("output", output),
        Event::Console(text) => prefixed("console", text),
        Event::MiRecord(record) => match serde_json::to_string(record) {
            Ok(json) => vec![format!("[mi] {json}")],
            Err(e) => vec![format!("[mi] <unprintable record: {e}>")],
        },
        Event::Breakpoints(table) => titled("breakpoints", table),
        Event::Stack(table) => titled("stack", table),
        Event::Source(view) => {
            let mut lines = vec![match view.current_line {
                Some(line) => format!("[source] {}:{line}", view.fullname),
                None => format!("[source] {}", view.fullname),
            }];
            for line in &view.lines {
                if line.breakpoint || line.current {
                    let marker = match (line.breakpoint, line.current) {
                        (true, true) => "*>",
                        (true, false) => "* ",
                        _ => " >",
                    };
                    lines.push(format!("  {marker} {:>5} {}", line.number, line.text));
                }
            }
            lines
        }
        Event::Registers(rows) => {
            let mut lines = vec!["[registers]".to_string()];
            lines.extend(rows.iter().map(|r| format!("  {} = {}", r.name, r.value)));
            lines
        }
        Event::Disassembly(view) => {
            let mut lines = vec![format!(
                "[disassembly] {}",
                view.title.as_deref().unwrap_or("")
            )];
            for row in &view.rows {
                lines.push(format!("  line {}", row.line.as_deref().unwrap_or("?")));
                lines.extend(row.instructions.iter().map(|i| format!("    {i}")));
            }
            lines
        }
        Event::SourceFiles(files) => {
            let mut lines = vec!["[files]".to_string()];
            lines.extend(files.iter().map(|f| format!("  {f}")));
            lines
        }
        Event::Status(status) => vec![format!("[status] {status}")],
        Event::Cleared => vec!["[cleared]".to_string()],
    }
}

fn prefixed(label: &str, text: &str) -> Vec<String> {
    text.trim_end_matches('\n')
        .split('\n')
        .map(|l| format!("[{label}] {l}"))
        .collect()
}

fn titled(label: &str, table: &Table) -> Vec<String> {
    let mut lines = vec![format!("[{label}] {}", table.columns.join(" | "))];
    lines.extend(table.rows.iter().map(|r| format!("  {}", r.join(" | "))));
    lines
}
