//! GDB/MI command strings issued by the front-end
use std::fmt;

pub const BREAK_LIST: &str = "-break-list";

pub fn break_insert(fullname: &str, line: usize) -> String {
    format!("-break-insert {fullname}:{line}")
}

pub fn break_delete(number: impl fmt::Display) -> String {
    format!("-break-delete {number}")
}

pub fn file_exec_and_symbols(path: &str) -> String {
    format!("-file-exec-and-symbols {path}")
}

/// Disassemble around `line` of `file`, starting `context_lines` above it
pub fn data_disassemble(file: &str, line: usize, context_lines: usize, mode: u8) -> String {
    let start = line.saturating_sub(context_lines).max(1);
    format!("-data-disassemble -f {file} -l {start} -- {mode}")
}
