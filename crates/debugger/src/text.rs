//! Text cleanup for the console and program output panes

/// Undo the C-string escapes GDB applies to console stream records
///
/// Unknown escapes are kept as written.
pub fn unescape_console(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

pub fn normalise_output(text: &str) -> String {
    text.replace("\r\n", "\n")
}
