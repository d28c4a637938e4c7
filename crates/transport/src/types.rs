//! Types carried inside GDB/MI record payloads
use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Breakpoint number as reported by GDB, e.g. `1` or `2.1` for multi-location breakpoints
pub type BreakpointNumber = String;

/// A breakpoint as reported in a `bkpt` result or a `BreakpointTable` body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Breakpoint {
    pub number: BreakpointNumber,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::lenient_line",
        skip_serializing_if = "Option::is_none"
    )]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func: Option<String>,

    /// Everything else GDB sent (`type`, `disp`, `enabled`, `addr`, `times`, ...)
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Breakpoint {
    /// Whether this breakpoint sits on `line` of `fullname`
    pub fn is_at(&self, fullname: &str, line: usize) -> bool {
        self.fullname.as_deref() == Some(fullname) && self.line == Some(line)
    }
}

/// Result of `-break-list`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BreakpointTable {
    #[serde(default)]
    pub body: Vec<Breakpoint>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// A stack frame, either the location of a stop or an entry of `-stack-list-frames`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addr: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub func: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fullname: Option<String>,
    #[serde(
        default,
        deserialize_with = "de::lenient_line",
        skip_serializing_if = "Option::is_none"
    )]
    pub line: Option<usize>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// One entry of a `register-values` report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterValue {
    /// Register number, an index into the `register-names` list
    pub number: String,
    pub value: String,
}

/// A source line and its instructions, from `-data-disassemble` in mixed mode
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsmSourceLine {
    #[serde(default)]
    pub line: Option<String>,
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub fullname: Option<String>,
    #[serde(default)]
    pub line_asm_insn: Vec<AsmInstruction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsmInstruction {
    pub address: String,
    #[serde(rename = "func-name", default)]
    pub func_name: Option<String>,
    #[serde(default)]
    pub offset: Option<String>,
    pub inst: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opcodes: Option<String>,
}

/// Entry of `-file-list-exec-source-files`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFileInfo {
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default)]
    pub fullname: Option<String>,
}

/// Contents of a source file, as returned by a file read
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFile {
    pub source_code: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

pub(crate) mod de {
    use super::*;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawLine {
        Number(u64),
        Text(String),
    }

    /// GDB reports line numbers as strings. Anything that is not a positive
    /// integer is treated as "no line".
    pub(crate) fn lenient_line<'de, D>(deserializer: D) -> Result<Option<usize>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<RawLine>::deserialize(deserializer)?;
        let line = match raw {
            Some(RawLine::Number(n)) => usize::try_from(n).ok(),
            Some(RawLine::Text(s)) => s.trim().parse::<usize>().ok(),
            None => None,
        };
        Ok(line.filter(|l| *l > 0))
    }
}
