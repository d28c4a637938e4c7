//! Records emitted by a GDB/MI session
//!
//! A response to a command (or a poll) is an ordered batch of records. Each
//! record has a type, an optional message and an optional payload. The payload
//! is loosely typed on the wire: a plain string for stream records, or an
//! object whose keys determine what kind of result it carries. On decoding,
//! the object form is classified into [`ResultData`] so that consumers can
//! match on it exhaustively instead of probing keys.
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::types::{
    AsmSourceLine, Breakpoint, BreakpointTable, Frame, RegisterValue, SourceFileInfo,
};

/// A batch of records, in emission order
pub type Batch = Vec<ProtocolRecord>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Result,
    Notify,
    Log,
    Status,
    Console,
    Output,
    Target,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    #[serde(rename = "type")]
    pub kind: RecordType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Payload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stream: Option<String>,
}

impl ProtocolRecord {
    pub fn new(kind: RecordType) -> Self {
        Self {
            kind,
            message: None,
            payload: None,
            token: None,
            stream: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The payload if it is an object
    pub fn structured(&self) -> Option<&StructuredPayload> {
        match &self.payload {
            Some(Payload::Structured(s)) => Some(s),
            _ => None,
        }
    }

    /// The payload if it is a plain string
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Some(Payload::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.structured().and_then(|s| s.frame.as_ref())
    }

    pub fn reason(&self) -> Option<&str> {
        self.structured().and_then(|s| s.reason.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Text(String),
    Structured(Box<StructuredPayload>),
    /// Any other JSON value; carried through for display only
    Other(Value),
}

impl Payload {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn from_object(fields: Map<String, Value>) -> Self {
        Self::Structured(Box::new(StructuredPayload::from_fields(fields)))
    }
}

/// An object payload, with the fields the front-end cares about decoded
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredPayload {
    pub result: ResultData,
    pub frame: Option<Frame>,
    pub reason: Option<String>,
    pub msg: Option<String>,
    /// The payload exactly as received
    pub fields: Map<String, Value>,
}

impl StructuredPayload {
    pub fn from_fields(fields: Map<String, Value>) -> Self {
        let result = ResultData::from_fields(&fields);
        let frame = fields
            .get("frame")
            .and_then(|value| match serde_json::from_value::<Frame>(value.clone()) {
                Ok(frame) => Some(frame),
                Err(e) => {
                    tracing::warn!(error = %e, "undecodable frame in payload, ignoring");
                    None
                }
            });
        let reason = string_field(&fields, "reason");
        let msg = string_field(&fields, "msg");

        Self {
            result,
            frame,
            reason,
            msg,
            fields,
        }
    }
}

fn string_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Known keys of a structured result, in the order they are probed
pub const RESULT_KEYS: [&str; 7] = [
    "bkpt",
    "BreakpointTable",
    "stack",
    "register-names",
    "register-values",
    "asm_insns",
    "files",
];

/// The structured result carried by an object payload
#[derive(Debug, Clone, PartialEq)]
pub enum ResultData {
    Breakpoint(Breakpoint),
    BreakpointTable(BreakpointTable),
    Stack(Vec<Frame>),
    RegisterNames(Vec<String>),
    RegisterValues(Vec<RegisterValue>),
    Disassembly(Vec<AsmSourceLine>),
    Files(Vec<SourceFileInfo>),
    /// No known key, or the first known key had an unexpected shape
    Unknown,
}

impl ResultData {
    fn from_fields(fields: &Map<String, Value>) -> Self {
        RESULT_KEYS
            .iter()
            .find_map(|key| fields.get(*key).map(|value| Self::decode(key, value)))
            .unwrap_or(Self::Unknown)
    }

    fn decode(key: &str, value: &Value) -> Self {
        let value = value.clone();
        let decoded = match key {
            "bkpt" => serde_json::from_value(value).map(Self::Breakpoint),
            "BreakpointTable" => serde_json::from_value(value).map(Self::BreakpointTable),
            "stack" => serde_json::from_value(value).map(Self::Stack),
            "register-names" => serde_json::from_value(value).map(Self::RegisterNames),
            "register-values" => serde_json::from_value(value).map(Self::RegisterValues),
            "asm_insns" => serde_json::from_value(value).map(Self::Disassembly),
            "files" => serde_json::from_value(value).map(Self::Files),
            _ => return Self::Unknown,
        };

        decoded.unwrap_or_else(|e| {
            tracing::warn!(%key, error = %e, "undecodable result payload, ignoring");
            Self::Unknown
        })
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(match value {
            Value::String(s) => Payload::Text(s),
            Value::Object(fields) => Payload::from_object(fields),
            other => Payload::Other(other),
        })
    }
}

impl Serialize for Payload {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Payload::Text(s) => serializer.serialize_str(s),
            Payload::Structured(s) => s.fields.serialize(serializer),
            Payload::Other(value) => value.serialize(serializer),
        }
    }
}
