//! Record classification
//!
//! Decides which side effects a record implies without touching any state.
use transport::{ProtocolRecord, RecordType, ResultData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    /// Raw output of the debuggee
    ProgramOutput,
    /// The record carries a frame: the debuggee stopped somewhere
    AsynchronousStop,
    DoneBkpt,
    DoneBreakpointTable,
    DoneStack,
    DoneRegisterNames,
    DoneRegisterValues,
    DoneAsm,
    DoneFiles,
    ConsoleText,
    Other,
}

/// Classify one record
///
/// A record yields one tag, or two when a structured result also carries a
/// frame. `Tag::Other` is only returned on its own.
pub fn classify(record: &ProtocolRecord) -> Vec<Tag> {
    if record.kind == RecordType::Output {
        return vec![Tag::ProgramOutput];
    }

    let mut tags = Vec::with_capacity(2);

    if record.kind == RecordType::Result && record.message() == Some("done") {
        if let Some(tag) = record.structured().and_then(|p| structured_tag(&p.result)) {
            tags.push(tag);
        }
    }

    if record.frame().is_some() {
        tags.push(Tag::AsynchronousStop);
    }

    if tags.is_empty() && record.kind == RecordType::Console {
        tags.push(Tag::ConsoleText);
    }

    if tags.is_empty() {
        tags.push(Tag::Other);
    }
    tags
}

fn structured_tag(result: &ResultData) -> Option<Tag> {
    match result {
        ResultData::Breakpoint(_) => Some(Tag::DoneBkpt),
        ResultData::BreakpointTable(_) => Some(Tag::DoneBreakpointTable),
        ResultData::Stack(_) => Some(Tag::DoneStack),
        ResultData::RegisterNames(_) => Some(Tag::DoneRegisterNames),
        ResultData::RegisterValues(_) => Some(Tag::DoneRegisterValues),
        ResultData::Disassembly(_) => Some(Tag::DoneAsm),
        ResultData::Files(_) => Some(Tag::DoneFiles),
        ResultData::Unknown => None,
    }
}

/// Whether the record reports that the debuggee exited
pub fn reports_exit(record: &ProtocolRecord) -> bool {
    record.message() == Some("stopped")
        && record.reason().is_some_and(|reason| reason.contains("exited"))
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use transport::ProtocolRecord;

    use super::*;

    fn record(value: serde_json::Value) -> ProtocolRecord {
        serde_json::from_value(value).unwrap()
    }

    macro_rules! classify_tests {
        ($($name:ident: $value:expr,)*) => {
            mod classify_table {
                use super::{Tag, classify, record};
                use serde_json::json;

                $(
                    #[test]
                    fn $name () {
                        let (input, expected): (serde_json::Value, Vec<Tag>) = $value;
                        assert_eq!(classify(&record(input)), expected);
                    }
                )*
            }
        }
    }

    classify_tests! {
        program_output: (
            json!({"type": "output", "payload": "hello\n"}),
            vec![Tag::ProgramOutput],
        ),
        output_with_frame_is_still_output: (
            json!({"type": "output", "payload": {"frame": {"line": "1"}}}),
            vec![Tag::ProgramOutput],
        ),
        bkpt: (
            json!({"type": "result", "message": "done", "payload": {"bkpt": {"number": "1"}}}),
            vec![Tag::DoneBkpt],
        ),
        breakpoint_table: (
            json!({"type": "result", "message": "done", "payload": {"BreakpointTable": {"body": []}}}),
            vec![Tag::DoneBreakpointTable],
        ),
        stack: (
            json!({"type": "result", "message": "done", "payload": {"stack": []}}),
            vec![Tag::DoneStack],
        ),
        register_names: (
            json!({"type": "result", "message": "done", "payload": {"register-names": ["rax"]}}),
            vec![Tag::DoneRegisterNames],
        ),
        register_values: (
            json!({"type": "result", "message": "done", "payload": {"register-values": []}}),
            vec![Tag::DoneRegisterValues],
        ),
        asm: (
            json!({"type": "result", "message": "done", "payload": {"asm_insns": []}}),
            vec![Tag::DoneAsm],
        ),
        files: (
            json!({"type": "result", "message": "done", "payload": {"files": []}}),
            vec![Tag::DoneFiles],
        ),
        unknown_result_key: (
            json!({"type": "result", "message": "done", "payload": {"value": "42"}}),
            vec![Tag::Other],
        ),
        result_without_payload: (
            json!({"type": "result", "message": "done", "payload": null}),
            vec![Tag::Other],
        ),
        result_not_done: (
            json!({"type": "result", "message": "error", "payload": {"msg": "No symbol table is loaded."}}),
            vec![Tag::Other],
        ),
        structured_result_with_frame: (
            json!({"type": "result", "message": "done", "payload": {"stack": [], "frame": {"line": "3"}}}),
            vec![Tag::DoneStack, Tag::AsynchronousStop],
        ),
        stop: (
            json!({"type": "notify", "message": "stopped", "payload": {"reason": "end-stepping-range", "frame": {"line": "3"}}}),
            vec![Tag::AsynchronousStop],
        ),
        console: (
            json!({"type": "console", "payload": "Reading symbols\\n"}),
            vec![Tag::ConsoleText],
        ),
        log: (
            json!({"type": "log", "payload": "warning\\n"}),
            vec![Tag::Other],
        ),
    }

    #[test]
    fn exit_is_detected_from_reason() {
        let exited = record(json!({
            "type": "notify",
            "message": "stopped",
            "payload": {"reason": "exited-normally"},
        }));
        assert!(reports_exit(&exited));

        let hit = record(json!({
            "type": "notify",
            "message": "stopped",
            "payload": {"reason": "breakpoint-hit"},
        }));
        assert!(!reports_exit(&hit));

        let running = record(json!({
            "type": "notify",
            "message": "running",
            "payload": {"reason": "exited"},
        }));
        assert!(!reports_exit(&running));
    }
}
