use serde::Serialize;
use transport::types::{AsmInstruction, AsmSourceLine};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisassemblyRow {
    pub line: Option<String>,
    /// Rendered as `func+offset address inst`
    pub instructions: Vec<String>,
}

/// Mixed source and assembly listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DisassemblyView {
    /// Name of the disassembled file, if GDB reported one
    pub title: Option<String>,
    pub rows: Vec<DisassemblyRow>,
}

impl DisassemblyView {
    pub fn derive(lines: &[AsmSourceLine]) -> Self {
        let title = lines
            .iter()
            .find_map(|l| l.fullname.clone().or_else(|| l.file.clone()));
        let rows = lines
            .iter()
            .map(|l| DisassemblyRow {
                line: l.line.clone(),
                instructions: l.line_asm_insn.iter().map(render_instruction).collect(),
            })
            .collect();
        Self { title, rows }
    }
}

fn render_instruction(insn: &AsmInstruction) -> String {
    let func = insn.func_name.as_deref().unwrap_or("??");
    let offset = insn.offset.as_deref().unwrap_or("0");
    format!("{func}+{offset} {} {}", insn.address, insn.inst)
}
