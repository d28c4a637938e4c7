use std::collections::HashMap;

use serde::Serialize;
use transport::types::RegisterValue;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterRow {
    pub name: String,
    pub value: String,
}

/// Rows for a value report, plus any values no name could be found for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Correlation {
    pub rows: Vec<RegisterRow>,
    /// Register numbers of reported values that match no stored name
    pub unmatched: Vec<String>,
}

impl Correlation {
    pub fn is_consistent(&self) -> bool {
        self.unmatched.is_empty()
    }
}

/// Matches register values to the names GDB reported when the debuggee was attached
///
/// GDB reports names once, as a list indexed by register number, and later
/// reports values keyed by that number. Empty names are unused slots of the
/// architecture; they produce no row but still occupy their number.
#[derive(Debug, Clone, Default)]
pub struct RegisterCorrelator {
    names: Option<Vec<(usize, String)>>,
}

impl RegisterCorrelator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_names(&mut self, names: Vec<String>) {
        let names: Vec<_> = names
            .into_iter()
            .enumerate()
            .filter(|(_, name)| !name.is_empty())
            .collect();
        tracing::debug!(count = names.len(), "storing register names");
        self.names = Some(names);
    }

    pub fn has_names(&self) -> bool {
        self.names.is_some()
    }

    /// Names in register-number order, unused slots removed
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names
            .iter()
            .flatten()
            .map(|(_, name)| name.as_str())
    }

    pub fn clear(&mut self) {
        self.names = None;
    }

    /// Build one row per stored name
    ///
    /// Returns `None` when no names have been stored yet. A name without a
    /// reported value gets an empty value.
    pub fn correlate(&self, values: &[RegisterValue]) -> Option<Correlation> {
        let names = self.names.as_ref()?;

        let by_number: HashMap<&str, &str> = values
            .iter()
            .map(|v| (v.number.as_str(), v.value.as_str()))
            .collect();

        let rows = names
            .iter()
            .map(|(number, name)| RegisterRow {
                name: name.clone(),
                value: by_number
                    .get(number.to_string().as_str())
                    .map(|v| v.to_string())
                    .unwrap_or_default(),
            })
            .collect();

        let unmatched: Vec<String> = values
            .iter()
            .filter(|v| {
                !names
                    .iter()
                    .any(|(number, _)| number.to_string() == v.number)
            })
            .map(|v| v.number.clone())
            .collect();

        if !unmatched.is_empty() {
            tracing::warn!(
                names = names.len(),
                values = values.len(),
                unmatched = unmatched.len(),
                "register values do not match register names"
            );
        }

        Some(Correlation { rows, unmatched })
    }
}
