use std::collections::BTreeSet;

use serde::Serialize;
use serde_json::{Map, Value};

/// Tabular view over a list of loosely-typed objects
///
/// Columns are the sorted union of every object's keys; an object without a
/// given key gets an empty cell.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Table {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    pub fn from_objects<'a>(objects: impl IntoIterator<Item = &'a Map<String, Value>>) -> Self {
        let objects: Vec<_> = objects.into_iter().collect();
        let columns: Vec<String> = objects
            .iter()
            .flat_map(|o| o.keys().cloned())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let rows = objects
            .iter()
            .map(|o| {
                columns
                    .iter()
                    .map(|c| o.get(c).map(cell).unwrap_or_default())
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    pub fn from_serializable<T: Serialize>(items: &[T]) -> Self {
        let objects: Vec<Map<String, Value>> = items
            .iter()
            .filter_map(|item| match serde_json::to_value(item) {
                Ok(Value::Object(map)) => Some(map),
                Ok(other) => {
                    tracing::debug!(value = %other, "skipping non-object table row");
                    None
                }
                Err(e) => {
                    tracing::warn!(error = %e, "could not serialise table row");
                    None
                }
            })
            .collect();
        Self::from_objects(&objects)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
