use std::collections::BTreeSet;

use transport::types::Breakpoint;

use crate::table::Table;

/// The breakpoints GDB has confirmed
///
/// A `-break-list` result replaces the contents wholesale; a `-break-insert`
/// result is appended without deduplication, so the next full listing is the
/// source of truth after any deletion.
#[derive(Debug, Clone, Default)]
pub struct BreakpointStore {
    breakpoints: Vec<Breakpoint>,
}

impl BreakpointStore {
    pub fn new() -> Self {
        Self::default()
    }

    #[tracing::instrument(skip_all, fields(count = breakpoints.len()))]
    pub fn replace_all(&mut self, breakpoints: Vec<Breakpoint>) {
        tracing::debug!("replacing breakpoints");
        self.breakpoints = breakpoints;
    }

    #[tracing::instrument(skip_all, fields(number = %breakpoint.number))]
    pub fn add(&mut self, breakpoint: Breakpoint) {
        tracing::debug!("adding breakpoint");
        self.breakpoints.push(breakpoint);
    }

    /// Lines of `fullname` that have at least one breakpoint
    pub fn lines_for(&self, fullname: &str) -> BTreeSet<usize> {
        self.breakpoints
            .iter()
            .filter(|b| b.fullname.as_deref() == Some(fullname))
            .filter_map(|b| b.line)
            .collect()
    }

    /// Breakpoints set on `line` of `fullname`
    pub fn find(&self, fullname: &str, line: usize) -> Vec<&Breakpoint> {
        self.breakpoints
            .iter()
            .filter(|b| b.is_at(fullname, line))
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Breakpoint> {
        self.breakpoints.iter()
    }

    pub fn len(&self) -> usize {
        self.breakpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.breakpoints.is_empty()
    }

    pub fn clear(&mut self) {
        self.breakpoints.clear();
    }

    /// Breakpoints as a table with one column per field seen
    pub fn table(&self) -> Table {
        Table::from_serializable(&self.breakpoints)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bkpt(number: &str, fullname: &str, line: usize) -> Breakpoint {
        Breakpoint {
            number: number.to_string(),
            fullname: Some(fullname.to_string()),
            line: Some(line),
            ..Default::default()
        }
    }

    #[test]
    fn replace_all_discards_previous_entries() {
        let mut store = BreakpointStore::new();
        store.add(bkpt("1", "/a.c", 3));
        store.add(bkpt("2", "/a.c", 7));

        store.replace_all(vec![bkpt("5", "/b.c", 1), bkpt("4", "/a.c", 9)]);

        let numbers: Vec<_> = store.iter().map(|b| b.number.as_str()).collect();
        assert_eq!(numbers, vec!["5", "4"]);
    }

    #[test]
    fn add_does_not_deduplicate() {
        let mut store = BreakpointStore::new();
        store.add(bkpt("1", "/a.c", 3));
        store.add(bkpt("2", "/a.c", 3));

        assert_eq!(store.len(), 2);
        assert_eq!(store.find("/a.c", 3).len(), 2);
    }

    #[test]
    fn lines_for_is_sorted_and_per_file() {
        let mut store = BreakpointStore::new();
        store.add(bkpt("1", "/a.c", 9));
        store.add(bkpt("2", "/b.c", 1));
        store.add(bkpt("3", "/a.c", 2));
        store.add(bkpt("4", "/a.c", 9));
        store.add(Breakpoint {
            number: "5".to_string(),
            ..Default::default()
        });

        assert_eq!(store.lines_for("/a.c").into_iter().collect::<Vec<_>>(), vec![2, 9]);
        assert!(store.lines_for("/c.c").is_empty());
    }

    #[test]
    fn find_matches_file_and_line() {
        let mut store = BreakpointStore::new();
        store.add(bkpt("1", "/a.c", 3));
        store.add(bkpt("2", "/b.c", 3));

        let found = store.find("/b.c", 3);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].number, "2");
        assert!(store.find("/a.c", 4).is_empty());
    }
}
