use std::collections::HashMap;

use serde::Serialize;

use crate::breakpoints::BreakpointStore;

/// Contents of one source file, as fetched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFileEntry {
    pub fullname: String,
    pub lines: Vec<String>,
}

/// A file that has to be fetched before it can be shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchSource {
    pub fullname: String,
    /// Line of the stop frame that asked for the file, if a stop did
    pub line: Option<usize>,
}

#[derive(Debug)]
pub enum Lookup<'a> {
    Cached(&'a SourceFileEntry),
    Fetch(FetchSource),
}

/// Source files fetched so far in this session
///
/// Files are assumed not to change while the session runs, so an entry is
/// never invalidated. Lookups for a path that is not cached yet are not
/// coalesced: each one asks for a fetch, and whichever response is stored
/// last wins.
#[derive(Debug, Clone, Default)]
pub struct SourceFileCache {
    entries: HashMap<String, SourceFileEntry>,
}

impl SourceFileCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, fullname: &str) -> Option<&SourceFileEntry> {
        self.entries.get(fullname)
    }

    pub fn contains(&self, fullname: &str) -> bool {
        self.entries.contains_key(fullname)
    }

    /// The cached entry, or the fetch needed to populate it
    pub fn get_or_fetch(&self, fullname: &str, line: Option<usize>) -> Lookup<'_> {
        match self.entries.get(fullname) {
            Some(entry) => Lookup::Cached(entry),
            None => {
                tracing::debug!(%fullname, "source file not cached");
                Lookup::Fetch(FetchSource {
                    fullname: fullname.to_string(),
                    line,
                })
            }
        }
    }

    pub fn insert(&mut self, fullname: impl Into<String>, lines: Vec<String>) {
        let fullname = fullname.into();
        if self.entries.contains_key(&fullname) {
            tracing::debug!(%fullname, "replacing cached source file");
        }
        self.entries.insert(
            fullname.clone(),
            SourceFileEntry { fullname, lines },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Derive the view of a cached file
    ///
    /// Returns `None` when the file is not cached.
    pub fn render_target(
        &self,
        fullname: &str,
        line: Option<usize>,
        breakpoints: &BreakpointStore,
    ) -> Option<SourceView> {
        let entry = self.entries.get(fullname)?;
        Some(SourceView::derive(entry, line, breakpoints))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceLine {
    /// One-based line number
    pub number: usize,
    pub text: String,
    pub breakpoint: bool,
    pub current: bool,
}

/// A source file as it should be displayed right now
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceView {
    pub fullname: String,
    pub current_line: Option<usize>,
    pub lines: Vec<SourceLine>,
}

impl SourceView {
    pub fn derive(
        entry: &SourceFileEntry,
        current_line: Option<usize>,
        breakpoints: &BreakpointStore,
    ) -> Self {
        let breakpoint_lines = breakpoints.lines_for(&entry.fullname);
        let lines = entry
            .lines
            .iter()
            .enumerate()
            .map(|(i, text)| {
                let number = i + 1;
                SourceLine {
                    number,
                    text: text.clone(),
                    breakpoint: breakpoint_lines.contains(&number),
                    current: current_line == Some(number),
                }
            })
            .collect();

        Self {
            fullname: entry.fullname.clone(),
            current_line,
            lines,
        }
    }

    /// Line numbers marked with a breakpoint
    pub fn breakpoint_lines(&self) -> Vec<usize> {
        self.lines
            .iter()
            .filter(|l| l.breakpoint)
            .map(|l| l.number)
            .collect()
    }

    /// The highlighted line, if it is within the file
    pub fn highlighted(&self) -> Option<&SourceLine> {
        self.lines.iter().find(|l| l.current)
    }
}

#[cfg(test)]
mod tests {
    use transport::types::Breakpoint;

    use super::*;

    fn lines(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("line {i}")).collect()
    }

    #[test]
    fn uncached_lookup_asks_for_fetch() {
        let cache = SourceFileCache::new();
        match cache.get_or_fetch("/a.c", Some(3)) {
            Lookup::Fetch(fetch) => assert_eq!(
                fetch,
                FetchSource {
                    fullname: "/a.c".to_string(),
                    line: Some(3)
                }
            ),
            Lookup::Cached(_) => panic!("nothing is cached yet"),
        }
    }

    #[test]
    fn cached_lookup_is_synchronous() {
        let mut cache = SourceFileCache::new();
        cache.insert("/a.c", lines(2));

        let Lookup::Cached(entry) = cache.get_or_fetch("/a.c", None) else {
            panic!("expected a cached entry");
        };
        assert_eq!(entry.lines, lines(2));
    }

    #[test]
    fn last_writer_wins() {
        let mut cache = SourceFileCache::new();
        cache.insert("/a.c", lines(2));
        cache.insert("/a.c", lines(3));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("/a.c").unwrap().lines.len(), 3);
    }

    #[test]
    fn render_marks_breakpoints_and_current_line() {
        let mut cache = SourceFileCache::new();
        cache.insert("/a.c", lines(5));
        let mut breakpoints = BreakpointStore::new();
        breakpoints.add(Breakpoint {
            number: "1".to_string(),
            fullname: Some("/a.c".to_string()),
            line: Some(2),
            ..Default::default()
        });
        breakpoints.add(Breakpoint {
            number: "2".to_string(),
            fullname: Some("/b.c".to_string()),
            line: Some(4),
            ..Default::default()
        });

        let view = cache.render_target("/a.c", Some(4), &breakpoints).unwrap();
        assert_eq!(view.breakpoint_lines(), vec![2]);
        assert_eq!(view.highlighted().unwrap().number, 4);
        assert_eq!(view.lines.len(), 5);
    }

    #[test]
    fn render_is_rederived_after_breakpoint_change() {
        let mut cache = SourceFileCache::new();
        cache.insert("/a.c", lines(3));
        let mut breakpoints = BreakpointStore::new();

        let before = cache.render_target("/a.c", None, &breakpoints).unwrap();
        breakpoints.add(Breakpoint {
            number: "1".to_string(),
            fullname: Some("/a.c".to_string()),
            line: Some(3),
            ..Default::default()
        });
        let after = cache.render_target("/a.c", None, &breakpoints).unwrap();

        assert!(before.breakpoint_lines().is_empty());
        assert_eq!(after.breakpoint_lines(), vec![3]);
        assert!(after.highlighted().is_none());
    }

    #[test]
    fn render_of_uncached_file() {
        let cache = SourceFileCache::new();
        assert!(
            cache
                .render_target("/a.c", None, &BreakpointStore::new())
                .is_none()
        );
    }
}
