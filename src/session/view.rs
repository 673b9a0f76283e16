//! Filtered projection of a session's line buffer.

use crate::tail::ClassifiedLine;

use super::types::CategoryCounts;

/// Indices of the lines that pass the current query, with their counts.
///
/// Because the buffer is append-only, new lines extend the projection in
/// place; only a query change forces a full recompute.
#[derive(Debug, Default)]
pub(crate) struct ViewFilter {
    /// Lowercased query, `None` when the query is blank.
    needle: Option<String>,
    indices: Vec<usize>,
    counts: CategoryCounts,
}

impl ViewFilter {
    /// Build the projection of `lines` for `query`.
    pub(crate) fn new(query: &str, lines: &[ClassifiedLine]) -> Self {
        let needle = (!query.trim().is_empty()).then(|| query.to_lowercase());
        let mut filter = Self {
            needle,
            indices: Vec::new(),
            counts: CategoryCounts::default(),
        };
        filter.extend(lines, 0);
        filter
    }

    /// Whether `line` passes the query.
    pub(crate) fn matches(&self, line: &ClassifiedLine) -> bool {
        self.needle
            .as_deref()
            .map_or(true, |needle| line.contains_lowered(needle))
    }

    /// Take `lines[start..]` into account. Returns how many became visible.
    pub(crate) fn extend(&mut self, lines: &[ClassifiedLine], start: usize) -> usize {
        let before = self.indices.len();
        for (index, line) in lines.iter().enumerate().skip(start) {
            if self.matches(line) {
                self.indices.push(index);
                self.counts.record(line.category);
            }
        }
        self.indices.len() - before
    }

    pub(crate) fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub(crate) fn len(&self) -> usize {
        self.indices.len()
    }

    pub(crate) fn counts(&self) -> CategoryCounts {
        self.counts
    }

    pub(crate) fn is_unfiltered(&self) -> bool {
        self.needle.is_none()
    }
}
