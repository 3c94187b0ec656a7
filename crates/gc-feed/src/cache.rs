use crate::entry::LogEntry;

/// The feed state the renderer consumes: a newest-first list with unique
/// ids, plus the server-reported totals from the most recent merge.
///
/// Mutated only by the merge engine (see `merge.rs`) via the reducer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Cache {
    /// Newest-first; never two entries with the same id; `len <= total`.
    pub items: Vec<LogEntry>,
    /// Server-side row count for the active filter.
    pub total: i64,
    /// Server-side total charge for the active filter.
    pub aggregate: f64,
    /// Bumped whenever `items` changes. Totals can refresh without a bump,
    /// so the renderer can skip row work on unchanged frames.
    pub revision: u64,
}

impl Cache {
    /// Whether older history remains to be page-fetched.
    pub fn has_more(&self) -> bool {
        (self.items.len() as i64) < self.total
    }
}
