use crate::entry::LogEntry;

/// One fetch's worth of log entries plus the server's authoritative
/// total/aggregate snapshot at that instant (not deltas).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Window {
    /// Entries ordered newest-first, at most one page's worth.
    pub items: Vec<LogEntry>,
    /// Count of rows matching the filter, ignoring pagination.
    pub total: i64,
    /// Total charge over all matching rows.
    pub aggregate: f64,
}
