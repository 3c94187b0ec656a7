use serde::{Deserialize, Serialize};

/// The active query filter set for the log endpoint.
///
/// Empty strings and `None` mean "no constraint". The cache never inspects
/// these fields; it only cares about [`LogFilter::key`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LogFilter {
    /// Gateway log category code (`None` = all).
    pub kind: Option<i32>,
    /// Model name substring.
    pub model_name: String,
    pub token_name: String,
    pub username: String,
    /// Free-text search over log content.
    pub search: String,
    /// Inclusive range bounds, seconds since the UNIX epoch.
    pub start_ts: Option<i64>,
    pub end_ts: Option<i64>,
}

impl LogFilter {
    /// Deterministic identity of this filter set. Two filters compare equal
    /// under their keys iff every field matches; any change yields a new key
    /// and therefore a fresh cache.
    pub fn key(&self) -> FilterKey {
        FilterKey(format!(
            "k={:?}|m={}|t={}|u={}|q={}|s={:?}|e={:?}",
            self.kind,
            self.model_name,
            self.token_name,
            self.username,
            self.search,
            self.start_ts,
            self.end_ts,
        ))
    }
}

/// Comparable identity of a filter set. Windows fetched under one key are
/// never merged into a cache keyed differently.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct FilterKey(String);

impl FilterKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_filter_same_key() {
        let a = LogFilter { username: "alice".into(), ..Default::default() };
        let b = LogFilter { username: "alice".into(), ..Default::default() };
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn any_field_change_changes_key() {
        let base = LogFilter::default();
        let variants = [
            LogFilter { kind: Some(2), ..base.clone() },
            LogFilter { model_name: "gpt".into(), ..base.clone() },
            LogFilter { token_name: "ci".into(), ..base.clone() },
            LogFilter { username: "alice".into(), ..base.clone() },
            LogFilter { search: "timeout".into(), ..base.clone() },
            LogFilter { start_ts: Some(1), ..base.clone() },
            LogFilter { end_ts: Some(1), ..base.clone() },
        ];
        for variant in variants {
            assert_ne!(base.key(), variant.key(), "variant: {:?}", variant);
        }
    }

    #[test]
    fn fields_do_not_alias_across_positions() {
        let a = LogFilter { model_name: "x".into(), ..Default::default() };
        let b = LogFilter { token_name: "x".into(), ..Default::default() };
        assert_ne!(a.key(), b.key());
    }
}
