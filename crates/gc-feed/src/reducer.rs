//! The feed reducer: one state machine fed by messages.
//!
//! The two fetch paths and the UI are producers; they send [`FeedMsg`]
//! values and never touch the cache directly. Every window message carries
//! the [`FilterKey`] it was fetched under, so results that outlived their
//! filter are dropped here instead of being cancelled in flight.

use crate::cache::Cache;
use crate::filter::FilterKey;
use crate::gate::{InteractionGate, PendingBuffer};
use crate::merge::{merge_head, merge_page};
use crate::window::Window;

#[derive(Debug, Clone, PartialEq)]
pub enum FeedMsg {
    /// The active filter set changed; start over from an empty cache.
    FilterChanged(FilterKey),
    /// A head fetch (offset 0) completed. `at_top` is whether the viewer
    /// is at scroll offset 0 at merge time.
    HeadWindow { key: FilterKey, window: Window, at_top: bool },
    /// A page fetch (offset = known item count) completed.
    PageWindow { key: FilterKey, window: Window },
    /// A row interaction (detail popup) opened.
    InteractionOpened,
    /// A row interaction closed.
    InteractionClosed,
}

/// Cache + pending buffer + gate under a single `apply`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedState {
    key: FilterKey,
    pub cache: Cache,
    pending: PendingBuffer,
    gate: InteractionGate,
}

impl FeedState {
    pub fn new(key: FilterKey) -> Self {
        Self { key, ..Default::default() }
    }

    pub fn key(&self) -> &FilterKey {
        &self.key
    }

    pub fn gate_open(&self) -> bool {
        self.gate.is_open()
    }

    pub fn apply(&mut self, msg: FeedMsg) {
        match msg {
            FeedMsg::FilterChanged(key) => {
                self.key = key;
                // Keep the revision monotonic across resets so a renderer
                // comparing revisions never mistakes the fresh cache for a
                // previously seen one.
                let revision = self.cache.revision;
                self.cache = Cache { revision: revision + 1, ..Default::default() };
                self.pending.clear();
            }
            FeedMsg::HeadWindow { key, window, at_top } => {
                if key != self.key {
                    return;
                }
                if self.gate.is_open() {
                    self.pending.head = Some((window, at_top));
                } else {
                    merge_head(&mut self.cache, window, at_top);
                }
            }
            FeedMsg::PageWindow { key, window } => {
                if key != self.key {
                    return;
                }
                if self.gate.is_open() {
                    self.pending.page = Some(window);
                } else {
                    merge_page(&mut self.cache, window);
                }
            }
            FeedMsg::InteractionOpened => self.gate.open(),
            FeedMsg::InteractionClosed => {
                if self.gate.close() {
                    self.flush_pending();
                }
            }
        }
    }

    /// Apply buffered windows in the order they would have landed without
    /// buffering: head first (what's current), then page (older catch-up).
    fn flush_pending(&mut self) {
        if let Some((window, at_top)) = self.pending.head.take() {
            merge_head(&mut self.cache, window, at_top);
        }
        if let Some(window) = self.pending.page.take() {
            merge_page(&mut self.cache, window);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::LogEntry;
    use crate::filter::LogFilter;

    fn entry(id: i64) -> LogEntry {
        LogEntry {
            id,
            created_at: 1_700_000_000 + id,
            kind: 2,
            username: String::new(),
            token_name: String::new(),
            model_name: String::new(),
            prompt_tokens: 0,
            completion_tokens: 0,
            quota: 0,
            content: String::new(),
        }
    }

    fn window(ids: &[i64], total: i64, aggregate: f64) -> Window {
        Window { items: ids.iter().map(|&id| entry(id)).collect(), total, aggregate }
    }

    fn ids(state: &FeedState) -> Vec<i64> {
        state.cache.items.iter().map(|e| e.id).collect()
    }

    fn seeded() -> FeedState {
        // Cache = [3, 1, 2]: a page load of [1, 2] then a head poll that
        // introduced 3 while the viewer was scrolled down.
        let mut state = FeedState::new(LogFilter::default().key());
        let key = state.key().clone();
        state.apply(FeedMsg::PageWindow { key: key.clone(), window: window(&[1, 2], 2, 10.0) });
        state.apply(FeedMsg::HeadWindow { key, window: window(&[3, 1], 3, 15.0), at_top: false });
        assert_eq!(ids(&state), vec![3, 1, 2]);
        state
    }

    #[test]
    fn windows_are_buffered_while_the_gate_is_open_and_flushed_on_close() {
        let mut state = seeded();
        let key = state.key().clone();

        state.apply(FeedMsg::InteractionOpened);
        state.apply(FeedMsg::HeadWindow {
            key: key.clone(),
            window: window(&[4], 4, 20.0),
            at_top: false,
        });

        // Frozen while open.
        assert_eq!(ids(&state), vec![3, 1, 2]);
        assert_eq!(state.cache.total, 3);

        state.apply(FeedMsg::InteractionClosed);
        assert_eq!(ids(&state), vec![4, 3, 1, 2]);
        assert_eq!(state.cache.total, 4);
        assert_eq!(state.cache.aggregate, 20.0);
    }

    #[test]
    fn gated_and_ungated_application_converge() {
        let head = window(&[5, 3], 5, 25.0);
        let page = window(&[2, 0], 5, 25.0);
        let key = LogFilter::default().key();

        let mut direct = seeded();
        direct.apply(FeedMsg::HeadWindow { key: key.clone(), window: head.clone(), at_top: false });
        direct.apply(FeedMsg::PageWindow { key: key.clone(), window: page.clone() });

        let mut gated = seeded();
        gated.apply(FeedMsg::InteractionOpened);
        gated.apply(FeedMsg::HeadWindow { key: key.clone(), window: head, at_top: false });
        gated.apply(FeedMsg::PageWindow { key, window: page });
        gated.apply(FeedMsg::InteractionClosed);

        assert_eq!(gated.cache, direct.cache);
    }

    #[test]
    fn only_the_latest_buffered_window_per_kind_survives() {
        let mut state = seeded();
        let key = state.key().clone();

        state.apply(FeedMsg::InteractionOpened);
        state.apply(FeedMsg::HeadWindow {
            key: key.clone(),
            window: window(&[4, 3], 4, 18.0),
            at_top: false,
        });
        state.apply(FeedMsg::HeadWindow {
            key: key.clone(),
            window: window(&[5, 4, 3], 5, 22.0),
            at_top: false,
        });
        state.apply(FeedMsg::InteractionClosed);

        assert_eq!(ids(&state), vec![5, 4, 3, 1, 2]);
        assert_eq!(state.cache.total, 5);
        assert_eq!(state.cache.aggregate, 22.0);
    }

    #[test]
    fn nested_interactions_hold_the_gate_until_the_last_close() {
        let mut state = seeded();
        let key = state.key().clone();

        state.apply(FeedMsg::InteractionOpened);
        state.apply(FeedMsg::InteractionOpened);
        state.apply(FeedMsg::HeadWindow { key, window: window(&[4], 4, 20.0), at_top: false });

        state.apply(FeedMsg::InteractionClosed);
        assert_eq!(ids(&state), vec![3, 1, 2]);

        state.apply(FeedMsg::InteractionClosed);
        assert_eq!(ids(&state), vec![4, 3, 1, 2]);
    }

    #[test]
    fn closing_an_idle_gate_changes_nothing() {
        let mut state = seeded();
        let snapshot = state.clone();
        state.apply(FeedMsg::InteractionClosed);
        assert_eq!(state, snapshot);
    }

    #[test]
    fn filter_change_resets_cache_and_discards_pending() {
        let mut state = seeded();
        let old_key = state.key().clone();

        state.apply(FeedMsg::InteractionOpened);
        state.apply(FeedMsg::PageWindow { key: old_key.clone(), window: window(&[0], 4, 9.0) });

        let new_key = LogFilter { username: "alice".into(), ..Default::default() }.key();
        state.apply(FeedMsg::FilterChanged(new_key.clone()));

        assert!(state.cache.items.is_empty());
        assert_eq!(state.cache.total, 0);
        assert_eq!(state.cache.aggregate, 0.0);

        // The buffered page from the old filter must not resurface when the
        // interaction finally closes.
        state.apply(FeedMsg::InteractionClosed);
        assert!(state.cache.items.is_empty());

        // And a late result fetched under the old key is dropped outright.
        state.apply(FeedMsg::HeadWindow { key: old_key, window: window(&[9], 1, 5.0), at_top: true });
        assert!(state.cache.items.is_empty());

        state.apply(FeedMsg::HeadWindow { key: new_key, window: window(&[9], 1, 5.0), at_top: true });
        assert_eq!(ids(&state), vec![9]);
    }

    #[test]
    fn revision_stays_monotonic_across_filter_resets() {
        let mut state = seeded();
        let before = state.cache.revision;
        state.apply(FeedMsg::FilterChanged(LogFilter { search: "x".into(), ..Default::default() }.key()));
        assert!(state.cache.revision > before);
    }

    #[test]
    fn flush_applies_head_before_page() {
        let mut state = seeded();
        let key = state.key().clone();

        state.apply(FeedMsg::InteractionOpened);
        state.apply(FeedMsg::PageWindow { key: key.clone(), window: window(&[0], 5, 30.0) });
        state.apply(FeedMsg::HeadWindow {
            key,
            window: window(&[4, 3], 5, 28.0),
            at_top: false,
        });
        state.apply(FeedMsg::InteractionClosed);

        // Head landed first (4 at the top), page appended its older row at
        // the end, and the page's totals — applied second — are final.
        assert_eq!(ids(&state), vec![4, 3, 1, 2, 0]);
        assert_eq!(state.cache.aggregate, 30.0);
    }
}
