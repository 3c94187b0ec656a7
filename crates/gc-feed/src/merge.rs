//! Merge engine: pure folds of an arriving window into the cache.
//!
//! No I/O and no timers here. Both merges are idempotent with respect to
//! id-set membership, so a page and a head window landing out of order
//! converge to the same id set either way.

use std::collections::HashSet;

use crate::cache::Cache;
use crate::entry::LogEntry;
use crate::window::Window;

/// Fold a page window (older history) into the cache.
///
/// The first page for a fresh cache becomes the item list wholesale.
/// Afterwards only entries with unseen ids are appended, in window order,
/// to the end of the list. Totals always refresh from the window; the
/// revision is bumped only when the item list actually changed.
pub fn merge_page(cache: &mut Cache, window: Window) {
    let next = if cache.items.is_empty() {
        window.items
    } else {
        let known: HashSet<i64> = cache.items.iter().map(|e| e.id).collect();
        let mut merged = cache.items.clone();
        merged.extend(window.items.into_iter().filter(|e| !known.contains(&e.id)));
        merged
    };
    commit(cache, next, window.total, window.aggregate);
}

/// Fold a head window (re-polled newest page) into the cache.
///
/// With an empty cache or a viewer at the top of the list, the window
/// replaces the items outright. Otherwise the window's entries become the
/// new head and the existing entries whose ids it does not cover survive as
/// the tail, which inserts new rows at the top, updates re-sent rows in
/// place, and never duplicates an id.
pub fn merge_head(cache: &mut Cache, window: Window, at_top: bool) {
    let next = if cache.items.is_empty() || at_top {
        window.items
    } else {
        let covered: HashSet<i64> = window.items.iter().map(|e| e.id).collect();
        let mut merged = window.items;
        merged.extend(cache.items.iter().filter(|e| !covered.contains(&e.id)).cloned());
        merged
    };
    commit(cache, next, window.total, window.aggregate);
}

/// Apply a merged item list and the window's totals, capping the list at
/// the authoritative `total` and bumping the revision only on change.
fn commit(cache: &mut Cache, mut next: Vec<LogEntry>, total: i64, aggregate: f64) {
    let cap = total.max(0) as usize;
    if next.len() > cap {
        next.truncate(cap);
    }
    if next != cache.items {
        cache.items = next;
        cache.revision += 1;
    }
    cache.total = total;
    cache.aggregate = aggregate;
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn ids(cache: &Cache) -> Vec<i64> {
        cache.items.iter().map(|e| e.id).collect()
    }

    fn window(ids: &[i64], total: i64, aggregate: f64) -> Window {
        Window { items: ids.iter().map(|&id| entry(id)).collect(), total, aggregate }
    }

    #[test]
    fn first_page_becomes_the_item_list() {
        let mut cache = Cache::default();
        merge_page(&mut cache, window(&[1, 2], 2, 10.0));
        assert_eq!(ids(&cache), vec![1, 2]);
        assert_eq!(cache.total, 2);
        assert_eq!(cache.aggregate, 10.0);
        assert_eq!(cache.revision, 1);
    }

    #[test]
    fn page_appends_only_unseen_ids_at_the_end() {
        let mut cache = Cache::default();
        merge_page(&mut cache, window(&[5, 4], 4, 10.0));
        merge_page(&mut cache, window(&[4, 3, 2], 4, 12.0));
        assert_eq!(ids(&cache), vec![5, 4, 3, 2]);
    }

    #[test]
    fn page_with_no_new_ids_refreshes_totals_without_a_revision_bump() {
        let mut cache = Cache::default();
        merge_page(&mut cache, window(&[1, 2], 4, 10.0));
        let revision = cache.revision;
        merge_page(&mut cache, window(&[2], 4, 20.0));
        assert_eq!(ids(&cache), vec![1, 2]);
        assert_eq!(cache.revision, revision);
        assert_eq!(cache.total, 4);
        assert_eq!(cache.aggregate, 20.0);
    }

    #[test]
    fn head_prepends_new_updates_in_place_and_keeps_the_tail() {
        let mut cache = Cache::default();
        merge_page(&mut cache, window(&[1, 2], 2, 10.0));

        // e1 re-sent with changed payload, e3 brand new, e2 left as tail.
        let mut updated = entry(1);
        updated.model_name = "gpt-4o".into();
        let head = Window { items: vec![entry(3), updated.clone()], total: 3, aggregate: 15.0 };
        merge_head(&mut cache, head, false);

        assert_eq!(ids(&cache), vec![3, 1, 2]);
        assert_eq!(cache.items[1].model_name, "gpt-4o");
        assert_eq!(cache.total, 3);
        assert_eq!(cache.aggregate, 15.0);
    }

    #[test]
    fn head_at_top_replaces_wholesale() {
        let mut cache = Cache::default();
        merge_page(&mut cache, window(&[3, 2, 1], 3, 10.0));
        merge_head(&mut cache, window(&[4, 3], 4, 20.0), true);
        assert_eq!(ids(&cache), vec![4, 3]);
        assert_eq!(cache.total, 4);
    }

    #[test]
    fn head_merge_is_idempotent() {
        let mut cache = Cache::default();
        merge_page(&mut cache, window(&[2, 1], 2, 10.0));
        merge_head(&mut cache, window(&[3, 2], 3, 15.0), false);
        let snapshot = cache.clone();
        merge_head(&mut cache, window(&[3, 2], 3, 15.0), false);
        assert_eq!(cache, snapshot);
    }

    #[test]
    fn ids_stay_unique_across_interleaved_merges() {
        let mut cache = Cache::default();
        merge_page(&mut cache, window(&[5, 4, 3], 10, 1.0));
        merge_head(&mut cache, window(&[6, 5], 10, 1.0), false);
        merge_page(&mut cache, window(&[3, 2, 1], 10, 1.0));
        merge_head(&mut cache, window(&[7, 6, 5], 10, 1.0), false);

        let mut seen = std::collections::HashSet::new();
        for entry in &cache.items {
            assert!(seen.insert(entry.id), "duplicate id {}", entry.id);
        }
        assert_eq!(ids(&cache), vec![7, 6, 5, 4, 3, 2, 1]);
    }

    #[test]
    fn merges_cap_the_list_at_the_reported_total() {
        let mut cache = Cache::default();
        merge_page(&mut cache, window(&[5, 4, 3, 2], 4, 1.0));
        // Server-side total shrank (rows purged); the bound still holds.
        merge_head(&mut cache, window(&[5, 4], 3, 1.0), false);
        assert_eq!(cache.items.len(), 3);
        assert!(cache.items.len() as i64 <= cache.total);

        merge_page(&mut cache, window(&[1], 2, 1.0));
        assert!(cache.items.len() as i64 <= cache.total);
    }

    #[test]
    fn empty_head_window_with_zero_total_clears_the_cache() {
        let mut cache = Cache::default();
        merge_page(&mut cache, window(&[1, 2], 2, 10.0));
        merge_head(&mut cache, window(&[], 0, 0.0), true);
        assert!(cache.items.is_empty());
        assert_eq!(cache.total, 0);
        assert!(!cache.has_more());
    }
}
