//! Worker threads for the two fetch paths feeding the feed reducer.
//!
//! Each spawn performs exactly one blocking HTTP call and reports back over
//! the channel. Results carry the [`FilterKey`] they were fetched under;
//! the reducer drops anything whose key no longer matches, so a fetch that
//! outlives its filter needs no cancellation.

use std::sync::Arc;
use std::sync::mpsc::Sender;
use std::thread;

use gc_feed::{FilterKey, LogFilter, Window};

use crate::api::{ApiError, LogApi};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchKind {
    Head,
    Page,
}

/// Outcome of one fetch worker.
#[derive(Debug)]
pub enum FetchEvent {
    Head { key: FilterKey, window: Window },
    Page { key: FilterKey, offset: usize, window: Window },
    Failed { key: FilterKey, kind: FetchKind, error: ApiError },
}

/// Re-poll the newest page (offset 0).
pub fn spawn_head_fetch(
    api: Arc<LogApi>,
    filter: LogFilter,
    key: FilterKey,
    limit: usize,
    tx: Sender<FetchEvent>,
) {
    thread::spawn(move || {
        let event = match api.list_logs(&filter, 0, limit) {
            Ok(window) => FetchEvent::Head { key, window },
            Err(error) => FetchEvent::Failed { key, kind: FetchKind::Head, error },
        };
        // Receiver gone means the app is shutting down.
        let _ = tx.send(event);
    });
}

/// Fetch older history at `offset` = current known item count.
pub fn spawn_page_fetch(
    api: Arc<LogApi>,
    filter: LogFilter,
    key: FilterKey,
    offset: usize,
    limit: usize,
    tx: Sender<FetchEvent>,
) {
    thread::spawn(move || {
        let event = match api.list_logs(&filter, offset, limit) {
            Ok(window) => FetchEvent::Page { key, offset, window },
            Err(error) => FetchEvent::Failed { key, kind: FetchKind::Page, error },
        };
        let _ = tx.send(event);
    });
}
