use std::io;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, Sender};
use std::time::Duration;

use crossterm::event;
use ratatui::prelude::*;

use gc_feed::{Cache, FeedMsg};

use crate::actions::{Action, Effect, apply_action};
use crate::api::LogApi;
use crate::config::Config;
use crate::constants::{EVENT_POLL_MS, LOAD_MORE_MARGIN, RENDER_THROTTLE_MS, TOAST_TTL_MS};
use crate::events::handle_event;
use crate::fetcher::{FetchEvent, FetchKind, spawn_head_fetch, spawn_page_fetch};
use crate::state::{State, now_ms};
use crate::ui;

/// The single-threaded event loop. Fetch workers run on their own threads
/// and report back over the channel; everything that touches state happens
/// here, one message at a time, so each merge is atomic with respect to
/// input handling and rendering.
pub struct App {
    pub state: State,
    api: Arc<LogApi>,
    config: Config,
    tx: Sender<FetchEvent>,
    /// Rate limiting only — correctness against stale results lives in the
    /// reducer's filter-key check.
    head_in_flight: bool,
    page_in_flight: Option<usize>,
    /// Last offset a page fetch went out for under the current filter.
    /// Held until the viewer issues another end-of-list move or the offset
    /// changes, so a failed or buffered page is not re-requested every
    /// loop iteration.
    page_attempted: Option<usize>,
    last_head_poll_ms: u64,
    last_render_ms: u64,
    seen_revision: u64,
}

impl App {
    pub fn new(state: State, api: Arc<LogApi>, config: Config, tx: Sender<FetchEvent>) -> Self {
        Self {
            state,
            api,
            config,
            tx,
            head_in_flight: false,
            page_in_flight: None,
            page_attempted: None,
            last_head_poll_ms: 0,
            last_render_ms: 0,
            seen_revision: 0,
        }
    }

    pub fn run(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
        rx: &Receiver<FetchEvent>,
    ) -> io::Result<()> {
        // Initial load for the default filter.
        self.spawn_head();

        loop {
            // Input first, for latency; the poll timeout paces the loop.
            if event::poll(Duration::from_millis(EVENT_POLL_MS))? {
                let evt = event::read()?;
                let Some(action) = handle_event(&evt, &self.state) else {
                    break;
                };
                // A cursor move is a fresh scroll event; it re-arms the page
                // trigger, including re-attempting an offset that failed.
                if matches!(
                    action,
                    Action::CursorUp(_)
                        | Action::CursorDown(_)
                        | Action::CursorTop
                        | Action::CursorBottom
                ) {
                    self.page_attempted = None;
                }
                let effect = apply_action(&mut self.state, action);
                self.handle_effect(effect);
            }

            self.process_fetch_events(rx);
            self.drive_head_poll();
            self.maybe_fetch_page();
            self.expire_toast();

            let current_ms = now_ms();
            if self.state.dirty
                && current_ms.saturating_sub(self.last_render_ms) >= RENDER_THROTTLE_MS
            {
                terminal.draw(|frame| ui::render(frame, &mut self.state))?;
                self.state.dirty = false;
                self.last_render_ms = current_ms;
            }
        }
        Ok(())
    }

    fn handle_effect(&mut self, effect: Effect) {
        match effect {
            Effect::None => {}
            Effect::FilterChanged => {
                // Results from the old filter will be dropped by key; the
                // flags only need to let the new fetches through.
                self.head_in_flight = false;
                self.page_in_flight = None;
                self.page_attempted = None;
                self.spawn_head();
            }
            Effect::RefreshHead => {
                if !self.head_in_flight {
                    self.spawn_head();
                }
            }
        }
    }

    /// Drain completed fetches into the reducer.
    fn process_fetch_events(&mut self, rx: &Receiver<FetchEvent>) {
        while let Ok(event) = rx.try_recv() {
            match event {
                FetchEvent::Head { key, window } => {
                    self.head_in_flight = false;
                    let at_top = self.state.scroll == 0;
                    self.state.feed.apply(FeedMsg::HeadWindow { key, window, at_top });
                    self.after_merge();
                }
                FetchEvent::Page { key, offset, window } => {
                    if self.page_in_flight == Some(offset) {
                        self.page_in_flight = None;
                    }
                    self.state.feed.apply(FeedMsg::PageWindow { key, window });
                    self.after_merge();
                }
                FetchEvent::Failed { key, kind, error } => {
                    match kind {
                        FetchKind::Head => self.head_in_flight = false,
                        FetchKind::Page => self.page_in_flight = None,
                    }
                    // Errors from a superseded filter are stale news.
                    if key == *self.state.feed.key() {
                        self.state.show_toast(error.to_string());
                    }
                }
            }
        }
    }

    fn after_merge(&mut self) {
        let revision = self.state.feed.cache.revision;
        if revision != self.seen_revision {
            self.seen_revision = revision;
            self.state.clamp_cursor();
        }
        // Totals on the summary line can change even without an item bump.
        self.state.dirty = true;
    }

    /// Fixed-interval head re-poll, independent of scroll position. It
    /// keeps running while the gate is open; the reducer buffers those
    /// windows until the interaction closes.
    fn drive_head_poll(&mut self) {
        if self.head_in_flight {
            return;
        }
        let current_ms = now_ms();
        if current_ms.saturating_sub(self.last_head_poll_ms) < self.config.head_poll_ms {
            return;
        }
        self.spawn_head();
    }

    /// Fetch the next page when the cursor nears the end of the known list.
    fn maybe_fetch_page(&mut self) {
        let Some(offset) = next_page_offset(
            &self.state.feed.cache,
            self.state.cursor,
            self.state.feed.gate_open(),
            self.page_in_flight,
            self.page_attempted,
        ) else {
            return;
        };
        self.page_in_flight = Some(offset);
        self.page_attempted = Some(offset);
        spawn_page_fetch(
            self.api.clone(),
            self.state.filter.clone(),
            self.state.feed.key().clone(),
            offset,
            self.config.page_size,
            self.tx.clone(),
        );
    }

    fn spawn_head(&mut self) {
        self.head_in_flight = true;
        self.last_head_poll_ms = now_ms();
        spawn_head_fetch(
            self.api.clone(),
            self.state.filter.clone(),
            self.state.feed.key().clone(),
            self.config.page_size,
            self.tx.clone(),
        );
    }

    fn expire_toast(&mut self) {
        if let Some(toast) = &self.state.toast
            && now_ms().saturating_sub(toast.shown_at_ms) >= TOAST_TTL_MS
        {
            self.state.toast = None;
            self.state.dirty = true;
        }
    }
}

/// Whether a page fetch should go out, and at which offset.
///
/// Edge-triggered: `attempted` holds the offset of the previous request, so
/// an offset that failed (or is parked in the pending buffer while a detail
/// is open) is only retried once the viewer scrolls again. While the gate
/// is open no page goes out at all; merged pages could not land anyway.
fn next_page_offset(
    cache: &Cache,
    cursor: usize,
    gate_open: bool,
    in_flight: Option<usize>,
    attempted: Option<usize>,
) -> Option<usize> {
    if cache.items.is_empty() || !cache.has_more() || gate_open || in_flight.is_some() {
        return None;
    }
    if cursor + LOAD_MORE_MARGIN < cache.items.len() {
        return None;
    }
    let offset = cache.items.len();
    if attempted == Some(offset) {
        return None;
    }
    Some(offset)
}
