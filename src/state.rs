use std::time::{SystemTime, UNIX_EPOCH};

use chrono::{Local, NaiveDateTime, TimeZone};

use gc_feed::{FeedState, LogFilter};

/// Milliseconds since the UNIX epoch.
pub fn now_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// Status-line message with its display deadline handled by the app loop.
#[derive(Debug, Clone)]
pub struct Toast {
    pub message: String,
    pub shown_at_ms: u64,
}

/// Everything the renderer reads and the actions mutate.
pub struct State {
    /// The live feed (cache + gate + pending buffer), owned by the reducer.
    pub feed: FeedState,
    /// Filter set the feed is currently keyed on.
    pub filter: LogFilter,
    /// Selected row index into `feed.cache.items`.
    pub cursor: usize,
    /// First visible row index.
    pub scroll: usize,
    /// Rows the table area fit on the last render.
    pub table_rows: usize,
    /// Row-detail popup open (this drives the interaction gate).
    pub detail_open: bool,
    pub filter_form: Option<FilterForm>,
    pub toast: Option<Toast>,
    pub dirty: bool,
}

impl State {
    pub fn new(filter: LogFilter) -> Self {
        let feed = FeedState::new(filter.key());
        Self {
            feed,
            filter,
            cursor: 0,
            scroll: 0,
            table_rows: 1,
            detail_open: false,
            filter_form: None,
            toast: None,
            dirty: true,
        }
    }

    /// Keep the cursor on a real row and the scroll window around it.
    pub fn clamp_cursor(&mut self) {
        let len = self.feed.cache.items.len();
        if len == 0 {
            self.cursor = 0;
            self.scroll = 0;
            return;
        }
        if self.cursor >= len {
            self.cursor = len - 1;
        }
        if self.cursor < self.scroll {
            self.scroll = self.cursor;
        }
        let rows = self.table_rows.max(1);
        if self.cursor >= self.scroll + rows {
            self.scroll = self.cursor + 1 - rows;
        }
    }

    pub fn show_toast(&mut self, message: String) {
        self.toast = Some(Toast { message, shown_at_ms: now_ms() });
        self.dirty = true;
    }
}

/// Fields of the filter form, in focus order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterField {
    Kind,
    Model,
    Token,
    Username,
    Search,
    Start,
    End,
}

pub const FILTER_FIELD_ORDER: [FilterField; 7] = [
    FilterField::Kind,
    FilterField::Model,
    FilterField::Token,
    FilterField::Username,
    FilterField::Search,
    FilterField::Start,
    FilterField::End,
];

/// In-progress edit of the filter set. Text fields are free-form; the kind
/// field takes a single digit (0 = all); time bounds parse as
/// `YYYY-MM-DD HH:MM` in the viewer's timezone, anything else means unset.
#[derive(Debug, Clone, Default)]
pub struct FilterForm {
    pub focus: usize,
    pub kind: Option<i32>,
    pub model_name: String,
    pub token_name: String,
    pub username: String,
    pub search: String,
    pub start: String,
    pub end: String,
}

impl FilterForm {
    pub fn from_filter(filter: &LogFilter) -> Self {
        Self {
            focus: 0,
            kind: filter.kind,
            model_name: filter.model_name.clone(),
            token_name: filter.token_name.clone(),
            username: filter.username.clone(),
            search: filter.search.clone(),
            start: filter.start_ts.map(format_ts_input).unwrap_or_default(),
            end: filter.end_ts.map(format_ts_input).unwrap_or_default(),
        }
    }

    pub fn to_filter(&self) -> LogFilter {
        LogFilter {
            kind: self.kind,
            model_name: self.model_name.trim().to_string(),
            token_name: self.token_name.trim().to_string(),
            username: self.username.trim().to_string(),
            search: self.search.trim().to_string(),
            start_ts: parse_ts_input(&self.start),
            end_ts: parse_ts_input(&self.end),
        }
    }

    pub fn field(&self) -> FilterField {
        FILTER_FIELD_ORDER[self.focus % FILTER_FIELD_ORDER.len()]
    }

    pub fn next_field(&mut self) {
        self.focus = (self.focus + 1) % FILTER_FIELD_ORDER.len();
    }

    pub fn prev_field(&mut self) {
        self.focus = (self.focus + FILTER_FIELD_ORDER.len() - 1) % FILTER_FIELD_ORDER.len();
    }

    pub fn push_char(&mut self, c: char) {
        match self.field() {
            FilterField::Kind => {
                if let Some(digit) = c.to_digit(10) {
                    self.kind = if digit == 0 { None } else { Some(digit as i32) };
                }
            }
            _ => self.focused_text().push(c),
        }
    }

    pub fn backspace(&mut self) {
        match self.field() {
            FilterField::Kind => self.kind = None,
            _ => {
                self.focused_text().pop();
            }
        }
    }

    pub fn clear_field(&mut self) {
        match self.field() {
            FilterField::Kind => self.kind = None,
            _ => self.focused_text().clear(),
        }
    }

    fn focused_text(&mut self) -> &mut String {
        match self.field() {
            FilterField::Model => &mut self.model_name,
            FilterField::Token => &mut self.token_name,
            FilterField::Username => &mut self.username,
            FilterField::Search => &mut self.search,
            FilterField::Start => &mut self.start,
            FilterField::End => &mut self.end,
            FilterField::Kind => unreachable!("kind has no text buffer"),
        }
    }
}

const TS_INPUT_FORMAT: &str = "%Y-%m-%d %H:%M";

fn format_ts_input(ts: i64) -> String {
    chrono::DateTime::from_timestamp(ts, 0)
        .map(|dt| dt.with_timezone(&Local).format(TS_INPUT_FORMAT).to_string())
        .unwrap_or_default()
}

fn parse_ts_input(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let naive = NaiveDateTime::parse_from_str(raw, TS_INPUT_FORMAT).ok()?;
    Local.from_local_datetime(&naive).single().map(|dt| dt.timestamp())
}
