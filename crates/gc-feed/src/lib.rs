//! Pure state core for the gateway-console live request-log feed.
//!
//! Everything here is synchronous and I/O-free: the binary's fetch workers
//! and event loop produce [`FeedMsg`] values, and [`FeedState::apply`] is
//! the only place the cache changes. The merge rules guarantee a
//! newest-first list with unique ids whose length never exceeds the
//! server-reported total, and the interaction gate keeps the list frozen
//! while the viewer has a row detail open.

mod cache;
mod entry;
mod filter;
mod gate;
mod merge;
mod reducer;
mod window;

pub use cache::Cache;
pub use entry::LogEntry;
pub use filter::{FilterKey, LogFilter};
pub use gate::{InteractionGate, PendingBuffer};
pub use merge::{merge_head, merge_page};
pub use reducer::{FeedMsg, FeedState};
pub use window::Window;
