// =============================================================================
// REMOTE API
// =============================================================================

/// Default gateway base URL when GATEWAY_BASE_URL is not set
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Rows fetched per page from the log endpoint
pub const PAGE_SIZE: usize = 100;

/// Head re-poll interval (milliseconds)
pub const HEAD_POLL_MS: u64 = 2_000;

/// HTTP request timeout (seconds)
pub const FETCH_TIMEOUT_SECS: u64 = 10;

// =============================================================================
// EVENT LOOP
// =============================================================================

/// How long the loop blocks waiting for terminal input per iteration (milliseconds)
pub const EVENT_POLL_MS: u64 = 30;

/// Minimum time between renders (milliseconds, ~28fps)
pub const RENDER_THROTTLE_MS: u64 = 36;

/// Start a page fetch when the cursor is within this many rows of the end
pub const LOAD_MORE_MARGIN: usize = 20;

// =============================================================================
// DISPLAY
// =============================================================================

/// Quota units per currency unit when rendering charges
pub const QUOTA_PER_UNIT: f64 = 500_000.0;

/// How long a toast stays on the status line (milliseconds)
pub const TOAST_TTL_MS: u64 = 5_000;
