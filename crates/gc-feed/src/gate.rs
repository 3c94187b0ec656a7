use crate::window::Window;

/// Reference count of open row interactions (detail popups, tooltips).
///
/// While the count is positive the cache must not change under the viewer,
/// so arriving windows are parked in a [`PendingBuffer`] instead of being
/// merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InteractionGate(u32);

impl InteractionGate {
    pub fn open(&mut self) {
        self.0 += 1;
    }

    /// Decrement, floored at zero. Returns `true` only on the transition
    /// from open to shut, i.e. when the last interaction closed.
    pub fn close(&mut self) -> bool {
        if self.0 == 0 {
            return false;
        }
        self.0 -= 1;
        self.0 == 0
    }

    pub fn is_open(&self) -> bool {
        self.0 > 0
    }
}

/// At most one held window per fetch kind. A newer window of the same kind
/// overwrites the older one; only the latest matters, since each window
/// carries the full authoritative snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PendingBuffer {
    /// Latest head window plus the at-top flag captured when it arrived.
    pub head: Option<(Window, bool)>,
    pub page: Option<Window>,
}

impl PendingBuffer {
    pub fn is_empty(&self) -> bool {
        self.head.is_none() && self.page.is_none()
    }

    pub fn clear(&mut self) {
        self.head = None;
        self.page = None;
    }
}
