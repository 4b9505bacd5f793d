//! Cancellable alarm episodes
//!
//! Each completion episode gets a fresh [`AlarmHandle`]. Whoever drives the
//! repeating wake-ups holds the handle and presents it on every step; once the
//! episode is cancelled the handle is stale and every later step is refused.

/// Identifies one alarm episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AlarmHandle(u64);

impl AlarmHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

/// Tracks the at most one live alarm episode
#[derive(Debug, Default)]
pub struct AlarmLoop {
    next_id: u64,
    active: Option<AlarmHandle>,
}

impl AlarmLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Begin a new episode, retiring any previous one
    pub fn start(&mut self) -> AlarmHandle {
        self.next_id = self.next_id.wrapping_add(1);
        let handle = AlarmHandle(self.next_id);
        self.active = Some(handle);
        handle
    }

    /// End the live episode. Returns whether there was one.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Whether `handle` belongs to the live episode
    pub fn is_current(&self, handle: AlarmHandle) -> bool {
        self.active == Some(handle)
    }
}
