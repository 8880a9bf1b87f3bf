//! "Copied" indicator shown after a password is copied.
//!
//! This is a UI signal with a deadline. The OS clipboard itself is never
//! touched or cleared here.

use std::time::{Duration, Instant};

/// Default indicator lifetime.
pub const DEFAULT_COPIED_INDICATOR: Duration = Duration::from_secs(15);

/// Tracks which item was last copied and until when to show it.
#[derive(Debug, Clone)]
pub struct CopiedIndicator {
    lifetime: Duration,
    copied: Option<(String, Instant)>,
}

impl Default for CopiedIndicator {
    fn default() -> Self {
        Self::new(DEFAULT_COPIED_INDICATOR)
    }
}

impl CopiedIndicator {
    /// Indicator that stays visible for `lifetime` after each copy.
    #[must_use]
    pub const fn new(lifetime: Duration) -> Self {
        Self {
            lifetime,
            copied: None,
        }
    }

    /// Mark `item_id` as copied now. Replaces any earlier mark.
    pub fn mark_copied(&mut self, item_id: &str) {
        self.mark_copied_at(item_id, Instant::now());
    }

    /// Mark `item_id` as copied at `now`.
    pub fn mark_copied_at(&mut self, item_id: &str, now: Instant) {
        self.copied = Some((item_id.to_owned(), now));
    }

    /// The item currently shown as copied, if its deadline has not passed.
    #[must_use]
    pub fn copied_item(&self) -> Option<&str> {
        self.copied_item_at(Instant::now())
    }

    /// Same as [`copied_item`](Self::copied_item) against an explicit clock.
    #[must_use]
    pub fn copied_item_at(&self, now: Instant) -> Option<&str> {
        self.copied
            .as_ref()
            .filter(|(_, at)| now.saturating_duration_since(*at) < self.lifetime)
            .map(|(id, _)| id.as_str())
    }

    /// Drop the mark immediately.
    pub fn clear(&mut self) {
        self.copied = None;
    }
}
