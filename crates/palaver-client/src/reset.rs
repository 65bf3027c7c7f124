//! Dialog suppression around a server-side reset.
//!
//! When the server wipes chat state (admin clear or a stale-version
//! `reset: true` poll reply), in-flight private requests are about to fail
//! with peer-gone errors that would stack alarming dialogs on top of the
//! reset the user already sees. The guard suppresses those dialogs for a
//! short window after the reset.

use std::{ops::Sub, time::Duration};

/// How long after a reset peer-gone dialogs stay suppressed.
const SUPPRESS_WINDOW: Duration = Duration::from_millis(1000);

/// One-shot suppression window keyed on the reset instant.
///
/// Expiry is computed from the clock rather than cleared by hand, so a
/// missed cleanup can never leave dialogs suppressed forever.
#[derive(Debug, Clone, Copy)]
pub struct ResetGuard<I = std::time::Instant> {
    raised_at: Option<I>,
}

impl<I> Default for ResetGuard<I> {
    fn default() -> Self {
        Self { raised_at: None }
    }
}

impl<I: Copy + Sub<Output = Duration>> ResetGuard<I> {
    /// Open the suppression window at `now`. Re-raising moves the window.
    pub fn raise(&mut self, now: I) {
        self.raised_at = Some(now);
    }

    /// Whether a dialog at `now` falls inside the suppression window.
    pub fn is_suppressed(&self, now: I) -> bool {
        self.raised_at.is_some_and(|at| now - at < SUPPRESS_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::ResetGuard;

    #[derive(Debug, Clone, Copy)]
    struct Tick(u64);

    impl std::ops::Sub for Tick {
        type Output = Duration;
        fn sub(self, rhs: Self) -> Duration {
            Duration::from_millis(self.0 - rhs.0)
        }
    }

    #[test]
    fn suppression_expires_without_manual_clear() {
        let mut guard = ResetGuard::<Tick>::default();
        assert!(!guard.is_suppressed(Tick(0)));

        guard.raise(Tick(100));
        assert!(guard.is_suppressed(Tick(100)));
        assert!(guard.is_suppressed(Tick(1099)));
        assert!(!guard.is_suppressed(Tick(1100)));
    }

    #[test]
    fn re_raising_moves_the_window() {
        let mut guard = ResetGuard::<Tick>::default();
        guard.raise(Tick(0));
        guard.raise(Tick(900));
        assert!(guard.is_suppressed(Tick(1500)));
        assert!(!guard.is_suppressed(Tick(1900)));
    }
}
