//! Adaptive group-poll interval control.
//!
//! The tuner owns the polling cadence, not the timer itself: the caller
//! re-arms its timer with whatever interval the tuner hands back. Busy
//! traffic tightens the interval toward the floor; sustained silence relaxes
//! it toward the ceiling; a transport failure pauses polling entirely until
//! the user asks for a retry.

use std::{ops::Sub, time::Duration};

/// Floor of the polling interval.
pub const POLL_MIN: Duration = Duration::from_millis(1000);

/// Ceiling of the polling interval.
pub const POLL_MAX: Duration = Duration::from_millis(10_000);

/// Interval used for the first schedule after login.
pub const POLL_INITIAL: Duration = Duration::from_millis(2000);

/// Tighten factor applied when a poll delivers messages.
const TIGHTEN: f64 = 0.8;

/// Relax factor applied when the stream has gone quiet.
const RELAX: f64 = 1.5;

/// Quiet time required before relaxing kicks in.
const IDLE_THRESHOLD: Duration = Duration::from_secs(30);

/// Consecutive empty polls required before relaxing kicks in.
const EMPTY_STREAK_THRESHOLD: u32 = 3;

/// Lifecycle of the polling loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollPhase {
    /// Not logged in; no polling.
    Idle,
    /// Polling on the current interval.
    Polling,
    /// A poll failed; waiting for a manual retry.
    Paused,
}

/// Adaptive interval state for the group message poll.
///
/// Generic over the instant type so tests can drive a virtual clock; the
/// only requirement is that subtracting two instants yields a [`Duration`].
#[derive(Debug, Clone)]
pub struct PollTuner<I = std::time::Instant> {
    phase: PollPhase,
    interval: Duration,
    empty_streak: u32,
    last_message_at: Option<I>,
}

impl<I> Default for PollTuner<I> {
    fn default() -> Self {
        Self { phase: PollPhase::Idle, interval: POLL_INITIAL, empty_streak: 0, last_message_at: None }
    }
}

impl<I: Copy + Sub<Output = Duration>> PollTuner<I> {
    /// Current polling interval.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Current lifecycle phase.
    pub fn phase(&self) -> PollPhase {
        self.phase
    }

    /// Whether the loop is actively polling.
    pub fn is_polling(&self) -> bool {
        self.phase == PollPhase::Polling
    }

    /// Begin polling at the initial interval.
    pub fn start(&mut self, now: I) -> Duration {
        self.phase = PollPhase::Polling;
        self.interval = POLL_INITIAL;
        self.empty_streak = 0;
        self.last_message_at = Some(now);
        self.interval
    }

    /// Stop polling and reset to the idle defaults.
    pub fn stop(&mut self) {
        *self = Self::default();
    }

    /// Absorb a successful poll that delivered `delivered` messages and
    /// return the interval to re-arm with.
    ///
    /// Messages tighten the interval toward the floor. Silence relaxes it
    /// toward the ceiling, but only once the stream has been quiet past both
    /// the empty-streak and the wall-clock thresholds.
    pub fn on_batch(&mut self, now: I, delivered: usize) -> Duration {
        if delivered > 0 {
            self.empty_streak = 0;
            self.last_message_at = Some(now);
            self.interval = self.interval.mul_f64(TIGHTEN).max(POLL_MIN);
        } else {
            self.empty_streak = self.empty_streak.saturating_add(1);
            if self.empty_streak > EMPTY_STREAK_THRESHOLD && self.idle_long(now) {
                self.interval = self.interval.mul_f64(RELAX).min(POLL_MAX);
            }
        }
        self.interval
    }

    /// Absorb a failed poll. Polling pauses until [`Self::on_retry`].
    pub fn on_failure(&mut self) {
        self.phase = PollPhase::Paused;
    }

    /// Resume after a failure at the minimum interval.
    pub fn on_retry(&mut self, now: I) -> Duration {
        self.phase = PollPhase::Polling;
        self.interval = POLL_MIN;
        self.empty_streak = 0;
        self.last_message_at = Some(now);
        self.interval
    }

    /// Absorb local user activity.
    ///
    /// Activity snaps a relaxed interval back to twice the floor so the next
    /// replies arrive promptly. Returns the new interval when it changed.
    pub fn on_activity(&mut self) -> Option<Duration> {
        let snap = POLL_MIN * 2;
        if self.phase == PollPhase::Polling && self.interval > snap {
            self.interval = snap;
            Some(snap)
        } else {
            None
        }
    }

    /// No message seen for at least [`IDLE_THRESHOLD`]. A tuner that has
    /// never seen a message counts as idle.
    fn idle_long(&self, now: I) -> bool {
        self.last_message_at.is_none_or(|at| now - at >= IDLE_THRESHOLD)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{POLL_INITIAL, POLL_MAX, POLL_MIN, PollPhase, PollTuner};

    /// Virtual instant: milliseconds since an arbitrary origin.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
    struct Tick(u64);

    impl std::ops::Sub for Tick {
        type Output = Duration;
        fn sub(self, rhs: Self) -> Duration {
            Duration::from_millis(self.0 - rhs.0)
        }
    }

    #[test]
    fn messages_tighten_toward_the_floor() {
        let mut tuner = PollTuner::<Tick>::default();
        tuner.start(Tick(0));
        assert_eq!(tuner.interval(), POLL_INITIAL);

        let mut now = 0;
        for _ in 0..20 {
            now += 1000;
            tuner.on_batch(Tick(now), 1);
        }
        assert_eq!(tuner.interval(), POLL_MIN);
    }

    #[test]
    fn silence_relaxes_only_after_both_thresholds() {
        let mut tuner = PollTuner::<Tick>::default();
        tuner.start(Tick(0));

        // Three empty polls within the quiet window: streak not yet over
        // the threshold, interval unchanged.
        for i in 1..=3u64 {
            assert_eq!(tuner.on_batch(Tick(i * 2000), 0), POLL_INITIAL);
        }
        // Fourth empty poll but still inside the 30 s window.
        assert_eq!(tuner.on_batch(Tick(8000), 0), POLL_INITIAL);
        // Past 30 s of silence the interval relaxes.
        let relaxed = tuner.on_batch(Tick(31_000), 0);
        assert!(relaxed > POLL_INITIAL);
    }

    #[test]
    fn relaxing_caps_at_the_ceiling() {
        let mut tuner = PollTuner::<Tick>::default();
        tuner.start(Tick(0));
        let mut now = 31_000;
        for _ in 0..20 {
            tuner.on_batch(Tick(now), 0);
            now += 10_000;
        }
        assert_eq!(tuner.interval(), POLL_MAX);
    }

    #[test]
    fn activity_snaps_a_relaxed_interval() {
        let mut tuner = PollTuner::<Tick>::default();
        tuner.start(Tick(0));
        let mut now = 31_000;
        while tuner.interval() < POLL_MAX {
            tuner.on_batch(Tick(now), 0);
            now += 10_000;
        }
        assert_eq!(tuner.on_activity(), Some(POLL_MIN * 2));
        // Already at the snap point: no change reported.
        assert_eq!(tuner.on_activity(), None);
    }

    #[test]
    fn retry_resumes_at_the_floor() {
        let mut tuner = PollTuner::<Tick>::default();
        tuner.start(Tick(0));
        tuner.on_failure();
        assert_eq!(tuner.phase(), PollPhase::Paused);
        assert_eq!(tuner.on_retry(Tick(5000)), POLL_MIN);
        assert!(tuner.is_polling());
    }
}
