//! Property tests for the adaptive poll tuner.
//!
//! The tuner is the part of the client with the most numeric state, so it
//! gets property coverage: the interval must stay inside its bounds under
//! any event sequence, traffic must never slow polling down, and silence
//! must never speed it up.

use std::time::Duration;

use palaver_client::{POLL_MAX, POLL_MIN, PollPhase, PollTuner};
use proptest::prelude::*;

/// Virtual instant: milliseconds since an arbitrary origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Tick(u64);

impl std::ops::Sub for Tick {
    type Output = Duration;
    fn sub(self, rhs: Self) -> Duration {
        Duration::from_millis(self.0 - rhs.0)
    }
}

#[derive(Debug, Clone)]
enum Step {
    /// A poll completed after `dt` ms delivering `delivered` messages.
    Batch { dt: u64, delivered: usize },
    /// Local user activity.
    Activity,
    /// A poll failed.
    Failure,
    /// The user clicked retry after `dt` ms.
    Retry { dt: u64 },
}

fn step_strategy() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0u64..60_000, 0usize..10).prop_map(|(dt, delivered)| Step::Batch { dt, delivered }),
        Just(Step::Activity),
        Just(Step::Failure),
        (0u64..60_000).prop_map(|dt| Step::Retry { dt }),
    ]
}

fn run(tuner: &mut PollTuner<Tick>, now: &mut u64, step: &Step) {
    match *step {
        Step::Batch { dt, delivered } => {
            *now += dt;
            tuner.on_batch(Tick(*now), delivered);
        },
        Step::Activity => {
            tuner.on_activity();
        },
        Step::Failure => tuner.on_failure(),
        Step::Retry { dt } => {
            *now += dt;
            tuner.on_retry(Tick(*now));
        },
    }
}

proptest! {
    /// The interval never leaves [POLL_MIN, POLL_MAX], whatever happens.
    #[test]
    fn interval_stays_within_bounds(
        steps in proptest::collection::vec(step_strategy(), 0..200),
    ) {
        let mut tuner = PollTuner::<Tick>::default();
        let mut now = 0u64;
        tuner.start(Tick(now));
        for step in &steps {
            run(&mut tuner, &mut now, step);
            prop_assert!(tuner.interval() >= POLL_MIN);
            prop_assert!(tuner.interval() <= POLL_MAX);
        }
    }

    /// A poll that delivers messages never relaxes the interval.
    #[test]
    fn delivery_never_relaxes(
        prefix in proptest::collection::vec(step_strategy(), 0..100),
        dt in 0u64..60_000,
        delivered in 1usize..10,
    ) {
        let mut tuner = PollTuner::<Tick>::default();
        let mut now = 0u64;
        tuner.start(Tick(now));
        for step in &prefix {
            run(&mut tuner, &mut now, step);
        }
        let before = tuner.interval();
        now += dt;
        let after = tuner.on_batch(Tick(now), delivered);
        prop_assert!(after <= before);
    }

    /// An empty poll never tightens the interval.
    #[test]
    fn silence_never_tightens(
        prefix in proptest::collection::vec(step_strategy(), 0..100),
        dt in 0u64..60_000,
    ) {
        let mut tuner = PollTuner::<Tick>::default();
        let mut now = 0u64;
        tuner.start(Tick(now));
        for step in &prefix {
            run(&mut tuner, &mut now, step);
        }
        let before = tuner.interval();
        now += dt;
        let after = tuner.on_batch(Tick(now), 0);
        prop_assert!(after >= before);
    }

    /// Retry always resumes polling at the floor, from any state.
    #[test]
    fn retry_resumes_at_the_floor(
        prefix in proptest::collection::vec(step_strategy(), 0..100),
    ) {
        let mut tuner = PollTuner::<Tick>::default();
        let mut now = 0u64;
        tuner.start(Tick(now));
        for step in &prefix {
            run(&mut tuner, &mut now, step);
        }
        tuner.on_failure();
        prop_assert_eq!(tuner.phase(), PollPhase::Paused);
        now += 1;
        prop_assert_eq!(tuner.on_retry(Tick(now)), POLL_MIN);
        prop_assert!(tuner.is_polling());
    }
}
