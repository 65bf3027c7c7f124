//! Generic runtime for application orchestration.
//!
//! The Runtime drives the application event loop, coordinating between:
//! - [`App`]: UI state machine
//! - [`Bridge`]: protocol bridge to the client
//! - [`Driver`]: platform-specific I/O
//!
//! It also owns the three deadline timers (group poll, heartbeat, private
//! liveness). A timer is a deadline, not a queue: re-arming replaces it, so
//! a stale schedule can never stack requests or fire after the client asked
//! for a stop.

use std::time::Duration;

use crate::{App, AppAction, AppEvent, Bridge, Driver, bridge::TimerOp};

/// Input wait used when no timer is armed (login screen).
const IDLE_TIMEOUT: Duration = Duration::from_millis(200);

/// A periodic deadline.
#[derive(Debug, Clone, Copy)]
struct Deadline<I> {
    armed_at: I,
    period: Duration,
}

impl<I: Copy + std::ops::Sub<Output = Duration>> Deadline<I> {
    fn is_due(&self, now: I) -> bool {
        now - self.armed_at >= self.period
    }

    fn remaining(&self, now: I) -> Duration {
        self.period.saturating_sub(now - self.armed_at)
    }
}

/// Generic runtime that orchestrates App, Bridge, and Driver.
pub struct Runtime<D: Driver> {
    driver: D,
    app: App,
    bridge: Bridge<D::Instant>,
    poll: Option<Deadline<D::Instant>>,
    heartbeat: Option<Deadline<D::Instant>>,
    liveness: Option<Deadline<D::Instant>>,
    quit: bool,
}

impl<D: Driver> Runtime<D> {
    /// Create a new runtime with the given driver.
    pub fn new(driver: D) -> Self {
        Self {
            driver,
            app: App::new(),
            bridge: Bridge::new(),
            poll: None,
            heartbeat: None,
            liveness: None,
            quit: false,
        }
    }

    /// Run the main event loop.
    ///
    /// One cycle: wait for input up to the nearest timer deadline, pump the
    /// resulting event through App and Bridge (executing any requests the
    /// client wants in flight), then fire whichever timers came due.
    ///
    /// # Errors
    ///
    /// Returns an error if the driver encounters an I/O error.
    pub async fn run(&mut self) -> Result<(), D::Error> {
        self.driver.render(&self.app)?;

        while !self.quit {
            self.process_cycle().await?;
        }

        self.driver.stop();
        Ok(())
    }

    /// Process one cycle of the event loop.
    async fn process_cycle(&mut self) -> Result<(), D::Error> {
        let timeout = self.next_timeout();
        if let Some(event) = self.driver.next_event(timeout).await? {
            self.pump(vec![event]).await?;
            if self.quit {
                return Ok(());
            }
        }
        self.fire_due_timers().await
    }

    /// How long the driver may wait for input before a timer needs service.
    fn next_timeout(&self) -> Duration {
        let now = self.driver.now();
        [&self.poll, &self.heartbeat, &self.liveness]
            .into_iter()
            .filter_map(|t| t.as_ref().map(|d| d.remaining(now)))
            .min()
            .unwrap_or(IDLE_TIMEOUT)
    }

    /// Fire every timer whose deadline passed and pump the fallout.
    async fn fire_due_timers(&mut self) -> Result<(), D::Error> {
        let now = self.driver.now();
        let mut events = Vec::new();

        if let Some(deadline) = &mut self.poll {
            if deadline.is_due(now) {
                deadline.armed_at = now;
                events.extend(self.bridge.handle_poll_due(now));
            }
        }
        if let Some(deadline) = &mut self.heartbeat {
            if deadline.is_due(now) {
                deadline.armed_at = now;
                events.extend(self.bridge.handle_heartbeat_due());
            }
        }
        if let Some(deadline) = &mut self.liveness {
            if deadline.is_due(now) {
                deadline.armed_at = now;
                events.extend(self.bridge.handle_liveness_due());
            }
        }

        self.pump(events).await
    }

    /// Alternate App and Bridge passes until the system settles.
    ///
    /// Events become actions; protocol actions become client events whose
    /// requests are executed right here, and the responses feed back as new
    /// events. `Quit` sets the flag but lets the pass finish so a final
    /// logout still reaches the wire.
    async fn pump(&mut self, mut events: Vec<AppEvent>) -> Result<(), D::Error> {
        loop {
            let mut actions = Vec::new();
            for event in events.drain(..) {
                actions.extend(self.app.handle(event));
            }

            for action in actions {
                match action {
                    AppAction::Render => self.driver.render(&self.app)?,
                    AppAction::Quit => self.quit = true,
                    other => {
                        let now = self.driver.now();
                        events.extend(self.bridge.process_app_action(other, now));
                    },
                }
            }
            self.apply_timer_ops();

            for request in self.bridge.take_outgoing() {
                let kind = request.kind();
                let result = self.driver.call(request).await;
                let now = self.driver.now();
                events.extend(self.bridge.handle_response(kind, result, now));
                self.apply_timer_ops();
            }

            if events.is_empty() && !self.bridge.has_outgoing() {
                return Ok(());
            }
        }
    }

    /// Apply timer instructions accumulated in the bridge.
    fn apply_timer_ops(&mut self) {
        let ops = self.bridge.take_timer_ops();
        if ops.is_empty() {
            return;
        }
        let now = self.driver.now();
        for op in ops {
            tracing::debug!(?op, "applying timer op");
            match op {
                TimerOp::SchedulePoll(period) => {
                    self.poll = Some(Deadline { armed_at: now, period });
                },
                TimerOp::StopPoll => self.poll = None,
                TimerOp::StartHeartbeat(period) => {
                    self.heartbeat = Some(Deadline { armed_at: now, period });
                },
                TimerOp::StopHeartbeat => self.heartbeat = None,
                TimerOp::StartLiveness(period) => {
                    self.liveness = Some(Deadline { armed_at: now, period });
                },
                TimerOp::StopLiveness => self.liveness = None,
            }
        }
    }

    /// Get a reference to the App.
    pub fn app(&self) -> &App {
        &self.app
    }

    /// Get a mutable reference to the App.
    pub fn app_mut(&mut self) -> &mut App {
        &mut self.app
    }
}
