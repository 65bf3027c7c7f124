//! Protocol-to-application translation layer.
//!
//! The [`Bridge`] wraps the [`palaver_client::Client`] state machine and
//! adapts it to the application lifecycle:
//!
//! - Converts [`crate::AppAction`] protocol intents into client events.
//! - Accumulates outgoing [`ApiRequest`]s for the driver to execute in the
//!   next I/O cycle, and [`TimerOp`]s for the runtime to apply.
//! - Interprets client actions and converts them back into
//!   [`crate::AppEvent`]s for the UI.
//!
//! Generic over the instant type so the same bridge runs in production and
//! under a virtual clock.

use std::{ops::Sub, time::Duration};

use palaver_client::{Client, ClientAction, ClientError, ClientEvent};
use palaver_proto::{ApiError, ApiRequest, ApiResponse, RequestKind};

use crate::{AppAction, AppEvent};

/// Timer instructions for the runtime.
///
/// Scheduling replaces the timer's deadline and period; stale deadlines can
/// never stack or fire after the client asked for a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerOp {
    /// Re-arm the group poll timer with this period.
    SchedulePoll(Duration),
    /// Stop the group poll timer.
    StopPoll,
    /// Arm the heartbeat timer with this period.
    StartHeartbeat(Duration),
    /// Stop the heartbeat timer.
    StopHeartbeat,
    /// Arm the private liveness timer with this period.
    StartLiveness(Duration),
    /// Stop the private liveness timer.
    StopLiveness,
}

/// Bridge between App and Client protocol logic.
pub struct Bridge<I = std::time::Instant> {
    client: Client<I>,
    outgoing: Vec<ApiRequest>,
    timer_ops: Vec<TimerOp>,
}

impl<I: Copy + Sub<Output = Duration>> Default for Bridge<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: Copy + Sub<Output = Duration>> Bridge<I> {
    /// Create a bridge around a fresh, logged-out client.
    pub fn new() -> Self {
        Self { client: Client::new(), outgoing: Vec::new(), timer_ops: Vec::new() }
    }

    /// Process an App action and return resulting App events.
    ///
    /// `Render` and `Quit` are runtime concerns and produce nothing here.
    pub fn process_app_action(&mut self, action: AppAction, now: I) -> Vec<AppEvent> {
        let event = match action {
            AppAction::Login { nickname, password } => ClientEvent::Login { nickname, password },
            AppAction::Logout => ClientEvent::Logout,
            AppAction::SendMessage { text } => ClientEvent::SendMessage { text },
            AppAction::UploadFiles { paths } => ClientEvent::UploadFiles { paths },
            AppAction::OpenPrivateChat { chat_id } => ClientEvent::OpenPrivateChat { chat_id },
            AppAction::ClosePrivateChat => ClientEvent::ClosePrivateChat,
            AppAction::DestroyPrivateChat { chat_id } => {
                ClientEvent::DestroyPrivateChat { chat_id }
            },
            AppAction::SendPrivateMessage { text } => ClientEvent::SendPrivateMessage { text },
            AppAction::RefreshPrivateChats => ClientEvent::RefreshPrivateChats,
            AppAction::RetryPolling => ClientEvent::RetryPolling { now },
            AppAction::Activity => ClientEvent::Activity { now },
            AppAction::Render | AppAction::Quit => return vec![],
        };
        let result = self.client.handle(event);
        self.handle_client_result(result)
    }

    /// The group poll timer fired.
    pub fn handle_poll_due(&mut self, now: I) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::PollDue { now });
        self.handle_client_result(result)
    }

    /// The heartbeat timer fired.
    pub fn handle_heartbeat_due(&mut self) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::HeartbeatDue);
        self.handle_client_result(result)
    }

    /// The private liveness timer fired.
    pub fn handle_liveness_due(&mut self) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::LivenessDue);
        self.handle_client_result(result)
    }

    /// An [`ApiRequest`] completed; feed the result to the client.
    pub fn handle_response(
        &mut self,
        request: RequestKind,
        result: Result<ApiResponse, ApiError>,
        now: I,
    ) -> Vec<AppEvent> {
        let result = self.client.handle(ClientEvent::Response { request, result, now });
        self.handle_client_result(result)
    }

    /// Take pending outgoing requests.
    pub fn take_outgoing(&mut self) -> Vec<ApiRequest> {
        std::mem::take(&mut self.outgoing)
    }

    /// Whether requests are waiting to be executed.
    pub fn has_outgoing(&self) -> bool {
        !self.outgoing.is_empty()
    }

    /// Take pending timer instructions.
    pub fn take_timer_ops(&mut self) -> Vec<TimerOp> {
        std::mem::take(&mut self.timer_ops)
    }

    fn handle_client_result(
        &mut self,
        result: Result<Vec<ClientAction>, ClientError>,
    ) -> Vec<AppEvent> {
        match result {
            Ok(actions) => self.process_client_actions(actions),
            Err(e) => {
                tracing::warn!(error = %e, "client rejected event");
                vec![AppEvent::Error { message: e.to_string() }]
            },
        }
    }

    fn process_client_actions(&mut self, actions: Vec<ClientAction>) -> Vec<AppEvent> {
        let mut events = Vec::new();

        for action in actions {
            match action {
                ClientAction::Call(request) => self.outgoing.push(request),
                ClientAction::SchedulePoll(period) => {
                    self.timer_ops.push(TimerOp::SchedulePoll(period));
                },
                ClientAction::StopPoll => self.timer_ops.push(TimerOp::StopPoll),
                ClientAction::StartHeartbeat(period) => {
                    self.timer_ops.push(TimerOp::StartHeartbeat(period));
                },
                ClientAction::StopHeartbeat => self.timer_ops.push(TimerOp::StopHeartbeat),
                ClientAction::StartLiveness(period) => {
                    self.timer_ops.push(TimerOp::StartLiveness(period));
                },
                ClientAction::StopLiveness => self.timer_ops.push(TimerOp::StopLiveness),
                ClientAction::LoggedIn { name, key } => {
                    events.push(AppEvent::LoggedIn { name, key });
                },
                ClientAction::LoggedOut => events.push(AppEvent::LoggedOut),
                ClientAction::Deliver(messages) => {
                    events.push(AppEvent::MessagesDelivered(messages));
                },
                ClientAction::UsersUpdated(users) => {
                    events.push(AppEvent::UsersUpdated(users));
                },
                ClientAction::ClearLog => events.push(AppEvent::LogCleared),
                ClientAction::Tip(text) => events.push(AppEvent::TipPosted(text)),
                ClientAction::PrivateChatsUpdated(chats) => {
                    events.push(AppEvent::PrivateChatsUpdated(chats));
                },
                ClientAction::PrivateHistory { chat_id, messages } => {
                    events.push(AppEvent::PrivateHistoryLoaded { chat_id, messages });
                },
                ClientAction::WindowOpened { chat_id, other_name } => {
                    events.push(AppEvent::WindowOpened { chat_id, other_name });
                },
                ClientAction::WindowClosed => events.push(AppEvent::WindowClosed),
                ClientAction::Dialog(text) => events.push(AppEvent::DialogRaised(text)),
                ClientAction::ForceGroupView => events.push(AppEvent::ForcedGroupView),
                ClientAction::RetryOffered => events.push(AppEvent::RetryOffered),
            }
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use palaver_proto::{ApiRequest, ApiResponse, LoginReply, RequestKind};

    use super::*;

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
    fn login_action_produces_an_outgoing_request() {
        let mut bridge: Bridge<Tick> = Bridge::new();
        let events = bridge.process_app_action(
            AppAction::Login { nickname: "alice".into(), password: String::new() },
            Tick(0),
        );
        assert!(events.is_empty());
        assert_eq!(bridge.take_outgoing(), vec![ApiRequest::Login {
            nickname: "alice".to_string(),
            password: String::new(),
        }]);
    }

    #[test]
    fn login_response_arms_all_timers() {
        let mut bridge: Bridge<Tick> = Bridge::new();
        let _ = bridge.process_app_action(
            AppAction::Login { nickname: "alice".into(), password: String::new() },
            Tick(0),
        );
        let _ = bridge.take_outgoing();

        let events = bridge.handle_response(
            RequestKind::Login,
            Ok(ApiResponse::Login(LoginReply {
                name: "alice".to_string(),
                key: "k1".to_string(),
                version: 1,
            })),
            Tick(0),
        );

        assert!(events.iter().any(|e| matches!(e, AppEvent::LoggedIn { .. })));
        let ops = bridge.take_timer_ops();
        assert!(ops.contains(&TimerOp::SchedulePoll(Duration::from_millis(2000))));
        assert!(ops.contains(&TimerOp::StartHeartbeat(Duration::from_secs(60))));
        assert!(ops.contains(&TimerOp::StartLiveness(Duration::from_secs(3))));
        assert!(bridge.has_outgoing());
    }

    #[test]
    fn invalid_input_surfaces_as_an_error_event() {
        let mut bridge: Bridge<Tick> = Bridge::new();
        let events = bridge.process_app_action(
            AppAction::Login { nickname: "   ".into(), password: String::new() },
            Tick(0),
        );
        assert!(events.iter().any(|e| matches!(e, AppEvent::Error { .. })));
        assert!(!bridge.has_outgoing());
    }
}
