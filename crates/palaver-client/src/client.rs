//! Client state machine.
//!
//! The `Client` is the top-level state machine tying together the session,
//! the group message cursor, the adaptive poller, the private chat registry
//! and the reset sweep. It is pure: all I/O and all timers live with the
//! caller.

use std::{collections::HashSet, ops::Sub, time::Duration};

use palaver_proto::{ApiError, ApiRequest, ApiResponse, RequestKind};

use crate::{
    error::ClientError,
    event::{ClientAction, ClientEvent},
    poller::{PollPhase, PollTuner},
    private::{PrivateChats, is_peer_gone},
    reset::ResetGuard,
    session::{MessageCursor, Session},
};

/// Heartbeat cadence (server reaps sessions that miss several).
const HEARTBEAT_PERIOD: Duration = Duration::from_secs(60);

/// Private liveness cadence.
///
/// Session-scoped (armed at login, stopped at logout) rather than
/// per-window: the same `/private/chats` snapshot also refreshes the
/// registry, so the timer keeps running with no window open and closing
/// a window cancels nothing.
const LIVENESS_PERIOD: Duration = Duration::from_secs(3);

/// Tip shown in the group log after a server-side history reset.
const RESET_TIP: &str = "聊天记录已刷新";

/// Dialog shown when the other party of a private chat is gone.
const PEER_GONE_DIALOG: &str = "对方已离线，私聊已结束";

/// Dialog shown when the liveness check fails while a window is open.
const NETWORK_LOST_DIALOG: &str = "网络连接已断开";

/// Dialog confirming the user's own destroy of a private chat.
const DESTROY_DONE_DIALOG: &str = "您已销毁私聊";

const BAD_ADMIN_PASSWORD: &str = "管理员密码错误";
const LOGIN_FAILED: &str = "登录失败，请重试";
const SEND_FAILED: &str = "发送失败，请重试";
const UPLOAD_FAILED: &str = "文件上传失败，请重试";
const PRIVATE_LOAD_FAILED: &str = "加载私聊消息失败";

/// Chatroom client state machine.
///
/// Generic over the instant type; production uses `std::time::Instant`,
/// tests drive a virtual clock.
#[derive(Debug)]
pub struct Client<I = std::time::Instant> {
    session: Option<Session>,
    cursor: MessageCursor,
    poller: PollTuner<I>,
    /// One outstanding `/msg` fetch at a time.
    poll_in_flight: bool,
    /// Single-flight guard shared by group send, upload and private send.
    sending: bool,
    reset_guard: ResetGuard<I>,
    privates: PrivateChats,
}

impl<I> Default for Client<I> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I> Client<I> {
    /// Create a logged-out client.
    pub fn new() -> Self {
        Self {
            session: None,
            cursor: MessageCursor::default(),
            poller: PollTuner::default(),
            poll_in_flight: false,
            sending: false,
            reset_guard: ResetGuard::default(),
            privates: PrivateChats::default(),
        }
    }
}

impl<I: Copy + Sub<Output = Duration>> Client<I> {
    /// Current session, if logged in.
    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    /// Current group message cursor.
    pub fn cursor(&self) -> MessageCursor {
        self.cursor
    }

    /// Current polling phase.
    pub fn poll_phase(&self) -> PollPhase {
        self.poller.phase()
    }

    /// Whether a send, upload or private send is in flight.
    pub fn is_sending(&self) -> bool {
        self.sending
    }

    /// Private chat registry and window.
    pub fn private_chats(&self) -> &PrivateChats {
        &self.privates
    }

    /// Process an event and return resulting actions.
    pub fn handle(&mut self, event: ClientEvent<I>) -> Result<Vec<ClientAction>, ClientError> {
        match event {
            ClientEvent::Login { nickname, password } => self.handle_login(nickname, password),
            ClientEvent::Logout => Ok(self.handle_logout()),
            ClientEvent::SendMessage { text } => self.handle_send(text),
            ClientEvent::UploadFiles { paths } => self.handle_upload(paths),
            ClientEvent::OpenPrivateChat { chat_id } => self.handle_open_private(chat_id),
            ClientEvent::ClosePrivateChat => Ok(self.handle_close_private()),
            ClientEvent::DestroyPrivateChat { chat_id } => {
                Ok(self.handle_destroy_private(chat_id))
            },
            ClientEvent::SendPrivateMessage { text } => self.handle_send_private(text),
            ClientEvent::RefreshPrivateChats => Ok(self.handle_refresh_private()),
            ClientEvent::RetryPolling { now } => Ok(self.handle_retry(now)),
            ClientEvent::Activity { now } => Ok(self.handle_activity(now)),
            ClientEvent::PollDue { now } => Ok(self.handle_poll_due(now)),
            ClientEvent::HeartbeatDue => Ok(self.handle_heartbeat_due()),
            ClientEvent::LivenessDue => Ok(self.handle_liveness_due()),
            ClientEvent::Response { request, result, now } => {
                self.handle_response(request, result, now)
            },
        }
    }

    fn handle_login(
        &mut self,
        nickname: String,
        password: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.is_some() {
            return Ok(Vec::new());
        }
        let nickname = nickname.trim().to_string();
        if nickname.is_empty() {
            return Err(ClientError::Validation { reason: "请输入昵称".to_string() });
        }
        Ok(vec![ClientAction::Call(ApiRequest::Login { nickname, password })])
    }

    fn handle_logout(&mut self) -> Vec<ClientAction> {
        if self.session.is_none() {
            return Vec::new();
        }
        self.session = None;
        self.cursor = MessageCursor::default();
        self.poller.stop();
        self.poll_in_flight = false;
        self.sending = false;
        self.privates.clear();
        vec![
            ClientAction::Call(ApiRequest::Logout),
            ClientAction::StopPoll,
            ClientAction::StopHeartbeat,
            ClientAction::StopLiveness,
            ClientAction::LoggedOut,
        ]
    }

    fn handle_send(&mut self, text: String) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.is_none() {
            return Ok(Vec::new());
        }
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ClientError::Validation { reason: "不能发送空消息".to_string() });
        }
        if self.sending {
            return Ok(Vec::new());
        }
        self.sending = true;
        Ok(vec![ClientAction::Call(ApiRequest::SendMessage { text })])
    }

    fn handle_upload(&mut self, paths: Vec<String>) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.is_none() {
            return Ok(Vec::new());
        }
        if paths.is_empty() {
            return Err(ClientError::Validation { reason: "未选择文件".to_string() });
        }
        if self.sending {
            return Ok(Vec::new());
        }
        self.sending = true;
        Ok(vec![ClientAction::Call(ApiRequest::Upload { paths })])
    }

    fn handle_open_private(
        &mut self,
        chat_id: String,
    ) -> Result<Vec<ClientAction>, ClientError> {
        if self.session.is_none() {
            return Ok(Vec::new());
        }
        let Some(other_name) = self.privates.open(&chat_id) else {
            return Err(ClientError::StaleState {
                reason: format!("private chat {chat_id} is no longer active"),
            });
        };
        Ok(vec![
            ClientAction::WindowOpened { chat_id: chat_id.clone(), other_name },
            ClientAction::Call(ApiRequest::FetchPrivateMessages { chat_id }),
        ])
    }

    fn handle_close_private(&mut self) -> Vec<ClientAction> {
        if self.privates.open_chat_id().is_none() {
            return Vec::new();
        }
        self.privates.close();
        vec![ClientAction::WindowClosed]
    }

    fn handle_destroy_private(&mut self, chat_id: String) -> Vec<ClientAction> {
        if self.session.is_none() {
            return Vec::new();
        }
        let was_open = self.privates.is_open(&chat_id);
        self.privates.remove(&chat_id);
        let mut actions =
            vec![ClientAction::Call(ApiRequest::ExitPrivateChat { chat_id })];
        if was_open {
            actions.push(ClientAction::WindowClosed);
            actions.push(ClientAction::ForceGroupView);
        }
        actions.push(ClientAction::PrivateChatsUpdated(self.privates.summaries().to_vec()));
        actions
    }

    fn handle_send_private(&mut self, text: String) -> Result<Vec<ClientAction>, ClientError> {
        let Some(chat_id) = self.privates.open_chat_id().map(str::to_string) else {
            return Ok(Vec::new());
        };
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(ClientError::Validation { reason: "不能发送空消息".to_string() });
        }
        if self.sending {
            return Ok(Vec::new());
        }
        self.sending = true;
        Ok(vec![ClientAction::Call(ApiRequest::SendPrivateMessage { chat_id, text })])
    }

    fn handle_refresh_private(&self) -> Vec<ClientAction> {
        if self.session.is_none() {
            return Vec::new();
        }
        vec![ClientAction::Call(ApiRequest::FetchPrivateChats)]
    }

    fn handle_retry(&mut self, now: I) -> Vec<ClientAction> {
        if self.session.is_none() || self.poller.phase() != PollPhase::Paused {
            return Vec::new();
        }
        let interval = self.poller.on_retry(now);
        self.poll_in_flight = true;
        vec![
            ClientAction::Call(self.fetch_request()),
            ClientAction::SchedulePoll(interval),
        ]
    }

    fn handle_activity(&mut self, _now: I) -> Vec<ClientAction> {
        match self.poller.on_activity() {
            Some(interval) => vec![ClientAction::SchedulePoll(interval)],
            None => Vec::new(),
        }
    }

    fn handle_poll_due(&mut self, _now: I) -> Vec<ClientAction> {
        if self.session.is_none() || !self.poller.is_polling() || self.poll_in_flight {
            return Vec::new();
        }
        self.poll_in_flight = true;
        vec![ClientAction::Call(self.fetch_request())]
    }

    fn handle_heartbeat_due(&self) -> Vec<ClientAction> {
        if self.session.is_none() {
            return Vec::new();
        }
        vec![ClientAction::Call(ApiRequest::Heartbeat)]
    }

    fn handle_liveness_due(&self) -> Vec<ClientAction> {
        if self.session.is_none() {
            return Vec::new();
        }
        vec![ClientAction::Call(ApiRequest::FetchPrivateChats)]
    }

    fn handle_response(
        &mut self,
        request: RequestKind,
        result: Result<ApiResponse, ApiError>,
        now: I,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match request {
            RequestKind::Login => self.on_login_response(result, now),
            RequestKind::Logout | RequestKind::Heartbeat => Ok(Vec::new()),
            RequestKind::FetchMessages => self.on_poll_response(result, now),
            RequestKind::Send => self.on_send_response(result, now),
            RequestKind::Upload => self.on_upload_response(result),
            RequestKind::PrivateChats => self.on_private_chats_response(result, now),
            RequestKind::PrivateMessages { chat_id } => {
                self.on_private_messages_response(chat_id, result, now)
            },
            RequestKind::PrivateSend { chat_id } => {
                self.on_private_send_response(chat_id, result, now)
            },
            RequestKind::PrivateExit { .. } => Ok(match result {
                Ok(_) => {
                    let mut actions =
                        vec![ClientAction::Call(ApiRequest::FetchPrivateChats)];
                    if !self.reset_guard.is_suppressed(now) {
                        actions.push(ClientAction::Dialog(DESTROY_DONE_DIALOG.to_string()));
                    }
                    actions
                },
                Err(_) => Vec::new(),
            }),
        }
    }

    fn on_login_response(
        &mut self,
        result: Result<ApiResponse, ApiError>,
        now: I,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match result {
            Ok(ApiResponse::Login(reply)) => {
                self.session =
                    Some(Session { name: reply.name.clone(), key: reply.key.clone() });
                self.cursor = MessageCursor::at_epoch(reply.version);
                let interval = self.poller.start(now);
                self.poll_in_flight = true;
                Ok(vec![
                    ClientAction::LoggedIn { name: reply.name, key: reply.key },
                    ClientAction::Call(self.fetch_request()),
                    ClientAction::SchedulePoll(interval),
                    ClientAction::StartHeartbeat(HEARTBEAT_PERIOD),
                    ClientAction::StartLiveness(LIVENESS_PERIOD),
                    ClientAction::Call(ApiRequest::FetchPrivateChats),
                ])
            },
            Ok(other) => Err(mismatched("login", &other)),
            Err(err) if err.is_unauthorized() => {
                Ok(vec![ClientAction::Dialog(BAD_ADMIN_PASSWORD.to_string())])
            },
            Err(_) => Ok(vec![ClientAction::Dialog(LOGIN_FAILED.to_string())]),
        }
    }

    fn on_poll_response(
        &mut self,
        result: Result<ApiResponse, ApiError>,
        now: I,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.poll_in_flight = false;
        if self.session.is_none() {
            return Ok(Vec::new());
        }
        match result {
            Ok(ApiResponse::Messages(resp)) => {
                if resp.reset {
                    return Ok(self.reset_sweep(resp.version, now));
                }
                let mut actions = Vec::new();
                if let Some(version) = resp.version {
                    self.cursor.version = version;
                }
                self.cursor.count = resp.count;
                let messages = resp.parsed_messages();
                let delivered = messages.len();
                if delivered > 0 {
                    actions.push(ClientAction::Deliver(messages));
                }
                actions.push(ClientAction::UsersUpdated(dedup_users(resp.users)));
                actions.push(ClientAction::SchedulePoll(self.poller.on_batch(now, delivered)));
                Ok(actions)
            },
            Ok(other) => Err(mismatched("poll", &other)),
            Err(_) => {
                self.poller.on_failure();
                Ok(vec![ClientAction::StopPoll, ClientAction::RetryOffered])
            },
        }
    }

    fn on_send_response(
        &mut self,
        result: Result<ApiResponse, ApiError>,
        now: I,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.sending = false;
        match result {
            Ok(ApiResponse::Send(reply)) => {
                if reply.admin_clear {
                    // The sender's own view of the clear; everyone else
                    // gets reset:true on their next poll.
                    let mut actions = Vec::new();
                    self.cursor.rebase(reply.version);
                    self.sweep_actions(now, &mut actions);
                    return Ok(actions);
                }
                if let Some(version) = reply.version {
                    self.cursor.version = version;
                }
                Ok(self.after_own_traffic())
            },
            Ok(other) => Err(mismatched("send", &other)),
            Err(_) => Ok(vec![ClientAction::Dialog(SEND_FAILED.to_string())]),
        }
    }

    fn on_upload_response(
        &mut self,
        result: Result<ApiResponse, ApiError>,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.sending = false;
        match result {
            Ok(ApiResponse::Upload(reply)) => {
                if reply.is_success() {
                    if let Some(version) = reply.version {
                        self.cursor.version = version;
                    }
                    Ok(self.after_own_traffic())
                } else {
                    let text = reply.message.unwrap_or_else(|| UPLOAD_FAILED.to_string());
                    Ok(vec![ClientAction::Dialog(text)])
                }
            },
            Ok(other) => Err(mismatched("upload", &other)),
            Err(_) => Ok(vec![ClientAction::Dialog(UPLOAD_FAILED.to_string())]),
        }
    }

    fn on_private_chats_response(
        &mut self,
        result: Result<ApiResponse, ApiError>,
        now: I,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match result {
            Ok(ApiResponse::PrivateChats(reply)) => {
                if !reply.is_success() {
                    return Ok(Vec::new());
                }
                let open = self.privates.open_chat_id().map(str::to_string);
                let lost = self.privates.apply_snapshot(reply.active_chats);
                let mut actions = vec![ClientAction::PrivateChatsUpdated(
                    self.privates.summaries().to_vec(),
                )];
                if lost {
                    if let Some(chat_id) = open {
                        self.peer_loss(&chat_id, now, PEER_GONE_DIALOG, &mut actions);
                    }
                }
                Ok(actions)
            },
            Ok(other) => Err(mismatched("private chats", &other)),
            Err(_) => {
                // Transient when no window is open; the next tick retries.
                // With a window open the liveness contract is broken, so the
                // window closes like any other loss.
                let Some(chat_id) = self.privates.open_chat_id().map(str::to_string) else {
                    return Ok(Vec::new());
                };
                let mut actions = Vec::new();
                self.peer_loss(&chat_id, now, NETWORK_LOST_DIALOG, &mut actions);
                Ok(actions)
            },
        }
    }

    fn on_private_messages_response(
        &mut self,
        chat_id: String,
        result: Result<ApiResponse, ApiError>,
        now: I,
    ) -> Result<Vec<ClientAction>, ClientError> {
        match result {
            Ok(ApiResponse::PrivateMessages { chat_id: reply_chat, reply }) => {
                if reply.is_success() && self.privates.is_open(&reply_chat) {
                    Ok(vec![ClientAction::PrivateHistory {
                        chat_id: reply_chat,
                        messages: reply.messages,
                    }])
                } else {
                    Ok(Vec::new())
                }
            },
            Ok(other) => Err(mismatched("private messages", &other)),
            Err(err) => {
                if !self.privates.is_open(&chat_id) {
                    return Ok(Vec::new());
                }
                if err.is_gone() {
                    let mut actions = Vec::new();
                    self.peer_loss(&chat_id, now, PEER_GONE_DIALOG, &mut actions);
                    actions.push(ClientAction::Call(ApiRequest::FetchPrivateChats));
                    Ok(actions)
                } else {
                    Ok(vec![ClientAction::Dialog(PRIVATE_LOAD_FAILED.to_string())])
                }
            },
        }
    }

    fn on_private_send_response(
        &mut self,
        chat_id: String,
        result: Result<ApiResponse, ApiError>,
        now: I,
    ) -> Result<Vec<ClientAction>, ClientError> {
        self.sending = false;
        match result {
            Ok(ApiResponse::PrivateSend(reply)) => {
                if reply.is_success() {
                    if self.privates.is_open(&chat_id) {
                        return Ok(vec![ClientAction::Call(
                            ApiRequest::FetchPrivateMessages { chat_id },
                        )]);
                    }
                    return Ok(Vec::new());
                }
                let detail = reply.message.unwrap_or_default();
                if is_peer_gone(&detail) {
                    let mut actions = Vec::new();
                    self.peer_loss(&chat_id, now, PEER_GONE_DIALOG, &mut actions);
                    actions.push(ClientAction::Call(ApiRequest::FetchPrivateChats));
                    Ok(actions)
                } else if detail.is_empty() {
                    Ok(vec![ClientAction::Dialog(SEND_FAILED.to_string())])
                } else {
                    Ok(vec![ClientAction::Dialog(detail)])
                }
            },
            Ok(other) => Err(mismatched("private send", &other)),
            Err(err) => {
                if err.is_gone() {
                    let mut actions = Vec::new();
                    self.peer_loss(&chat_id, now, PEER_GONE_DIALOG, &mut actions);
                    actions.push(ClientAction::Call(ApiRequest::FetchPrivateChats));
                    Ok(actions)
                } else {
                    Ok(vec![ClientAction::Dialog(SEND_FAILED.to_string())])
                }
            },
        }
    }

    /// The `/msg` fetch for the current cursor.
    fn fetch_request(&self) -> ApiRequest {
        ApiRequest::FetchMessages { count: self.cursor.count, version: self.cursor.version }
    }

    /// Tighten the poll and fetch right away so own traffic echoes promptly.
    fn after_own_traffic(&mut self) -> Vec<ClientAction> {
        let mut actions = Vec::new();
        if let Some(interval) = self.poller.on_activity() {
            actions.push(ClientAction::SchedulePoll(interval));
        }
        if !self.poll_in_flight && self.poller.is_polling() {
            self.poll_in_flight = true;
            actions.push(ClientAction::Call(self.fetch_request()));
        }
        actions
    }

    /// Full sweep for a stale-version reset from a poll reply.
    fn reset_sweep(&mut self, version: Option<u64>, now: I) -> Vec<ClientAction> {
        self.cursor.rebase(version);
        let mut actions = Vec::new();
        self.sweep_actions(now, &mut actions);
        actions
    }

    /// Shared sweep body for reset and admin clear: wipe the log and all
    /// private state, raise the dialog suppression, return to the group
    /// view and re-poll from the rebased cursor.
    fn sweep_actions(&mut self, now: I, actions: &mut Vec<ClientAction>) {
        self.reset_guard.raise(now);
        let was_open = self.privates.open_chat_id().is_some();
        self.privates.clear();
        actions.push(ClientAction::ClearLog);
        actions.push(ClientAction::Tip(RESET_TIP.to_string()));
        if was_open {
            actions.push(ClientAction::WindowClosed);
        }
        actions.push(ClientAction::ForceGroupView);
        actions.push(ClientAction::PrivateChatsUpdated(Vec::new()));
        if !self.poll_in_flight && self.poller.is_polling() {
            self.poll_in_flight = true;
            actions.push(ClientAction::Call(self.fetch_request()));
        }
        actions.push(ClientAction::SchedulePoll(self.poller.interval()));
    }

    /// A private conversation died: drop it, close its window and notify
    /// the user with `dialog` unless a reset just swept everything anyway.
    fn peer_loss(&mut self, chat_id: &str, now: I, dialog: &str, actions: &mut Vec<ClientAction>) {
        let was_open = self.privates.is_open(chat_id);
        self.privates.remove(chat_id);
        if was_open {
            actions.push(ClientAction::WindowClosed);
            actions.push(ClientAction::ForceGroupView);
        }
        actions.push(ClientAction::PrivateChatsUpdated(self.privates.summaries().to_vec()));
        if !self.reset_guard.is_suppressed(now) {
            actions.push(ClientAction::Dialog(dialog.to_string()));
        }
    }
}

/// First occurrence wins; the server list may repeat names.
fn dedup_users(users: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    users.into_iter().filter(|user| seen.insert(user.clone())).collect()
}

fn mismatched(operation: &str, response: &ApiResponse) -> ClientError {
    ClientError::StaleState {
        reason: format!("mismatched response for {operation}: {response:?}"),
    }
}
