//! Application state machine.
//!
//! [`App`] manages the interactive state of the client: which view is
//! shown, the group log, the input line, the private list and window, and
//! modal dialogs. It is a pure state machine consuming [`crate::AppEvent`]
//! and producing [`crate::AppAction`]; no I/O, no clocks.
//!
//! # Input model
//!
//! - Login view: Tab switches fields, Enter submits, Esc quits.
//! - Group view: Enter sends (or runs a `/command`), Tab opens the private
//!   list, Up/Down select a user, Enter on an empty line inserts a
//!   `@name` mention for the selected user.
//! - Private list: Up/Down select, Enter opens, `d` asks to destroy,
//!   `r` refreshes, Tab/Esc return to the group.
//! - Private window: Enter sends, Esc closes the window.
//! - Any modal eats all keys until dismissed.

use palaver_client::PrivateChatSummary;
use palaver_proto::{MessageKind, WireMessage};

use crate::{
    AppAction, AppEvent, KeyInput,
    state::{
        ChatLine, InputState, LogEntry, LoginField, LoginForm, Modal, PrivateWindowState,
        SessionInfo, View,
    },
};

/// Tip appended to the group log when polling stops after a failure.
const RETRY_TIP: &str = "连接中断，输入 /retry 重试";

/// Application state machine.
///
/// Pure state machine that processes events and produces actions.
/// No I/O dependencies, fully testable without a terminal.
#[derive(Debug, Clone)]
pub struct App {
    view: View,
    login: LoginForm,
    session: Option<SessionInfo>,
    log: Vec<LogEntry>,
    users: Vec<String>,
    /// Mention-helper selection into `users`.
    user_cursor: Option<usize>,
    input: InputState,
    private_chats: Vec<PrivateChatSummary>,
    /// Selection into `private_chats`.
    private_cursor: usize,
    window: Option<PrivateWindowState>,
    modal: Option<Modal>,
    retry_offered: bool,
    status_message: Option<String>,
    terminal_size: (u16, u16),
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl App {
    /// Create a logged-out App showing the login form.
    pub fn new() -> Self {
        Self {
            view: View::Login,
            login: LoginForm::default(),
            session: None,
            log: Vec::new(),
            users: Vec::new(),
            user_cursor: None,
            input: InputState::default(),
            private_chats: Vec::new(),
            private_cursor: 0,
            window: None,
            modal: None,
            retry_offered: false,
            status_message: None,
            terminal_size: (80, 24),
        }
    }

    /// Process an event and return actions.
    pub fn handle(&mut self, event: AppEvent) -> Vec<AppAction> {
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Tick => vec![],
            AppEvent::Resize(cols, rows) => {
                self.terminal_size = (cols, rows);
                vec![AppAction::Render]
            },
            AppEvent::LoggedIn { name, key } => {
                self.session = Some(SessionInfo { name, key });
                self.login.password.clear();
                self.view = View::Group;
                self.status_message = None;
                vec![AppAction::Render]
            },
            AppEvent::LoggedOut => {
                let size = self.terminal_size;
                *self = Self::new();
                self.terminal_size = size;
                vec![AppAction::Render]
            },
            AppEvent::MessagesDelivered(messages) => {
                let session_key =
                    self.session.as_ref().map(|s| s.key.as_str()).unwrap_or_default();
                for msg in messages {
                    self.log.push(log_entry(msg, session_key));
                }
                vec![AppAction::Render]
            },
            AppEvent::UsersUpdated(users) => {
                self.users = users;
                self.user_cursor = match self.user_cursor {
                    Some(i) if i < self.users.len() => Some(i),
                    _ => None,
                };
                vec![AppAction::Render]
            },
            AppEvent::LogCleared => {
                self.log.clear();
                self.retry_offered = false;
                vec![AppAction::Render]
            },
            AppEvent::TipPosted(text) => {
                self.log.push(LogEntry::Tip(text));
                vec![AppAction::Render]
            },
            AppEvent::PrivateChatsUpdated(chats) => {
                self.private_chats = chats;
                self.private_cursor =
                    self.private_cursor.min(self.private_chats.len().saturating_sub(1));
                vec![AppAction::Render]
            },
            AppEvent::PrivateHistoryLoaded { chat_id, messages } => {
                if let Some(window) = &mut self.window {
                    if window.chat_id == chat_id {
                        window.messages = messages;
                    }
                }
                vec![AppAction::Render]
            },
            AppEvent::WindowOpened { chat_id, other_name } => {
                self.window =
                    Some(PrivateWindowState { chat_id, other_name, messages: Vec::new() });
                self.view = View::PrivateWindow;
                self.input = InputState::default();
                vec![AppAction::Render]
            },
            AppEvent::WindowClosed => {
                self.window = None;
                if self.view == View::PrivateWindow {
                    self.view = View::Group;
                }
                vec![AppAction::Render]
            },
            AppEvent::DialogRaised(text) => {
                self.modal = Some(Modal::Notice(text));
                vec![AppAction::Render]
            },
            AppEvent::ForcedGroupView => {
                // A sweep invalidates whatever a pending confirmation was
                // about; notices stay up for the user to dismiss.
                if matches!(self.modal, Some(Modal::ConfirmDestroy { .. })) {
                    self.modal = None;
                }
                self.view = View::Group;
                vec![AppAction::Render]
            },
            AppEvent::RetryOffered => {
                self.retry_offered = true;
                self.log.push(LogEntry::Tip(RETRY_TIP.to_string()));
                vec![AppAction::Render]
            },
            AppEvent::Error { message } => {
                self.status_message = Some(format!("Error: {message}"));
                vec![AppAction::Render]
            },
        }
    }

    fn handle_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        if self.modal.is_some() {
            return self.handle_modal_key(key);
        }
        match self.view {
            View::Login => self.handle_login_key(key),
            View::Group => self.handle_group_key(key),
            View::PrivateList => self.handle_private_list_key(key),
            View::PrivateWindow => self.handle_private_window_key(key),
        }
    }

    fn handle_modal_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        let Some(modal) = self.modal.clone() else {
            return vec![];
        };
        match modal {
            Modal::Notice(_) => match key {
                KeyInput::Enter | KeyInput::Esc => {
                    self.modal = None;
                    vec![AppAction::Render]
                },
                _ => vec![],
            },
            Modal::ConfirmDestroy { chat_id, .. } => match key {
                KeyInput::Char('y') | KeyInput::Enter => {
                    self.modal = None;
                    vec![AppAction::DestroyPrivateChat { chat_id }, AppAction::Render]
                },
                KeyInput::Char('n') | KeyInput::Esc => {
                    self.modal = None;
                    vec![AppAction::Render]
                },
                _ => vec![],
            },
        }
    }

    fn handle_login_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Char(ch) => {
                match self.login.field {
                    LoginField::Nickname => self.login.nickname.push(ch),
                    LoginField::Password => self.login.password.push(ch),
                }
                vec![AppAction::Render]
            },
            KeyInput::Backspace => {
                match self.login.field {
                    LoginField::Nickname => {
                        self.login.nickname.pop();
                    },
                    LoginField::Password => {
                        self.login.password.pop();
                    },
                }
                vec![AppAction::Render]
            },
            KeyInput::Tab | KeyInput::Up | KeyInput::Down => {
                self.login.field = match self.login.field {
                    LoginField::Nickname => LoginField::Password,
                    LoginField::Password => LoginField::Nickname,
                };
                vec![AppAction::Render]
            },
            KeyInput::Enter => {
                self.status_message = Some("登录中...".to_string());
                vec![
                    AppAction::Login {
                        nickname: self.login.nickname.clone(),
                        password: self.login.password.clone(),
                    },
                    AppAction::Render,
                ]
            },
            KeyInput::Esc => vec![AppAction::Quit],
            _ => vec![],
        }
    }

    fn handle_group_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Char(ch) => {
                self.input.insert(ch);
                vec![AppAction::Activity, AppAction::Render]
            },
            KeyInput::Backspace => {
                self.input.backspace();
                vec![AppAction::Render]
            },
            KeyInput::Delete => {
                self.input.delete();
                vec![AppAction::Render]
            },
            KeyInput::Left => {
                self.input.left();
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.input.right();
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.input.home();
                vec![AppAction::Render]
            },
            KeyInput::End => {
                self.input.end();
                vec![AppAction::Render]
            },
            KeyInput::Up => {
                self.user_cursor = match self.user_cursor {
                    None if !self.users.is_empty() => Some(self.users.len() - 1),
                    Some(i) if i > 0 => Some(i - 1),
                    other => other,
                };
                vec![AppAction::Render]
            },
            KeyInput::Down => {
                self.user_cursor = match self.user_cursor {
                    None if !self.users.is_empty() => Some(0),
                    Some(i) if i + 1 < self.users.len() => Some(i + 1),
                    other => other,
                };
                vec![AppAction::Render]
            },
            KeyInput::Tab => {
                self.view = View::PrivateList;
                vec![AppAction::RefreshPrivateChats, AppAction::Render]
            },
            KeyInput::Enter => self.submit_group_input(),
            KeyInput::Esc => {
                self.input = InputState::default();
                self.user_cursor = None;
                vec![AppAction::Render]
            },
        }
    }

    /// Enter in the group view: mention insertion on an empty line,
    /// otherwise a command or a plain message.
    fn submit_group_input(&mut self) -> Vec<AppAction> {
        if self.input.buffer.trim().is_empty() {
            if let Some(name) = self.user_cursor.and_then(|i| self.users.get(i)) {
                let mention = format!("@{name} ");
                self.input = InputState::default();
                self.input.push_str(&mention);
                return vec![AppAction::Render];
            }
            return vec![];
        }

        let text = self.input.take();
        let mut actions = match parse_command(&text) {
            Some(Command::Upload(paths)) => {
                vec![AppAction::UploadFiles { paths }]
            },
            Some(Command::Retry) => {
                self.retry_offered = false;
                vec![AppAction::RetryPolling]
            },
            Some(Command::Logout) => vec![AppAction::Logout],
            Some(Command::Quit) => return vec![AppAction::Logout, AppAction::Quit],
            // `/destroy` only has meaning inside an open private window.
            Some(Command::Destroy) => vec![],
            None => vec![AppAction::SendMessage { text }],
        };
        actions.push(AppAction::Render);
        actions
    }

    fn handle_private_list_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Up => {
                self.private_cursor = self.private_cursor.saturating_sub(1);
                vec![AppAction::Render]
            },
            KeyInput::Down => {
                if self.private_cursor + 1 < self.private_chats.len() {
                    self.private_cursor += 1;
                }
                vec![AppAction::Render]
            },
            KeyInput::Enter => match self.private_chats.get(self.private_cursor) {
                Some(chat) => {
                    vec![
                        AppAction::OpenPrivateChat { chat_id: chat.chat_id.clone() },
                        AppAction::Render,
                    ]
                },
                None => vec![],
            },
            KeyInput::Char('d') => match self.private_chats.get(self.private_cursor) {
                Some(chat) => {
                    self.modal = Some(Modal::ConfirmDestroy {
                        chat_id: chat.chat_id.clone(),
                        other_name: chat.other_name.clone(),
                    });
                    vec![AppAction::Render]
                },
                None => vec![],
            },
            KeyInput::Char('r') => vec![AppAction::RefreshPrivateChats, AppAction::Render],
            KeyInput::Tab | KeyInput::Esc => {
                self.view = View::Group;
                vec![AppAction::Render]
            },
            _ => vec![],
        }
    }

    fn handle_private_window_key(&mut self, key: KeyInput) -> Vec<AppAction> {
        match key {
            KeyInput::Char(ch) => {
                self.input.insert(ch);
                vec![AppAction::Activity, AppAction::Render]
            },
            KeyInput::Backspace => {
                self.input.backspace();
                vec![AppAction::Render]
            },
            KeyInput::Delete => {
                self.input.delete();
                vec![AppAction::Render]
            },
            KeyInput::Left => {
                self.input.left();
                vec![AppAction::Render]
            },
            KeyInput::Right => {
                self.input.right();
                vec![AppAction::Render]
            },
            KeyInput::Home => {
                self.input.home();
                vec![AppAction::Render]
            },
            KeyInput::End => {
                self.input.end();
                vec![AppAction::Render]
            },
            KeyInput::Enter => {
                if self.input.buffer.trim().is_empty() {
                    return vec![];
                }
                let text = self.input.take();
                if parse_command(&text) == Some(Command::Destroy) {
                    if let Some(window) = &self.window {
                        self.modal = Some(Modal::ConfirmDestroy {
                            chat_id: window.chat_id.clone(),
                            other_name: window.other_name.clone(),
                        });
                    }
                    return vec![AppAction::Render];
                }
                vec![AppAction::SendPrivateMessage { text }, AppAction::Render]
            },
            KeyInput::Esc => {
                self.input = InputState::default();
                vec![AppAction::ClosePrivateChat, AppAction::Render]
            },
            _ => vec![],
        }
    }

    /// Current view.
    pub fn view(&self) -> View {
        self.view
    }

    /// Login form state.
    pub fn login_form(&self) -> &LoginForm {
        &self.login
    }

    /// Logged-in identity, if any.
    pub fn session(&self) -> Option<&SessionInfo> {
        self.session.as_ref()
    }

    /// Group log, oldest first.
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }

    /// Active users, deduplicated.
    pub fn users(&self) -> &[String] {
        &self.users
    }

    /// Mention-helper selection.
    pub fn user_cursor(&self) -> Option<usize> {
        self.user_cursor
    }

    /// Current input line.
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Private chat list.
    pub fn private_chats(&self) -> &[PrivateChatSummary] {
        &self.private_chats
    }

    /// Selection in the private list.
    pub fn private_cursor(&self) -> usize {
        self.private_cursor
    }

    /// The open private window, if any.
    pub fn window(&self) -> Option<&PrivateWindowState> {
        self.window.as_ref()
    }

    /// Active modal, if any.
    pub fn modal(&self) -> Option<&Modal> {
        self.modal.as_ref()
    }

    /// Whether the retry hint is showing.
    pub fn retry_offered(&self) -> bool {
        self.retry_offered
    }

    /// Transient status message, if any.
    pub fn status_message(&self) -> Option<&str> {
        self.status_message.as_deref()
    }

    /// Terminal dimensions (columns, rows).
    pub fn terminal_size(&self) -> (u16, u16) {
        self.terminal_size
    }
}

fn log_entry(msg: WireMessage, session_key: &str) -> LogEntry {
    if msg.kind == MessageKind::Sys {
        LogEntry::Tip(msg.msg)
    } else {
        LogEntry::Chat(ChatLine::from_wire(msg, session_key))
    }
}

/// Slash commands accepted on the input line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Upload(Vec<String>),
    Retry,
    Logout,
    Quit,
    Destroy,
}

fn parse_command(text: &str) -> Option<Command> {
    let text = text.trim();
    let rest = text.strip_prefix('/')?;
    let mut parts = rest.split_whitespace();
    match parts.next()? {
        "upload" => {
            let paths: Vec<String> = parts.map(str::to_string).collect();
            if paths.is_empty() { None } else { Some(Command::Upload(paths)) }
        },
        "retry" => Some(Command::Retry),
        "logout" => Some(Command::Logout),
        "quit" => Some(Command::Quit),
        "destroy" => Some(Command::Destroy),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use palaver_proto::MessageKind;

    use super::*;

    fn logged_in_app() -> App {
        let mut app = App::new();
        let _ = app.handle(AppEvent::LoggedIn { name: "alice".into(), key: "k1".into() });
        app
    }

    fn wire(name: &str, key: &str, msg: &str) -> WireMessage {
        WireMessage {
            kind: MessageKind::Text,
            name: name.to_string(),
            key: key.to_string(),
            msg: msg.to_string(),
            timestamp: None,
            file_info: None,
        }
    }

    #[test]
    fn login_submit_produces_login_action() {
        let mut app = App::new();
        for ch in "alice".chars() {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(ch)));
        }
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));
        assert!(matches!(
            actions.as_slice(),
            [AppAction::Login { .. }, AppAction::Render]
        ));
    }

    #[test]
    fn messages_mark_own_by_session_key() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::MessagesDelivered(vec![
            wire("alice", "k1", "mine"),
            wire("bob", "k2", "theirs"),
        ]));
        let own: Vec<bool> = app
            .log()
            .iter()
            .filter_map(|e| match e {
                LogEntry::Chat(line) => Some(line.own),
                LogEntry::Tip(_) => None,
            })
            .collect();
        assert_eq!(own, vec![true, false]);
    }

    #[test]
    fn sys_messages_become_tips() {
        let mut app = logged_in_app();
        let mut sys = wire("", "", "bob joined");
        sys.kind = MessageKind::Sys;
        let _ = app.handle(AppEvent::MessagesDelivered(vec![sys]));
        assert_eq!(app.log(), &[LogEntry::Tip("bob joined".to_string())]);
    }

    #[test]
    fn enter_sends_the_input_line() {
        let mut app = logged_in_app();
        for ch in "hi".chars() {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(ch)));
        }
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));
        assert!(actions.contains(&AppAction::SendMessage { text: "hi".to_string() }));
        assert!(app.input().buffer.is_empty());
    }

    #[test]
    fn upload_command_parses_paths() {
        let mut app = logged_in_app();
        for ch in "/upload a.png b.zip".chars() {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(ch)));
        }
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));
        assert!(actions.contains(&AppAction::UploadFiles {
            paths: vec!["a.png".to_string(), "b.zip".to_string()],
        }));
    }

    #[test]
    fn mention_helper_inserts_selected_user() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::UsersUpdated(vec!["alice".into(), "bob".into()]));
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        let _ = app.handle(AppEvent::Key(KeyInput::Down));
        let _ = app.handle(AppEvent::Key(KeyInput::Enter));
        assert_eq!(app.input().buffer, "@bob ");
    }

    #[test]
    fn typing_reports_activity() {
        let mut app = logged_in_app();
        let actions = app.handle(AppEvent::Key(KeyInput::Char('x')));
        assert!(actions.contains(&AppAction::Activity));
    }

    #[test]
    fn modal_eats_keys_until_dismissed() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::DialogRaised("对方已离线".to_string()));
        let actions = app.handle(AppEvent::Key(KeyInput::Char('x')));
        assert!(actions.is_empty());
        assert!(app.input().buffer.is_empty());

        let _ = app.handle(AppEvent::Key(KeyInput::Enter));
        assert!(app.modal().is_none());
    }

    #[test]
    fn destroy_needs_confirmation() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::PrivateChatsUpdated(vec![PrivateChatSummary {
            chat_id: "c1".to_string(),
            other_name: "bob".to_string(),
            last_preview: None,
            has_unread: false,
        }]));
        let _ = app.handle(AppEvent::Key(KeyInput::Tab));
        assert_eq!(app.view(), View::PrivateList);

        let _ = app.handle(AppEvent::Key(KeyInput::Char('d')));
        assert!(matches!(app.modal(), Some(Modal::ConfirmDestroy { .. })));

        // 'n' aborts.
        let actions = app.handle(AppEvent::Key(KeyInput::Char('n')));
        assert!(!actions.iter().any(|a| matches!(a, AppAction::DestroyPrivateChat { .. })));

        // 'y' destroys.
        let _ = app.handle(AppEvent::Key(KeyInput::Char('d')));
        let actions = app.handle(AppEvent::Key(KeyInput::Char('y')));
        assert!(
            actions.contains(&AppAction::DestroyPrivateChat { chat_id: "c1".to_string() })
        );
    }

    #[test]
    fn window_lifecycle_tracks_view() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::WindowOpened {
            chat_id: "c1".to_string(),
            other_name: "bob".to_string(),
        });
        assert_eq!(app.view(), View::PrivateWindow);

        let _ = app.handle(AppEvent::PrivateHistoryLoaded {
            chat_id: "c1".to_string(),
            messages: vec![],
        });

        let _ = app.handle(AppEvent::WindowClosed);
        assert_eq!(app.view(), View::Group);
        assert!(app.window().is_none());
    }

    #[test]
    fn forced_group_view_drops_pending_confirmation() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::PrivateChatsUpdated(vec![PrivateChatSummary {
            chat_id: "c1".to_string(),
            other_name: "bob".to_string(),
            last_preview: None,
            has_unread: false,
        }]));
        let _ = app.handle(AppEvent::Key(KeyInput::Tab));
        let _ = app.handle(AppEvent::Key(KeyInput::Char('d')));
        assert!(app.modal().is_some());

        let _ = app.handle(AppEvent::ForcedGroupView);
        assert!(app.modal().is_none());
        assert_eq!(app.view(), View::Group);
    }

    #[test]
    fn retry_tip_appears_and_command_clears_it() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::RetryOffered);
        assert!(app.retry_offered());
        assert!(!app.log().is_empty());

        for ch in "/retry".chars() {
            let _ = app.handle(AppEvent::Key(KeyInput::Char(ch)));
        }
        let actions = app.handle(AppEvent::Key(KeyInput::Enter));
        assert!(actions.contains(&AppAction::RetryPolling));
        assert!(!app.retry_offered());
    }

    #[test]
    fn logout_resets_to_login_view() {
        let mut app = logged_in_app();
        let _ = app.handle(AppEvent::MessagesDelivered(vec![wire("bob", "k2", "hi")]));
        let _ = app.handle(AppEvent::LoggedOut);
        assert_eq!(app.view(), View::Login);
        assert!(app.log().is_empty());
        assert!(app.session().is_none());
    }
}
