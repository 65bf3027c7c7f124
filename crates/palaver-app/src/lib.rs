//! Application layer for the palaver chatroom client.
//!
//! Pure state machines and a generic runtime for UI and protocol
//! orchestration, so the same code runs in the production TUI and under
//! scripted tests with a virtual clock.
//!
//! # Components
//!
//! - [`App`]: UI state machine (views, input handling, modals, commands)
//! - [`Bridge`]: protocol bridge (translates App actions to client events)
//! - [`Driver`]: trait for platform-specific I/O
//! - [`Runtime`]: generic orchestration loop owning the three timers

#![forbid(unsafe_code)]

mod action;
mod app;
mod bridge;
mod driver;
mod event;
mod input;
mod links;
mod runtime;
mod state;

pub use action::AppAction;
pub use app::App;
pub use bridge::{Bridge, TimerOp};
pub use driver::Driver;
pub use event::AppEvent;
pub use input::KeyInput;
pub use links::{TextSpan, split_links};
pub use runtime::Runtime;
pub use state::{
    ChatLine, InputState, LogEntry, LoginField, LoginForm, Modal, PrivateWindowState,
    SessionInfo, View,
};
