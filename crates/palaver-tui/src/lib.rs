//! Terminal UI for the palaver chatroom
//!
//! A thin shell over [`palaver_app::Driver`]: crossterm input, ratatui
//! rendering, and a reqwest HTTP transport. All orchestration logic lives
//! in the generic [`palaver_app::Runtime`].

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod api;
pub mod terminal;
pub mod ui;

pub use api::HttpApi;
pub use palaver_app::{App, AppEvent, Driver, KeyInput, Runtime};
pub use terminal::{TerminalDriver, TerminalError};
