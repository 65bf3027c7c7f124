//! UI rendering
//!
//! Rendering functions that convert App state into terminal output using
//! ratatui widgets. All functions are pure (no I/O), taking state and
//! returning widget trees.

mod chat;
mod input;
mod login;
mod modal;
mod private;
mod status;
mod users;

use palaver_app::{App, View};
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
};

/// Render the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    if app.view() == View::Login {
        login::render(frame, app, frame.area());
    } else {
        render_session(frame, app);
    }

    if let Some(modal) = app.modal() {
        modal::render(frame, modal, frame.area());
    }
}

/// Render a logged-in view: main area, input line, status bar.
fn render_session(frame: &mut Frame, app: &App) {
    const MAIN_AREA_MIN_HEIGHT: u16 = 3;
    const INPUT_HEIGHT: u16 = 3;
    const STATUS_HEIGHT: u16 = 1;

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(MAIN_AREA_MIN_HEIGHT),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(STATUS_HEIGHT),
        ])
        .split(frame.area());

    let [main_area, input_area, status_area] = chunks.as_ref() else {
        return;
    };

    match app.view() {
        View::Group => render_group(frame, app, *main_area),
        View::PrivateList => private::render_list(frame, app, *main_area),
        View::PrivateWindow => private::render_window(frame, app, *main_area),
        View::Login => {},
    }
    input::render(frame, app, *input_area);
    status::render(frame, app, *status_area);
}

/// Render the group view (chat log + user sidebar).
fn render_group(frame: &mut Frame, app: &App, area: Rect) {
    const USER_SIDEBAR_WIDTH: u16 = 18;
    const CHAT_AREA_MIN_WIDTH: u16 = 20;

    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Min(CHAT_AREA_MIN_WIDTH), Constraint::Length(USER_SIDEBAR_WIDTH)])
        .split(area);

    let [chat_area, users_area] = chunks.as_ref() else {
        return;
    };

    chat::render(frame, app, *chat_area);
    users::render(frame, app, *users_area);
}

/// A `width` x `height` rectangle centered in `area`, clipped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}
