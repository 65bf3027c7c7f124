//! Login form
//!
//! Centered nickname/password form shown before a session exists.

use palaver_app::{App, LoginField};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

const FORM_WIDTH: u16 = 44;
const FORM_HEIGHT: u16 = 8;

/// Render the login form.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let form_area = super::centered(area, FORM_WIDTH, FORM_HEIGHT);
    let block = Block::default().borders(Borders::ALL).title(" palaver ");

    let form = app.login_form();
    let masked: String = "*".repeat(form.password.chars().count());

    let footer = app
        .status_message()
        .map_or("Enter: login  Tab: switch field  Esc: quit", |message| message);

    let lines = vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(" Nickname: ", label_style(form.field == LoginField::Nickname)),
            Span::raw(form.nickname.clone()),
        ]),
        Line::from(""),
        Line::from(vec![
            Span::styled(" Password: ", label_style(form.field == LoginField::Password)),
            Span::raw(masked),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            format!(" {footer}"),
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), form_area);
}

fn label_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    }
}
