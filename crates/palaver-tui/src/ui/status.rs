//! Status bar
//!
//! Displays the session identity, transient status text and key hints.

use palaver_app::{App, View};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
};

/// Render the status bar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let identity = app.session().map_or_else(
        || Span::styled("Offline", Style::default().fg(Color::Red)),
        |session| {
            Span::styled(
                session.name.clone(),
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            )
        },
    );

    let mut spans = vec![Span::raw(" "), identity];

    if let Some(message) = app.status_message() {
        spans.push(Span::styled(format!(" | {message}"), Style::default().fg(Color::Yellow)));
    }
    if app.retry_offered() {
        spans.push(Span::styled(" | /retry", Style::default().fg(Color::Red)));
    }

    let hint = match app.view() {
        View::Group => " | Tab: private chats  /upload <path>  /logout",
        View::PrivateList => " | Enter: open  d: destroy  r: refresh  Tab: back",
        View::PrivateWindow => " | Esc: back  /destroy: end chat",
        View::Login => "",
    };
    spans.push(Span::styled(hint, Style::default().fg(Color::DarkGray)));

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(Color::DarkGray).fg(Color::White));

    frame.render_widget(paragraph, area);
}
