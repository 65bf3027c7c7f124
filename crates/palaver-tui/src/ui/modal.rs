//! Modal overlay
//!
//! Blocking notice and confirmation dialogs drawn over the current view.

use palaver_app::Modal;
use ratatui::{
    Frame,
    layout::{Alignment, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
};

const POPUP_WIDTH: u16 = 48;
const POPUP_HEIGHT: u16 = 6;

/// Render a modal dialog centered over `area`.
pub fn render(frame: &mut Frame, modal: &Modal, area: Rect) {
    let (title, text, hint) = match modal {
        Modal::Notice(text) => (" Notice ", text.clone(), "Enter: OK"),
        Modal::ConfirmDestroy { other_name, .. } => (
            " Confirm ",
            format!("End the private chat with {other_name}?"),
            "y: confirm  n: cancel",
        ),
    };

    let popup = super::centered(area, POPUP_WIDTH, POPUP_HEIGHT);
    frame.render_widget(Clear, popup);

    let lines = vec![
        Line::from(""),
        Line::from(text),
        Line::from(""),
        Line::from(Span::styled(hint, Style::default().fg(Color::DarkGray))),
    ];
    let paragraph = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title(title));

    frame.render_widget(paragraph, popup);
}
