//! User sidebar
//!
//! Displays the active-user list with the mention cursor.

use palaver_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const SELECTED_PREFIX: &str = ">";
const UNSELECTED_PREFIX: &str = " ";

/// Render the user sidebar.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let items: Vec<ListItem> = app
        .users()
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let selected = app.user_cursor() == Some(i);
            let (prefix, style) = if selected {
                (SELECTED_PREFIX, Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                (UNSELECTED_PREFIX, Style::default())
            };
            ListItem::new(Line::from(vec![Span::raw(prefix), Span::styled(name.as_str(), style)]))
        })
        .collect();

    let title = format!(" Users ({}) ", app.users().len());
    let block = Block::default().borders(Borders::ALL).title(title);

    frame.render_widget(List::new(items).block(block), area);
}
