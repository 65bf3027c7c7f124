//! Private chat views
//!
//! The active-chat list and the single open private window.

use palaver_app::App;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the active private chat list.
pub fn render_list(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Private Chats ");

    let mut items: Vec<ListItem> = app
        .private_chats()
        .iter()
        .enumerate()
        .map(|(i, chat)| {
            let selected = i == app.private_cursor();
            let (prefix, style) = if selected {
                ("> ", Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            } else {
                ("  ", Style::default())
            };
            let preview = chat.last_preview.as_deref().unwrap_or("");
            let mut spans = vec![Span::raw(prefix), Span::styled(chat.other_name.clone(), style)];
            if chat.has_unread {
                spans.push(Span::styled(" ●", Style::default().fg(Color::Red)));
            }
            spans.push(Span::styled(format!("  {preview}"), Style::default().fg(Color::DarkGray)));
            ListItem::new(Line::from(spans))
        })
        .collect();

    if items.is_empty() {
        items.push(ListItem::new(Line::from(Span::styled(
            "No active private chats",
            Style::default().fg(Color::DarkGray),
        ))));
    }

    frame.render_widget(List::new(items).block(block), area);
}

/// Render the open private window, keeping the newest lines visible.
pub fn render_window(frame: &mut Frame, app: &App, area: Rect) {
    let Some(window) = app.window() else {
        return;
    };
    let own_key = app.session().map_or("", |session| session.key.as_str());

    let block =
        Block::default().borders(Borders::ALL).title(format!(" {} ", window.other_name));

    let items: Vec<ListItem> = window
        .messages
        .iter()
        .map(|msg| {
            let own = !msg.from.is_empty() && msg.from == own_key;
            let name_style = if own {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
            };

            let mut spans = Vec::new();
            if let Some(timestamp) = &msg.timestamp {
                spans.push(Span::styled(
                    format!("{timestamp} "),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            spans.push(Span::styled(format!("<{}>", msg.from_name), name_style));
            spans.push(Span::raw(" "));
            spans.push(Span::raw(msg.msg.as_str()));
            ListItem::new(Line::from(spans))
        })
        .collect();

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
