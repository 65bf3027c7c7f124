//! Group chat log
//!
//! Displays the message log: chat lines, system tips, file attachments.

use palaver_app::{App, ChatLine, LogEntry, TextSpan, split_links};
use palaver_proto::format_file_size;
use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
};

const BORDER_SIZE: u16 = 2;

/// Render the chat log, keeping the newest lines visible.
pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" Chat ");

    let items: Vec<ListItem> = app
        .log()
        .iter()
        .map(|entry| match entry {
            LogEntry::Tip(text) => ListItem::new(Line::from(Span::styled(
                format!("-- {text} --"),
                Style::default().fg(Color::DarkGray),
            ))),
            LogEntry::Chat(line) => ListItem::new(chat_line(line)),
        })
        .collect();

    let visible_height = area.height.saturating_sub(BORDER_SIZE) as usize;
    let skip = items.len().saturating_sub(visible_height);
    let visible_items: Vec<_> = items.into_iter().skip(skip).collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}

fn chat_line(line: &ChatLine) -> Line<'_> {
    let name_style = if line.own {
        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    };

    let mut spans = Vec::new();
    if let Some(timestamp) = &line.timestamp {
        spans.push(Span::styled(format!("{timestamp} "), Style::default().fg(Color::DarkGray)));
    }
    spans.push(Span::styled(format!("<{}>", line.name), name_style));
    spans.push(Span::raw(" "));

    if let Some(file) = &line.file {
        spans.push(Span::styled(
            format!("[{}] {} ({})", file.kind().label(), file.name, format_file_size(file.size)),
            Style::default().fg(Color::Cyan),
        ));
    } else {
        for segment in split_links(&line.text) {
            match segment {
                TextSpan::Plain(text) => spans.push(Span::raw(text)),
                TextSpan::Link(url) => spans.push(Span::styled(
                    url,
                    Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED),
                )),
            }
        }
    }

    Line::from(spans)
}
