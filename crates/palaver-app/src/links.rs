//! URL detection for message rendering.
//!
//! Message text is plain; the renderer styles http(s) URLs differently so
//! they are recognizable. A link runs from its scheme to the next
//! whitespace, matching the web client's autolink behavior.

/// A segment of message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSpan<'a> {
    /// Plain text.
    Plain(&'a str),
    /// An http(s) URL.
    Link(&'a str),
}

/// Split message text into plain and link spans, in order.
pub fn split_links(text: &str) -> Vec<TextSpan<'_>> {
    let mut spans = Vec::new();
    let mut rest = text;
    let mut offset = 0;

    while let Some(start) = find_scheme(rest) {
        let end = start
            + rest[start..].find(char::is_whitespace).unwrap_or(rest.len() - start);
        if start > 0 {
            spans.push(TextSpan::Plain(&text[offset..offset + start]));
        }
        spans.push(TextSpan::Link(&text[offset + start..offset + end]));
        offset += end;
        rest = &text[offset..];
    }
    if !rest.is_empty() {
        spans.push(TextSpan::Plain(rest));
    }
    spans
}

fn find_scheme(text: &str) -> Option<usize> {
    let http = text.find("http://");
    let https = text.find("https://");
    match (http, https) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

#[cfg(test)]
mod tests {
    use super::{TextSpan, split_links};

    #[test]
    fn plain_text_stays_whole() {
        assert_eq!(split_links("hello there"), vec![TextSpan::Plain("hello there")]);
    }

    #[test]
    fn link_runs_to_whitespace() {
        assert_eq!(split_links("see https://example.com/a?b=1 now"), vec![
            TextSpan::Plain("see "),
            TextSpan::Link("https://example.com/a?b=1"),
            TextSpan::Plain(" now"),
        ]);
    }

    #[test]
    fn multiple_links_and_trailing_link() {
        assert_eq!(split_links("http://a.com and https://b.com"), vec![
            TextSpan::Link("http://a.com"),
            TextSpan::Plain(" and "),
            TextSpan::Link("https://b.com"),
        ]);
    }

    #[test]
    fn scheme_inside_cjk_text() {
        assert_eq!(split_links("看这个https://例.com吧 好"), vec![
            TextSpan::Plain("看这个"),
            TextSpan::Link("https://例.com吧"),
            TextSpan::Plain(" 好"),
        ]);
    }
}
