//! HTML helpers for Telegram's HTML parse mode.

use teloxide::types::{MessageEntity, MessageEntityKind, MessageEntityRef};

/// Escape HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Replace each `{name}` in `template` with its value.
///
/// Unknown placeholders are left as they are.
pub fn fill_placeholders(template: &str, params: &[(&str, &str)]) -> String {
    params.iter().fold(template.to_string(), |text, (name, value)| {
        text.replace(&format!("{{{name}}}"), value)
    })
}

/// Render the arguments of a command message to HTML.
///
/// The leading `/command` and the whitespace after it are cut from the raw
/// text first; entities reaching into the command are clipped to the
/// arguments. Formatting entities (bold, links, ...) become HTML tags and
/// everything else is escaped. Returns an empty string when the command has
/// no arguments.
pub fn command_args_html(text: &str, entities: &[MessageEntity]) -> String {
    let parsed = MessageEntityRef::parse(text, entities);
    let from = args_start(text, &parsed);

    let spans = parsed
        .iter()
        .filter_map(|e| {
            let (open, close) = tags(e.kind())?;
            let start = e.start().max(from);
            (start < e.end()).then_some(Span {
                start,
                end: e.end(),
                open,
                close,
            })
        })
        .collect();

    render(text, from, spans).trim().to_string()
}

/// Byte offset where the command's arguments begin.
fn args_start(text: &str, entities: &[MessageEntityRef<'_>]) -> usize {
    let command_end = entities
        .iter()
        .find(|e| e.start() == 0 && matches!(e.kind(), MessageEntityKind::BotCommand))
        .map(|e| e.end())
        .unwrap_or_else(|| text.find(char::is_whitespace).unwrap_or(text.len()));

    let rest = &text[command_end..];
    command_end + (rest.len() - rest.trim_start().len())
}

struct Span {
    start: usize,
    end: usize,
    open: String,
    close: &'static str,
}

fn tags(kind: &MessageEntityKind) -> Option<(String, &'static str)> {
    let pair = match kind {
        MessageEntityKind::Bold => ("<b>".to_string(), "</b>"),
        MessageEntityKind::Italic => ("<i>".to_string(), "</i>"),
        MessageEntityKind::Underline => ("<u>".to_string(), "</u>"),
        MessageEntityKind::Strikethrough => ("<s>".to_string(), "</s>"),
        MessageEntityKind::Spoiler => ("<tg-spoiler>".to_string(), "</tg-spoiler>"),
        MessageEntityKind::Blockquote => ("<blockquote>".to_string(), "</blockquote>"),
        MessageEntityKind::Code => ("<code>".to_string(), "</code>"),
        MessageEntityKind::Pre { language: None } => ("<pre>".to_string(), "</pre>"),
        MessageEntityKind::Pre { language: Some(lang) } => (
            format!("<pre><code class=\"language-{}\">", attribute(lang)),
            "</code></pre>",
        ),
        MessageEntityKind::TextLink { url } => {
            (format!("<a href=\"{}\">", attribute(url.as_str())), "</a>")
        }
        MessageEntityKind::TextMention { user } => {
            (format!("<a href=\"tg://user?id={}\">", user.id), "</a>")
        }
        MessageEntityKind::CustomEmoji { custom_emoji_id } => (
            format!("<tg-emoji emoji-id=\"{}\">", attribute(custom_emoji_id)),
            "</tg-emoji>",
        ),
        // Mentions, hashtags, plain URLs etc. are recognised by Telegram again.
        _ => return None,
    };
    Some(pair)
}

fn attribute(value: &str) -> String {
    html_escape(value).replace('"', "&quot;")
}

/// Render `text[from..]`, wrapping each span in its tags.
///
/// Spans that overlap without nesting are closed and reopened around the
/// inner boundary, so the output is always well-formed.
fn render(text: &str, from: usize, mut spans: Vec<Span>) -> String {
    // Outer spans first when several start at the same offset.
    spans.sort_by(|a, b| a.start.cmp(&b.start).then(b.end.cmp(&a.end)));

    let mut bounds: Vec<usize> = spans
        .iter()
        .flat_map(|s| [s.start, s.end])
        .chain([from, text.len()])
        .collect();
    bounds.sort_unstable();
    bounds.dedup();

    let mut out = String::with_capacity(text.len() - from);
    let mut stack: Vec<usize> = Vec::new();
    let mut next = 0;

    for (k, &pos) in bounds.iter().enumerate() {
        if stack.iter().any(|&i| spans[i].end == pos) {
            let mut reopen = Vec::new();
            while let Some(i) = stack.pop() {
                out.push_str(spans[i].close);
                if spans[i].end != pos {
                    reopen.push(i);
                }
                if !stack.iter().any(|&j| spans[j].end == pos) {
                    break;
                }
            }
            for i in reopen.into_iter().rev() {
                out.push_str(&spans[i].open);
                stack.push(i);
            }
        }

        while next < spans.len() && spans[next].start == pos {
            out.push_str(&spans[next].open);
            stack.push(next);
            next += 1;
        }

        if let Some(&end) = bounds.get(k + 1) {
            out.push_str(&html_escape(&text[pos..end]));
        }
    }

    out
}
