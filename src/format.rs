//! Turns raw message text into the small markup dialect the chat view renders.
//!
//! This is a fixed list of textual substitutions, not a markdown parser. Input
//! is HTML-escaped first so message content (user, assistant or cached) can
//! never inject markup of its own; only the tags produced here survive.

use std::sync::LazyLock;

use regex::Regex;

static BOLD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*(.*?)\*\*").unwrap());
static ITALIC: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*(.*?)\*").unwrap());
static FENCED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)```(.*?)```").unwrap());
static INLINE_CODE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"`(.*?)`").unwrap());

pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn format_message(content: &str) -> String {
    let escaped = escape_html(content);
    let formatted = escaped.replace('\n', "<br>");
    let formatted = BOLD.replace_all(&formatted, "<strong>${1}</strong>");
    let formatted = ITALIC.replace_all(&formatted, "<em>${1}</em>");
    // Fenced blocks go before inline code, otherwise the inline rule eats the
    // fences pairwise.
    let formatted = FENCED.replace_all(&formatted, "<pre><code>${1}</code></pre>");
    let formatted = INLINE_CODE.replace_all(&formatted, "<code>${1}</code>");
    formatted.into_owned()
}
