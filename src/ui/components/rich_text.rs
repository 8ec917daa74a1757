//! Renders the markup produced by [`crate::format`] as an egui layout job.

use std::sync::LazyLock;

use eframe::egui;
use egui::text::{LayoutJob, TextFormat};
use regex::Regex;

static TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/?)(strong|em|code|pre)>|<br>").unwrap());

/// A run of text with one style.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Span {
    pub text: String,
    pub strong: bool,
    pub em: bool,
    pub code: bool,
    pub block: bool,
}

pub fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

pub fn parse_markup(markup: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut style = Span::default();
    let mut last = 0;

    for caps in TAG.captures_iter(markup) {
        let Some(whole) = caps.get(0) else { continue };
        push_span(&mut spans, &style, unescape_html(&markup[last..whole.start()]));
        last = whole.end();

        let Some(tag) = caps.get(2) else {
            push_span(&mut spans, &style, "\n".to_string());
            continue;
        };
        let open = caps.get(1).is_none_or(|slash| slash.as_str().is_empty());
        match tag.as_str() {
            "strong" => style.strong = open,
            "em" => style.em = open,
            "code" => style.code = open,
            "pre" => style.block = open,
            _ => {}
        }
    }
    push_span(&mut spans, &style, unescape_html(&markup[last..]));
    spans
}

fn push_span(spans: &mut Vec<Span>, style: &Span, text: String) {
    if !text.is_empty() {
        spans.push(Span {
            text,
            ..style.clone()
        });
    }
}

/// Fenced blocks are set on lines of their own, separate from the prose around them.
pub fn layout_job(markup: &str, style: &egui::Style, wrap_width: f32) -> LayoutJob {
    let mut job = LayoutJob::default();
    job.wrap.max_width = wrap_width;

    let body = egui::TextStyle::Body.resolve(style);
    let mono = egui::TextStyle::Monospace.resolve(style);
    let visuals = &style.visuals;
    let plain = TextFormat {
        font_id: body.clone(),
        color: visuals.text_color(),
        ..Default::default()
    };

    let mut in_block = false;
    for span in parse_markup(markup) {
        if span.block != in_block && !job.text.is_empty() && !job.text.ends_with('\n') {
            job.append("\n", 0.0, plain.clone());
        }
        in_block = span.block;

        let mut format = TextFormat {
            font_id: if span.code { mono.clone() } else { body.clone() },
            color: if span.strong {
                visuals.strong_text_color()
            } else {
                visuals.text_color()
            },
            italics: span.em,
            ..Default::default()
        };
        if span.block {
            format.background = visuals.extreme_bg_color;
        } else if span.code {
            format.background = visuals.code_bg_color;
        }
        let leading = if span.block { 8.0 } else { 0.0 };
        job.append(&span.text, leading, format);
    }
    job
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::format_message;
    use pretty_assertions::assert_eq;

    fn span(text: &str) -> Span {
        Span {
            text: text.into(),
            ..Default::default()
        }
    }

    #[test]
    fn styles_follow_tags() {
        let spans = parse_markup(&format_message("**bold** and *it* `x`"));
        assert_eq!(spans, vec![
            Span {
                strong: true,
                ..span("bold")
            },
            span(" and "),
            Span { em: true, ..span("it") },
            span(" "),
            Span {
                code: true,
                ..span("x")
            },
        ]);
    }

    #[test]
    fn breaks_and_entities_round_trip_to_plain_text() {
        let raw = "a < b\n\"q\" & 'r'";
        let text: String = parse_markup(&format_message(raw))
            .into_iter()
            .map(|span| span.text)
            .collect();
        assert_eq!(text, raw);
    }

    #[test]
    fn fenced_block_sits_on_its_own_lines() {
        let markup = format_message("see ```let x = 1;``` here");
        let job = layout_job(&markup, &egui::Style::default(), 300.0);

        assert_eq!(job.text, "see \nlet x = 1;\n here");
        let block = job
            .sections
            .iter()
            .find(|section| &job.text[section.byte_range.clone()] == "let x = 1;")
            .unwrap();
        assert_eq!(block.leading_space, 8.0);
        assert_eq!(block.format.background, egui::Style::default().visuals.extreme_bg_color);
    }

    #[test]
    fn inline_code_stays_in_the_line() {
        let job = layout_job(&format_message("run `ls` now"), &egui::Style::default(), 300.0);
        assert_eq!(job.text, "run ls now");
    }

    #[test]
    fn fenced_block_is_code_and_block() {
        let spans = parse_markup(&format_message("```let x = 1;```"));
        assert_eq!(spans, vec![Span {
            code: true,
            block: true,
            ..span("let x = 1;")
        }]);
    }
}
