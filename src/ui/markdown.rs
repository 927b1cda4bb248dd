//! Markdown styling for transcript messages.
//!
//! Walks `pulldown-cmark` events and produces owned ratatui [`Line`]s. Only
//! the constructs assistants commonly emit are styled: headings, emphasis,
//! strong text, inline code, fenced code, lists, links and rules. Anything
//! else falls through as plain text.

use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::ui::theme::Theme;

const RULE: &str = "────────────────────────";

#[derive(Clone, Debug)]
enum ListKind {
    Unordered,
    Ordered(u64),
}

struct PendingLink {
    dest: String,
    text: String,
}

struct MarkdownRenderer<'a> {
    theme: &'a Theme,
    lines: Vec<Line<'static>>,
    current_spans: Vec<Span<'static>>,
    style_stack: Vec<Style>,
    list_stack: Vec<ListKind>,
    in_code_block: Option<String>,
    code_block_lines: Vec<String>,
    link: Option<PendingLink>,
}

/// Render `content` as styled lines. Trailing blank lines are dropped.
pub fn render_markdown(content: &str, theme: &Theme) -> Vec<Line<'static>> {
    MarkdownRenderer::new(theme).render(content)
}

impl<'a> MarkdownRenderer<'a> {
    fn new(theme: &'a Theme) -> Self {
        Self {
            theme,
            lines: Vec::new(),
            current_spans: Vec::new(),
            style_stack: vec![theme.message_text_style],
            list_stack: Vec::new(),
            in_code_block: None,
            code_block_lines: Vec::new(),
            link: None,
        }
    }

    fn current_style(&self) -> Style {
        self.style_stack
            .last()
            .copied()
            .unwrap_or(self.theme.message_text_style)
    }

    fn push_modifier(&mut self, modifier: Modifier) {
        let style = self.current_style().add_modifier(modifier);
        self.style_stack.push(style);
    }

    fn pop_style(&mut self) {
        // The base style always stays.
        if self.style_stack.len() > 1 {
            self.style_stack.pop();
        }
    }

    fn push_text(&mut self, text: String, style: Style) {
        if let Some(link) = self.link.as_mut() {
            link.text.push_str(&text);
        }
        self.current_spans.push(Span::styled(text, style));
    }

    fn flush_line(&mut self) {
        if !self.current_spans.is_empty() {
            let spans = std::mem::take(&mut self.current_spans);
            self.lines.push(Line::from(spans));
        }
    }

    fn push_empty_line(&mut self) {
        if self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            return;
        }
        self.lines.push(Line::default());
    }

    fn start_item(&mut self) {
        self.flush_line();
        let depth = self.list_stack.len().saturating_sub(1);
        let marker = match self.list_stack.last_mut() {
            Some(ListKind::Ordered(next)) => {
                let marker = format!("{next}. ");
                *next += 1;
                marker
            }
            _ => "• ".to_string(),
        };
        let indent = "  ".repeat(depth + 1);
        self.current_spans.push(Span::raw(indent));
        self.current_spans
            .push(Span::styled(marker, self.theme.md_list_marker_style));
    }

    fn finish_code_block(&mut self) {
        let language = self.in_code_block.take().unwrap_or_default();
        let fence = self.theme.md_codeblock_fence_style;
        self.lines
            .push(Line::from(Span::styled(format!("```{language}"), fence)));
        for line in self.code_block_lines.drain(..) {
            self.lines.push(Line::from(Span::styled(
                line,
                self.theme.md_codeblock_text_style,
            )));
        }
        self.lines.push(Line::from(Span::styled("```", fence)));
        self.push_empty_line();
    }

    fn finish_link(&mut self) {
        self.pop_style();
        let Some(link) = self.link.take() else {
            return;
        };
        if !link.dest.is_empty() && link.dest != link.text {
            self.current_spans.push(Span::styled(
                format!(" ({})", link.dest),
                self.theme.palette_hint_style,
            ));
        }
    }

    fn render(mut self, content: &str) -> Vec<Line<'static>> {
        let mut options = Options::empty();
        options.insert(Options::ENABLE_STRIKETHROUGH);
        options.insert(Options::ENABLE_TASKLISTS);

        for event in Parser::new_ext(content, options) {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => {
                    if self.in_code_block.is_some() {
                        self.code_block_lines
                            .extend(text.lines().map(|line| line.replace('\t', "    ")));
                    } else {
                        let style = self.current_style();
                        self.push_text(text.into_string(), style);
                    }
                }
                Event::Code(code) => {
                    let style = self.theme.md_inline_code_style;
                    self.push_text(code.into_string(), style);
                }
                Event::SoftBreak | Event::HardBreak => self.flush_line(),
                Event::Rule => {
                    self.flush_line();
                    self.lines
                        .push(Line::from(Span::styled(RULE, self.theme.palette_help_style)));
                    self.push_empty_line();
                }
                Event::TaskListMarker(checked) => {
                    let marker = if checked { "[x] " } else { "[ ] " };
                    self.current_spans.push(Span::raw(marker));
                }
                Event::Html(html) | Event::InlineHtml(html) => {
                    let style = self.current_style();
                    for (index, line) in html.lines().enumerate() {
                        if index > 0 {
                            self.flush_line();
                        }
                        self.push_text(line.to_string(), style);
                    }
                }
                _ => {}
            }
        }

        self.flush_line();
        while self.lines.last().is_some_and(|line| line.spans.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush_line();
                self.style_stack
                    .push(self.theme.md_heading_style(level as u8));
            }
            Tag::List(start) => {
                self.flush_line();
                self.list_stack.push(match start {
                    Some(n) => ListKind::Ordered(n),
                    None => ListKind::Unordered,
                });
            }
            Tag::Item => self.start_item(),
            Tag::CodeBlock(kind) => {
                self.flush_line();
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_ascii_whitespace()
                        .next()
                        .unwrap_or_default()
                        .to_string(),
                    CodeBlockKind::Indented => String::new(),
                };
                self.in_code_block = Some(language);
                self.code_block_lines.clear();
            }
            Tag::Emphasis => self.push_modifier(Modifier::ITALIC),
            Tag::Strong => self.push_modifier(Modifier::BOLD),
            Tag::Strikethrough => self.push_modifier(Modifier::CROSSED_OUT),
            Tag::Link { dest_url, .. } => {
                self.style_stack.push(self.theme.md_link_style);
                self.link = Some(PendingLink {
                    dest: dest_url.into_string(),
                    text: String::new(),
                });
            }
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_line();
                if self.list_stack.is_empty() {
                    self.push_empty_line();
                }
            }
            TagEnd::Heading(_) => {
                self.flush_line();
                self.pop_style();
                self.push_empty_line();
            }
            TagEnd::List(_) => {
                self.flush_line();
                self.list_stack.pop();
                if self.list_stack.is_empty() {
                    self.push_empty_line();
                }
            }
            TagEnd::Item => self.flush_line(),
            TagEnd::CodeBlock => self.finish_code_block(),
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => self.finish_link(),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_text(line: &Line<'_>) -> String {
        line.spans.iter().map(|span| span.content.as_ref()).collect()
    }

    fn texts(lines: &[Line<'_>]) -> Vec<String> {
        lines.iter().map(line_text).collect()
    }

    #[test]
    fn headings_use_level_styles() {
        let theme = Theme::default();
        let lines = render_markdown("# Title\n\n## Section\n\n### Detail", &theme);

        assert_eq!(texts(&lines), vec!["Title", "", "Section", "", "Detail"]);
        assert_eq!(lines[0].spans[0].style, theme.md_h1_style);
        assert_eq!(lines[2].spans[0].style, theme.md_h2_style);
        assert_eq!(lines[4].spans[0].style, theme.md_h3_style);
    }

    #[test]
    fn emphasis_and_strong_add_modifiers() {
        let theme = Theme::default();
        let lines = render_markdown("plain *soft* **loud**", &theme);

        assert_eq!(texts(&lines), vec!["plain soft loud"]);
        let spans = &lines[0].spans;
        assert!(spans[1].style.add_modifier.contains(Modifier::ITALIC));
        assert!(spans[3].style.add_modifier.contains(Modifier::BOLD));
        assert!(!spans[0].style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn inline_code_is_styled_without_backticks() {
        let theme = Theme::default();
        let lines = render_markdown("run `cargo fmt` now", &theme);

        assert_eq!(texts(&lines), vec!["run cargo fmt now"]);
        assert_eq!(lines[0].spans[1].style, theme.md_inline_code_style);
    }

    #[test]
    fn fenced_code_keeps_fences_and_lines() {
        let theme = Theme::default();
        let lines = render_markdown(
            "Here:\n\n```rust\nfn main() {\n\tprintln!();\n}\n```\n",
            &theme,
        );

        assert_eq!(
            texts(&lines),
            vec![
                "Here:",
                "",
                "```rust",
                "fn main() {",
                "    println!();",
                "}",
                "```",
            ]
        );
        assert_eq!(lines[2].spans[0].style, theme.md_codeblock_fence_style);
        assert_eq!(lines[3].spans[0].style, theme.md_codeblock_text_style);
    }

    #[test]
    fn lists_get_markers_and_numbering() {
        let theme = Theme::default();
        let lines = render_markdown("- one\n- two\n  - nested\n\n3. three\n4. four", &theme);

        assert_eq!(
            texts(&lines),
            vec![
                "  • one",
                "  • two",
                "    • nested",
                "",
                "  3. three",
                "  4. four",
            ]
        );
    }

    #[test]
    fn links_show_destination_once() {
        let theme = Theme::default();
        let lines = render_markdown(
            "see [the docs](https://docs.rs) or <https://crates.io>",
            &theme,
        );

        assert_eq!(
            texts(&lines),
            vec!["see the docs (https://docs.rs) or https://crates.io"]
        );
        assert_eq!(lines[0].spans[1].style, theme.md_link_style);
    }

    #[test]
    fn soft_breaks_keep_source_lines() {
        let theme = Theme::default();
        let lines = render_markdown("first line\nsecond line\n\n\n", &theme);
        assert_eq!(texts(&lines), vec!["first line", "second line"]);
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(render_markdown("", &Theme::default()).is_empty());
    }
}
