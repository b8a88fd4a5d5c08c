//! Lightweight markup for assistant replies.
//!
//! Replies are Markdown-ish: paragraphs, `**bold**`, and ordered or
//! unordered lists.  [`Document::parse`] reduces whatever pulldown-cmark finds
//! to those three shapes; everything else degrades to plain text.  User
//! messages never go through here.

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

const ANSI_BOLD: &str = "\x1b[1m";
const ANSI_RESET: &str = "\x1b[0m";

/// A run of text with uniform styling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    /// The text.
    pub text: String,
    /// Whether the run is bold.
    pub bold: bool,
}

/// A top-level unit of a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// A paragraph (headings are folded in as bold paragraphs).
    Paragraph(Vec<Span>),

    /// One list item.
    ListItem {
        /// Number shown for ordered lists; `None` for bullets.
        ordinal: Option<u64>,
        /// Nesting depth, 0 for top-level lists.
        depth: usize,
        /// Item text.
        spans: Vec<Span>,
    },
}

impl Block {
    fn spans_mut(&mut self) -> &mut Vec<Span> {
        match self {
            Block::Paragraph(spans) => spans,
            Block::ListItem { spans, .. } => spans,
        }
    }

    fn is_list_item(&self) -> bool {
        matches!(self, Block::ListItem { .. })
    }
}

/// A parsed reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    /// Parses reply text.
    pub fn parse(text: &str) -> Self {
        let mut builder = Builder::default();
        for event in Parser::new_ext(text, Options::ENABLE_STRIKETHROUGH) {
            builder.event(event);
        }
        builder.flush();
        Self {
            blocks: builder.blocks,
        }
    }

    /// The blocks, in order.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Renders for a terminal, with ANSI bold when `use_color` is set.
    ///
    /// Paragraphs are separated by a blank line, consecutive list items by a
    /// single newline.  No trailing newline is emitted.
    pub fn render(&self, use_color: bool) -> String {
        let mut out = String::new();
        let mut previous: Option<&Block> = None;
        for block in &self.blocks {
            if let Some(previous) = previous {
                if previous.is_list_item() && block.is_list_item() {
                    out.push('\n');
                } else {
                    out.push_str("\n\n");
                }
            }
            match block {
                Block::Paragraph(spans) => push_spans(&mut out, spans, "", use_color),
                Block::ListItem {
                    ordinal,
                    depth,
                    spans,
                } => {
                    let indent = "  ".repeat(*depth);
                    let marker = match ordinal {
                        Some(n) => format!("{n}. "),
                        None => "• ".to_string(),
                    };
                    out.push_str(&indent);
                    out.push_str(&marker);
                    let hanging = format!("{indent}{}", " ".repeat(marker.chars().count()));
                    push_spans(&mut out, spans, &hanging, use_color);
                }
            }
            previous = Some(block);
        }
        out
    }
}

fn push_spans(out: &mut String, spans: &[Span], continuation: &str, use_color: bool) {
    for span in spans {
        let text = span.text.replace('\n', &format!("\n{continuation}"));
        if span.bold && use_color {
            out.push_str(ANSI_BOLD);
            out.push_str(&text);
            out.push_str(ANSI_RESET);
        } else {
            out.push_str(&text);
        }
    }
}

#[derive(Default)]
struct Builder {
    blocks: Vec<Block>,
    current: Option<Block>,
    lists: Vec<Option<u64>>,
    items_open: usize,
    bold: usize,
}

impl Builder {
    fn event(&mut self, event: Event<'_>) {
        match event {
            Event::Start(Tag::Paragraph) => {
                if self.items_open > 0 {
                    if let Some(block) = &mut self.current
                        && !block.spans_mut().is_empty()
                    {
                        push_text(block.spans_mut(), "\n", false);
                    }
                } else {
                    self.flush();
                }
            }
            Event::End(TagEnd::Paragraph) => {
                if self.items_open == 0 {
                    self.flush();
                }
            }
            Event::Start(Tag::Heading { .. }) => {
                self.flush();
                self.bold += 1;
            }
            Event::End(TagEnd::Heading(_)) => {
                self.bold = self.bold.saturating_sub(1);
                self.flush();
            }
            Event::Start(Tag::List(start)) => {
                self.flush();
                self.lists.push(start);
            }
            Event::End(TagEnd::List(_)) => {
                self.flush();
                self.lists.pop();
            }
            Event::Start(Tag::Item) => {
                self.flush();
                self.items_open += 1;
                let depth = self.lists.len().saturating_sub(1);
                let ordinal = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let ordinal = *next;
                        *next += 1;
                        Some(ordinal)
                    }
                    _ => None,
                };
                self.current = Some(Block::ListItem {
                    ordinal,
                    depth,
                    spans: Vec::new(),
                });
            }
            Event::End(TagEnd::Item) => {
                self.flush();
                self.items_open = self.items_open.saturating_sub(1);
            }
            Event::Start(Tag::Strong) => self.bold += 1,
            Event::End(TagEnd::Strong) => self.bold = self.bold.saturating_sub(1),
            Event::Text(text) | Event::Code(text) => self.text(&text),
            Event::SoftBreak | Event::HardBreak => self.text("\n"),
            _ => {}
        }
    }

    fn text(&mut self, text: &str) {
        let bold = self.bold > 0;
        let block = self
            .current
            .get_or_insert_with(|| Block::Paragraph(Vec::new()));
        push_text(block.spans_mut(), text, bold);
    }

    fn flush(&mut self) {
        if let Some(block) = self.current.take() {
            let keep = match &block {
                Block::Paragraph(spans) => !spans.is_empty(),
                Block::ListItem { .. } => true,
            };
            if keep {
                self.blocks.push(block);
            }
        }
    }
}

fn push_text(spans: &mut Vec<Span>, text: &str, bold: bool) {
    match spans.last_mut() {
        Some(last) if last.bold == bold => last.text.push_str(text),
        _ => spans.push(Span {
            text: text.to_string(),
            bold,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain(text: &str) -> Span {
        Span {
            text: text.to_string(),
            bold: false,
        }
    }

    fn bold(text: &str) -> Span {
        Span {
            text: text.to_string(),
            bold: true,
        }
    }

    #[test]
    fn paragraphs_and_bold() {
        let doc = Document::parse("First **step** now.\n\nSecond paragraph.");
        assert_eq!(
            doc.blocks(),
            &[
                Block::Paragraph(vec![plain("First "), bold("step"), plain(" now.")]),
                Block::Paragraph(vec![plain("Second paragraph.")]),
            ]
        );
        assert_eq!(doc.render(false), "First step now.\n\nSecond paragraph.");
        assert_eq!(
            doc.render(true),
            "First \x1b[1mstep\x1b[0m now.\n\nSecond paragraph."
        );
    }

    #[test]
    fn ordered_list() {
        let doc = Document::parse("Do this:\n\n1. File an FIR\n2. Block your cards\n");
        assert_eq!(doc.blocks().len(), 3);
        assert_eq!(
            doc.blocks()[2],
            Block::ListItem {
                ordinal: Some(2),
                depth: 0,
                spans: vec![plain("Block your cards")],
            }
        );
        assert_eq!(
            doc.render(false),
            "Do this:\n\n1. File an FIR\n2. Block your cards"
        );
    }

    #[test]
    fn nested_unordered_list() {
        let doc = Document::parse("- outer\n  - inner\n- **last**\n");
        assert_eq!(doc.render(false), "• outer\n  • inner\n• last");
        assert_eq!(
            doc.blocks()[1],
            Block::ListItem {
                ordinal: None,
                depth: 1,
                spans: vec![plain("inner")],
            }
        );
    }

    #[test]
    fn ordered_list_keeps_start_number() {
        let doc = Document::parse("3. third\n4. fourth");
        assert_eq!(doc.render(false), "3. third\n4. fourth");
    }

    #[test]
    fn soft_breaks_stay_line_breaks() {
        let doc = Document::parse("line one\nline two");
        assert_eq!(doc.render(false), "line one\nline two");
    }

    #[test]
    fn heading_becomes_bold_paragraph() {
        let doc = Document::parse("# Rights\nYou may remain silent.");
        assert_eq!(doc.blocks()[0], Block::Paragraph(vec![bold("Rights")]));
        assert_eq!(doc.render(false), "Rights\n\nYou may remain silent.");
    }

    #[test]
    fn unterminated_bold_is_literal() {
        let doc = Document::parse("**Important");
        assert_eq!(doc.render(true), "**Important");
    }

    #[test]
    fn empty_input() {
        assert!(Document::parse("").blocks().is_empty());
        assert_eq!(Document::parse("").render(true), "");
    }
}
