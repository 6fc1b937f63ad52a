use std::ops::Range;

use markslate_doc::Attrs;
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use serde_json::Value;

use crate::options::MarkdownOptions;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nesting {
    Open,
    Close,
    SelfClosing,
}

/// One lexical unit of markdown, shaped after markdown-it tokens: block
/// containers come as `*_open`/`*_close` pairs, and the inline content of a
/// paragraph or heading is a single `inline` token whose `children` hold the
/// flat inline stream.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: String,
    pub nesting: Nesting,
    pub content: String,
    pub info: String,
    pub markup: String,
    pub attrs: Attrs,
    /// Set on paragraphs inside tight list items.
    pub hidden: bool,
    pub block: bool,
    pub range: Range<usize>,
    pub children: Vec<Token>,
}

impl Token {
    pub fn new(kind: impl Into<String>, nesting: Nesting, range: Range<usize>) -> Self {
        Self {
            kind: kind.into(),
            nesting,
            content: String::new(),
            info: String::new(),
            markup: String::new(),
            attrs: Attrs::default(),
            hidden: false,
            block: false,
            range,
            children: Vec::new(),
        }
    }

    fn block(mut self) -> Self {
        self.block = true;
        self
    }

    fn with_attr(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attrs.insert(key.to_string(), value.into());
        self
    }

    /// The dispatch type: `kind` without its `_open` / `_close` suffix.
    pub fn base_type(&self) -> &str {
        self.kind
            .strip_suffix("_open")
            .or_else(|| self.kind.strip_suffix("_close"))
            .unwrap_or(&self.kind)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attrs.get(key).and_then(Value::as_str)
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attrs.get(key).and_then(Value::as_u64)
    }

    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        self.attrs.get(key).and_then(Value::as_bool)
    }
}

pub fn tokenize(markdown: &str, options: &MarkdownOptions) -> Vec<Token> {
    let mut stream = TokenStream::default();
    for (event, range) in Parser::new_ext(markdown, options.parser_options()).into_offset_iter() {
        stream.push_event(event, range);
    }
    stream.finish()
}

enum Container {
    List { open_ix: usize, loose: bool },
    Item,
    Quote,
}

struct InlineRun {
    token: Token,
    // `Some(hidden)` when the run opened a paragraph of its own.
    synthetic_paragraph: Option<bool>,
}

#[derive(Default)]
struct TokenStream {
    tokens: Vec<Token>,
    containers: Vec<Container>,
    inline: Option<InlineRun>,
    // Code and html blocks accumulate their text here until the block ends.
    leaf: Option<Token>,
    image: Option<Token>,
}

impl TokenStream {
    fn push_event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag, range),
            Event::Text(text) => {
                if let Some(leaf) = &mut self.leaf {
                    leaf.content.push_str(&text);
                } else if let Some(image) = &mut self.image {
                    image.content.push_str(&text);
                } else {
                    let mut token = Token::new("text", Nesting::SelfClosing, range.clone());
                    token.content = text.to_string();
                    self.push_inline(token, range);
                }
            }
            Event::Code(code) => {
                if let Some(image) = &mut self.image {
                    image.content.push_str(&code);
                    return;
                }
                let mut token = Token::new("code_inline", Nesting::SelfClosing, range.clone());
                token.content = code.to_string();
                token.markup = "`".to_string();
                self.push_inline(token, range);
            }
            Event::Html(html) | Event::InlineHtml(html) => {
                if let Some(leaf) = &mut self.leaf {
                    leaf.content.push_str(&html);
                    return;
                }
                let mut token = Token::new("html_inline", Nesting::SelfClosing, range.clone());
                token.content = html.to_string();
                self.push_inline(token, range);
            }
            Event::SoftBreak => {
                let token = Token::new("softbreak", Nesting::SelfClosing, range.clone());
                self.push_inline(token, range);
            }
            Event::HardBreak => {
                let token = Token::new("hardbreak", Nesting::SelfClosing, range.clone());
                self.push_inline(token, range);
            }
            Event::Rule => {
                self.flush_inline();
                let mut token = Token::new("hr", Nesting::SelfClosing, range).block();
                token.markup = "---".to_string();
                self.tokens.push(token);
            }
            other => tracing::debug!(?other, "skipping unsupported markdown event"),
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        match tag {
            Tag::Paragraph => {
                self.flush_inline();
                if matches!(self.containers.last(), Some(Container::Item)) {
                    self.mark_enclosing_list_loose();
                }
                self.tokens
                    .push(Token::new("paragraph_open", Nesting::Open, range.clone()).block());
                self.begin_inline(range, None);
            }
            Tag::Heading { level, .. } => {
                self.flush_inline();
                let level = level as usize;
                let mut token = Token::new("heading_open", Nesting::Open, range.clone())
                    .block()
                    .with_attr("level", level as u64);
                token.markup = "#".repeat(level);
                self.tokens.push(token);
                self.begin_inline(range, None);
            }
            Tag::BlockQuote(_) => {
                self.flush_inline();
                let mut token = Token::new("blockquote_open", Nesting::Open, range).block();
                token.markup = ">".to_string();
                self.tokens.push(token);
                self.containers.push(Container::Quote);
            }
            Tag::List(start) => {
                self.flush_inline();
                let token = match start {
                    Some(start) => Token::new("ordered_list_open", Nesting::Open, range)
                        .block()
                        .with_attr("start", start),
                    None => Token::new("bullet_list_open", Nesting::Open, range).block(),
                };
                self.tokens.push(token);
                self.containers.push(Container::List {
                    open_ix: self.tokens.len() - 1,
                    loose: false,
                });
            }
            Tag::Item => {
                self.flush_inline();
                self.tokens
                    .push(Token::new("list_item_open", Nesting::Open, range).block());
                self.containers.push(Container::Item);
            }
            Tag::CodeBlock(kind) => {
                self.flush_inline();
                let token = match kind {
                    CodeBlockKind::Fenced(info) => {
                        let mut token = Token::new("fence", Nesting::SelfClosing, range).block();
                        token.info = info.trim().to_string();
                        token.markup = "```".to_string();
                        token
                    }
                    CodeBlockKind::Indented => {
                        Token::new("code_block", Nesting::SelfClosing, range).block()
                    }
                };
                self.leaf = Some(token);
            }
            Tag::HtmlBlock => {
                self.flush_inline();
                self.leaf = Some(Token::new("html_block", Nesting::SelfClosing, range).block());
            }
            Tag::Emphasis => self.push_mark("em", Nesting::Open, range),
            Tag::Strong => self.push_mark("strong", Nesting::Open, range),
            Tag::Strikethrough => self.push_mark("s", Nesting::Open, range),
            Tag::Link {
                dest_url, title, ..
            } => {
                let mut token = Token::new("link_open", Nesting::Open, range.clone())
                    .with_attr("href", dest_url.to_string());
                if !title.is_empty() {
                    token = token.with_attr("title", title.to_string());
                }
                self.push_inline(token, range);
            }
            Tag::Image {
                dest_url, title, ..
            } => {
                let mut token = Token::new("image", Nesting::SelfClosing, range)
                    .with_attr("src", dest_url.to_string());
                if !title.is_empty() {
                    token = token.with_attr("title", title.to_string());
                }
                self.image = Some(token);
            }
            other => tracing::debug!(?other, "skipping unsupported markdown tag"),
        }
    }

    fn end(&mut self, tag: TagEnd, range: Range<usize>) {
        match tag {
            TagEnd::Paragraph => {
                self.flush_inline();
                self.tokens
                    .push(Token::new("paragraph_close", Nesting::Close, range).block());
            }
            TagEnd::Heading(_) => {
                self.flush_inline();
                self.tokens
                    .push(Token::new("heading_close", Nesting::Close, range).block());
            }
            TagEnd::BlockQuote(_) => {
                self.flush_inline();
                self.containers.pop();
                self.tokens
                    .push(Token::new("blockquote_close", Nesting::Close, range).block());
            }
            TagEnd::List(ordered) => {
                self.flush_inline();
                if let Some(Container::List { open_ix, loose }) = self.containers.pop() {
                    if let Some(open) = self.tokens.get_mut(open_ix) {
                        open.attrs.insert("tight".to_string(), Value::Bool(!loose));
                    }
                }
                let kind = if ordered {
                    "ordered_list_close"
                } else {
                    "bullet_list_close"
                };
                self.tokens
                    .push(Token::new(kind, Nesting::Close, range).block());
            }
            TagEnd::Item => {
                self.flush_inline();
                self.containers.pop();
                self.tokens
                    .push(Token::new("list_item_close", Nesting::Close, range).block());
            }
            TagEnd::CodeBlock | TagEnd::HtmlBlock => {
                if let Some(leaf) = self.leaf.take() {
                    self.tokens.push(leaf);
                }
            }
            TagEnd::Emphasis => self.push_mark("em", Nesting::Close, range),
            TagEnd::Strong => self.push_mark("strong", Nesting::Close, range),
            TagEnd::Strikethrough => self.push_mark("s", Nesting::Close, range),
            TagEnd::Link => {
                let token = Token::new("link_close", Nesting::Close, range.clone());
                self.push_inline(token, range);
            }
            TagEnd::Image => {
                if let Some(image) = self.image.take() {
                    self.push_inline(image, range);
                }
            }
            _ => {}
        }
    }

    fn push_mark(&mut self, base: &str, nesting: Nesting, range: Range<usize>) {
        if self.image.is_some() {
            return;
        }
        let suffix = if nesting == Nesting::Open {
            "_open"
        } else {
            "_close"
        };
        let token = Token::new(format!("{base}{suffix}"), nesting, range.clone());
        self.push_inline(token, range);
    }

    fn begin_inline(&mut self, range: Range<usize>, synthetic_paragraph: Option<bool>) {
        let token = Token::new("inline", Nesting::SelfClosing, range.start..range.start);
        self.inline = Some(InlineRun {
            token,
            synthetic_paragraph,
        });
    }

    fn push_inline(&mut self, token: Token, range: Range<usize>) {
        if self.inline.is_none() {
            // Inline content directly inside a list item: the item belongs
            // to a tight list, so wrap it in a hidden paragraph.
            let hidden = matches!(self.containers.last(), Some(Container::Item));
            let mut open = Token::new("paragraph_open", Nesting::Open, range.clone()).block();
            open.hidden = hidden;
            self.tokens.push(open);
            self.begin_inline(range.clone(), Some(hidden));
        }
        if let Some(run) = &mut self.inline {
            run.token.range.end = run.token.range.end.max(range.end);
            run.token.children.push(token);
        }
    }

    fn flush_inline(&mut self) {
        let Some(run) = self.inline.take() else {
            return;
        };
        let end = run.token.range.end;
        self.tokens.push(run.token);
        if let Some(hidden) = run.synthetic_paragraph {
            let mut close = Token::new("paragraph_close", Nesting::Close, end..end).block();
            close.hidden = hidden;
            self.tokens.push(close);
        }
    }

    fn mark_enclosing_list_loose(&mut self) {
        let len = self.containers.len();
        if len < 2 {
            return;
        }
        if let Container::List { loose, .. } = &mut self.containers[len - 2] {
            *loose = true;
        }
    }

    fn finish(mut self) -> Vec<Token> {
        self.flush_inline();
        if let Some(leaf) = self.leaf.take() {
            self.tokens.push(leaf);
        }
        self.tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(tokens: &[Token]) -> Vec<&str> {
        tokens.iter().map(|t| t.kind.as_str()).collect()
    }

    #[test]
    fn base_type_strips_nesting_suffix() {
        let open = Token::new("bullet_list_open", Nesting::Open, 0..0);
        let close = Token::new("strong_close", Nesting::Close, 0..0);
        let text = Token::new("code_inline", Nesting::SelfClosing, 0..0);
        assert_eq!(open.base_type(), "bullet_list");
        assert_eq!(close.base_type(), "strong");
        assert_eq!(text.base_type(), "code_inline");
    }

    #[test]
    fn paragraph_wraps_one_inline_token() {
        let tokens = tokenize("hello *world*\n", &MarkdownOptions::default());
        assert_eq!(
            kinds(&tokens),
            vec!["paragraph_open", "inline", "paragraph_close"]
        );
        assert_eq!(
            kinds(&tokens[1].children),
            vec!["text", "em_open", "text", "em_close"]
        );
    }

    #[test]
    fn tight_list_gets_hidden_paragraphs() {
        let tokens = tokenize("- a\n- b\n", &MarkdownOptions::default());
        assert_eq!(tokens[0].kind, "bullet_list_open");
        assert_eq!(tokens[0].attr_bool("tight"), Some(true));
        let paragraphs: Vec<&Token> = tokens
            .iter()
            .filter(|t| t.kind == "paragraph_open")
            .collect();
        assert_eq!(paragraphs.len(), 2);
        assert!(paragraphs.iter().all(|t| t.hidden));
    }

    #[test]
    fn loose_ordered_list_keeps_start() {
        let tokens = tokenize("3. a\n\n4. b\n", &MarkdownOptions::default());
        assert_eq!(tokens[0].kind, "ordered_list_open");
        assert_eq!(tokens[0].attr_u64("start"), Some(3));
        assert_eq!(tokens[0].attr_bool("tight"), Some(false));
        assert!(
            tokens
                .iter()
                .filter(|t| t.kind == "paragraph_open")
                .all(|t| !t.hidden)
        );
    }

    #[test]
    fn fenced_code_collects_its_content() {
        let tokens = tokenize("```rust\nfn main() {}\n```\n", &MarkdownOptions::default());
        assert_eq!(kinds(&tokens), vec!["fence"]);
        assert_eq!(tokens[0].info, "rust");
        assert_eq!(tokens[0].content, "fn main() {}\n");
    }
}
