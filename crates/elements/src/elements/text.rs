use markslate_doc::{Attrs, Marks, Node, TextNode};

use super::element_view;
use crate::options::MarkdownOptions;
use crate::registry::{ElementHandler, FromTreeArgs, ToTreeArgs};
use crate::token::Nesting;

/// Text leaves. Plain text, soft breaks, inline code and every formatting
/// marker converge on this one node type; the markers only toggle marks on
/// the parser state.
pub(super) fn text_handler() -> ElementHandler {
    ElementHandler::new(
        ["text"],
        text_to_tree,
        |props| element_view("span", props),
        text_from_tree,
    )
    .markdown_types([
        "text",
        "softbreak",
        "code_inline",
        "strong",
        "em",
        "s",
        "link",
    ])
}

pub(super) fn hardbreak_handler() -> ElementHandler {
    ElementHandler::new(
        ["hardbreak"],
        |_args| Some(Node::void("hardbreak", Attrs::default())),
        |props| element_view("br", props),
        |_args| "\\\n".to_string(),
    )
}

fn text_to_tree(args: ToTreeArgs<'_>) -> Option<Node> {
    let opening = args.token.nesting != Nesting::Close;
    let marks = &mut args.state.marks;
    match args.kind {
        "strong" => {
            marks.bold = opening;
            None
        }
        "em" => {
            marks.italic = opening;
            None
        }
        "s" => {
            marks.strikethrough = opening;
            None
        }
        "link" => {
            marks.link = if opening {
                args.token.attr_str("href").map(str::to_string)
            } else {
                None
            };
            None
        }
        "softbreak" => Some(Node::marked_text("\n", marks.clone())),
        "code_inline" => Some(Node::marked_text(
            args.token.content.clone(),
            Marks {
                code: true,
                ..marks.clone()
            },
        )),
        _ => Some(Node::marked_text(args.token.content.clone(), marks.clone())),
    }
}

fn text_from_tree(args: FromTreeArgs<'_>) -> String {
    match args.node {
        Node::Text(text) => text_to_markdown(text, args.info.line_start, args.info.options),
        _ => args.children.to_string(),
    }
}

pub fn text_to_markdown(text: &TextNode, at_line_start: bool, options: &MarkdownOptions) -> String {
    if text.text.is_empty() {
        return String::new();
    }
    let marks = &text.marks;
    let mut out = if marks.code {
        code_span(&text.text)
    } else {
        escape_text(&text.text, at_line_start)
    };
    if marks.strikethrough {
        out = wrap(&out, "~~");
    }
    if marks.italic {
        out = wrap(&out, &options.emphasis.to_string());
    }
    if marks.bold {
        out = wrap(&out, &options.emphasis.to_string().repeat(2));
    }
    if let Some(href) = &marks.link {
        let destination = if href.contains([' ', '(', ')']) {
            format!("<{href}>")
        } else {
            href.clone()
        };
        out = format!("[{out}]({destination})");
    }
    out
}

/// Wraps `text` in `delim`, keeping surrounding whitespace outside so the
/// delimiters stay left/right flanking.
fn wrap(text: &str, delim: &str) -> String {
    let inner = text.trim();
    if inner.is_empty() {
        return text.to_string();
    }
    let lead = &text[..text.len() - text.trim_start().len()];
    let trail = &text[text.trim_end().len()..];
    format!("{lead}{delim}{inner}{delim}{trail}")
}

fn code_span(text: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for ch in text.chars() {
        if ch == '`' {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    let ticks = "`".repeat(longest + 1);
    let pad = text.starts_with('`')
        || text.ends_with('`')
        || (text.starts_with(' ') && text.ends_with(' ') && !text.trim().is_empty());
    if pad {
        format!("{ticks} {text} {ticks}")
    } else {
        format!("{ticks}{text}{ticks}")
    }
}

/// Backslash-escapes markdown syntax in plain text. Block markers are only
/// special at the start of a line.
pub fn escape_text(text: &str, at_line_start: bool) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut line_start = at_line_start;
    let mut ix = 0;

    while ix < chars.len() {
        let ch = chars[ix];
        if ch == '\n' {
            out.push(ch);
            line_start = true;
            ix += 1;
            continue;
        }
        if line_start {
            if ch == ' ' {
                out.push(ch);
                ix += 1;
                continue;
            }
            line_start = false;
            if matches!(ch, '#' | '>' | '-' | '+' | '=') {
                out.push('\\');
                out.push(ch);
                ix += 1;
                continue;
            }
            if ch.is_ascii_digit() {
                let digits_end = chars[ix..]
                    .iter()
                    .position(|c| !c.is_ascii_digit())
                    .map_or(chars.len(), |p| ix + p);
                if let Some(&punct @ ('.' | ')')) = chars.get(digits_end) {
                    out.extend(&chars[ix..digits_end]);
                    out.push('\\');
                    out.push(punct);
                    ix = digits_end + 1;
                    continue;
                }
            }
        }
        if matches!(ch, '\\' | '`' | '*' | '_' | '[' | ']' | '<' | '&' | '~') {
            out.push('\\');
        }
        out.push(ch);
        ix += 1;
    }
    out
}
