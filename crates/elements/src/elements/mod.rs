mod blockquote;
mod code_block;
mod generic;
mod heading;
mod hr;
mod image;
mod list;
mod paragraph;
mod text;

use markslate_doc::Node;

use crate::registry::ElementHandler;
use crate::render::{RenderElementProps, ViewNode};

pub use text::{escape_text, text_to_markdown};

pub fn builtin_handlers() -> Vec<ElementHandler> {
    vec![
        generic::handler(),
        paragraph::handler(),
        heading::handler(),
        list::list_handler(),
        list::list_item_handler(),
        blockquote::handler(),
        code_block::handler(),
        hr::handler(),
        image::handler(),
        text::text_handler(),
        text::hardbreak_handler(),
    ]
}

fn element_view(tag: &str, props: RenderElementProps<'_>) -> ViewNode {
    let view = ViewNode::element(tag, props.children);
    props.attributes.apply(view)
}

fn attr_str<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    node.attr(key).and_then(|v| v.as_str())
}

fn attr_u64(node: &Node, key: &str) -> Option<u64> {
    node.attr(key).and_then(|v| v.as_u64())
}

fn attr_bool(node: &Node, key: &str) -> bool {
    node.attr(key).and_then(|v| v.as_bool()).unwrap_or(false)
}

/// Prefixes every line after the first with `indent`, leaving blank lines empty.
fn indent_lines(first_prefix: &str, indent: &str, body: &str) -> String {
    let mut out = String::new();
    for (ix, line) in body.split('\n').enumerate() {
        if ix == 0 {
            out.push_str(first_prefix);
        } else {
            out.push('\n');
            if !line.is_empty() {
                out.push_str(indent);
            }
        }
        out.push_str(line);
    }
    out
}
