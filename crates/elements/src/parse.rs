use std::sync::Arc;

use markslate_doc::{Document, Marks, Node, TextNode};

use crate::options::MarkdownOptions;
use crate::registry::{PluginRegistry, ToTreeArgs};
use crate::token::{Nesting, Token, tokenize};

/// Running state threaded through every `to_tree` call of one parse. The
/// converter never looks inside; handlers use it to carry context such as
/// the marks opened by formatting tokens.
#[derive(Debug, Clone, Default)]
pub struct ParserState {
    pub marks: Marks,
}

struct Frame<'t> {
    open: Option<&'t Token>,
    children: Vec<Node>,
}

pub fn markdown_to_document(
    markdown: &str,
    registry: &PluginRegistry,
    options: &MarkdownOptions,
) -> Document {
    parse_tokens(&tokenize(markdown, options), registry)
}

pub fn parse_tokens(tokens: &[Token], registry: &PluginRegistry) -> Document {
    let mut state = ParserState::default();
    let mut stack: Vec<Frame<'_>> = vec![Frame {
        open: None,
        children: Vec::new(),
    }];

    for token in tokens {
        match token.nesting {
            Nesting::Open => stack.push(Frame {
                open: Some(token),
                children: Vec::new(),
            }),
            Nesting::Close => close_frame(&mut stack, &mut state, registry),
            Nesting::SelfClosing if token.kind == "inline" => {
                // Inline tokens are flat: formatting markers only toggle state.
                for child in &token.children {
                    let node = convert(child, Vec::new(), &mut state, registry);
                    push_child(&mut stack, node);
                }
            }
            Nesting::SelfClosing => {
                let node = convert(token, Vec::new(), &mut state, registry);
                push_child(&mut stack, node);
            }
        }
    }

    while stack.len() > 1 {
        tracing::debug!("closing unterminated markdown block");
        close_frame(&mut stack, &mut state, registry);
    }

    let children = stack.pop().map(|root| root.children).unwrap_or_default();
    Document::new(merge_text_leaves(children))
}

fn close_frame(stack: &mut Vec<Frame<'_>>, state: &mut ParserState, registry: &PluginRegistry) {
    if stack.len() < 2 {
        tracing::debug!("ignoring close token without a matching open");
        return;
    }
    let Some(Frame { open, children }) = stack.pop() else {
        return;
    };
    let Some(open) = open else {
        return;
    };
    let node = convert(open, merge_text_leaves(children), state, registry);
    push_child(stack, node);
}

fn convert(
    token: &Token,
    children: Vec<Node>,
    state: &mut ParserState,
    registry: &PluginRegistry,
) -> Option<Node> {
    let kind = token.base_type();
    let to_tree = registry.to_tree(kind);
    let is_empty = children.is_empty();
    to_tree(ToTreeArgs {
        kind,
        token,
        state,
        children,
        is_empty,
    })
}

fn push_child(stack: &mut [Frame<'_>], node: Option<Node>) {
    if let (Some(node), Some(frame)) = (node, stack.last_mut()) {
        frame.children.push(node);
    }
}

/// Joins neighbouring text leaves that carry identical marks.
pub fn merge_text_leaves(children: Vec<Node>) -> Vec<Node> {
    let mut out: Vec<Node> = Vec::with_capacity(children.len());
    for node in children {
        if let (Node::Text(right), Some(Node::Text(left))) = (&node, out.last_mut()) {
            if left.marks == right.marks {
                let mut merged = TextNode::clone(left);
                merged.text.push_str(&right.text);
                *left = Arc::new(merged);
                continue;
            }
        }
        out.push(node);
    }
    out
}
