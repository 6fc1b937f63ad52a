use markslate_doc::{Attrs, Node};

use super::{attr_bool, attr_str, element_view};
use crate::registry::{ElementHandler, GENERIC};
use crate::render::ViewNode;

/// Fallback for constructs no plugin understands. The raw markdown is kept
/// on the node so it survives a round trip untouched.
pub(super) fn handler() -> ElementHandler {
    ElementHandler::new(
        [GENERIC],
        |args| {
            let mut attrs = Attrs::default();
            attrs.insert("token".to_string(), args.kind.into());
            if !args.is_empty {
                return Some(Node::element_with_attrs(GENERIC, attrs, args.children));
            }
            attrs.insert("markdown".to_string(), args.token.content.clone().into());
            attrs.insert("block".to_string(), args.token.block.into());
            Some(Node::void(GENERIC, attrs))
        },
        |mut props| {
            let token = attr_str(props.node, "token").unwrap_or(GENERIC).to_string();
            let block = matches!(props.node, Node::Element(_)) || attr_bool(props.node, "block");
            if let Some(markdown) = attr_str(props.node, "markdown") {
                props.children = vec![ViewNode::text(markdown)];
            }
            let tag = if block { "div" } else { "span" };
            element_view(tag, props).with_attr("data-token", token)
        },
        |args| match args.node {
            Node::Void(_) => {
                let markdown = attr_str(args.node, "markdown").unwrap_or_default();
                if attr_bool(args.node, "block") {
                    format!(
                        "{}{}",
                        markdown.trim_end_matches('\n'),
                        args.info.block_end()
                    )
                } else {
                    markdown.to_string()
                }
            }
            _ => args.children.to_string(),
        },
    )
}
