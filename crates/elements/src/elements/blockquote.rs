use markslate_doc::Node;

use super::element_view;
use crate::registry::ElementHandler;

pub(super) fn handler() -> ElementHandler {
    ElementHandler::new(
        ["blockquote"],
        |args| {
            let children = if args.is_empty {
                vec![Node::paragraph("")]
            } else {
                args.children
            };
            Some(Node::element("blockquote", children))
        },
        |props| element_view("blockquote", props),
        |args| {
            let body = args.children.trim_end_matches('\n');
            let quoted: Vec<String> = body
                .split('\n')
                .map(|line| {
                    if line.is_empty() {
                        ">".to_string()
                    } else {
                        format!("> {line}")
                    }
                })
                .collect();
            format!("{}{}", quoted.join("\n"), args.info.block_end())
        },
    )
    // A quote inside a tight list item still separates its own blocks.
    .child_info_hook(|_node, child_info| child_info.tight = false)
}
