use markslate_doc::Node;

use super::element_view;
use crate::registry::ElementHandler;

pub(super) fn handler() -> ElementHandler {
    ElementHandler::new(
        ["paragraph"],
        |args| {
            let children = if args.is_empty {
                vec![Node::text("")]
            } else {
                args.children
            };
            Some(Node::element("paragraph", children))
        },
        |props| element_view("p", props),
        |args| format!("{}{}", args.children, args.info.block_end()),
    )
}
