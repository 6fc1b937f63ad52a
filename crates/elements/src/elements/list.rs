use markslate_doc::{Attrs, Node};

use super::{attr_bool, attr_u64, element_view, indent_lines};
use crate::registry::ElementHandler;
use crate::serialize::ListContext;

pub(super) fn list_handler() -> ElementHandler {
    ElementHandler::new(
        ["bullet_list", "ordered_list"],
        |args| {
            let mut attrs = Attrs::default();
            attrs.insert(
                "tight".to_string(),
                args.token.attr_bool("tight").unwrap_or(false).into(),
            );
            if args.kind == "ordered_list" {
                attrs.insert(
                    "start".to_string(),
                    args.token.attr_u64("start").unwrap_or(1).into(),
                );
            }
            Some(Node::element_with_attrs(args.kind, attrs, args.children))
        },
        |props| {
            if props.node.kind() == "ordered_list" {
                let start = attr_u64(props.node, "start").unwrap_or(1);
                let view = element_view("ol", props);
                if start == 1 {
                    view
                } else {
                    view.with_attr("start", start.to_string())
                }
            } else {
                element_view("ul", props)
            }
        },
        |args| {
            // A tight list still needs a blank line before whatever follows
            // it, unless it sits inside a tight list itself.
            if args.child_info.tight && !args.info.inherited.tight {
                format!("{}\n", args.children)
            } else {
                args.children.to_string()
            }
        },
    )
    .child_info_hook(|node, child_info| {
        child_info.tight = attr_bool(node, "tight");
        child_info.list = Some(ListContext {
            ordered: node.kind() == "ordered_list",
            start: attr_u64(node, "start").unwrap_or(1),
        });
    })
}

pub(super) fn list_item_handler() -> ElementHandler {
    ElementHandler::new(
        ["list_item"],
        |args| {
            let children = if args.is_empty {
                vec![Node::paragraph("")]
            } else {
                args.children
            };
            Some(Node::element("list_item", children))
        },
        |props| element_view("li", props),
        |args| {
            let marker = match &args.info.inherited.list {
                Some(ListContext {
                    ordered: true,
                    start,
                }) => format!("{}. ", start + args.info.index as u64),
                _ => format!("{} ", args.info.options.bullet),
            };
            let body = args.children.trim_end_matches('\n');
            let item = if body.is_empty() {
                marker.trim_end().to_string()
            } else {
                indent_lines(&marker, &" ".repeat(marker.len()), body)
            };
            format!("{item}{}", args.info.block_end())
        },
    )
}
