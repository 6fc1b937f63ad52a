use markslate_doc::{Attrs, Node};

use super::{attr_u64, element_view};
use crate::registry::ElementHandler;

const MAX_LEVEL: u64 = 6;

fn level_of(node: &Node) -> u64 {
    attr_u64(node, "level").unwrap_or(1).clamp(1, MAX_LEVEL)
}

pub(super) fn handler() -> ElementHandler {
    ElementHandler::new(
        ["heading"],
        |args| {
            let level = args.token.attr_u64("level").unwrap_or(1).clamp(1, MAX_LEVEL);
            let mut attrs = Attrs::default();
            attrs.insert("level".to_string(), level.into());
            let children = if args.is_empty {
                vec![Node::text("")]
            } else {
                args.children
            };
            Some(Node::element_with_attrs("heading", attrs, children))
        },
        |props| {
            let tag = format!("h{}", level_of(props.node));
            element_view(&tag, props)
        },
        |args| {
            let hashes = "#".repeat(level_of(args.node) as usize);
            let text = protect_closing_sequence(args.children.replace('\n', " "));
            format!("{hashes} {text}{}", args.info.block_end())
        },
    )
}

/// A trailing run of `#` after a space (or as the whole text) would be read
/// back as the optional closing sequence, so its first `#` is escaped.
fn protect_closing_sequence(mut text: String) -> String {
    let body = text.trim_end();
    let run_start = body.trim_end_matches('#').len();
    if run_start < body.len() && (run_start == 0 || body[..run_start].ends_with([' ', '\t'])) {
        text.insert(run_start, '\\');
    }
    text
}
