use markslate_doc::{Attrs, Node};

use super::element_view;
use crate::registry::ElementHandler;

pub(super) fn handler() -> ElementHandler {
    ElementHandler::new(
        ["hr"],
        |_args| Some(Node::void("hr", Attrs::default())),
        |props| element_view("hr", props),
        |args| format!("{}{}", args.info.options.thematic_break, args.info.block_end()),
    )
}
