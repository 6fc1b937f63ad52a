use markslate_doc::{Attrs, Node};

use super::{attr_str, element_view};
use crate::registry::ElementHandler;

pub(super) fn handler() -> ElementHandler {
    ElementHandler::new(
        ["image"],
        |args| {
            let mut attrs = Attrs::default();
            attrs.insert(
                "src".to_string(),
                args.token.attr_str("src").unwrap_or_default().into(),
            );
            attrs.insert("alt".to_string(), args.token.content.clone().into());
            if let Some(title) = args.token.attr_str("title") {
                attrs.insert("title".to_string(), title.into());
            }
            Some(Node::void("image", attrs))
        },
        |props| {
            let src = attr_str(props.node, "src").unwrap_or_default().to_string();
            let alt = attr_str(props.node, "alt").unwrap_or_default().to_string();
            let title = attr_str(props.node, "title").map(str::to_string);
            let mut view = element_view("img", props)
                .with_attr("src", src)
                .with_attr("alt", alt);
            if let Some(title) = title {
                view = view.with_attr("title", title);
            }
            view
        },
        |args| {
            let src = attr_str(args.node, "src").unwrap_or_default();
            let alt = attr_str(args.node, "alt")
                .unwrap_or_default()
                .replace('[', "\\[")
                .replace(']', "\\]");
            let destination = if src.contains([' ', '(', ')']) {
                format!("<{src}>")
            } else {
                src.to_string()
            };
            match attr_str(args.node, "title") {
                Some(title) => format!(
                    "![{alt}]({destination} \"{}\")",
                    title.replace('"', "\\\"")
                ),
                None => format!("![{alt}]({destination})"),
            }
        },
    )
}
