use markslate_doc::{Attrs, Node};

use super::{attr_bool, attr_str, element_view};
use crate::registry::ElementHandler;
use crate::render::ViewNode;

pub(super) fn handler() -> ElementHandler {
    ElementHandler::new(
        ["code_block"],
        |args| {
            let mut attrs = Attrs::default();
            attrs.insert("value".to_string(), args.token.content.clone().into());
            attrs.insert("info".to_string(), args.token.info.clone().into());
            attrs.insert("fence".to_string(), (args.kind == "fence").into());
            Some(Node::void("code_block", attrs))
        },
        |mut props| {
            let value = attr_str(props.node, "value").unwrap_or_default().to_string();
            let mut code = ViewNode::element("code", vec![ViewNode::text(value)]);
            if let Some(lang) = attr_str(props.node, "info").filter(|s| !s.is_empty()) {
                code = code.with_attr("class", format!("language-{lang}"));
            }
            props.children = vec![code];
            element_view("pre", props)
        },
        |args| {
            let value = attr_str(args.node, "value").unwrap_or_default();
            let info = attr_str(args.node, "info").unwrap_or_default();
            let end = args.info.block_end();

            if !attr_bool(args.node, "fence") && info.is_empty() && !value.trim().is_empty() {
                let body = value.trim_end_matches('\n');
                let indented: Vec<String> = body
                    .split('\n')
                    .map(|line| {
                        if line.is_empty() {
                            String::new()
                        } else {
                            format!("    {line}")
                        }
                    })
                    .collect();
                return format!("{}{end}", indented.join("\n"));
            }

            let fence = fence_for(value, args.info.options.fence_char(), &args.info.options.fence);
            let mut body = value.to_string();
            if !body.is_empty() && !body.ends_with('\n') {
                body.push('\n');
            }
            format!("{fence}{info}\n{body}{fence}{end}")
        },
    )
    .markdown_types(["fence", "code_block"])
}

/// A fence longer than any run of the fence character inside the code.
fn fence_for(value: &str, fence_char: char, preferred: &str) -> String {
    let mut longest = 0;
    let mut run = 0;
    for ch in value.chars() {
        if ch == fence_char {
            run += 1;
            longest = longest.max(run);
        } else {
            run = 0;
        }
    }
    if longest < preferred.chars().count() {
        preferred.to_string()
    } else {
        fence_char.to_string().repeat(longest + 1)
    }
}
