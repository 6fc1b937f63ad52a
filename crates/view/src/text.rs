use std::sync::Arc;

use markslate_doc::{Node, Path, TextNode};
use markslate_elements::{ElementAttributes, PluginRegistry, RenderElementProps, ViewNode};

use crate::identity::{ElementHandle, IdentityCache, Key};
use crate::leaf::{Decoration, LeafRenderer, RenderLeafProps, default_render_leaf, leaves};

/// Inputs of one rendered text leaf.
#[derive(Clone)]
pub struct TextProps {
    pub decorations: Vec<Decoration>,
    /// Last leaf of its parent block.
    pub is_last: bool,
    pub parent: Path,
    pub render_leaf: Option<LeafRenderer>,
    pub text: Arc<TextNode>,
}

/// Whether a leaf can keep its previous rendering. Parent and decorations
/// are not compared.
pub fn text_props_unchanged(prev: &TextProps, next: &TextProps) -> bool {
    let same_renderer = match (&prev.render_leaf, &next.render_leaf) {
        (Some(a), Some(b)) => Arc::ptr_eq(a, b),
        (None, None) => true,
        _ => false,
    };
    same_renderer && prev.is_last == next.is_last && Arc::ptr_eq(&prev.text, &next.text)
}

pub fn render_text(props: &TextProps, key: Key, registry: &PluginRegistry) -> ViewNode {
    let parts = leaves(&props.text, &props.decorations);
    let count = parts.len();

    let children = parts
        .iter()
        .enumerate()
        .map(|(i, leaf)| {
            let is_last = props.is_last && i + 1 == count;
            let content = if leaf.text.is_empty() {
                ViewNode::element("span", vec![ViewNode::text("\u{feff}")])
                    .with_attr("data-slate-zero-width", if is_last { "n" } else { "z" })
            } else {
                ViewNode::text(leaf.text.clone())
            };
            let leaf_props = RenderLeafProps {
                leaf,
                text: &props.text,
                is_last,
                children: content,
            };
            let inner = match &props.render_leaf {
                Some(render) => render(leaf_props),
                None => default_render_leaf(leaf_props),
            };
            let mut span = ViewNode::element("span", vec![inner])
                .with_attr("data-slate-leaf", "true")
                .with_attr("data-leaf-key", format!("{key}-{i}"));
            if !leaf.classes.is_empty() {
                span = span.with_attr("class", leaf.classes.join(" "));
            }
            span
        })
        .collect();

    let node = Node::Text(props.text.clone());
    let render = registry.renderer("text");
    render(RenderElementProps {
        node: &node,
        attributes: ElementAttributes::text(key.to_string()),
        children,
    })
}

/// Post-commit bookkeeping for one leaf: bind it to the element it now
/// renders into, or drop its bindings once it has none.
pub fn layout_effect(
    cache: &mut IdentityCache,
    text: &Arc<TextNode>,
    element: Option<ElementHandle>,
) -> Option<ElementHandle> {
    match element {
        Some(element) => cache.mount(text, element),
        None => cache.unmount(text),
    }
}
