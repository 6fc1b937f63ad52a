use std::sync::Arc;

use markslate_doc::{Marks, TextNode};
use markslate_elements::{PluginRegistry, ViewNode};
use markslate_view::{
    Decoration, IdentityCache, LeafRenderer, RenderLeafProps, TextProps, render_text,
    text_props_unchanged,
};

fn props(text: &Arc<TextNode>, parent: Vec<usize>) -> TextProps {
    TextProps {
        decorations: Vec::new(),
        is_last: true,
        parent,
        render_leaf: None,
        text: text.clone(),
    }
}

#[test]
fn different_parent_is_still_unchanged() {
    let text = Arc::new(TextNode::new("a"));
    let prev = props(&text, vec![0]);
    let next = props(&text, vec![3, 1]);

    assert!(text_props_unchanged(&prev, &next));
}

#[test]
fn decorations_are_not_compared() {
    let text = Arc::new(TextNode::new("abc"));
    let prev = props(&text, vec![0]);
    let mut next = props(&text, vec![0]);
    next.decorations.push(Decoration {
        range: 0..1,
        class: "hit".to_string(),
    });

    assert!(text_props_unchanged(&prev, &next));
}

#[test]
fn identity_last_flag_and_renderer_are_compared() {
    let text = Arc::new(TextNode::new("a"));
    let prev = props(&text, vec![0]);

    let mut next = props(&text, vec![0]);
    next.is_last = false;
    assert!(!text_props_unchanged(&prev, &next));

    // Equal content, new node.
    let copy = Arc::new(TextNode::new("a"));
    assert!(!text_props_unchanged(&prev, &props(&copy, vec![0])));

    let renderer: LeafRenderer = Arc::new(|leaf: RenderLeafProps<'_>| leaf.children);
    let mut with_renderer = props(&text, vec![0]);
    with_renderer.render_leaf = Some(renderer.clone());
    assert!(!text_props_unchanged(&prev, &with_renderer));

    let mut same_renderer = props(&text, vec![0]);
    same_renderer.render_leaf = Some(renderer);
    assert!(text_props_unchanged(&with_renderer, &same_renderer));
}

#[test]
fn leaves_are_keyed_and_only_the_final_one_is_last() {
    let registry = PluginRegistry::builtin();
    let mut cache = IdentityCache::new();
    let text = Arc::new(TextNode::new("hello"));
    let key = cache.find_key(&text);

    let renderer: LeafRenderer = Arc::new(|leaf: RenderLeafProps<'_>| {
        let suffix = if leaf.is_last { "$" } else { "" };
        ViewNode::text(format!("{}{suffix}", leaf.leaf.text))
    });
    let mut text_props = props(&text, vec![0]);
    text_props.render_leaf = Some(renderer);
    text_props.decorations.push(Decoration {
        range: 1..3,
        class: "hit".to_string(),
    });

    let view = render_text(&text_props, key, &registry);

    assert_eq!(view.tag(), Some("span"));
    assert_eq!(view.attr("data-slate-node"), Some("text"));
    assert_eq!(view.attr("data-key"), Some(key.to_string().as_str()));
    let leaf_keys: Vec<String> = view
        .children()
        .iter()
        .filter_map(|leaf| leaf.attr("data-leaf-key").map(str::to_string))
        .collect();
    assert_eq!(
        leaf_keys,
        vec![format!("{key}-0"), format!("{key}-1"), format!("{key}-2")]
    );
    assert_eq!(view.children()[1].attr("class"), Some("hit"));
    let texts: Vec<ViewNode> = view
        .children()
        .iter()
        .map(|leaf| leaf.children()[0].clone())
        .collect();
    assert_eq!(
        texts,
        vec![
            ViewNode::text("h"),
            ViewNode::text("el"),
            ViewNode::text("lo$"),
        ]
    );
}

#[test]
fn default_leaf_rendering_applies_marks() {
    let registry = PluginRegistry::builtin();
    let mut cache = IdentityCache::new();
    let text = Arc::new(TextNode {
        text: "go".to_string(),
        marks: Marks {
            bold: true,
            link: Some("https://x.io".to_string()),
            ..Marks::default()
        },
    });
    let key = cache.find_key(&text);

    let view = render_text(&props(&text, vec![0]), key, &registry);

    assert_eq!(
        view.to_html(),
        format!(
            "<span data-slate-node=\"text\" data-key=\"{key}\">\
             <span data-slate-leaf=\"true\" data-leaf-key=\"{key}-0\">\
             <a href=\"https://x.io\"><strong>go</strong></a></span></span>"
        )
    );
}

#[test]
fn empty_last_leaf_renders_a_line_break_placeholder() {
    let registry = PluginRegistry::builtin();
    let mut cache = IdentityCache::new();
    let text = Arc::new(TextNode::new(""));
    let key = cache.find_key(&text);

    let view = render_text(&props(&text, vec![0]), key, &registry);

    let placeholder = &view.children()[0].children()[0];
    assert_eq!(placeholder.attr("data-slate-zero-width"), Some("n"));
}
