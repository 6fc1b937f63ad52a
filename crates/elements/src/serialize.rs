use markslate_doc::{Document, Node};

use crate::options::MarkdownOptions;
use crate::registry::{FromTreeArgs, PluginRegistry};

/// Context a parent builds for its children while they are serialized.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChildInfo {
    /// Children are blocks of a tight list and must not be separated by
    /// blank lines.
    pub tight: bool,
    pub list: Option<ListContext>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListContext {
    pub ordered: bool,
    pub start: u64,
}

impl ChildInfo {
    /// The context a node's children start from: tightness carries down,
    /// everything else is the parent hook's business.
    pub fn descend(inherited: &ChildInfo) -> Self {
        Self {
            tight: inherited.tight,
            list: None,
        }
    }
}

pub struct FormatInfo<'a> {
    pub index: usize,
    /// The node's output begins a new line of its block.
    pub line_start: bool,
    pub last_child: bool,
    pub depth: usize,
    pub parent_kind: Option<&'a str>,
    /// What the parent's hook produced for this node and its siblings.
    pub inherited: &'a ChildInfo,
    pub options: &'a MarkdownOptions,
}

impl FormatInfo<'_> {
    /// Line ending that closes a block in this context.
    pub fn block_end(&self) -> &'static str {
        if self.inherited.tight { "\n" } else { "\n\n" }
    }
}

pub fn document_to_markdown(
    doc: &Document,
    registry: &PluginRegistry,
    options: &MarkdownOptions,
) -> String {
    let root = ChildInfo::default();
    let out = serialize_children(&doc.children, None, 0, &root, options, registry);
    let trimmed = out.trim_end_matches('\n');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

pub fn serialize_node(node: &Node, info: &FormatInfo<'_>, registry: &PluginRegistry) -> String {
    let mut child_info = ChildInfo::descend(info.inherited);
    if let Some(hook) = registry.child_info_hook(node.kind()) {
        hook(node, &mut child_info);
    }

    let children = serialize_children(
        node.children(),
        Some(node.kind()),
        info.depth + 1,
        &child_info,
        info.options,
        registry,
    );

    let from_tree = registry.from_tree(node.kind());
    from_tree(FromTreeArgs {
        node,
        children: &children,
        info,
        child_info: &child_info,
    })
}

fn serialize_children(
    children: &[Node],
    parent_kind: Option<&str>,
    depth: usize,
    inherited: &ChildInfo,
    options: &MarkdownOptions,
    registry: &PluginRegistry,
) -> String {
    let mut out = String::new();
    for (index, child) in children.iter().enumerate() {
        let line_start = match index.checked_sub(1).and_then(|prev| children.get(prev)) {
            None => true,
            Some(Node::Text(prev)) => prev.text.ends_with('\n'),
            Some(prev) => prev.kind() == "hardbreak",
        };
        let info = FormatInfo {
            index,
            line_start,
            last_child: index + 1 == children.len(),
            depth,
            parent_kind,
            inherited,
            options,
        };
        out.push_str(&serialize_node(child, &info, registry));
    }
    out
}
