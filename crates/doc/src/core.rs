use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::ops::{Op, Path, Transaction, child_path, parent_path};

pub type Attrs = BTreeMap<String, serde_json::Value>;
pub type ElementKind = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Document {
    #[serde(default)]
    pub children: Vec<Node>,
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.children.get(first)?;
        for &ix in rest {
            node = match node {
                Node::Element(el) => el.children.get(ix)?,
                Node::Void(_) | Node::Text(_) => return None,
            };
        }
        Some(node)
    }

    /// Paths of every text leaf, in document order.
    pub fn text_paths(&self) -> Vec<Path> {
        fn walk(children: &[Node], path: &mut Vec<usize>, out: &mut Vec<Path>) {
            for (ix, node) in children.iter().enumerate() {
                path.push(ix);
                match node {
                    Node::Text(_) => out.push(path.clone()),
                    Node::Element(el) => walk(&el.children, path, out),
                    Node::Void(_) => {}
                }
                path.pop();
            }
        }

        let mut out = Vec::new();
        walk(&self.children, &mut Vec::new(), &mut out);
        out
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "node", rename_all = "snake_case")]
pub enum Node {
    Element(ElementNode),
    Text(Arc<TextNode>),
    Void(VoidNode),
}

impl Node {
    pub fn element(kind: impl Into<String>, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            kind: kind.into(),
            attrs: Attrs::default(),
            children,
        })
    }

    pub fn element_with_attrs(kind: impl Into<String>, attrs: Attrs, children: Vec<Node>) -> Self {
        Node::Element(ElementNode {
            kind: kind.into(),
            attrs,
            children,
        })
    }

    pub fn void(kind: impl Into<String>, attrs: Attrs) -> Self {
        Node::Void(VoidNode {
            kind: kind.into(),
            attrs,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Arc::new(TextNode::new(text)))
    }

    pub fn marked_text(text: impl Into<String>, marks: Marks) -> Self {
        Node::Text(Arc::new(TextNode {
            text: text.into(),
            marks,
        }))
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        Node::element("paragraph", vec![Node::text(text)])
    }

    /// The type tag used for registry dispatch. Text leaves report `"text"`.
    pub fn kind(&self) -> &str {
        match self {
            Node::Element(el) => &el.kind,
            Node::Void(v) => &v.kind,
            Node::Text(_) => "text",
        }
    }

    pub fn attrs(&self) -> Option<&Attrs> {
        match self {
            Node::Element(el) => Some(&el.attrs),
            Node::Void(v) => Some(&v.attrs),
            Node::Text(_) => None,
        }
    }

    pub fn attr(&self, key: &str) -> Option<&serde_json::Value> {
        self.attrs().and_then(|attrs| attrs.get(key))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(el) => &el.children,
            Node::Void(_) | Node::Text(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementNode {
    pub kind: ElementKind,
    #[serde(default)]
    pub attrs: Attrs,
    #[serde(default)]
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoidNode {
    pub kind: ElementKind,
    #[serde(default)]
    pub attrs: Attrs,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNode {
    pub text: String,
    #[serde(default)]
    pub marks: Marks,
}

impl TextNode {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Marks {
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub strikethrough: bool,
    #[serde(default)]
    pub code: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Point,
    pub focus: Point,
}

impl Selection {
    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ApplyError {
    #[error("invalid path: {0}")]
    InvalidPath(String),
}

impl From<PathError> for ApplyError {
    fn from(value: PathError) -> Self {
        ApplyError::InvalidPath(value.0)
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
pub struct PathError(pub String);

/// The host document-model capabilities the editing patches rely on.
pub trait HostEditor {
    fn selection(&self) -> Option<&Selection>;
    fn insert_node(&mut self, path: Path, node: Node) -> Result<(), ApplyError>;
    fn delete_backward(&mut self) -> Result<(), ApplyError>;
}

pub struct Editor {
    doc: Document,
    selection: Option<Selection>,
}

impl Editor {
    pub fn new(doc: Document, selection: Option<Selection>) -> Self {
        Self { doc, selection }
    }

    pub fn doc(&self) -> &Document {
        &self.doc
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn apply(&mut self, tx: Transaction) -> Result<(), ApplyError> {
        for op in tx.ops {
            self.apply_op(op)?;
        }
        if let Some(sel) = tx.selection_after {
            self.selection = Some(sel);
        }
        Ok(())
    }

    /// Applies a single op and returns its inverse.
    pub fn apply_op(&mut self, op: Op) -> Result<Op, ApplyError> {
        apply_op_to(&mut self.doc, &mut self.selection, op)
    }

    /// Deletes one unit backwards from a collapsed caret: the previous
    /// character, a preceding void, or the boundary between the caret's block
    /// and the previous text block in document order.
    pub fn delete_backward(&mut self) -> Result<(), ApplyError> {
        let Some(selection) = self.selection.clone() else {
            return Ok(());
        };
        if !selection.is_collapsed() {
            tracing::debug!("delete_backward ignores expanded selections");
            return Ok(());
        }

        let point = selection.focus;
        let Some(Node::Text(leaf)) = self.doc.node(&point.path) else {
            return Err(ApplyError::InvalidPath(format!(
                "caret is not in a text leaf: {:?}",
                point.path
            )));
        };

        if point.offset > 0 {
            let end = clamp_to_char_boundary(&leaf.text, point.offset);
            let start = prev_char_boundary(&leaf.text, end);
            self.apply_op(Op::RemoveText {
                path: point.path,
                range: start..end,
            })?;
            return Ok(());
        }

        let Some((&leaf_ix, block_path)) = point.path.split_last() else {
            return Ok(());
        };

        if leaf_ix > 0 {
            let prev_path = child_path(block_path, leaf_ix - 1);
            let removal = match self.doc.node(&prev_path) {
                Some(Node::Text(prev)) if !prev.text.is_empty() => {
                    let end = prev.text.len();
                    Some(prev_char_boundary(&prev.text, end)..end)
                }
                Some(_) => None,
                None => return Ok(()),
            };
            match removal {
                Some(range) => {
                    let offset = range.start;
                    self.apply_op(Op::RemoveText {
                        path: prev_path.clone(),
                        range,
                    })?;
                    self.selection = Some(Selection::collapsed(Point::new(prev_path, offset)));
                }
                None => {
                    self.apply_op(Op::RemoveNode { path: prev_path })?;
                }
            }
            return Ok(());
        }

        if let Some((&block_ix, container)) = block_path.split_last() {
            if block_ix > 0 {
                let prev_block = child_path(container, block_ix - 1);
                if let Some(Node::Void(_)) = self.doc.node(&prev_block) {
                    self.apply_op(Op::RemoveNode { path: prev_block })?;
                    return Ok(());
                }
            }
        }

        let Some(target_leaf) = previous_text_path(&self.doc, &point.path) else {
            tracing::debug!("delete_backward at document start is a no-op");
            return Ok(());
        };
        let target_block = parent_path(&target_leaf).to_vec();
        self.merge_block_into(block_path.to_vec(), target_block)
    }

    fn merge_block_into(&mut self, source: Path, target: Path) -> Result<(), ApplyError> {
        let Some(Node::Element(source_el)) = self.doc.node(&source).cloned() else {
            return Err(ApplyError::InvalidPath(format!("no block at {source:?}")));
        };
        let Some(Node::Element(target_el)) = self.doc.node(&target) else {
            return Err(ApplyError::InvalidPath(format!("no block at {target:?}")));
        };
        let base = target_el.children.len();

        for (ix, child) in source_el.children.into_iter().enumerate() {
            self.apply_op(Op::InsertNode {
                path: child_path(&target, base + ix),
                node: child,
            })?;
        }
        self.apply_op(Op::RemoveNode {
            path: source.clone(),
        })?;
        self.prune_empty_ancestors(parent_path(&source).to_vec())?;

        let mut caret = Point::new(child_path(&target, base), 0);
        if base > 0 {
            let left_path = child_path(&target, base - 1);
            let right_path = child_path(&target, base);
            let seam = match (self.doc.node(&left_path), self.doc.node(&right_path)) {
                (Some(Node::Text(left)), Some(Node::Text(right))) if left.marks == right.marks => {
                    Some((left.text.len(), right.text.clone()))
                }
                _ => None,
            };
            if let Some((offset, text)) = seam {
                self.apply_op(Op::InsertText {
                    path: left_path.clone(),
                    offset,
                    text,
                })?;
                self.apply_op(Op::RemoveNode { path: right_path })?;
                caret = Point::new(left_path, offset);
            }
        }

        self.selection = Some(Selection::collapsed(caret));
        Ok(())
    }

    fn prune_empty_ancestors(&mut self, mut path: Path) -> Result<(), ApplyError> {
        while !path.is_empty() {
            match self.doc.node(&path) {
                Some(Node::Element(el)) if el.children.is_empty() => {
                    self.apply_op(Op::RemoveNode { path: path.clone() })?;
                    path.pop();
                }
                _ => break,
            }
        }
        Ok(())
    }
}

impl HostEditor for Editor {
    fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    fn insert_node(&mut self, path: Path, node: Node) -> Result<(), ApplyError> {
        self.apply_op(Op::InsertNode { path, node }).map(|_| ())
    }

    fn delete_backward(&mut self) -> Result<(), ApplyError> {
        Editor::delete_backward(self)
    }
}

fn previous_text_path(doc: &Document, path: &[usize]) -> Option<Path> {
    let paths = doc.text_paths();
    let ix = paths.iter().position(|p| p.as_slice() == path)?;
    ix.checked_sub(1).map(|prev| paths[prev].clone())
}

fn apply_op_to(
    doc: &mut Document,
    selection: &mut Option<Selection>,
    op: Op,
) -> Result<Op, ApplyError> {
    let inverse = match op {
        Op::InsertText { path, offset, text } => {
            let leaf = node_text_mut(doc, &path)?;
            let offset = clamp_to_char_boundary(&leaf.text, offset);
            leaf.text.insert_str(offset, &text);
            let len = text.len();
            for_each_point(selection, |point| {
                if point.path == path && point.offset >= offset {
                    point.offset += len;
                }
            });
            Op::RemoveText {
                path,
                range: offset..offset + len,
            }
        }
        Op::RemoveText { path, range } => {
            let leaf = node_text_mut(doc, &path)?;
            let start = clamp_to_char_boundary(&leaf.text, range.start);
            let end = clamp_to_char_boundary(&leaf.text, range.end).max(start);
            let removed: String = leaf.text.drain(start..end).collect();
            for_each_point(selection, |point| {
                if point.path == path && point.offset > start {
                    point.offset = start + point.offset.saturating_sub(end);
                }
            });
            Op::InsertText {
                path,
                offset: start,
                text: removed,
            }
        }
        Op::InsertNode { path, node } => {
            insert_node(doc, &path, node)?;
            for_each_point(selection, |point| point_after_insert_node(point, &path));
            Op::RemoveNode { path }
        }
        Op::RemoveNode { path } => {
            let node = remove_node(doc, &path)?;
            for_each_point(selection, |point| point_after_remove_node(point, &path));
            Op::InsertNode { path, node }
        }
    };
    Ok(inverse)
}

fn clamp_to_char_boundary(s: &str, ix: usize) -> usize {
    let mut ix = ix.min(s.len());
    while !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn prev_char_boundary(s: &str, ix: usize) -> usize {
    s[..ix]
        .char_indices()
        .next_back()
        .map_or(0, |(start, _)| start)
}

fn for_each_point(selection: &mut Option<Selection>, mut f: impl FnMut(&mut Point)) {
    if let Some(selection) = selection {
        f(&mut selection.anchor);
        f(&mut selection.focus);
    }
}

/// The step of `point` that sits at the same depth as the last step of
/// `path`, if the point lies under the same parent.
fn index_at_depth<'p>(point: &'p mut Point, path: &[usize]) -> Option<&'p mut usize> {
    let (_, parent) = path.split_last()?;
    if point.path.starts_with(parent) {
        point.path.get_mut(parent.len())
    } else {
        None
    }
}

fn point_after_insert_node(point: &mut Point, path: &[usize]) {
    let Some(&index) = path.last() else {
        return;
    };
    if let Some(ix) = index_at_depth(point, path) {
        if *ix >= index {
            *ix += 1;
        }
    }
}

fn point_after_remove_node(point: &mut Point, path: &[usize]) {
    let Some(&index) = path.last() else {
        return;
    };
    let Some(ix) = index_at_depth(point, path) else {
        return;
    };
    if *ix > index {
        *ix -= 1;
    } else if *ix == index {
        // The point was inside the removed subtree: park it on the previous sibling.
        *ix = index.saturating_sub(1);
        point.path.truncate(path.len());
        point.offset = 0;
    }
}

fn node_mut<'a>(children: &'a mut [Node], path: &[usize]) -> Result<&'a mut Node, PathError> {
    let Some((&first, rest)) = path.split_first() else {
        return Err(PathError("Empty path".into()));
    };
    let len = children.len();
    let node = children
        .get_mut(first)
        .ok_or_else(|| PathError(format!("Path out of bounds: {first} >= {len}")))?;
    if rest.is_empty() {
        return Ok(node);
    }
    match node {
        Node::Element(el) => node_mut(&mut el.children, rest),
        Node::Void(_) | Node::Text(_) => Err(PathError(format!(
            "Non-container node on path {path:?}"
        ))),
    }
}

fn node_text_mut<'a>(doc: &'a mut Document, path: &[usize]) -> Result<&'a mut TextNode, PathError> {
    match node_mut(&mut doc.children, path)? {
        // Copy-on-write: an edited leaf gets a fresh identity whenever it is shared.
        Node::Text(t) => Ok(Arc::make_mut(t)),
        _ => Err(PathError("Expected Text node".into())),
    }
}

fn children_mut<'a>(doc: &'a mut Document, parent: &[usize]) -> Result<&'a mut Vec<Node>, PathError> {
    if parent.is_empty() {
        return Ok(&mut doc.children);
    }
    match node_mut(&mut doc.children, parent)? {
        Node::Element(el) => Ok(&mut el.children),
        Node::Void(_) | Node::Text(_) => Err(PathError("Parent is not a container".into())),
    }
}

fn insert_node(doc: &mut Document, path: &[usize], node: Node) -> Result<(), PathError> {
    let Some((&index, parent)) = path.split_last() else {
        return Err(PathError("Empty insert path".into()));
    };
    let children = children_mut(doc, parent)?;
    if index > children.len() {
        return Err(PathError(format!(
            "Insert index out of bounds: {index} > {}",
            children.len()
        )));
    }
    children.insert(index, node);
    Ok(())
}

fn remove_node(doc: &mut Document, path: &[usize]) -> Result<Node, PathError> {
    let Some((&index, parent)) = path.split_last() else {
        return Err(PathError("Empty remove path".into()));
    };
    let children = children_mut(doc, parent)?;
    if index >= children.len() {
        return Err(PathError(format!(
            "Remove index out of bounds: {index} >= {}",
            children.len()
        )));
    }
    Ok(children.remove(index))
}
