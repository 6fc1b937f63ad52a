use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use markslate_doc::{Document, Node, Path, TextNode};
use markslate_elements::{ElementAttributes, PluginRegistry, RenderElementProps, ViewNode};

use crate::identity::{ElementHandle, IdentityCache, Key};
use crate::leaf::{Decoration, LeafRenderer};
use crate::text::{TextProps, layout_effect, render_text, text_props_unchanged};

/// The surface rendered elements live on.
pub trait ElementHost {
    fn create_element(&mut self, key: Key) -> ElementHandle;
    fn release_element(&mut self, element: ElementHandle);
}

pub type Decorate = Arc<dyn Fn(&[usize], &TextNode) -> Vec<Decoration> + Send + Sync>;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub rendered: usize,
    pub reused: usize,
}

struct Memo {
    props: TextProps,
    view: ViewNode,
}

/// Renders a document and keeps text-leaf identities in step with what is
/// on screen. `render` builds the view; `commit` mounts and unmounts leaves
/// once the host has applied it.
#[derive(Default)]
pub struct Editable {
    cache: IdentityCache,
    render_leaf: Option<LeafRenderer>,
    decorate: Option<Decorate>,
    memo: HashMap<Key, Memo>,
    mounted: HashMap<Key, Arc<TextNode>>,
    rendered: Vec<(Key, Arc<TextNode>)>,
}

impl Editable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn render_leaf(mut self, render_leaf: LeafRenderer) -> Self {
        self.render_leaf = Some(render_leaf);
        self
    }

    pub fn decorate(mut self, decorate: Decorate) -> Self {
        self.decorate = Some(decorate);
        self
    }

    pub fn cache(&self) -> &IdentityCache {
        &self.cache
    }

    pub fn render(&mut self, doc: &Document, registry: &PluginRegistry) -> (ViewNode, RenderStats) {
        // Leaves from the previous pass that never got committed.
        for (key, text) in std::mem::take(&mut self.rendered) {
            if !self.mounted.contains_key(&key) {
                self.cache.release(&text);
                self.memo.remove(&key);
            }
        }

        let mut pass = RenderPass {
            editable: &mut *self,
            registry,
            stats: RenderStats::default(),
            rendered: Vec::new(),
        };
        let mut path = Vec::new();
        let children = pass.render_children(&doc.children, &mut path);
        let RenderPass {
            stats, rendered, ..
        } = pass;

        let live: HashSet<Key> = rendered.iter().map(|(key, _)| *key).collect();
        self.memo.retain(|key, _| live.contains(key));
        self.rendered = rendered;

        tracing::debug!(
            rendered = stats.rendered,
            reused = stats.reused,
            "rendered document"
        );
        let view = ViewNode::element("div", children).with_attr("data-slate-editor", "true");
        (view, stats)
    }

    /// Mounts every leaf of the last render that has no element yet and
    /// unmounts every mounted leaf that is gone from it.
    pub fn commit(&mut self, host: &mut dyn ElementHost) {
        let live: HashSet<Key> = self.rendered.iter().map(|(key, _)| *key).collect();
        let gone: Vec<Key> = self
            .mounted
            .keys()
            .filter(|key| !live.contains(key))
            .copied()
            .collect();
        for key in gone {
            if let Some(text) = self.mounted.remove(&key) {
                if let Some(element) = layout_effect(&mut self.cache, &text, None) {
                    host.release_element(element);
                }
            }
        }

        for (key, text) in &self.rendered {
            if self.mounted.contains_key(key) {
                continue;
            }
            let element = host.create_element(*key);
            if let Some(retired) = layout_effect(&mut self.cache, text, Some(element)) {
                host.release_element(retired);
            }
            self.mounted.insert(*key, text.clone());
        }
    }

    pub fn unmount_all(&mut self, host: &mut dyn ElementHost) {
        for (_, text) in self.mounted.drain() {
            if let Some(element) = layout_effect(&mut self.cache, &text, None) {
                host.release_element(element);
            }
        }
        for (_, text) in self.rendered.drain(..) {
            self.cache.release(&text);
        }
        self.memo.clear();
    }
}

struct RenderPass<'e, 'r> {
    editable: &'e mut Editable,
    registry: &'r PluginRegistry,
    stats: RenderStats,
    rendered: Vec<(Key, Arc<TextNode>)>,
}

impl RenderPass<'_, '_> {
    fn render_children(&mut self, children: &[Node], path: &mut Path) -> Vec<ViewNode> {
        let mut out = Vec::with_capacity(children.len());
        for (ix, child) in children.iter().enumerate() {
            path.push(ix);
            let is_last = ix + 1 == children.len();
            if let Some(view) = self.render_node(child, path, is_last) {
                out.push(view);
            }
            path.pop();
        }
        out
    }

    fn render_node(&mut self, node: &Node, path: &mut Path, is_last: bool) -> Option<ViewNode> {
        match node {
            Node::Element(el) => {
                let children = self.render_children(&el.children, path);
                let render = self.registry.renderer(&el.kind);
                Some(render(RenderElementProps {
                    node,
                    attributes: ElementAttributes::element(false),
                    children,
                }))
            }
            Node::Void(void) => {
                let render = self.registry.renderer(&void.kind);
                Some(render(RenderElementProps {
                    node,
                    attributes: ElementAttributes::element(true),
                    children: Vec::new(),
                }))
            }
            Node::Text(text) => {
                let Some((_, parent)) = path.split_last() else {
                    tracing::warn!("skipping text leaf at the document root");
                    return None;
                };
                Some(self.render_leaf(text, parent.to_vec(), path, is_last))
            }
        }
    }

    fn render_leaf(
        &mut self,
        text: &Arc<TextNode>,
        parent: Path,
        path: &[usize],
        is_last: bool,
    ) -> ViewNode {
        let editable = &mut *self.editable;
        let key = editable.cache.find_key(text);
        let decorations = match &editable.decorate {
            Some(decorate) => decorate(path, text.as_ref()),
            None => Vec::new(),
        };
        let props = TextProps {
            decorations,
            is_last,
            parent,
            render_leaf: editable.render_leaf.clone(),
            text: text.clone(),
        };
        self.rendered.push((key, text.clone()));

        if let Some(memo) = editable.memo.get(&key) {
            if text_props_unchanged(&memo.props, &props) {
                self.stats.reused += 1;
                return memo.view.clone();
            }
        }

        let view = render_text(&props, key, self.registry);
        editable.memo.insert(
            key,
            Memo {
                props,
                view: view.clone(),
            },
        );
        self.stats.rendered += 1;
        view
    }
}
