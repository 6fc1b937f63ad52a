use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use markslate_doc::TextNode;

/// Stable handle for one text-leaf instance while it is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(u64);

impl Key {
    pub fn id(self) -> u64 {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A rendered element owned by the host surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementHandle(pub u64);

/// A text leaf compared and hashed by pointer, never by content.
#[derive(Clone)]
struct NodeRef(Arc<TextNode>);

impl PartialEq for NodeRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for NodeRef {}

impl Hash for NodeRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        Arc::as_ptr(&self.0).hash(state);
    }
}

fn node_ref(text: &Arc<TextNode>) -> NodeRef {
    NodeRef(text.clone())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableSizes {
    pub node_to_key: usize,
    pub key_to_element: usize,
    pub node_to_element: usize,
    pub element_to_node: usize,
}

impl TableSizes {
    pub fn is_empty(&self) -> bool {
        *self == TableSizes::default()
    }
}

/// Bindings between text leaves, their keys and the elements they are
/// mounted on. A mounted leaf has exactly one entry in every table; an
/// unmounted one has none.
#[derive(Default)]
pub struct IdentityCache {
    next_key: u64,
    node_to_key: HashMap<NodeRef, Key>,
    key_to_element: HashMap<Key, ElementHandle>,
    node_to_element: HashMap<NodeRef, ElementHandle>,
    element_to_node: HashMap<ElementHandle, Arc<TextNode>>,
}

impl IdentityCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn find_key(&mut self, text: &Arc<TextNode>) -> Key {
        if let Some(key) = self.node_to_key.get(&node_ref(text)) {
            return *key;
        }
        let key = Key(self.next_key);
        self.next_key += 1;
        self.node_to_key.insert(node_ref(text), key);
        key
    }

    pub fn key(&self, text: &Arc<TextNode>) -> Option<Key> {
        self.node_to_key.get(&node_ref(text)).copied()
    }

    /// Binds `text` to `element`. Returns the element the leaf was bound to
    /// before, which no longer maps back to it.
    pub fn mount(&mut self, text: &Arc<TextNode>, element: ElementHandle) -> Option<ElementHandle> {
        let key = self.find_key(text);
        let previous = self.node_to_element.insert(node_ref(text), element);
        if let Some(old) = previous.filter(|old| *old != element) {
            self.element_to_node.remove(&old);
        }

        // The element may have been showing another leaf.
        if let Some(other) = self.element_to_node.insert(element, text.clone()) {
            if !Arc::ptr_eq(&other, text) {
                self.node_to_element.remove(&node_ref(&other));
                if let Some(other_key) = self.key(&other) {
                    self.key_to_element.remove(&other_key);
                }
            }
        }
        self.key_to_element.insert(key, element);
        tracing::trace!(key = key.id(), element = element.0, "mounted text leaf");
        previous.filter(|old| *old != element)
    }

    /// Drops every binding of `text`, handing back the element it was
    /// mounted on.
    pub fn unmount(&mut self, text: &Arc<TextNode>) -> Option<ElementHandle> {
        let node = node_ref(text);
        let element = self.node_to_element.remove(&node);
        if let Some(element) = element {
            self.element_to_node.remove(&element);
        }
        if let Some(key) = self.node_to_key.remove(&node) {
            self.key_to_element.remove(&key);
            tracing::trace!(key = key.id(), "unmounted text leaf");
        }
        element
    }

    /// Forgets the key of a leaf that was rendered but never mounted.
    /// Mounted leaves are left alone.
    pub fn release(&mut self, text: &Arc<TextNode>) -> bool {
        let node = node_ref(text);
        if self.node_to_element.contains_key(&node) {
            return false;
        }
        self.node_to_key.remove(&node).is_some()
    }

    pub fn element_for_key(&self, key: Key) -> Option<ElementHandle> {
        self.key_to_element.get(&key).copied()
    }

    pub fn element_for_node(&self, text: &Arc<TextNode>) -> Option<ElementHandle> {
        self.node_to_element.get(&node_ref(text)).copied()
    }

    pub fn node_for_element(&self, element: ElementHandle) -> Option<&Arc<TextNode>> {
        self.element_to_node.get(&element)
    }

    pub fn table_sizes(&self) -> TableSizes {
        TableSizes {
            node_to_key: self.node_to_key.len(),
            key_to_element: self.key_to_element.len(),
            node_to_element: self.node_to_element.len(),
            element_to_node: self.element_to_node.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.table_sizes().is_empty()
    }
}
