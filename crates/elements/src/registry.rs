use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock};

use markslate_doc::Node;

use crate::parse::ParserState;
use crate::render::{RenderElementProps, ViewNode};
use crate::serialize::{ChildInfo, FormatInfo};
use crate::token::Token;

pub const GENERIC: &str = "generic";

pub struct ToTreeArgs<'a> {
    /// Base token type the handler was looked up by (`strong` for `strong_open`).
    pub kind: &'a str,
    pub token: &'a Token,
    pub state: &'a mut ParserState,
    pub children: Vec<Node>,
    pub is_empty: bool,
}

pub struct FromTreeArgs<'a> {
    pub node: &'a Node,
    pub children: &'a str,
    pub info: &'a FormatInfo<'a>,
    pub child_info: &'a ChildInfo,
}

pub type ToTreeFn = Arc<dyn Fn(ToTreeArgs<'_>) -> Option<Node> + Send + Sync>;
pub type FromTreeFn = Arc<dyn Fn(FromTreeArgs<'_>) -> String + Send + Sync>;
pub type RenderFn = Arc<dyn Fn(RenderElementProps<'_>) -> ViewNode + Send + Sync>;

/// Runs before a node's children are serialized. The parent writes into
/// `ChildInfo` what its children cannot work out, since a child has no way
/// to reach its parent.
pub type ChildInfoHookFn = Arc<dyn Fn(&Node, &mut ChildInfo) + Send + Sync>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistryError {
    #[error("node type '{0}' already registered")]
    DuplicateNodeType(String),
    #[error("markdown type '{0}' already registered")]
    DuplicateMarkdownType(String),
    #[error("generic {0} handler is not registered")]
    MissingGeneric(&'static str),
}

/// One element plugin: how a node type renders, parses and serializes.
#[derive(Clone)]
pub struct ElementHandler {
    pub node_types: Vec<String>,
    /// Token types handled by `to_tree`; defaults to `node_types`.
    pub markdown_types: Option<Vec<String>>,
    pub to_tree: ToTreeFn,
    pub render: RenderFn,
    pub child_info_hook: Option<ChildInfoHookFn>,
    pub from_tree: FromTreeFn,
}

impl ElementHandler {
    pub fn new<I, S>(
        node_types: I,
        to_tree: impl Fn(ToTreeArgs<'_>) -> Option<Node> + Send + Sync + 'static,
        render: impl Fn(RenderElementProps<'_>) -> ViewNode + Send + Sync + 'static,
        from_tree: impl Fn(FromTreeArgs<'_>) -> String + Send + Sync + 'static,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            node_types: node_types.into_iter().map(Into::into).collect(),
            markdown_types: None,
            to_tree: Arc::new(to_tree),
            render: Arc::new(render),
            child_info_hook: None,
            from_tree: Arc::new(from_tree),
        }
    }

    pub fn markdown_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.markdown_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    pub fn child_info_hook(
        mut self,
        hook: impl Fn(&Node, &mut ChildInfo) + Send + Sync + 'static,
    ) -> Self {
        self.child_info_hook = Some(Arc::new(hook));
        self
    }

    fn token_types(&self) -> Vec<String> {
        self.markdown_types
            .clone()
            .unwrap_or_else(|| self.node_types.clone())
    }
}

#[derive(Default)]
struct Tables {
    renderers: HashMap<String, RenderFn>,
    to_tree: HashMap<String, ToTreeFn>,
    from_tree: HashMap<String, FromTreeFn>,
    child_info_hooks: HashMap<String, ChildInfoHookFn>,
}

impl Tables {
    fn register(&mut self, handler: ElementHandler) -> Result<(), RegistryError> {
        let token_types = handler.token_types();

        // Validate everything first so a rejected handler leaves no partial entries.
        let mut seen: HashSet<&str> = HashSet::new();
        for node_type in &handler.node_types {
            if self.renderers.contains_key(node_type)
                || self.from_tree.contains_key(node_type)
                || !seen.insert(node_type)
            {
                return Err(RegistryError::DuplicateNodeType(node_type.clone()));
            }
        }
        let mut seen: HashSet<&str> = HashSet::new();
        for token_type in &token_types {
            if self.to_tree.contains_key(token_type) || !seen.insert(token_type) {
                return Err(RegistryError::DuplicateMarkdownType(token_type.clone()));
            }
        }

        for node_type in &handler.node_types {
            self.renderers
                .insert(node_type.clone(), handler.render.clone());
            self.from_tree
                .insert(node_type.clone(), handler.from_tree.clone());
            if let Some(hook) = &handler.child_info_hook {
                self.child_info_hooks.insert(node_type.clone(), hook.clone());
            }
        }
        for token_type in token_types {
            self.to_tree.insert(token_type, handler.to_tree.clone());
        }
        Ok(())
    }
}

struct Generic {
    render: RenderFn,
    to_tree: ToTreeFn,
    from_tree: FromTreeFn,
}

/// Dispatch tables from node/token type tags to element handlers.
///
/// Built once at startup and read-only afterwards; the `generic` handlers
/// are guaranteed to exist, so lookups never fail.
pub struct PluginRegistry {
    tables: Tables,
    generic: Generic,
}

impl PluginRegistry {
    pub fn new(handlers: impl IntoIterator<Item = ElementHandler>) -> Result<Self, RegistryError> {
        let mut tables = Tables::default();
        for handler in handlers {
            tables.register(handler)?;
        }

        let generic = Generic {
            render: tables
                .renderers
                .get(GENERIC)
                .cloned()
                .ok_or(RegistryError::MissingGeneric("renderer"))?,
            to_tree: tables
                .to_tree
                .get(GENERIC)
                .cloned()
                .ok_or(RegistryError::MissingGeneric("to_tree"))?,
            from_tree: tables
                .from_tree
                .get(GENERIC)
                .cloned()
                .ok_or(RegistryError::MissingGeneric("from_tree"))?,
        };

        Ok(Self { tables, generic })
    }

    pub fn builtin() -> Self {
        Self::new(crate::elements::builtin_handlers()).expect("builtin registry must be valid")
    }

    /// Adds a handler during startup. Duplicate node or markdown types are
    /// rejected and leave the registry untouched.
    pub fn register(&mut self, handler: ElementHandler) -> Result<(), RegistryError> {
        self.tables.register(handler)
    }

    pub fn renderer(&self, node_type: &str) -> &RenderFn {
        match self.tables.renderers.get(node_type) {
            Some(render) => render,
            None => {
                tracing::warn!(node_type, "renderer: using generic plugin");
                &self.generic.render
            }
        }
    }

    pub fn to_tree(&self, token_type: &str) -> &ToTreeFn {
        match self.tables.to_tree.get(token_type) {
            Some(to_tree) => to_tree,
            None => {
                tracing::warn!(token_type, "to_tree: using generic plugin");
                &self.generic.to_tree
            }
        }
    }

    pub fn from_tree(&self, node_type: &str) -> &FromTreeFn {
        match self.tables.from_tree.get(node_type) {
            Some(from_tree) => from_tree,
            None => {
                tracing::warn!(node_type, "from_tree: using generic plugin");
                &self.generic.from_tree
            }
        }
    }

    pub fn child_info_hook(&self, node_type: &str) -> Option<&ChildInfoHookFn> {
        self.tables.child_info_hooks.get(node_type)
    }

    pub fn is_registered(&self, node_type: &str) -> bool {
        self.tables.renderers.contains_key(node_type)
    }

    pub fn handles_token(&self, token_type: &str) -> bool {
        self.tables.to_tree.contains_key(token_type)
    }
}

static REGISTRY: OnceLock<PluginRegistry> = OnceLock::new();

/// The process-wide registry. Initialized with the builtin plugins unless
/// [`install`] ran first.
pub fn registry() -> &'static PluginRegistry {
    REGISTRY.get_or_init(PluginRegistry::builtin)
}

/// Installs the process-wide registry. Fails, handing the registry back, if
/// one is already in place.
pub fn install(registry: PluginRegistry) -> Result<(), PluginRegistry> {
    REGISTRY.set(registry)
}
