use markslate_doc::Node;

/// Output of an element or leaf renderer: a small virtual element tree.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewNode {
    Element(ViewElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ViewElement {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<ViewNode>,
}

const VOID_TAGS: &[&str] = &["br", "hr", "img"];

impl ViewNode {
    pub fn element(tag: impl Into<String>, children: Vec<ViewNode>) -> Self {
        ViewNode::Element(ViewElement {
            tag: tag.into(),
            attrs: Vec::new(),
            children,
        })
    }

    pub fn text(text: impl Into<String>) -> Self {
        ViewNode::Text(text.into())
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        if let ViewNode::Element(el) = &mut self {
            let name = name.into();
            let value = value.into();
            match el.attrs.iter_mut().find(|(k, _)| *k == name) {
                Some(slot) => slot.1 = value,
                None => el.attrs.push((name, value)),
            }
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            ViewNode::Element(el) => Some(&el.tag),
            ViewNode::Text(_) => None,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            ViewNode::Element(el) => el
                .attrs
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            ViewNode::Text(_) => None,
        }
    }

    pub fn children(&self) -> &[ViewNode] {
        match self {
            ViewNode::Element(el) => &el.children,
            ViewNode::Text(_) => &[],
        }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            ViewNode::Text(text) => out.push_str(&escape_html(text)),
            ViewNode::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_html(value));
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(&el.tag.as_str()) {
                    return;
                }
                for child in &el.children {
                    child.write_html(out);
                }
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Attributes the editing surface requires on every rendered node.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ElementAttributes {
    pub slate_node: &'static str,
    pub key: Option<String>,
    pub is_void: bool,
}

impl ElementAttributes {
    pub fn element(is_void: bool) -> Self {
        Self {
            slate_node: "element",
            key: None,
            is_void,
        }
    }

    pub fn text(key: impl Into<String>) -> Self {
        Self {
            slate_node: "text",
            key: Some(key.into()),
            is_void: false,
        }
    }

    pub fn apply(&self, view: ViewNode) -> ViewNode {
        let mut view = view.with_attr("data-slate-node", self.slate_node);
        if let Some(key) = &self.key {
            view = view.with_attr("data-key", key.clone());
        }
        if self.is_void {
            view = view.with_attr("data-slate-void", "true");
        }
        view
    }
}

pub struct RenderElementProps<'a> {
    pub node: &'a Node,
    pub attributes: ElementAttributes,
    pub children: Vec<ViewNode>,
}
