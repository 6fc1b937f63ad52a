use std::ops::Range;
use std::sync::Arc;

use markslate_doc::{Marks, TextNode};
use markslate_elements::ViewNode;

/// A highlighted byte range of one text leaf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoration {
    pub range: Range<usize>,
    pub class: String,
}

/// One uniformly decorated run of a text leaf.
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf {
    pub text: String,
    pub range: Range<usize>,
    pub marks: Marks,
    pub classes: Vec<String>,
}

pub struct RenderLeafProps<'a> {
    pub leaf: &'a Leaf,
    pub text: &'a TextNode,
    pub is_last: bool,
    pub children: ViewNode,
}

pub type LeafRenderer = Arc<dyn Fn(RenderLeafProps<'_>) -> ViewNode + Send + Sync>;

/// Splits `text` at every decoration boundary. An empty leaf still yields
/// one (empty) run so the caret has somewhere to go.
pub fn leaves(text: &TextNode, decorations: &[Decoration]) -> Vec<Leaf> {
    let len = text.text.len();
    let clamp = |mut ix: usize| {
        ix = ix.min(len);
        while !text.text.is_char_boundary(ix) {
            ix -= 1;
        }
        ix
    };

    let spans: Vec<(Range<usize>, &str)> = decorations
        .iter()
        .map(|d| (clamp(d.range.start)..clamp(d.range.end), d.class.as_str()))
        .filter(|(range, _)| range.start < range.end || len == 0)
        .collect();

    let mut bounds = vec![0, len];
    for (range, _) in &spans {
        bounds.push(range.start);
        bounds.push(range.end);
    }
    bounds.sort_unstable();
    bounds.dedup();

    let segment = |range: Range<usize>| Leaf {
        text: text.text[range.clone()].to_string(),
        classes: spans
            .iter()
            .filter(|(span, _)| span.start <= range.start && range.end <= span.end)
            .map(|(_, class)| class.to_string())
            .collect(),
        marks: text.marks.clone(),
        range,
    };

    if len == 0 {
        return vec![segment(0..0)];
    }
    bounds.windows(2).map(|w| segment(w[0]..w[1])).collect()
}

pub fn default_render_leaf(props: RenderLeafProps<'_>) -> ViewNode {
    let marks = &props.leaf.marks;
    let mut view = props.children;
    if marks.code {
        view = ViewNode::element("code", vec![view]);
    }
    if marks.strikethrough {
        view = ViewNode::element("s", vec![view]);
    }
    if marks.italic {
        view = ViewNode::element("em", vec![view]);
    }
    if marks.bold {
        view = ViewNode::element("strong", vec![view]);
    }
    if let Some(href) = &marks.link {
        view = ViewNode::element("a", vec![view]).with_attr("href", href.clone());
    }
    view
}
