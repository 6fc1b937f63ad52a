use markslate_doc::{Document, Marks, Node};
use markslate_elements::{
    MarkdownOptions, PluginRegistry, document_to_markdown, markdown_to_document,
};
use pretty_assertions::assert_eq;
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn parse(markdown: &str) -> Document {
    markdown_to_document(markdown, &PluginRegistry::builtin(), &MarkdownOptions::default())
}

fn serialize(doc: &Document) -> String {
    document_to_markdown(doc, &PluginRegistry::builtin(), &MarkdownOptions::default())
}

/// Serializing a parsed document gives back the input, and parsing that
/// again gives back the same tree.
fn assert_round_trip(markdown: &str) -> anyhow::Result<()> {
    init_tracing();
    let doc = parse(markdown);
    let out = serialize(&doc);
    assert_eq!(out, markdown);
    assert_eq!(parse(&out), doc);
    Ok(())
}

#[test]
fn paragraphs_and_tight_and_loose_lists() -> anyhow::Result<()> {
    assert_round_trip("para one\n\n- a\n- b\n\npara two\n\n1. x\n\n2. y\n")
}

#[test]
fn list_tightness_is_recorded_on_the_list() {
    let doc = parse("- a\n- b\n\n1. x\n\n2. y\n");

    let tight = doc.children[0].attr("tight").and_then(|v| v.as_bool());
    assert_eq!(tight, Some(true));
    assert_eq!(doc.children[1].kind(), "ordered_list");
    let tight = doc.children[1].attr("tight").and_then(|v| v.as_bool());
    assert_eq!(tight, Some(false));

    // Tight items still hold a paragraph.
    let item = &doc.children[0].children()[0];
    assert_eq!(item.kind(), "list_item");
    assert_eq!(item.children()[0], Node::paragraph("a"));
}

#[test]
fn ordered_list_keeps_its_start() -> anyhow::Result<()> {
    let doc = parse("3. c\n4. d\n");
    assert_eq!(
        doc.children[0].attr("start").and_then(|v| v.as_u64()),
        Some(3)
    );
    assert_round_trip("3. c\n4. d\n")
}

#[test]
fn nested_tight_list() -> anyhow::Result<()> {
    assert_round_trip("- a\n  - b\n- c\n")
}

#[test]
fn headings_rule_and_quote() -> anyhow::Result<()> {
    assert_round_trip("# Title\n\n## Sub\n\n---\n\n> quoted\n>\n> two\n")
}

#[test]
fn inline_marks() -> anyhow::Result<()> {
    let markdown = "Some **bold** and *it* and ~~gone~~ and `code` and [link](https://x.io).\n";
    let doc = parse(markdown);
    let paragraph = doc.children[0].children();
    assert_eq!(
        paragraph[1],
        Node::marked_text(
            "bold",
            Marks {
                bold: true,
                ..Marks::default()
            }
        )
    );
    assert_eq!(
        paragraph[9],
        Node::marked_text(
            "link",
            Marks {
                link: Some("https://x.io".to_string()),
                ..Marks::default()
            }
        )
    );
    assert_round_trip(markdown)
}

#[test]
fn soft_break_stays_inside_the_paragraph() -> anyhow::Result<()> {
    let doc = parse("one\ntwo\n");
    assert_eq!(doc.children, vec![Node::paragraph("one\ntwo")]);
    assert_round_trip("one\ntwo\n")
}

#[test]
fn escaped_text_survives() -> anyhow::Result<()> {
    let doc = parse("\\# not a heading \\*x\\*\n");
    assert_eq!(doc.children, vec![Node::paragraph("# not a heading *x*")]);
    assert_round_trip("\\# not a heading \\*x\\*\n")
}

#[test]
fn code_blocks() -> anyhow::Result<()> {
    assert_round_trip("```rust\nfn main() {}\n```\n\n    indented\n")
}

#[test]
fn images() -> anyhow::Result<()> {
    let markdown = "![alt text](img.png \"Title\")\n";
    let doc = parse(markdown);
    let image = &doc.children[0].children()[0];
    assert_eq!(image.kind(), "image");
    assert_eq!(image.attr("src").and_then(|v| v.as_str()), Some("img.png"));
    assert_eq!(image.attr("alt").and_then(|v| v.as_str()), Some("alt text"));
    assert_round_trip(markdown)
}

#[test]
fn unknown_blocks_fall_back_to_generic() -> anyhow::Result<()> {
    let markdown = "<div>hi</div>\n\npara with <b>html</b> inside\n";
    let doc = parse(markdown);
    assert_eq!(doc.children[0].kind(), "generic");
    assert_eq!(
        doc.children[0].attr("token").and_then(|v| v.as_str()),
        Some("html_block")
    );
    assert_round_trip(markdown)
}

#[test]
fn empty_input_is_an_empty_document() {
    assert_eq!(parse(""), Document::new(Vec::new()));
    assert_eq!(serialize(&Document::new(Vec::new())), "");
}

#[test]
fn serializer_options_change_markers() {
    let options = MarkdownOptions {
        bullet: '*',
        emphasis: '_',
        ..MarkdownOptions::default()
    };
    let registry = PluginRegistry::builtin();
    let doc = markdown_to_document("- **a**\n- b\n", &registry, &options);
    assert_eq!(
        document_to_markdown(&doc, &registry, &options),
        "* __a__\n* b\n"
    );
}

#[test]
fn hard_breaks() -> anyhow::Result<()> {
    let doc = parse("a\\\nb\n");
    let paragraph = doc.children[0].children();
    assert_eq!(paragraph.len(), 3);
    assert_eq!(paragraph[1].kind(), "hardbreak");
    assert_round_trip("a\\\nb\n")
}

#[test]
fn text_after_a_hard_break_keeps_block_markers_escaped() -> anyhow::Result<()> {
    for markdown in ["a\\\n\\# b\n", "a\\\n\\- b\n", "a\\\n\\> b\n", "a\\\n1\\. b\n"] {
        let doc = parse(markdown);
        assert_eq!(doc.children.len(), 1, "{markdown:?}");
        assert_eq!(doc.children[0].kind(), "paragraph");
        assert_round_trip(markdown)?;
    }
    Ok(())
}

#[test]
fn heading_with_trailing_hashes() -> anyhow::Result<()> {
    let doc = parse("# a \\#\n");
    assert_eq!(doc.children[0].children(), &[Node::text("a #")]);
    assert_round_trip("# a \\#\n")?;
    assert_round_trip("## C#\n")?;
    assert_round_trip("# \\#\n")
}
