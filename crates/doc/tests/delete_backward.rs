use std::sync::Arc;

use markslate_doc::{
    ApplyError, Attrs, Document, Editor, HostEditor, Marks, Node, Op, Point, Selection,
    Transaction,
};
use pretty_assertions::assert_eq;

fn caret(path: Vec<usize>, offset: usize) -> Option<Selection> {
    Some(Selection::collapsed(Point::new(path, offset)))
}

fn leaf(doc: &Document, path: &[usize]) -> Arc<markslate_doc::TextNode> {
    let Some(Node::Text(text)) = doc.node(path) else {
        panic!("expected text at {path:?}");
    };
    text.clone()
}

#[test]
fn removes_previous_character() {
    let doc = Document::new(vec![Node::paragraph("héllo")]);
    let mut editor = Editor::new(doc, caret(vec![0, 0], 3));

    editor.delete_backward().unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("hllo")]);
    assert_eq!(editor.selection(), caret(vec![0, 0], 1).as_ref());
}

#[test]
fn merges_block_into_previous_text_block() {
    let doc = Document::new(vec![Node::paragraph("ab"), Node::paragraph("cd")]);
    let mut editor = Editor::new(doc, caret(vec![1, 0], 0));

    editor.delete_backward().unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("abcd")]);
    assert_eq!(editor.selection(), caret(vec![0, 0], 2).as_ref());
}

#[test]
fn merge_lifts_out_of_emptied_containers() {
    let doc = Document::new(vec![
        Node::paragraph(""),
        Node::element(
            "bullet_list",
            vec![Node::element("list_item", vec![Node::paragraph("a")])],
        ),
    ]);
    let mut editor = Editor::new(doc, caret(vec![1, 0, 0, 0], 0));

    editor.delete_backward().unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("a")]);
    assert_eq!(editor.selection(), caret(vec![0, 0], 0).as_ref());
}

#[test]
fn removes_preceding_void_block() {
    let doc = Document::new(vec![
        Node::paragraph("a"),
        Node::void("hr", Attrs::default()),
        Node::paragraph("b"),
    ]);
    let mut editor = Editor::new(doc, caret(vec![2, 0], 0));

    editor.delete_backward().unwrap();

    assert_eq!(
        editor.doc().children,
        vec![Node::paragraph("a"), Node::paragraph("b")]
    );
    assert_eq!(editor.selection(), caret(vec![1, 0], 0).as_ref());
}

#[test]
fn steps_into_previous_leaf_of_the_same_block() {
    let bold = Marks {
        bold: true,
        ..Marks::default()
    };
    let doc = Document::new(vec![Node::element(
        "paragraph",
        vec![Node::text("ab"), Node::marked_text("c", bold.clone())],
    )]);
    let mut editor = Editor::new(doc, caret(vec![0, 1], 0));

    editor.delete_backward().unwrap();

    assert_eq!(
        editor.doc().children,
        vec![Node::element(
            "paragraph",
            vec![Node::text("a"), Node::marked_text("c", bold)],
        )]
    );
    assert_eq!(editor.selection(), caret(vec![0, 0], 1).as_ref());
}

#[test]
fn removes_inline_void_before_the_caret() {
    let doc = Document::new(vec![Node::element(
        "paragraph",
        vec![
            Node::text("a"),
            Node::void("hardbreak", Attrs::default()),
            Node::text("b"),
        ],
    )]);
    let mut editor = Editor::new(doc, caret(vec![0, 2], 0));

    editor.delete_backward().unwrap();

    assert_eq!(
        editor.doc().children[0].children(),
        &[Node::text("a"), Node::text("b")]
    );
    assert_eq!(editor.selection(), caret(vec![0, 1], 0).as_ref());
}

#[test]
fn document_start_is_a_no_op() {
    let doc = Document::new(vec![Node::paragraph("a")]);
    let mut editor = Editor::new(doc.clone(), caret(vec![0, 0], 0));

    editor.delete_backward().unwrap();

    assert_eq!(editor.doc(), &doc);
}

#[test]
fn expanded_or_missing_selection_is_ignored() {
    let doc = Document::new(vec![Node::paragraph("abc")]);
    let expanded = Selection {
        anchor: Point::new(vec![0, 0], 0),
        focus: Point::new(vec![0, 0], 2),
    };
    let mut editor = Editor::new(doc.clone(), Some(expanded));
    editor.delete_backward().unwrap();
    assert_eq!(editor.doc(), &doc);

    let mut editor = Editor::new(doc.clone(), None);
    editor.delete_backward().unwrap();
    assert_eq!(editor.doc(), &doc);
}

#[test]
fn caret_outside_a_text_leaf_is_an_error() {
    let doc = Document::new(vec![Node::paragraph("a")]);
    let mut editor = Editor::new(doc, caret(vec![0], 0));

    assert!(matches!(
        editor.delete_backward(),
        Err(ApplyError::InvalidPath(_))
    ));
}

#[test]
fn edited_leaf_gets_a_new_identity() {
    let doc = Document::new(vec![Node::paragraph("one"), Node::paragraph("two")]);
    let untouched = leaf(&doc, &[0, 0]);
    let edited = leaf(&doc, &[1, 0]);
    let mut editor = Editor::new(doc, caret(vec![1, 0], 3));

    editor.delete_backward().unwrap();

    assert!(Arc::ptr_eq(&untouched, &leaf(editor.doc(), &[0, 0])));
    assert!(!Arc::ptr_eq(&edited, &leaf(editor.doc(), &[1, 0])));
    assert_eq!(edited.text, "two");
    assert_eq!(leaf(editor.doc(), &[1, 0]).text, "tw");
}

#[test]
fn host_insert_node_shifts_the_caret() {
    let doc = Document::new(vec![Node::paragraph("a")]);
    let mut editor = Editor::new(doc, caret(vec![0, 0], 1));
    let host: &mut dyn HostEditor = &mut editor;

    host.insert_node(vec![0], Node::paragraph("")).unwrap();

    assert_eq!(host.selection(), caret(vec![1, 0], 1).as_ref());
    assert_eq!(editor.doc().children.len(), 2);
}

#[test]
fn applied_op_returns_its_inverse() {
    let doc = Document::new(vec![Node::paragraph("ac")]);
    let mut editor = Editor::new(doc.clone(), None);

    let inverse = editor
        .apply_op(Op::InsertText {
            path: vec![0, 0],
            offset: 1,
            text: "b".to_string(),
        })
        .unwrap();
    assert_eq!(editor.doc().children, vec![Node::paragraph("abc")]);

    let tx = Transaction::new(vec![inverse]).selection_after(Selection::collapsed(Point::new(
        vec![0, 0],
        1,
    )));
    editor.apply(tx).unwrap();
    assert_eq!(editor.doc(), &doc);
    assert_eq!(editor.selection(), caret(vec![0, 0], 1).as_ref());
}

#[test]
fn removing_text_pulls_points_inside_the_range_to_its_start() {
    let doc = Document::new(vec![Node::paragraph("abcdef")]);
    let selection = Selection {
        anchor: Point::new(vec![0, 0], 2),
        focus: Point::new(vec![0, 0], 5),
    };
    let mut editor = Editor::new(doc, Some(selection));

    let inverse = editor
        .apply_op(Op::RemoveText {
            path: vec![0, 0],
            range: 1..4,
        })
        .unwrap();

    assert_eq!(editor.doc().children, vec![Node::paragraph("aef")]);
    assert_eq!(
        editor.selection(),
        Some(&Selection {
            anchor: Point::new(vec![0, 0], 1),
            focus: Point::new(vec![0, 0], 2),
        })
    );
    assert_eq!(
        inverse,
        Op::InsertText {
            path: vec![0, 0],
            offset: 1,
            text: "bcd".to_string(),
        }
    );
}
