use markslate_doc::{HostEditor, Node, Point, is_all_zero};

/// Backspace and Delete. Deleting at the very start of the document does not
/// unwrap a leading block on its own, so an empty paragraph is put in front
/// and deleted first. Falls back to the host's default handling for
/// expanded or missing selections.
pub fn backspace_key(editor: &mut dyn HostEditor) -> bool {
    let at_start = match editor.selection() {
        Some(selection) if selection.is_collapsed() => is_at_start(&selection.focus),
        _ => return false,
    };

    if at_start {
        let result = editor
            .insert_node(vec![0], Node::paragraph(""))
            .and_then(|()| editor.delete_backward());
        if let Err(err) = result {
            tracing::warn!(%err, "backspace at document start failed");
        }
    }

    if let Err(err) = editor.delete_backward() {
        tracing::warn!(%err, "backspace failed");
    }
    true
}

fn is_at_start(point: &Point) -> bool {
    is_all_zero(&point.path) && point.offset == 0
}
