//! Node-type keyboard behavior.

use crate::editor::Editor;
use crate::EditorError;
use vellum_dom::NodeSpec;

/// Enter inside a figcaption never inserts a newline in the caption:
/// it creates a fresh paragraph after the enclosing figure and moves the
/// caret into it. Returns `false` when the caret is elsewhere, so the
/// host applies its default Enter handling.
pub fn handle_enter(editor: &mut Editor) -> Result<bool, EditorError> {
    let after_figure = {
        let resolved = editor.doc().resolve(editor.selection().head);
        if resolved.depth() >= 2 && resolved.parent().type_name == "figcaption" {
            Some(resolved.after(resolved.depth() - 1))
        } else {
            None
        }
    };

    let Some(pos) = after_figure else {
        return Ok(false);
    };

    editor
        .chain()
        .focus()
        .insert_content_at(pos, NodeSpec::node("paragraph"))
        .set_text_selection(pos + 1)
        .run()?;
    Ok(true)
}
