//! # Block Manipulation
//!
//! Block-level operations shared by the slash palette and the block
//! handle menu: turn-into, wrap, delete, duplicate, and the structured
//! inserts (divider, table). Everything goes through the chain — these
//! functions never touch the tree directly.

use crate::editor::Editor;
use crate::slash::CommandAction;
use crate::EditorError;
use serde_json::Value;
use vellum_dom::{AttrMap, Node, NodeSpec};

/// The top-level block containing the caret.
struct TopBlock {
    from: usize,
    to: usize,
    is_empty_paragraph: bool,
}

fn top_block(editor: &Editor) -> Option<TopBlock> {
    let doc = editor.doc();
    let resolved = doc.resolve(editor.selection().head);

    if resolved.depth() == 0 {
        // Caret at a top-level boundary: use the block after it
        let index = resolved.index(0);
        let node = doc.child(index)?;
        let from = doc.child_start(index, 0);
        return Some(TopBlock {
            from,
            to: from + node.node_size(),
            is_empty_paragraph: node.type_name == "paragraph" && node.content.is_empty(),
        });
    }

    let node = resolved.node(1);
    Some(TopBlock {
        from: resolved.before(1),
        to: resolved.after(1),
        is_empty_paragraph: node.type_name == "paragraph" && node.content.is_empty(),
    })
}

/// Describe an existing node so it can be re-inserted through a chain.
pub fn node_to_spec(node: &Node) -> NodeSpec {
    if let Some(text) = &node.text {
        return NodeSpec::text_node(text.clone()).with_marks(node.marks.clone());
    }
    let mut spec = NodeSpec::node(node.type_name.clone())
        .with_content(node.content.iter().map(node_to_spec).collect());
    spec.attrs = node.attrs.clone();
    spec
}

/// Apply a palette command to the document.
pub fn apply_command_action(editor: &mut Editor, action: CommandAction) -> Result<(), EditorError> {
    match action {
        CommandAction::Paragraph => set_block_type(editor, "paragraph", AttrMap::new()),
        CommandAction::Heading(level) => {
            let mut attrs = AttrMap::new();
            attrs.insert("level".to_string(), Value::from(u64::from(level)));
            set_block_type(editor, "heading", attrs)
        }
        CommandAction::BulletList => wrap_block(editor, "bulletList", true),
        CommandAction::OrderedList => wrap_block(editor, "orderedList", true),
        CommandAction::Blockquote => wrap_block(editor, "blockquote", false),
        CommandAction::CodeBlock => convert_to_code_block(editor),
        CommandAction::Divider => insert_divider(editor),
        CommandAction::Table => insert_table(editor),
    }
}

/// Convert the textblock holding the caret to another textblock type.
pub fn set_block_type(
    editor: &mut Editor,
    type_name: &str,
    attrs: AttrMap,
) -> Result<(), EditorError> {
    let pos = {
        let doc = editor.doc();
        let schema = editor.schema().clone();
        let resolved = doc.resolve(editor.selection().head);

        let mut textblock_depth = None;
        for depth in (1..=resolved.depth()).rev() {
            let accepts_inline = schema
                .node_type(&resolved.node(depth).type_name)
                .map(|ty| ty.content.accepts_inline())
                .unwrap_or(false);
            if accepts_inline {
                textblock_depth = Some(depth);
                break;
            }
        }
        match textblock_depth {
            Some(depth) => resolved.before(depth),
            // Boundary caret: fall back to the top-level block
            None => top_block(editor).map(|b| b.from).unwrap_or(0),
        }
    };

    editor
        .chain()
        .focus()
        .set_node_markup(pos, type_name, attrs)
        .run()?;
    Ok(())
}

/// Wrap the current top-level block in a container (list or quote).
fn wrap_block(editor: &mut Editor, wrapper: &str, via_list_item: bool) -> Result<(), EditorError> {
    let Some(block) = top_block(editor) else {
        return Ok(());
    };
    let inner = node_to_spec(&block_node_or_empty(editor.doc(), block.from));

    let spec = if via_list_item {
        NodeSpec::node(wrapper)
            .with_content(vec![NodeSpec::node("listItem").with_content(vec![inner])])
    } else {
        NodeSpec::node(wrapper).with_content(vec![inner])
    };
    let caret = block.from + if via_list_item { 3 } else { 2 };

    editor
        .chain()
        .focus()
        .replace_range(block.from, block.to, spec)
        .set_text_selection(caret)
        .run()?;
    Ok(())
}

/// Replace the current block with a code block holding its text.
fn convert_to_code_block(editor: &mut Editor) -> Result<(), EditorError> {
    let Some(block) = top_block(editor) else {
        return Ok(());
    };
    let node = block_node_or_empty(editor.doc(), block.from);
    let text = node.text_content();

    let mut spec = NodeSpec::node("codeBlock");
    if !text.is_empty() {
        spec = spec.with_content(vec![NodeSpec::text_node(text.clone())]);
    }
    let caret = block.from + 1 + text.chars().count();

    editor
        .chain()
        .focus()
        .replace_range(block.from, block.to, spec)
        .set_text_selection(caret)
        .run()?;
    Ok(())
}

/// Insert a horizontal rule. An empty paragraph is replaced; otherwise
/// the rule lands after the current block. A fresh paragraph follows the
/// rule and receives the caret.
pub fn insert_divider(editor: &mut Editor) -> Result<(), EditorError> {
    let Some(block) = top_block(editor) else {
        return Ok(());
    };
    let rule = NodeSpec::node("horizontalRule");
    let paragraph = NodeSpec::node("paragraph");

    let chain = editor.chain().focus();
    if block.is_empty_paragraph {
        chain
            .replace_range(block.from, block.to, rule)
            .insert_content_at(block.from + 2, paragraph)
            .set_text_selection(block.from + 3)
            .run()?;
    } else {
        chain
            .insert_content_at(block.to, rule)
            .insert_content_at(block.to + 2, paragraph)
            .set_text_selection(block.to + 3)
            .run()?;
    }
    Ok(())
}

/// Build a table spec: `rows`×`cols`, optionally with a header row.
pub fn table_spec(rows: usize, cols: usize, with_header_row: bool) -> NodeSpec {
    let cell_of = |header: bool| {
        NodeSpec::node(if header { "tableHeader" } else { "tableCell" })
            .with_content(vec![NodeSpec::node("paragraph")])
    };
    let row_of = |header: bool| {
        NodeSpec::node("tableRow").with_content((0..cols).map(|_| cell_of(header)).collect())
    };

    let mut row_specs = Vec::with_capacity(rows);
    for row in 0..rows {
        row_specs.push(row_of(with_header_row && row == 0));
    }
    NodeSpec::node("table").with_content(row_specs)
}

/// Insert a 3×3 table with a header row, caret in the first cell.
pub fn insert_table(editor: &mut Editor) -> Result<(), EditorError> {
    let Some(block) = top_block(editor) else {
        return Ok(());
    };
    let table = table_spec(3, 3, true);

    let chain = editor.chain().focus();
    if block.is_empty_paragraph {
        chain
            .replace_range(block.from, block.to, table)
            .set_text_selection(block.from + 4)
            .run()?;
    } else {
        chain
            .insert_content_at(block.to, table)
            .set_text_selection(block.to + 4)
            .run()?;
    }
    Ok(())
}

/// Delete the block starting at `block_pos` (from the block handle).
pub fn delete_block(editor: &mut Editor, block_pos: usize) -> Result<(), EditorError> {
    let Some(node) = editor.doc().node_at(block_pos) else {
        return Ok(());
    };
    let to = block_pos + node.node_size();
    editor.chain().focus().delete_range(block_pos, to).run()?;
    Ok(())
}

/// Duplicate the block starting at `block_pos`, placing the copy after it.
pub fn duplicate_block(editor: &mut Editor, block_pos: usize) -> Result<(), EditorError> {
    let Some(node) = editor.doc().node_at(block_pos) else {
        return Ok(());
    };
    let spec = node_to_spec(node);
    let end = block_pos + node.node_size();
    editor.chain().focus().insert_content_at(end, spec).run()?;
    Ok(())
}

/// Insert an empty paragraph after the block at `block_pos` and move the
/// caret into it.
pub fn add_block_after(editor: &mut Editor, block_pos: usize) -> Result<(), EditorError> {
    let Some(node) = editor.doc().node_at(block_pos) else {
        return Ok(());
    };
    let end = block_pos + node.node_size();
    editor
        .chain()
        .focus()
        .insert_content_at(end, NodeSpec::node("paragraph"))
        .set_text_selection(end + 1)
        .run()?;
    Ok(())
}

fn block_node_or_empty(doc: &Node, pos: usize) -> Node {
    doc.node_at(pos)
        .cloned()
        .unwrap_or_else(|| Node::element("paragraph", AttrMap::new(), Vec::new()))
}
