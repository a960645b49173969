//! End-to-end editor tests: parse → edit → serialize flows.

use std::sync::Arc;
use vellum_editor::{Editor, NodeSpec, Schema};

fn schema() -> Arc<Schema> {
    Arc::new(Schema::editor_default())
}

#[test]
fn test_editor_roundtrip() {
    let html = "<h1 id=\"title\">Title</h1><p>Hello <strong>world</strong></p>";
    let editor = Editor::from_html(schema(), html).unwrap();
    assert_eq!(editor.to_html(), html);
}

#[test]
fn test_insert_divider_at_end() {
    let mut editor = Editor::from_html(schema(), "<p>ab</p>").unwrap();
    let end = editor.doc().content_size();
    editor
        .chain()
        .focus()
        .insert_content_at(end, NodeSpec::node("horizontalRule"))
        .run()
        .unwrap();

    assert_eq!(editor.to_html(), "<p>ab</p><hr>");
    assert_eq!(editor.version(), 1);
    assert!(editor.is_focused());
}

#[test]
fn test_unsafe_figure_renders_without_img() {
    let mut editor = Editor::from_html(schema(), "<p></p>").unwrap();
    let spec = NodeSpec::node("figure")
        .with_attr("src", serde_json::json!("javascript:alert(1)"))
        .with_attr("alt", serde_json::json!("evil"))
        .with_content(vec![NodeSpec::node("figcaption")
            .with_content(vec![NodeSpec::text_node("caption survives")])]);

    let end = editor.doc().content_size();
    editor
        .chain()
        .focus()
        .insert_content_at(end, spec)
        .run()
        .unwrap();

    let html = editor.to_html();
    assert!(!html.contains("<img"));
    assert!(!html.contains("javascript:"));
    assert!(html.contains("<figcaption"));
    assert!(html.contains("caption survives"));
}

#[test]
fn test_uploaded_figure_insertion() {
    // The post-confirm insertion path: figure with the public URL and the
    // filename as alt, plus an empty caption slot
    let mut editor = Editor::from_html(schema(), "<p></p>").unwrap();
    let spec = NodeSpec::node("figure")
        .with_attr("src", serde_json::json!("https://cdn.example.com/u/cat.png"))
        .with_attr("alt", serde_json::json!("cat.png"))
        .with_content(vec![NodeSpec::node("figcaption")]);

    let end = editor.doc().content_size();
    editor
        .chain()
        .focus()
        .insert_content_at(end, spec)
        .run()
        .unwrap();

    let html = editor.to_html();
    assert!(html.contains("src=\"https://cdn.example.com/u/cat.png\""));
    assert!(html.contains("alt=\"cat.png\""));

    // Round-trips through persistence
    let reloaded = Editor::from_html(schema(), &html).unwrap();
    assert_eq!(reloaded.doc(), editor.doc());
}

#[test]
fn test_failed_transaction_leaves_document_untouched() {
    let mut editor = Editor::from_html(schema(), "<p>ab</p>").unwrap();
    let before = editor.doc().clone();

    // Second op is invalid: a paragraph's inline content can't live in a
    // bullet list
    let result = editor
        .chain()
        .insert_content_at(4, NodeSpec::node("horizontalRule"))
        .set_node_markup(0, "bulletList", Default::default())
        .run();

    assert!(result.is_err());
    assert_eq!(editor.doc(), &before);
    assert_eq!(editor.version(), 0);
}

#[test]
fn test_position_map_remaps_stale_positions() {
    let mut editor = Editor::from_html(schema(), "<p>ab</p><p>cd</p>").unwrap();
    let second_para = 4;

    let map = editor
        .chain()
        .insert_content_at(0, NodeSpec::node("horizontalRule"))
        .run()
        .unwrap();

    let remapped = map.map(second_para);
    assert_eq!(remapped, 6);
    assert_eq!(editor.doc().node_at(remapped).unwrap().text_content(), "cd");
}

#[test]
fn test_undo_redo() {
    let mut editor = Editor::from_html(schema(), "<p>ab</p>").unwrap();
    editor.insert_text("X").unwrap();
    assert_eq!(editor.doc().text_content(), "Xab");

    assert!(editor.undo());
    assert_eq!(editor.doc().text_content(), "ab");

    assert!(editor.redo());
    assert_eq!(editor.doc().text_content(), "Xab");

    assert!(!editor.redo());
}

#[test]
fn test_enter_in_figcaption_exits_after_figure() {
    let html = concat!(
        "<figure><img src=\"https://example.com/a.png\" alt=\"a\">",
        "<figcaption>cap</figcaption></figure>"
    );
    let mut editor = Editor::from_html(schema(), html).unwrap();

    // Caret inside the caption text
    editor.chain().set_text_selection(3).run().unwrap();
    let handled = vellum_editor::keymap::handle_enter(&mut editor).unwrap();
    assert!(handled);

    // A fresh paragraph follows the figure, caret inside it
    assert_eq!(editor.doc().content.len(), 2);
    assert_eq!(editor.doc().content[1].type_name, "paragraph");
    let figure_size = editor.doc().content[0].node_size();
    assert_eq!(editor.selection().head, figure_size + 1);

    // The caption itself gained no content
    assert_eq!(editor.doc().content[0].text_content(), "cap");
}

#[test]
fn test_enter_elsewhere_not_handled() {
    let mut editor = Editor::from_html(schema(), "<p>ab</p>").unwrap();
    editor.chain().set_text_selection(1).run().unwrap();
    assert!(!vellum_editor::keymap::handle_enter(&mut editor).unwrap());
}

#[test]
fn test_file_backed_save() {
    let path = std::env::temp_dir().join("vellum-editor-save-test.html");
    std::fs::write(&path, "<p>stored</p>").unwrap();

    let mut editor = Editor::new(
        vellum_editor::Document::load(schema(), path.clone()).unwrap(),
    );
    assert!(!editor.document().is_dirty());

    editor.insert_text("X").unwrap();
    assert!(editor.document().is_dirty());

    editor.save().unwrap();
    assert!(!editor.document().is_dirty());
    let written = std::fs::read_to_string(&path).unwrap();
    assert!(written.contains("stored"));
    assert!(written.contains("X"));

    std::fs::remove_file(&path).ok();
}

#[test]
fn test_link_set_and_remove() {
    use vellum_editor::links;

    let mut editor = Editor::from_html(schema(), "<p>click here</p>").unwrap();

    // Mark "click" as a link
    editor
        .chain()
        .add_mark(
            1,
            6,
            vellum_dom::Mark::new("link")
                .with_attr("href", serde_json::json!("https://example.com")),
        )
        .run()
        .unwrap();
    assert!(editor
        .to_html()
        .contains("<a href=\"https://example.com\">click</a>"));

    // Caret inside the link: removal extends over the whole mark run
    editor.chain().set_text_selection(3).run().unwrap();
    links::remove_link(&mut editor).unwrap();
    assert!(!editor.to_html().contains("<a "));
    assert_eq!(editor.doc().text_content(), "click here");
}

#[test]
fn test_set_link_rejects_bad_protocol() {
    use vellum_editor::{links, EditorError, LinkError};

    let mut editor = Editor::from_html(schema(), "<p>click</p>").unwrap();
    let before = editor.doc().clone();

    let err = links::set_link(&mut editor, "javascript:alert(1)").unwrap_err();
    match err {
        EditorError::Link(LinkError::DisallowedProtocol(protocol)) => {
            assert_eq!(protocol, "javascript")
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(editor.doc(), &before);
}
