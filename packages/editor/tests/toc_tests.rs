//! Heading-id derivation and TOC block scenarios.

use std::sync::Arc;
use vellum_dom::schema::toc_items_from_node;
use vellum_editor::interact::{Layout, Point, Rect};
use vellum_editor::toc::{
    collect_headings, find_heading_by_id, handle_link_click, insert_toc_block, LinkClick,
    ScrollCommand,
};
use vellum_editor::{Editor, NodeSpec, Schema};

fn schema() -> Arc<Schema> {
    Arc::new(Schema::editor_default())
}

struct FixedLayout {
    in_editor: bool,
}

impl Layout for FixedLayout {
    fn pos_at_point(&self, _point: Point) -> Option<usize> {
        None
    }

    fn coords_at_pos(&self, pos: usize) -> Rect {
        Rect {
            top: pos as f64 * 10.0,
            left: 0.0,
            width: 100.0,
            height: 20.0,
        }
    }

    fn editor_rect(&self) -> Option<Rect> {
        self.in_editor.then_some(Rect {
            top: 50.0,
            left: 0.0,
            width: 800.0,
            height: 400.0,
        })
    }

    fn scroll_top(&self) -> f64 {
        200.0
    }
}

#[test]
fn test_collect_headings_assigns_unique_ids() {
    let html = "<h1>Introduction</h1><p>x</p><h1>Introduction</h1>";
    let editor = Editor::from_html(schema(), html).unwrap();

    let headings = collect_headings(editor.doc());
    assert_eq!(headings.len(), 2);
    assert_eq!(headings[0].id, "introduction");
    assert_eq!(headings[1].id, "introduction-1");
}

#[test]
fn test_collect_headings_respects_existing_ids() {
    let html = "<h2 id=\"custom-anchor\">Title</h2><h2>Title</h2>";
    let editor = Editor::from_html(schema(), html).unwrap();

    let headings = collect_headings(editor.doc());
    assert_eq!(headings[0].id, "custom-anchor");
    assert_eq!(headings[1].id, "title");
}

#[test]
fn test_insert_toc_assigns_ids_and_items() {
    let html = "<h1>One</h1><h2>Two</h2><h3>Three</h3><p>end</p>";
    let mut editor = Editor::from_html(schema(), html).unwrap();

    // Caret inside the trailing paragraph
    let end = editor.doc().content_size() - 1;
    editor.chain().set_text_selection(end).run().unwrap();

    insert_toc_block(&mut editor).unwrap();

    // Ids written back onto the headings
    let doc = editor.doc();
    assert_eq!(doc.content[0].attr_str("id"), Some("one"));
    assert_eq!(doc.content[1].attr_str("id"), Some("two"));
    assert_eq!(doc.content[2].attr_str("id"), Some("three"));

    // TOC block inserted with normalized levels (h1 is the minimum)
    let toc = doc
        .content
        .iter()
        .find(|n| n.type_name == "tableOfContents")
        .expect("toc inserted");
    let items = toc_items_from_node(toc);
    assert_eq!(items.len(), 3);
    assert_eq!((items[0].level, items[0].id.as_str()), (0, "one"));
    assert_eq!((items[1].level, items[1].id.as_str()), (1, "two"));
    assert_eq!((items[2].level, items[2].id.as_str()), (2, "three"));
}

#[test]
fn test_insert_toc_normalization_caps_at_three() {
    let html = "<h2>A</h2><h6>Deep</h6>";
    let mut editor = Editor::from_html(schema(), html).unwrap();
    insert_toc_block(&mut editor).unwrap();

    let toc = editor
        .doc()
        .content
        .iter()
        .find(|n| n.type_name == "tableOfContents")
        .unwrap();
    let items = toc_items_from_node(toc);
    assert_eq!(items[0].level, 0);
    assert_eq!(items[1].level, 3); // 6 - 2 = 4, capped
}

#[test]
fn test_insert_toc_without_headings_inserts_placeholder() {
    let mut editor = Editor::from_html(schema(), "<p>just text</p>").unwrap();
    insert_toc_block(&mut editor).unwrap();

    let doc = editor.doc();
    assert!(doc
        .content
        .iter()
        .all(|n| n.type_name != "tableOfContents"));
    assert!(doc
        .text_content()
        .contains("Add headings to your document to generate a table of contents."));
}

#[test]
fn test_toc_roundtrips_through_html() {
    let html = "<h1>One</h1><h2>Two</h2><p>x</p>";
    let mut editor = Editor::from_html(schema(), html).unwrap();
    insert_toc_block(&mut editor).unwrap();

    let serialized = editor.to_html();
    let reloaded = Editor::from_html(schema(), &serialized).unwrap();
    assert_eq!(reloaded.doc(), editor.doc());
}

#[test]
fn test_effect_refreshes_toc_after_edit() {
    let html = "<h1>One</h1><p>x</p>";
    let mut editor = Editor::from_html(schema(), html).unwrap();
    insert_toc_block(&mut editor).unwrap();

    // A new heading typed later gets an id and shows up in the TOC
    editor
        .chain()
        .insert_content_at(
            0,
            NodeSpec::node("heading")
                .with_attr("level", serde_json::json!(2))
                .with_content(vec![NodeSpec::text_node("Fresh")]),
        )
        .run()
        .unwrap();

    let doc = editor.doc();
    assert_eq!(doc.content[0].attr_str("id"), Some("fresh"));

    let toc = doc
        .content
        .iter()
        .find(|n| n.type_name == "tableOfContents")
        .unwrap();
    let items = toc_items_from_node(toc);
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "fresh");
    assert_eq!(items[1].id, "one");
}

#[test]
fn test_find_heading_short_circuits() {
    let html = "<h1 id=\"a\">A</h1><h1 id=\"b\">B</h1>";
    let editor = Editor::from_html(schema(), html).unwrap();

    assert_eq!(find_heading_by_id(editor.doc(), "a"), Some(0));
    let b_pos = editor.doc().content[0].node_size();
    assert_eq!(find_heading_by_id(editor.doc(), "b"), Some(b_pos));
    assert_eq!(find_heading_by_id(editor.doc(), "missing"), None);
}

#[test]
fn test_link_click_scrolls_editor_container() {
    let html = "<h1 id=\"target\">Target</h1><p>x</p>";
    let mut editor = Editor::from_html(schema(), html).unwrap();
    let layout = FixedLayout { in_editor: true };

    let command = handle_link_click(
        &mut editor,
        LinkClick {
            href: Some("#target"),
            toc_link: None,
        },
        &layout,
    )
    .unwrap()
    .expect("handled");

    // scroll_top + (coords.top - rect.top) - offset = 200 + (0 - 50) - 20
    assert_eq!(command, ScrollCommand::Editor { top: 130.0 });
    // Selection moved just inside the heading
    assert_eq!(editor.selection().head, 1);
}

#[test]
fn test_link_click_outside_editor_scrolls_window() {
    let html = "<p>x</p><h1 id=\"t\">T</h1>";
    let mut editor = Editor::from_html(schema(), html).unwrap();
    let layout = FixedLayout { in_editor: false };

    let command = handle_link_click(
        &mut editor,
        LinkClick {
            href: None,
            toc_link: Some("t"),
        },
        &layout,
    )
    .unwrap()
    .expect("handled");

    // Heading at pos 3; coords.top = 30; window offset 100
    assert_eq!(command, ScrollCommand::Window { top: -70.0 });
}

#[test]
fn test_link_click_ignores_external_links() {
    let mut editor = Editor::from_html(schema(), "<h1 id=\"a\">A</h1>").unwrap();
    let layout = FixedLayout { in_editor: true };

    let handled = handle_link_click(
        &mut editor,
        LinkClick {
            href: Some("https://example.com"),
            toc_link: None,
        },
        &layout,
    )
    .unwrap();
    assert!(handled.is_none());
}
