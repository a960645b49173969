//! # Interaction helpers
//!
//! Pointer- and selection-driven layout state for transient UI: the block
//! handle, the floating format toolbar, and the table toolbar. All of it
//! is pure decision logic over an injected [`Layout`], so it is testable
//! without a rendering surface, and none of it mutates the document —
//! block operations go through the transaction engine in `blocks`.

use crate::transaction::Selection;
use vellum_dom::Node;

/// Screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub top: f64,
    pub left: f64,
}

/// Screen rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub top: f64,
    pub left: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }
}

/// Mapping between document positions and screen coordinates, provided by
/// the rendering host.
pub trait Layout {
    /// Document position under a screen point, if any.
    fn pos_at_point(&self, point: Point) -> Option<usize>;

    /// Screen rectangle of a document position.
    fn coords_at_pos(&self, pos: usize) -> Rect;

    /// Bounding rectangle of the editor container; `None` outside an
    /// editor context (e.g. a standalone TOC rendering).
    fn editor_rect(&self) -> Option<Rect>;

    /// Current scroll offset of the editor container.
    fn scroll_top(&self) -> f64;
}

/// Width of the left gutter where the block handle lives. The handle is
/// kept visible while the pointer is in this zone even when no document
/// position resolves under it, so moving toward the handle doesn't
/// flicker it away.
pub const GUTTER_WIDTH: f64 = 56.0;

/// Grace delay before hiding floating UI after the pointer leaves the
/// editor, so in-flight clicks on the UI aren't lost to the hide.
pub const HIDE_GRACE_MS: u64 = 150;

/// Hover block-handle state, throttled to one layout read per frame.
#[derive(Debug, Default)]
pub struct BlockHandle {
    pub visible: bool,
    pub position: Point,
    pub block_pos: Option<usize>,
    pub options_open: bool,
    pub hovering_handle: bool,
    pending: Option<Point>,
}

impl BlockHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a pointer move. Returns `true` when a frame callback should
    /// be scheduled; further moves before the frame only update the
    /// pending point.
    pub fn pointer_moved(&mut self, point: Point) -> bool {
        if self.hovering_handle || self.options_open {
            return false;
        }
        let needs_frame = self.pending.is_none();
        self.pending = Some(point);
        needs_frame
    }

    /// Cancel a pending frame (teardown). Idempotent.
    pub fn cancel_frame(&mut self) {
        self.pending = None;
    }

    /// Consume the pending pointer position and recompute handle state.
    pub fn on_frame(&mut self, doc: &Node, layout: &dyn Layout) {
        let Some(point) = self.pending.take() else {
            return;
        };
        let Some(editor_rect) = layout.editor_rect() else {
            self.hide();
            return;
        };

        let relative_x = point.left - editor_rect.left;

        let mut pos = layout.pos_at_point(point);
        if pos.is_none() && relative_x < 200.0 {
            // Retry further right: the pointer may be left of the text
            pos = layout.pos_at_point(Point {
                top: point.top,
                left: editor_rect.left + 100.0,
            });
        }

        let Some(pos) = pos else {
            // Keep the handle while the pointer is in the gutter zone
            if relative_x >= GUTTER_WIDTH {
                self.hide();
            }
            return;
        };

        let Some(resolved) = doc.try_resolve(pos) else {
            self.hide();
            return;
        };
        if resolved.depth() == 0 {
            self.hide();
            return;
        }

        let node_start = resolved.before(1);
        let coords = layout.coords_at_pos(node_start);
        self.position = Point {
            top: coords.top - editor_rect.top,
            left: coords.left - editor_rect.left,
        };
        self.block_pos = Some(node_start);
        self.visible = true;
    }

    /// Pointer left the editor: the caller schedules [`Self::apply_hide`]
    /// after the returned grace delay.
    pub fn pointer_left(&self) -> u64 {
        HIDE_GRACE_MS
    }

    /// Apply a delayed hide; a pointer that re-entered the handle or an
    /// open options menu keeps it visible.
    pub fn apply_hide(&mut self) {
        if !self.options_open && !self.hovering_handle {
            self.visible = false;
        }
    }

    fn hide(&mut self) {
        self.visible = false;
        self.block_pos = None;
    }
}

/// Anchor for the floating format toolbar: above the selection start.
/// `None` for a caret (nothing to format).
pub fn selection_toolbar_anchor(selection: Selection, layout: &dyn Layout) -> Option<Point> {
    if selection.is_caret() {
        return None;
    }
    let editor_rect = layout.editor_rect()?;
    let from = layout.coords_at_pos(selection.from());
    let to = layout.coords_at_pos(selection.to());
    Some(Point {
        top: from.top - editor_rect.top - 44.0,
        left: (from.left + to.right()) / 2.0 - editor_rect.left,
    })
}

/// Anchor for the table toolbar: top-right of the table the caret is in.
/// `None` when the caret is not inside a table.
pub fn table_toolbar_anchor(
    doc: &Node,
    selection: Selection,
    layout: &dyn Layout,
) -> Option<Point> {
    let resolved = doc.try_resolve(selection.head)?;
    let table_depth = (1..=resolved.depth()).find(|&d| resolved.node(d).type_name == "table")?;

    let editor_rect = layout.editor_rect()?;
    let coords = layout.coords_at_pos(resolved.before(table_depth));
    Some(Point {
        top: coords.top - editor_rect.top - 40.0,
        left: coords.right() - editor_rect.left,
    })
}
