//! Position resolution.
//!
//! A resolved position pins an integer address to its place in the tree:
//! the chain of ancestor nodes, the child index taken at each depth, and
//! the offset within the innermost parent's content.

use crate::node::Node;

/// A position resolved against a document tree.
///
/// Depth 0 is the root; `node(depth())` is the innermost parent whose
/// content contains the position.
#[derive(Debug)]
pub struct ResolvedPos<'a> {
    pub pos: usize,

    /// Ancestor chain, root first.
    nodes: Vec<&'a Node>,

    /// Child index at each depth: for depths above the innermost this is
    /// the index descended into; at the innermost it is the index of the
    /// child at or immediately after the position.
    indices: Vec<usize>,

    /// Absolute position where each ancestor's content starts.
    starts: Vec<usize>,

    /// Offset of the position within the innermost parent's content.
    pub parent_offset: usize,
}

impl Node {
    /// Resolve a position.
    ///
    /// Positions outside `0..=content_size()` are a programming error:
    /// callers must only pass positions obtained from this document (or
    /// remapped through the transaction that mutated it). Use
    /// [`Node::try_resolve`] when a miss is an expected outcome.
    pub fn resolve(&self, pos: usize) -> ResolvedPos<'_> {
        match self.try_resolve(pos) {
            Some(resolved) => resolved,
            None => panic!(
                "position {pos} out of range (document size {})",
                self.content_size()
            ),
        }
    }

    /// Resolve a position, returning `None` when it is out of range.
    pub fn try_resolve(&self, pos: usize) -> Option<ResolvedPos<'_>> {
        if pos > self.content_size() {
            return None;
        }

        let mut nodes: Vec<&Node> = Vec::new();
        let mut indices = Vec::new();
        let mut starts = Vec::new();

        let mut node = self;
        let mut start = 0usize;

        loop {
            nodes.push(node);
            starts.push(start);

            let rem = pos - start;
            let mut cur = 0usize;
            let mut index = node.content.len();
            let mut descend: Option<(&Node, usize)> = None;

            for (i, child) in node.content.iter().enumerate() {
                if rem == cur {
                    index = i;
                    break;
                }
                let end = cur + child.node_size();
                if rem < end {
                    index = i;
                    if !child.is_text() {
                        descend = Some((child, start + cur + 1));
                    }
                    break;
                }
                cur = end;
            }

            indices.push(index);

            match descend {
                Some((child, child_start)) => {
                    node = child;
                    start = child_start;
                }
                None => {
                    return Some(ResolvedPos {
                        pos,
                        nodes,
                        indices,
                        starts,
                        parent_offset: rem,
                    });
                }
            }
        }
    }

    /// Absolute position of the opening boundary of `parent.content[index]`,
    /// where `content_start` is the absolute start of `parent`'s content.
    pub fn child_start(&self, index: usize, content_start: usize) -> usize {
        content_start
            + self
                .content
                .iter()
                .take(index)
                .map(Node::node_size)
                .sum::<usize>()
    }
}

impl<'a> ResolvedPos<'a> {
    pub fn depth(&self) -> usize {
        self.nodes.len() - 1
    }

    /// Ancestor at `depth` (0 = root).
    pub fn node(&self, depth: usize) -> &'a Node {
        self.nodes[depth]
    }

    /// Innermost parent.
    pub fn parent(&self) -> &'a Node {
        self.nodes[self.nodes.len() - 1]
    }

    /// Child index at `depth`.
    pub fn index(&self, depth: usize) -> usize {
        self.indices[depth]
    }

    /// Child index within the innermost parent.
    pub fn parent_index(&self) -> usize {
        self.indices[self.indices.len() - 1]
    }

    /// Position where the content of the ancestor at `depth` starts.
    pub fn start(&self, depth: usize) -> usize {
        self.starts[depth]
    }

    /// Position where the content of the ancestor at `depth` ends.
    pub fn end(&self, depth: usize) -> usize {
        self.starts[depth] + self.nodes[depth].content_size()
    }

    /// Position immediately before the ancestor at `depth` (its opening
    /// boundary). Meaningless for the root.
    pub fn before(&self, depth: usize) -> usize {
        assert!(depth > 0, "there is no position before the root");
        self.starts[depth] - 1
    }

    /// Position immediately after the ancestor at `depth` (past its
    /// closing boundary). Meaningless for the root.
    pub fn after(&self, depth: usize) -> usize {
        assert!(depth > 0, "there is no position after the root");
        self.end(depth) + 1
    }

    /// Ancestor path as child indices, root first, excluding the
    /// innermost index. Identifies the innermost parent for mutation.
    pub fn parent_path(&self) -> &[usize] {
        &self.indices[..self.indices.len() - 1]
    }

    /// Child-index path from the root to the ancestor at `depth`.
    pub fn path_to(&self, depth: usize) -> &[usize] {
        &self.indices[..depth]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::AttrMap;

    fn para(text: &str) -> Node {
        Node::element("paragraph", AttrMap::new(), vec![Node::text(text)])
    }

    fn doc(children: Vec<Node>) -> Node {
        Node::element("doc", AttrMap::new(), children)
    }

    #[test]
    fn test_resolve_boundaries() {
        // doc(paragraph("ab"), paragraph("cd"))
        // positions: 0 <p> 1 a 2 b 3 </p> 4 <p> 5 c 6 d 7 </p> 8
        let d = doc(vec![para("ab"), para("cd")]);

        let top = d.resolve(0);
        assert_eq!(top.depth(), 0);
        assert_eq!(top.parent_offset, 0);
        assert_eq!(top.index(0), 0);

        let between = d.resolve(4);
        assert_eq!(between.depth(), 0);
        assert_eq!(between.index(0), 1);

        let end = d.resolve(8);
        assert_eq!(end.depth(), 0);
        assert_eq!(end.index(0), 2);
    }

    #[test]
    fn test_resolve_inside_text() {
        let d = doc(vec![para("ab"), para("cd")]);

        let inside = d.resolve(2);
        assert_eq!(inside.depth(), 1);
        assert_eq!(inside.parent().type_name, "paragraph");
        assert_eq!(inside.parent_offset, 1);
        assert_eq!(inside.start(1), 1);
        assert_eq!(inside.end(1), 3);
        assert_eq!(inside.before(1), 0);
        assert_eq!(inside.after(1), 4);

        let second = d.resolve(6);
        assert_eq!(second.before(1), 4);
        assert_eq!(second.after(1), 8);
        assert_eq!(second.parent_offset, 1);
    }

    #[test]
    fn test_resolve_empty_paragraph() {
        let d = doc(vec![Node::element("paragraph", AttrMap::new(), vec![])]);
        let inside = d.resolve(1);
        assert_eq!(inside.depth(), 1);
        assert_eq!(inside.parent_offset, 0);
        assert_eq!(inside.parent().type_name, "paragraph");
    }

    #[test]
    fn test_try_resolve_out_of_range() {
        let d = doc(vec![para("ab")]);
        assert!(d.try_resolve(4).is_some());
        assert!(d.try_resolve(5).is_none());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_resolve_out_of_range_panics() {
        let d = doc(vec![para("ab")]);
        let _ = d.resolve(99);
    }

    #[test]
    fn test_child_start() {
        let d = doc(vec![para("ab"), para("cd")]);
        assert_eq!(d.child_start(0, 0), 0);
        assert_eq!(d.child_start(1, 0), 4);
        assert_eq!(d.child_start(2, 0), 8);
    }
}
