//! Visitor traversal over the document tree.
//!
//! Provides default implementations that walk the entire tree in document
//! order. Override specific visit_* methods to perform custom actions on
//! nodes. Use [`Node::descendants`] instead when positions are needed.

use crate::node::{Mark, Node};

/// Visitor pattern for traversing the tree immutably.
pub trait Visitor: Sized {
    fn visit_node(&mut self, node: &Node) {
        walk_node(self, node);
    }

    fn visit_mark(&mut self, _mark: &Mark) {
        // Leaf, no children to walk
    }
}

/// Mutable visitor pattern for transforming the tree in place.
pub trait VisitorMut: Sized {
    fn visit_node_mut(&mut self, node: &mut Node) {
        walk_node_mut(self, node);
    }

    fn visit_mark_mut(&mut self, _mark: &mut Mark) {
        // Leaf, no children to walk
    }
}

pub fn walk_node<V: Visitor>(visitor: &mut V, node: &Node) {
    for mark in &node.marks {
        visitor.visit_mark(mark);
    }
    for child in &node.content {
        visitor.visit_node(child);
    }
}

pub fn walk_node_mut<V: VisitorMut>(visitor: &mut V, node: &mut Node) {
    for mark in &mut node.marks {
        visitor.visit_mark_mut(mark);
    }
    for child in &mut node.content {
        visitor.visit_node_mut(child);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::AttrMap;

    struct TypeCollector {
        types: Vec<String>,
    }

    impl Visitor for TypeCollector {
        fn visit_node(&mut self, node: &Node) {
            self.types.push(node.type_name.clone());
            walk_node(self, node);
        }
    }

    #[test]
    fn test_walk_order() {
        let doc = Node::element(
            "doc",
            AttrMap::new(),
            vec![
                Node::element("paragraph", AttrMap::new(), vec![Node::text("a")]),
                Node::element("horizontalRule", AttrMap::new(), vec![]),
            ],
        );

        let mut collector = TypeCollector { types: Vec::new() };
        collector.visit_node(&doc);

        assert_eq!(
            collector.types,
            vec!["doc", "paragraph", "text", "horizontalRule"]
        );
    }
}
