//! Ancestor path and scoped message passing during a traversal.
//!
//! A rewrite often finds a fact deep in the tree (a field with a particular
//! type) that an ancestor must act on once its own children are done (the
//! enclosing class). The cursor carries such facts upward without parent
//! pointers: a message is keyed by the frame it is addressed to, lives only as
//! long as that frame is on the path, and is consumed at most once.

use std::collections::HashMap;

use crate::tree::{NodeId, NodeTag, Tree};

/// Path from the traversal root to the node being visited, plus messages
/// addressed to frames on that path.
#[derive(Debug, Default)]
pub struct Cursor {
    path: Vec<NodeId>,
    messages: HashMap<(NodeId, &'static str), NodeId>,
}

impl Cursor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: NodeId) {
        self.path.push(id);
    }

    /// Leave the current frame. Messages addressed to it are discarded.
    pub fn pop(&mut self) -> Option<NodeId> {
        let frame = self.path.pop()?;
        if !self.path.contains(&frame) {
            self.messages.retain(|(owner, _), _| *owner != frame);
        }
        Some(frame)
    }

    /// The node being visited.
    pub fn current(&self) -> Option<NodeId> {
        self.path.last().copied()
    }

    /// The `n`th ancestor of the current node, `ancestor(0)` being the node itself.
    pub fn ancestor(&self, n: usize) -> Option<NodeId> {
        self.path.len().checked_sub(n + 1).map(|i| self.path[i])
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.ancestor(1)
    }

    /// Root-most first.
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Innermost frame with the given kind, excluding the current node.
    pub fn enclosing(&self, tree: &Tree, tag: NodeTag) -> Option<NodeId> {
        let above = self.path.len().checked_sub(1)?;
        self.path[..above]
            .iter()
            .rev()
            .copied()
            .find(|id| tree.tag(*id) == tag)
    }

    /// Address `value` to `frame`. Returns false when `frame` is not on the
    /// path, in which case nothing is recorded.
    pub fn put_message(&mut self, frame: NodeId, key: &'static str, value: NodeId) -> bool {
        if !self.path.contains(&frame) {
            return false;
        }
        self.messages.insert((frame, key), value);
        true
    }

    /// Take the message addressed to the current frame.
    pub fn poll_message(&mut self, key: &'static str) -> Option<NodeId> {
        let frame = self.current()?;
        self.messages.remove(&(frame, key))
    }

    /// Peek at the innermost message with this key anywhere on the path.
    pub fn nearest_message(&self, key: &'static str) -> Option<(NodeId, NodeId)> {
        self.path
            .iter()
            .rev()
            .find_map(|frame| self.messages.get(&(*frame, key)).map(|v| (*frame, *v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::TreeBuilder;

    fn sample() -> (Tree, NodeId, NodeId, NodeId) {
        let mut b = TreeBuilder::new();
        let field = b.field(vec![], &[], "java.lang.String", "name", None);
        let class = b.class(vec![], &[], "A", vec![field]);
        let body = b.tree().children_of(class)[0];
        (b.into_tree(), class, body, field)
    }

    #[test]
    fn test_message_is_polled_once() {
        let (_, class, body, field) = sample();
        let mut cursor = Cursor::new();
        cursor.push(class);
        cursor.push(body);
        cursor.push(field);
        assert!(cursor.put_message(class, "fact", field));
        assert_eq!(cursor.nearest_message("fact"), Some((class, field)));
        cursor.pop();
        cursor.pop();
        assert_eq!(cursor.poll_message("fact"), Some(field));
        assert_eq!(cursor.poll_message("fact"), None);
    }

    #[test]
    fn test_messages_die_with_their_frame() {
        let (_, class, body, field) = sample();
        let mut cursor = Cursor::new();
        cursor.push(class);
        cursor.push(body);
        assert!(cursor.put_message(body, "fact", field));
        cursor.pop();
        cursor.push(body);
        assert_eq!(cursor.poll_message("fact"), None);
    }

    #[test]
    fn test_message_to_absent_frame_is_dropped() {
        let (_, class, _, field) = sample();
        let mut cursor = Cursor::new();
        cursor.push(field);
        assert!(!cursor.put_message(class, "fact", field));
        assert_eq!(cursor.nearest_message("fact"), None);
    }

    #[test]
    fn test_enclosing_skips_current() {
        let (tree, class, body, field) = sample();
        let mut cursor = Cursor::new();
        cursor.push(class);
        assert_eq!(cursor.enclosing(&tree, NodeTag::ClassDeclaration), None);
        cursor.push(body);
        cursor.push(field);
        assert_eq!(
            cursor.enclosing(&tree, NodeTag::ClassDeclaration),
            Some(class)
        );
        assert_eq!(cursor.parent(), Some(body));
        assert_eq!(cursor.ancestor(2), Some(class));
        assert_eq!(cursor.ancestor(3), None);
    }
}
