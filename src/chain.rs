//! Chain storage: every node of every bucket lives in one generational
//! arena, and a bucket is just an optional head key into it.
//!
//! A chain ends where `next` is `None`; an empty bucket has no head. This
//! replaces an allocated empty tail node with an absent link, so there is
//! nothing to keep in sync when entries are spliced in.

use slotmap::{new_key_type, SlotMap};

new_key_type! {
    /// Arena key of a chain node.
    pub(crate) struct NodeKey;
}

pub(crate) struct Node<'k, V> {
    pub(crate) key: &'k str,
    pub(crate) value: V,
    pub(crate) next: Option<NodeKey>,
}

pub(crate) type Arena<'k, V> = SlotMap<NodeKey, Node<'k, V>>;

/// Walks one chain head-to-tail.
pub(crate) struct Chain<'a, 'k, V> {
    nodes: &'a Arena<'k, V>,
    cur: Option<NodeKey>,
}

impl<'a, 'k, V> Chain<'a, 'k, V> {
    #[inline]
    pub(crate) fn new(nodes: &'a Arena<'k, V>, head: Option<NodeKey>) -> Self {
        Self { nodes, cur: head }
    }
}

impl<'a, 'k, V> Iterator for Chain<'a, 'k, V> {
    type Item = (NodeKey, &'a Node<'k, V>);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let k = self.cur?;
        let node = self.nodes.get(k)?;
        self.cur = node.next;
        Some((k, node))
    }
}

/// Append `key`/`value` to the chain rooted at `head`.
///
/// An empty chain gets the node as its head. Otherwise the node is spliced
/// in directly after the head, ahead of every older non-head node.
pub(crate) fn splice<'k, V>(
    nodes: &mut Arena<'k, V>,
    head: &mut Option<NodeKey>,
    key: &'k str,
    value: V,
) -> NodeKey {
    match *head {
        None => {
            let k = nodes.insert(Node {
                key,
                value,
                next: None,
            });
            *head = Some(k);
            k
        }
        Some(h) => {
            let after = nodes.get(h).and_then(|n| n.next);
            let k = nodes.insert(Node {
                key,
                value,
                next: after,
            });
            if let Some(head_node) = nodes.get_mut(h) {
                head_node.next = Some(k);
            }
            k
        }
    }
}

/// Find the node holding `key` in the chain rooted at `head`.
#[inline]
pub(crate) fn find<'k, V>(nodes: &Arena<'k, V>, head: Option<NodeKey>, key: &str) -> Option<NodeKey> {
    Chain::new(nodes, head)
        .find(|(_, n)| n.key == key)
        .map(|(k, _)| k)
}
