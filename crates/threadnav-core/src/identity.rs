use std::fmt;
use std::rc::Rc;

use crate::collections::map::HashMap;
use crate::document::{HostDocument, NodeId};

/// Stable identity of a message node, e.g. `ctn-7`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(Rc<str>);

impl MessageId {
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(Rc::from(value.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Side-table from host node handles to message identities.
///
/// Identities are `prefix + counter` and are handed out at most once per
/// node. Entries survive detachment and are only pruned once the host
/// reports the node destroyed, so a counter value is never reused.
#[derive(Debug)]
pub struct IdentityAssigner {
    prefix: String,
    next: u64,
    by_node: HashMap<NodeId, MessageId>,
    by_identity: HashMap<MessageId, NodeId>,
}

impl IdentityAssigner {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            next: 0,
            by_node: HashMap::default(),
            by_identity: HashMap::default(),
        }
    }

    /// Assigns identities to nodes that lack one. Returns how many were new.
    pub fn ensure_identities(&mut self, nodes: &[NodeId]) -> usize {
        let mut assigned = 0;
        for &node in nodes {
            if self.by_node.contains_key(&node) {
                continue;
            }
            let id = MessageId::new(format!("{}{}", self.prefix, self.next));
            self.next += 1;
            self.by_identity.insert(id.clone(), node);
            self.by_node.insert(node, id);
            assigned += 1;
        }
        if assigned > 0 {
            log::trace!("assigned {assigned} message identities (next {})", self.next);
        }
        assigned
    }

    pub fn identity_of(&self, node: NodeId) -> Option<&MessageId> {
        self.by_node.get(&node)
    }

    pub fn node_of(&self, id: &MessageId) -> Option<NodeId> {
        self.by_identity.get(id).copied()
    }

    /// Identity of the nearest identified inclusive ancestor of `node`.
    pub fn enclosing_identity<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeId) -> Option<&MessageId> {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if let Some(id) = self.by_node.get(&candidate) {
                return Some(id);
            }
            current = doc.parent(candidate);
        }
        None
    }

    /// Drops entries for destroyed nodes. Returns how many were removed.
    pub fn prune<D: HostDocument + ?Sized>(&mut self, doc: &D) -> usize {
        let dead: Vec<NodeId> = self
            .by_node
            .keys()
            .copied()
            .filter(|&node| !doc.is_alive(node))
            .collect();
        for node in &dead {
            if let Some(id) = self.by_node.remove(node) {
                self.by_identity.remove(&id);
            }
        }
        dead.len()
    }

    pub fn len(&self) -> usize {
        self.by_node.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_node.is_empty()
    }

    /// Forgets every identity. The counter keeps counting so values issued
    /// before the reset are never handed to another node.
    pub fn clear(&mut self) {
        self.by_node.clear();
        self.by_identity.clear();
    }
}

#[cfg(test)]
#[path = "tests/identity_tests.rs"]
mod tests;
