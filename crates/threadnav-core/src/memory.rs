//! In-memory host document.
//!
//! Plays the role a browser DOM plays in production: a mutable node tree
//! that reports batched [`MutationRecord`]s to a single observer. Node
//! handles are allocated sequentially and never reused, even after
//! [`MemoryDocument::destroy`].

use crate::document::{HostDocument, NodeId, NodeKind, Viewport};
use crate::mutation::{MutationKind, MutationRecord, MutationSource, ObserveOptions};

const HIGHLIGHT_CLASS: &str = "ctn-message-highlight";

#[derive(Debug)]
struct MemoryNode {
    kind: NodeKind,
    tag: String,
    attributes: Vec<(String, String)>,
    text: String,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    alive: bool,
}

impl MemoryNode {
    fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element,
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
            text: String::new(),
            parent: None,
            children: Vec::new(),
            alive: true,
        }
    }

    fn text(text: &str) -> Self {
        Self {
            kind: NodeKind::Text,
            tag: String::new(),
            attributes: Vec::new(),
            text: text.to_string(),
            parent: None,
            children: Vec::new(),
            alive: true,
        }
    }
}

#[derive(Debug)]
struct Observation {
    root: NodeId,
    options: ObserveOptions,
    records: Vec<MutationRecord>,
}

#[derive(Debug)]
pub struct MemoryDocument {
    nodes: Vec<MemoryNode>,
    root: NodeId,
    observation: Option<Observation>,
    scrolled: Vec<NodeId>,
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDocument {
    /// Creates a document whose root is an empty `body` element.
    pub fn new() -> Self {
        Self {
            nodes: vec![MemoryNode::element("body")],
            root: 0,
            observation: None,
            scrolled: Vec::new(),
        }
    }

    pub fn body(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.iter().filter(|n| n.alive).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(MemoryNode::element(tag));
        self.nodes.len() - 1
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.nodes.push(MemoryNode::text(text));
        self.nodes.len() - 1
    }

    /// Creates an element with attributes and appends it to `parent`.
    pub fn append_element(&mut self, parent: NodeId, tag: &str, attributes: &[(&str, &str)]) -> NodeId {
        let node = self.create_element(tag);
        if let Some(entry) = self.nodes.get_mut(node) {
            entry.attributes = attributes
                .iter()
                .map(|(name, value)| (name.to_ascii_lowercase(), value.to_string()))
                .collect();
        }
        self.append_child(parent, node);
        node
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        let node = self.create_text(text);
        self.append_child(parent, node);
        node
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        let index = self.nodes.get(parent).map_or(0, |p| p.children.len());
        self.insert_child(parent, index, child);
    }

    /// Inserts `child` at `index` among `parent`'s children, moving it out
    /// of its previous parent first.
    pub fn insert_child(&mut self, parent: NodeId, index: usize, child: NodeId) {
        if parent == child || !self.is_live(parent) || !self.is_live(child) {
            return;
        }
        if self.is_inclusive_ancestor(child, parent) {
            return;
        }
        self.detach(child);
        let siblings = &mut self.nodes[parent].children;
        let index = index.min(siblings.len());
        siblings.insert(index, child);
        self.nodes[child].parent = Some(parent);
        self.record(MutationRecord::child_list(parent, vec![child], Vec::new()));
    }

    /// Removes the node from its parent. The node stays alive and keeps its
    /// handle so it can be reattached.
    pub fn detach(&mut self, node: NodeId) {
        let Some(parent) = self.nodes.get(node).and_then(|n| n.parent) else {
            return;
        };
        self.nodes[parent].children.retain(|&c| c != node);
        self.nodes[node].parent = None;
        self.record(MutationRecord::child_list(parent, Vec::new(), vec![node]));
    }

    /// Detaches the node and marks its whole subtree destroyed.
    pub fn destroy(&mut self, node: NodeId) {
        if node == self.root || !self.is_live(node) {
            return;
        }
        self.detach(node);
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            let entry = &mut self.nodes[current];
            entry.alive = false;
            stack.extend(entry.children.iter().copied());
        }
    }

    /// Replaces every child of `parent` in one record, destroying the old ones.
    pub fn replace_children(&mut self, parent: NodeId, children: Vec<NodeId>) {
        if !self.is_live(parent) {
            return;
        }
        let removed = std::mem::take(&mut self.nodes[parent].children);
        for &old in &removed {
            self.nodes[old].parent = None;
        }
        let mut added = Vec::with_capacity(children.len());
        for child in children {
            if child == parent || !self.is_live(child) || self.is_inclusive_ancestor(child, parent) {
                continue;
            }
            if let Some(previous) = self.nodes[child].parent {
                self.nodes[previous].children.retain(|&c| c != child);
            }
            self.nodes[child].parent = Some(parent);
            self.nodes[parent].children.push(child);
            added.push(child);
        }
        for &old in &removed {
            if self.nodes[old].parent.is_none() {
                self.destroy(old);
            }
        }
        if !added.is_empty() || !removed.is_empty() {
            self.record(MutationRecord::child_list(parent, added, removed));
        }
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        let Some(entry) = self.nodes.get_mut(node).filter(|n| n.kind == NodeKind::Element) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        match entry.attributes.iter().position(|(n, _)| *n == name) {
            Some(index) if entry.attributes[index].1 == value => return,
            Some(index) => entry.attributes[index].1 = value.to_string(),
            None => entry.attributes.push((name.clone(), value.to_string())),
        }
        self.record(MutationRecord::attribute(node, name));
    }

    pub fn remove_attribute(&mut self, node: NodeId, name: &str) {
        let Some(entry) = self.nodes.get_mut(node) else {
            return;
        };
        let name = name.to_ascii_lowercase();
        let before = entry.attributes.len();
        entry.attributes.retain(|(n, _)| *n != name);
        if entry.attributes.len() != before {
            self.record(MutationRecord::attribute(node, name));
        }
    }

    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if self.has_class(node, class) == on {
            return;
        }
        let current = self.attribute(node, "class").unwrap_or_default();
        let mut classes: Vec<&str> = current.split_whitespace().filter(|c| *c != class).collect();
        if on {
            classes.push(class);
        }
        let joined = classes.join(" ");
        self.set_attribute(node, "class", &joined);
    }

    /// Replaces the character data of a text node.
    pub fn set_text(&mut self, node: NodeId, text: &str) {
        let Some(entry) = self.nodes.get_mut(node).filter(|n| n.kind == NodeKind::Text) else {
            return;
        };
        if entry.text == text {
            return;
        }
        entry.text = text.to_string();
        self.record(MutationRecord::character_data(node));
    }

    /// Appends to the character data of a text node, as a streaming writer does.
    pub fn push_text(&mut self, node: NodeId, more: &str) {
        let Some(entry) = self.nodes.get_mut(node).filter(|n| n.kind == NodeKind::Text) else {
            return;
        };
        entry.text.push_str(more);
        self.record(MutationRecord::character_data(node));
    }

    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, n)| n.alive && n.attributes.iter().any(|(k, v)| k == "id" && v == id))
            .map(|(index, _)| index)
    }

    /// Nodes scrolled into view, oldest first.
    pub fn scrolled(&self) -> &[NodeId] {
        &self.scrolled
    }

    pub fn is_attached(&self, node: NodeId) -> bool {
        self.is_inclusive_ancestor(self.root, node)
    }

    fn is_live(&self, node: NodeId) -> bool {
        self.nodes.get(node).map_or(false, |n| n.alive)
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(candidate) = current {
            if candidate == ancestor {
                return true;
            }
            current = self.nodes.get(candidate).and_then(|n| n.parent);
        }
        false
    }

    fn record(&mut self, record: MutationRecord) {
        let Some(observation) = self.observation.as_ref() else {
            return;
        };
        let in_scope = if observation.options.subtree {
            self.is_inclusive_ancestor(observation.root, record.target)
        } else {
            record.target == observation.root
        };
        if !in_scope {
            return;
        }
        let wanted = match &record.kind {
            MutationKind::CharacterData => observation.options.character_data,
            MutationKind::Attributes { name } => observation.options.reports_attribute(name),
            MutationKind::ChildList { .. } => observation.options.child_list,
        };
        if wanted {
            if let Some(observation) = self.observation.as_mut() {
                observation.records.push(record);
            }
        }
    }
}

impl HostDocument for MemoryDocument {
    fn root(&self) -> Option<NodeId> {
        Some(self.root)
    }

    fn kind(&self, node: NodeId) -> Option<NodeKind> {
        self.nodes.get(node).map(|n| n.kind)
    }

    fn tag_name(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .get(node)
            .filter(|n| n.kind == NodeKind::Element)
            .map(|n| n.tag.as_str())
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(node).and_then(|n| {
            n.attributes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .map(|(_, v)| v.as_str())
        })
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(|n| n.parent)
    }

    fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes.get(node).map_or(&[], |n| n.children.as_slice())
    }

    fn node_text(&self, node: NodeId) -> Option<&str> {
        self.nodes
            .get(node)
            .filter(|n| n.kind == NodeKind::Text)
            .map(|n| n.text.as_str())
    }

    fn is_alive(&self, node: NodeId) -> bool {
        self.is_live(node)
    }
}

impl MutationSource for MemoryDocument {
    fn observe(&mut self, root: NodeId, options: ObserveOptions) {
        self.observation = Some(Observation {
            root,
            options,
            records: Vec::new(),
        });
    }

    fn disconnect(&mut self) {
        self.observation = None;
    }

    fn is_observing(&self) -> bool {
        self.observation.is_some()
    }

    fn take_records(&mut self) -> Vec<MutationRecord> {
        self.observation
            .as_mut()
            .map(|observation| std::mem::take(&mut observation.records))
            .unwrap_or_default()
    }
}

impl Viewport for MemoryDocument {
    fn scroll_into_view(&mut self, node: NodeId) {
        if self.is_live(node) {
            self.scrolled.push(node);
        }
    }

    fn set_highlighted(&mut self, node: NodeId, highlighted: bool) {
        self.toggle_class(node, HIGHLIGHT_CLASS, highlighted);
    }
}

#[cfg(test)]
#[path = "tests/memory_tests.rs"]
mod tests;
