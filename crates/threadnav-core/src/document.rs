//! Read-only view of the host document.
//!
//! The engine never owns host nodes. It addresses them through opaque
//! [`NodeId`] handles and reads structure, attributes and text through the
//! [`HostDocument`] trait. Hosts must never hand out the same handle for two
//! different physical nodes; a detached node keeps its handle.

use crate::selector::Selector;

pub type NodeId = usize;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Text,
}

/// Author of a message turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Role {
    User,
    Assistant,
    Unknown,
}

impl Role {
    pub fn from_attribute(value: Option<&str>) -> Self {
        match value {
            Some("user") => Role::User,
            Some("assistant") => Role::Assistant,
            _ => Role::Unknown,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

pub trait HostDocument {
    /// Topmost element, usually `body`.
    fn root(&self) -> Option<NodeId>;

    /// Returns `None` for handles the host never issued.
    fn kind(&self, node: NodeId) -> Option<NodeKind>;

    /// Lower-case tag name for elements.
    fn tag_name(&self, node: NodeId) -> Option<&str>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<&str>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    fn children(&self, node: NodeId) -> &[NodeId];

    /// Character data of a text node.
    fn node_text(&self, node: NodeId) -> Option<&str>;

    /// `false` once the host has destroyed the node. Detached nodes are alive.
    fn is_alive(&self, node: NodeId) -> bool;

    fn is_element(&self, node: NodeId) -> bool {
        self.kind(node) == Some(NodeKind::Element)
    }

    /// The node itself when it is an element, otherwise its parent element.
    fn element_for(&self, node: NodeId) -> Option<NodeId> {
        match self.kind(node)? {
            NodeKind::Element => Some(node),
            NodeKind::Text => self.parent(node).filter(|&p| self.is_element(p)),
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.attribute(node, "class")
            .map(|classes| classes.split_whitespace().any(|c| c == class))
            .unwrap_or(false)
    }

    /// Concatenated character data of the node and its descendants.
    fn text_content(&self, node: NodeId) -> String {
        let mut out = String::new();
        collect_text(self, node, &mut out);
        out
    }

    fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector.matches(self, node)
    }

    /// Nearest inclusive ancestor matching `selector`.
    fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut current = self.element_for(node);
        while let Some(candidate) = current {
            if selector.matches(self, candidate) {
                return Some(candidate);
            }
            current = self.parent(candidate);
        }
        None
    }

    /// First descendant element matching `selector`, in document order.
    fn query_first(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        let mut stack: Vec<NodeId> = self.children(scope).iter().rev().copied().collect();
        while let Some(node) = stack.pop() {
            if self.is_element(node) {
                if selector.matches(self, node) {
                    return Some(node);
                }
                stack.extend(self.children(node).iter().rev().copied());
            }
        }
        None
    }

    /// Every attached element matching `selector`, in document order.
    fn query_all(&self, selector: &Selector) -> Vec<NodeId> {
        let Some(root) = self.root() else {
            return Vec::new();
        };
        let mut found = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if !self.is_element(node) {
                continue;
            }
            if selector.matches(self, node) {
                found.push(node);
            }
            stack.extend(self.children(node).iter().rev().copied());
        }
        found
    }
}

fn collect_text<D: HostDocument + ?Sized>(doc: &D, node: NodeId, out: &mut String) {
    match doc.kind(node) {
        Some(NodeKind::Text) => {
            if let Some(text) = doc.node_text(node) {
                out.push_str(text);
            }
        }
        Some(NodeKind::Element) => {
            for &child in doc.children(node) {
                collect_text(doc, child, out);
            }
        }
        None => {}
    }
}

/// Host capabilities used when the user jumps to a message.
pub trait Viewport {
    fn scroll_into_view(&mut self, node: NodeId);
    fn set_highlighted(&mut self, node: NodeId, highlighted: bool);
}

/// Attribute naming a message's author, e.g. `data-message-author-role`.
#[derive(Clone, Debug)]
pub struct RoleAttribute {
    name: String,
    selector: Selector,
}

impl RoleAttribute {
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        let selector = Selector::has_attribute(&name);
        Self { name, selector }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The node's own role attribute, else the first descendant carrying one.
    pub fn role_of<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeId) -> Role {
        let holder = if doc.matches(node, &self.selector) {
            Some(node)
        } else {
            doc.query_first(node, &self.selector)
        };
        holder
            .map(|holder| Role::from_attribute(doc.attribute(holder, &self.name)))
            .unwrap_or(Role::Unknown)
    }
}

/// Text content with whitespace runs collapsed and the ends trimmed.
pub fn message_text<D: HostDocument + ?Sized>(doc: &D, node: NodeId) -> String {
    normalize_whitespace(&doc.text_content(node))
}

pub fn normalize_whitespace(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for word in raw.split_whitespace() {
        if !out.is_empty() {
            out.push(' ');
        }
        out.push_str(word);
    }
    out
}
