use crate::document::{HostDocument, NodeId};

/// One entry of a batched host change notification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeId,
    pub kind: MutationKind,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationKind {
    /// Character data of the target text node changed.
    CharacterData,
    /// An attribute on the target element changed.
    Attributes { name: String },
    /// Children of the target were inserted or removed.
    ChildList {
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
}

impl MutationRecord {
    pub fn character_data(target: NodeId) -> Self {
        Self {
            target,
            kind: MutationKind::CharacterData,
        }
    }

    pub fn attribute(target: NodeId, name: impl Into<String>) -> Self {
        Self {
            target,
            kind: MutationKind::Attributes { name: name.into() },
        }
    }

    pub fn child_list(target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) -> Self {
        Self {
            target,
            kind: MutationKind::ChildList { added, removed },
        }
    }
}

/// What a host should report; mirrors a DOM observer's init dictionary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ObserveOptions {
    pub child_list: bool,
    pub attributes: bool,
    pub character_data: bool,
    pub subtree: bool,
    /// When set, only these attribute names are reported.
    pub attribute_filter: Option<Vec<String>>,
}

impl Default for ObserveOptions {
    fn default() -> Self {
        Self {
            child_list: true,
            attributes: true,
            character_data: true,
            subtree: true,
            attribute_filter: None,
        }
    }
}

impl ObserveOptions {
    pub fn reports_attribute(&self, name: &str) -> bool {
        self.attributes
            && self
                .attribute_filter
                .as_ref()
                .map_or(true, |filter| filter.iter().any(|allowed| allowed == name))
    }
}

/// A host that buffers change records for an observed subtree.
///
/// Records accumulate between calls to [`take_records`](Self::take_records);
/// delivering them is the host's batching boundary.
pub trait MutationSource: HostDocument {
    fn observe(&mut self, root: NodeId, options: ObserveOptions);
    fn disconnect(&mut self);
    fn is_observing(&self) -> bool;
    fn take_records(&mut self) -> Vec<MutationRecord>;
}
