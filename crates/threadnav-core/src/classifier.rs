//! Classification of raw host mutation batches.
//!
//! Runs synchronously on every delivered batch and only reads the host
//! document; writing from here would feed new records back into the
//! observer.

use crate::collections::map::HashSet;
use crate::document::{HostDocument, NodeId};
use crate::identity::{IdentityAssigner, MessageId};
use crate::mutation::{MutationKind, MutationRecord};
use crate::selector::Selector;

/// Recognises the overlay's own elements in the host document.
#[derive(Clone, Debug)]
pub struct OverlayMarkers {
    /// Elements that are overlay roots themselves.
    roots: Selector,
    /// Elements whose whole subtree belongs to the overlay.
    scopes: Selector,
}

impl OverlayMarkers {
    pub fn new(roots: Selector, scopes: Selector) -> Self {
        Self { roots, scopes }
    }

    /// Whether `node` (or, for text, its parent element) belongs to the overlay.
    pub fn contains<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeId) -> bool {
        let Some(element) = doc.element_for(node) else {
            return false;
        };
        self.roots.matches(doc, element) || doc.closest(element, &self.scopes).is_some()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Classification {
    pub relevant: bool,
    pub text_changed: bool,
    pub dirty: HashSet<MessageId>,
}

impl Classification {
    pub fn irrelevant() -> Self {
        Self::default()
    }
}

#[derive(Clone, Debug)]
pub struct MutationClassifier {
    containers: Selector,
    overlay: OverlayMarkers,
}

impl MutationClassifier {
    pub fn new(containers: Selector, overlay: OverlayMarkers) -> Self {
        Self { containers, overlay }
    }

    pub fn overlay(&self) -> &OverlayMarkers {
        &self.overlay
    }

    pub fn classify<D: HostDocument + ?Sized>(
        &self,
        doc: &D,
        identities: &IdentityAssigner,
        batch: &[MutationRecord],
    ) -> Classification {
        let mut result = Classification::default();
        for record in batch {
            if self.overlay.contains(doc, record.target) {
                continue;
            }
            match &record.kind {
                MutationKind::CharacterData => {
                    let Some(parent) = doc.element_for(record.target) else {
                        continue;
                    };
                    if doc.closest(parent, &self.containers).is_none() {
                        continue;
                    }
                    result.relevant = true;
                    result.text_changed = true;
                    if let Some(id) = identities.enclosing_identity(doc, parent) {
                        result.dirty.insert(id.clone());
                    }
                }
                MutationKind::Attributes { .. } => {
                    if doc.is_element(record.target)
                        && doc.closest(record.target, &self.containers).is_some()
                    {
                        result.relevant = true;
                    }
                }
                MutationKind::ChildList { added, removed } => {
                    let touches_host = added
                        .iter()
                        .chain(removed.iter())
                        .any(|&node| doc.is_element(node) && !self.overlay.contains(doc, node));
                    if !touches_host {
                        continue;
                    }
                    result.relevant = true;
                    if let Some(id) = identities.enclosing_identity(doc, record.target) {
                        result.dirty.insert(id.clone());
                    }
                }
            }
        }
        log::trace!(
            "classified {} records: relevant={} text={} dirty={}",
            batch.len(),
            result.relevant,
            result.text_changed,
            result.dirty.len()
        );
        result
    }
}

#[cfg(test)]
#[path = "tests/classifier_tests.rs"]
mod tests;
