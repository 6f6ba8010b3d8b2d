use crate::document::{HostDocument, NodeId};
use crate::selector::Selector;

/// Finds message elements with an ordered list of strategies.
///
/// The first strategy that matches anything becomes active and is queried
/// alone on later calls. When the active strategy comes back empty the
/// cache is dropped and the scan restarts from the most specific strategy.
#[derive(Clone, Debug)]
pub struct NodeLocator {
    strategies: Vec<Selector>,
    active: Option<usize>,
}

impl NodeLocator {
    pub fn new(strategies: Vec<Selector>) -> Self {
        Self {
            strategies,
            active: None,
        }
    }

    pub fn strategies(&self) -> &[Selector] {
        &self.strategies
    }

    pub fn active_strategy(&self) -> Option<&Selector> {
        self.active.and_then(|index| self.strategies.get(index))
    }

    /// Current message nodes in document order; empty when nothing matches.
    pub fn locate<D: HostDocument + ?Sized>(&mut self, doc: &D) -> Vec<NodeId> {
        if let Some(selector) = self.active_strategy() {
            let nodes = doc.query_all(selector);
            if !nodes.is_empty() {
                return nodes;
            }
            log::warn!("message strategy `{selector}` stopped matching; rescanning");
            self.active = None;
        }

        for (index, selector) in self.strategies.iter().enumerate() {
            let nodes = doc.query_all(selector);
            if !nodes.is_empty() {
                log::debug!("message strategy `{selector}` active ({} nodes)", nodes.len());
                self.active = Some(index);
                return nodes;
            }
        }
        Vec::new()
    }

    pub fn reset(&mut self) {
        self.active = None;
    }
}

#[cfg(test)]
#[path = "tests/locator_tests.rs"]
mod tests;
