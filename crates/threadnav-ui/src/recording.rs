use indexmap::IndexMap;
use threadnav_core::{
    DisplayText, DotHandle, EntryHandles, ListHandle, MessageId, RenderEntry, RenderError,
    RenderTarget, Role,
};

use crate::chrome::{PanelChrome, PanelState};

/// An operation recorded by [`RecordingRenderTarget`], in submission order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderOp {
    RebuildList { entries: usize },
    RebuildCollapsed { entries: usize },
    Patch { identity: MessageId, title: String },
    Chrome(PanelState),
}

/// One drawn list row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderedEntry {
    pub role: Role,
    pub display_index: usize,
    pub text: DisplayText,
}

/// Plain-data view of what the navigator currently shows.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PanelSnapshot {
    pub entries: Vec<(MessageId, RenderedEntry)>,
    pub dots: Vec<(MessageId, String)>,
}

impl PanelSnapshot {
    pub fn titles(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|(_, entry)| entry.text.title.as_str())
            .collect()
    }
}

/// A headless render target that keeps its output as data.
///
/// Handles are positions in insertion order, so a patch resolves in O(1)
/// and a stale handle is detected by comparing identities.
#[derive(Debug, Default)]
pub struct RecordingRenderTarget {
    entries: IndexMap<MessageId, RenderedEntry>,
    dots: IndexMap<MessageId, String>,
    operations: Vec<RenderOp>,
    state: PanelState,
}

impl RecordingRenderTarget {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a slice of recorded operations in submission order.
    pub fn operations(&self) -> &[RenderOp] {
        &self.operations
    }

    pub fn clear_operations(&mut self) {
        self.operations.clear();
    }

    pub fn entry(&self, identity: &MessageId) -> Option<&RenderedEntry> {
        self.entries.get(identity)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn full_rebuilds(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, RenderOp::RebuildList { .. }))
            .count()
    }

    pub fn patches(&self) -> usize {
        self.operations
            .iter()
            .filter(|op| matches!(op, RenderOp::Patch { .. }))
            .count()
    }

    pub fn snapshot(&self) -> PanelSnapshot {
        PanelSnapshot {
            entries: self
                .entries
                .iter()
                .map(|(id, entry)| (id.clone(), entry.clone()))
                .collect(),
            dots: self
                .dots
                .iter()
                .map(|(id, preview)| (id.clone(), preview.clone()))
                .collect(),
        }
    }

    fn record_chrome(&mut self) {
        self.operations.push(RenderOp::Chrome(self.state));
    }
}

impl RenderTarget for RecordingRenderTarget {
    fn rebuild_list(&mut self, entries: &[RenderEntry]) -> Result<Vec<ListHandle>, RenderError> {
        self.entries = entries
            .iter()
            .map(|entry| {
                (
                    entry.identity.clone(),
                    RenderedEntry {
                        role: entry.role,
                        display_index: entry.display_index,
                        text: entry.text.clone(),
                    },
                )
            })
            .collect();
        self.operations.push(RenderOp::RebuildList {
            entries: entries.len(),
        });
        Ok((0..self.entries.len()).map(ListHandle).collect())
    }

    fn rebuild_collapsed(&mut self, entries: &[RenderEntry]) -> Result<Vec<DotHandle>, RenderError> {
        self.dots = entries
            .iter()
            .map(|entry| (entry.identity.clone(), entry.text.preview.clone()))
            .collect();
        self.operations.push(RenderOp::RebuildCollapsed {
            entries: entries.len(),
        });
        Ok((0..self.dots.len()).map(DotHandle).collect())
    }

    fn patch_entry(
        &mut self,
        identity: &MessageId,
        handles: &EntryHandles,
        text: &DisplayText,
    ) -> Result<(), RenderError> {
        let missing = || RenderError::MissingHandle {
            identity: identity.clone(),
        };
        let ListHandle(index) = handles.list.ok_or_else(missing)?;
        match self.entries.get_index_mut(index) {
            Some((id, entry)) if id == identity => entry.text = text.clone(),
            _ => return Err(missing()),
        }
        if let Some(DotHandle(index)) = handles.dot {
            if let Some((id, preview)) = self.dots.get_index_mut(index) {
                if id == identity {
                    *preview = text.preview.clone();
                }
            }
        }
        self.operations.push(RenderOp::Patch {
            identity: identity.clone(),
            title: text.title.clone(),
        });
        Ok(())
    }
}

impl PanelChrome for RecordingRenderTarget {
    fn set_collapsed(&mut self, collapsed: bool) -> Result<(), RenderError> {
        self.state.collapsed = collapsed;
        self.record_chrome();
        Ok(())
    }

    fn set_hidden(&mut self, hidden: bool) -> Result<(), RenderError> {
        self.state.hidden = hidden;
        self.record_chrome();
        Ok(())
    }

    fn set_debug(&mut self, debug: bool) -> Result<(), RenderError> {
        self.state.debug = debug;
        self.record_chrome();
        Ok(())
    }

    fn panel_state(&self) -> PanelState {
        self.state
    }
}

#[cfg(test)]
#[path = "tests/recording_tests.rs"]
mod tests;
