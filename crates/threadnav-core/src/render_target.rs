use std::fmt;

use crate::document::Role;
use crate::identity::MessageId;
use crate::text::DisplayText;

/// Handle of a list entry produced by the last full rebuild.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ListHandle(pub usize);

/// Handle of a collapsed-dot entry produced by the last full rebuild.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct DotHandle(pub usize);

/// One visible message, ready to be drawn.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RenderEntry {
    pub identity: MessageId,
    pub role: Role,
    /// 1-based position in the visible set.
    pub display_index: usize,
    pub text: DisplayText,
}

/// Rendering-target handles recorded for one identity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EntryHandles {
    pub list: Option<ListHandle>,
    pub dot: Option<DotHandle>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderError {
    /// The target has no surface to draw into.
    NotMounted,
    /// A handle did not resolve to an entry owned by the target.
    MissingHandle { identity: MessageId },
    /// The target returned a different number of handles than entries.
    HandleCount { expected: usize, actual: usize },
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::NotMounted => write!(f, "render target is not mounted"),
            RenderError::MissingHandle { identity } => {
                write!(f, "no rendered entry for message {identity}")
            }
            RenderError::HandleCount { expected, actual } => {
                write!(f, "render target returned {actual} handles for {expected} entries")
            }
        }
    }
}

impl std::error::Error for RenderError {}

/// The list/preview surface the reconciler writes into.
///
/// Only the reconciler calls these methods. Rebuilds return one handle per
/// entry, in order.
pub trait RenderTarget {
    fn rebuild_list(&mut self, entries: &[RenderEntry]) -> Result<Vec<ListHandle>, RenderError>;

    fn rebuild_collapsed(&mut self, entries: &[RenderEntry]) -> Result<Vec<DotHandle>, RenderError>;

    /// Updates the text of an existing entry in place.
    fn patch_entry(
        &mut self,
        identity: &MessageId,
        handles: &EntryHandles,
        text: &DisplayText,
    ) -> Result<(), RenderError>;
}

impl<T: RenderTarget + ?Sized> RenderTarget for &mut T {
    fn rebuild_list(&mut self, entries: &[RenderEntry]) -> Result<Vec<ListHandle>, RenderError> {
        (**self).rebuild_list(entries)
    }

    fn rebuild_collapsed(&mut self, entries: &[RenderEntry]) -> Result<Vec<DotHandle>, RenderError> {
        (**self).rebuild_collapsed(entries)
    }

    fn patch_entry(
        &mut self,
        identity: &MessageId,
        handles: &EntryHandles,
        text: &DisplayText,
    ) -> Result<(), RenderError> {
        (**self).patch_entry(identity, handles, text)
    }
}
