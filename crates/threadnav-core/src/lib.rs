#![doc = r"Reconciliation engine for the thread navigator overlay."]
//!
//! The engine indexes message nodes in a host document that mutates under
//! it, gives each one a stable identity, and decides on every observed
//! change whether the navigator needs a full rebuild, a text patch, or
//! nothing. Rendering is throttled by a two-stage debounce so streaming
//! text never saturates the host's paint pipeline.
//!
//! Everything runs on the host's single UI thread; state lives in a
//! [`ReconciliationContext`] and no type here is `Send`.

pub mod classifier;
pub mod collections;
pub mod config;
pub mod context;
pub mod document;
pub mod identity;
pub mod locator;
pub mod memory;
pub mod mutation;
pub mod notifier;
pub mod platform;
pub mod reconciler;
pub mod render_key;
pub mod render_target;
pub mod scheduler;
pub mod selector;
pub mod text;

pub use classifier::{Classification, MutationClassifier, OverlayMarkers};
pub use config::{ConfigError, NavigatorConfig, ResolvedConfig, DEFAULT_DEBOUNCE, DEFAULT_HIGHLIGHT};
pub use context::{PerfStats, PreparedRefresh, ReconciliationContext};
pub use document::{
    message_text, normalize_whitespace, HostDocument, NodeId, NodeKind, Role, RoleAttribute, Viewport,
};
pub use identity::{IdentityAssigner, MessageId};
pub use locator::NodeLocator;
pub use memory::MemoryDocument;
pub use mutation::{MutationKind, MutationRecord, MutationSource, ObserveOptions};
pub use notifier::{ChangeEvent, ChangeNotifier, ChangeQueue};
pub use platform::{Clock, FrameId, FrameScheduler, TimerId};
pub use reconciler::{DirtySet, ReconcileOutcome, Reconciler, RenderIndex, RenderPlan, VisibleMessage};
pub use render_key::{DisplayMode, RenderKey};
pub use render_target::{DotHandle, EntryHandles, ListHandle, RenderEntry, RenderError, RenderTarget};
pub use scheduler::{RenderScheduler, SchedulerState};
pub use selector::{Selector, SelectorError, SelectorErrorKind};
pub use text::{DisplayText, TextLimits};

#[cfg(test)]
pub(crate) mod test_support;
