//! Render targets for the thread navigator.
//!
//! [`RecordingRenderTarget`] keeps its output as plain data for tests and
//! headless hosts; [`DocumentRenderTarget`] draws the panel into the host
//! document under the overlay markers the mutation classifier skips.

mod chrome;
mod debug;
mod document_target;
mod recording;

pub use chrome::{PanelChrome, PanelState};
pub use debug::{format_panel, format_stats, log_panel};
pub use document_target::{DocumentRenderTarget, DOT_CLASS, IDENTITY_ATTRIBUTE, ITEM_CLASS};
pub use recording::{PanelSnapshot, RecordingRenderTarget, RenderOp, RenderedEntry};
