use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use threadnav_core::{
    Clock, ConfigError, DisplayMode, FrameScheduler, HostDocument, MessageId, MutationSource,
    NavigatorConfig, NodeId, PerfStats, ReconcileOutcome, ReconciliationContext, RenderTarget,
    TimerId, Viewport,
};
use threadnav_runtime_std::{HostLoop, ManualClock, StdClock};
use threadnav_ui::{format_stats, PanelChrome};

/// Wires a host document, the std event loop, the reconciliation context
/// and a render target together, and turns user input into engine calls.
///
/// The host calls [`update`](Self::update) whenever its loop wakes; the
/// shell delivers pending mutation records, fires due timers and paints
/// requested frames.
pub struct NavigatorShell<D, T, C = StdClock>
where
    D: HostDocument + MutationSource + Viewport,
    T: RenderTarget + PanelChrome,
    C: Clock,
{
    document: Rc<RefCell<D>>,
    target: T,
    runtime: HostLoop<C>,
    context: ReconciliationContext,
    highlight_for: Duration,
    highlight: Option<(TimerId, NodeId)>,
    observing: bool,
}

impl<D, T, C> NavigatorShell<D, T, C>
where
    D: HostDocument + MutationSource + Viewport,
    T: RenderTarget + PanelChrome,
    C: Clock,
{
    pub fn new(
        document: Rc<RefCell<D>>,
        mut target: T,
        clock: C,
        config: &NavigatorConfig,
    ) -> Result<Self, ConfigError> {
        let resolved = config.resolve()?;
        if let Err(err) = target.set_collapsed(resolved.start_collapsed) {
            log::error!("initial panel state failed: {err}");
        }
        Ok(Self {
            document,
            target,
            runtime: HostLoop::new(clock),
            highlight_for: resolved.highlight,
            context: ReconciliationContext::with_resolved(resolved),
            highlight: None,
            observing: false,
        })
    }

    /// Starts observing the conversation and schedules the first render.
    /// Returns the observed root, or `None` for a document with no root.
    pub fn start(&mut self) -> Option<NodeId> {
        let root = {
            let doc = self.document.borrow();
            self.context.observe_root(&*doc)
        };
        let Some(root) = root else {
            log::warn!("document has no root to observe");
            return None;
        };
        self.document
            .borrow_mut()
            .observe(root, self.context.observe_options());
        self.observing = true;
        self.context.schedule_immediate(&self.runtime);
        log::debug!("observing node {root}");
        Some(root)
    }

    pub fn is_observing(&self) -> bool {
        self.observing
    }

    /// Whether a call to [`update`](Self::update) has anything to do.
    pub fn should_update(&self) -> bool {
        self.runtime.take_frame_request()
            || self.runtime.has_pending_work()
            || !self.context.notifier().is_empty()
    }

    pub fn update(&mut self) {
        self.deliver_records();
        for timer in self.runtime.due_timers() {
            if self.highlight.is_some_and(|(armed, _)| armed == timer) {
                self.clear_highlight();
            } else {
                self.context.on_timer(&self.runtime, timer);
            }
        }
        for frame in self.runtime.take_frames() {
            if self.context.on_frame(frame) {
                self.render();
            }
        }
        // Our own draws land here and are classified as overlay noise.
        self.deliver_records();
    }

    /// Schedules a refresh at the next paint opportunity.
    pub fn refresh_now(&mut self) {
        self.context.schedule_immediate(&self.runtime);
    }

    pub fn set_mode(&mut self, mode: DisplayMode) {
        if self.context.mode() != mode {
            log::debug!("display mode -> {}", mode.as_str());
        }
        self.context.set_mode(mode, &self.runtime);
    }

    pub fn mode(&self) -> DisplayMode {
        self.context.mode()
    }

    pub fn toggle_collapsed(&mut self) {
        let collapsed = !self.target.panel_state().collapsed;
        self.set_collapsed(collapsed);
    }

    /// Collapsing redraws the dot list from the last located messages.
    pub fn set_collapsed(&mut self, collapsed: bool) {
        if let Err(err) = self.target.set_collapsed(collapsed) {
            log::error!("collapse toggle failed: {err}");
            return;
        }
        if !collapsed {
            return;
        }
        let entries = {
            let doc = self.document.borrow();
            self.context.prepare_collapsed(&*doc)
        };
        if let Err(err) = self.context.commit_collapsed(&entries, &mut self.target) {
            log::error!("collapsed list render failed: {err}");
        }
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        if let Err(err) = self.target.set_hidden(hidden) {
            log::error!("hide toggle failed: {err}");
        }
        self.context.set_hidden(hidden, &self.runtime);
    }

    pub fn is_hidden(&self) -> bool {
        self.context.is_hidden()
    }

    pub fn set_debug(&mut self, debug: bool) {
        if let Err(err) = self.target.set_debug(debug) {
            log::error!("debug toggle failed: {err}");
        }
        if debug {
            log::debug!(
                "{}",
                format_stats(&self.context.stats(), self.context.last_key())
            );
        }
    }

    /// Scrolls to the message behind `id` and highlights it for a moment.
    /// Returns `false` when the identity no longer resolves to a live node.
    pub fn activate(&mut self, id: &MessageId) -> bool {
        let Some(node) = self.context.resolve(id) else {
            return false;
        };
        if !self.document.borrow().is_alive(node) {
            return false;
        }
        self.clear_highlight();
        {
            let mut doc = self.document.borrow_mut();
            doc.scroll_into_view(node);
            doc.set_highlighted(node, true);
        }
        let timer = self.runtime.arm_timer(self.highlight_for);
        self.highlight = Some((timer, node));
        true
    }

    pub fn highlighted(&self) -> Option<NodeId> {
        self.highlight.map(|(_, node)| node)
    }

    pub fn stats(&self) -> PerfStats {
        self.context.stats()
    }

    pub fn reset_stats(&mut self) {
        self.context.reset_stats();
    }

    pub fn context(&self) -> &ReconciliationContext {
        &self.context
    }

    pub fn runtime(&self) -> &HostLoop<C> {
        &self.runtime
    }

    pub fn document(&self) -> &Rc<RefCell<D>> {
        &self.document
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn target_mut(&mut self) -> &mut T {
        &mut self.target
    }

    /// Stops observing, cancels scheduled work and drops engine state.
    /// The shell can be started again afterwards.
    pub fn teardown(&mut self) {
        self.clear_highlight();
        {
            let mut doc = self.document.borrow_mut();
            doc.disconnect();
            doc.take_records();
        }
        self.context.teardown(&self.runtime);
        // The context comes back shown; keep the chrome in step.
        if self.target.panel_state().hidden {
            if let Err(err) = self.target.set_hidden(false) {
                log::error!("hide toggle failed: {err}");
            }
        }
        self.observing = false;
    }

    fn render(&mut self) {
        let prepared = {
            let doc = self.document.borrow();
            self.context.prepare(&*doc)
        };
        match self.context.commit(prepared, &mut self.target) {
            Ok(ReconcileOutcome::Skipped) => {}
            Ok(outcome) => log::trace!("render pass: {outcome:?}"),
            Err(err) => log::error!("navigator render failed: {err}"),
        }
    }

    fn deliver_records(&mut self) {
        let records = self.document.borrow_mut().take_records();
        if records.is_empty() {
            return;
        }
        {
            let doc = self.document.borrow();
            self.context.deliver(&*doc, &records);
        }
        self.context.pump(&self.runtime);
    }

    fn clear_highlight(&mut self) {
        if let Some((timer, node)) = self.highlight.take() {
            self.runtime.disarm_timer(timer);
            self.document.borrow_mut().set_highlighted(node, false);
        }
    }
}

impl<D, T> NavigatorShell<D, T, ManualClock>
where
    D: HostDocument + MutationSource + Viewport,
    T: RenderTarget + PanelChrome,
{
    /// Moves the manual clock forward and runs one update.
    pub fn advance(&mut self, by: Duration) {
        self.runtime.clock().advance(by);
        self.update();
    }

    /// Runs until no timers or frames remain, jumping the clock to each
    /// deadline in turn.
    pub fn settle(&mut self) {
        self.update();
        while let Some(wait) = self.runtime.next_deadline() {
            self.advance(wait);
        }
    }
}
