//! The reconciliation context: every piece of engine state in one value.
//!
//! Host-side code drives it through four entry points:
//!
//! 1. [`deliver`](ReconciliationContext::deliver) a mutation batch; it is
//!    classified on the spot and relevant changes are queued.
//! 2. [`pump`](ReconciliationContext::pump) the queue into the scheduler.
//! 3. Forward fired timers and frames to [`on_timer`] and [`on_frame`].
//! 4. When `on_frame` returns `true`, [`prepare`] against the document and
//!    [`commit`] into the render target.
//!
//! [`on_timer`]: ReconciliationContext::on_timer
//! [`on_frame`]: ReconciliationContext::on_frame
//! [`prepare`]: ReconciliationContext::prepare
//! [`commit`]: ReconciliationContext::commit

use crate::classifier::{Classification, MutationClassifier};
use crate::config::{ConfigError, NavigatorConfig, ResolvedConfig};
use crate::document::{HostDocument, NodeId};
use crate::identity::{IdentityAssigner, MessageId};
use crate::locator::NodeLocator;
use crate::mutation::{MutationRecord, ObserveOptions};
use crate::notifier::{ChangeEvent, ChangeQueue};
use crate::platform::{FrameId, FrameScheduler, TimerId};
use crate::reconciler::{DirtySet, ReconcileOutcome, Reconciler, RenderIndex, RenderPlan};
use crate::render_key::{DisplayMode, RenderKey};
use crate::render_target::{RenderEntry, RenderError, RenderTarget};
use crate::scheduler::{RenderScheduler, SchedulerState};

/// Counters exposed for debugging render behaviour.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct PerfStats {
    pub refreshes: u64,
    pub full_renders: u64,
    pub patches: u64,
}

/// Work produced by [`ReconciliationContext::prepare`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PreparedRefresh {
    /// Nothing located; nothing to do.
    Empty,
    /// Panel hidden; pending work was dropped.
    Suspended,
    Render(RenderPlan),
}

#[derive(Debug)]
pub struct ReconciliationContext {
    config: ResolvedConfig,
    locator: NodeLocator,
    identities: IdentityAssigner,
    classifier: MutationClassifier,
    queue: ChangeQueue,
    scheduler: RenderScheduler,
    reconciler: Reconciler,
    last_nodes: Vec<NodeId>,
    hidden: bool,
    stats: PerfStats,
}

impl ReconciliationContext {
    pub fn new(config: &NavigatorConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_resolved(config.resolve()?))
    }

    pub fn with_resolved(config: ResolvedConfig) -> Self {
        Self {
            locator: NodeLocator::new(config.strategies.clone()),
            identities: IdentityAssigner::new(config.identity_prefix.clone()),
            classifier: MutationClassifier::new(config.containers.clone(), config.overlay.clone()),
            queue: ChangeQueue::new(),
            scheduler: RenderScheduler::new(config.debounce),
            reconciler: Reconciler::new(
                config.initial_mode,
                config.roles.clone(),
                config.text_limits.clone(),
            ),
            last_nodes: Vec::new(),
            hidden: false,
            stats: PerfStats::default(),
            config,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn observe_options(&self) -> ObserveOptions {
        self.config.observe.clone()
    }

    /// Observation root: the configured element if present, else the document root.
    pub fn observe_root<D: HostDocument + ?Sized>(&self, doc: &D) -> Option<NodeId> {
        doc.query_all(&self.config.observe_root)
            .first()
            .copied()
            .or_else(|| doc.root())
    }

    /// Sending end of the change queue, for hosts that classify elsewhere.
    pub fn notifier(&self) -> ChangeQueue {
        self.queue.clone()
    }

    /// Classifies a delivered batch and queues it when relevant.
    /// Performs no writes to `doc`.
    pub fn deliver<D: HostDocument + ?Sized>(&self, doc: &D, batch: &[MutationRecord]) -> Classification {
        let classification = self.classifier.classify(doc, &self.identities, batch);
        if let Some(event) = classification.clone().into_event() {
            self.queue.push(event);
        }
        classification
    }

    /// Folds queued events into the dirty state and arms the debounce.
    /// Returns the number of events consumed.
    pub fn pump<S: FrameScheduler + ?Sized>(&mut self, host: &S) -> usize {
        let events = self.queue.drain();
        if events.is_empty() {
            return 0;
        }
        for ChangeEvent { text_changed, dirty } in &events {
            if *text_changed {
                self.reconciler.force_next();
            }
            self.reconciler.mark_dirty(dirty.iter().cloned());
        }
        self.scheduler.schedule_normal(host);
        events.len()
    }

    pub fn schedule_normal<S: FrameScheduler + ?Sized>(&mut self, host: &S) -> bool {
        self.scheduler.schedule_normal(host)
    }

    pub fn schedule_immediate<S: FrameScheduler + ?Sized>(&mut self, host: &S) {
        self.scheduler.schedule_immediate(host);
    }

    pub fn on_timer<S: FrameScheduler + ?Sized>(&mut self, host: &S, id: TimerId) -> bool {
        self.scheduler.on_timer(host, id)
    }

    /// `true` when the caller must refresh now.
    pub fn on_frame(&mut self, id: FrameId) -> bool {
        self.scheduler.on_frame(id)
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        self.scheduler.state()
    }

    /// Locates and identifies messages, then plans the render pass.
    pub fn prepare<D: HostDocument + ?Sized>(&mut self, doc: &D) -> PreparedRefresh {
        self.stats.refreshes += 1;
        let nodes = self.locator.locate(doc);
        if nodes.is_empty() {
            return PreparedRefresh::Empty;
        }
        self.identities.prune(doc);
        self.identities.ensure_identities(&nodes);
        self.last_nodes = nodes;
        if self.hidden {
            self.reconciler.suspend();
            return PreparedRefresh::Suspended;
        }
        let visible = self
            .reconciler
            .visible_set(doc, &self.identities, &self.last_nodes);
        PreparedRefresh::Render(self.reconciler.plan(doc, &visible))
    }

    pub fn commit<T: RenderTarget + ?Sized>(
        &mut self,
        prepared: PreparedRefresh,
        target: &mut T,
    ) -> Result<ReconcileOutcome, RenderError> {
        let PreparedRefresh::Render(plan) = prepared else {
            return Ok(ReconcileOutcome::Skipped);
        };
        let outcome = self.reconciler.apply(plan, target)?;
        match outcome {
            ReconcileOutcome::Rebuilt { .. } => self.stats.full_renders += 1,
            ReconcileOutcome::Patched { .. } => self.stats.patches += 1,
            ReconcileOutcome::Skipped => {}
        }
        Ok(outcome)
    }

    /// `prepare` + `commit` for targets that do not draw into `doc`.
    pub fn refresh<D, T>(&mut self, doc: &D, target: &mut T) -> Result<ReconcileOutcome, RenderError>
    where
        D: HostDocument + ?Sized,
        T: RenderTarget + ?Sized,
    {
        let prepared = self.prepare(doc);
        self.commit(prepared, target)
    }

    /// Switches mode and refreshes at the next paint opportunity.
    pub fn set_mode<S: FrameScheduler + ?Sized>(&mut self, mode: DisplayMode, host: &S) {
        self.reconciler.set_mode(mode);
        self.scheduler.schedule_immediate(host);
    }

    pub fn mode(&self) -> DisplayMode {
        self.reconciler.mode()
    }

    /// While hidden, refreshes locate and identify but do not render.
    /// Showing again schedules an immediate catch-up.
    pub fn set_hidden<S: FrameScheduler + ?Sized>(&mut self, hidden: bool, host: &S) {
        if self.hidden == hidden {
            return;
        }
        self.hidden = hidden;
        if !hidden {
            self.scheduler.schedule_immediate(host);
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    /// Rebuilds the collapsed-dot list from the last located nodes.
    pub fn prepare_collapsed<D: HostDocument + ?Sized>(&self, doc: &D) -> Vec<RenderEntry> {
        let visible = self
            .reconciler
            .visible_set(doc, &self.identities, &self.last_nodes);
        self.reconciler.entries(doc, &visible)
    }

    pub fn commit_collapsed<T: RenderTarget + ?Sized>(
        &mut self,
        entries: &[RenderEntry],
        target: &mut T,
    ) -> Result<(), RenderError> {
        self.reconciler.apply_collapsed(entries, target)
    }

    /// Host node currently carrying `id`.
    pub fn resolve(&self, id: &MessageId) -> Option<NodeId> {
        self.identities.node_of(id)
    }

    pub fn identities(&self) -> &IdentityAssigner {
        &self.identities
    }

    pub fn locator(&self) -> &NodeLocator {
        &self.locator
    }

    pub fn last_nodes(&self) -> &[NodeId] {
        &self.last_nodes
    }

    pub fn last_key(&self) -> Option<&RenderKey> {
        self.reconciler.last_key()
    }

    pub fn dirty(&self) -> &DirtySet {
        self.reconciler.dirty()
    }

    pub fn is_forced(&self) -> bool {
        self.reconciler.is_forced()
    }

    pub fn render_index(&self) -> &RenderIndex {
        self.reconciler.index()
    }

    pub fn reconciler(&self) -> &Reconciler {
        &self.reconciler
    }

    pub fn stats(&self) -> PerfStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = PerfStats::default();
    }

    /// Cancels scheduled work and drops all per-overlay state.
    pub fn teardown<S: FrameScheduler + ?Sized>(&mut self, host: &S) {
        self.scheduler.cancel(host);
        self.queue.clear();
        self.reconciler.reset();
        self.identities.clear();
        self.locator.reset();
        self.last_nodes.clear();
        self.hidden = false;
        self.stats = PerfStats::default();
        log::debug!("reconciliation context torn down");
    }
}

#[cfg(test)]
#[path = "tests/context_tests.rs"]
mod tests;
