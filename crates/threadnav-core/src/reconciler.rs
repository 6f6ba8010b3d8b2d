//! Decides between no-op, full rebuild and dirty-only patch.
//!
//! | force | key changed | action                     |
//! |-------|-------------|----------------------------|
//! | no    | no          | nothing                    |
//! | no    | yes         | full rebuild               |
//! | yes   | no          | patch dirty entries (all when none are dirty) |
//! | yes   | yes         | full rebuild               |
//!
//! Planning only reads the host document and applying only writes to the
//! render target, so a target that draws into the same document can be
//! used without overlapping borrows.

use crate::collections::map::{HashMap, HashSet};
use crate::document::{message_text, HostDocument, NodeId, Role, RoleAttribute};
use crate::identity::{IdentityAssigner, MessageId};
use crate::render_key::{DisplayMode, RenderKey};
use crate::render_target::{EntryHandles, RenderEntry, RenderError, RenderTarget};
use crate::text::{DisplayText, TextLimits};

/// A message admitted by the current display mode.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VisibleMessage {
    pub node: NodeId,
    pub identity: MessageId,
    pub role: Role,
}

/// Identities whose text changed since the last render pass.
#[derive(Clone, Debug, Default)]
pub struct DirtySet {
    ids: HashSet<MessageId>,
}

impl DirtySet {
    pub fn insert(&mut self, id: MessageId) -> bool {
        self.ids.insert(id)
    }

    pub fn contains(&self, id: &MessageId) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &MessageId> {
        self.ids.iter()
    }
}

impl Extend<MessageId> for DirtySet {
    fn extend<I: IntoIterator<Item = MessageId>>(&mut self, iter: I) {
        self.ids.extend(iter);
    }
}

/// Render-target handles from the last full rebuild, keyed by identity.
#[derive(Clone, Debug, Default)]
pub struct RenderIndex {
    entries: HashMap<MessageId, EntryHandles>,
}

impl RenderIndex {
    pub fn get(&self, id: &MessageId) -> Option<&EntryHandles> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    fn insert(&mut self, id: MessageId, handles: EntryHandles) {
        self.entries.insert(id, handles);
    }

    fn entry(&mut self, id: MessageId) -> &mut EntryHandles {
        self.entries.entry(id).or_default()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RenderPlan {
    Skip,
    Rebuild { key: RenderKey, entries: Vec<RenderEntry> },
    Patch { updates: Vec<(MessageId, DisplayText)> },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ReconcileOutcome {
    Skipped,
    Rebuilt { entries: usize },
    Patched { entries: usize },
}

#[derive(Debug)]
pub struct Reconciler {
    mode: DisplayMode,
    roles: RoleAttribute,
    limits: TextLimits,
    last_key: Option<RenderKey>,
    force: bool,
    dirty: DirtySet,
    index: RenderIndex,
}

impl Reconciler {
    pub fn new(mode: DisplayMode, roles: RoleAttribute, limits: TextLimits) -> Self {
        Self {
            mode,
            roles,
            limits,
            last_key: None,
            force: false,
            dirty: DirtySet::default(),
            index: RenderIndex::default(),
        }
    }

    pub fn mode(&self) -> DisplayMode {
        self.mode
    }

    /// Switches mode and forgets the last key so the next pass rebuilds.
    pub fn set_mode(&mut self, mode: DisplayMode) {
        self.mode = mode;
        self.last_key = None;
    }

    pub fn last_key(&self) -> Option<&RenderKey> {
        self.last_key.as_ref()
    }

    pub fn is_forced(&self) -> bool {
        self.force
    }

    pub fn dirty(&self) -> &DirtySet {
        &self.dirty
    }

    pub fn index(&self) -> &RenderIndex {
        &self.index
    }

    pub fn limits(&self) -> &TextLimits {
        &self.limits
    }

    pub fn mark_dirty(&mut self, ids: impl IntoIterator<Item = MessageId>) {
        self.dirty.extend(ids);
    }

    /// Requests a patch pass even when the key is unchanged.
    pub fn force_next(&mut self) {
        self.force = true;
    }

    /// Forgets the last key; the next pass is a full rebuild.
    pub fn invalidate(&mut self) {
        self.last_key = None;
    }

    /// Drops pending work without rendering, used while the panel is hidden.
    pub fn suspend(&mut self) {
        self.last_key = None;
        self.clear_pending();
    }

    /// Back to the freshly constructed state, keeping mode and limits.
    pub fn reset(&mut self) {
        self.suspend();
        self.index.clear();
    }

    pub fn role_of<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeId) -> Role {
        self.roles.role_of(doc, node)
    }

    /// Filters located nodes on the active mode, in document order.
    /// Nodes without an identity are skipped.
    pub fn visible_set<D: HostDocument + ?Sized>(
        &self,
        doc: &D,
        identities: &IdentityAssigner,
        nodes: &[NodeId],
    ) -> Vec<VisibleMessage> {
        nodes
            .iter()
            .filter_map(|&node| {
                let role = self.roles.role_of(doc, node);
                if !self.mode.admits(role) {
                    return None;
                }
                let identity = identities.identity_of(node)?.clone();
                Some(VisibleMessage { node, identity, role })
            })
            .collect()
    }

    pub fn render_key(&self, visible: &[VisibleMessage]) -> RenderKey {
        RenderKey::new(
            self.mode,
            visible.iter().map(|m| (m.identity.clone(), m.role)),
        )
    }

    pub fn display_text<D: HostDocument + ?Sized>(&self, doc: &D, node: NodeId) -> DisplayText {
        DisplayText::from_text(&message_text(doc, node), &self.limits)
    }

    pub fn entries<D: HostDocument + ?Sized>(&self, doc: &D, visible: &[VisibleMessage]) -> Vec<RenderEntry> {
        visible
            .iter()
            .enumerate()
            .map(|(index, message)| RenderEntry {
                identity: message.identity.clone(),
                role: message.role,
                display_index: index + 1,
                text: self.display_text(doc, message.node),
            })
            .collect()
    }

    pub fn plan<D: HostDocument + ?Sized>(&self, doc: &D, visible: &[VisibleMessage]) -> RenderPlan {
        let key = self.render_key(visible);
        let key_changed = self.last_key.as_ref() != Some(&key);
        if key_changed {
            return RenderPlan::Rebuild {
                entries: self.entries(doc, visible),
                key,
            };
        }
        if !self.force {
            return RenderPlan::Skip;
        }
        let updates = visible
            .iter()
            .filter(|m| self.dirty.is_empty() || self.dirty.contains(&m.identity))
            .map(|m| (m.identity.clone(), self.display_text(doc, m.node)))
            .collect();
        RenderPlan::Patch { updates }
    }

    pub fn apply<T: RenderTarget + ?Sized>(
        &mut self,
        plan: RenderPlan,
        target: &mut T,
    ) -> Result<ReconcileOutcome, RenderError> {
        match plan {
            RenderPlan::Skip => Ok(ReconcileOutcome::Skipped),
            RenderPlan::Rebuild { key, entries } => {
                self.clear_pending();
                self.index.clear();
                self.last_key = None;

                let list = target.rebuild_list(&entries)?;
                check_handle_count(entries.len(), list.len())?;
                let dots = target.rebuild_collapsed(&entries)?;
                check_handle_count(entries.len(), dots.len())?;
                for ((entry, list), dot) in entries.iter().zip(list).zip(dots) {
                    self.index.insert(
                        entry.identity.clone(),
                        EntryHandles {
                            list: Some(list),
                            dot: Some(dot),
                        },
                    );
                }

                log::debug!(
                    "full rebuild: {} entries, key {:016x}",
                    entries.len(),
                    key.fingerprint()
                );
                self.last_key = Some(key);
                Ok(ReconcileOutcome::Rebuilt {
                    entries: entries.len(),
                })
            }
            RenderPlan::Patch { updates } => {
                self.clear_pending();
                let mut patched = 0;
                let mut failure = None;
                for (identity, text) in &updates {
                    let Some(handles) = self.index.get(identity) else {
                        continue;
                    };
                    match target.patch_entry(identity, handles, text) {
                        Ok(()) => patched += 1,
                        Err(err) => {
                            failure.get_or_insert(err);
                        }
                    }
                }
                if let Some(err) = failure {
                    // The target no longer matches the index; rebuild next pass.
                    self.last_key = None;
                    return Err(err);
                }
                log::debug!("patch pass: {patched} of {} entries", self.index.len());
                Ok(ReconcileOutcome::Patched { entries: patched })
            }
        }
    }

    /// Plans and applies in one step for targets independent of `doc`.
    pub fn reconcile<D, T>(
        &mut self,
        doc: &D,
        identities: &IdentityAssigner,
        nodes: &[NodeId],
        target: &mut T,
    ) -> Result<ReconcileOutcome, RenderError>
    where
        D: HostDocument + ?Sized,
        T: RenderTarget + ?Sized,
    {
        let visible = self.visible_set(doc, identities, nodes);
        let plan = self.plan(doc, &visible);
        self.apply(plan, target)
    }

    /// Redraws only the collapsed-dot list and refreshes the dot handles.
    pub fn apply_collapsed<T: RenderTarget + ?Sized>(
        &mut self,
        entries: &[RenderEntry],
        target: &mut T,
    ) -> Result<(), RenderError> {
        let dots = target.rebuild_collapsed(entries)?;
        check_handle_count(entries.len(), dots.len())?;
        for handles in self.index.entries.values_mut() {
            handles.dot = None;
        }
        for (entry, dot) in entries.iter().zip(dots) {
            self.index.entry(entry.identity.clone()).dot = Some(dot);
        }
        Ok(())
    }

    fn clear_pending(&mut self) {
        self.dirty.clear();
        self.force = false;
    }
}

fn check_handle_count(expected: usize, actual: usize) -> Result<(), RenderError> {
    if expected == actual {
        Ok(())
    } else {
        Err(RenderError::HandleCount { expected, actual })
    }
}

#[cfg(test)]
#[path = "tests/reconciler_tests.rs"]
mod tests;
