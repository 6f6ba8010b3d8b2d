//! Fakes shared by the unit tests.

use std::cell::RefCell;
use std::time::Duration;

use crate::collections::map::HashMap;
use crate::config::NavigatorConfig;
use crate::context::ReconciliationContext;
use crate::document::NodeId;
use crate::identity::MessageId;
use crate::memory::MemoryDocument;
use crate::platform::{FrameId, FrameScheduler, TimerId};
use crate::render_target::{DotHandle, EntryHandles, ListHandle, RenderEntry, RenderError, RenderTarget};
use crate::text::DisplayText;

#[derive(Default)]
struct HostState {
    next: u64,
    timers: Vec<(TimerId, Duration)>,
    frames: Vec<FrameId>,
    timers_armed: usize,
    frames_requested: usize,
}

/// Records armed work; tests fire it by hand.
#[derive(Default)]
pub(crate) struct FakeHost {
    state: RefCell<HostState>,
}

impl FakeHost {
    pub(crate) fn armed_timer(&self) -> Option<TimerId> {
        self.state.borrow().timers.last().map(|(id, _)| *id)
    }

    pub(crate) fn armed_delay(&self) -> Option<Duration> {
        self.state.borrow().timers.last().map(|(_, delay)| *delay)
    }

    pub(crate) fn pending_frame(&self) -> Option<FrameId> {
        self.state.borrow().frames.last().copied()
    }

    /// Removes the armed timer as a host event loop would when it fires.
    pub(crate) fn fire_timer(&self) -> Option<TimerId> {
        self.state.borrow_mut().timers.pop().map(|(id, _)| id)
    }

    pub(crate) fn fire_frame(&self) -> Option<FrameId> {
        self.state.borrow_mut().frames.pop()
    }

    pub(crate) fn live_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub(crate) fn live_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub(crate) fn timers_armed(&self) -> usize {
        self.state.borrow().timers_armed
    }

    pub(crate) fn frames_requested(&self) -> usize {
        self.state.borrow().frames_requested
    }
}

impl FrameScheduler for FakeHost {
    fn arm_timer(&self, delay: Duration) -> TimerId {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        let id = TimerId(state.next);
        state.timers.push((id, delay));
        state.timers_armed += 1;
        id
    }

    fn disarm_timer(&self, id: TimerId) {
        self.state.borrow_mut().timers.retain(|(t, _)| *t != id);
    }

    fn request_frame(&self) -> FrameId {
        let mut state = self.state.borrow_mut();
        state.next += 1;
        let id = FrameId(state.next);
        state.frames.push(id);
        state.frames_requested += 1;
        id
    }

    fn cancel_frame(&self, id: FrameId) {
        self.state.borrow_mut().frames.retain(|f| *f != id);
    }
}

/// Keeps the drawn state as plain data and counts every call.
#[derive(Default)]
pub(crate) struct CountingTarget {
    pub(crate) list: Vec<RenderEntry>,
    pub(crate) dots: Vec<RenderEntry>,
    pub(crate) texts: HashMap<MessageId, DisplayText>,
    pub(crate) list_rebuilds: usize,
    pub(crate) dot_rebuilds: usize,
    pub(crate) patched: Vec<MessageId>,
    pub(crate) fail_rebuild: bool,
    /// Rejects the next patch for this identity, once.
    pub(crate) fail_patch: Option<MessageId>,
}

impl CountingTarget {
    pub(crate) fn titles(&self) -> Vec<String> {
        self.list
            .iter()
            .map(|entry| {
                self.texts
                    .get(&entry.identity)
                    .map_or_else(|| entry.text.title.clone(), |t| t.title.clone())
            })
            .collect()
    }
}

impl RenderTarget for CountingTarget {
    fn rebuild_list(&mut self, entries: &[RenderEntry]) -> Result<Vec<ListHandle>, RenderError> {
        if self.fail_rebuild {
            return Err(RenderError::NotMounted);
        }
        self.list_rebuilds += 1;
        self.list = entries.to_vec();
        self.texts = entries
            .iter()
            .map(|entry| (entry.identity.clone(), entry.text.clone()))
            .collect();
        Ok((0..entries.len()).map(ListHandle).collect())
    }

    fn rebuild_collapsed(&mut self, entries: &[RenderEntry]) -> Result<Vec<DotHandle>, RenderError> {
        self.dot_rebuilds += 1;
        self.dots = entries.to_vec();
        Ok((0..entries.len()).map(DotHandle).collect())
    }

    fn patch_entry(
        &mut self,
        identity: &MessageId,
        handles: &EntryHandles,
        text: &DisplayText,
    ) -> Result<(), RenderError> {
        if handles.list.is_none() || self.fail_patch.as_ref() == Some(identity) {
            self.fail_patch = None;
            return Err(RenderError::MissingHandle {
                identity: identity.clone(),
            });
        }
        self.texts.insert(identity.clone(), text.clone());
        self.patched.push(identity.clone());
        Ok(())
    }
}

/// One message turn: the `article` and the text node inside it.
#[derive(Copy, Clone, Debug)]
pub(crate) struct Turn {
    pub(crate) article: NodeId,
    pub(crate) text: NodeId,
}

/// `body > main > article[data-testid] > div[role] > p > text` markup.
pub(crate) struct Conversation {
    pub(crate) doc: MemoryDocument,
    pub(crate) main: NodeId,
    pub(crate) turns: Vec<Turn>,
}

impl Conversation {
    pub(crate) fn new() -> Self {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let main = doc.append_element(body, "main", &[]);
        Self {
            doc,
            main,
            turns: Vec::new(),
        }
    }

    pub(crate) fn with_turns(turns: &[(&str, &str)]) -> Self {
        let mut conversation = Self::new();
        for (role, text) in turns {
            conversation.push(role, text);
        }
        conversation
    }

    pub(crate) fn push(&mut self, role: &str, text: &str) -> Turn {
        let doc = &mut self.doc;
        let article = doc.append_element(self.main, "article", &[("data-testid", "conversation-turn")]);
        let body = doc.append_element(article, "div", &[("data-message-author-role", role)]);
        let paragraph = doc.append_element(body, "p", &[]);
        let text = doc.append_text(paragraph, text);
        let turn = Turn { article, text };
        self.turns.push(turn);
        turn
    }
}

pub(crate) fn context() -> ReconciliationContext {
    ReconciliationContext::new(&NavigatorConfig::default()).expect("default config resolves")
}
