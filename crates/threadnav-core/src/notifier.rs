use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use crate::classifier::Classification;
use crate::collections::map::HashSet;
use crate::identity::MessageId;

/// A relevant host change, already classified.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ChangeEvent {
    pub text_changed: bool,
    pub dirty: HashSet<MessageId>,
}

impl ChangeEvent {
    pub fn structural() -> Self {
        Self::default()
    }

    pub fn text(dirty: impl IntoIterator<Item = MessageId>) -> Self {
        Self {
            text_changed: true,
            dirty: dirty.into_iter().collect(),
        }
    }
}

impl Classification {
    /// The event to enqueue, or `None` when the batch was irrelevant.
    pub fn into_event(self) -> Option<ChangeEvent> {
        self.relevant.then(|| ChangeEvent {
            text_changed: self.text_changed,
            dirty: self.dirty,
        })
    }
}

/// Receives classified change events from the host side.
pub trait ChangeNotifier {
    fn notify(&self, event: ChangeEvent);
}

/// FIFO of change events between the observer and the render scheduler.
///
/// Clones share the same queue, so the observer side can hold one end
/// while the context drains the other.
#[derive(Clone, Default)]
pub struct ChangeQueue {
    events: Rc<RefCell<VecDeque<ChangeEvent>>>,
}

impl ChangeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: ChangeEvent) {
        self.events.borrow_mut().push_back(event);
    }

    pub fn drain(&self) -> Vec<ChangeEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }
}

impl ChangeNotifier for ChangeQueue {
    fn notify(&self, event: ChangeEvent) {
        self.push(event);
    }
}

impl std::fmt::Debug for ChangeQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeQueue")
            .field("pending", &self.len())
            .finish()
    }
}
