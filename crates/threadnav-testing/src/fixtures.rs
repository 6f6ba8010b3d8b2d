//! Conversation markup that behaves like a chat page under test.

use std::cell::RefCell;
use std::rc::Rc;

use threadnav_core::{MemoryDocument, MutationRecord, MutationSource, NodeId};

pub const TURN_TESTID: &str = "conversation-turn";
pub const ROLE_ATTRIBUTE: &str = "data-message-author-role";

/// One message turn: the `article` and the text node being streamed into.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Turn {
    pub article: NodeId,
    pub holder: NodeId,
    pub text: NodeId,
}

/// `body > main > article[data-testid] > div[data-message-author-role] > p > text`,
/// shared behind `Rc<RefCell<_>>` so a document render target can draw into
/// the same page.
pub struct ConversationFixture {
    doc: Rc<RefCell<MemoryDocument>>,
    main: NodeId,
    turns: Vec<Turn>,
}

impl Default for ConversationFixture {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationFixture {
    pub fn new() -> Self {
        let mut doc = MemoryDocument::new();
        let body = doc.body();
        let main = doc.append_element(body, "main", &[]);
        Self {
            doc: Rc::new(RefCell::new(doc)),
            main,
            turns: Vec::new(),
        }
    }

    pub fn with_turns(turns: &[(&str, &str)]) -> Self {
        let mut fixture = Self::new();
        for (role, text) in turns {
            fixture.push(role, text);
        }
        fixture
    }

    pub fn document(&self) -> &Rc<RefCell<MemoryDocument>> {
        &self.doc
    }

    pub fn main(&self) -> NodeId {
        self.main
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn turn(&self, index: usize) -> Turn {
        self.turns[index]
    }

    pub fn last(&self) -> Option<Turn> {
        self.turns.last().copied()
    }

    pub fn push(&mut self, role: &str, text: &str) -> Turn {
        let mut doc = self.doc.borrow_mut();
        let article = doc.create_element("article");
        doc.set_attribute(article, "data-testid", TURN_TESTID);
        let holder = doc.append_element(article, "div", &[(ROLE_ATTRIBUTE, role)]);
        let paragraph = doc.append_element(holder, "p", &[]);
        let text = doc.append_text(paragraph, text);
        // Built detached, then inserted: one childList record like a real page.
        doc.append_child(self.main, article);
        let turn = Turn {
            article,
            holder,
            text,
        };
        self.turns.push(turn);
        turn
    }

    /// Appends a streamed chunk to a turn's text node.
    pub fn append(&mut self, index: usize, chunk: &str) {
        let text = self.turns[index].text;
        self.doc.borrow_mut().push_text(text, chunk);
    }

    /// Streams `chunks` into the last turn, one character-data change each.
    pub fn stream(&mut self, chunks: &[&str]) {
        let Some(last) = self.turns.len().checked_sub(1) else {
            return;
        };
        for chunk in chunks {
            self.append(last, chunk);
        }
    }

    pub fn set_text(&mut self, index: usize, text: &str) {
        let node = self.turns[index].text;
        self.doc.borrow_mut().set_text(node, text);
    }

    pub fn set_role(&mut self, index: usize, role: &str) {
        let holder = self.turns[index].holder;
        self.doc.borrow_mut().set_attribute(holder, ROLE_ATTRIBUTE, role);
    }

    /// Removes and destroys a turn; later indices shift down.
    pub fn remove(&mut self, index: usize) -> Turn {
        let turn = self.turns.remove(index);
        self.doc.borrow_mut().destroy(turn.article);
        turn
    }

    /// Takes a turn out of the page without destroying it.
    pub fn detach(&mut self, index: usize) {
        let article = self.turns[index].article;
        self.doc.borrow_mut().detach(article);
    }

    pub fn reattach(&mut self, index: usize) {
        let article = self.turns[index].article;
        self.doc.borrow_mut().append_child(self.main, article);
    }

    /// Drops every turn, as a navigation to a new conversation does.
    pub fn clear(&mut self) {
        let mut doc = self.doc.borrow_mut();
        for turn in self.turns.drain(..) {
            doc.destroy(turn.article);
        }
    }

    pub fn take_records(&self) -> Vec<MutationRecord> {
        self.doc.borrow_mut().take_records()
    }
}

/// Splits `text` into `parts` chunks of roughly equal character length.
pub fn chunked(text: &str, parts: usize) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() || parts == 0 {
        return Vec::new();
    }
    let size = chars.len().div_ceil(parts);
    chars.chunks(size).map(|chunk| chunk.iter().collect()).collect()
}

/// A long assistant reply, for benches and truncation tests.
pub fn lorem(words: usize) -> String {
    const WORDS: [&str; 8] = ["lorem", "ipsum", "dolor", "sit", "amet", "consectetur", "adipiscing", "elit"];
    WORDS
        .iter()
        .cycle()
        .take(words)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use threadnav_core::{HostDocument, MutationKind};

    use super::*;

    #[test]
    fn push_emits_one_child_list_record() {
        let mut fixture = ConversationFixture::new();
        {
            let mut doc = fixture.document().borrow_mut();
            let body = doc.body();
            doc.observe(body, Default::default());
        }
        fixture.push("user", "Hi");
        let records = fixture.take_records();
        assert_eq!(records.len(), 1);
        assert!(matches!(&records[0].kind, MutationKind::ChildList { added, .. } if added == &[fixture.turn(0).article]));
        assert_eq!(records[0].target, fixture.main());
    }

    #[test]
    fn stream_appends_to_last_turn() {
        let mut fixture = ConversationFixture::with_turns(&[("user", "Q"), ("assistant", "He")]);
        fixture.stream(&["l", "lo"]);
        let doc = fixture.document().borrow();
        assert_eq!(doc.node_text(fixture.turn(1).text), Some("Hello"));
    }

    #[test]
    fn chunked_covers_text() {
        assert_eq!(chunked("abcdefg", 3), vec!["abc", "def", "g"]);
        assert!(chunked("", 3).is_empty());
        assert_eq!(lorem(3), "lorem ipsum dolor");
    }
}
