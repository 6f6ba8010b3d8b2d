//! Render target that draws the navigator into the host document itself.
//!
//! Everything it creates sits under the overlay markers the classifier
//! ignores (`#ctn-panel`, `#ctn-launcher`, `.ctn-collapsed-list`,
//! `.ctn-preview`), so its own writes never schedule another pass.

use std::cell::RefCell;
use std::rc::Rc;

use threadnav_core::{
    DisplayText, DotHandle, EntryHandles, HostDocument, ListHandle, MemoryDocument, MessageId,
    NodeId, RenderEntry, RenderError, RenderTarget, Selector,
};

use crate::chrome::{PanelChrome, PanelState};

pub const ITEM_CLASS: &str = "ctn-item";
pub const DOT_CLASS: &str = "ctn-dot";
pub const IDENTITY_ATTRIBUTE: &str = "data-ctn-id";
const HIDDEN_CLASS: &str = "ctn-hidden";
const COLLAPSED_CLASS: &str = "ctn-collapsed";
const DEBUG_CLASS: &str = "ctn-debug";

#[derive(Copy, Clone, Debug)]
struct Mount {
    panel: NodeId,
    list: NodeId,
    collapsed_list: NodeId,
    preview: NodeId,
    launcher: NodeId,
}

pub struct DocumentRenderTarget {
    doc: Rc<RefCell<MemoryDocument>>,
    mount: Option<Mount>,
    state: PanelState,
    items: Selector,
}

impl DocumentRenderTarget {
    /// Creates the panel, collapsed list, preview and launcher under the
    /// document root.
    pub fn mount(doc: Rc<RefCell<MemoryDocument>>) -> Self {
        let mount = {
            let mut d = doc.borrow_mut();
            let body = d.body();
            let panel = d.append_element(body, "aside", &[("id", "ctn-panel"), ("class", "ctn-panel")]);
            let header = d.append_element(panel, "div", &[("class", "ctn-header")]);
            d.append_text(header, "Conversation");
            let list = d.append_element(panel, "div", &[("id", "ctn-list"), ("class", "ctn-list")]);
            let collapsed_list = d.append_element(body, "div", &[("class", "ctn-collapsed-list")]);
            let preview = d.append_element(body, "div", &[("class", "ctn-preview ctn-hidden")]);
            d.append_text(preview, "");
            let launcher = d.append_element(body, "button", &[("id", "ctn-launcher")]);
            d.append_text(launcher, "Navigator");
            Mount {
                panel,
                list,
                collapsed_list,
                preview,
                launcher,
            }
        };
        let mut target = Self {
            doc,
            mount: Some(mount),
            state: PanelState::default(),
            items: Selector::has_attribute(IDENTITY_ATTRIBUTE),
        };
        target.apply_state();
        log::debug!("navigator mounted at panel node {}", mount.panel);
        target
    }

    pub fn document(&self) -> &Rc<RefCell<MemoryDocument>> {
        &self.doc
    }

    pub fn is_mounted(&self) -> bool {
        self.mount.is_some()
    }

    pub fn panel(&self) -> Option<NodeId> {
        self.mount.map(|m| m.panel)
    }

    pub fn list(&self) -> Option<NodeId> {
        self.mount.map(|m| m.list)
    }

    pub fn collapsed_list(&self) -> Option<NodeId> {
        self.mount.map(|m| m.collapsed_list)
    }

    pub fn launcher(&self) -> Option<NodeId> {
        self.mount.map(|m| m.launcher)
    }

    /// Identity behind a clicked list item or dot, if any.
    pub fn item_identity(&self, node: NodeId) -> Option<MessageId> {
        let doc = self.doc.borrow();
        let holder = doc.closest(node, &self.items)?;
        doc.attribute(holder, IDENTITY_ATTRIBUTE).map(MessageId::from)
    }

    /// Shows the hover preview for a dot.
    pub fn show_preview(&mut self, dot: NodeId) -> Result<(), RenderError> {
        let mount = self.mounted()?;
        let mut doc = self.doc.borrow_mut();
        let text = doc
            .attribute(dot, "data-preview")
            .unwrap_or_default()
            .to_string();
        let label = doc.children(mount.preview).first().copied();
        if let Some(label) = label {
            doc.set_text(label, &text);
        }
        doc.toggle_class(mount.preview, HIDDEN_CLASS, false);
        Ok(())
    }

    pub fn hide_preview(&mut self) -> Result<(), RenderError> {
        let mount = self.mounted()?;
        self.doc
            .borrow_mut()
            .toggle_class(mount.preview, HIDDEN_CLASS, true);
        Ok(())
    }

    /// Removes every mounted node from the document.
    pub fn unmount(&mut self) {
        let Some(mount) = self.mount.take() else {
            return;
        };
        let mut doc = self.doc.borrow_mut();
        for node in [mount.panel, mount.collapsed_list, mount.preview, mount.launcher] {
            doc.destroy(node);
        }
        log::debug!("navigator unmounted");
    }

    fn mounted(&self) -> Result<Mount, RenderError> {
        let mount = self.mount.ok_or(RenderError::NotMounted)?;
        if self.doc.borrow().is_alive(mount.panel) {
            Ok(mount)
        } else {
            Err(RenderError::NotMounted)
        }
    }

    fn apply_state(&mut self) {
        let Some(mount) = self.mount else {
            return;
        };
        let state = self.state;
        let mut doc = self.doc.borrow_mut();
        doc.toggle_class(mount.panel, COLLAPSED_CLASS, state.collapsed);
        doc.toggle_class(mount.list, HIDDEN_CLASS, state.collapsed);
        doc.toggle_class(mount.collapsed_list, HIDDEN_CLASS, !state.collapsed || state.hidden);
        doc.toggle_class(mount.panel, HIDDEN_CLASS, state.hidden);
        doc.toggle_class(mount.panel, DEBUG_CLASS, state.debug);
    }
}

fn entry_attributes(entry: &RenderEntry) -> [(&'static str, &str); 3] {
    [
        (IDENTITY_ATTRIBUTE, entry.identity.as_str()),
        ("data-role", entry.role.as_str()),
        ("data-preview", entry.text.preview.as_str()),
    ]
}

impl RenderTarget for DocumentRenderTarget {
    fn rebuild_list(&mut self, entries: &[RenderEntry]) -> Result<Vec<ListHandle>, RenderError> {
        let mount = self.mounted()?;
        let mut doc = self.doc.borrow_mut();
        let mut items = Vec::with_capacity(entries.len());
        let mut handles = Vec::with_capacity(entries.len());
        for entry in entries {
            let item = doc.create_element("button");
            doc.set_attribute(item, "class", ITEM_CLASS);
            for (name, value) in entry_attributes(entry) {
                doc.set_attribute(item, name, value);
            }
            let index = doc.append_element(item, "span", &[("class", "ctn-index")]);
            doc.append_text(index, &format!("{}.", entry.display_index));
            let label = doc.append_element(item, "span", &[("class", "ctn-text")]);
            let text = doc.append_text(label, &entry.text.title);
            items.push(item);
            handles.push(ListHandle(text));
        }
        doc.replace_children(mount.list, items);
        Ok(handles)
    }

    fn rebuild_collapsed(&mut self, entries: &[RenderEntry]) -> Result<Vec<DotHandle>, RenderError> {
        let mount = self.mounted()?;
        let mut doc = self.doc.borrow_mut();
        let mut dots = Vec::with_capacity(entries.len());
        for entry in entries {
            let dot = doc.create_element("div");
            doc.set_attribute(dot, "class", DOT_CLASS);
            for (name, value) in entry_attributes(entry) {
                doc.set_attribute(dot, name, value);
            }
            dots.push(dot);
        }
        doc.replace_children(mount.collapsed_list, dots.clone());
        Ok(dots.into_iter().map(DotHandle).collect())
    }

    fn patch_entry(
        &mut self,
        identity: &MessageId,
        handles: &EntryHandles,
        text: &DisplayText,
    ) -> Result<(), RenderError> {
        self.mounted()?;
        let missing = || RenderError::MissingHandle {
            identity: identity.clone(),
        };
        let ListHandle(label) = handles.list.ok_or_else(missing)?;
        let mut doc = self.doc.borrow_mut();
        if !doc.is_alive(label) {
            return Err(missing());
        }
        doc.set_text(label, &text.title);
        if let Some(item) = doc.parent(label).and_then(|span| doc.parent(span)) {
            doc.set_attribute(item, "data-preview", &text.preview);
        }
        if let Some(DotHandle(dot)) = handles.dot {
            if doc.is_alive(dot) {
                doc.set_attribute(dot, "data-preview", &text.preview);
            }
        }
        Ok(())
    }
}

impl PanelChrome for DocumentRenderTarget {
    fn set_collapsed(&mut self, collapsed: bool) -> Result<(), RenderError> {
        self.mounted()?;
        self.state.collapsed = collapsed;
        self.apply_state();
        Ok(())
    }

    fn set_hidden(&mut self, hidden: bool) -> Result<(), RenderError> {
        self.mounted()?;
        self.state.hidden = hidden;
        self.apply_state();
        Ok(())
    }

    fn set_debug(&mut self, debug: bool) -> Result<(), RenderError> {
        self.mounted()?;
        self.state.debug = debug;
        self.apply_state();
        Ok(())
    }

    fn panel_state(&self) -> PanelState {
        self.state
    }
}

#[cfg(test)]
#[path = "tests/document_target_tests.rs"]
mod tests;
