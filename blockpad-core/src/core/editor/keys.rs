//! Keyboard dispatch for the editor.
//!
//! [`Editor::handle_key_down`] covers the document-level shortcuts that act
//! on the block selection. [`Editor::handle_text_key`] and
//! [`Editor::handle_list_key`] cover keys typed inside a block's text field
//! or a list item. Each returns `true` when the key was consumed and the
//! default action should be suppressed.

use super::markdown::markdown_trigger;
use super::Editor;
use crate::core::block::BlockType;
use crate::Result;
use log::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Enter,
    Backspace,
    Delete,
    Escape,
    Tab,
    Space,
    ArrowUp,
    ArrowDown,
}

/// A key press with its modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub ctrl: bool,
    pub meta: bool,
    pub shift: bool,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            ctrl: false,
            meta: false,
            shift: false,
        }
    }

    /// The key with the platform command modifier held.
    pub fn with_modifier(key: Key) -> Self {
        Self {
            ctrl: true,
            ..Self::new(key)
        }
    }

    pub fn shifted(self) -> Self {
        Self {
            shift: true,
            ..self
        }
    }

    /// Ctrl or Meta.
    pub fn has_modifier(&self) -> bool {
        self.ctrl || self.meta
    }

    /// `true` for modifier + `letter`, ignoring case.
    pub fn is_shortcut(&self, letter: char) -> bool {
        self.has_modifier()
            && matches!(self.key, Key::Char(c) if c.eq_ignore_ascii_case(&letter))
    }
}

impl Editor {
    /// Document-level shortcuts, with `target` the block the shortcut acts on.
    ///
    /// | Keys | Action |
    /// |---|---|
    /// | mod+C | copy selection |
    /// | mod+X | cut selection |
    /// | mod+V | paste after `target`, or at the end |
    /// | mod+D | duplicate `target` |
    /// | mod+Enter | new paragraph after `target` |
    /// | Delete / Backspace | delete every selected block (outside edit mode) |
    /// | Escape | close the slash menu |
    pub fn handle_key_down(&mut self, event: &KeyEvent, target: Option<&str>) -> bool {
        let target_index = target.and_then(|id| self.index_of(id));
        if target.is_some() && target_index.is_none() {
            debug!("Shortcut target {target:?} is not on the page");
        }

        if event.has_modifier() {
            if event.is_shortcut('c') {
                if self.state.selected_blocks.is_empty() {
                    return false;
                }
                let selected = self.state.selected_blocks.clone();
                self.copy_blocks(&selected);
                return true;
            }
            if event.is_shortcut('x') {
                if self.state.selected_blocks.is_empty() {
                    return false;
                }
                let selected = self.state.selected_blocks.clone();
                self.cut_blocks(&selected);
                return true;
            }
            if event.is_shortcut('v') {
                self.paste_blocks(target_index.map(|i| i + 1));
                return true;
            }
            if event.is_shortcut('d') {
                let Some(id) = target.filter(|_| target_index.is_some()) else {
                    return false;
                };
                return self.duplicate_block(id).is_ok();
            }
            if event.key == Key::Enter {
                let Some(index) = target_index else {
                    return false;
                };
                self.add_block(Some(index + 1), BlockType::Paragraph);
                return true;
            }
            return false;
        }

        match event.key {
            Key::Delete | Key::Backspace
                if !self.state.selected_blocks.is_empty() && !self.state.is_edit_mode =>
            {
                let selected = self.state.selected_blocks.clone();
                for id in &selected {
                    if let Err(e) = self.delete_block(id) {
                        debug!("Skipping selected block: {e}");
                    }
                }
                true
            }
            Key::Escape if self.slash_menu.is_some() => {
                self.close_slash_menu();
                true
            }
            _ => false,
        }
    }

    /// Keys typed inside a text block, with the caret at byte offset `caret`.
    ///
    /// Enter splits the block at the caret. Backspace in an empty block
    /// removes it; at the start of a non-empty block it merges into the
    /// previous one. Space after a markdown trigger converts the block.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn handle_text_key(
        &mut self,
        block_id: &str,
        event: &KeyEvent,
        caret: usize,
    ) -> Result<bool> {
        let index = self.require_index(block_id)?;
        if event.has_modifier() {
            return Ok(false);
        }
        let empty = self.blocks[index].content.is_empty();

        match event.key {
            Key::Enter if !event.shift => {
                self.split_block(block_id, caret)?;
                self.set_edit_mode(false);
                Ok(true)
            }
            Key::Backspace if !event.shift && empty => {
                self.handle_block_backspace(block_id)?;
                Ok(true)
            }
            Key::Backspace if caret == 0 => self.merge_into_previous(block_id),
            Key::Space if markdown_trigger(&self.blocks[index].content).is_some() => {
                self.apply_markdown_shortcut(block_id)
            }
            Key::Escape if self.slash_menu.is_some() => {
                self.close_slash_menu();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Keys typed inside item `item` of a list block.
    ///
    /// Enter adds an item after a non-empty one and leaves the list (new
    /// paragraph below) from an empty one. Backspace on an empty item removes
    /// it, or falls back to block backspace when it is the last item. Tab
    /// indents and Shift+Tab outdents.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn handle_list_key(&mut self, block_id: &str, item: usize, event: &KeyEvent) -> Result<bool> {
        let index = self.require_index(block_id)?;
        let Some(current) = self.blocks[index].list_items().get(item) else {
            debug!("List item {item} is out of range for {block_id}");
            return Ok(false);
        };
        let item_empty = current.content.is_empty();
        let item_blank = current.content.trim().is_empty();

        match event.key {
            Key::Enter if !event.shift => {
                if item_blank {
                    self.handle_block_enter(block_id)?;
                } else {
                    self.edit_block(block_id, |b| b.add_list_item(item))?;
                }
                Ok(true)
            }
            Key::Backspace if item_empty => {
                if !self.edit_block(block_id, |b| b.remove_list_item(item))? {
                    self.handle_block_backspace(block_id)?;
                }
                Ok(true)
            }
            Key::Tab => {
                let outdent = event.shift;
                self.edit_block(block_id, |b| b.indent_list_item(item, outdent))?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
