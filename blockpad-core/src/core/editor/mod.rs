//! Block editor state machine: selection, focus, clipboard, and block mutations
//! over the ordered block list of one page.
//!
//! The [`Editor`] owns a working copy of the page's blocks. Every mutation
//! bumps [`Editor::revision`]; the owning controller writes the blocks back
//! to the workspace when the revision moves.
//!
//! Operations addressed by block ID return [`BlockpadError::BlockNotFound`]
//! for unknown IDs and leave the editor untouched. UI-driven paths (keyboard
//! dispatch, drag and drop) treat that as a silent no-op.

pub mod keys;
pub mod markdown;
pub mod slash;

use crate::core::block::{
    convert_block_type, create_empty_block, duplicate_block, generate_block_id, Block,
    BlockProperties, BlockType, BlockUpdate,
};
use crate::{BlockpadError, Result};
use chrono::Utc;
use log::debug;

pub use keys::{Key, KeyEvent};
pub use slash::{BlockOption, SlashMenu};

/// Selection, focus, and clipboard of the editor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EditorState {
    /// Selected block IDs in selection order.
    pub selected_blocks: Vec<String>,
    pub focused_block: Option<String>,
    /// `true` while the caret is inside a block's text field.
    pub is_edit_mode: bool,
    pub clipboard: Vec<Block>,
}

#[derive(Debug, Clone)]
pub struct Editor {
    blocks: Vec<Block>,
    state: EditorState,
    dragged_block: Option<String>,
    slash_menu: Option<SlashMenu>,
    revision: u64,
}

impl Editor {
    /// Starts editing `blocks`; an empty list gets one empty paragraph.
    pub fn new(blocks: Vec<Block>) -> Self {
        let mut editor = Self {
            blocks,
            state: EditorState::default(),
            dragged_block: None,
            slash_menu: None,
            revision: 0,
        };
        if editor.blocks.is_empty() {
            editor.blocks.push(create_empty_block(BlockType::Paragraph));
        }
        editor
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    /// Counter bumped by every change to the block list.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }

    pub fn index_of(&self, block_id: &str) -> Option<usize> {
        self.blocks.iter().position(|b| b.id == block_id)
    }

    fn require_index(&self, block_id: &str) -> Result<usize> {
        self.index_of(block_id)
            .ok_or_else(|| BlockpadError::BlockNotFound(block_id.to_string()))
    }

    fn changed(&mut self) {
        self.revision += 1;
    }

    fn focus_only(&mut self, block_id: &str) {
        self.state.focused_block = Some(block_id.to_string());
        self.state.selected_blocks = vec![block_id.to_string()];
    }

    /// Inserts an empty block of `block_type` at `index` (end when `None`),
    /// focuses it, and returns its ID. Indices past the end append.
    pub fn add_block(&mut self, index: Option<usize>, block_type: BlockType) -> String {
        let block = create_empty_block(block_type);
        let id = block.id.clone();
        let at = index.unwrap_or(self.blocks.len()).min(self.blocks.len());
        self.blocks.insert(at, block);
        self.changed();
        self.focus_only(&id);
        id
    }

    /// Merges `update` into a block; its `updated_at` is always bumped.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn update_block(&mut self, block_id: &str, update: BlockUpdate) -> Result<()> {
        let index = self.require_index(block_id)?;
        self.blocks[index].apply(update);
        self.changed();
        Ok(())
    }

    /// Runs `edit` against one block and records the change.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn edit_block<R>(
        &mut self,
        block_id: &str,
        edit: impl FnOnce(&mut Block) -> R,
    ) -> Result<R> {
        let index = self.require_index(block_id)?;
        let out = edit(&mut self.blocks[index]);
        self.changed();
        Ok(out)
    }

    /// Removes a block and focuses its predecessor (or the new first block).
    ///
    /// The only block of a page is never removed; that call is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn delete_block(&mut self, block_id: &str) -> Result<()> {
        let index = self.require_index(block_id)?;
        if self.blocks.len() <= 1 {
            debug!("Refusing to delete the only block {block_id}");
            return Ok(());
        }
        self.blocks.remove(index);
        self.changed();

        let focus = self.blocks[index.saturating_sub(1)].id.clone();
        self.focus_only(&focus);
        Ok(())
    }

    /// Inserts a copy right after the source block, focuses it, and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn duplicate_block(&mut self, block_id: &str) -> Result<String> {
        let index = self.require_index(block_id)?;
        let copy = duplicate_block(&self.blocks[index]);
        let id = copy.id.clone();
        self.blocks.insert(index + 1, copy);
        self.changed();
        self.focus_only(&id);
        Ok(id)
    }

    /// Converts a block in place following the legal conversion graph.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn convert_block(&mut self, block_id: &str, new_type: BlockType) -> Result<()> {
        let index = self.require_index(block_id)?;
        let converted = convert_block_type(&self.blocks[index], new_type);
        self.update_block(block_id, BlockUpdate::replace_with(&converted))
    }

    /// Moves the block at `from` so that it ends up at `to`.
    ///
    /// Equal or out-of-range `from` is a no-op; `to` past the end appends.
    pub fn move_block(&mut self, from: usize, to: usize) {
        if from == to || from >= self.blocks.len() {
            return;
        }
        let block = self.blocks.remove(from);
        let at = to.min(self.blocks.len());
        self.blocks.insert(at, block);
        self.changed();
    }

    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn move_block_by_id(&mut self, block_id: &str, to: usize) -> Result<()> {
        let from = self.require_index(block_id)?;
        self.move_block(from, to);
        Ok(())
    }

    /// Selects a block. With `multi_select` the block's membership is toggled
    /// instead of replacing the selection. Focus always follows.
    pub fn select_block(&mut self, block_id: &str, multi_select: bool) {
        if multi_select {
            if let Some(pos) = self.state.selected_blocks.iter().position(|id| id == block_id) {
                self.state.selected_blocks.remove(pos);
            } else {
                self.state.selected_blocks.push(block_id.to_string());
            }
        } else {
            self.state.selected_blocks = vec![block_id.to_string()];
        }
        self.state.focused_block = Some(block_id.to_string());
    }

    pub fn clear_selection(&mut self) {
        self.state.selected_blocks.clear();
        self.state.focused_block = None;
    }

    /// Caret entered (`true`) or left (`false`) a block's text field.
    pub fn set_edit_mode(&mut self, editing: bool) {
        self.state.is_edit_mode = editing;
    }

    /// Puts the named blocks on the clipboard in page order.
    pub fn copy_blocks(&mut self, block_ids: &[String]) {
        self.state.clipboard = self
            .blocks
            .iter()
            .filter(|b| block_ids.contains(&b.id))
            .cloned()
            .collect();
    }

    /// Copies, then removes the named blocks and clears the selection.
    ///
    /// A page emptied by the cut gets a fresh empty paragraph.
    pub fn cut_blocks(&mut self, block_ids: &[String]) {
        self.copy_blocks(block_ids);
        self.blocks.retain(|b| !block_ids.contains(&b.id));
        if self.blocks.is_empty() {
            self.blocks.push(create_empty_block(BlockType::Paragraph));
        }
        if !self.state.clipboard.is_empty() {
            self.changed();
        }
        self.clear_selection();
    }

    /// Inserts fresh copies of the clipboard at `index` (end when `None`),
    /// selects them with focus on the first, and returns their IDs.
    pub fn paste_blocks(&mut self, index: Option<usize>) -> Vec<String> {
        if self.state.clipboard.is_empty() {
            return Vec::new();
        }
        let now = Utc::now();
        let pasted: Vec<Block> = self
            .state
            .clipboard
            .iter()
            .map(|b| Block {
                id: generate_block_id(),
                created_at: now,
                updated_at: now,
                ..b.clone()
            })
            .collect();
        let ids: Vec<String> = pasted.iter().map(|b| b.id.clone()).collect();

        let at = index.unwrap_or(self.blocks.len()).min(self.blocks.len());
        self.blocks.splice(at..at, pasted);
        self.changed();

        self.state.selected_blocks = ids.clone();
        self.state.focused_block = ids.first().cloned();
        ids
    }

    /// Records `block_id` as the block being dragged, replacing any earlier drag.
    pub fn handle_drag_start(&mut self, block_id: &str) {
        self.dragged_block = Some(block_id.to_string());
    }

    /// Drops the dragged block at `target_index`.
    ///
    /// Returns `false` when no known block is being dragged.
    pub fn handle_drop(&mut self, target_index: usize) -> bool {
        let Some(dragged) = self.dragged_block.take() else {
            return false;
        };
        match self.index_of(&dragged) {
            Some(from) => {
                self.move_block(from, target_index);
                true
            }
            None => {
                debug!("Dropped block {dragged} is no longer on the page");
                false
            }
        }
    }

    pub fn handle_drag_end(&mut self) {
        self.dragged_block = None;
    }

    pub fn dragged_block(&self) -> Option<&str> {
        self.dragged_block.as_deref()
    }

    /// Enter inside a block: inserts an empty paragraph after it and returns its ID.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn handle_block_enter(&mut self, block_id: &str) -> Result<String> {
        let index = self.require_index(block_id)?;
        Ok(self.add_block(Some(index + 1), BlockType::Paragraph))
    }

    /// Splits a block's text at byte `offset` (snapped back to a char boundary).
    ///
    /// The text after the caret moves into a new paragraph inserted right
    /// after the block; blocks without plain text just get an empty paragraph.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn split_block(&mut self, block_id: &str, offset: usize) -> Result<String> {
        let index = self.require_index(block_id)?;
        let block = &self.blocks[index];
        if !carries_text(block.block_type) {
            return self.handle_block_enter(block_id);
        }

        let mut cut = offset.min(block.content.len());
        while cut > 0 && !block.content.is_char_boundary(cut) {
            cut -= 1;
        }
        let tail = block.content[cut..].to_string();
        let head = block.content[..cut].to_string();

        self.blocks[index].apply(BlockUpdate::content(head));
        let id = self.add_block(Some(index + 1), BlockType::Paragraph);
        self.blocks[index + 1].content = tail;
        Ok(id)
    }

    /// Backspace in an empty block.
    ///
    /// The only block is reset to an empty paragraph; any other block is
    /// removed and focus moves to its predecessor.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn handle_block_backspace(&mut self, block_id: &str) -> Result<()> {
        self.require_index(block_id)?;
        if self.blocks.len() == 1 {
            return self.update_block(
                block_id,
                BlockUpdate {
                    block_type: Some(BlockType::Paragraph),
                    content: Some(String::new()),
                    properties: Some(BlockProperties::default()),
                },
            );
        }
        self.delete_block(block_id)
    }

    /// Backspace at the start of a non-empty block: appends its text to the
    /// previous block and removes it.
    ///
    /// Returns `false` (and changes nothing) when there is no previous block
    /// or either block does not carry plain text.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn merge_into_previous(&mut self, block_id: &str) -> Result<bool> {
        let index = self.require_index(block_id)?;
        if index == 0
            || !carries_text(self.blocks[index].block_type)
            || !carries_text(self.blocks[index - 1].block_type)
        {
            return Ok(false);
        }
        let removed = self.blocks.remove(index);
        let target = &mut self.blocks[index - 1];
        let mut content = target.content.clone();
        content.push_str(&removed.content);
        target.apply(BlockUpdate::content(content));
        let focus = target.id.clone();
        self.changed();
        self.focus_only(&focus);
        Ok(true)
    }
}

/// Block types whose text lives in `content`.
fn carries_text(block_type: BlockType) -> bool {
    block_type.is_text() || matches!(block_type, BlockType::Code | BlockType::Callout)
}
