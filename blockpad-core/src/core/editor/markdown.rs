//! Markdown-style shortcuts: a trigger typed at the start of an empty
//! paragraph, followed by a space, converts the paragraph in place.

use super::Editor;
use crate::core::block::{default_properties, BlockType, BlockUpdate};
use crate::Result;

const TRIGGERS: [(&str, BlockType); 9] = [
    ("#", BlockType::Heading1),
    ("##", BlockType::Heading2),
    ("###", BlockType::Heading3),
    ("-", BlockType::BulletList),
    ("*", BlockType::BulletList),
    ("1.", BlockType::NumberedList),
    ("[]", BlockType::CheckList),
    (">", BlockType::Quote),
    ("```", BlockType::Code),
];

/// The block type `content` converts to when a space is typed after it.
///
/// Only an exact match counts: `"# "` or `"#x"` are not triggers.
pub fn markdown_trigger(content: &str) -> Option<BlockType> {
    TRIGGERS
        .iter()
        .find(|(trigger, _)| *trigger == content)
        .map(|(_, block_type)| *block_type)
}

impl Editor {
    /// Converts a paragraph whose whole content is a trigger, clearing the
    /// trigger text. Returns `false` for anything else.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn apply_markdown_shortcut(&mut self, block_id: &str) -> Result<bool> {
        let index = self.require_index(block_id)?;
        let block = &self.blocks[index];
        if block.block_type != BlockType::Paragraph {
            return Ok(false);
        }
        let Some(block_type) = markdown_trigger(&block.content) else {
            return Ok(false);
        };
        self.update_block(
            block_id,
            BlockUpdate {
                block_type: Some(block_type),
                content: Some(String::new()),
                properties: Some(default_properties(block_type)),
            },
        )?;
        Ok(true)
    }
}
