//! The slash menu: typing `/` in a block opens a filterable list of block
//! types; picking one converts the block or inserts a new one.

use super::keys::{Key, KeyEvent};
use super::Editor;
use crate::core::block::{default_properties, BlockType, BlockUpdate};
use crate::Result;
use log::debug;

/// One entry of the slash menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockOption {
    pub block_type: BlockType,
    pub label: &'static str,
    pub description: &'static str,
    pub keywords: &'static [&'static str],
}

impl BlockOption {
    /// Case-insensitive match against label, description, or any keyword.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.label.to_lowercase().contains(&query)
            || self.description.to_lowercase().contains(&query)
            || self.keywords.iter().any(|k| k.contains(query.as_str()))
    }
}

pub const BLOCK_OPTIONS: [BlockOption; 12] = [
    BlockOption {
        block_type: BlockType::Paragraph,
        label: "Text",
        description: "Just start writing with plain text",
        keywords: &["text", "paragraph", "writing"],
    },
    BlockOption {
        block_type: BlockType::Heading1,
        label: "Heading 1",
        description: "Big section heading",
        keywords: &["heading", "h1", "title", "big"],
    },
    BlockOption {
        block_type: BlockType::Heading2,
        label: "Heading 2",
        description: "Medium section heading",
        keywords: &["heading", "h2", "subtitle", "medium"],
    },
    BlockOption {
        block_type: BlockType::Heading3,
        label: "Heading 3",
        description: "Small section heading",
        keywords: &["heading", "h3", "small"],
    },
    BlockOption {
        block_type: BlockType::BulletList,
        label: "Bulleted list",
        description: "Create a simple bulleted list",
        keywords: &["list", "bullet", "unordered"],
    },
    BlockOption {
        block_type: BlockType::NumberedList,
        label: "Numbered list",
        description: "Create a list with numbering",
        keywords: &["list", "numbered", "ordered"],
    },
    BlockOption {
        block_type: BlockType::CheckList,
        label: "To-do list",
        description: "Track tasks with a to-do list",
        keywords: &["todo", "checklist", "task", "checkbox"],
    },
    BlockOption {
        block_type: BlockType::Quote,
        label: "Quote",
        description: "Capture a quote",
        keywords: &["quote", "blockquote", "citation"],
    },
    BlockOption {
        block_type: BlockType::Code,
        label: "Code",
        description: "Capture a code snippet",
        keywords: &["code", "programming", "snippet"],
    },
    BlockOption {
        block_type: BlockType::Callout,
        label: "Callout",
        description: "Make writing stand out",
        keywords: &["callout", "highlight", "notice", "info"],
    },
    BlockOption {
        block_type: BlockType::Image,
        label: "Image",
        description: "Upload or embed with a link",
        keywords: &["image", "picture", "photo", "media"],
    },
    BlockOption {
        block_type: BlockType::Divider,
        label: "Divider",
        description: "Visually divide blocks",
        keywords: &["divider", "separator", "line", "break"],
    },
];

/// Menu entries matching `query`, in menu order. A blank query matches all.
pub fn filter_block_options(query: &str) -> Vec<&'static BlockOption> {
    BLOCK_OPTIONS.iter().filter(|o| o.matches(query)).collect()
}

/// The filter text typed after a leading `/`, if `content` starts with one.
pub fn slash_query(content: &str) -> Option<&str> {
    content.strip_prefix('/')
}

/// State of an open slash menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlashMenu {
    /// Block the menu was opened from, if any.
    pub target: Option<String>,
    /// New blocks are inserted right after this index.
    pub anchor_index: usize,
    pub query: String,
    /// Highlighted entry within the filtered options.
    pub highlighted: usize,
}

impl SlashMenu {
    pub fn options(&self) -> Vec<&'static BlockOption> {
        filter_block_options(&self.query)
    }
}

impl Editor {
    pub fn slash_menu(&self) -> Option<&SlashMenu> {
        self.slash_menu.as_ref()
    }

    /// Opens the menu on `target`, or after the last block when `None`.
    pub fn open_slash_menu(&mut self, target: Option<&str>) {
        let anchor_index = target
            .and_then(|id| self.index_of(id))
            .unwrap_or(self.blocks.len().saturating_sub(1));
        self.slash_menu = Some(SlashMenu {
            target: target.map(str::to_string),
            anchor_index,
            query: String::new(),
            highlighted: 0,
        });
    }

    pub fn close_slash_menu(&mut self) {
        self.slash_menu = None;
    }

    /// Replaces a block's text as typed by the user.
    ///
    /// Typing a lone `/` opens the slash menu on the block; further typing
    /// while it is open updates the menu's filter.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::BlockNotFound`] if `block_id` is unknown.
    pub fn edit_block_content(&mut self, block_id: &str, content: &str) -> Result<()> {
        self.update_block(block_id, BlockUpdate::content(content))?;
        if content == "/" {
            self.open_slash_menu(Some(block_id));
        } else if let Some(menu) = self.slash_menu.as_mut() {
            if !content.is_empty() {
                menu.query = slash_query(content).unwrap_or_default().to_string();
                menu.highlighted = 0;
            }
        }
        Ok(())
    }

    /// Applies a menu choice and closes the menu.
    ///
    /// With a `target` block: choosing its current type does nothing; an
    /// empty (or lone `/`) block is replaced in place with the type's default
    /// properties; anything else goes through the conversion rules. Without a
    /// target a new block is inserted after the menu anchor.
    ///
    /// Returns the ID of the block now holding the chosen type, or `None`
    /// when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::BlockNotFound`] if `target` is unknown.
    pub fn apply_slash_selection(
        &mut self,
        target: Option<&str>,
        block_type: BlockType,
    ) -> Result<Option<String>> {
        let anchor = self.slash_menu.take().map(|m| m.anchor_index);

        let Some(target) = target else {
            let at = anchor.map_or(self.blocks.len(), |i| i + 1);
            let id = self.add_block(Some(at), block_type);
            return Ok(Some(id));
        };

        let index = self.require_index(target)?;
        let current = &self.blocks[index];
        if current.block_type == block_type {
            return Ok(None);
        }
        if current.content.is_empty() || current.content == "/" {
            self.update_block(
                target,
                BlockUpdate {
                    block_type: Some(block_type),
                    content: Some(String::new()),
                    properties: Some(default_properties(block_type)),
                },
            )?;
        } else {
            self.convert_block(target, block_type)?;
        }
        Ok(Some(target.to_string()))
    }

    /// Arrow keys move the highlight, Enter applies it, Escape closes.
    ///
    /// Returns `false` when no menu is open or the key is not a menu key.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::BlockNotFound`] if the menu's target
    /// block has disappeared.
    pub fn handle_slash_menu_key(&mut self, event: &KeyEvent) -> Result<bool> {
        let Some(menu) = self.slash_menu.as_mut() else {
            return Ok(false);
        };
        let options = menu.options();
        match event.key {
            Key::Escape => {
                self.close_slash_menu();
                Ok(true)
            }
            Key::ArrowDown if !options.is_empty() => {
                menu.highlighted = (menu.highlighted + 1) % options.len();
                Ok(true)
            }
            Key::ArrowUp if !options.is_empty() => {
                menu.highlighted = (menu.highlighted + options.len() - 1) % options.len();
                Ok(true)
            }
            Key::Enter => {
                let Some(option) = options.get(menu.highlighted) else {
                    debug!("Slash menu has no matching option");
                    return Ok(true);
                };
                let target = menu.target.clone();
                self.apply_slash_selection(target.as_deref(), option.block_type)?;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
