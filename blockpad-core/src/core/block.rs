//! Typed content blocks, their property bags, and the type-conversion graph.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Deepest indentation a list item may reach.
pub const MAX_INDENT_LEVEL: u8 = 3;

/// Language assigned to new code blocks.
pub const DEFAULT_CODE_LANGUAGE: &str = "javascript";

/// Every block variant a page can hold.
///
/// Serialized with the lower-camel names used in the stored blob
/// (`"paragraph"`, `"heading1"`, `"bulletList"`, ...). `Table` and `Toggle`
/// are reserved: they round-trip through storage but no editor operation
/// produces them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BlockType {
    Paragraph,
    Heading1,
    Heading2,
    Heading3,
    BulletList,
    NumberedList,
    CheckList,
    Quote,
    Code,
    Callout,
    Image,
    Divider,
    Table,
    Toggle,
}

impl BlockType {
    /// The block types offered by the editor, in menu order.
    pub const EDITABLE: [BlockType; 12] = [
        BlockType::Paragraph,
        BlockType::Heading1,
        BlockType::Heading2,
        BlockType::Heading3,
        BlockType::BulletList,
        BlockType::NumberedList,
        BlockType::CheckList,
        BlockType::Quote,
        BlockType::Code,
        BlockType::Callout,
        BlockType::Image,
        BlockType::Divider,
    ];

    /// Plain-text blocks that convert freely among each other.
    #[must_use]
    pub fn is_text(self) -> bool {
        matches!(
            self,
            Self::Paragraph | Self::Heading1 | Self::Heading2 | Self::Heading3 | Self::Quote
        )
    }

    /// Blocks whose content lives in `listItems`.
    #[must_use]
    pub fn is_list(self) -> bool {
        matches!(self, Self::BulletList | Self::NumberedList | Self::CheckList)
    }

    /// Heading level parsed from the type name, `None` for non-headings.
    #[must_use]
    pub fn heading_level(self) -> Option<u8> {
        match self {
            Self::Heading1 => Some(1),
            Self::Heading2 => Some(2),
            Self::Heading3 => Some(3),
            _ => None,
        }
    }

    /// Heading type for `level`; out-of-range levels clamp to 1..=3.
    #[must_use]
    pub fn heading(level: u8) -> Self {
        match level {
            0 | 1 => Self::Heading1,
            2 => Self::Heading2,
            _ => Self::Heading3,
        }
    }

    /// The serialized name of this type.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Paragraph => "paragraph",
            Self::Heading1 => "heading1",
            Self::Heading2 => "heading2",
            Self::Heading3 => "heading3",
            Self::BulletList => "bulletList",
            Self::NumberedList => "numberedList",
            Self::CheckList => "checkList",
            Self::Quote => "quote",
            Self::Code => "code",
            Self::Callout => "callout",
            Self::Image => "image",
            Self::Divider => "divider",
            Self::Table => "table",
            Self::Toggle => "toggle",
        }
    }
}

/// Visual flavour of a callout block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CalloutType {
    #[default]
    Info,
    Warning,
    Error,
    Success,
}

/// One entry of a bullet, numbered, or check list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: String,
    pub content: String,
    /// Only meaningful for check lists.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(default)]
    pub indent_level: u8,
}

impl ListItem {
    /// Creates a top-level item; check-list items start unchecked.
    pub fn new(content: impl Into<String>, kind: BlockType) -> Self {
        Self {
            id: generate_item_id(),
            content: content.into(),
            checked: (kind == BlockType::CheckList).then_some(false),
            indent_level: 0,
        }
    }
}

/// Header row and cells of a (reserved) table block.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Variant-specific attributes of a block.
///
/// Only the keys matching the block's type are expected to be present;
/// conversion rebuilds the bag from scratch for the target type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BlockProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub list_items: Option<Vec<ListItem>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callout_type: Option<CalloutType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_alt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_data: Option<TableData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_expanded: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// The smallest addressable unit of page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: String,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub content: String,
    #[serde(default)]
    pub properties: BlockProperties,
    #[serde(with = "crate::core::dates")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::core::dates")]
    pub updated_at: DateTime<Utc>,
}

/// A partial set of block fields merged in by [`Block::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BlockUpdate {
    pub block_type: Option<BlockType>,
    pub content: Option<String>,
    pub properties: Option<BlockProperties>,
}

impl BlockUpdate {
    /// An update that only replaces the text content.
    pub fn content(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            ..Self::default()
        }
    }

    /// An update that replaces every field with those of `block`.
    pub fn replace_with(block: &Block) -> Self {
        Self {
            block_type: Some(block.block_type),
            content: Some(block.content.clone()),
            properties: Some(block.properties.clone()),
        }
    }
}

pub fn generate_block_id() -> String {
    format!("block_{}", Uuid::new_v4())
}

pub fn generate_item_id() -> String {
    format!("item_{}", Uuid::new_v4())
}

impl Block {
    /// Merges `update` into this block and bumps `updated_at`.
    pub fn apply(&mut self, update: BlockUpdate) {
        if let Some(block_type) = update.block_type {
            self.block_type = block_type;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if let Some(properties) = update.properties {
            self.properties = properties;
        }
        self.touch();
    }

    /// Bumps `updated_at`, never moving it backwards.
    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// List items of this block; empty for non-list blocks.
    pub fn list_items(&self) -> &[ListItem] {
        self.properties.list_items.as_deref().unwrap_or(&[])
    }

    /// Inserts an empty item after `after` and returns its ID.
    ///
    /// Returns `None` if this is not a list block. An out-of-range `after`
    /// appends.
    pub fn add_list_item(&mut self, after: usize) -> Option<String> {
        if !self.block_type.is_list() {
            return None;
        }
        let item = ListItem::new("", self.block_type);
        let id = item.id.clone();
        let items = self.properties.list_items.get_or_insert_with(Vec::new);
        let at = (after + 1).min(items.len());
        items.insert(at, item);
        self.touch();
        Some(id)
    }

    /// Removes the item at `index`.
    ///
    /// The last remaining item is never removed; `false` tells the caller to
    /// fall back to block-level backspace handling instead.
    pub fn remove_list_item(&mut self, index: usize) -> bool {
        let Some(items) = self.properties.list_items.as_mut() else {
            return false;
        };
        if items.len() <= 1 || index >= items.len() {
            return false;
        }
        items.remove(index);
        self.touch();
        true
    }

    /// Indents (or outdents) the item at `index`, clamped to `0..=MAX_INDENT_LEVEL`.
    pub fn indent_list_item(&mut self, index: usize, outdent: bool) {
        if let Some(item) = self
            .properties
            .list_items
            .as_mut()
            .and_then(|items| items.get_mut(index))
        {
            item.indent_level = if outdent {
                item.indent_level.saturating_sub(1)
            } else {
                (item.indent_level + 1).min(MAX_INDENT_LEVEL)
            };
            self.touch();
        }
    }

    pub fn set_list_item_content(&mut self, index: usize, content: impl Into<String>) {
        if let Some(item) = self
            .properties
            .list_items
            .as_mut()
            .and_then(|items| items.get_mut(index))
        {
            item.content = content.into();
            self.touch();
        }
    }

    /// Sets the checked flag; ignored outside check lists.
    pub fn set_list_item_checked(&mut self, index: usize, checked: bool) {
        if self.block_type != BlockType::CheckList {
            return;
        }
        if let Some(item) = self
            .properties
            .list_items
            .as_mut()
            .and_then(|items| items.get_mut(index))
        {
            item.checked = Some(checked);
            self.touch();
        }
    }
}

/// Returns a new block of `block_type` with empty content and an empty property bag.
pub fn create_empty_block(block_type: BlockType) -> Block {
    let now = Utc::now();
    Block {
        id: generate_block_id(),
        block_type,
        content: String::new(),
        properties: BlockProperties::default(),
        created_at: now,
        updated_at: now,
    }
}

pub fn create_heading_block(level: u8, content: impl Into<String>) -> Block {
    let block_type = BlockType::heading(level);
    Block {
        content: content.into(),
        properties: BlockProperties {
            level: block_type.heading_level(),
            ..BlockProperties::default()
        },
        ..create_empty_block(block_type)
    }
}

/// Creates a list block with one item per entry of `items`.
///
/// Non-list `kind`s fall back to a bullet list.
pub fn create_list_block<S: Into<String>>(kind: BlockType, items: impl IntoIterator<Item = S>) -> Block {
    let kind = if kind.is_list() { kind } else { BlockType::BulletList };
    let list_items = items
        .into_iter()
        .map(|content| ListItem::new(content, kind))
        .collect();
    Block {
        properties: BlockProperties {
            list_items: Some(list_items),
            ..BlockProperties::default()
        },
        ..create_empty_block(kind)
    }
}

pub fn create_callout_block(content: impl Into<String>, callout_type: CalloutType) -> Block {
    Block {
        content: content.into(),
        properties: BlockProperties {
            callout_type: Some(callout_type),
            ..BlockProperties::default()
        },
        ..create_empty_block(BlockType::Callout)
    }
}

pub fn create_code_block(content: impl Into<String>, language: impl Into<String>) -> Block {
    Block {
        content: content.into(),
        properties: BlockProperties {
            language: Some(language.into()),
            ..BlockProperties::default()
        },
        ..create_empty_block(BlockType::Code)
    }
}

pub fn create_image_block(image_url: impl Into<String>, image_alt: impl Into<String>) -> Block {
    Block {
        properties: BlockProperties {
            image_url: Some(image_url.into()),
            image_alt: Some(image_alt.into()),
            ..BlockProperties::default()
        },
        ..create_empty_block(BlockType::Image)
    }
}

/// The property bag a freshly inserted block of `block_type` starts with.
pub fn default_properties(block_type: BlockType) -> BlockProperties {
    match block_type {
        t if t.heading_level().is_some() => BlockProperties {
            level: t.heading_level(),
            ..BlockProperties::default()
        },
        t if t.is_list() => BlockProperties {
            list_items: Some(vec![ListItem::new("", t)]),
            ..BlockProperties::default()
        },
        BlockType::Callout => BlockProperties {
            callout_type: Some(CalloutType::Info),
            ..BlockProperties::default()
        },
        BlockType::Code => BlockProperties {
            language: Some(DEFAULT_CODE_LANGUAGE.to_string()),
            ..BlockProperties::default()
        },
        _ => BlockProperties::default(),
    }
}

/// Deep copy of `block` with a fresh ID and refreshed timestamps.
pub fn duplicate_block(block: &Block) -> Block {
    let now = Utc::now().max(block.updated_at);
    Block {
        id: generate_block_id(),
        created_at: now,
        updated_at: now,
        ..block.clone()
    }
}

/// Whether `from` may be converted in place to `to`.
///
/// Text blocks convert among themselves, lists convert among themselves,
/// and paragraph ↔ code is the only cross-group edge.
pub fn can_convert_block_type(from: BlockType, to: BlockType) -> bool {
    if from.is_text() && to.is_text() {
        return true;
    }
    if from.is_list() && to.is_list() {
        return true;
    }
    matches!(
        (from, to),
        (BlockType::Paragraph, BlockType::Code) | (BlockType::Code, BlockType::Paragraph)
    )
}

/// Converts `block` to `to`, rebuilding its properties for the target shape.
///
/// Illegal pairs return an unchanged copy of `block`.
pub fn convert_block_type(block: &Block, to: BlockType) -> Block {
    if !can_convert_block_type(block.block_type, to) {
        return block.clone();
    }

    let mut converted = Block {
        block_type: to,
        properties: BlockProperties::default(),
        ..block.clone()
    };
    converted.touch();

    if let Some(level) = to.heading_level() {
        converted.properties.level = Some(level);
    } else if to.is_list() {
        converted.properties.list_items = Some(vec![ListItem::new(block.content.clone(), to)]);
        converted.content = String::new();
    } else if block.block_type.is_list() {
        converted.content = block
            .list_items()
            .first()
            .map(|item| item.content.clone())
            .unwrap_or_default();
    }

    converted
}

/// Short human-readable rendering of a block's content.
pub fn display_content(block: &Block) -> String {
    match block.block_type {
        t if t.is_list() => block
            .list_items()
            .iter()
            .map(|item| item.content.as_str())
            .collect::<Vec<_>>()
            .join(", "),
        BlockType::Image => block
            .properties
            .image_alt
            .clone()
            .filter(|alt| !alt.is_empty())
            .unwrap_or_else(|| "Image".to_string()),
        BlockType::Divider => "---".to_string(),
        _ => block.content.clone(),
    }
}

/// Case-insensitive containment test over content, list items, and image alt text.
pub fn search_in_block(block: &Block, query: &str) -> bool {
    let needle = query.to_lowercase();
    if block.content.to_lowercase().contains(&needle) {
        return true;
    }
    if block
        .list_items()
        .iter()
        .any(|item| item.content.to_lowercase().contains(&needle))
    {
        return true;
    }
    block
        .properties
        .image_alt
        .as_deref()
        .is_some_and(|alt| alt.to_lowercase().contains(&needle))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(content: &str) -> Block {
        Block {
            content: content.to_string(),
            ..create_empty_block(BlockType::Paragraph)
        }
    }

    #[test]
    fn test_create_empty_block() {
        let block = create_empty_block(BlockType::Quote);
        assert_eq!(block.block_type, BlockType::Quote);
        assert!(block.content.is_empty());
        assert_eq!(block.properties, BlockProperties::default());
        assert!(block.id.starts_with("block_"));
        assert_eq!(block.created_at, block.updated_at);
    }

    #[test]
    fn test_block_type_serializes_lower_camel() {
        let json = serde_json::to_string(&BlockType::NumberedList).unwrap();
        assert_eq!(json, r#""numberedList""#);
        let json = serde_json::to_string(&BlockType::Heading2).unwrap();
        assert_eq!(json, r#""heading2""#);
        for t in BlockType::EDITABLE {
            assert_eq!(serde_json::to_string(&t).unwrap(), format!("\"{}\"", t.as_str()));
        }
    }

    #[test]
    fn test_block_serializes_type_field_and_skips_empty_properties() {
        let block = create_code_block("fn main() {}", "rust");
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "code");
        assert_eq!(json["properties"]["language"], "rust");
        assert!(json["properties"].get("listItems").is_none());
        assert_eq!(json["createdAt"]["_type"], "Date");
    }

    #[test]
    fn test_duplicate_block_preserves_content() {
        let original = create_list_block(BlockType::CheckList, ["a", "b"]);
        let copy = duplicate_block(&original);
        assert_ne!(copy.id, original.id);
        assert_eq!(copy.content, original.content);
        assert_eq!(copy.properties, original.properties);
        assert_eq!(copy.block_type, original.block_type);
        assert!(copy.updated_at >= original.updated_at);
    }

    #[test]
    fn test_can_convert_within_groups_only() {
        let text = [
            BlockType::Paragraph,
            BlockType::Heading1,
            BlockType::Heading2,
            BlockType::Heading3,
            BlockType::Quote,
        ];
        let lists = [BlockType::BulletList, BlockType::NumberedList, BlockType::CheckList];

        for &a in &text {
            for &b in &text {
                assert!(can_convert_block_type(a, b));
            }
            for &l in &lists {
                assert!(!can_convert_block_type(a, l));
                assert!(!can_convert_block_type(l, a));
            }
        }
        for &a in &lists {
            for &b in &lists {
                assert!(can_convert_block_type(a, b));
            }
        }
    }

    #[test]
    fn test_can_convert_code_only_with_paragraph() {
        assert!(can_convert_block_type(BlockType::Paragraph, BlockType::Code));
        assert!(can_convert_block_type(BlockType::Code, BlockType::Paragraph));
        assert!(!can_convert_block_type(BlockType::Heading1, BlockType::Code));
        assert!(!can_convert_block_type(BlockType::Code, BlockType::Quote));
        assert!(!can_convert_block_type(BlockType::Code, BlockType::BulletList));
        assert!(!can_convert_block_type(BlockType::Callout, BlockType::Paragraph));
        assert!(!can_convert_block_type(BlockType::Image, BlockType::Divider));
    }

    #[test]
    fn test_convert_illegal_pair_returns_block_unchanged() {
        let block = create_callout_block("careful", CalloutType::Warning);
        let converted = convert_block_type(&block, BlockType::BulletList);
        assert_eq!(converted, block);
    }

    #[test]
    fn test_convert_paragraph_to_heading_sets_level() {
        let block = paragraph("Title");
        let converted = convert_block_type(&block, BlockType::Heading2);
        assert_eq!(converted.id, block.id);
        assert_eq!(converted.block_type, BlockType::Heading2);
        assert_eq!(converted.content, "Title");
        assert_eq!(converted.properties.level, Some(2));
        assert!(converted.updated_at >= block.updated_at);
    }

    #[test]
    fn test_convert_heading_to_quote_clears_level() {
        let block = create_heading_block(1, "Quote me");
        let converted = convert_block_type(&block, BlockType::Quote);
        assert_eq!(converted.properties, BlockProperties::default());
        assert_eq!(converted.content, "Quote me");
    }

    #[test]
    fn test_convert_list_to_list_seeds_single_item_from_content() {
        let block = create_list_block(BlockType::BulletList, ["one", "two"]);
        let converted = convert_block_type(&block, BlockType::CheckList);
        let items = converted.list_items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].content, "");
        assert_eq!(items[0].checked, Some(false));
        assert!(converted.content.is_empty());
    }

    #[test]
    fn test_convert_code_to_paragraph_drops_language() {
        let block = create_code_block("let x = 1;", "rust");
        let converted = convert_block_type(&block, BlockType::Paragraph);
        assert_eq!(converted.content, "let x = 1;");
        assert!(converted.properties.language.is_none());
    }

    #[test]
    fn test_list_item_editing() {
        let mut block = create_list_block(BlockType::CheckList, ["first"]);
        let id = block.add_list_item(0).unwrap();
        assert_eq!(block.list_items().len(), 2);
        assert_eq!(block.list_items()[1].id, id);
        assert_eq!(block.list_items()[1].checked, Some(false));

        block.set_list_item_content(1, "second");
        block.set_list_item_checked(1, true);
        assert_eq!(block.list_items()[1].content, "second");
        assert_eq!(block.list_items()[1].checked, Some(true));

        assert!(block.remove_list_item(0));
        assert!(!block.remove_list_item(0), "last item must stay");
        assert_eq!(block.list_items()[0].content, "second");
    }

    #[test]
    fn test_list_item_indent_is_clamped() {
        let mut block = create_list_block(BlockType::BulletList, ["x"]);
        for _ in 0..5 {
            block.indent_list_item(0, false);
        }
        assert_eq!(block.list_items()[0].indent_level, MAX_INDENT_LEVEL);
        for _ in 0..5 {
            block.indent_list_item(0, true);
        }
        assert_eq!(block.list_items()[0].indent_level, 0);
    }

    #[test]
    fn test_add_list_item_on_paragraph_is_refused() {
        let mut block = paragraph("text");
        assert!(block.add_list_item(0).is_none());
    }

    #[test]
    fn test_default_properties() {
        assert_eq!(default_properties(BlockType::Heading3).level, Some(3));
        assert_eq!(
            default_properties(BlockType::Callout).callout_type,
            Some(CalloutType::Info)
        );
        assert_eq!(
            default_properties(BlockType::Code).language.as_deref(),
            Some(DEFAULT_CODE_LANGUAGE)
        );
        let list = default_properties(BlockType::NumberedList);
        assert_eq!(list.list_items.as_ref().map(Vec::len), Some(1));
        assert_eq!(default_properties(BlockType::Divider), BlockProperties::default());
    }

    #[test]
    fn test_display_content() {
        let list = create_list_block(BlockType::BulletList, ["a", "b"]);
        assert_eq!(display_content(&list), "a, b");
        assert_eq!(display_content(&create_image_block("http://x", "")), "Image");
        assert_eq!(display_content(&create_image_block("http://x", "Cat")), "Cat");
        assert_eq!(display_content(&create_empty_block(BlockType::Divider)), "---");
    }

    #[test]
    fn test_search_in_block() {
        assert!(search_in_block(&paragraph("Hello World"), "world"));
        let list = create_list_block(BlockType::BulletList, ["Reduce onboarding time"]);
        assert!(search_in_block(&list, "ONBOARDING"));
        let image = create_image_block("http://x", "A red Fox");
        assert!(search_in_block(&image, "fox"));
        assert!(!search_in_block(&paragraph("Hello"), "bye"));
    }

    #[test]
    fn test_apply_update_bumps_timestamp() {
        let mut block = paragraph("old");
        let before = block.updated_at;
        block.apply(BlockUpdate::content("new"));
        assert_eq!(block.content, "new");
        assert!(block.updated_at >= before);
    }
}
