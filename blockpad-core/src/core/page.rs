use crate::core::block::{create_empty_block, Block, BlockType};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Icon given to pages created without a template icon.
pub const DEFAULT_PAGE_ICON: &str = "📄";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PageProperties {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    /// ID of the template the page was created from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    pub is_favorite: bool,
}

impl PageProperties {
    /// Overlays the fields `other` sets; tags are appended without duplicates.
    pub fn merge(&mut self, other: &PageProperties) {
        if other.icon.is_some() {
            self.icon = other.icon.clone();
        }
        if other.cover_image.is_some() {
            self.cover_image = other.cover_image.clone();
        }
        if other.template.is_some() {
            self.template = other.template.clone();
        }
        if other.is_public.is_some() {
            self.is_public = other.is_public;
        }
        for tag in &other.tags {
            if !self.tags.contains(tag) {
                self.tags.push(tag.clone());
            }
        }
    }
}

/// A titled container of ordered blocks, optionally parented under another page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: String,
    pub title: String,
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub properties: PageProperties,
    #[serde(with = "crate::core::dates")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "crate::core::dates")]
    pub updated_at: DateTime<Utc>,
}

/// Partial page fields merged in by [`Page::apply`].
///
/// The parent is deliberately absent: reparenting goes through
/// `Workspace::move_page`, which checks for cycles.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageUpdate {
    pub title: Option<String>,
    pub blocks: Option<Vec<Block>>,
    pub properties: Option<PageProperties>,
}

impl PageUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    pub fn blocks(blocks: Vec<Block>) -> Self {
        Self {
            blocks: Some(blocks),
            ..Self::default()
        }
    }
}

pub fn generate_page_id() -> String {
    format!("page_{}", Uuid::new_v4())
}

impl Page {
    /// A page holding a single empty paragraph.
    pub fn new(title: impl Into<String>, parent_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: generate_page_id(),
            title: title.into(),
            blocks: vec![create_empty_block(BlockType::Paragraph)],
            parent_id,
            properties: PageProperties {
                icon: Some(DEFAULT_PAGE_ICON.to_string()),
                ..PageProperties::default()
            },
            created_at: now,
            updated_at: now,
        }
    }

    pub fn apply(&mut self, update: PageUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(blocks) = update.blocks {
            self.blocks = blocks;
            self.ensure_non_empty();
        }
        if let Some(properties) = update.properties {
            self.properties = properties;
        }
        self.touch();
    }

    pub fn touch(&mut self) {
        self.updated_at = Utc::now().max(self.updated_at);
    }

    /// A page always keeps at least one block.
    pub fn ensure_non_empty(&mut self) {
        if self.blocks.is_empty() {
            self.blocks.push(create_empty_block(BlockType::Paragraph));
        }
    }

    pub fn block(&self, block_id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == block_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_page_has_one_paragraph() {
        let page = Page::new("Untitled", None);
        assert_eq!(page.blocks.len(), 1);
        assert_eq!(page.blocks[0].block_type, BlockType::Paragraph);
        assert_eq!(page.properties.icon.as_deref(), Some(DEFAULT_PAGE_ICON));
        assert!(!page.properties.is_favorite);
        assert!(page.id.starts_with("page_"));
    }

    #[test]
    fn test_apply_with_empty_blocks_keeps_one() {
        let mut page = Page::new("Untitled", None);
        page.apply(PageUpdate::blocks(vec![]));
        assert_eq!(page.blocks.len(), 1);
    }

    #[test]
    fn test_apply_merges_only_given_fields() {
        let mut page = Page::new("Old", None);
        let blocks = page.blocks.clone();
        let before = page.updated_at;
        page.apply(PageUpdate::title("New"));
        assert_eq!(page.title, "New");
        assert_eq!(page.blocks, blocks);
        assert!(page.updated_at >= before);
    }

    #[test]
    fn test_merge_properties() {
        let mut props = PageProperties {
            icon: Some(DEFAULT_PAGE_ICON.to_string()),
            tags: vec!["a".to_string()],
            ..PageProperties::default()
        };
        props.merge(&PageProperties {
            icon: Some("📋".to_string()),
            tags: vec!["a".to_string(), "b".to_string()],
            ..PageProperties::default()
        });
        assert_eq!(props.icon.as_deref(), Some("📋"));
        assert_eq!(props.tags, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_page_serializes_camel_case_without_parent() {
        let page = Page::new("Root", None);
        let json = serde_json::to_value(&page).unwrap();
        assert!(json.get("parentId").is_none());
        assert_eq!(json["properties"]["isFavorite"], false);
        assert_eq!(json["updatedAt"]["_type"], "Date");
    }
}
