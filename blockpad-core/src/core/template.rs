//! Page templates: reusable stamps of block specs used to seed new pages.

use crate::core::block::{
    generate_block_id, generate_item_id, Block, BlockProperties, BlockType, ListItem,
};
use crate::core::page::PageProperties;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Grouping shown in the template picker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateCategory {
    General,
    Meeting,
    Project,
    Personal,
    Knowledge,
}

/// A block without identity: type, content, and properties only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockSpec {
    #[serde(rename = "type")]
    pub block_type: BlockType,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub properties: BlockProperties,
}

impl BlockSpec {
    pub fn new(block_type: BlockType, content: impl Into<String>) -> Self {
        Self {
            block_type,
            content: content.into(),
            properties: BlockProperties {
                level: block_type.heading_level(),
                ..BlockProperties::default()
            },
        }
    }

    pub fn list(kind: BlockType, items: &[&str]) -> Self {
        Self {
            block_type: kind,
            content: String::new(),
            properties: BlockProperties {
                list_items: Some(items.iter().map(|c| ListItem::new(*c, kind)).collect()),
                ..BlockProperties::default()
            },
        }
    }

    /// Stamps out a block with fresh block and list-item IDs and current timestamps.
    pub fn instantiate(&self) -> Block {
        let now = Utc::now();
        let mut properties = self.properties.clone();
        if let Some(items) = properties.list_items.as_mut() {
            for item in items.iter_mut() {
                item.id = generate_item_id();
            }
        }
        Block {
            id: generate_block_id(),
            block_type: self.block_type,
            content: self.content.clone(),
            properties,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    pub description: String,
    pub category: TemplateCategory,
    pub blocks: Vec<BlockSpec>,
    #[serde(default)]
    pub properties: PageProperties,
}

impl Template {
    /// Fresh blocks for a new page, one per spec, in spec order.
    pub fn instantiate_blocks(&self) -> Vec<Block> {
        self.blocks.iter().map(BlockSpec::instantiate).collect()
    }
}

/// Templates bundled with every new workspace.
pub fn starter_templates() -> Vec<Template> {
    vec![
        Template {
            id: "template_meeting_notes".to_string(),
            name: "Meeting Notes".to_string(),
            description: "Structured template for meeting documentation".to_string(),
            category: TemplateCategory::Meeting,
            blocks: vec![
                BlockSpec::new(BlockType::Heading1, "Meeting Notes"),
                BlockSpec::list(
                    BlockType::BulletList,
                    &["Date: ", "Attendees: ", "Location: "],
                ),
                BlockSpec::new(BlockType::Heading2, "Agenda"),
                BlockSpec::list(BlockType::NumberedList, &["Item 1", "Item 2"]),
                BlockSpec::new(BlockType::Heading2, "Action Items"),
                BlockSpec::list(BlockType::CheckList, &["Task 1 - Assigned to:"]),
            ],
            properties: PageProperties {
                icon: Some("📋".to_string()),
                tags: vec!["meeting".to_string(), "notes".to_string()],
                ..PageProperties::default()
            },
        },
        Template {
            id: "template_project_planning".to_string(),
            name: "Project Planning".to_string(),
            description: "Goals, milestones, and owners for a new project".to_string(),
            category: TemplateCategory::Project,
            blocks: vec![
                BlockSpec::new(BlockType::Heading1, "Project Plan"),
                BlockSpec::new(BlockType::Heading2, "Goals"),
                BlockSpec::list(BlockType::NumberedList, &["Primary objective", "Success metrics"]),
                BlockSpec::new(BlockType::Heading2, "Milestones"),
                BlockSpec::list(
                    BlockType::CheckList,
                    &["Phase 1: Planning", "Phase 2: Development", "Phase 3: Launch"],
                ),
            ],
            properties: PageProperties {
                icon: Some("🚀".to_string()),
                tags: vec!["project".to_string()],
                ..PageProperties::default()
            },
        },
        Template {
            id: "template_daily_journal".to_string(),
            name: "Daily Journal".to_string(),
            description: "Priorities and reflections for the day".to_string(),
            category: TemplateCategory::Personal,
            blocks: vec![
                BlockSpec::new(BlockType::Heading1, "Daily Journal"),
                BlockSpec::list(BlockType::CheckList, &["Most important task"]),
                BlockSpec::new(BlockType::Paragraph, "What went well today?"),
            ],
            properties: PageProperties {
                icon: Some("📓".to_string()),
                tags: vec!["journal".to_string()],
                ..PageProperties::default()
            },
        },
    ]
}
