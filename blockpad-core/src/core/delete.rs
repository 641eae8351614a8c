//! Delete strategy and result types for page removal.
//!
//! This module defines [`DeleteStrategy`] and [`DeleteResult`], which are used
//! when removing pages from a [`Workspace`](super::workspace::Workspace).
//!
//! ## Strategies
//!
//! - [`DeleteStrategy::DeleteAll`] removes the target page and every page
//!   beneath it in the tree.
//! - [`DeleteStrategy::PromoteChildren`] removes only the target page and
//!   re-parents its direct children to the deleted page's parent.
//!
//! Either way the workspace's recent and favorite lists are swept of every
//! removed ID.
//!
//! ## Examples
//!
//! ```rust
//! use blockpad_core::{DeleteStrategy, DeleteResult};
//!
//! let strategy = DeleteStrategy::PromoteChildren;
//! let json = serde_json::to_string(&strategy).unwrap();
//! assert_eq!(json, r#""PromoteChildren""#);
//!
//! let result = DeleteResult {
//!     deleted_count: 2,
//!     affected_ids: vec!["page_a".to_string(), "page_b".to_string()],
//! };
//! let json = serde_json::to_string(&result).unwrap();
//! assert!(json.contains("deletedCount"));
//! assert!(json.contains("affectedIds"));
//! ```

use serde::{Deserialize, Serialize};

/// Determines what happens to a page's sub-pages when it is deleted.
///
/// Serialized as a PascalCase string (`"DeleteAll"`, `"PromoteChildren"`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum DeleteStrategy {
    /// Delete the target page and all of its descendants.
    DeleteAll,

    /// Delete only the target page and re-parent its children to its former parent.
    #[default]
    PromoteChildren,
}

/// The outcome of a page delete.
///
/// # Examples
///
/// ```rust
/// use blockpad_core::DeleteResult;
///
/// let result = DeleteResult {
///     deleted_count: 1,
///     affected_ids: vec!["page_abc".to_string()],
/// };
/// assert_eq!(result.deleted_count, 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteResult {
    /// The number of pages that were removed.
    pub deleted_count: usize,

    /// IDs of all pages that were removed or re-parented.
    pub affected_ids: Vec<String>,
}
