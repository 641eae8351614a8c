//! Internal domain modules for the Blockpad core library.
//!
//! All public types from these modules are re-exported at the crate root
//! with `#[doc(inline)]`; import from there in preference to this module.

pub mod block;
pub mod dates;
pub mod delete;
pub mod editor;
pub mod error;
pub mod page;
pub mod persistence;
pub mod search;
pub mod session;
pub mod settings;
pub mod storage;
pub mod template;
pub mod workspace;

#[doc(inline)]
pub use block::{
    can_convert_block_type, convert_block_type, create_callout_block, create_code_block,
    create_empty_block, create_heading_block, create_image_block, create_list_block,
    default_properties, display_content, duplicate_block, search_in_block, Block,
    BlockProperties, BlockType, BlockUpdate, CalloutType, ListItem, TableData,
};
#[doc(inline)]
pub use delete::{DeleteResult, DeleteStrategy};
#[doc(inline)]
pub use editor::{BlockOption, Editor, EditorState, Key, KeyEvent, SlashMenu};
#[doc(inline)]
pub use error::{BlockpadError, Result};
#[doc(inline)]
pub use page::{Page, PageProperties, PageUpdate};
#[doc(inline)]
pub use persistence::WorkspaceStore;
#[doc(inline)]
pub use search::{
    group_by_page, highlight, HeuristicScorer, HighlightSpan, MatchType, RelevanceScorer,
    SearchEngine, SearchFilters, SearchGroup, SearchResult, SearchState,
};
#[doc(inline)]
pub use session::Session;
#[doc(inline)]
pub use settings::{default_storage_path, AppSettings, Theme};
#[doc(inline)]
pub use storage::Storage;
#[doc(inline)]
pub use template::{starter_templates, BlockSpec, Template, TemplateCategory};
#[doc(inline)]
pub use workspace::Workspace;
