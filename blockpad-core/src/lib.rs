//! Core library for Blockpad, a local-first, block-based note-taking application.
//!
//! A [`Workspace`] holds pages; each [`Page`] is an ordered list of typed
//! [`Block`]s. The [`Editor`] state machine edits the blocks of one page,
//! [`SearchEngine`] ranks matches across all pages, and [`WorkspaceStore`]
//! persists the workspace as one JSON blob in a SQLite-backed [`Storage`].
//! [`Session`] ties these together for an application front end.
//!
//! Types are re-exported from their respective sub-modules for convenience;
//! consumers should import from the crate root rather than the `core` module.

pub mod core;

// Re-export commonly used types.
#[doc(inline)]
pub use core::{
    block::{
        can_convert_block_type, convert_block_type, create_callout_block, create_code_block,
        create_empty_block, create_heading_block, create_image_block, create_list_block,
        default_properties, display_content, duplicate_block, search_in_block, Block,
        BlockProperties, BlockType, BlockUpdate, CalloutType, ListItem, TableData,
    },
    delete::{DeleteResult, DeleteStrategy},
    editor::{
        markdown::markdown_trigger,
        slash::{filter_block_options, slash_query, BLOCK_OPTIONS},
        BlockOption, Editor, EditorState, Key, KeyEvent, SlashMenu,
    },
    error::{BlockpadError, Result},
    page::{Page, PageProperties, PageUpdate},
    persistence::{WorkspaceStore, SETTINGS_KEY, WORKSPACE_KEY},
    search::{
        group_by_page, highlight, HeuristicScorer, HighlightSpan, MatchType, RelevanceScorer,
        SearchEngine, SearchFilters, SearchGroup, SearchResult, SearchState,
    },
    session::Session,
    settings::{default_storage_path, AppSettings, Theme},
    storage::Storage,
    template::{starter_templates, BlockSpec, Template, TemplateCategory},
    workspace::Workspace,
};
