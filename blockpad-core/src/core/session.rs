//! The application controller: owns the workspace, the store it is saved
//! to, the editor for the open page, and the search panel state.
//!
//! Editor changes are written back into the workspace whenever the editor's
//! revision moves, and the workspace is saved after every change while
//! `auto_save` is on.

use crate::core::editor::{Editor, KeyEvent};
use crate::core::page::{Page, PageUpdate};
use crate::core::persistence::WorkspaceStore;
use crate::core::search::{group_by_page, SearchEngine, SearchGroup, SearchResult, SearchState};
use crate::core::settings::AppSettings;
use crate::core::workspace::Workspace;
use crate::{DeleteResult, DeleteStrategy, Result};
use log::{debug, info};

/// Name given to the workspace created on first launch.
pub const DEFAULT_WORKSPACE_NAME: &str = "My Workspace";

struct OpenPage {
    page_id: String,
    editor: Editor,
    committed: u64,
}

pub struct Session {
    workspace: Workspace,
    store: WorkspaceStore,
    settings: AppSettings,
    open: Option<OpenPage>,
    search: SearchState,
    engine: SearchEngine,
}

impl Session {
    /// Loads the stored workspace (or creates and saves a fresh one) and
    /// opens its initial page.
    pub fn open(store: WorkspaceStore) -> Self {
        let settings = store.load_settings();
        let workspace = match store.load_workspace() {
            Some(mut workspace) => {
                workspace.normalize();
                workspace
            }
            None => {
                info!("No stored workspace; creating a new one");
                let workspace = Workspace::new(DEFAULT_WORKSPACE_NAME);
                store.save_workspace(&workspace);
                workspace
            }
        };

        let mut session = Self {
            workspace,
            store,
            settings,
            open: None,
            search: SearchState::default(),
            engine: SearchEngine::new(),
        };
        if let Some(id) = session.workspace.initial_page_id().map(str::to_string) {
            if let Err(e) = session.open_page(&id) {
                debug!("Could not open initial page: {e}");
            }
        }
        session
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn store(&self) -> &WorkspaceStore {
        &self.store
    }

    pub fn settings(&self) -> &AppSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: AppSettings) {
        self.store.save_settings(&settings);
        self.settings = settings;
    }

    /// Writes the workspace to the store regardless of `auto_save`.
    pub fn save(&mut self) -> Result<()> {
        self.commit_editor();
        self.store.try_save_workspace(&self.workspace)
    }

    fn changed(&self) {
        if self.settings.auto_save {
            self.store.save_workspace(&self.workspace);
        }
    }

    pub fn current_page_id(&self) -> Option<&str> {
        self.open.as_ref().map(|o| o.page_id.as_str())
    }

    pub fn current_page(&self) -> Option<&Page> {
        self.current_page_id().and_then(|id| self.workspace.page(id))
    }

    pub fn editor(&self) -> Option<&Editor> {
        self.open.as_ref().map(|o| &o.editor)
    }

    /// Switches the editor to `page_id`, committing pending edits first.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::PageNotFound`] if `page_id` does not exist.
    pub fn open_page(&mut self, page_id: &str) -> Result<()> {
        let blocks = self.workspace.get_page(page_id)?.blocks.clone();
        self.commit_editor();
        self.workspace.add_to_recent(page_id)?;
        self.open = Some(OpenPage {
            page_id: page_id.to_string(),
            editor: Editor::new(blocks),
            committed: 0,
        });
        self.changed();
        Ok(())
    }

    /// Writes the editor's blocks back into the open page if they changed.
    pub fn commit_editor(&mut self) {
        let Some(open) = self.open.as_mut() else {
            return;
        };
        if open.editor.revision() == open.committed {
            return;
        }
        let blocks = open.editor.blocks().to_vec();
        match self.workspace.update_page(&open.page_id, PageUpdate::blocks(blocks)) {
            Ok(()) => {
                open.committed = open.editor.revision();
                self.changed();
            }
            Err(e) => debug!("Dropping edits to a removed page: {e}"),
        }
    }

    /// Runs `edit` against the open page's editor and commits the result.
    ///
    /// Returns `None` when no page is open.
    pub fn edit<R>(&mut self, edit: impl FnOnce(&mut Editor) -> R) -> Option<R> {
        let out = edit(&mut self.open.as_mut()?.editor);
        self.commit_editor();
        Some(out)
    }

    /// Document-level key handling.
    ///
    /// Search keys come first. While the search panel is open, or when
    /// shortcuts are disabled in settings, editor shortcuts are not
    /// dispatched.
    pub fn handle_key_down(&mut self, event: &KeyEvent, target: Option<&str>) -> bool {
        if self.search.handle_key(event) {
            return true;
        }
        if self.search.is_open || !self.settings.keyboard_shortcuts {
            return false;
        }
        self.edit(|editor| editor.handle_key_down(event, target))
            .unwrap_or(false)
    }

    /// Creates a page, saves, and opens it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::PageNotFound`] for an unknown parent.
    pub fn create_page(
        &mut self,
        title: &str,
        parent_id: Option<&str>,
        template_id: Option<&str>,
    ) -> Result<String> {
        self.commit_editor();
        let id = self.workspace.create_page(title, parent_id, template_id)?;
        self.open_page(&id)?;
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::PageNotFound`] if `page_id` does not exist.
    pub fn rename_page(&mut self, page_id: &str, title: &str) -> Result<()> {
        self.commit_editor();
        self.workspace.update_page(page_id, PageUpdate::title(title))?;
        self.changed();
        Ok(())
    }

    /// Deletes a page; if the open page goes with it, the initial page opens.
    ///
    /// # Errors
    ///
    /// See [`Workspace::delete_page`].
    pub fn delete_page(&mut self, page_id: &str, strategy: DeleteStrategy) -> Result<DeleteResult> {
        self.commit_editor();
        let result = self.workspace.delete_page(page_id, strategy)?;
        let open_removed = self
            .current_page_id()
            .is_some_and(|id| self.workspace.page(id).is_none());
        if open_removed {
            self.open = None;
            if let Some(id) = self.workspace.initial_page_id().map(str::to_string) {
                self.open_page(&id)?;
            }
        }
        self.changed();
        Ok(result)
    }

    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::PageNotFound`] if `page_id` does not exist.
    pub fn duplicate_page(&mut self, page_id: &str) -> Result<String> {
        self.commit_editor();
        let id = self.workspace.duplicate_page(page_id)?;
        self.changed();
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`crate::BlockpadError::PageNotFound`] if `page_id` does not exist.
    pub fn toggle_favorite(&mut self, page_id: &str) -> Result<bool> {
        self.commit_editor();
        let favorite = self.workspace.toggle_favorite(page_id)?;
        self.changed();
        Ok(favorite)
    }

    /// # Errors
    ///
    /// See [`Workspace::move_page`].
    pub fn move_page(&mut self, page_id: &str, new_parent_id: Option<&str>) -> Result<()> {
        self.commit_editor();
        self.workspace.move_page(page_id, new_parent_id)?;
        self.changed();
        Ok(())
    }

    pub fn search_state(&self) -> &SearchState {
        &self.search
    }

    pub fn open_search(&mut self) {
        self.search.open();
    }

    pub fn close_search(&mut self) {
        self.search.close();
    }

    pub fn set_search_query(&mut self, query: &str) {
        self.commit_editor();
        self.search.set_query(query);
    }

    /// Ranked results for the current query.
    pub fn search_results(&self) -> Vec<SearchResult> {
        self.engine.search(self.workspace.pages(), &self.search.query)
    }

    pub fn search_groups(&self) -> Vec<SearchGroup> {
        group_by_page(&self.search_results())
    }

    pub fn search_suggestions(&self) -> Vec<String> {
        self.engine
            .suggestions(self.workspace.pages(), &self.search.query)
    }
}
