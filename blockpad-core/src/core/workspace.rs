//! The workspace: every page, plus recents, favorites, and templates.

use crate::core::block::search_in_block;
use crate::core::page::{Page, PageUpdate};
use crate::core::template::{starter_templates, Template};
use crate::{BlockpadError, DeleteResult, DeleteStrategy, Result};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use uuid::Uuid;

/// Most-recent-first history is capped at this many page IDs.
pub const RECENT_PAGES_LIMIT: usize = 10;

/// How many recent pages [`Workspace::recent_pages`] resolves for display.
pub const RECENT_DISPLAY_LIMIT: usize = 5;

pub const DEFAULT_PAGE_TITLE: &str = "Untitled";

/// The top-level collection of pages for one user.
///
/// All mutations go through methods so the cross-references (`recent_pages`,
/// `favorite_pages`, page `parent_id`s) stay consistent with `pages`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    id: String,
    name: String,
    pages: Vec<Page>,
    #[serde(default)]
    recent_pages: Vec<String>,
    #[serde(default)]
    favorite_pages: Vec<String>,
    #[serde(default)]
    templates: Vec<Template>,
}

impl Workspace {
    /// Creates a workspace holding a single "Getting Started" page and the
    /// bundled starter templates.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: format!("workspace_{}", Uuid::new_v4()),
            name: name.into(),
            pages: vec![Page::new("Getting Started", None)],
            recent_pages: Vec::new(),
            favorite_pages: Vec::new(),
            templates: starter_templates(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Recent page IDs, most recent first.
    pub fn recent_page_ids(&self) -> &[String] {
        &self.recent_pages
    }

    pub fn favorite_page_ids(&self) -> &[String] {
        &self.favorite_pages
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn template(&self, template_id: &str) -> Option<&Template> {
        self.templates.iter().find(|t| t.id == template_id)
    }

    pub fn page(&self, page_id: &str) -> Option<&Page> {
        self.pages.iter().find(|p| p.id == page_id)
    }

    /// Fetches a page by ID.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::PageNotFound`] if no page has this ID.
    pub fn get_page(&self, page_id: &str) -> Result<&Page> {
        self.page(page_id)
            .ok_or_else(|| BlockpadError::PageNotFound(page_id.to_string()))
    }

    fn page_mut(&mut self, page_id: &str) -> Result<&mut Page> {
        self.pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| BlockpadError::PageNotFound(page_id.to_string()))
    }

    /// The page a freshly opened workspace should show: first favorite, else first page.
    pub fn initial_page_id(&self) -> Option<&str> {
        self.favorite_pages
            .iter()
            .find(|id| self.page(id).is_some())
            .or_else(|| self.pages.first().map(|p| &p.id))
            .map(String::as_str)
    }

    /// Creates a page and returns its ID.
    ///
    /// With a known `template_id` the page is seeded with fresh copies of the
    /// template's blocks and inherits its properties; otherwise it holds one
    /// empty paragraph. The new page becomes the most recent page.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::PageNotFound`] if `parent_id` names a page
    /// that does not exist.
    pub fn create_page(
        &mut self,
        title: &str,
        parent_id: Option<&str>,
        template_id: Option<&str>,
    ) -> Result<String> {
        if let Some(pid) = parent_id {
            self.get_page(pid)?;
        }

        let mut page = Page::new(title, parent_id.map(str::to_string));

        if let Some(tid) = template_id {
            match self.template(tid) {
                Some(template) => {
                    page.blocks = template.instantiate_blocks();
                    page.ensure_non_empty();
                    page.properties.merge(&template.properties);
                    page.properties.template = Some(template.id.clone());
                }
                None => warn!("Unknown template '{tid}', creating a blank page"),
            }
        }

        let id = page.id.clone();
        self.pages.push(page);
        self.push_recent(&id);
        Ok(id)
    }

    /// Merges `update` into a page, bumps its timestamp, and marks it recent.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::PageNotFound`] if `page_id` does not exist.
    pub fn update_page(&mut self, page_id: &str, update: PageUpdate) -> Result<()> {
        self.page_mut(page_id)?.apply(update);
        self.push_recent(page_id);
        Ok(())
    }

    /// Replaces the page with the same ID, or appends `page` if it is new.
    pub fn upsert_page(&mut self, page: Page) {
        match self.pages.iter_mut().find(|p| p.id == page.id) {
            Some(existing) => *existing = page,
            None => self.pages.push(page),
        }
    }

    /// Removes a page according to `strategy` and sweeps recents/favorites.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::PageNotFound`] if `page_id` does not exist, or
    /// [`BlockpadError::InvalidDelete`] if the delete would leave the
    /// workspace without pages.
    pub fn delete_page(&mut self, page_id: &str, strategy: DeleteStrategy) -> Result<DeleteResult> {
        let parent_id = self.get_page(page_id)?.parent_id.clone();

        let mut removed = vec![page_id.to_string()];
        if strategy == DeleteStrategy::DeleteAll {
            removed.extend(self.descendant_ids(page_id));
        }

        if removed.len() >= self.pages.len() {
            debug!("Refusing to delete page {page_id}: workspace would be empty");
            return Err(BlockpadError::InvalidDelete(
                "A workspace must keep at least one page".to_string(),
            ));
        }

        let mut affected_ids = removed.clone();
        if strategy == DeleteStrategy::PromoteChildren {
            for child in self
                .pages
                .iter_mut()
                .filter(|p| p.parent_id.as_deref() == Some(page_id))
            {
                child.parent_id = parent_id.clone();
                child.touch();
                affected_ids.push(child.id.clone());
            }
        }

        self.pages.retain(|p| !removed.contains(&p.id));
        self.recent_pages.retain(|id| !removed.contains(id));
        self.favorite_pages.retain(|id| !removed.contains(id));

        Ok(DeleteResult {
            deleted_count: removed.len(),
            affected_ids,
        })
    }

    /// Copies a page (title suffixed with " (Copy)", blocks with fresh IDs)
    /// under the same parent and returns the copy's ID.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::PageNotFound`] if `page_id` does not exist.
    pub fn duplicate_page(&mut self, page_id: &str) -> Result<String> {
        let original = self.get_page(page_id)?;
        let mut copy = Page::new(format!("{} (Copy)", original.title), original.parent_id.clone());
        copy.blocks = original
            .blocks
            .iter()
            .map(crate::core::block::duplicate_block)
            .collect();
        copy.ensure_non_empty();
        copy.properties = original.properties.clone();
        copy.properties.is_favorite = false;

        let id = copy.id.clone();
        self.pages.push(copy);
        Ok(id)
    }

    /// Flips a page's favorite flag and `favorite_pages` membership together.
    ///
    /// Returns the new favorite state.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::PageNotFound`] if `page_id` does not exist.
    pub fn toggle_favorite(&mut self, page_id: &str) -> Result<bool> {
        let was_favorite = self.favorite_pages.iter().any(|id| id == page_id);
        let page = self.page_mut(page_id)?;
        page.properties.is_favorite = !was_favorite;
        page.touch();

        if was_favorite {
            self.favorite_pages.retain(|id| id != page_id);
        } else {
            self.favorite_pages.push(page_id.to_string());
        }
        Ok(!was_favorite)
    }

    /// Reparents a page; `None` moves it to the root level.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::InvalidMove`] if the page would become its own
    /// parent or ancestor, and [`BlockpadError::PageNotFound`] if either page
    /// does not exist.
    pub fn move_page(&mut self, page_id: &str, new_parent_id: Option<&str>) -> Result<()> {
        self.get_page(page_id)?;

        if new_parent_id == Some(page_id) {
            return Err(BlockpadError::InvalidMove(
                "A page cannot be its own parent".to_string(),
            ));
        }

        if let Some(target) = new_parent_id {
            self.get_page(target)?;
            if self.ancestor_ids(target).iter().any(|id| id == page_id) {
                return Err(BlockpadError::InvalidMove(
                    "Move would create a cycle".to_string(),
                ));
            }
        }

        let page = self.page_mut(page_id)?;
        page.parent_id = new_parent_id.map(str::to_string);
        page.touch();
        Ok(())
    }

    /// Moves `page_id` to the front of the recent list.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::PageNotFound`] if `page_id` does not exist.
    pub fn add_to_recent(&mut self, page_id: &str) -> Result<()> {
        self.get_page(page_id)?;
        self.push_recent(page_id);
        Ok(())
    }

    fn push_recent(&mut self, page_id: &str) {
        self.recent_pages.retain(|id| id != page_id);
        self.recent_pages.insert(0, page_id.to_string());
        self.recent_pages.truncate(RECENT_PAGES_LIMIT);
    }

    /// Up to [`RECENT_DISPLAY_LIMIT`] recent pages that still exist.
    pub fn recent_pages(&self) -> Vec<&Page> {
        self.recent_pages
            .iter()
            .filter_map(|id| self.page(id))
            .take(RECENT_DISPLAY_LIMIT)
            .collect()
    }

    pub fn favorite_pages(&self) -> Vec<&Page> {
        self.favorite_pages
            .iter()
            .filter_map(|id| self.page(id))
            .collect()
    }

    /// Direct sub-pages of `page_id`, in workspace order.
    pub fn children(&self, page_id: &str) -> Vec<&Page> {
        self.pages
            .iter()
            .filter(|p| p.parent_id.as_deref() == Some(page_id))
            .collect()
    }

    /// Pages without a parent, plus pages whose parent no longer exists.
    pub fn root_pages(&self) -> Vec<&Page> {
        self.pages
            .iter()
            .filter(|p| match &p.parent_id {
                None => true,
                Some(pid) => self.page(pid).is_none(),
            })
            .collect()
    }

    /// Ancestor chain of `page_id`, nearest parent first.
    ///
    /// Stops at a missing parent or at the first repeated ID.
    fn ancestor_ids(&self, page_id: &str) -> Vec<String> {
        let mut seen = HashSet::from([page_id.to_string()]);
        let mut chain = Vec::new();
        let mut current = self.page(page_id).and_then(|p| p.parent_id.clone());
        while let Some(id) = current {
            if !seen.insert(id.clone()) {
                break;
            }
            current = self.page(&id).and_then(|p| p.parent_id.clone());
            chain.push(id);
        }
        chain
    }

    /// Every page beneath `page_id` in the tree.
    fn descendant_ids(&self, page_id: &str) -> Vec<String> {
        let mut seen = HashSet::from([page_id.to_string()]);
        let mut queue = vec![page_id.to_string()];
        let mut found = Vec::new();
        while let Some(current) = queue.pop() {
            for child in self.children(&current) {
                if seen.insert(child.id.clone()) {
                    found.push(child.id.clone());
                    queue.push(child.id.clone());
                }
            }
        }
        found
    }

    /// Root-first path from the top of the tree down to `page_id` (inclusive).
    pub fn breadcrumb(&self, page_id: &str) -> Vec<&Page> {
        let Some(page) = self.page(page_id) else {
            return Vec::new();
        };
        let mut trail: Vec<&Page> = self
            .ancestor_ids(page_id)
            .iter()
            .filter_map(|id| self.page(id))
            .collect();
        trail.reverse();
        trail.push(page);
        trail
    }

    /// Pages whose title or block content contains `query`, case-insensitively.
    pub fn search_pages(&self, query: &str) -> Vec<&Page> {
        if query.trim().is_empty() {
            return Vec::new();
        }
        let needle = query.to_lowercase();
        self.pages
            .iter()
            .filter(|p| {
                p.title.to_lowercase().contains(&needle)
                    || p.blocks.iter().any(|b| search_in_block(b, &needle))
            })
            .collect()
    }

    /// Drops recent/favorite IDs that no longer name a page and realigns
    /// each page's favorite flag with `favorite_pages`.
    ///
    /// Returns the number of dangling IDs removed.
    pub fn sweep_references(&mut self) -> usize {
        let known: HashSet<String> = self.pages.iter().map(|p| p.id.clone()).collect();
        let before = self.recent_pages.len() + self.favorite_pages.len();
        self.recent_pages.retain(|id| known.contains(id));
        self.favorite_pages.retain(|id| known.contains(id));
        let mut seen = HashSet::new();
        self.favorite_pages.retain(|id| seen.insert(id.clone()));
        self.recent_pages.truncate(RECENT_PAGES_LIMIT);

        let favorites: HashSet<&String> = self.favorite_pages.iter().collect();
        for page in &mut self.pages {
            page.properties.is_favorite = favorites.contains(&page.id);
        }

        let swept = before.saturating_sub(self.recent_pages.len() + self.favorite_pages.len());
        if swept > 0 {
            warn!("Swept {swept} dangling page references from workspace {}", self.id);
        }
        swept
    }

    /// Restores the structural rules on a workspace read from outside: at
    /// least one page, at least one block per page, no dangling references.
    pub fn normalize(&mut self) {
        if self.pages.is_empty() {
            warn!("Workspace {} has no pages; adding one", self.id);
            self.pages.push(Page::new(DEFAULT_PAGE_TITLE, None));
        }
        for page in &mut self.pages {
            page.ensure_non_empty();
        }
        self.sweep_references();
    }
}
