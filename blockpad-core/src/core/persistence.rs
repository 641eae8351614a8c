//! Persistence adapter: the whole workspace as one JSON blob under a single
//! key of a [`Storage`], plus settings under a second key.
//!
//! The plain methods mirror a fire-and-forget UI contract: failures are
//! logged and surface as `None`, `false`, or a lost write. The `try_`
//! variants return the underlying error instead.

use crate::core::page::Page;
use crate::core::settings::AppSettings;
use crate::core::storage::Storage;
use crate::core::workspace::Workspace;
use crate::{BlockpadError, DeleteStrategy, Result};
use log::{debug, error, info, warn};
use serde_json::Value;
use std::path::Path;

/// Storage key holding the serialized workspace.
pub const WORKSPACE_KEY: &str = "blockpad-workspace";

/// Storage key holding the serialized [`AppSettings`].
pub const SETTINGS_KEY: &str = "blockpad-settings";

pub struct WorkspaceStore {
    storage: Storage,
}

impl WorkspaceStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    /// Opens (or creates) the store file at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Ok(Self::new(Storage::open_or_create(path)?))
    }

    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Storage::in_memory()?))
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Reads the stored workspace; `Ok(None)` when nothing is stored.
    pub fn try_load_workspace(&self) -> Result<Option<Workspace>> {
        let Some(raw) = self.storage.get(WORKSPACE_KEY)? else {
            return Ok(None);
        };
        let workspace: Workspace = serde_json::from_str(&raw)?;
        info!(
            "Loaded workspace {} with {} pages",
            workspace.id(),
            workspace.pages().len()
        );
        Ok(Some(workspace))
    }

    /// Reads the stored workspace; unreadable data is logged and yields `None`.
    pub fn load_workspace(&self) -> Option<Workspace> {
        match self.try_load_workspace() {
            Ok(workspace) => workspace,
            Err(e) => {
                error!("Failed to load workspace: {e}");
                None
            }
        }
    }

    pub fn try_save_workspace(&self, workspace: &Workspace) -> Result<()> {
        let json = serde_json::to_string(workspace)?;
        self.storage.set(WORKSPACE_KEY, &json)?;
        debug!("Saved workspace {} ({} bytes)", workspace.id(), json.len());
        Ok(())
    }

    /// Overwrites the stored workspace; a failed write is logged and lost.
    pub fn save_workspace(&self, workspace: &Workspace) {
        if let Err(e) = self.try_save_workspace(workspace) {
            error!("Failed to save workspace {}: {e}", workspace.id());
        }
    }

    /// Loads the stored workspace, applies `change` if its ID is
    /// `workspace_id`, and writes it back.
    fn modify_stored(
        &self,
        workspace_id: &str,
        action: &str,
        change: impl FnOnce(&mut Workspace) -> Result<()>,
    ) {
        let Some(mut workspace) = self.load_workspace() else {
            debug!("No stored workspace to {action}");
            return;
        };
        if workspace.id() != workspace_id {
            debug!(
                "Stored workspace {} is not {workspace_id}; skipping {action}",
                workspace.id()
            );
            return;
        }
        match change(&mut workspace) {
            Ok(()) => self.save_workspace(&workspace),
            Err(e) if e.is_not_found() => debug!("Cannot {action}: {e}"),
            Err(e) => warn!("Cannot {action}: {e}"),
        }
    }

    pub fn add_to_recent(&self, workspace_id: &str, page_id: &str) {
        self.modify_stored(workspace_id, "record recent page", |ws| {
            ws.add_to_recent(page_id)
        });
    }

    pub fn toggle_favorite(&self, workspace_id: &str, page_id: &str) {
        self.modify_stored(workspace_id, "toggle favorite", |ws| {
            ws.toggle_favorite(page_id).map(|_| ())
        });
    }

    /// Inserts or replaces one page of the stored workspace.
    pub fn save_page(&self, workspace_id: &str, page: &Page) {
        self.modify_stored(workspace_id, "save page", |ws| {
            ws.upsert_page(page.clone());
            Ok(())
        });
    }

    /// Removes one page from the stored workspace, promoting its children.
    pub fn delete_page(&self, workspace_id: &str, page_id: &str) {
        self.modify_stored(workspace_id, "delete page", |ws| {
            ws.delete_page(page_id, DeleteStrategy::PromoteChildren)
                .map(|_| ())
        });
    }

    /// The stored workspace as pretty-printed JSON; `"null"` when nothing is stored.
    pub fn export_workspace(&self) -> String {
        let exported = match self.load_workspace() {
            Some(workspace) => serde_json::to_string_pretty(&workspace),
            None => Ok("null".to_string()),
        };
        exported.unwrap_or_else(|e| {
            error!("Failed to export workspace: {e}");
            "null".to_string()
        })
    }

    /// Validates and stores an exported workspace, replacing the current one.
    ///
    /// # Errors
    ///
    /// Returns [`BlockpadError::Json`] if `data` is not JSON and
    /// [`BlockpadError::InvalidImport`] if it lacks a workspace `id`, `name`,
    /// or `pages` array, or does not decode as a workspace.
    pub fn try_import_workspace(&self, data: &str) -> Result<Workspace> {
        let value: Value = serde_json::from_str(data)?;
        let has_text = |field: &str| {
            value
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|s| !s.is_empty())
        };
        if !has_text("id") || !has_text("name") || !value.get("pages").is_some_and(Value::is_array)
        {
            return Err(BlockpadError::InvalidImport(
                "Invalid workspace format".to_string(),
            ));
        }

        let mut workspace: Workspace = serde_json::from_value(value)
            .map_err(|e| BlockpadError::InvalidImport(e.to_string()))?;
        workspace.normalize();
        self.try_save_workspace(&workspace)?;
        info!(
            "Imported workspace {} with {} pages",
            workspace.id(),
            workspace.pages().len()
        );
        Ok(workspace)
    }

    /// Returns `true` if `data` was a valid workspace and has been stored.
    pub fn import_workspace(&self, data: &str) -> bool {
        match self.try_import_workspace(data) {
            Ok(_) => true,
            Err(e) => {
                error!("Failed to import workspace: {e}");
                false
            }
        }
    }

    pub fn clear_workspace(&self) {
        match self.storage.remove(WORKSPACE_KEY) {
            Ok(_) => info!("Cleared stored workspace"),
            Err(e) => error!("Failed to clear workspace: {e}"),
        }
    }

    pub fn save_settings(&self, settings: &AppSettings) {
        let result = serde_json::to_string(settings)
            .map_err(BlockpadError::from)
            .and_then(|json| self.storage.set(SETTINGS_KEY, &json));
        if let Err(e) = result {
            error!("Failed to save settings: {e}");
        }
    }

    /// Stored settings, or defaults when missing or unreadable.
    pub fn load_settings(&self) -> AppSettings {
        match self.storage.get(SETTINGS_KEY) {
            Ok(Some(raw)) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!("Ignoring unreadable settings: {e}");
                AppSettings::default()
            }),
            Ok(None) => AppSettings::default(),
            Err(e) => {
                error!("Failed to load settings: {e}");
                AppSettings::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::block::{create_list_block, BlockType};
    use crate::core::page::PageUpdate;
    use crate::core::settings::Theme;
    use tempfile::NamedTempFile;

    fn store() -> WorkspaceStore {
        WorkspaceStore::in_memory().unwrap()
    }

    fn sample_workspace() -> Workspace {
        let mut ws = Workspace::new("Team");
        let root = ws.initial_page_id().unwrap().to_string();
        let child = ws.create_page("Q4 Planning", Some(&root), None).unwrap();
        ws.update_page(
            &child,
            PageUpdate::blocks(vec![create_list_block(
                BlockType::CheckList,
                ["Reduce onboarding time"],
            )]),
        )
        .unwrap();
        ws.toggle_favorite(&child).unwrap();
        ws
    }

    #[test]
    fn test_load_empty_store() {
        assert!(store().load_workspace().is_none());
        assert_eq!(store().export_workspace(), "null");
    }

    #[test]
    fn test_save_load_round_trip() {
        let store = store();
        let ws = sample_workspace();
        store.save_workspace(&ws);
        let loaded = store.load_workspace().unwrap();
        assert_eq!(loaded, ws);
    }

    #[test]
    fn test_round_trip_on_disk() {
        let temp = NamedTempFile::new().unwrap();
        let ws = sample_workspace();
        {
            let store = WorkspaceStore::new(Storage::create(temp.path()).unwrap());
            store.save_workspace(&ws);
        }
        let store = WorkspaceStore::open(temp.path()).unwrap();
        assert_eq!(store.load_workspace().unwrap(), ws);
    }

    #[test]
    fn test_stored_dates_are_tagged() {
        let store = store();
        store.save_workspace(&sample_workspace());
        let raw = store.storage().get(WORKSPACE_KEY).unwrap().unwrap();
        let value: Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["pages"][0]["createdAt"]["_type"], "Date");
        assert!(value["pages"][0]["blocks"][0]["updatedAt"]["value"].is_string());
    }

    #[test]
    fn test_corrupt_blob_loads_as_none() {
        let store = store();
        store.storage().set(WORKSPACE_KEY, "{not json").unwrap();
        assert!(store.load_workspace().is_none());
        assert!(store.try_load_workspace().is_err());
    }

    #[test]
    fn test_add_to_recent_and_toggle_favorite() {
        let store = store();
        let ws = sample_workspace();
        let root = ws.pages()[0].id.clone();
        store.save_workspace(&ws);

        store.add_to_recent(ws.id(), &root);
        store.toggle_favorite(ws.id(), &root);
        let loaded = store.load_workspace().unwrap();
        assert_eq!(loaded.recent_page_ids()[0], root);
        assert!(loaded.favorite_page_ids().contains(&root));
        assert!(loaded.page(&root).unwrap().properties.is_favorite);

        store.toggle_favorite(ws.id(), &root);
        let loaded = store.load_workspace().unwrap();
        assert!(!loaded.favorite_page_ids().contains(&root));
    }

    #[test]
    fn test_mismatched_workspace_id_is_ignored() {
        let store = store();
        let ws = sample_workspace();
        let root = ws.pages()[0].id.clone();
        store.save_workspace(&ws);
        store.toggle_favorite("workspace_other", &root);
        assert_eq!(store.load_workspace().unwrap(), ws);
    }

    #[test]
    fn test_save_and_delete_page() {
        let store = store();
        let ws = sample_workspace();
        store.save_workspace(&ws);

        let extra = Page::new("Scratch", None);
        store.save_page(ws.id(), &extra);
        let mut renamed = extra.clone();
        renamed.title = "Scratchpad".to_string();
        store.save_page(ws.id(), &renamed);
        let loaded = store.load_workspace().unwrap();
        assert_eq!(loaded.pages().len(), ws.pages().len() + 1);
        assert_eq!(loaded.page(&extra.id).unwrap().title, "Scratchpad");

        let favorite = ws.favorite_page_ids()[0].clone();
        store.delete_page(ws.id(), &favorite);
        let loaded = store.load_workspace().unwrap();
        assert!(loaded.page(&favorite).is_none());
        assert!(!loaded.favorite_page_ids().contains(&favorite));
        assert!(!loaded.recent_page_ids().contains(&favorite));
    }

    #[test]
    fn test_export_import() {
        let source = store();
        let ws = sample_workspace();
        source.save_workspace(&ws);
        let exported = source.export_workspace();
        assert!(exported.contains('\n'));

        let target = store();
        assert!(target.import_workspace(&exported));
        assert_eq!(target.load_workspace().unwrap(), ws);
    }

    #[test]
    fn test_import_accepts_plain_dates() {
        let data = r#"{
            "id": "workspace_1",
            "name": "Imported",
            "pages": [{
                "id": "page_1",
                "title": "Hello",
                "blocks": [],
                "createdAt": "2024-01-02T03:04:05Z",
                "updatedAt": {"_type": "Date", "value": "2024-01-02T03:04:05Z"}
            }],
            "recentPages": ["page_1", "page_gone"]
        }"#;
        let store = store();
        let ws = store.try_import_workspace(data).unwrap();
        assert_eq!(ws.name(), "Imported");
        assert_eq!(ws.recent_page_ids(), ["page_1".to_string()]);
        assert_eq!(ws.pages()[0].created_at, ws.pages()[0].updated_at);
        assert_eq!(ws.pages()[0].blocks.len(), 1);
    }

    #[test]
    fn test_import_rejects_invalid_payloads() {
        let store = store();
        let ws = sample_workspace();
        store.save_workspace(&ws);

        assert!(!store.import_workspace("not json"));
        assert!(!store.import_workspace(r#"{"name":"x","pages":[]}"#));
        assert!(!store.import_workspace(r#"{"id":"w","name":"","pages":[]}"#));
        assert!(!store.import_workspace(r#"{"id":"w","name":"x","pages":{}}"#));
        assert!(matches!(
            store.try_import_workspace(r#"{"id":"w","name":"x"}"#),
            Err(BlockpadError::InvalidImport(_))
        ));
        assert_eq!(store.load_workspace().unwrap(), ws);
    }

    #[test]
    fn test_clear_workspace() {
        let store = store();
        store.save_workspace(&sample_workspace());
        store.clear_workspace();
        assert!(store.load_workspace().is_none());
    }

    #[test]
    fn test_settings_round_trip_and_fallback() {
        let store = store();
        assert_eq!(store.load_settings(), AppSettings::default());

        let settings = AppSettings {
            theme: Theme::Dark,
            auto_save: false,
            ..AppSettings::default()
        };
        store.save_settings(&settings);
        assert_eq!(store.load_settings(), settings);

        store.storage().set(SETTINGS_KEY, "garbage").unwrap();
        assert_eq!(store.load_settings(), AppSettings::default());
    }
}
