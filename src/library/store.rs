use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use crate::error::AppError;

use super::model::Snippet;
use super::seed::seed_library;

/// Upper bound on the persisted collection size.
pub const MAX_LIBRARY_ITEMS: usize = 999;

pub fn default_library_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_default()
        .join("com.lispdesk.app")
        .join("library.json")
}

/// Owner of the persisted snippet collection.
///
/// The store is the single writer; UI components read `snippets()` and issue
/// requests. Every mutation rewrites the whole collection to disk, and a
/// write failure leaves the in-memory state authoritative for the session.
pub struct SnippetStore {
    path: PathBuf,
    collection: Vec<Snippet>,
}

impl SnippetStore {
    /// Loads the persisted collection, falling back to the seed set on a
    /// missing or corrupted file, then runs the integrity reconciliation.
    /// The result is never empty.
    pub fn load(path: PathBuf) -> Self {
        let persisted = fs::read_to_string(&path)
            .ok()
            .and_then(|data| serde_json::from_str::<Vec<Snippet>>(&data).ok());

        let current = match persisted {
            Some(items) => items,
            None => {
                tracing::info!(path = %path.display(), "no usable library file, using seed set");
                seed_library()
            }
        };

        let before = current.len();
        let (collection, added_defaults) = Self::reconcile(current, &seed_library());
        let mut store = Self { path, collection };

        if added_defaults > 0 || store.collection.len() != before {
            tracing::info!(
                added_defaults,
                size = store.collection.len(),
                "library repaired during integrity check"
            );
            if let Err(e) = store.persist() {
                tracing::error!("failed to persist repaired library: {e}");
            }
        }
        store
    }

    /// Self-healing merge against the seed set: re-append any seed item whose
    /// id went missing, then deduplicate by id keeping the first occurrence.
    /// Seed repairs land after user items, so a user edit that reuses a
    /// built-in id wins over the seed version.
    ///
    /// Returns the cleaned collection and the number of re-added defaults.
    pub fn reconcile(current: Vec<Snippet>, seed: &[Snippet]) -> (Vec<Snippet>, usize) {
        let current_ids: HashSet<String> = current.iter().map(|s| s.id.clone()).collect();

        let mut fixed = current;
        let mut added_defaults = 0;
        for default_item in seed {
            if !current_ids.contains(&default_item.id) {
                fixed.push(default_item.clone());
                added_defaults += 1;
            }
        }

        let mut clean = Vec::with_capacity(fixed.len());
        let mut seen: HashSet<String> = HashSet::new();
        for item in fixed {
            if seen.insert(item.id.clone()) {
                clean.push(item);
            }
        }

        (clean, added_defaults)
    }

    pub fn snippets(&self) -> &[Snippet] {
        &self.collection
    }

    pub fn len(&self) -> usize {
        self.collection.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collection.is_empty()
    }

    /// Prepends a new snippet. Newest contributions take precedence in
    /// search order.
    pub fn add(&mut self, snippet: Snippet) -> Result<(), AppError> {
        if self.collection.len() >= MAX_LIBRARY_ITEMS {
            return Err(AppError::CapacityExceeded(MAX_LIBRARY_ITEMS));
        }
        self.collection.insert(0, snippet);
        self.persist()
    }

    /// Replaces the whole collection after a bulk merge. The caller is the
    /// import reconciler, which already enforced the uniqueness invariants.
    pub fn replace(&mut self, collection: Vec<Snippet>) -> Result<(), AppError> {
        self.collection = collection;
        self.persist()
    }

    /// Serializes the collection. I/O failures are reported, never thrown
    /// past the store boundary, and never drop in-memory state.
    pub fn persist(&self) -> Result<(), AppError> {
        let data = serde_json::to_string_pretty(&self.collection)
            .map_err(|e| AppError::PersistenceError(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| AppError::PersistenceError(e.to_string()))?;
        }
        fs::write(&self.path, data).map_err(|e| AppError::PersistenceError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::model::Category;
    use tempfile::TempDir;

    fn user_snippet(id: &str, title: &str) -> Snippet {
        Snippet {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            code: format!("(defun c:{} () (princ))", id.to_uppercase()),
            category: Category::Other,
            keywords: vec![],
            author: None,
            downloads: None,
            likes: None,
        }
    }

    #[test]
    fn load_falls_back_to_seed_on_missing_file() {
        let dir = TempDir::new().unwrap();
        let store = SnippetStore::load(dir.path().join("library.json"));
        assert!(!store.is_empty());
        assert_eq!(store.len(), seed_library().len());
    }

    #[test]
    fn load_falls_back_to_seed_on_corrupt_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        fs::write(&path, "{not json").unwrap();
        let store = SnippetStore::load(path);
        assert_eq!(store.len(), seed_library().len());
    }

    #[test]
    fn reconcile_restores_deleted_seed_items() {
        let seed = seed_library();
        // User deleted everything except one seed item and added their own.
        let current = vec![user_snippet("mine", "Mine"), seed[0].clone()];
        let (clean, added) = SnippetStore::reconcile(current, &seed);
        assert_eq!(added, seed.len() - 1);
        for item in &seed {
            assert_eq!(
                clean.iter().filter(|s| s.id == item.id).count(),
                1,
                "seed id {} must be present exactly once",
                item.id
            );
        }
        assert_eq!(clean[0].id, "mine");
    }

    #[test]
    fn reconcile_is_idempotent() {
        let seed = seed_library();
        let current = vec![user_snippet("mine", "Mine")];
        let (once, _) = SnippetStore::reconcile(current, &seed);
        let (twice, added) = SnippetStore::reconcile(once.clone(), &seed);
        assert_eq!(once, twice);
        assert_eq!(added, 0);
    }

    #[test]
    fn user_edit_reusing_seed_id_wins_over_seed_version() {
        let seed = seed_library();
        let mut edited = seed[0].clone();
        edited.title = "Edited by user".to_string();
        let (clean, _) = SnippetStore::reconcile(vec![edited.clone()], &seed);
        let kept = clean.iter().find(|s| s.id == edited.id).unwrap();
        assert_eq!(kept.title, "Edited by user");
    }

    #[test]
    fn add_prepends_and_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("library.json");
        let mut store = SnippetStore::load(path.clone());
        store.add(user_snippet("mine", "Mine")).unwrap();
        assert_eq!(store.snippets()[0].id, "mine");

        let reloaded = SnippetStore::load(path);
        assert_eq!(reloaded.snippets()[0].id, "mine");
    }

    #[test]
    fn add_rejects_at_capacity() {
        let dir = TempDir::new().unwrap();
        let mut store = SnippetStore::load(dir.path().join("library.json"));
        let filler: Vec<Snippet> = (0..MAX_LIBRARY_ITEMS)
            .map(|i| user_snippet(&format!("s{i}"), "S"))
            .collect();
        store.replace(filler).unwrap();
        assert!(matches!(
            store.add(user_snippet("extra", "Extra")),
            Err(AppError::CapacityExceeded(_))
        ));
        assert_eq!(store.len(), MAX_LIBRARY_ITEMS);
    }
}
