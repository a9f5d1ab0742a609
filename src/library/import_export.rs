use std::collections::HashSet;

use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::AppError;

use super::model::Snippet;
use super::store::MAX_LIBRARY_ITEMS;

lazy_static! {
    /// `(defun c:NAME` — the canonical AutoLISP command definition.
    static ref COMMAND_NAME: Regex = Regex::new(r"(?i)c:([a-zA-Z0-9_-]+)").unwrap();
    static ref LINE_COMMENT: Regex = Regex::new(r"(?m);.*$").unwrap();
}

/// Result of one import merge.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ImportOutcome {
    pub accepted: usize,
    pub skipped: usize,
}

/// Case- and whitespace-insensitive code fingerprint, comments stripped.
/// Two snippets with the same fingerprint are the same routine regardless
/// of formatting.
pub fn normalize_code(code: &str) -> String {
    let stripped = LINE_COMMENT.replace_all(code, "");
    stripped
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Extracts the command name defined in a code body, lowercased.
pub fn extract_command_name(code: &str) -> Option<String> {
    COMMAND_NAME
        .captures(code)
        .map(|c| c[1].to_lowercase())
}

/// Structural validation of an import payload. The file must hold a JSON
/// array; if non-empty, the first element must carry both `id` and `code`.
pub fn parse_import(json: &str) -> Result<Vec<Snippet>, AppError> {
    let value: serde_json::Value = serde_json::from_str(json)
        .map_err(|_| AppError::FormatError("Dosya bozuk veya format hatalı.".to_string()))?;

    let items = value
        .as_array()
        .ok_or_else(|| AppError::FormatError("Geçersiz format: Dosya bir liste içermiyor.".to_string()))?;

    if let Some(first) = items.first() {
        if first.get("id").is_none() || first.get("code").is_none() {
            return Err(AppError::FormatError(
                "Geçersiz veri yapısı: Eksik alanlar var.".to_string(),
            ));
        }
    }

    serde_json::from_value(value)
        .map_err(|_| AppError::FormatError("Geçersiz veri yapısı: Eksik alanlar var.".to_string()))
}

/// Duplicate-detection keys of the live collection plus every candidate
/// accepted so far, so later candidates in the same batch dedupe against
/// earlier ones.
struct DedupIndex {
    ids: HashSet<String>,
    titles: HashSet<String>,
    codes: HashSet<String>,
    commands: HashSet<String>,
}

impl DedupIndex {
    fn build(collection: &[Snippet]) -> Self {
        let mut index = Self {
            ids: HashSet::new(),
            titles: HashSet::new(),
            codes: HashSet::new(),
            commands: HashSet::new(),
        };
        for item in collection {
            index.insert(item);
        }
        index
    }

    fn insert(&mut self, item: &Snippet) {
        self.ids.insert(item.id.clone());
        self.titles.insert(normalize_title(&item.title));
        self.codes.insert(normalize_code(&item.code));
        if let Some(cmd) = extract_command_name(&item.code) {
            self.commands.insert(cmd);
        }
    }

    /// Tested in fixed order: id, title, code body, command name. The first
    /// hit marks the candidate a duplicate.
    fn is_duplicate(&self, item: &Snippet) -> bool {
        if self.ids.contains(&item.id) {
            return true;
        }
        if self.titles.contains(&normalize_title(&item.title)) {
            return true;
        }
        if self.codes.contains(&normalize_code(&item.code)) {
            return true;
        }
        if let Some(cmd) = extract_command_name(&item.code) {
            if self.commands.contains(&cmd) {
                return true;
            }
        }
        false
    }
}

/// Merges an externally supplied batch into the collection without breaking
/// the uniqueness invariants. Accepted items are prepended as one group in
/// batch order. Processing stops once the available capacity
/// (cap − current size) worth of candidates has been examined.
pub fn merge_import(
    collection: &mut Vec<Snippet>,
    batch: Vec<Snippet>,
) -> Result<ImportOutcome, AppError> {
    if collection.len() >= MAX_LIBRARY_ITEMS {
        return Err(AppError::CapacityExceeded(MAX_LIBRARY_ITEMS));
    }

    let available = MAX_LIBRARY_ITEMS - collection.len();
    let mut index = DedupIndex::build(collection);
    let mut outcome = ImportOutcome::default();
    let mut accepted: Vec<Snippet> = Vec::new();

    for candidate in batch.into_iter().take(available) {
        if index.is_duplicate(&candidate) {
            outcome.skipped += 1;
            continue;
        }
        index.insert(&candidate);
        accepted.push(candidate);
        outcome.accepted += 1;
    }

    if !accepted.is_empty() {
        accepted.append(collection);
        *collection = accepted;
    }
    Ok(outcome)
}

/// Pretty-printed export payload of the full collection.
pub fn export_json(collection: &[Snippet]) -> Result<String, AppError> {
    serde_json::to_string_pretty(collection).map_err(|e| AppError::FormatError(e.to_string()))
}

/// Backup filename carrying the export date.
pub fn export_filename(now: DateTime<Utc>) -> String {
    format!("LispDesk_Library_{}.json", now.format("%Y-%m-%d"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::library::model::Category;
    use crate::library::seed::seed_library;

    fn snippet(id: &str, title: &str, code: &str) -> Snippet {
        Snippet {
            id: id.to_string(),
            title: title.to_string(),
            description: String::new(),
            code: code.to_string(),
            category: Category::Other,
            keywords: vec![],
            author: None,
            downloads: None,
            likes: None,
        }
    }

    #[test]
    fn command_name_extraction() {
        assert_eq!(
            extract_command_name("(defun c:TLEN (/ ss) (princ))"),
            Some("tlen".to_string())
        );
        assert_eq!(extract_command_name("(setq a 1)"), None);
    }

    #[test]
    fn code_normalization_ignores_comments_whitespace_and_case() {
        let a = ";; total length\n(defun c:TLEN ()\n  (princ)\n)";
        let b = "(DEFUN C:TLEN () (PRINC))";
        assert_eq!(normalize_code(a), normalize_code(b));
    }

    #[test]
    fn parse_rejects_non_array_and_missing_fields() {
        assert!(matches!(
            parse_import("{\"id\": \"x\"}"),
            Err(AppError::FormatError(_))
        ));
        assert!(matches!(
            parse_import("[{\"title\": \"no id or code\"}]"),
            Err(AppError::FormatError(_))
        ));
        assert!(parse_import("[]").unwrap().is_empty());
    }

    #[test]
    fn same_code_different_id_is_skipped() {
        let mut collection = vec![snippet("a", "Original", "(defun c:AAA () (princ))")];
        let batch = vec![snippet("b", "Renamed", "(defun c:AAA ()\n  (princ))")];
        let outcome = merge_import(&mut collection, batch).unwrap();
        assert_eq!(outcome, ImportOutcome { accepted: 0, skipped: 1 });
        assert_eq!(collection.len(), 1);
    }

    #[test]
    fn batch_members_dedupe_against_each_other() {
        let mut collection = vec![];
        let batch = vec![
            snippet("a", "First", "(defun c:AAA () (princ))"),
            snippet("b", "Second", "(defun c:aaa () (princ) )"),
        ];
        let outcome = merge_import(&mut collection, batch).unwrap();
        assert_eq!(outcome, ImportOutcome { accepted: 1, skipped: 1 });
    }

    #[test]
    fn title_collision_is_case_and_trim_insensitive() {
        let mut collection = vec![snippet("a", "Toplam Uzunluk", "(defun c:X1 () (princ))")];
        let batch = vec![snippet("b", "  toplam uzunluk ", "(defun c:X2 () (princ))")];
        let outcome = merge_import(&mut collection, batch).unwrap();
        assert_eq!(outcome.skipped, 1);
    }

    #[test]
    fn accepted_items_are_prepended_in_batch_order() {
        let mut collection = vec![snippet("old", "Old", "(defun c:OLD () (princ))")];
        let batch = vec![
            snippet("n1", "New One", "(defun c:N1 () (princ))"),
            snippet("n2", "New Two", "(defun c:N2 () (princ))"),
        ];
        merge_import(&mut collection, batch).unwrap();
        let ids: Vec<&str> = collection.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["n1", "n2", "old"]);
    }

    #[test]
    fn import_stops_at_available_capacity() {
        let mut collection: Vec<Snippet> = (0..MAX_LIBRARY_ITEMS - 2)
            .map(|i| snippet(&format!("s{i}"), &format!("S{i}"), &format!("(defun c:S{i} () (princ))")))
            .collect();
        let batch: Vec<Snippet> = (0..5)
            .map(|i| snippet(&format!("n{i}"), &format!("N{i}"), &format!("(defun c:N{i} () (princ))")))
            .collect();
        let outcome = merge_import(&mut collection, batch).unwrap();
        assert_eq!(outcome.accepted + outcome.skipped, 2);
        assert_eq!(collection.len(), MAX_LIBRARY_ITEMS);
    }

    #[test]
    fn import_rejected_outright_when_store_is_full() {
        let mut collection: Vec<Snippet> = (0..MAX_LIBRARY_ITEMS)
            .map(|i| snippet(&format!("s{i}"), &format!("S{i}"), ""))
            .collect();
        assert!(matches!(
            merge_import(&mut collection, vec![snippet("x", "X", "")]),
            Err(AppError::CapacityExceeded(_))
        ));
    }

    #[test]
    fn export_then_import_skips_everything() {
        let mut collection = seed_library();
        let exported = export_json(&collection).unwrap();
        let batch = parse_import(&exported).unwrap();
        let size = collection.len();
        let outcome = merge_import(&mut collection, batch).unwrap();
        assert_eq!(outcome.accepted, 0);
        assert_eq!(outcome.skipped, size);
        assert_eq!(collection.len(), size);
    }

    #[test]
    fn export_filename_carries_the_date() {
        use chrono::TimeZone;
        let now = Utc.with_ymd_and_hms(2026, 8, 28, 12, 0, 0).unwrap();
        assert_eq!(export_filename(now), "LispDesk_Library_2026-08-28.json");
    }
}
