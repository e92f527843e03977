//! Whole-store backups as a semicolon separated `Key;Value` table.
//!
//! Each row holds one logical document, its JSON wrapped in double quotes with
//! inner quotes doubled. Files start with a UTF-8 byte order mark so
//! spreadsheet tools detect the encoding.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::NaiveDateTime;
use tally_core::{CoreError, DocumentKey, KeyValueStore};

use crate::write_atomic;

pub const BACKUP_HEADER: &str = "Key;Value";
const BYTE_ORDER_MARK: char = '\u{feff}';
const FILE_NAME_FORMAT: &str = "Tally_Backup_%Y-%m-%d_%H-%M.csv";

/// Keys written and ignored by an import.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub applied: Vec<String>,
    pub skipped: Vec<String>,
}

/// Renders every non-empty document in the fixed key order.
pub fn export_to_string(store: &dyn KeyValueStore) -> Result<String, CoreError> {
    let mut rows = vec![BACKUP_HEADER.to_string()];
    for key in DocumentKey::ALL {
        let Some(value) = store.get(key.as_str())?.filter(|value| !value.is_empty()) else {
            continue;
        };
        rows.push(format!("{};\"{}\"", key, value.replace('"', "\"\"")));
    }
    Ok(format!("{}{}", BYTE_ORDER_MARK, rows.join("\n")))
}

pub fn backup_file_name(at: NaiveDateTime) -> String {
    at.format(FILE_NAME_FORMAT).to_string()
}

/// Writes a backup into `dir` and returns its path.
pub fn write_export(
    store: &dyn KeyValueStore,
    dir: &Path,
    at: NaiveDateTime,
) -> Result<PathBuf, CoreError> {
    let path = dir.join(backup_file_name(at));
    write_atomic(&path, &export_to_string(store)?)?;
    tracing::info!(path = %path.display(), "exported backup");
    Ok(path)
}

/// Restores documents from backup text. Values are stored verbatim; rows with
/// unknown keys are reported as skipped.
pub fn import_from_str(store: &dyn KeyValueStore, text: &str) -> Result<ImportReport, CoreError> {
    let text = text.strip_prefix(BYTE_ORDER_MARK).unwrap_or(text);
    let header = text.lines().next().unwrap_or_default();
    if !header.contains(BACKUP_HEADER) {
        return Err(CoreError::Validation(format!(
            "backup is missing the `{BACKUP_HEADER}` header"
        )));
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut report = ImportReport::default();
    for record in reader.records() {
        let record = record
            .map_err(|err| CoreError::Validation(format!("malformed backup row: {err}")))?;
        let key = record.get(0).unwrap_or_default().trim();
        if key.is_empty() {
            continue;
        }
        // Unquoted values may themselves contain the delimiter.
        let value = record.iter().skip(1).collect::<Vec<_>>().join(";");
        match key.parse::<DocumentKey>() {
            Ok(document) => {
                store.set(document.as_str(), &value)?;
                report.applied.push(key.to_string());
            }
            Err(_) => {
                tracing::warn!(key, "skipping unknown backup key");
                report.skipped.push(key.to_string());
            }
        }
    }
    tracing::info!(
        applied = report.applied.len(),
        skipped = report.skipped.len(),
        "imported backup"
    );
    Ok(report)
}

pub fn import_from_path(store: &dyn KeyValueStore, path: &Path) -> Result<ImportReport, CoreError> {
    let text = fs::read_to_string(path)?;
    import_from_str(store, &text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tally_core::MemoryStore;

    #[test]
    fn export_quotes_values_and_skips_missing_keys() {
        let store = MemoryStore::new();
        store.set("categories", r#"[{"id":"1"}]"#).unwrap();
        store.set("copyrightImage", "").unwrap();

        let text = export_to_string(&store).unwrap();
        assert_eq!(
            text,
            "\u{feff}Key;Value\ncategories;\"[{\"\"id\"\":\"\"1\"\"}]\""
        );
    }

    #[test]
    fn file_name_carries_minute_timestamp() {
        let at = NaiveDate::from_ymd_opt(2026, 3, 9)
            .unwrap()
            .and_hms_opt(14, 5, 59)
            .unwrap();
        assert_eq!(backup_file_name(at), "Tally_Backup_2026-03-09_14-05.csv");
    }

    #[test]
    fn import_requires_header() {
        let store = MemoryStore::new();
        let err = import_from_str(&store, "categories;\"[]\"").unwrap_err();
        assert!(matches!(err, CoreError::Validation(_)));
    }

    #[test]
    fn import_unescapes_and_reports_unknown_keys() {
        let store = MemoryStore::new();
        let text = "\u{feff}Key;Value\r\ntransactions;\"[{\"\"id\"\":\"\"t1\"\"}]\"\r\nfinances;\"{}\"\r\n\r\n";
        let report = import_from_str(&store, text).unwrap();
        assert_eq!(report.applied, vec!["transactions".to_string()]);
        assert_eq!(report.skipped, vec!["finances".to_string()]);
        assert_eq!(
            store.get("transactions").unwrap().as_deref(),
            Some(r#"[{"id":"t1"}]"#)
        );
    }

    #[test]
    fn unquoted_values_keep_embedded_separators() {
        let store = MemoryStore::new();
        import_from_str(&store, "Key;Value\ncopyrightImage;data:a;b").unwrap();
        assert_eq!(
            store.get("copyrightImage").unwrap().as_deref(),
            Some("data:a;b")
        );
    }
}
