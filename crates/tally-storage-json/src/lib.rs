//! Filesystem persistence for the tracker: one JSON document per logical key,
//! plus the `Key;Value` backup format.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use tally_core::{CoreError, KeyValueStore};

pub mod backup;

pub use backup::{ImportReport, BACKUP_HEADER};

const DOCUMENT_EXTENSION: &str = "json";
const TMP_SUFFIX: &str = "tmp";

/// Stores each document as `<root>/<key>.json`, replacing files atomically.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CoreError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        tracing::debug!(root = %root.display(), "opened file store");
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn document_path(&self, key: &str) -> Result<PathBuf, CoreError> {
        validate_key(key)?;
        Ok(self
            .root
            .join(format!("{}.{}", key, DOCUMENT_EXTENSION)))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CoreError> {
        let path = self.document_path(key)?;
        if !path.exists() {
            return Ok(None);
        }
        Ok(Some(fs::read_to_string(path)?))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CoreError> {
        let path = self.document_path(key)?;
        write_atomic(&path, value)
    }

    fn remove(&self, key: &str) -> Result<(), CoreError> {
        let path = self.document_path(key)?;
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, CoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let path = entry?.path();
            if !path.is_file() {
                continue;
            }
            if path.extension().and_then(|ext| ext.to_str()) != Some(DOCUMENT_EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|stem| stem.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

fn validate_key(key: &str) -> Result<(), CoreError> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(CoreError::Storage(format!("invalid document key `{key}`")))
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

/// Writes `data` next to `path` and renames it into place.
pub(crate) fn write_atomic(path: &Path, data: &str) -> Result<(), CoreError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp = tmp_path(path);
    let mut file = File::create(&tmp)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    file.sync_all()?;
    fs::rename(&tmp, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tmp_path_appends_suffix_to_extension() {
        let tmp = tmp_path(Path::new("/data/transactions.json"));
        assert_eq!(tmp, PathBuf::from("/data/transactions.json.tmp"));
    }

    #[test]
    fn keys_with_path_separators_are_rejected() {
        assert!(validate_key("paymentMethods").is_ok());
        assert!(validate_key("../secrets").is_err());
        assert!(validate_key("").is_err());
    }
}
