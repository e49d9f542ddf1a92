//! File-backed key-value storage: one file per key.

use std::fs;
use std::io::Write;
#[cfg(unix)]
use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use super::KeyValueStore;
use crate::error::ChatError;

/// Configuration for [`FileStore`].
#[derive(Debug, Clone)]
pub struct FileStoreConfig {
    pub base_dir: PathBuf,
}

impl FileStoreConfig {
    pub fn new(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    pub fn default_dir() -> PathBuf {
        default_data_dir()
    }
}

/// Stores each key as a file under a base directory.
///
/// # Example
/// ```no_run
/// use jaat_chat::storage::{FileStore, FileStoreConfig, KeyValueStore};
///
/// let store = FileStore::new(FileStoreConfig::new("/tmp/jaat-chat".into()));
/// store.set("jaat_ai_active_conversation", "abc")?;
/// assert_eq!(store.get("jaat_ai_active_conversation")?.as_deref(), Some("abc"));
/// # Ok::<(), jaat_chat::error::ChatError>(())
/// ```
#[derive(Debug, Clone)]
pub struct FileStore {
    base_dir: PathBuf,
}

impl FileStore {
    pub fn new(config: FileStoreConfig) -> Self {
        Self {
            base_dir: config.base_dir,
        }
    }

    pub fn new_default() -> Self {
        Self {
            base_dir: default_data_dir(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(normalize_key(key))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, ChatError> {
        let path = self.key_path(key);
        match fs::read_to_string(&path) {
            Ok(data) => Ok(Some(data)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(ChatError::Io(err)),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), ChatError> {
        atomic_write(&self.key_path(key), value.as_bytes())
    }

    fn remove(&self, key: &str) -> Result<(), ChatError> {
        match fs::remove_file(self.key_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(ChatError::Io(err)),
        }
    }
}

fn default_data_dir() -> PathBuf {
    directories::UserDirs::new()
        .map(|dirs| dirs.home_dir().join(".jaat-chat"))
        .unwrap_or_else(|| PathBuf::from(".jaat-chat"))
}

/// File name used for `key`.
///
/// Lowercases and maps every character outside `[a-z0-9_-]` to `-`, so
/// distinct keys such as `Demo` and `demo` share one file. Callers that need
/// distinct keys must pick keys this leaves unchanged.
pub(crate) fn normalize_key(key: &str) -> String {
    let trimmed = key.trim();
    if trimmed.is_empty() {
        return "default".to_string();
    }
    let mut out = String::with_capacity(trimmed.len());
    for ch in trimmed.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() || lower == '-' || lower == '_' {
            out.push(lower);
        } else {
            out.push('-');
        }
    }
    out
}

fn atomic_write(path: &Path, data: &[u8]) -> Result<(), ChatError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let file_name = path.file_name().ok_or_else(|| {
        ChatError::Configuration(format!("Storage path {} has no file name", path.display()))
    })?;

    let nonce = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_nanos();
    let temp_name = format!(
        ".{}.tmp-{}-{nonce}",
        file_name.to_string_lossy(),
        std::process::id()
    );
    let temp_path = path.with_file_name(temp_name);

    let mut options = fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(0o600);

    let write_result = (|| -> std::io::Result<()> {
        let mut temp_file = options.open(&temp_path)?;
        temp_file.write_all(data)?;
        temp_file.sync_all()?;
        Ok(())
    })();

    if let Err(err) = write_result {
        let _ = fs::remove_file(&temp_path);
        return Err(ChatError::Io(err));
    }

    if let Err(err) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(ChatError::Io(err));
    }

    #[cfg(unix)]
    fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_store() -> (TempDir, FileStore) {
        let dir = TempDir::new().unwrap();
        let store = FileStore::new(FileStoreConfig::new(dir.path().to_path_buf()));
        (dir, store)
    }

    #[test]
    fn value_round_trip_works() {
        let (_dir, store) = temp_store();
        store.set("jaat_ai_conversations", "[]").unwrap();
        assert_eq!(
            store.get("jaat_ai_conversations").unwrap().as_deref(),
            Some("[]")
        );
    }

    #[test]
    fn missing_key_reads_as_none() {
        let (_dir, store) = temp_store();
        assert_eq!(store.get("nothing").unwrap(), None);
    }

    #[test]
    fn remove_deletes_file_and_tolerates_absence() {
        let (dir, store) = temp_store();
        store.set("k", "v").unwrap();
        assert!(dir.path().join("k").exists());
        store.remove("k").unwrap();
        store.remove("k").unwrap();
        assert_eq!(store.get("k").unwrap(), None);
    }

    #[test]
    fn keys_are_normalized_to_safe_file_names() {
        assert_eq!(normalize_key("../Etc/Passwd"), "---etc-passwd");
        assert_eq!(normalize_key("jaat_ai_conversations"), "jaat_ai_conversations");
        assert_eq!(normalize_key("   "), "default");
    }

    #[test]
    fn keys_differing_only_by_case_or_punctuation_share_a_file() {
        let (_dir, store) = temp_store();
        store.set("Demo.key", "first").unwrap();
        assert_eq!(store.get("demo-key").unwrap().as_deref(), Some("first"));
    }

    #[test]
    fn set_creates_missing_base_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let store = FileStore::new(FileStoreConfig::new(nested.clone()));
        store.set("k", "v").unwrap();
        assert!(nested.join("k").exists());
    }

    #[cfg(unix)]
    #[test]
    fn written_files_are_private() {
        let (dir, store) = temp_store();
        store.set("k", "v").unwrap();
        let mode = fs::metadata(dir.path().join("k")).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
