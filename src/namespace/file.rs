//! File-based namespace implementation.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::{Namespace, NamespaceError, Section, bounded, check_name};

/// Current storage file format version.
///
/// Increment this when making breaking changes to the format.
const STORAGE_FILE_VERSION: u32 = 1;

/// On-disk storage file format.
///
/// The whole namespace lives in one JSON document; sections are rewritten
/// together when any of them changes.
#[derive(Debug, Default, Serialize, Deserialize)]
struct StorageFile {
    /// Format version for future compatibility.
    version: u32,

    /// Unix timestamp of the last write. For debugging only.
    #[serde(skip_serializing_if = "Option::is_none")]
    saved_at: Option<String>,

    /// Section name to key-value entries.
    #[serde(default)]
    sections: BTreeMap<String, BTreeMap<String, String>>,
}

/// Returns the current Unix timestamp as a string.
fn unix_timestamp_now() -> String {
    use std::time::SystemTime;

    let duration = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", duration.as_secs())
}

/// A [`Namespace`] persisted as a JSON file.
///
/// # Atomic Writes
///
/// Modified sections are flushed on close using write-to-temp-then-rename:
/// 1. Write to `{path}.tmp`
/// 2. Rename `{path}.tmp` to `{path}`
///
/// A missing file is treated as an empty namespace. A file that cannot be
/// read or parsed, or carries an unknown version, fails every open with
/// [`NamespaceError::Corrupted`].
#[derive(Debug, Clone)]
pub struct FileNamespace {
    path: PathBuf,
}

impl FileNamespace {
    /// Creates a namespace backed by the file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the backing file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<StorageFile, NamespaceError> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(c) => c,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Ok(StorageFile {
                    version: STORAGE_FILE_VERSION,
                    ..StorageFile::default()
                });
            }
            Err(e) => {
                return Err(NamespaceError::Corrupted {
                    reason: format!("Failed to read file: {e}"),
                });
            }
        };

        let file: StorageFile =
            serde_json::from_str(&content).map_err(|e| NamespaceError::Corrupted {
                reason: format!("Invalid JSON: {e}"),
            })?;

        if file.version != STORAGE_FILE_VERSION {
            return Err(NamespaceError::Corrupted {
                reason: format!(
                    "Incompatible version: expected {STORAGE_FILE_VERSION}, got {}",
                    file.version
                ),
            });
        }

        Ok(file)
    }
}

impl Namespace for FileNamespace {
    type Section<'a> = FileSection<'a>;

    fn open(&mut self, name: &str, read_only: bool) -> Result<FileSection<'_>, NamespaceError> {
        check_name(name)?;
        let mut file = self.read()?;

        if !file.sections.contains_key(name) {
            if read_only {
                return Err(NamespaceError::SectionNotFound(name.to_string()));
            }
            file.sections.insert(name.to_string(), BTreeMap::new());
        }

        Ok(FileSection {
            path: &self.path,
            name: name.to_string(),
            read_only,
            file,
            modified: false,
        })
    }
}

/// Open section of a [`FileNamespace`].
///
/// Changes are buffered and written when the section is closed or dropped.
#[derive(Debug)]
pub struct FileSection<'a> {
    path: &'a Path,
    name: String,
    read_only: bool,
    file: StorageFile,
    modified: bool,
}

impl FileSection<'_> {
    fn entries(&self) -> Option<&BTreeMap<String, String>> {
        self.file.sections.get(&self.name)
    }

    fn entries_mut(&mut self) -> Result<&mut BTreeMap<String, String>, NamespaceError> {
        if self.read_only {
            return Err(NamespaceError::ReadOnly(self.name.clone()));
        }
        Ok(self.file.sections.entry(self.name.clone()).or_default())
    }

    fn flush(&mut self) -> Result<(), NamespaceError> {
        if !self.modified {
            return Ok(());
        }

        self.file.saved_at = Some(unix_timestamp_now());
        let content =
            serde_json::to_string_pretty(&self.file).map_err(NamespaceError::Serialize)?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(NamespaceError::Write)?;
            }
        }

        // prefs.json -> prefs.json.tmp, not prefs.tmp
        let temp_path = PathBuf::from(format!("{}.tmp", self.path.display()));
        std::fs::write(&temp_path, content).map_err(NamespaceError::Write)?;
        std::fs::rename(&temp_path, self.path).map_err(NamespaceError::Write)?;

        self.modified = false;
        Ok(())
    }
}

impl Section for FileSection<'_> {
    fn get_string(&self, key: &str, max_len: usize) -> String {
        self.entries()
            .and_then(|entries| entries.get(key))
            .map(|value| bounded(value, max_len).to_string())
            .unwrap_or_default()
    }

    fn put_string(&mut self, key: &str, value: &str) -> Result<(), NamespaceError> {
        check_name(key)?;
        self.entries_mut()?
            .insert(key.to_string(), value.to_string());
        self.modified = true;
        Ok(())
    }

    fn remove_key(&mut self, key: &str) -> Result<bool, NamespaceError> {
        let removed = self.entries_mut()?.remove(key).is_some();
        self.modified |= removed;
        Ok(removed)
    }

    fn close(mut self) -> Result<(), NamespaceError> {
        let result = self.flush();
        // Reported here; Drop must not retry.
        self.modified = false;
        result
    }
}

impl Drop for FileSection<'_> {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            tracing::warn!("Failed to flush section '{}': {e}", self.name);
        }
    }
}
