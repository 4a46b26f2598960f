//! Durable key-value storage backing the long-lived cache tier.
//!
//! A [`DurableStore`] is a flat string-to-string store shared by the whole
//! process, like browser local storage. The cache namespaces its own keys
//! with a prefix, so a store may hold unrelated entries too.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use sha2::{Digest, Sha256};

/// Errors raised by a durable store. They never escape the cache.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("durable store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("durable entry encoding error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("durable store unavailable: {0}")]
    Unavailable(String),
}

/// Persistent string key-value storage.
pub trait DurableStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
    /// Every key currently held, including ones the cache does not own.
    fn keys(&self) -> Result<Vec<String>, StoreError>;
}

/// File extension of entries named after their key.
const ENTRY_EXTENSION: &str = "json";

/// File extension of entries named after a digest of their key.
const KEYED_EXTENSION: &str = "keyed";

/// Longest filename most filesystems accept, in bytes.
const MAX_FILENAME_BYTES: usize = 255;

/// One file per key inside a directory.
///
/// Filenames are the URL-encoded key plus `.json`, so any key is a valid
/// filename and keys can be recovered from a directory listing. A key whose
/// encoded form would exceed [`MAX_FILENAME_BYTES`] is stored as
/// `<sha256>.keyed` instead, with the encoded key on the first line of the
/// file and the value after it. Files that do not decode are ignored.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

/// Where a key lives on disk.
enum EntryPath {
    /// `<encoded key>.json`, holding only the value.
    Named(PathBuf),
    /// `<digest>.keyed`, holding the encoded key line then the value.
    Keyed(PathBuf),
}

impl EntryPath {
    fn path(&self) -> &Path {
        match self {
            Self::Named(path) | Self::Keyed(path) => path,
        }
    }
}

impl FileStore {
    /// Use `dir` for storage, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> EntryPath {
        let encoded = urlencoding::encode(key);
        if encoded.len() + ENTRY_EXTENSION.len() + 1 <= MAX_FILENAME_BYTES {
            return EntryPath::Named(self.dir.join(format!("{encoded}.{ENTRY_EXTENSION}")));
        }
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        let digest = format!("{:x}", hasher.finalize());
        EntryPath::Keyed(self.dir.join(format!("{digest}.{KEYED_EXTENSION}")))
    }
}

/// Split a `.keyed` file into its decoded key and value.
fn split_keyed(content: &str) -> Option<(String, &str)> {
    let (encoded, value) = content.split_once('\n')?;
    let key = urlencoding::decode(encoded).ok()?;
    Some((key.into_owned(), value))
}

fn write_atomic(path: &Path, content: &str) -> Result<(), StoreError> {
    // Write-then-rename so readers never see a half-written entry.
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, content)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

impl DurableStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let entry = self.entry_path(key);
        let content = match std::fs::read_to_string(entry.path()) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        match entry {
            EntryPath::Named(_) => Ok(Some(content)),
            // A digest collision or a damaged file reads as absent.
            EntryPath::Keyed(_) => Ok(split_keyed(&content)
                .filter(|(stored, _)| stored == key)
                .map(|(_, value)| value.to_owned())),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self.entry_path(key) {
            EntryPath::Named(path) => write_atomic(&path, value),
            EntryPath::Keyed(path) => {
                let content = format!("{}\n{value}", urlencoding::encode(key));
                write_atomic(&path, &content)
            }
        }
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        match std::fs::remove_file(self.entry_path(key).path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            match path.extension().and_then(|e| e.to_str()) {
                Some(ENTRY_EXTENSION) => {
                    let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                        continue;
                    };
                    if let Ok(key) = urlencoding::decode(stem) {
                        keys.push(key.into_owned());
                    }
                }
                Some(KEYED_EXTENSION) => {
                    let Ok(content) = std::fs::read_to_string(&path) else {
                        continue;
                    };
                    if let Some((key, _)) = split_keyed(&content) {
                        keys.push(key);
                    }
                }
                _ => {}
            }
        }
        Ok(keys)
    }
}

/// In-process store. Durable only for the lifetime of the process; used
/// when no cache directory is configured and in tests.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>, StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".into()))
    }
}

impl DurableStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock()?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.lock()?.remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.lock()?.keys().cloned().collect())
    }
}
