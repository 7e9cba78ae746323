use crate::ports::outbound::{StorageError, StorageGate};
use parking_lot::Mutex;
use shared_types::StorageKind;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

type Document = BTreeMap<String, String>;

/// Directory backed storage gate.
///
/// Each storage kind is one JSON object on disk (`session.json`,
/// `local.json`). Every operation goes back to the file, so separate
/// instances opened on the same directory stay consistent with each other.
#[derive(Debug)]
pub struct FileStorage {
    dir: PathBuf,
    // Serializes read-modify-write cycles within this process
    write_lock: Mutex<()>,
}

impl FileStorage {
    /// Open (creating if needed) a storage directory.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self, StorageError> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| StorageError::Io(e.to_string()))?;
        info!(path = %dir.display(), "Opened file storage");

        Ok(Self {
            dir,
            write_lock: Mutex::new(()),
        })
    }

    /// Directory holding the documents.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the document for `kind`.
    pub fn document_path(&self, kind: StorageKind) -> PathBuf {
        self.dir.join(format!("{}.json", kind.as_str()))
    }

    /// Discard the session document. Local data is kept.
    pub fn end_session(&self) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock();
        let path = self.document_path(StorageKind::Session);
        match std::fs::remove_file(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "Session document removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }

    fn load(&self, kind: StorageKind) -> Result<Document, StorageError> {
        let path = self.document_path(kind);
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::new()),
            Err(e) => return Err(StorageError::Io(e.to_string())),
        };
        if bytes.is_empty() {
            return Ok(Document::new());
        }
        serde_json::from_slice(&bytes)
            .map_err(|e| StorageError::Corrupted(format!("{}: {}", path.display(), e)))
    }

    fn save(&self, kind: StorageKind, document: &Document) -> Result<(), StorageError> {
        let path = self.document_path(kind);
        let bytes =
            serde_json::to_vec_pretty(document).map_err(|e| StorageError::Io(e.to_string()))?;

        // Write atomically via temp file
        let temp_path = path.with_extension("json.tmp");
        let mut file =
            std::fs::File::create(&temp_path).map_err(|e| StorageError::Io(e.to_string()))?;
        file.write_all(&bytes)
            .map_err(|e| StorageError::Io(e.to_string()))?;
        file.sync_all()
            .map_err(|e| StorageError::Io(e.to_string()))?;

        std::fs::rename(&temp_path, &path).map_err(|e| StorageError::Io(e.to_string()))?;
        Ok(())
    }

    fn ensure_available(&self, kind: StorageKind) -> Result<(), StorageError> {
        if self.is_available(kind) {
            Ok(())
        } else {
            Err(StorageError::Unavailable(kind))
        }
    }
}

impl StorageGate for FileStorage {
    fn is_available(&self, _kind: StorageKind) -> bool {
        self.dir.is_dir()
    }

    fn get(&self, kind: StorageKind, key: &str) -> Result<Option<String>, StorageError> {
        self.ensure_available(kind)?;
        Ok(self.load(kind)?.get(key).cloned())
    }

    fn set(&self, kind: StorageKind, key: &str, value: &str) -> Result<(), StorageError> {
        self.ensure_available(kind)?;
        let _guard = self.write_lock.lock();
        let mut document = self.load(kind)?;
        document.insert(key.to_string(), value.to_string());
        self.save(kind, &document)
    }

    fn remove(&self, kind: StorageKind, key: &str) -> Result<(), StorageError> {
        self.ensure_available(kind)?;
        let _guard = self.write_lock.lock();
        let mut document = self.load(kind)?;
        if document.remove(key).is_none() {
            return Ok(());
        }
        self.save(kind, &document)
    }
}
