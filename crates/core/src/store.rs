//! Whole-document persistence for the patient collection.
//!
//! ## Storage Layout
//!
//! The collection lives in one JSON object keyed by patient identifier:
//!
//! ```text
//! {
//!   "P001": {
//!     "name": "Ananya Verma",
//!     "city": "Guwahati",
//!     "age": 28,
//!     "gender": "female",
//!     "height": 1.65,
//!     "weight": 90.0
//!   }
//! }
//! ```
//!
//! Derived values (`bmi`, `verdict`) are never written. If an older document still carries
//! them they are ignored on load and disappear on the next save.
//!
//! Every load re-reads the document and every save rewrites it in full. Saves go to a temporary
//! file in the same directory which is then renamed over the document.

use crate::collection::PatientCollection;
use crate::patient::{Patient, PatientFields, PatientId};
use crate::{PatientError, PatientResult};
use std::collections::BTreeMap;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Load/save contract for the patient document.
pub trait RecordStore: Send + Sync {
    /// Reads and validates the whole collection.
    fn load(&self) -> PatientResult<PatientCollection>;

    /// Replaces the whole persisted collection.
    fn save(&self, patients: &PatientCollection) -> PatientResult<()>;
}

// ============================================================================
// DOCUMENT ENCODING
// ============================================================================

/// Serializes a collection as pretty JSON in identifier order, with a trailing newline.
pub fn encode_document(patients: &PatientCollection) -> PatientResult<String> {
    let raw: BTreeMap<&str, PatientFields> = patients
        .iter()
        .map(|p| (p.id().as_str(), p.fields()))
        .collect();

    let mut text = serde_json::to_string_pretty(&raw).map_err(PatientError::Serialization)?;
    text.push('\n');
    Ok(text)
}

/// Parses and validates a stored document. Blank text is an empty collection.
///
/// This uses `serde_path_to_error` so a shape mismatch names the failing entry and field
/// (e.g. `P003.age`).
pub fn decode_document(text: &str) -> PatientResult<PatientCollection> {
    if text.trim().is_empty() {
        return Ok(PatientCollection::new());
    }

    let mut deserializer = serde_json::Deserializer::from_str(text);
    let raw: BTreeMap<String, PatientFields> =
        match serde_path_to_error::deserialize(&mut deserializer) {
            Ok(parsed) => parsed,
            Err(err) => {
                let path = err.path().to_string();
                let source = err.into_inner();
                let path = if path.is_empty() || path == "." {
                    "<root>"
                } else {
                    path.as_str()
                };
                return Err(PatientError::Deserialization(format!(
                    "patient document schema mismatch at {path}: {source}"
                )));
            }
        };
    deserializer
        .end()
        .map_err(|e| PatientError::Deserialization(e.to_string()))?;

    raw.into_iter()
        .map(|(key, fields)| {
            PatientId::parse(&key)
                .and_then(|id| {
                    if id.as_str() != key {
                        return Err(PatientError::validation(
                            "id",
                            "stored key must not have surrounding whitespace",
                        ));
                    }
                    Patient::new(id, fields)
                })
                .map_err(|e| {
                    PatientError::Deserialization(format!("invalid stored patient '{key}': {e}"))
                })
        })
        .collect()
}

// ============================================================================
// JSON FILE STORE
// ============================================================================

/// Production store backed by a single JSON file.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

impl RecordStore for JsonFileStore {
    /// A missing file loads as an empty collection.
    fn load(&self) -> PatientResult<PatientCollection> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(
                    "patient document {} does not exist yet",
                    self.path.display()
                );
                return Ok(PatientCollection::new());
            }
            Err(e) => return Err(PatientError::FileRead(e)),
        };

        decode_document(&text)
    }

    /// # Errors
    ///
    /// Returns `PatientError` if:
    /// - the parent directory cannot be created,
    /// - the temporary file cannot be written or synced,
    /// - the temporary file cannot be renamed over the document.
    ///
    /// On failure the previous document is left as it was.
    fn save(&self, patients: &PatientCollection) -> PatientResult<()> {
        let text = encode_document(patients)?;

        let dir = self.parent_dir();
        fs::create_dir_all(dir).map_err(PatientError::StorageDirCreation)?;

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(PatientError::FileWrite)?;
        tmp.write_all(text.as_bytes())
            .map_err(PatientError::FileWrite)?;
        tmp.as_file().sync_all().map_err(PatientError::FileWrite)?;
        tmp.persist(&self.path)
            .map_err(|e| PatientError::FileWrite(e.error))?;

        tracing::debug!(
            "saved {} patients to {}",
            patients.len(),
            self.path.display()
        );
        Ok(())
    }
}

// ============================================================================
// IN-MEMORY STORE
// ============================================================================

/// Store that keeps the serialized document in memory.
///
/// Goes through the same encode/decode path as [`JsonFileStore`], so it behaves identically
/// apart from durability.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    document: Mutex<Option<String>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing serialized document.
    pub fn with_document(text: impl Into<String>) -> Self {
        Self {
            document: Mutex::new(Some(text.into())),
        }
    }

    /// Returns the last saved document, if any.
    pub fn document(&self) -> PatientResult<Option<String>> {
        let guard = self
            .document
            .lock()
            .map_err(|_| PatientError::StoreUnavailable("in-memory store lock poisoned".into()))?;
        Ok(guard.clone())
    }
}

impl RecordStore for InMemoryStore {
    fn load(&self) -> PatientResult<PatientCollection> {
        match self.document()? {
            Some(text) => decode_document(&text),
            None => Ok(PatientCollection::new()),
        }
    }

    fn save(&self, patients: &PatientCollection) -> PatientResult<()> {
        let text = encode_document(patients)?;
        let mut guard = self
            .document
            .lock()
            .map_err(|_| PatientError::StoreUnavailable("in-memory store lock poisoned".into()))?;
        *guard = Some(text);
        Ok(())
    }
}
