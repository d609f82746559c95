/// Schema registry
///
/// Maps schema identifiers to their source files on disk. The registry is
/// rebuilt at startup by scanning the upload directory for
/// `<identifier>.<extension>` files.

use crate::error::{Result, SchemataError};

use parking_lot::RwLock;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::SystemTime;
use tempfile::NamedTempFile;

/// Identifies one version of a schema source.
///
/// The generation changes on every registration; size and modification time
/// catch edits made to the file behind the registry's back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FreshnessMarker {
    pub generation: u64,
    pub modified: Option<SystemTime>,
    pub len: u64,
}

/// A registered schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSpec {
    pub identifier: String,
    pub source: PathBuf,
    pub generation: u64,
}

/// Validate a schema identifier: non-empty, ASCII letters, digits, `_` or `-`.
pub fn validate_identifier(identifier: &str) -> Result<()> {
    let valid = !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(SchemataError::InvalidIdentifier(identifier.to_string()))
    }
}

pub struct SchemaRegistry {
    dir: PathBuf,
    extension: String,
    schemas: RwLock<HashMap<String, SchemaSpec>>,
    generation: AtomicU64,
}

impl SchemaRegistry {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            schemas: RwLock::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Where the source for `identifier` is stored
    pub fn source_path(&self, identifier: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", identifier, self.extension))
    }

    /// Register every `<identifier>.<extension>` file found in the upload
    /// directory, creating the directory if needed. Returns the identifiers found.
    pub fn discover(&self) -> Result<Vec<String>> {
        fs::create_dir_all(&self.dir)?;

        let mut found = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let matches_extension =
                path.extension().and_then(|e| e.to_str()) == Some(self.extension.as_str());
            if !path.is_file() || !matches_extension {
                continue;
            }
            let Some(identifier) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if validate_identifier(identifier).is_err() {
                tracing::warn!("Skipping schema file with invalid name: {}", path.display());
                continue;
            }
            let identifier = identifier.to_string();
            self.register(&identifier, path.clone());
            found.push(identifier);
        }

        found.sort();
        tracing::info!("Discovered {} schema(s) in {}", found.len(), self.dir.display());
        Ok(found)
    }

    /// Register (or re-register) a schema source.
    pub fn register(&self, identifier: &str, source: impl Into<PathBuf>) -> SchemaSpec {
        let spec = SchemaSpec {
            identifier: identifier.to_string(),
            source: source.into(),
            generation: self.generation.fetch_add(1, Ordering::SeqCst) + 1,
        };
        self.schemas.write().insert(identifier.to_string(), spec.clone());
        tracing::debug!("Registered schema '{}' from {}", identifier, spec.source.display());
        spec
    }

    /// Write the schema text to the upload directory and register it.
    ///
    /// The text is staged next to the target and renamed over it, so readers
    /// see either the previous source or the new one in full.
    pub fn store(&self, identifier: &str, schema_text: &str) -> Result<SchemaSpec> {
        validate_identifier(identifier)?;
        fs::create_dir_all(&self.dir)?;
        let path = self.source_path(identifier);

        let mut staged = NamedTempFile::new_in(&self.dir)?;
        staged.write_all(schema_text.as_bytes())?;
        staged.persist(&path).map_err(|e| SchemataError::Io(e.error))?;

        Ok(self.register(identifier, path))
    }

    pub fn lookup(&self, identifier: &str) -> Option<SchemaSpec> {
        self.schemas.read().get(identifier).cloned()
    }

    /// Registered and its source file still exists
    pub fn contains(&self, identifier: &str) -> bool {
        self.lookup(identifier).is_some_and(|spec| spec.source.exists())
    }

    pub fn list_all(&self) -> BTreeSet<String> {
        self.schemas.read().keys().cloned().collect()
    }

    /// Current freshness of a schema's source.
    pub fn current_marker(&self, identifier: &str) -> Result<FreshnessMarker> {
        let spec = self
            .lookup(identifier)
            .ok_or_else(|| SchemataError::SchemaNotFound(identifier.to_string()))?;
        let metadata = fs::metadata(&spec.source).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                SchemataError::SchemaNotFound(identifier.to_string())
            } else {
                SchemataError::Io(e)
            }
        })?;
        Ok(FreshnessMarker {
            generation: spec.generation,
            modified: metadata.modified().ok(),
            len: metadata.len(),
        })
    }

    pub fn read_source(&self, identifier: &str) -> Result<String> {
        let spec = self
            .lookup(identifier)
            .ok_or_else(|| SchemataError::SchemaNotFound(identifier.to_string()))?;
        Ok(fs::read_to_string(&spec.source)?)
    }
}
