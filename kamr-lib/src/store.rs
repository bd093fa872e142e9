use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

/// JSON field every persisted document starts its life with.
pub const SCHEMA_VERSION_FIELD: &str = "_schemaVersion";

/// Pure transform from a document at version `v` to version `v + 1`.
/// Migrations are indexed by the version they migrate FROM.
pub type Migration = fn(Map<String, Value>) -> Map<String, Value>;

/// Persistent store for a single schema-versioned JSON document.
///
/// `T::default()` must produce fresh defaults with the current schema
/// version stamped. Reads never fail: a missing, malformed, or
/// wrongly-shaped file degrades to defaults with a logged warning, so
/// callers always see valid in-memory state. Writes are best-effort and
/// swallowed on failure for the same reason.
pub struct VersionedStore<T> {
    path: PathBuf,
    current_version: u64,
    migrations: Vec<Migration>,
    _record: std::marker::PhantomData<T>,
}

impl<T> VersionedStore<T>
where
    T: Serialize + DeserializeOwned + Default,
{
    /// The migration table must cover every version below `current_version`.
    /// A gap would silently pass documents through unchanged, so a table of
    /// the wrong length is rejected up front.
    pub fn new(
        directory: &Path,
        filename: &str,
        current_version: u64,
        migrations: Vec<Migration>,
    ) -> Result<Self> {
        if migrations.len() as u64 != current_version {
            bail!(
                "{filename}: schema version {current_version} requires {current_version} migration functions, got {}",
                migrations.len()
            );
        }

        Ok(Self {
            path: directory.join(filename),
            current_version,
            migrations,
            _record: std::marker::PhantomData,
        })
    }

    /// Reads the stored record, migrating older schemas forward.
    /// Returns defaults if the file does not exist or cannot be read.
    pub fn read(&self) -> T {
        match self.try_read() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!("{}: read failed, using defaults: {e:#}", self.file_label());
                T::default()
            }
        }
    }

    /// Writes the record as pretty-printed JSON. Failures are logged and
    /// swallowed; the caller's in-memory state stays the source of truth.
    pub fn write(&self, record: &T) {
        if let Err(e) = self.try_write(record) {
            tracing::warn!("{}: write failed: {e:#}", self.file_label());
        }
    }

    fn try_read(&self) -> Result<T> {
        if !self.path.exists() {
            return Ok(T::default());
        }

        let raw = std::fs::read_to_string(&self.path)?;
        let document: Map<String, Value> = serde_json::from_str(&raw)?;
        self.upgrade(document)
    }

    fn upgrade(&self, mut document: Map<String, Value>) -> Result<T> {
        let stored_version = document
            .get(SCHEMA_VERSION_FIELD)
            .and_then(Value::as_u64)
            .unwrap_or(0);

        if stored_version != self.current_version {
            tracing::info!(
                "{}: migrating schema from v{stored_version} to v{}",
                self.file_label(),
                self.current_version
            );

            // An unknown newer version runs an empty chain and is merely
            // re-stamped below.
            for version in stored_version..self.current_version {
                document = (self.migrations[version as usize])(document);
            }
        }

        // Merge over defaults so any field added to the schema without a
        // version bump still gets a value.
        let mut merged = to_document(&T::default())?;
        merged.extend(document);
        merged.insert(
            SCHEMA_VERSION_FIELD.to_string(),
            Value::from(self.current_version),
        );

        serde_json::from_value(Value::Object(merged))
            .context("document does not match the record shape")
    }

    fn try_write(&self, record: &T) -> Result<()> {
        let directory = self
            .path
            .parent()
            .context("store path has no parent directory")?;
        std::fs::create_dir_all(directory)?;

        let body = serde_json::to_string_pretty(record)?;

        // Write-then-rename so an interrupted write cannot truncate the
        // previous good file.
        let tmp_path = self.path.with_extension("tmp");
        std::fs::write(&tmp_path, body)?;
        std::fs::rename(&tmp_path, &self.path)?;

        Ok(())
    }

    fn file_label(&self) -> std::borrow::Cow<'_, str> {
        self.path
            .file_name()
            .map(|name| name.to_string_lossy())
            .unwrap_or_default()
    }
}

fn to_document<T: Serialize>(record: &T) -> Result<Map<String, Value>> {
    match serde_json::to_value(record)? {
        Value::Object(document) => Ok(document),
        other => bail!("record serialized to {other:?}, expected an object"),
    }
}
