//! SQLite-backed signature store.
//!
//! Patterns are stored zstd-compressed in `signatures.signature_compressed`
//! and keyed by the SHA-256 of the uncompressed pattern. Analysis sessions
//! open the database read-only; only [`SqliteSignatureStore::create`] opens
//! it for writing (used by `import`).

use super::{LoadedCorpus, SignatureDocument, SignatureStore};
use crate::error::{CorpusErrorKind, RecordDecodeError, Result, SnifferError};
use crate::generic::GenericityFilter;
use crate::matching::MinHasher;
use crate::model::{
    Component, ComponentId, Signature, SignatureId, SignatureType, DEFAULT_ECOSYSTEM,
};
use crate::utils::pattern_digest;
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// zstd level used for stored patterns.
const COMPRESSION_LEVEL: i32 = 3;

const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS components (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    version TEXT NOT NULL DEFAULT '',
    publisher TEXT,
    license TEXT,
    ecosystem TEXT NOT NULL DEFAULT 'native',
    category TEXT,
    description TEXT,
    metadata TEXT,
    tlsh_hash TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(name, version)
);
CREATE TABLE IF NOT EXISTS signatures (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    component_id INTEGER NOT NULL REFERENCES components(id) ON DELETE CASCADE,
    signature_hash TEXT NOT NULL,
    signature_compressed BLOB NOT NULL,
    sig_type INTEGER NOT NULL DEFAULT 1,
    confidence REAL NOT NULL DEFAULT 0.5,
    minhash BLOB,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
    UNIQUE(component_id, signature_hash)
);
CREATE INDEX IF NOT EXISTS idx_signatures_component ON signatures(component_id);
CREATE INDEX IF NOT EXISTS idx_signatures_hash ON signatures(signature_hash);
";

/// Outcome of importing one signature document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportSummary {
    pub component: String,
    pub component_id: i64,
    /// New signatures written
    pub inserted: usize,
    /// Signatures already present for this component
    pub duplicates: usize,
    /// Entries that failed to decode
    pub rejected: usize,
    /// Entries dropped as generic
    pub filtered: usize,
}

/// Raw signature row before decoding.
struct SignatureRow {
    id: i64,
    component_id: i64,
    compressed: Option<Vec<u8>>,
    sig_type: Option<i64>,
    confidence: Option<f64>,
    minhash: Option<Vec<u8>>,
}

/// Signature store over a SQLite database.
pub struct SqliteSignatureStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl std::fmt::Debug for SqliteSignatureStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteSignatureStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl SqliteSignatureStore {
    /// Open an existing database for reading.
    pub fn open_read_only(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(SnifferError::corpus(
                format!("opening {}", path.display()),
                CorpusErrorKind::NotFound(path.display().to_string()),
            ));
        }
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| {
            SnifferError::corpus(
                format!("opening {}", path.display()),
                CorpusErrorKind::Database(e.to_string()),
            )
        })?;
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    /// Open (creating if needed) a database for writing and ensure the schema.
    pub fn create(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| {
            SnifferError::corpus(
                self.describe(),
                CorpusErrorKind::Database("connection lock poisoned".to_string()),
            )
        })
    }

    /// Write one document's component and signatures.
    ///
    /// Generic patterns are dropped when a filter is given, so the stored
    /// corpus agrees with what live matching would accept. When a hasher is
    /// given, each signature also gets a MinHash sketch.
    pub fn import_document(
        &self,
        doc: &SignatureDocument,
        filter: Option<&GenericityFilter>,
        hasher: Option<&MinHasher>,
    ) -> Result<ImportSummary> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;
        let component = doc.to_component(ComponentId(0));
        let version = component.version.clone().unwrap_or_default();
        let metadata = if component.metadata.is_empty() {
            None
        } else {
            serde_json::to_string(&component.metadata).ok()
        };

        tx.execute(
            "INSERT OR IGNORE INTO components
                (name, version, publisher, license, ecosystem, category, description, metadata, tlsh_hash)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                component.name,
                version,
                component.publisher,
                component.license,
                component.ecosystem,
                component.category,
                component.description,
                metadata,
                component.whole_file_hash,
            ],
        )?;
        let component_id: i64 = tx.query_row(
            "SELECT id FROM components WHERE name = ?1 AND version = ?2",
            params![component.name, version],
            |row| row.get(0),
        )?;

        let mut summary = ImportSummary {
            component: component.name.clone(),
            component_id,
            ..ImportSummary::default()
        };

        {
            let mut insert = tx.prepare(
                "INSERT OR IGNORE INTO signatures
                    (component_id, signature_hash, signature_compressed, sig_type, confidence, minhash)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )?;
            for entry in doc.decode_entries() {
                let entry = match entry {
                    Ok(entry) => entry,
                    Err(err) => {
                        tracing::debug!("{}: rejecting entry: {err}", summary.component);
                        summary.rejected += 1;
                        continue;
                    }
                };
                if filter.is_some_and(|f| f.is_generic(&entry.pattern)) {
                    summary.filtered += 1;
                    continue;
                }
                let compressed = zstd::encode_all(entry.pattern.as_bytes(), COMPRESSION_LEVEL)
                    .map_err(|e| SnifferError::io(&self.path, e))?;
                let sketch = hasher.map(|h| h.sketch_text(&entry.pattern).to_bytes());
                let sig_type = SignatureType::from_label(&entry.sig_type);
                let changed = insert.execute(params![
                    component_id,
                    pattern_digest(&entry.pattern),
                    compressed,
                    sig_type.code(),
                    crate::model::clamp_confidence(entry.confidence),
                    sketch,
                ])?;
                if changed == 0 {
                    summary.duplicates += 1;
                } else {
                    summary.inserted += 1;
                }
            }
        }

        tx.commit()?;
        Ok(summary)
    }

    /// Number of stored signatures.
    pub fn signature_count(&self) -> Result<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM signatures", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Look up a component id by name and version.
    pub fn find_component(&self, name: &str, version: Option<&str>) -> Result<Option<i64>> {
        let conn = self.lock()?;
        let id = conn
            .query_row(
                "SELECT id FROM components WHERE name = ?1 AND version = ?2",
                params![name, version.unwrap_or_default()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(id)
    }
}

/// Column names of a table.
fn column_names(conn: &Connection, table: &str) -> Result<HashSet<String>> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table})"))?;
    let names = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .collect::<std::result::Result<HashSet<_>, _>>()?;
    Ok(names)
}

/// `column` when present, otherwise `NULL AS column`.
fn optional_column(columns: &HashSet<String>, column: &str) -> String {
    if columns.contains(column) {
        column.to_string()
    } else {
        format!("NULL AS {column}")
    }
}

fn require_columns(columns: &HashSet<String>, table: &str, required: &[&str]) -> Result<()> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|c| !columns.contains(*c))
        .collect();
    if missing.is_empty() {
        Ok(())
    } else {
        Err(SnifferError::corpus(
            format!("table {table}"),
            CorpusErrorKind::Schema(format!("missing columns: {}", missing.join(", "))),
        ))
    }
}

fn load_components(conn: &Connection) -> Result<Vec<Component>> {
    let columns = column_names(conn, "components")?;
    require_columns(&columns, "components", &["id", "name"])?;
    let optional: Vec<String> = [
        "version",
        "ecosystem",
        "license",
        "publisher",
        "category",
        "description",
        "metadata",
        "tlsh_hash",
    ]
    .iter()
    .map(|c| optional_column(&columns, c))
    .collect();
    let sql = format!("SELECT id, name, {} FROM components", optional.join(", "));

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        let id: i64 = row.get(0)?;
        let name: String = row.get(1)?;
        let mut component = Component::new(id, name);
        component.version = row.get::<_, Option<String>>(2)?.filter(|v| !v.is_empty());
        let ecosystem: Option<String> = row.get(3)?;
        component.license = row.get(4)?;
        component.publisher = row.get(5)?;
        component.category = row.get(6)?;
        component.description = row.get(7)?;
        let metadata: Option<String> = row.get(8)?;
        component.whole_file_hash = row.get(9)?;
        component.metadata = metadata
            .and_then(|m| serde_json::from_str::<Map<String, Value>>(&m).ok())
            .unwrap_or_default();
        component.ecosystem = ecosystem
            .filter(|e| !e.is_empty())
            .or_else(|| {
                component
                    .metadata
                    .get("ecosystem")
                    .and_then(Value::as_str)
                    .map(str::to_string)
            })
            .unwrap_or_else(|| DEFAULT_ECOSYSTEM.to_string());
        Ok(component)
    })?;

    let mut components = Vec::new();
    for row in rows {
        match row {
            Ok(component) => components.push(component),
            Err(err) => tracing::warn!("Skipping unreadable component row: {err}"),
        }
    }
    Ok(components)
}

fn load_signature_rows(
    conn: &Connection,
) -> Result<Vec<(String, std::result::Result<SignatureRow, RecordDecodeError>)>> {
    let columns = column_names(conn, "signatures")?;
    require_columns(
        &columns,
        "signatures",
        &["id", "component_id", "signature_compressed"],
    )?;
    let sql = format!(
        "SELECT id, component_id, signature_compressed, {}, {}, {} FROM signatures ORDER BY id",
        optional_column(&columns, "sig_type"),
        optional_column(&columns, "confidence"),
        optional_column(&columns, "minhash"),
    );

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], |row| {
        let id: i64 = row.get(0)?;
        let raw = (|| {
            Ok::<_, rusqlite::Error>(SignatureRow {
                id,
                component_id: row.get(1)?,
                compressed: row.get(2)?,
                sig_type: row.get(3)?,
                confidence: row.get(4)?,
                minhash: row.get(5)?,
            })
        })()
        .map_err(|e| RecordDecodeError::MalformedEntry(e.to_string()));
        Ok((format!("signature {id}"), raw))
    })?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Decode one stored signature row.
fn decode_row(row: SignatureRow) -> std::result::Result<Signature, RecordDecodeError> {
    let compressed = row.compressed.ok_or(RecordDecodeError::EmptyPattern)?;
    let bytes = zstd::decode_all(compressed.as_slice())
        .map_err(|e| RecordDecodeError::Decompress(e.to_string()))?;
    let pattern = String::from_utf8(bytes).map_err(|_| RecordDecodeError::InvalidUtf8)?;
    if pattern.trim().is_empty() {
        return Err(RecordDecodeError::EmptyPattern);
    }

    let sig_type = match row.sig_type {
        None => SignatureType::String,
        Some(code) => SignatureType::from_code(code)
            .ok_or_else(|| RecordDecodeError::UnknownSignatureType(code.to_string()))?,
    };

    let confidence = row
        .confidence
        .unwrap_or(super::DEFAULT_SIGNATURE_CONFIDENCE);
    if !confidence.is_finite() {
        return Err(RecordDecodeError::InvalidConfidence(confidence));
    }

    let mut signature = Signature::new(
        SignatureId(row.id),
        ComponentId(row.component_id),
        pattern,
        sig_type,
        confidence,
    );
    if let Some(bytes) = row.minhash {
        match crate::matching::MinHashSketch::from_bytes(&bytes) {
            Some(sketch) => signature.fuzzy_sketch = Some(sketch.into_values()),
            None => tracing::debug!("signature {}: ignoring malformed sketch", row.id),
        }
    }
    Ok(signature)
}

impl SignatureStore for SqliteSignatureStore {
    fn describe(&self) -> String {
        format!("SQLite corpus {}", self.path.display())
    }

    fn load_all(&self) -> Result<LoadedCorpus> {
        let conn = self.lock()?;
        let components = load_components(&conn)?;
        let rows = load_signature_rows(&conn)?;
        let records = rows
            .into_iter()
            .map(|(label, row)| (label, row.and_then(decode_row)));
        Ok(LoadedCorpus::assemble(components, records))
    }
}
