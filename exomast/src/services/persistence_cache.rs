//! Local record cache
//!
//! One JSON file per canonical planet name. Files carry a format version;
//! a file written under a different version is reported as stale instead
//! of being decoded into the current record layout.

use super::report_progress;
use crate::error::{ExomastError, Result};
use crate::models::PlanetRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Bump whenever [`PlanetRecord`]'s serialized layout changes
pub const CACHE_FORMAT_VERSION: u32 = 1;

const CACHE_FILE_SUFFIX: &str = ".exomast.json";

#[derive(Serialize)]
struct CacheEnvelopeRef<'a> {
    format_version: u32,
    saved_at: DateTime<Utc>,
    record: &'a PlanetRecord,
}

#[derive(Deserialize)]
struct CacheEnvelope {
    saved_at: DateTime<Utc>,
    record: PlanetRecord,
}

#[derive(Deserialize)]
struct CacheHeader {
    format_version: u32,
}

/// File-backed store of planet records keyed by canonical name
#[derive(Debug, Clone)]
pub struct PersistenceCache {
    dir: PathBuf,
}

impl PersistenceCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, canonical_name: &str) -> PathBuf {
        self.dir.join(cache_file_name(canonical_name))
    }

    pub fn contains(&self, canonical_name: &str) -> bool {
        self.path_for(canonical_name).is_file()
    }

    /// Write `record` under its canonical name, creating the directory if needed
    pub fn save(&self, record: &PlanetRecord, verbose: bool) -> Result<PathBuf> {
        std::fs::create_dir_all(&self.dir)?;

        let path = self.path_for(record.canonical_name());
        report_progress(verbose, "Saving planet record", &path.display().to_string());

        let envelope = CacheEnvelopeRef {
            format_version: CACHE_FORMAT_VERSION,
            saved_at: Utc::now(),
            record,
        };
        let content = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| ExomastError::Decode(format!("Failed to serialize planet record: {}", e)))?;

        // Each writer gets a uniquely named temp file; the last persist wins.
        let mut temp_file = tempfile::Builder::new()
            .prefix(&cache_file_name(record.canonical_name()))
            .suffix(".tmp")
            .tempfile_in(&self.dir)?;
        temp_file.write_all(&content)?;
        temp_file
            .persist(&path)
            .map_err(|e| ExomastError::Io(e.error))?;

        Ok(path)
    }

    /// Read the record stored for `canonical_name`
    pub fn load(&self, canonical_name: &str, verbose: bool) -> Result<PlanetRecord> {
        let path = self.path_for(canonical_name);
        report_progress(verbose, "Loading planet record", &path.display().to_string());

        let content = match std::fs::read(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ExomastError::NotFound(format!(
                    "no cached record for {:?} in {}",
                    canonical_name,
                    self.dir.display()
                )));
            }
            Err(e) => return Err(e.into()),
        };

        let header: CacheHeader = serde_json::from_slice(&content).map_err(|e| {
            ExomastError::Decode(format!("{} is not a planet cache file: {}", path.display(), e))
        })?;

        if header.format_version != CACHE_FORMAT_VERSION {
            return Err(ExomastError::StaleCache {
                path,
                found: header.format_version,
                expected: CACHE_FORMAT_VERSION,
            });
        }

        let envelope: CacheEnvelope = serde_json::from_slice(&content).map_err(|e| {
            ExomastError::Decode(format!("{} holds a corrupt planet record: {}", path.display(), e))
        })?;

        tracing::debug!(
            planet = %canonical_name,
            saved_at = %envelope.saved_at,
            "Loaded cached planet record"
        );

        Ok(envelope.record)
    }

    /// Delete the entry for `canonical_name`; `Ok(false)` when there was none
    pub fn remove(&self, canonical_name: &str) -> Result<bool> {
        match std::fs::remove_file(self.path_for(canonical_name)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}

/// File name for a canonical name: spaces and path separators become '_'
///
/// The mapping is not injective: "a b", "a/b" and "a_b" share one file.
/// Canonical planet names never differ only in those characters.
pub fn cache_file_name(canonical_name: &str) -> String {
    let safe: String = canonical_name
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' | ':' => '_',
            other => other,
        })
        .collect();
    format!("{}{}", safe, CACHE_FILE_SUFFIX)
}
