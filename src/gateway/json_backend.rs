use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use serde_json::Value as Json;
use tracing::debug;

use crate::{
    errors::{DecodeError, SyncError},
    utils::{paths, persistence::write_atomic},
};

use super::{Credential, SyncGateway};

const DEFAULT_COLLECTION: &str = "members";

/// Collection stored as a pretty-printed JSON array on disk.
///
/// A missing file is an empty collection. Appends rewrite the file through a
/// staging copy and are serialised within the process.
#[derive(Debug)]
pub struct JsonCollectionGateway {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonCollectionGateway {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            write_lock: Mutex::new(()),
        }
    }

    /// Default `members` collection under `base`.
    pub fn in_dir(base: &Path) -> Self {
        Self::new(paths::collection_file_in(base, DEFAULT_COLLECTION))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<Json>, SyncError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read_to_string(&self.path)?;
        if data.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Json>(&data)? {
            Json::Array(records) => Ok(records),
            _ => Err(SyncError::Decode(DecodeError::new(
                self.path.display().to_string(),
                "expected a JSON array of records",
            ))),
        }
    }
}

impl SyncGateway for JsonCollectionGateway {
    fn fetch_all(&self, _credential: Option<&Credential>) -> Result<Vec<Json>, SyncError> {
        let records = self.read()?;
        debug!("read {} record(s) from {}", records.len(), self.path.display());
        Ok(records)
    }

    fn append(&self, record: &Json, _credential: Option<&Credential>) -> Result<(), SyncError> {
        if !record.is_object() {
            return Err(SyncError::Rejected("record must be a JSON object".into()));
        }
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut records = self.read()?;
        records.push(record.clone());
        let json = serde_json::to_string_pretty(&records)?;
        write_atomic(&self.path, &json)?;
        debug!("appended record #{} to {}", records.len(), self.path.display());
        Ok(())
    }
}
