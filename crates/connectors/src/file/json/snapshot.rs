use crate::error::StoreError;
use model::records::row::Row;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// On-disk layout of a file-backed table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub table: String,
    pub rows: Vec<Row>,
}

impl TableSnapshot {
    /// Reads a snapshot, or `None` if the file does not exist.
    pub async fn load(path: &Path) -> Result<Option<Self>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Writes to a sibling temp file first, then renames it into place.
    pub async fn save(&self, path: &Path) -> Result<(), StoreError> {
        let json = serde_json::to_vec_pretty(self)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}
