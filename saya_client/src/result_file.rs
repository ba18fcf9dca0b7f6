//! Result files written by the external program.
//!
//! Read-style operations hand the program a `--result-dst` path; on success
//! the program writes a JSON document there which the operation decodes and
//! discards. [`ResultDst`] reserves such a path inside its own temporary
//! directory, so dropping it removes the file again no matter how the
//! operation exited.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use tempfile::TempDir;

use crate::error::{Result, SayaError};

/// A reserved destination path for one operation's JSON result document.
#[derive(Debug)]
pub struct ResultDst {
    // Held for its Drop: removing the dir removes the result file.
    _dir: TempDir,
    path: PathBuf,
}

impl ResultDst {
    pub fn new() -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix("saya-client-")
            .tempdir()
            .map_err(|err| SayaError::ResultFileIo {
                path: std::env::temp_dir(),
                source: err,
            })?;
        let path = dir.path().join("result.json");
        Ok(Self { _dir: dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Decodes a JSON document of type `T` from `path`.
///
/// `usecase` names the calling operation for log correlation; the returned
/// errors carry the file path and the underlying cause.
pub async fn decode_json_file<T: DeserializeOwned>(usecase: &str, path: &Path) -> Result<T> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| SayaError::ResultFileIo {
            path: path.to_path_buf(),
            source: err,
        })?;
    tracing::trace!(usecase, path = %path.display(), len = bytes.len(), "decoding result file");
    serde_json::from_slice(&bytes).map_err(|err| SayaError::Decode {
        path: path.to_path_buf(),
        source: err,
    })
}
