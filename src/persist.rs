//! Whole-file JSON persistence.
//!
//! Every data file in the service (waitlist, AI config, store exports) is a
//! single pretty-printed JSON document that is rewritten in full on each
//! change. Writes go to a sibling `*.tmp` file first and are then renamed
//! over the target, so readers never observe a half-written document.

use serde::Serialize;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp: OsString = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> io::Result<Vec<u8>> {
    serde_json::to_vec_pretty(value).map_err(io::Error::from)
}

/// Serializes `value` and replaces the file at `path` with it.
pub fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> io::Result<()> {
    let bytes = to_pretty_json(value)?;
    let tmp = temp_path(path);
    std::fs::write(&tmp, bytes)?;
    std::fs::rename(&tmp, path)
}

/// Async variant of [`write_json_atomic`] for use inside request handlers.
pub async fn write_json_atomic_async<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
) -> io::Result<()> {
    let bytes = to_pretty_json(value)?;
    let tmp = temp_path(path);
    tokio::fs::write(&tmp, bytes).await?;
    tokio::fs::rename(&tmp, path).await
}
