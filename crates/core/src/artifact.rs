//! Turns the GUID-named download into the caller's output file.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};

/// Renames `dir/guid` to `out_file` and returns the final path.
///
/// The source location is fully predictable because the session was armed
/// with allow-and-name behavior: the browser writes completed downloads
/// under their GUID into the armed directory. No retry; a missing source or
/// a failed rename is terminal.
pub fn place(dir: &Path, guid: &str, out_file: &Path) -> Result<PathBuf> {
    let downloaded = dir.join(guid);
    if !downloaded.is_file() {
        return Err(Error::ArtifactMissing {
            guid: guid.to_string(),
            dir: dir.to_path_buf(),
        });
    }
    fs::rename(&downloaded, out_file).map_err(|source| Error::Finalize {
        dest: out_file.to_path_buf(),
        source,
    })?;
    info!(target: "pdfpress", to = %out_file.display(), "artifact placed");
    Ok(out_file.to_path_buf())
}
