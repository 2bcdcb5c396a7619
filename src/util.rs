use anyhow::{anyhow, Result};
use std::path::Path;

/// Reads the whole of a UTF-8 file, naming its `kind` (e.g., "project") in
/// the error message.
pub fn read_file(path: &Path, kind: &str) -> Result<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow!("Reading {} file `{}`: {}", kind, path.display(), e))
}
