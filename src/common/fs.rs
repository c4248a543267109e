use std::fs::create_dir_all;
use std::path::Path;

use anyhow::{Context, Result, bail};

/// Placeholder used when nothing usable survives sanitisation.
pub const UNKNOWN_FILENAME: &str = "UNKNOWN";

const ILLEGAL_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Create the directory if it doesn’t exist; error if a non-directory exists there.
pub fn ensure_dir_exists(path: &Path) -> Result<()> {
    if path.exists() {
        if !path.is_dir() { bail!("[common::fs] Path exists but is not a directory: {}", path.display()); }
    } else {
        create_dir_all(path)
            .with_context(|| format!("[common::fs] Failed to create directory {}", path.display()))?;
    }
    Ok(())
}

/// Turn a district name into a file stem: characters illegal in file names
/// become `_`, surrounding whitespace is trimmed, and a name with no legal
/// character left becomes [`UNKNOWN_FILENAME`].
pub fn sanitize_filename(name: &str) -> String {
    let mut kept_any = false;
    let sanitized: String = name.chars()
        .map(|c| {
            if ILLEGAL_FILENAME_CHARS.contains(&c) || c.is_control() { '_' }
            else {
                if !c.is_whitespace() { kept_any = true }
                c
            }
        })
        .collect();

    let trimmed = sanitized.trim();
    if !kept_any || trimmed.is_empty() { UNKNOWN_FILENAME.to_string() } else { trimmed.to_string() }
}
