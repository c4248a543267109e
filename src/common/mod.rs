mod fs;
mod text;

pub use fs::{UNKNOWN_FILENAME, sanitize_filename};
pub use text::{FOLDED_LETTERS, fold_script, normalize_label, resolve_escapes};

pub(crate) use fs::ensure_dir_exists;
