//! Saving the graded PDF to disk

use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `evaluated_script_<id>.pdf`, with path separators in the id replaced
pub fn result_file_name(evaluation_id: &str) -> String {
    format!(
        "evaluated_script_{}.pdf",
        evaluation_id.replace(['/', '\\'], "_")
    )
}

/// Write `content` to `<output_dir>/evaluated_script_<id>.pdf`.
///
/// The bytes go to a temporary file in the same directory first and are
/// moved into place in one step. The temporary file is removed on every
/// failure path when it is dropped.
pub fn save_result(output_dir: &Path, evaluation_id: &str, content: &[u8]) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(output_dir)?;

    let target = output_dir.join(result_file_name(evaluation_id));

    let mut staged = tempfile::Builder::new()
        .prefix(".evaluated_script_")
        .suffix(".part")
        .tempfile_in(output_dir)?;
    staged.write_all(content)?;
    staged.as_file().sync_all()?;

    debug!(staged = ?staged.path(), target = ?target, "moving downloaded result into place");
    staged.persist(&target).map_err(|e| e.error)?;

    Ok(target)
}
