use std::io::Write;
use std::path::{Path, PathBuf};

use df_core::{Error, FeedDocument, Result};
use tempfile::NamedTempFile;
use tracing::debug;

use crate::rss::render;

/// Where a rendered feed goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

/// Renders `document` and sends it to `target`. Returns the number of bytes written.
pub fn publish(document: &FeedDocument, target: &OutputTarget) -> Result<usize> {
    let xml = render(document)?;
    match target {
        OutputTarget::File(path) => write_atomic(path, xml.as_bytes())?,
        OutputTarget::Stdout => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(xml.as_bytes())?;
            stdout.flush()?;
        }
    }
    Ok(xml.len())
}

/// Replaces `path` with `contents` in one step.
///
/// The bytes go to a temporary file in the same directory which is then
/// renamed over the target, so readers see either the old file or the new
/// one and never a truncated mix.
pub fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(contents)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    debug!("Wrote {} bytes to {}", contents.len(), path.display());
    Ok(())
}
