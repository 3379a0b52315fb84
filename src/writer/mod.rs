//! Output writers. Both render the same `ProcessedWorld` into memory; the
//! files are written together by `write_all`.
pub mod asm;
pub mod bin;

use std::fs;
use std::io;
use std::path::Path;

use tracing::info;

/// Write every rendered output. If one write fails, files already written
/// by this call are removed so a failed export leaves nothing behind.
pub fn write_all(outputs: &[(&Path, &[u8])]) -> io::Result<()> {
    for (i, (path, bytes)) in outputs.iter().enumerate() {
        if let Err(err) = fs::write(path, bytes) {
            for (written, _) in &outputs[..i] {
                let _ = fs::remove_file(written);
            }
            return Err(io::Error::new(
                err.kind(),
                format!("{}: {err}", path.display()),
            ));
        }
        info!(path = %path.display(), bytes = bytes.len(), "output written");
    }
    Ok(())
}
