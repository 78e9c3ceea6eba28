//! Converting book files between formats with an external program.
//!
//! The program is invoked as `<program> <source> <destination>` and only its
//! exit status is inspected; the destination extension selects the output
//! format (which is how Calibre's `ebook-convert` behaves).

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::instrument;

/// Programs looked for on `PATH`, in order.
const PROGRAMS: &[&str] = &["ebook-convert"];

#[derive(Debug, Clone)]
pub struct Converter {
    program: PathBuf,
}
impl Converter {
    /// Use an explicit program.
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self { program: program.into() }
    }

    /// Find a conversion program on `PATH`.
    pub fn discover() -> Result<Self> {
        for name in PROGRAMS {
            if let Ok(program) = which::which(name) {
                tracing::debug!(program = %program.display(), "Discovered conversion program");
                return Ok(Self { program });
            }
        }
        tracing::info!("Conversion program not found in PATH");
        exn::bail!(ErrorKind::NotFound);
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Convert `src` into `dst`, blocking until the program exits.
    #[instrument(skip_all, fields(program = %self.program.display(), src = %src.as_ref().display(), dst = %dst.as_ref().display()))]
    pub fn convert(&self, src: impl AsRef<Path>, dst: impl AsRef<Path>) -> Result<()> {
        let output = Command::new(&self.program)
            .arg(src.as_ref())
            .arg(dst.as_ref())
            .output()
            .or_raise(|| ErrorKind::Io)?;
        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            tracing::warn!(code, stderr = %String::from_utf8_lossy(&output.stderr).trim(), "Conversion failed");
            exn::bail!(ErrorKind::Failed(code));
        }
        tracing::info!("Converted file");
        Ok(())
    }
}
