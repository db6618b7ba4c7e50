use std::process::{Command, Stdio};

use crate::error::{RandPathError, Result};
use crate::scan::FileRecord;

/// Hands a file to the desktop's default application.
///
/// The path is passed as its own argument, never through a shell, so
/// unusual characters in file names need no escaping.
#[derive(Debug, Clone)]
pub struct Opener {
    program: String,
    leading_args: Vec<String>,
}

impl Opener {
    pub fn system() -> Self {
        if cfg!(target_os = "macos") {
            Self::with_program("open", &[])
        } else if cfg!(target_os = "windows") {
            Self::with_program("cmd", &["/C", "start", ""])
        } else {
            Self::with_program("xdg-open", &[])
        }
    }

    pub fn with_program(program: &str, leading_args: &[&str]) -> Self {
        Self {
            program: program.to_string(),
            leading_args: leading_args.iter().map(|arg| arg.to_string()).collect(),
        }
    }

    pub fn open(&self, file: &FileRecord) -> Result<()> {
        // It may have been deleted since it was shown
        if !file.exists() {
            return Err(RandPathError::FileGone(file.path().to_path_buf()));
        }

        tracing::debug!("Launching {} for {}", self.program, file);
        let status = Command::new(&self.program)
            .args(&self.leading_args)
            .arg(file.path())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|err| RandPathError::Launch {
                program: self.program.clone(),
                reason: err.to_string(),
            })?;

        if status.success() {
            Ok(())
        } else {
            Err(RandPathError::Launch {
                program: self.program.clone(),
                reason: format!("exited with {}", status),
            })
        }
    }
}

impl Default for Opener {
    fn default() -> Self {
        Self::system()
    }
}
