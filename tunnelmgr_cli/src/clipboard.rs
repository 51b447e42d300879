//! System clipboard access through the platform's copy utility

use std::io::{self, Write};
use std::process::{Command, Stdio};

#[derive(Debug, thiserror::Error)]
pub enum ClipboardError {
    #[error("no clipboard utility found")]
    Unavailable,

    #[error("{program} failed: {source}")]
    Io {
        program: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("{program} exited with {status}")]
    Status {
        program: &'static str,
        status: std::process::ExitStatus,
    },
}

/// Something text can be copied to
pub trait Clipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError>;
}

/// The desktop clipboard
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClipboard;

#[cfg(target_os = "macos")]
const PROGRAMS: &[(&str, &[&str])] = &[("pbcopy", &[])];

#[cfg(target_os = "windows")]
const PROGRAMS: &[(&str, &[&str])] = &[("clip", &[])];

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const PROGRAMS: &[(&str, &[&str])] = &[
    ("wl-copy", &[]),
    ("xclip", &["-selection", "clipboard"]),
    ("xsel", &["--clipboard", "--input"]),
];

impl Clipboard for SystemClipboard {
    fn copy(&self, text: &str) -> Result<(), ClipboardError> {
        let mut last_error = ClipboardError::Unavailable;

        for &(program, args) in PROGRAMS {
            match pipe_to(program, args, text) {
                Ok(()) => return Ok(()),
                // Try the next utility when this one is not installed
                Err(ClipboardError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
                    tracing::debug!("{} not found", program);
                }
                Err(e) => last_error = e,
            }
        }

        Err(last_error)
    }
}

fn pipe_to(program: &'static str, args: &[&str], text: &str) -> Result<(), ClipboardError> {
    let io_err = |source| ClipboardError::Io { program, source };

    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(io_err)?;

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(source) = stdin.write_all(text.as_bytes()) {
            // The child may still be running
            let _ = child.kill();
            let _ = child.wait();
            return Err(io_err(source));
        }
    }

    let status = child.wait().map_err(io_err)?;
    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::Status { program, status })
    }
}
