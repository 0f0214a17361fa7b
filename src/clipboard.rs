/*!
 * Clipboard support for ctxpack
 *
 * Copies the packed document to the system clipboard through whichever
 * external clipboard utility the platform provides.
 */

use std::env;
use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};

use thiserror::Error;

/// Error type for clipboard operations
#[derive(Error, Debug)]
pub enum ClipboardError {
    /// Failed to execute the provider command
    #[error("Command failed: {0}")]
    CommandFailed(String),

    /// No suitable clipboard mechanism was found
    #[error("No suitable clipboard mechanism found")]
    NoClipboardFound,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Result type for clipboard operations
pub type Result<T> = std::result::Result<T, ClipboardError>;

/// An external command that accepts clipboard content on stdin
#[derive(Debug, Clone, Copy)]
struct Provider {
    command: &'static str,
    args: &'static [&'static str],
}

const TMUX: Provider = Provider {
    command: "tmux",
    args: &["load-buffer", "-w", "-"],
};
const WAYLAND: Provider = Provider {
    command: "wl-copy",
    args: &[],
};
const XSEL: Provider = Provider {
    command: "xsel",
    args: &["-b", "-i"],
};
const XCLIP: Provider = Provider {
    command: "xclip",
    args: &["-selection", "clipboard", "-in"],
};
const MACOS: Provider = Provider {
    command: "pbcopy",
    args: &[],
};
const WINDOWS: Provider = Provider {
    command: "clip.exe",
    args: &[],
};
const TERMUX: Provider = Provider {
    command: "termux-clipboard-set",
    args: &[],
};

/// Copy text to the system clipboard.
///
/// Tries the available providers in platform order and pipes the text into
/// the first one that exists.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let provider = select_provider().ok_or(ClipboardError::NoClipboardFound)?;
    pipe_through(provider, text)
}

/// Check if a command exists on the system
pub fn command_exists(command: &str) -> bool {
    if let Ok(paths) = env::var("PATH") {
        for dir in paths.split(':') {
            if Path::new(dir).join(command).exists() {
                return true;
            }
        }
    }
    Command::new(command)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .is_ok()
}

fn select_provider() -> Option<Provider> {
    // A running tmux session is preferred wherever it appears.
    if env::var("TMUX").is_ok() && command_exists("tmux") {
        return Some(TMUX);
    }

    let candidates: &[Provider] = if cfg!(target_os = "macos") {
        &[MACOS]
    } else if cfg!(target_os = "windows") {
        &[WINDOWS]
    } else if cfg!(target_os = "android") {
        &[TERMUX]
    } else if env::var("WSL_DISTRO_NAME").is_ok() {
        &[WINDOWS]
    } else {
        &[WAYLAND, XSEL, XCLIP]
    };

    candidates
        .iter()
        .copied()
        .find(|p| command_exists(p.command))
}

fn pipe_through(provider: Provider, text: &str) -> Result<()> {
    let mut child = Command::new(provider.command)
        .args(provider.args)
        .stdin(Stdio::piped())
        .spawn()
        .map_err(|_| {
            ClipboardError::CommandFailed(format!("failed to spawn {}", provider.command))
        })?;

    child
        .stdin
        .as_mut()
        .ok_or_else(|| {
            ClipboardError::CommandFailed(format!("failed to open stdin for {}", provider.command))
        })?
        .write_all(text.as_bytes())
        .map_err(|_| {
            ClipboardError::CommandFailed(format!("failed to write to {}", provider.command))
        })?;

    let status = child.wait().map_err(|_| {
        ClipboardError::CommandFailed(format!("failed to wait for {}", provider.command))
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(ClipboardError::CommandFailed(format!(
            "{} exited with status: {}",
            provider.command, status
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_exists() {
        assert!(command_exists("ls"));
        assert!(!command_exists("nonexistentcommandxyz"));
    }
}
