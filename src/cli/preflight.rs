//! Pre-flight checks before expensive operations.
//!
//! Validates that required tools are available before starting operations
//! that would otherwise fail midway.

use crate::error::{Result, SvarError};
use std::process::Command;

/// Check that yt-dlp is installed and runnable. Ingest-heavy commands call
/// this before touching the network.
pub fn check_yt_dlp() -> Result<()> {
    check_tool("yt-dlp")
}

/// Check if an external tool is available.
fn check_tool(name: &str) -> Result<()> {
    match Command::new(name).arg("--version").output() {
        Ok(output) if output.status.success() => Ok(()),
        Ok(_) => Err(SvarError::ToolNotFound(format!(
            "{} is installed but not working correctly",
            name
        ))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(SvarError::ToolNotFound(name.to_string()))
        }
        Err(e) => Err(SvarError::ToolNotFound(format!("{}: {}", name, e))),
    }
}
