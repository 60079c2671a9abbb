//! Opening the viewer in the user's browser after the listener is up.

use tokio::process::Command;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BrowserError {
    #[error("failed launching browser via `{opener}`: {source}")]
    Spawn {
        opener: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("`{opener}` exited with status {status}")]
    Exit {
        opener: &'static str,
        status: std::process::ExitStatus,
    },
}

/// Viewer URL with the initial search pre-filled.
pub fn viewer_url(host: &str, port: u16, search: &str) -> String {
    format!(
        "http://{}:{}?search={}",
        host,
        port,
        urlencoding::encode(search)
    )
}

#[cfg(target_os = "macos")]
const OPENER: (&str, &[&str]) = ("open", &[]);
#[cfg(target_os = "windows")]
const OPENER: (&str, &[&str]) = ("cmd", &["/C", "start", ""]);
#[cfg(not(any(target_os = "macos", target_os = "windows")))]
const OPENER: (&str, &[&str]) = ("xdg-open", &[]);

/// Launch the platform opener and wait for it without blocking the runtime.
pub async fn open(url: &str) -> Result<(), BrowserError> {
    let (opener, args) = OPENER;
    run_opener(opener, args, url).await
}

async fn run_opener(opener: &'static str, args: &[&str], url: &str) -> Result<(), BrowserError> {
    let status = Command::new(opener)
        .args(args)
        .arg(url)
        .status()
        .await
        .map_err(|source| BrowserError::Spawn { opener, source })?;
    if status.success() {
        Ok(())
    } else {
        Err(BrowserError::Exit { opener, status })
    }
}
