//! Browser session teardown
//!
//! Closing a session means: close the browser, wait for the process to exit,
//! stop the CDP handler task and delete the profile directory. Each step is
//! attempted even when an earlier one fails.

use chromiumoxide::Browser;
use log::{debug, warn};
use std::path::Path;
use tokio::task::JoinHandle;

/// Result of cleanup operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanupResult {
    Success,
    /// Some steps failed, with error details
    PartialFailure(Vec<String>),
}

/// Close the browser, stop its handler and remove the profile directory
pub async fn cleanup_browser_and_data(
    mut browser: Browser,
    handler: Option<JoinHandle<()>>,
    user_data_dir: Option<&Path>,
) -> CleanupResult {
    let mut errors = Vec::new();

    debug!(target: "sitebot::cleanup", "Closing browser");
    if let Err(e) = browser.close().await {
        warn!(target: "sitebot::cleanup", "Failed to close browser: {e}");
        errors.push(format!("Browser close failed: {e}"));
    }

    // Reap the process so chromiumoxide does not kill it again on drop
    if let Err(e) = browser.wait().await {
        warn!(target: "sitebot::cleanup", "Failed to wait for browser exit: {e}");
        errors.push(format!("Browser wait failed: {e}"));
    }

    if let Some(handler) = handler {
        handler.abort();
    }

    if let Some(dir) = user_data_dir {
        errors.extend(remove_profile_dir(dir));
    }

    if errors.is_empty() {
        CleanupResult::Success
    } else {
        CleanupResult::PartialFailure(errors)
    }
}

/// Remove a browser profile directory, tolerating one that is already gone
pub fn remove_profile_dir(dir: &Path) -> Option<String> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            debug!(target: "sitebot::cleanup", "Removed profile directory {}", dir.display());
            None
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            warn!(
                target: "sitebot::cleanup",
                "Failed to remove profile directory {}: {e}",
                dir.display()
            );
            Some(format!("Directory cleanup failed: {e}"))
        }
    }
}
