use anyhow::{Context, Result};

use super::config::Config;
use crate::resources::uninstall_resources;
use crate::runtime::Runtime;

/// Remove what install placed outside the package manager.
///
/// Packages, including the AUR helper, are left installed.
#[tracing::instrument(skip(runtime, config))]
pub fn uninstall<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let manifest = &config.manifest;
    println!("Uninstalling {}", manifest.app);

    let report = uninstall_resources(
        &runtime,
        &manifest.resources,
        &manifest.binary,
        &manifest.conflicts,
    )
    .context("Failed to uninstall")?;

    if report.removed.is_empty() {
        println!("Nothing to remove.");
    } else {
        println!("{} uninstalled.", manifest.app);
    }
    Ok(())
}
