//! Resource lifecycle: files the application owns outside its package payload.
//!
//! Install copies each declared resource into place. Uninstall removes the
//! resources, the primary executable and any known-conflict paths. Neither
//! direction retries, and both stop at the first real error. A path that is
//! already gone is never an error.

use anyhow::anyhow;
use log::{debug, info};
use std::path::{Path, PathBuf};

use crate::error::SetupError;
use crate::manifest::ResourceEntry;
use crate::runtime::{CommandSpec, Runtime, find_executable};

pub const RESOURCE_MODE: u32 = 0o644;

/// Paths removed by an uninstall run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UninstallReport {
    pub removed: Vec<PathBuf>,
}

/// Whether touching `path` needs `sudo`.
fn needs_elevation<R: Runtime>(runtime: &R, path: &Path) -> bool {
    !runtime.is_privileged() && !runtime.can_write(path)
}

/// Copy every resource from `source_base` to its target with mode 0644.
#[tracing::instrument(skip(runtime, entries))]
pub fn install_resources<R: Runtime>(
    runtime: &R,
    entries: &[ResourceEntry],
    source_base: &Path,
) -> Result<(), SetupError> {
    for entry in entries {
        let source = entry.source_in(source_base);
        let target = &entry.target;
        if !runtime.is_file(&source) {
            return Err(SetupError::resource(
                "failed to install",
                target,
                anyhow!("source file {} does not exist", source.display()),
            ));
        }

        if needs_elevation(runtime, target) {
            debug!("{:?} is not writable, elevating", target);
            runtime.run(
                &CommandSpec::new("install")
                    .arg(format!("-Dm{:o}", RESOURCE_MODE))
                    .path_arg(&source)
                    .path_arg(target)
                    .elevated(),
            )?;
        } else {
            copy_into_place(runtime, &source, target)
                .map_err(|e| SetupError::resource("failed to install", target, e))?;
        }
        info!("Installed {:?}", target);
        println!("Installed {}", target.display());
    }
    Ok(())
}

fn copy_into_place<R: Runtime>(runtime: &R, source: &Path, target: &Path) -> anyhow::Result<()> {
    if let Some(parent) = target.parent() {
        runtime.create_dir_all(parent)?;
    }
    runtime.copy(source, target)?;
    runtime.set_permissions(target, RESOURCE_MODE)?;
    Ok(())
}

/// Remove declared resources, the installed executable and stale conflict paths.
#[tracing::instrument(skip(runtime, entries, conflicts))]
pub fn uninstall_resources<R: Runtime>(
    runtime: &R,
    entries: &[ResourceEntry],
    binary: &str,
    conflicts: &[PathBuf],
) -> Result<UninstallReport, SetupError> {
    let mut report = UninstallReport::default();

    for entry in entries {
        remove_if_present(runtime, &entry.target, &mut report)?;
    }

    match find_executable(runtime, binary) {
        Some(path) => remove_if_present(runtime, &path, &mut report)?,
        None => debug!("{} not found on PATH", binary),
    }

    for path in conflicts {
        remove_if_present(runtime, path, &mut report)?;
    }

    Ok(report)
}

fn remove_if_present<R: Runtime>(
    runtime: &R,
    path: &Path,
    report: &mut UninstallReport,
) -> Result<(), SetupError> {
    if !runtime.exists(path) {
        debug!("{:?} does not exist, nothing to remove", path);
        return Ok(());
    }

    let recursive = runtime.is_dir(path);
    let parent = path.parent().unwrap_or(path);
    if needs_elevation(runtime, parent) {
        debug!("{:?} is not writable, elevating", parent);
        runtime.run(
            &CommandSpec::new("rm")
                .arg(if recursive { "-rf" } else { "-f" })
                .path_arg(path)
                .elevated(),
        )?;
    } else if recursive {
        runtime
            .remove_dir_all(path)
            .map_err(|e| SetupError::resource("failed to remove", path, e))?;
    } else {
        runtime
            .remove_file(path)
            .map_err(|e| SetupError::resource("failed to remove", path, e))?;
    }

    info!("Removed {:?}", path);
    println!("Removed {}", path.display());
    report.removed.push(path.to_path_buf());
    Ok(())
}
