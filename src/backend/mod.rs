//! Package-manager backends.
//!
//! A backend is one of the AUR helpers the installer knows how to drive.
//! Exactly one is resolved per run by [`select_backend`] and then handed to
//! the reconciler as a value.

mod aur;

use log::{info, warn};
use std::fmt;

use crate::error::SetupError;
use crate::runtime::Runtime;

pub use aur::AurHelper;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum BackendKind {
    Paru,
    Yay,
}

impl BackendKind {
    /// Probe order. The first entry is also the default choice.
    pub const PRIORITY: [BackendKind; 2] = [BackendKind::Paru, BackendKind::Yay];

    pub fn executable(self) -> &'static str {
        match self {
            BackendKind::Paru => "paru",
            BackendKind::Yay => "yay",
        }
    }

    /// Git URL of the AUR build recipe used to bootstrap this helper.
    pub fn recipe_url(self) -> String {
        format!("https://aur.archlinux.org/{}.git", self.executable())
    }

    /// Interpret an answer to the helper prompt. Anything unrecognised picks the default.
    pub fn from_choice(answer: &str) -> Self {
        match answer.trim().to_lowercase().as_str() {
            "2" | "yay" => BackendKind::Yay,
            _ => BackendKind::Paru,
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.executable())
    }
}

/// The operations the reconciler needs from a package manager.
#[cfg_attr(test, mockall::automock)]
pub trait PackageBackend {
    fn kind(&self) -> BackendKind;

    /// Whether the backend tool itself is available.
    fn is_present(&self) -> bool;

    /// Query the local package database. Any installed version counts.
    fn is_installed(&self, package: &str) -> Result<bool, SetupError>;

    fn install(&self, package: &str) -> Result<(), SetupError>;

    /// Build and install the backend tool itself.
    fn bootstrap(&self) -> Result<(), SetupError>;
}

/// Pick the first present candidate, or bootstrap the one `pick` names.
///
/// `pick` is only consulted when no candidate is present.
pub fn choose<B, F>(candidates: Vec<B>, pick: F) -> Result<B, SetupError>
where
    B: PackageBackend,
    F: FnOnce() -> BackendKind,
{
    let mut absent = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if candidate.is_present() {
            info!("Using AUR helper {}", candidate.kind());
            return Ok(candidate);
        }
        absent.push(candidate);
    }

    let kind = pick();
    let chosen = absent
        .into_iter()
        .find(|candidate| candidate.kind() == kind)
        .ok_or_else(|| SetupError::Config(format!("AUR helper {} is not a candidate", kind)))?;

    println!("Installing AUR helper {}...", kind);
    chosen.bootstrap()?;
    info!("Bootstrapped AUR helper {}", kind);
    Ok(chosen)
}

/// Resolve the AUR helper for this run.
///
/// Helpers are probed in [`BackendKind::PRIORITY`] order. When none is present
/// the `preferred` helper is bootstrapped, or the user is asked.
#[tracing::instrument(skip(runtime))]
pub fn select_backend<R: Runtime>(
    runtime: &R,
    preferred: Option<BackendKind>,
) -> Result<AurHelper<'_, R>, SetupError> {
    let candidates = BackendKind::PRIORITY
        .iter()
        .map(|kind| AurHelper::new(runtime, *kind))
        .collect();

    choose(candidates, || match preferred {
        Some(kind) => kind,
        None => prompt_for_helper(runtime),
    })
}

fn prompt_for_helper<R: Runtime>(runtime: &R) -> BackendKind {
    println!("No AUR helper found. Select an AUR helper to install:");
    for (index, kind) in BackendKind::PRIORITY.iter().enumerate() {
        let marker = if index == 0 { " (default)" } else { "" };
        println!("  {}) {}{}", index + 1, kind, marker);
    }
    match runtime.prompt("Choice [1-2]:") {
        Ok(answer) => BackendKind::from_choice(&answer),
        Err(e) => {
            warn!("Could not read helper choice, using default: {}", e);
            BackendKind::PRIORITY[0]
        }
    }
}
