use anyhow::{Context, Result};
use log::debug;
use std::path::PathBuf;

use crate::backend::BackendKind;
use crate::manifest::Manifest;
use crate::runtime::Runtime;

/// Everything one install or uninstall run needs to know.
pub struct Config {
    pub manifest: Manifest,
    /// Staging root for resources, conflicts and the wheel payload
    pub root: Option<PathBuf>,
    /// Local application checkout to build from instead of cloning
    pub source: Option<PathBuf>,
    /// Helper to bootstrap when none is installed
    pub helper: Option<BackendKind>,
    /// Install optional packages without asking
    pub accept_optional: bool,
}

impl Config {
    pub fn new<R: Runtime>(
        runtime: &R,
        root: Option<PathBuf>,
        source: Option<PathBuf>,
        helper: Option<BackendKind>,
        accept_optional: bool,
    ) -> Result<Self> {
        let mut manifest = Manifest::embedded()?;

        let root = match root {
            Some(root) if root.is_relative() => Some(runtime.current_dir()?.join(root)),
            other => other,
        };
        if let Some(root) = &root {
            debug!("Staging under {:?}", root);
            manifest = manifest
                .staged(root)
                .context("Invalid staging root")?;
        }

        Ok(Self {
            manifest,
            root,
            source,
            helper,
            accept_optional,
        })
    }

    #[cfg(test)]
    pub fn for_test(manifest: Manifest) -> Self {
        Self {
            manifest,
            root: None,
            source: None,
            helper: None,
            accept_optional: false,
        }
    }
}
