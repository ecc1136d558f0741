//! The declared installation state.
//!
//! The manifest is fixed at build time: `manifest.json` at the crate root is
//! embedded into the binary and parsed once at startup.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::runtime::rebase_under;

const EMBEDDED_MANIFEST: &str = include_str!("../manifest.json");

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Application name, used for scratch directories and messages
    pub app: String,
    /// Name of the primary executable looked up on PATH during uninstall
    pub binary: String,
    /// Git URL of the application source
    pub repository: String,
    #[serde(default)]
    pub required: Vec<String>,
    #[serde(default)]
    pub optional: Vec<String>,
    #[serde(default)]
    pub resources: Vec<ResourceEntry>,
    /// Stale payloads left by other distribution channels; removed on uninstall.
    #[serde(default)]
    pub conflicts: Vec<PathBuf>,
}

/// A file placed outside the primary package payload.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceEntry {
    pub target: PathBuf,
    /// Location inside the source tree. Defaults to the target's file name.
    #[serde(default)]
    pub source: Option<PathBuf>,
}

impl ResourceEntry {
    pub fn new(target: impl Into<PathBuf>) -> Self {
        Self {
            target: target.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// The file to copy from, resolved against `base`.
    pub fn source_in(&self, base: &Path) -> PathBuf {
        match &self.source {
            Some(source) => base.join(source),
            None => match self.target.file_name() {
                Some(name) => base.join(name),
                None => base.to_path_buf(),
            },
        }
    }
}

impl Manifest {
    /// The manifest compiled into this binary.
    pub fn embedded() -> Result<Self> {
        Self::parse(EMBEDDED_MANIFEST).context("Embedded manifest is invalid")
    }

    pub fn parse(content: &str) -> Result<Self> {
        let manifest: Manifest =
            serde_json::from_str(content).context("Failed to parse manifest")?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<()> {
        if self.binary.is_empty() {
            anyhow::bail!("Manifest has an empty binary name");
        }
        for entry in &self.resources {
            if !entry.target.is_absolute() {
                anyhow::bail!("Resource target {:?} is not absolute", entry.target);
            }
            if entry.target.file_name().is_none() {
                anyhow::bail!("Resource target {:?} has no file name", entry.target);
            }
        }
        for path in &self.conflicts {
            if !path.is_absolute() {
                anyhow::bail!("Conflict path {:?} is not absolute", path);
            }
        }
        Ok(())
    }

    /// Rebase every resource target and conflict path under a staging root.
    pub fn staged(mut self, root: &Path) -> Result<Self> {
        for entry in &mut self.resources {
            entry.target = rebase_under(root, &entry.target).with_context(|| {
                format!("{:?} escapes staging root {:?}", entry.target, root)
            })?;
        }
        for path in &mut self.conflicts {
            *path = rebase_under(root, path)
                .with_context(|| format!("{:?} escapes staging root {:?}", path, root))?;
        }
        Ok(self)
    }
}
