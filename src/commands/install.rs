use anyhow::{Context, Result};
use log::info;
use std::path::Path;

use super::config::Config;
use crate::app::AppBuilder;
use crate::backend::{PackageBackend, select_backend};
use crate::reconcile::{decide_optionals, reconcile};
use crate::resources::install_resources;
use crate::runtime::Runtime;

/// Bring the machine to the installed state: helper, dependencies,
/// application, resources.
#[tracing::instrument(skip(runtime, config))]
pub fn install<R: Runtime>(runtime: R, config: Config) -> Result<()> {
    let manifest = &config.manifest;
    println!("Installing {}", manifest.app);

    let backend =
        select_backend(&runtime, config.helper).context("Failed to set up an AUR helper")?;
    let install_optionals =
        decide_optionals(&runtime, &manifest.optional, config.accept_optional);

    let report = reconcile(
        &backend,
        &manifest.required,
        &manifest.optional,
        install_optionals,
    )
    .context("Failed to install dependencies")?;
    if report.is_noop() {
        println!("All dependencies are already installed.");
    } else {
        info!(
            "Installed {} package(s) with {}",
            report.actions(),
            backend.kind()
        );
        println!("Installed {} package(s).", report.actions());
    }

    let builder = AppBuilder::new(&runtime, manifest).with_destdir(config.root.clone());
    let source = builder
        .prepare_source(config.source.as_deref())
        .context("Failed to obtain application source")?;
    let result = build_and_place(&runtime, &builder, &config, source.path());
    builder.cleanup(&source);
    result?;

    println!("{} installed successfully.", manifest.app);
    Ok(())
}

fn build_and_place<R: Runtime>(
    runtime: &R,
    builder: &AppBuilder<'_, R>,
    config: &Config,
    source: &Path,
) -> Result<()> {
    let wheel = builder
        .build_wheel(source)
        .context("Failed to build application")?;
    builder
        .install_wheel(&wheel)
        .context("Failed to install application")?;
    install_resources(runtime, &config.manifest.resources, source)
        .context("Failed to install resources")?;
    Ok(())
}
