use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use viu_setup::backend::BackendKind;
use viu_setup::commands::{self, config::Config};
use viu_setup::error::exit_code;
use viu_setup::runtime::RealRuntime;

/// viu-setup - install or uninstall viu on Arch Linux
///
/// Without arguments, installs an AUR helper if none is present, the missing
/// dependencies, the application itself and its shell completions.
///
/// Examples:
///   viu-setup               # Install (asks about optional packages)
///   viu-setup --optional    # Install, including optional packages
///   viu-setup --uninstall   # Remove the application and its resources
#[derive(Parser, Debug)]
#[command(author, version = env!("VIU_SETUP_VERSION"), about)]
struct Cli {
    /// Remove the application instead of installing it
    #[arg(long)]
    uninstall: bool,

    /// Install optional packages without asking
    #[arg(long)]
    optional: bool,

    /// AUR helper to bootstrap when none is installed
    #[arg(long, value_enum, value_name = "HELPER")]
    helper: Option<BackendKind>,

    /// Build from a local checkout instead of cloning (also via VIU_SETUP_SOURCE)
    #[arg(long, env = "VIU_SETUP_SOURCE", value_name = "DIR")]
    source: Option<PathBuf>,

    /// Stage files under this directory instead of / (also via VIU_SETUP_ROOT)
    #[arg(long, env = "VIU_SETUP_ROOT", value_name = "DIR")]
    root: Option<PathBuf>,

    /// Any other argument selects the install flow
    #[arg(hide = true, trailing_var_arg = true, allow_hyphen_values = true)]
    rest: Vec<String>,
}

fn run(cli: Cli) -> Result<()> {
    let runtime = RealRuntime;
    if !cli.rest.is_empty() {
        log::debug!("Ignoring arguments {:?}", cli.rest);
    }
    let config = Config::new(&runtime, cli.root, cli.source, cli.helper, cli.optional)?;

    if cli.uninstall {
        commands::uninstall(runtime, config)
    } else {
        commands::install(runtime, config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(u8::try_from(exit_code(&err)).unwrap_or(1))
        }
    }
}
