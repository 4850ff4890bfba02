//! cloud-seed - compile HOCON machine descriptions into cloud-init user-data
//!
//! The shell around the pipeline: argument parsing, log setup, loading the
//! config file, and writing the finished document to a file or stdout.

use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{CommandFactory, Parser, Subcommand};
use tracing::{Level, debug, error, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

use cloud_seed::config::{self, ConfigFileSettings};
use cloud_seed::{SeedError, userdata};

#[derive(Parser)]
#[command(name = "cloud-seed")]
#[command(author, version, about = "Compile HOCON machine descriptions into cloud-init user-data YAML", long_about = None)]
struct Cli {
    /// The HOCON config file describing the machine
    #[arg(long, value_name = "FILE")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Append log output to this file as well
    #[arg(long, value_name = "FILE")]
    log_to_file: Option<PathBuf>,

    /// Do not log to stdout
    #[arg(long)]
    no_stdout: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the cloud-init user-data YAML document
    CreateYaml {
        /// Write the document to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn init_logging(
    verbosity: u8,
    no_stdout: bool,
    log_file: Option<&Path>,
) -> Result<(), SeedError> {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    let file_layer = match log_file {
        Some(path) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            Some(fmt::layer().with_ansi(false).with_writer(Arc::new(file)))
        }
        None => None,
    };
    let stdout_layer = (!no_stdout).then(|| fmt::layer().with_target(false).compact());

    tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(stdout_layer)
        .init();

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.no_stdout, cli.log_to_file.as_deref()) {
        eprintln!("failed to initialize logging: {e}");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            let mut source = std::error::Error::source(&e);
            while let Some(cause) = source {
                error!("caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), SeedError> {
    let tree = config::load_config_file(&cli.config)?;
    let settings = ConfigFileSettings::from_tree(&tree)?;
    debug!(
        "decoded config: {} ssh key(s), {} package(s), {} file(s)",
        settings.cloud_init.ssh_authorized_keys.len(),
        settings.cloud_init.packages_to_install.len(),
        settings.cloud_init.files_to_write.len()
    );

    match cli.command {
        Some(Commands::CreateYaml { output }) => create_yaml(&settings, output.as_deref()),
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    }
}

fn create_yaml(settings: &ConfigFileSettings, output: Option<&Path>) -> Result<(), SeedError> {
    let doc = userdata::build(&settings.cloud_init)?;
    let text = userdata::emit(&doc)?;

    match output {
        Some(path) => {
            fs::write(path, &text)?;
            info!("wrote user-data document to {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}
