#![forbid(unsafe_code)]
//! acbfxml Command Line Interface

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use acbfxml::commands::{
    execute_install, execute_list_installed, execute_raw, execute_read, execute_remove,
    execute_scan, execute_uninstall, execute_validate, execute_write, InstallOptions,
    OutputFormat, RawOptions, ReadOptions, RemoveOptions, ScanOptions, ValidateOptions,
    WriteOptions,
};
use acbfxml::config::CONFIG_FILE;
use acbfxml::Config;

#[derive(Parser)]
#[command(name = "acbfxml")]
#[command(about = "ACBF metadata for comic archives")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, global = true, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the ACBF metadata of an archive
    Read {
        /// Archive (cbz, cbt or folder)
        path: PathBuf,

        /// Output format (human, json, yaml)
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },

    /// Write metadata from a JSON or YAML document into an archive
    Write {
        /// Archive (cbz, cbt or folder)
        path: PathBuf,

        /// Metadata document (.json, .yaml, .yml)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Show the tag file diff without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Remove ACBF tags from archives
    Remove {
        /// Archives to clean
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Skip confirmation
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Print the stored tag file
    Raw {
        /// Archive (cbz, cbt or folder)
        path: PathBuf,
    },

    /// Report tag status for every archive under a directory
    Scan {
        /// Directory to scan
        #[arg(default_value = ".")]
        root: PathBuf,

        /// Report format (human, json, yaml)
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,

        /// Hide the progress bar
        #[arg(short, long)]
        quiet: bool,

        /// Number of parallel workers (overrides config)
        #[arg(long)]
        workers: Option<usize>,
    },

    /// Validate an .acbf document or the tag file of an archive
    Validate {
        /// File to validate
        file: PathBuf,
    },

    /// Install the plugin artifact into the host's plugins directory
    Install {
        /// Plugin artifact (acbfxml-plugin-<version>.zip)
        #[arg(required_unless_present_any = ["list", "uninstall"])]
        artifact: Option<PathBuf>,

        /// Host plugins directory (default: from config or the host's config dir)
        #[arg(long)]
        plugins_dir: Option<PathBuf>,

        /// Force reinstall even if already installed
        #[arg(short, long)]
        force: bool,

        /// List installed plugin artifacts instead of installing
        #[arg(long)]
        list: bool,

        /// Uninstall plugin artifacts
        #[arg(long)]
        uninstall: bool,

        /// Only uninstall this version
        #[arg(long, requires = "uninstall")]
        version: Option<String>,
    },
}

/// Initializes the tracing subscriber; `RUST_LOG` overrides the default level
fn init_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("acbfxml={level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    // Load config
    let mut config = Config::load_or_default(&cli.config)?;

    match cli.command {
        Commands::Read { path, format } => {
            execute_read(ReadOptions { path, format }, &config)?;
        }

        Commands::Write {
            path,
            metadata,
            dry_run,
        } => {
            let options = WriteOptions {
                path,
                metadata,
                dry_run,
            };
            execute_write(options, &config)?;
        }

        Commands::Remove { paths, yes } => {
            execute_remove(RemoveOptions { paths, yes }, &config)?;
        }

        Commands::Raw { path } => {
            execute_raw(RawOptions { path }, &config)?;
        }

        Commands::Scan {
            root,
            format,
            quiet,
            workers,
        } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            let options = ScanOptions {
                root,
                format,
                quiet,
            };
            execute_scan(options, &config)?;
        }

        Commands::Validate { file } => {
            execute_validate(ValidateOptions { file }, &config)?;
        }

        Commands::Install {
            artifact,
            plugins_dir,
            force,
            list,
            uninstall,
            version,
        } => {
            let plugins_dir = plugins_dir.unwrap_or_else(|| config.plugins_dir());
            if list {
                execute_list_installed(plugins_dir)?;
            } else if uninstall {
                execute_uninstall(plugins_dir, version)?;
            } else if let Some(artifact) = artifact {
                let options = InstallOptions {
                    artifact,
                    plugins_dir,
                    force,
                };
                execute_install(options)?;
            }
        }
    }

    Ok(())
}
