//! OntoSight CLI - serve, view and inspect graph, hypergraph and list datasets.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::Level;
use tracing_subscriber::{filter::LevelFilter, fmt::format::FmtSpan, EnvFilter};

mod commands;
mod config;

use commands::{config as config_cmd, inspect, serve};
use config::Config;

/// OntoSight CLI - Explore graphs, hypergraphs and item lists.
#[derive(Parser, Debug)]
#[command(
    name = "ontosight",
    author,
    version,
    about = "OntoSight: serve, view and inspect graph datasets",
    long_about = None
)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Serve a document over the REST API.
    Serve {
        /// Source document (JSON with a `type` of graph, hypergraph or list).
        document: PathBuf,

        /// Interface to bind (overrides config).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides config).
        #[arg(short, long)]
        port: Option<u16>,

        /// Directory with a built frontend to serve at `/`.
        #[arg(long)]
        static_dir: Option<PathBuf>,

        /// Do not register the built-in search and chat handlers.
        #[arg(long)]
        no_handlers: bool,
    },

    /// Open a document in the native visualization window.
    ///
    /// Requires a build with `--features native`.
    View {
        /// Source document; the sample hypergraph when omitted.
        document: Option<PathBuf>,
    },

    /// Print what a document contains.
    Inspect {
        /// Source document.
        document: PathBuf,

        /// Print the metadata as JSON.
        #[arg(long)]
        json: bool,

        /// Print one element's full record as JSON.
        #[arg(long, conflicts_with_all = ["json", "sample"])]
        details: Option<String>,

        /// Print the sample around these ids (or the default sample) as JSON.
        ///
        /// Ids go after an equals sign: `--sample=a,b`.
        #[arg(
            long,
            num_args = 0..=1,
            require_equals = true,
            value_delimiter = ',',
            conflicts_with = "json"
        )]
        sample: Option<Vec<String>>,
    },

    /// Manage CLI configuration.
    #[command(subcommand)]
    Config(ConfigCommands),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommands {
    /// Show current configuration.
    Show,

    /// Set a configuration value.
    Set {
        /// Configuration key.
        key: String,
        /// Configuration value.
        value: String,
    },

    /// Get a configuration value.
    Get {
        /// Configuration key.
        key: String,
    },

    /// Reset configuration to defaults.
    Reset,

    /// Show path to config file.
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup tracing based on verbosity; RUST_LOG wins when set
    let level = if cli.quiet {
        Level::ERROR
    } else if cli.verbose {
        Level::DEBUG
    } else {
        Level::WARN // Default to less noise
    };
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    // Load configuration
    let config = Config::load()?;

    match cli.command {
        Commands::Serve {
            document,
            host,
            port,
            static_dir,
            no_handlers,
        } => {
            let service = commands::load_service(&config, &document, !no_handlers)?;
            let options = serve::ServeOptions {
                host,
                port,
                static_dir,
            };
            serve::execute(&config, service, options).await?;
        }

        Commands::View { document } => view(&config, document)?,

        Commands::Inspect {
            document,
            json,
            details,
            sample,
        } => {
            let service = commands::load_service(&config, &document, true)?;
            match (details, sample) {
                (Some(id), _) => inspect::details(&service, &id)?,
                (None, Some(ids)) => inspect::sample(&service, &ids)?,
                (None, None) => inspect::summary(&service, json)?,
            }
        }

        Commands::Config(config_cmd_inner) => match config_cmd_inner {
            ConfigCommands::Show => {
                config_cmd::show(&config)?;
            }
            ConfigCommands::Set { key, value } => {
                config_cmd::set(&key, &value)?;
            }
            ConfigCommands::Get { key } => {
                config_cmd::get(&config, &key)?;
            }
            ConfigCommands::Reset => {
                config_cmd::reset()?;
            }
            ConfigCommands::Path => {
                if let Some(path) = Config::config_file_path() {
                    println!("{}", path.display());
                } else {
                    println!("(no config file path available)");
                }
            }
        },
    }

    Ok(())
}

#[cfg(feature = "native")]
fn view(config: &Config, document: Option<PathBuf>) -> Result<()> {
    commands::view::execute(config, document.as_deref())
}

#[cfg(not(feature = "native"))]
fn view(_config: &Config, _document: Option<PathBuf>) -> Result<()> {
    anyhow::bail!(
        "The view command needs the native window. Rebuild with: cargo build --features native"
    )
}
