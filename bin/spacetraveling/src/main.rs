//! spacetraveling CLI
//!
//! Blog front-end for a headless CMS: prerenders the site and serves pages
//! that were not prebuilt.
//!
//! This is the binary entry point. The library functionality is in `lib.rs`.

use std::path::PathBuf;

use clap::Parser;
use color_eyre::eyre::Result;

/// Command-line interface for spacetraveling.
#[derive(Parser)]
#[command(
    name = "spacetraveling",
    version,
    about = "Blog front-end for a headless CMS"
)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Read content from a JSON fixtures file instead of the CMS
    #[arg(long, global = true)]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available CLI commands.
#[derive(clap::Subcommand)]
enum Commands {
    /// Prerender the listing and post pages
    Build {
        /// Output directory (defaults to build.output_dir)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Serve pages rendered on demand
    Serve {
        /// Port to listen on (overrides the configured port)
        #[arg(short, long)]
        port: Option<u16>,
        /// Address to bind (defaults to server.bind_addr)
        #[arg(short, long)]
        bind: Option<String>,
    },
    /// Validate configuration and content store access
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();
    spacetraveling::init_tracing(cli.verbose);

    let fixtures = cli.fixtures.as_deref();
    match cli.command {
        Commands::Build { output } => {
            spacetraveling::cmd::build::run(&cli.config, output.as_deref(), fixtures).await?;
        }
        Commands::Serve { port, bind } => {
            spacetraveling::cmd::serve::run(&cli.config, bind.as_deref(), port, fixtures).await?;
        }
        Commands::Check => {
            spacetraveling::cmd::check::run(&cli.config, fixtures).await?;
        }
    }

    Ok(())
}
