use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{cat, init, log, ls, reconcile, serve, write};

#[derive(Parser)]
#[command(name = "egfs")]
#[command(version, about = "Encrypted documents stored in git", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone)]
pub struct GlobalArgs {
    /// Config file (defaults to egfs.toml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Git working directory, overrides the config file
    #[arg(short = 'C', long, global = true)]
    workdir: Option<PathBuf>,

    /// Remote to push to after each commit, overrides the config file
    #[arg(long, global = true)]
    remote: Option<String>,

    /// Store password (prompted for when not set)
    #[arg(long, env = "EGFS_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a repository and its empty index
    Init,

    /// Append an entry to a document
    Write {
        /// Document name
        name: String,

        /// Read the entry from a file instead of stdin
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print a document's decrypted content
    Cat {
        /// Document name
        name: String,
    },

    /// List documents
    Ls {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show the entries of a document
    Log {
        /// Document name
        name: String,

        /// Number of entries to show, newest first
        #[arg(short, long)]
        limit: Option<usize>,
    },

    /// Add documents missing from the index after interrupted writes
    Reconcile,

    /// Serve documents read-only over HTTP
    Serve {
        /// Port for the HTTP server (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let global = cli.global;

    match cli.command {
        Commands::Init => {
            init::run(&global)?;
        }
        Commands::Write { name, file } => {
            write::run(&global, name, file)?;
        }
        Commands::Cat { name } => {
            cat::run(&global, name)?;
        }
        Commands::Ls { json } => {
            ls::run(&global, json)?;
        }
        Commands::Log { name, limit } => {
            log::run(&global, name, limit)?;
        }
        Commands::Reconcile => {
            reconcile::run(&global)?;
        }
        Commands::Serve { port } => {
            serve::run(&global, port).await?;
        }
    }

    Ok(())
}
