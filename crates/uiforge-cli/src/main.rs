use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

use commands::access::AccessCommand;
use commands::schema::SchemaCommand;

#[derive(Parser, Debug)]
#[command(name = "uiforge", version, about = "uiforge CLI")]
struct Cli {
    /// Path to the project configuration file.
    #[arg(long, global = true, default_value = "uiforge.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Regenerate UI component artifacts, preserving safe regions.
    Generate,

    /// Serve the generated REST endpoints over an in-memory store.
    Serve,

    /// Schema management (snapshot/inspect).
    Schema {
        #[command(subcommand)]
        cmd: SchemaCommand,
    },

    /// Inspect the aggregated per-model access policy.
    Access {
        #[command(subcommand)]
        cmd: AccessCommand,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let cli = Cli::parse();

    match cli.cmd {
        Command::Generate => commands::generate::run(&cli.config).await,
        Command::Serve => commands::serve::run(&cli.config).await,
        Command::Schema { cmd } => commands::schema::run(&cli.config, cmd).await,
        Command::Access { cmd } => commands::access::run(&cli.config, cmd).await,
    }
}
