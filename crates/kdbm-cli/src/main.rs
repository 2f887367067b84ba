use clap::{Parser, Subcommand};
use kdbm_core::Transport;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser, Debug)]
#[command(name = "kdbm", version, about = "Serve a relational database as callable tools")]
struct Cli {
    /// Log filter used when RUST_LOG is not set (e.g. "debug", "kdbm_adapter=debug").
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the tool server.
    Serve {
        /// YAML configuration file.
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Database URL; overrides the configuration file.
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,

        /// Transport: websocket or stdio.
        #[arg(long)]
        transport: Option<Transport>,

        /// Port for the WebSocket transport.
        #[arg(long)]
        port: Option<u16>,
    },

    /// Print the tool descriptors as JSON. Needs no database.
    Tools,

    /// Connect, resolve the dialect and count the user tables.
    Check {
        /// YAML configuration file.
        #[arg(long, short)]
        config: Option<PathBuf>,

        /// Database URL; overrides the configuration file.
        #[arg(long, env = "DATABASE_URL")]
        database_url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // stdout carries protocol frames under the stdio transport.
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cli.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.cmd {
        Command::Serve {
            config,
            database_url,
            transport,
            port,
        } => {
            let overrides = commands::Overrides {
                database_url,
                transport,
                port,
            };
            commands::serve::run(config, overrides).await
        }
        Command::Tools => commands::tools::run(),
        Command::Check {
            config,
            database_url,
        } => {
            let overrides = commands::Overrides {
                database_url,
                ..Default::default()
            };
            commands::check::run(config, overrides).await
        }
    }
}
