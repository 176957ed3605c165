//! PackHub CLI - run and query the pack catalog.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;
mod error;
mod runner;

use commands::browse::{BrowseArgs, ServerArgs};
use commands::config::ConfigCommands;
use commands::metrics::MetricsAction;
use commands::serve::ServeArgs;
use error::CliError;

#[derive(Parser)]
#[command(name = "packhub")]
#[command(version = packhub::VERSION)]
#[command(about = "Catalog service for community add-on packs and bundles", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the configuration file with default settings
    Init,

    /// Run the catalog REST API
    Serve {
        /// Address to bind (overrides server.host)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind (overrides PORT and server.port)
        #[arg(long, short)]
        port: Option<u16>,

        /// Snapshot file (overrides store.snapshot)
        #[arg(long)]
        snapshot: Option<PathBuf>,

        /// Do not run the download metrics job
        #[arg(long)]
        no_metrics: bool,
    },

    /// View or modify configuration settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Download metrics maintenance
    Metrics {
        #[command(subcommand)]
        action: MetricsAction,
    },

    /// List packs from a running catalog
    Browse(BrowseArgs),

    /// Show a pack card
    Show {
        /// Pack id
        id: String,

        #[command(flatten)]
        server: ServerArgs,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        e.exit();
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Commands::Init => commands::init::run(),
        Commands::Serve {
            host,
            port,
            snapshot,
            no_metrics,
        } => commands::serve::run(ServeArgs {
            host,
            port,
            snapshot,
            no_metrics,
        }),
        Commands::Config { command } => commands::config::run(command),
        Commands::Metrics { action } => commands::metrics::run(action),
        Commands::Browse(args) => commands::browse::run_browse(args),
        Commands::Show { id, server } => commands::browse::run_show(&id, server),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_serve_overrides() {
        let cli = Cli::try_parse_from(["packhub", "serve", "--port", "8080", "--no-metrics"]).unwrap();
        match cli.command {
            Commands::Serve {
                port, no_metrics, ..
            } => {
                assert_eq!(port, Some(8080));
                assert!(no_metrics);
            }
            _ => panic!("expected serve"),
        }
    }

    #[test]
    fn test_parse_browse_categories() {
        let cli = Cli::try_parse_from([
            "packhub", "browse", "-c", "Vanilla+", "-c", "Magic", "--server", "http://hub.test",
        ])
        .unwrap();
        match cli.command {
            Commands::Browse(args) => {
                assert_eq!(args.categories, vec!["Vanilla+", "Magic"]);
                assert_eq!(args.server.server.as_deref(), Some("http://hub.test"));
            }
            _ => panic!("expected browse"),
        }
    }
}
