//! Serve command - run the catalog API until Ctrl+C.

use std::path::PathBuf;

use packhub::app::{AppConfig, PackHubApp};

use crate::error::CliError;
use crate::runner::CliRunner;

/// Arguments for the serve command.
pub struct ServeArgs {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub snapshot: Option<PathBuf>,
    pub no_metrics: bool,
}

/// Run the serve command.
pub fn run(args: ServeArgs) -> Result<(), CliError> {
    let mut runner = CliRunner::new()?;
    runner.log_startup("serve");

    // CLI > PORT > config file
    let config = runner.config_mut();
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.snapshot.is_some() {
        config.store.snapshot = args.snapshot;
    }
    if args.no_metrics {
        config.metrics.enabled = false;
    }

    let app_config = AppConfig::from_config_file(runner.config());

    println!("PackHub v{}", packhub::VERSION);
    println!("============");
    println!();
    match &app_config.snapshot {
        Some(path) => println!("Snapshot: {}", path.display()),
        None => println!("Snapshot: (none, catalog is in-memory only)"),
    }
    println!("Tokens:   {}", app_config.tokens.len());
    match &app_config.metrics {
        Some(metrics) => println!("Metrics:  every {}s", metrics.interval.as_secs()),
        None => println!("Metrics:  disabled"),
    }
    println!();

    let runtime = runner.runtime()?;
    runtime.block_on(async move {
        let app = PackHubApp::start(app_config).await?;
        println!("Listening on http://{}", app.local_addr());
        println!("Press Ctrl+C to stop");

        let shutdown = app.shutdown_token();
        let handler_token = shutdown.clone();
        ctrlc::set_handler(move || {
            println!();
            println!("Received shutdown signal, stopping...");
            handler_token.cancel();
        })
        .map_err(|e| CliError::Config(format!("Failed to set signal handler: {}", e)))?;

        shutdown.cancelled().await;
        app.shutdown().await?;
        println!("Stopped.");
        Ok::<(), CliError>(())
    })
}
