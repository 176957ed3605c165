//! Init command - write a starter configuration file.

use packhub::config::{config_file_path, default_snapshot_path, ConfigFile};

use crate::error::CliError;

/// Run the init command.
///
/// Existing settings are kept; only an unset snapshot path is filled in.
pub fn run() -> Result<(), CliError> {
    let mut config = ConfigFile::load().unwrap_or_default();
    if config.store.snapshot.is_none() {
        config.store.snapshot = Some(default_snapshot_path());
    }
    config.save()?;

    println!("Configuration file: {}", config_file_path().display());
    if let Some(snapshot) = &config.store.snapshot {
        println!("Catalog snapshot:   {}", snapshot.display());
    }
    println!();
    println!("Add write tokens under [tokens] as '<token> = <user id>'.");
    println!("CLI arguments override config file values when specified.");
    Ok(())
}
