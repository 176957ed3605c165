//! Discovery commands: `browse` lists packs, `show` prints one pack card.

use clap::Args;
use console::style;
use packhub::client::{CatalogClient, ReqwestClient};
use packhub::config::ConfigFile;
use packhub::search::ListQuery;

use crate::error::CliError;

/// Request timeout for discovery calls.
const TIMEOUT_SECS: u64 = 10;

/// Arguments shared by the discovery commands.
#[derive(Debug, Args)]
pub struct ServerArgs {
    /// Catalog base URL (default: local server from config)
    #[arg(long)]
    pub server: Option<String>,
}

/// Arguments for the browse command.
#[derive(Debug, Args)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub server: ServerArgs,

    /// Search term
    #[arg(long, short)]
    pub search: Option<String>,

    /// Sort order: trending, downloads or alphabetically
    #[arg(long)]
    pub sort: Option<String>,

    /// Maximum number of packs to list
    #[arg(long, default_value_t = 20)]
    pub limit: usize,

    /// Number of packs to skip
    #[arg(long, default_value_t = 0)]
    pub start: usize,

    /// Required category (repeatable)
    #[arg(long = "category", short)]
    pub categories: Vec<String>,
}

impl BrowseArgs {
    fn query(&self) -> Result<ListQuery, CliError> {
        let limit = self.limit.to_string();
        let start = self.start.to_string();

        let mut pairs = vec![("limit", limit.as_str()), ("start", start.as_str())];
        if let Some(search) = &self.search {
            pairs.push(("search", search.as_str()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.as_str()));
        }
        pairs.extend(self.categories.iter().map(|c| ("category", c.as_str())));

        ListQuery::from_pairs(pairs).map_err(|e| CliError::InvalidArgument(e.to_string()))
    }
}

fn client(args: &ServerArgs) -> Result<CatalogClient<ReqwestClient>, CliError> {
    let base_url = match &args.server {
        Some(url) => url.clone(),
        None => {
            let config = ConfigFile::load().unwrap_or_default();
            format!("http://127.0.0.1:{}", config.server.port)
        }
    };
    Ok(CatalogClient::new(
        ReqwestClient::with_timeout(TIMEOUT_SECS)?,
        base_url,
    ))
}

/// Run the browse command.
pub fn run_browse(args: BrowseArgs) -> Result<(), CliError> {
    let query = args.query()?;
    let client = client(&args.server)?;
    let packs = client.list_packs(&query)?;

    if packs.is_empty() {
        println!("No packs found.");
        return Ok(());
    }

    for pack in &packs {
        println!("{:<32} {}", style(&pack.id).cyan(), pack.display_name);
    }
    println!();
    println!(
        "{} pack(s) from {} (sorted by {})",
        packs.len(),
        client.base_url(),
        query.sort.as_str()
    );
    Ok(())
}

/// Run the show command.
pub fn run_show(id: &str, server: ServerArgs) -> Result<(), CliError> {
    let card = client(&server)?.pack_card(id)?;
    println!("{}", card);
    if !card.icon.is_empty() {
        println!("  {}", style(&card.icon).dim());
    }
    Ok(())
}
