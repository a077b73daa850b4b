//! Fetch command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::debug;

use vision_core::traits::RecordSource;
use vision_core::{ResourcePath, sort_records_by};
use vision_file::FileStore;

use crate::config::ConnectionArgs;
use crate::output;
use crate::source::CliSource;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Collection path, e.g. /cameras
    pub path: String,

    /// Sort records by this top-level field
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort in descending order
    #[arg(long, requires = "sort_by")]
    pub desc: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    /// Also save the records as a snapshot under this directory
    #[arg(long)]
    pub save_to: Option<PathBuf>,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

pub async fn run(args: FetchArgs) -> Result<()> {
    let path = ResourcePath::new(&args.path).context("Invalid resource path")?;
    let source = CliSource::connect(&args.connection).await?;

    let mut records = source
        .fetch_all(&path, args.connection.page_size, args.connection.timeout())
        .await
        .context("Failed to fetch records")?;

    debug!(%path, records = records.len(), "Fetched collection");

    if let Some(key) = &args.sort_by {
        sort_records_by(&mut records, key, args.desc);
    }

    if let Some(dir) = &args.save_to {
        let file = FileStore::new(dir)
            .save(&path, &records)
            .context("Failed to save snapshot")?;
        eprintln!("{}: {}", "Saved".dimmed(), file.display());
    }

    output::records(&records, args.pretty)
}
