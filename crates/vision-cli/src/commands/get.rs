//! Get command implementation.

use anyhow::{Context, Result};
use clap::Args;

use vision_core::ResourcePath;
use vision_core::traits::RecordSource;

use crate::config::ConnectionArgs;
use crate::output;
use crate::source::CliSource;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Resource paths, e.g. /cameras/3f2a /cameras/9b1c
    #[arg(required = true, num_args = 1..)]
    pub paths: Vec<String>,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

pub async fn run(args: GetArgs) -> Result<()> {
    let paths = args
        .paths
        .iter()
        .map(|p| ResourcePath::new(p).with_context(|| format!("Invalid resource path '{}'", p)))
        .collect::<Result<Vec<_>>>()?;

    let source = CliSource::connect(&args.connection).await?;

    let records = source
        .fetch_paths(&paths, args.connection.timeout())
        .await
        .context("Failed to fetch records")?;

    output::records(&records, args.pretty)
}
