//! Cameras command implementation.

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::Local;
use clap::Args;
use colored::Colorize;
use directories::ProjectDirs;
use tracing::debug;

use vision_core::ResourcePath;
use vision_core::traits::RecordSource;
use vision_file::FileStore;

use crate::config::ConnectionArgs;
use crate::output;
use crate::source::CliSource;

const CAMERAS: &str = "/cameras";

#[derive(Args, Debug)]
pub struct CamerasArgs {
    /// Snapshot directory (defaults to the platform data directory)
    #[arg(long)]
    pub mock_dir: Option<PathBuf>,

    /// Read cameras from the snapshot instead of the API
    #[arg(long, conflicts_with = "update_mock")]
    pub use_mock: bool,

    /// Overwrite the snapshot with the cameras just fetched
    #[arg(long)]
    pub update_mock: bool,

    /// Pretty-print JSON output
    #[arg(long)]
    pub pretty: bool,

    #[command(flatten)]
    pub connection: ConnectionArgs,
}

fn default_mock_dir() -> Result<PathBuf> {
    let dirs =
        ProjectDirs::from("", "", "vision").context("Could not determine data directory")?;
    Ok(dirs.data_dir().join("mock"))
}

pub async fn run(args: CamerasArgs) -> Result<()> {
    let path = ResourcePath::new(CAMERAS)?;
    let mock_dir = match &args.mock_dir {
        Some(dir) => dir.clone(),
        None => default_mock_dir()?,
    };
    let store = FileStore::new(&mock_dir);
    debug!(dir = %mock_dir.display(), use_mock = args.use_mock, "Camera snapshot");

    let records = if args.use_mock {
        if !store.exists(&path) {
            bail!(
                "No camera snapshot at {}. Run with --update-mock first.",
                store.collection_path(&path).display()
            );
        }
        if let Some(modified) = store.modified(&path)? {
            eprintln!(
                "{}: {}",
                "Snapshot from".dimmed(),
                modified.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S")
            );
        }
        store.load(&path).context("Failed to read camera snapshot")?
    } else {
        let source = CliSource::connect(&args.connection).await?;
        let records = match source.as_http() {
            Some(api) => api.cameras().await,
            None => {
                source
                    .fetch_all(&path, args.connection.page_size, args.connection.timeout())
                    .await
            }
        }
        .context("Failed to fetch cameras")?;

        if args.update_mock {
            let file = store
                .save(&path, &records)
                .context("Failed to update camera snapshot")?;
            eprintln!("{}: {}", "Snapshot updated".dimmed(), file.display());
        }
        records
    };

    output::records(&records, args.pretty)
}
