//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::{cameras, fetch, get, login};

/// Fetch camera flood identifications from the Vision AI API.
#[derive(Parser, Debug)]
#[command(name = "vision")]
#[command(author, version = env!("VISION_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check credentials against the token endpoint
    Login(login::LoginArgs),

    /// Fetch every record of a paged collection
    Fetch(fetch::FetchArgs),

    /// Fetch specific resources concurrently, one request per path
    Get(get::GetArgs),

    /// Fetch cameras, reading or refreshing the local snapshot
    Cameras(cameras::CamerasArgs),
}
