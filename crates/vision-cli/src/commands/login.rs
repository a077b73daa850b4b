//! Login command implementation.

use anyhow::{Context, Result};
use chrono::Local;
use clap::Args;

use vision_core::traits::RecordSource;

use crate::config::ConnectionArgs;
use crate::output;
use crate::source::CliSource;

#[derive(Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,
}

pub async fn run(args: LoginArgs) -> Result<()> {
    let source = CliSource::connect(&args.connection).await?;
    let api = source
        .as_http()
        .context("Login needs a network API URL; file:// snapshots have no credentials")?;
    let session = api.session();

    output::success("Logged in successfully");
    println!();
    output::field("API", source.url().as_str());
    let issued = session.issued_at().with_timezone(&Local);
    output::field("Token issued", &issued.format("%Y-%m-%d %H:%M:%S %Z").to_string());
    output::field(
        "Renews after",
        &format!("{}s", session.renewal_threshold().as_secs()),
    );

    Ok(())
}
