//! Health command - checks that the backend answers.

use anyhow::Result;
use clap::Args;

use super::Context;

/// Arguments for the health command.
#[derive(Args, Debug)]
pub struct HealthArgs {}

/// Run the health command.
pub async fn run(_args: HealthArgs, ctx: &Context) -> Result<()> {
    let url = ctx.backend_url()?;
    let health = ctx.client()?.health().check().await?;

    if ctx.json_output {
        println!("{}", serde_json::to_string_pretty(&health)?);
    } else {
        print!("{}: {}", url, health.status);
        if let Some(version) = &health.version {
            print!(" (version {})", version);
        }
        println!();
    }
    Ok(())
}
