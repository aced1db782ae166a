//! Status command - executor configuration and backend availability.

use anyhow::Result;
use tandem_core::{BackendStatus, ExecutorStatus};
use tracing::{info, warn};

use crate::context::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the status command.
///
/// Construction failures are reported as unavailable backends rather than
/// as a command error.
pub async fn run(cli: &Cli) -> Result<()> {
    let ctx = AppContext::load(cli).await?;
    let config = &ctx.settings.executor;

    info!(primary = %ctx.primary(), "Checking backends");

    let (status, error) = match ctx.executor().await {
        Ok(executor) => (executor.status(), None),
        Err(e) => {
            warn!(error = %e, "No backend could be initialized");
            let status = ExecutorStatus {
                primary: BackendStatus::new(ctx.primary(), false),
                fallback: config
                    .active_fallback()
                    .map(|kind| BackendStatus::new(kind, false)),
            };
            (status, Some(format!("{e:#}")))
        }
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("{}", formatter.format_status(&status, config));
            if let Some(error) = error {
                println!();
                println!("{error}");
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_status(&status, config, error)?);
        }
    }

    Ok(())
}
