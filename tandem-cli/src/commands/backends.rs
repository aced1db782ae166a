//! Backends command - list supported backends.

use anyhow::Result;
use tandem_providers::BackendRegistry;
use tandem_store::CredentialStore;
use tracing::{debug, info};

use crate::context::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Runs the backends command.
pub async fn run(cli: &Cli) -> Result<()> {
    info!("Listing backends");

    let ctx = AppContext::load(cli).await?;
    let primary = ctx.primary();

    let mut rows = Vec::new();
    for desc in BackendRegistry::all() {
        let store = CredentialStore::under(ctx.factory.config_root(), desc.id);
        let signed_in = match store.load_credentials().await {
            Ok(creds) => creds.is_some(),
            Err(e) => {
                debug!(backend = %desc.id, error = %e, "Unreadable credential cache");
                false
            }
        };
        rows.push((desc, ctx.settings.backend(desc.id), signed_in));
    }

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);

            println!("{}", formatter.format_backends_header());
            println!("{}", "─".repeat(60));

            for (desc, overrides, signed_in) in &rows {
                println!(
                    "{}",
                    formatter.format_backend_line(
                        desc,
                        &desc.model(overrides),
                        *signed_in,
                        desc.id == primary
                    )
                );
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            println!("{}", formatter.format_backends(&rows, primary)?);
        }
    }

    Ok(())
}
