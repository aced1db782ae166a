//! Login, logout, and whoami commands.

use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use std::time::Duration;
use tandem_fetch::AuthError;
use tandem_providers::{BrowserLauncher, InteractiveAuthenticator};
use tandem_store::CredentialStore;
use tracing::{info, warn};

use crate::context::AppContext;
use crate::output::{JsonFormatter, TextFormatter};
use crate::{Cli, OutputFormat};

/// Arguments naming a backend.
#[derive(Args, Default)]
pub struct AuthArgs {
    /// Backend (defaults to the primary).
    pub backend: Option<String>,
}

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Backend (defaults to the primary).
    pub backend: Option<String>,

    /// Print the authorization URL instead of opening a browser.
    #[arg(long)]
    pub no_browser: bool,

    /// Seconds to wait for the browser callback.
    #[arg(long, default_value = "300")]
    pub timeout: u64,
}

/// Prints the authorization URL for the user to open.
struct PrintUrl;

impl BrowserLauncher for PrintUrl {
    fn open(&self, url: &str) -> Result<(), AuthError> {
        eprintln!("Open this URL to sign in:\n\n  {url}\n");
        Ok(())
    }
}

/// Runs the login command.
pub async fn login(args: &LoginArgs, cli: &Cli) -> Result<()> {
    let ctx = AppContext::load(cli).await?;
    let kind = ctx.backend_or_primary(args.backend.as_deref())?;
    let client = Arc::new(ctx.factory.oauth_client(kind)?);

    info!(backend = %kind, "Starting browser sign-in");

    let mut authenticator = InteractiveAuthenticator::new(client.clone())
        .with_timeout(Duration::from_secs(args.timeout));
    if args.no_browser {
        authenticator = authenticator.with_browser(Arc::new(PrintUrl));
    }
    authenticator.authenticate_interactively().await?;

    // Identity is informational; sign-in already succeeded.
    let user = match client.get_user_info().await {
        Ok(user) => Some(user),
        Err(e) => {
            warn!(error = %e, "Signed in, but user info is unavailable");
            None
        }
    };

    match cli.format {
        OutputFormat::Text => {
            let formatter = TextFormatter::new(!cli.no_color);
            println!("Signed in to {}.", kind.display_name());
            if let Some(user) = user {
                println!("{}", formatter.format_user(kind, &user));
            }
        }
        OutputFormat::Json => {
            let formatter = JsonFormatter::new(cli.pretty);
            match user {
                Some(user) => println!("{}", formatter.format_user(kind, &user)?),
                None => println!(
                    "{}",
                    formatter.format(&serde_json::json!({"backend": kind.cli_name()}))?
                ),
            }
        }
    }

    Ok(())
}

/// Runs the logout command.
///
/// Works without OAuth client configuration, so stale credentials can
/// always be removed.
pub async fn logout(args: &AuthArgs, cli: &Cli) -> Result<()> {
    let ctx = AppContext::load(cli).await?;
    let kind = ctx.backend_or_primary(args.backend.as_deref())?;

    CredentialStore::under(ctx.factory.config_root(), kind)
        .clear()
        .await?;
    info!(backend = %kind, "Signed out");

    if !cli.quiet {
        match cli.format {
            OutputFormat::Text => println!("Signed out of {}.", kind.display_name()),
            OutputFormat::Json => println!(
                "{}",
                JsonFormatter::new(cli.pretty)
                    .format(&serde_json::json!({"backend": kind.cli_name(), "signedOut": true}))?
            ),
        }
    }

    Ok(())
}

/// Runs the whoami command.
pub async fn whoami(args: &AuthArgs, cli: &Cli) -> Result<()> {
    let ctx = AppContext::load(cli).await?;
    let kind = ctx.backend_or_primary(args.backend.as_deref())?;
    let client = ctx.factory.oauth_client(kind)?;

    let user = client.get_user_info().await?;

    match cli.format {
        OutputFormat::Text => {
            println!("{}", TextFormatter::new(!cli.no_color).format_user(kind, &user));
        }
        OutputFormat::Json => {
            println!("{}", JsonFormatter::new(cli.pretty).format_user(kind, &user)?);
        }
    }

    Ok(())
}
