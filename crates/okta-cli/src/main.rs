mod cli;
mod commands;
mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use okta_client::{CancellationToken, OktaClient};
use okta_provider::config::loader::load_config;
use okta_provider::observability::init_tracing_with_level;
use okta_provider::{ProviderError, ResourceHandler, ResourceRegistry};

use cli::{Cli, Commands};
use output::{print_error, print_hint};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        if let Some(hint) = hint_for(&e) {
            print_hint(hint);
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();
    let format = cli.format.unwrap_or_default();

    match &cli.command {
        Commands::Read(args) => {
            let handler = make_handler(&cli)?;
            commands::rule::read(handler, &args.reference, format).await?;
        }
        Commands::Import(args) => {
            let handler = make_handler(&cli)?;
            commands::rule::import(handler, &args.reference, format).await?;
        }
        Commands::Apply(args) => {
            let handler = make_handler(&cli)?;
            commands::rule::apply(handler, &args.file, args.id.as_deref(), format).await?;
        }
        Commands::Delete(args) => {
            let handler = make_handler(&cli)?;
            commands::rule::delete(handler, &args.reference).await?;
        }
        Commands::Schema => {
            commands::rule::schema(&cli.resource_type, format)?;
        }
    }

    Ok(())
}

fn make_handler(cli: &Cli) -> Result<Arc<dyn ResourceHandler>> {
    let config = load_config(cli.config.as_deref())?;
    init_tracing_with_level(&config.logging.level);
    tracing::debug!(?config, "Loaded provider configuration");

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, abandoning retries");
            on_signal.cancel();
        }
    });

    let client = OktaClient::new(config.client_config()?)
        .context("Failed to build Okta client")?
        .with_cancellation(cancel);
    let registry = ResourceRegistry::with_defaults(Arc::new(client));
    Ok(registry.get(&cli.resource_type)?)
}

fn hint_for(err: &anyhow::Error) -> Option<&'static str> {
    match err.downcast_ref::<ProviderError>()? {
        ProviderError::RateLimited { .. } => {
            Some("lower `parallelism` or raise `max_retries` in okta.toml")
        }
        ProviderError::PartialReconciliation { .. } => {
            Some("the rule exists; run `apply` again with --id to retry the status change")
        }
        _ => None,
    }
}
