use clap::{Parser, Subcommand, ValueEnum};
use okta_provider::resources::idp_discovery::TYPE_NAME;

#[derive(Parser)]
#[command(name = "okta-provider")]
#[command(about = "Manage Okta IdP discovery policy rules from JSON state files")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Provider config file (defaults to ./okta.toml when present)
    #[arg(short, long, global = true, env = "OKTA_CONFIG")]
    pub config: Option<String>,

    /// Resource type to operate on
    #[arg(short, long, global = true, default_value = TYPE_NAME)]
    pub resource_type: String,

    /// Output format
    #[arg(short, long, global = true)]
    pub format: Option<OutputFormat>,
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Table,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Read a rule by reference (e.g. 00p1/0pr1)
    Read(ReferenceArgs),
    /// Import an existing rule by reference and print its full state
    Import(ReferenceArgs),
    /// Create or update a rule from a desired-state JSON document
    Apply(ApplyArgs),
    /// Delete a rule; succeeds if it is already gone
    Delete(ReferenceArgs),
    /// Print the fields of the resource type
    Schema,
}

#[derive(clap::Args)]
pub struct ReferenceArgs {
    /// Rule reference: <policy_id>/<rule_id>
    pub reference: String,
}

#[derive(clap::Args)]
pub struct ApplyArgs {
    /// JSON file with the desired state (reads stdin if omitted)
    #[arg(long)]
    pub file: Option<String>,
    /// Id of an existing rule to update
    #[arg(long)]
    pub id: Option<String>,
}
