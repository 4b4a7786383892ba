use std::fs;
use std::io::{self, Read};
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use okta_provider::resources::idp_discovery::schema::POLICY_ID;
use okta_provider::resources::schema_for;
use okta_provider::{FlatState, ImportId, ProviderError, ResourceData, ResourceHandler};

use crate::cli::OutputFormat;
use crate::output::{print_schema, print_state, print_success};

fn read_body(file: &Option<String>) -> Result<serde_json::Value> {
    let content = match file {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("Failed to read file: {path}"))?
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            buf
        }
    };
    serde_json::from_str(&content).context("Invalid JSON")
}

fn referenced(handler: &dyn ResourceHandler, reference: &str) -> Result<ResourceData> {
    let ImportId { policy_id, rule_id } = reference.parse()?;
    let mut data = ResourceData::new(handler.schema()).with_id(rule_id);
    data.state.set(POLICY_ID, policy_id)?;
    Ok(data)
}

pub async fn read(
    handler: Arc<dyn ResourceHandler>,
    reference: &str,
    format: OutputFormat,
) -> Result<()> {
    let mut data = referenced(handler.as_ref(), reference)?;
    handler.read(&mut data).await?;
    print_state(&data, format);
    Ok(())
}

pub async fn import(
    handler: Arc<dyn ResourceHandler>,
    reference: &str,
    format: OutputFormat,
) -> Result<()> {
    let data = handler.import(reference).await?;
    print_success(&format!("Imported {}", reference.cyan()));
    print_state(&data, format);
    Ok(())
}

pub async fn apply(
    handler: Arc<dyn ResourceHandler>,
    file: &Option<String>,
    id: Option<&str>,
    format: OutputFormat,
) -> Result<()> {
    let body = read_body(file)?;
    let state = FlatState::from_config(handler.schema(), &body)
        .context("Desired state does not match the resource schema")?;
    let mut data = ResourceData::from_state(state);
    data.id = id.map(str::to_string);

    if handler.exists(&data).await? {
        handler.update(&mut data).await?;
        print_success(&format!("Updated {}", data.id().unwrap_or("?").cyan()));
    } else {
        data.id = None;
        handler.create(&mut data).await?;
        print_success(&format!("Created {}", data.id().unwrap_or("?").cyan()));
    }
    print_state(&data, format);
    Ok(())
}

pub async fn delete(handler: Arc<dyn ResourceHandler>, reference: &str) -> Result<()> {
    let mut data = referenced(handler.as_ref(), reference)?;
    handler.delete(&mut data).await?;
    print_success(&format!("Deleted {}", reference.cyan()));
    Ok(())
}

pub fn schema(type_name: &str, format: OutputFormat) -> Result<()> {
    let schema = schema_for(type_name).ok_or_else(|| ProviderError::UnknownResourceType {
        name: type_name.to_string(),
    })?;
    print_schema(schema, format);
    Ok(())
}
