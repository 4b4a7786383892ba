use crate::cli::OutputFormat;
use colored::Colorize;
use okta_provider::{FieldValue, ResourceData, ResourceSchema};
use serde_json::{Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;

pub fn print_state(data: &ResourceData, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let mut value = data.state.to_json();
            if let Value::Object(map) = &mut value {
                map.insert("id".into(), json!(data.id()));
            }
            print_json(&value);
        }
        OutputFormat::Table => {
            let mut builder = Builder::default();
            builder.push_record(["Field", "Value"]);
            builder.push_record(["id", data.id().unwrap_or("-")]);
            for (name, value) in data.state.iter() {
                builder.push_record([name.to_string(), render(value)]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

pub fn print_schema(schema: &ResourceSchema, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let fields: Vec<Value> = schema
                .fields
                .iter()
                .map(|field| {
                    json!({
                        "name": field.name,
                        "shape": field.shape.to_string(),
                        "required": field.required,
                        "default": field.default,
                        "allowed": field.allowed,
                        "description": field.description,
                    })
                })
                .collect();
            print_json(&json!({"type": schema.type_name, "fields": fields}));
        }
        OutputFormat::Table => {
            println!("{} {}", "Resource:".cyan(), schema.type_name.cyan());
            let mut builder = Builder::default();
            builder.push_record(["Field", "Shape", "Required", "Default", "Description"]);
            for field in schema.fields {
                builder.push_record([
                    field.name.to_string(),
                    field.shape.to_string(),
                    if field.required { "yes" } else { "" }.to_string(),
                    field.default.unwrap_or("").to_string(),
                    field.description.to_string(),
                ]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

pub fn print_success(msg: &str) {
    eprintln!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg.red());
}

pub fn print_hint(msg: &str) {
    eprintln!("{} {}", "hint:".yellow(), msg);
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => print_error(&format!("Failed to render JSON: {e}")),
    }
}

fn render(value: &FieldValue) -> String {
    match value {
        FieldValue::Scalar(p) => p.to_string(),
        FieldValue::List(items) => {
            let items: Vec<String> = items.iter().map(ToString::to_string).collect();
            format!("[{}]", items.join(", "))
        }
        FieldValue::Set(items) => {
            let items: Vec<String> = items.iter().map(ToString::to_string).collect();
            format!("{{{}}}", items.join(", "))
        }
        FieldValue::RecordSet(records) => records
            .iter()
            .map(|record| {
                let members: Vec<String> = record.iter().map(|(k, v)| format!("{k}={v}")).collect();
                format!("{{{}}}", members.join(", "))
            })
            .collect::<Vec<_>>()
            .join("\n"),
    }
}
