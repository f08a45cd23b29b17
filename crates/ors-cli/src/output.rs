use colored::Colorize;
use ors_admin::notification::{role_id, role_label};
use ors_admin::FormState;
use serde_json::{Value, json};
use tabled::builder::Builder;
use tabled::settings::Style;

use crate::cli::OutputFormat;

pub fn print_value(value: &Value, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", pretty(value)),
        OutputFormat::Table => print_as_table(value),
    }
}

pub fn print_success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

pub fn print_error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Render the form's outcome. Returns `false` when the form is in error.
pub fn print_form(form: &FormState, format: OutputFormat) -> bool {
    let message = form.message.as_deref().unwrap_or("");
    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                pretty(&json!({ "error": form.error, "message": message }))
            );
        }
        OutputFormat::Table => {
            if form.error {
                print_error(message);
            } else {
                print_success(message);
            }
        }
    }
    !form.error
}

pub fn print_roles(roles: &[Value], format: OutputFormat) {
    match format {
        OutputFormat::Json => println!("{}", pretty(&Value::Array(roles.to_vec()))),
        OutputFormat::Table => {
            if roles.is_empty() {
                println!("No roles available.");
                return;
            }
            let mut builder = Builder::default();
            builder.push_record(["ID", "Role"]);
            for role in roles {
                let id = role_id(role).unwrap_or_else(|| "-".to_string());
                builder.push_record([id, role_label(role)]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
    }
}

fn print_as_table(value: &Value) {
    match value.as_object() {
        Some(obj) => {
            let mut builder = Builder::default();
            builder.push_record(["Key", "Value"]);
            for (k, v) in obj {
                let v = match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                builder.push_record([k.clone(), v]);
            }
            println!("{}", builder.build().with(Style::rounded()));
        }
        None => println!("{}", pretty(value)),
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}
