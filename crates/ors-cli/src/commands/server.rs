use anyhow::Result;
use colored::Colorize;
use ors_admin::envelope::{is_success, result_message};
use ors_admin::{NotificationController, Outcome};

use crate::cli::OutputFormat;
use crate::output::{print_error, print_value};

pub async fn status(
    controller: &NotificationController,
    server: &str,
    format: OutputFormat,
) -> Result<bool> {
    let body = match controller.ping().await {
        Outcome::Completed(body) => body,
        Outcome::Aborted => return Ok(false),
    };

    if matches!(format, OutputFormat::Json) {
        print_value(&body, format);
        return Ok(is_success(&body));
    }

    let message = result_message(&body).unwrap_or("");
    if is_success(&body) {
        println!("{} {} is {}", "✓".green(), server.cyan(), "ready".green());
        if !message.is_empty() {
            println!("  {message}");
        }
        if let Some(endpoints) = body
            .get("result")
            .and_then(|r| r.get("endpoints"))
            .and_then(|v| v.as_str())
        {
            println!("  {endpoints}");
        }
        Ok(true)
    } else {
        print_error(&format!("{} returned: {}", server.cyan(), message));
        Ok(false)
    }
}
