//! Health check command - checks a running bin server.

use std::time::Duration;

use crate::cli::HealthArgs;
use crate::context::redact_url;
use crate::output::{OutputFormat, print_json};

fn health_url(base: &str) -> String {
    let base = base.trim_end_matches('/');
    if base.ends_with("/health") {
        base.to_string()
    } else {
        format!("{base}/health")
    }
}

/// Run the health check command
///
/// Exits with status 1 when the server is unreachable or reports anything
/// other than healthy.
pub async fn run(args: &HealthArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let url = health_url(&args.url);
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(args.timeout))
        .build()?;

    let verdict = match client.get(&url).send().await {
        Ok(response) if response.status().is_success() => {
            let body: serde_json::Value = response.json().await?;
            match body.get("status").and_then(|s| s.as_str()) {
                Some("healthy") => Ok(body),
                other => Err(format!("server returned status {}", other.unwrap_or("<none>"))),
            }
        }
        Ok(response) => Err(format!("server returned HTTP status {}", response.status())),
        Err(e) => Err(format!("failed to connect to {}: {e}", redact_url(&url))),
    };

    match (verdict, format) {
        (Ok(body), OutputFormat::Human) => println!("healthy: {body}"),
        (Ok(body), OutputFormat::Json) => print_json(&body)?,
        (Err(reason), OutputFormat::Human) => {
            eprintln!("unhealthy: {reason}");
            std::process::exit(1);
        }
        (Err(reason), OutputFormat::Json) => {
            print_json(&serde_json::json!({ "status": "unhealthy", "reason": reason }))?;
            std::process::exit(1);
        }
    }
    Ok(())
}
