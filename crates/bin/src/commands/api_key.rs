//! API key commands.

use serde_json::json;

use crate::cli::ApiKeyCommands;
use crate::context::create_service;
use crate::output::{OutputFormat, print_json};

/// Run an `api-key` subcommand
pub async fn run(
    command: &ApiKeyCommands,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        ApiKeyCommands::Set(args) => {
            let service = create_service(&args.store)?;
            service.set_api_key(&args.user_id, &args.key).await?;
            match format {
                OutputFormat::Human => println!("API key saved."),
                OutputFormat::Json => print_json(&json!({ "userId": args.user_id, "saved": true }))?,
            }
        }
        ApiKeyCommands::Get(args) => {
            let service = create_service(&args.store)?;
            let key = service.get_api_key(&args.user_id).await?;
            match format {
                OutputFormat::Human => match key {
                    Some(key) => println!("{key}"),
                    None => println!("No API key set."),
                },
                OutputFormat::Json => print_json(&json!({ "userId": args.user_id, "apiKey": key }))?,
            }
        }
        ApiKeyCommands::Clear(args) => {
            let service = create_service(&args.store)?;
            service.clear_api_key(&args.user_id).await?;
            match format {
                OutputFormat::Human => println!("API key cleared."),
                OutputFormat::Json => print_json(&json!({ "userId": args.user_id, "cleared": true }))?,
            }
        }
        ApiKeyCommands::Check(args) => {
            let service = create_service(&args.store)?;
            let usable = service.has_usable_api_key(&args.user_id).await?;
            match format {
                OutputFormat::Human if usable => println!("API key looks usable."),
                OutputFormat::Human => println!("No usable API key."),
                OutputFormat::Json => print_json(&json!({ "userId": args.user_id, "usable": usable }))?,
            }
        }
    }
    Ok(())
}
