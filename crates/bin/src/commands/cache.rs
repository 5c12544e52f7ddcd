//! The `clear-cache` command.

use serde_json::json;

use crate::cli::StoreArgs;
use crate::context::create_service;
use crate::output::{OutputFormat, print_json};

/// Drop the cached directory and documents. The remote store is not touched.
pub async fn clear(args: &StoreArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let service = create_service(args)?;
    service.clear_local_cache()?;

    match format {
        OutputFormat::Human => {
            println!("Cleared cached data in {}", args.cache.display());
            Ok(())
        }
        OutputFormat::Json => print_json(&json!({ "cache": args.cache, "cleared": true })),
    }
}
