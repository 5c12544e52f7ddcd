//! Document commands: read and write.

use std::io::Read;

use notesync::documents::IncomingDocument;

use crate::cli::{ReadArgs, WriteArgs};
use crate::context::create_service;
use crate::output::{OutputFormat, print_json};

/// Run the `read` command
pub async fn read(args: &ReadArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let service = create_service(&args.store)?;
    let fetched = service.fetch_document(&args.user_id).await?;
    let document = &fetched.value;

    match format {
        OutputFormat::Human => {
            println!("Owner:       {}", document.owner);
            println!("Projects:    {}", document.projects.len());
            println!("Flashcards:  {}", document.flashcards.len());
            println!("Last sync:   {}", document.last_synced_at.to_rfc3339());
            println!("Served from: {:?}", fetched.origin);
            Ok(())
        }
        OutputFormat::Json => print_json(document),
    }
}

/// Run the `write` command
pub async fn write(args: &WriteArgs, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let raw = match &args.file {
        Some(path) => std::fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let incoming: IncomingDocument = serde_json::from_str(&raw)?;

    let service = create_service(&args.store)?;
    let ack = service.write_document(&args.user_id, incoming).await?;

    match format {
        OutputFormat::Human => {
            println!(
                "Saved {} projects and {} flashcards at {}",
                ack.projects,
                ack.flashcards,
                ack.synced_at.to_rfc3339()
            );
            if !ack.remote_persisted {
                println!("Remote store unavailable; saved to the local cache only.");
            }
            Ok(())
        }
        OutputFormat::Json => print_json(&ack),
    }
}
