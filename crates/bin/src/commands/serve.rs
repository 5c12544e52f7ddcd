//! Serve command - runs an emulated JSON bin server.
//!
//! Bins live in memory only; the server is meant for local development and
//! for teams that want a private store for a few clients.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use notesync::remote::BinServer;
use signal_hook::flag as signal_flag;

use crate::cli::ServeArgs;

/// Run the bin server until SIGTERM or SIGINT
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut server = BinServer::new();
    if let Some(key) = &args.access_key {
        server = server.with_access_key(key.clone());
    } else {
        tracing::warn!("No access key configured, bins are readable and writable by anyone");
    }

    // Set up graceful shutdown signal handling
    let term_signal = Arc::new(AtomicBool::new(false));
    for signal in signal_hook::consts::TERM_SIGNALS {
        signal_flag::register(*signal, Arc::clone(&term_signal))?;
    }

    let addr = format!("{}:{}", args.host, args.port);
    let running = server.start(&addr).await?;

    println!(
        "notesync bin server listening on http://localhost:{}",
        running.address().port()
    );
    println!();
    println!("Available endpoints:");
    println!("  GET  /health          - Health check");
    println!("  GET  /b/{{bin}}/latest  - Read a bin");
    println!("  PUT  /b/{{bin}}         - Replace a bin");
    println!();
    println!("Press Ctrl+C to shutdown");

    while !term_signal.load(Ordering::Relaxed) {
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    tracing::info!("Shutdown signal received, stopping server...");
    running.shutdown().await?;
    println!("Server shut down");
    Ok(())
}
