use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod context;
mod output;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Logs go to stderr so `--format json` output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("notesync=info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let format = cli.format;
    let result = match &cli.command {
        Commands::Register(args) => commands::account::register(args, format).await,
        Commands::Login(args) => commands::account::login(args, format).await,
        Commands::Whoami(args) => commands::account::whoami(args, format).await,
        Commands::Read(args) => commands::document::read(args, format).await,
        Commands::Write(args) => commands::document::write(args, format).await,
        Commands::ApiKey(command) => commands::api_key::run(command, format).await,
        Commands::ResetPassword(args) => commands::account::reset_password(args, format).await,
        Commands::Users(args) => commands::account::users(args, format).await,
        Commands::ClearCache(args) => commands::cache::clear(args, format).await,
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Health(args) => commands::health::run(args, format).await,
    };

    // Display only, never Debug: a rejected login must not reveal its cause
    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
    Ok(())
}
