//! CLI argument definitions for the notesync binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use notesync::constants::DEFAULT_REMOTE_URL;

use crate::output::OutputFormat;

/// User directory and document sync over a JSON bin service
#[derive(Parser, Debug)]
#[command(name = "notesync")]
#[command(about = "notesync: accounts and notes synced through a JSON bin, cached locally")]
#[command(version)]
pub struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "human")]
    pub format: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an account and its empty document
    Register(RegisterArgs),
    /// Check credentials and print a session token
    Login(LoginArgs),
    /// Show the claims of a session token
    Whoami(WhoamiArgs),
    /// Print a user's document
    Read(ReadArgs),
    /// Save a user's document from a JSON file or stdin
    Write(WriteArgs),
    /// Manage the external-service API key of an account
    #[command(subcommand)]
    ApiKey(ApiKeyCommands),
    /// Request a password reset for an email
    ResetPassword(ResetPasswordArgs),
    /// List registered accounts
    Users(StoreArgs),
    /// Drop the locally cached directory and documents
    ClearCache(StoreArgs),
    /// Run an emulated JSON bin server
    Serve(ServeArgs),
    /// Check health of a running bin server
    Health(HealthArgs),
}

/// Where the mappings live: the remote bin service and the local cache file.
#[derive(clap::Args, Debug)]
pub struct StoreArgs {
    /// Base URL of the JSON bin service
    #[arg(long, default_value = DEFAULT_REMOTE_URL, env = "NOTESYNC_REMOTE_URL")]
    pub remote_url: String,

    /// Static access key sent as X-Master-Key
    #[arg(long, env = "NOTESYNC_MASTER_KEY", hide_env_values = true)]
    pub master_key: Option<String>,

    /// Token sent as a bearer credential instead of the master key
    #[arg(long, env = "NOTESYNC_BEARER_TOKEN", hide_env_values = true, conflicts_with = "master_key")]
    pub bearer_token: Option<String>,

    /// Bin holding the account directory
    #[arg(long, env = "NOTESYNC_DIRECTORY_BIN")]
    pub directory_bin: Option<String>,

    /// Bin holding the user documents
    #[arg(long, env = "NOTESYNC_DOCUMENTS_BIN")]
    pub documents_bin: Option<String>,

    /// Never contact the remote; read and write the cache only
    #[arg(long)]
    pub offline: bool,

    /// Path of the local cache file
    #[arg(long, default_value = "notesync-cache.json", env = "NOTESYNC_CACHE")]
    pub cache: PathBuf,

    /// Timeout for each remote call, in seconds
    #[arg(long, default_value_t = 10, env = "NOTESYNC_TIMEOUT")]
    pub timeout: u64,

    /// Attempts per remote call before falling back to the cache
    #[arg(long, default_value_t = 1, env = "NOTESYNC_RETRIES")]
    pub retries: u32,
}

#[derive(clap::Args, Debug)]
pub struct RegisterArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Display name
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "NOTESYNC_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(clap::Args, Debug)]
pub struct LoginArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "NOTESYNC_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(clap::Args, Debug)]
pub struct WhoamiArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Session token printed by register or login
    #[arg(long, env = "NOTESYNC_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(clap::Args, Debug)]
pub struct ReadArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Account id
    pub user_id: String,
}

#[derive(clap::Args, Debug)]
pub struct WriteArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Account id
    pub user_id: String,

    /// JSON file with `projects` and optionally `flashcards`; stdin when omitted
    #[arg(long, short)]
    pub file: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum ApiKeyCommands {
    /// Store a key on the account
    Set(ApiKeySetArgs),
    /// Print the stored key
    Get(ApiKeyArgs),
    /// Remove the stored key
    Clear(ApiKeyArgs),
    /// Report whether the stored key looks usable
    Check(ApiKeyArgs),
}

#[derive(clap::Args, Debug)]
pub struct ApiKeyArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Account id
    pub user_id: String,
}

#[derive(clap::Args, Debug)]
pub struct ApiKeySetArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    /// Account id
    pub user_id: String,

    /// The key to store
    #[arg(long, env = "NOTESYNC_API_KEY", hide_env_values = true)]
    pub key: String,
}

#[derive(clap::Args, Debug)]
pub struct ResetPasswordArgs {
    #[command(flatten)]
    pub store: StoreArgs,

    #[arg(long)]
    pub email: String,
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "NOTESYNC_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "NOTESYNC_HOST")]
    pub host: String,

    /// Require this key on every bin request
    #[arg(long, env = "NOTESYNC_MASTER_KEY", hide_env_values = true)]
    pub access_key: Option<String>,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "NOTESYNC_REMOTE_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}
