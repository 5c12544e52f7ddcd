//! Service construction from command-line settings.

use std::sync::Arc;
use std::time::Duration;

use notesync::{
    SyncService,
    cache::{FileCache, LocalCache},
    mirror::{MirrorOptions, RetryPolicy},
    remote::{HttpRemoteStore, OfflineRemote, RemoteAuth, RemoteStore},
    token::SignedTokenCodec,
};
use zeroize::Zeroizing;

use crate::cli::StoreArgs;

/// Redact credentials and query strings from a URL for safe logging
pub fn redact_url(url: &str) -> String {
    match url::Url::parse(url) {
        Ok(parsed) => {
            let mut redacted = parsed.clone();
            if !parsed.username().is_empty() {
                let _ = redacted.set_username("***");
            }
            if parsed.password().is_some() {
                let _ = redacted.set_password(Some("***"));
            }
            redacted.set_query(None);
            redacted.to_string()
        }
        Err(_) => "<unparsable-url>".to_string(),
    }
}

fn create_remote(args: &StoreArgs) -> Result<Arc<dyn RemoteStore>, Box<dyn std::error::Error>> {
    if args.offline {
        tracing::info!("Offline mode, using the local cache only");
        return Ok(Arc::new(OfflineRemote));
    }

    let (Some(directory_bin), Some(documents_bin)) = (&args.directory_bin, &args.documents_bin)
    else {
        tracing::warn!(
            "No bins configured (NOTESYNC_DIRECTORY_BIN / NOTESYNC_DOCUMENTS_BIN), using the local cache only"
        );
        return Ok(Arc::new(OfflineRemote));
    };

    let auth = match (&args.master_key, &args.bearer_token) {
        (Some(key), _) => RemoteAuth::MasterKey(Zeroizing::new(key.clone())),
        (None, Some(token)) => RemoteAuth::Bearer(Zeroizing::new(token.clone())),
        (None, None) => RemoteAuth::None,
    };

    let store = HttpRemoteStore::builder()
        .base_url(&args.remote_url)
        .directory_bin(directory_bin)
        .documents_bin(documents_bin)
        .auth(auth)
        .build()?;
    tracing::info!("Using JSON bin service at {}", redact_url(store.base_url()));
    Ok(Arc::new(store))
}

/// Build the service described by `args`.
///
/// The session signing key is kept in the cache file so tokens printed by one
/// invocation verify in the next.
pub fn create_service(args: &StoreArgs) -> Result<SyncService, Box<dyn std::error::Error>> {
    let remote = create_remote(args)?;
    let cache: Arc<dyn LocalCache> = Arc::new(FileCache::open(&args.cache)?);
    tracing::debug!("Using cache file {}", args.cache.display());

    let tokens = SignedTokenCodec::load_or_generate(cache.as_ref())?;
    let options = MirrorOptions::default()
        .with_remote_timeout(Duration::from_secs(args.timeout))
        .with_retry(RetryPolicy {
            attempts: args.retries,
            ..RetryPolicy::recommended()
        });

    Ok(SyncService::builder(remote, cache)
        .tokens(Arc::new(tokens))
        .options(options)
        .build()?)
}
