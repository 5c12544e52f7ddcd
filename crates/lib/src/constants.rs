//! Constants used throughout the notesync library.
//!
//! Cache keys are shared with the browser client, which stores the same blobs
//! under the same names in local storage.

use std::time::Duration;

/// Cache key holding the account directory.
pub const DIRECTORY_CACHE_KEY: &str = "mock_users";

/// Cache key holding the per-user document mapping.
pub const DOCUMENTS_CACHE_KEY: &str = "mock_user_data";

/// Cache key holding the hex-encoded session signing key.
pub const SESSION_KEY_CACHE_KEY: &str = "session_signing_key";

/// Default base URL of the JSON bin service.
pub const DEFAULT_REMOTE_URL: &str = "https://api.jsonbin.io/v3";

/// Header carrying the static access key of the JSON bin service.
pub const MASTER_KEY_HEADER: &str = "X-Master-Key";

/// Upper bound on a single remote round trip.
pub const DEFAULT_REMOTE_TIMEOUT: Duration = Duration::from_secs(10);

/// Attempts used when retries are enabled without an explicit count.
pub const RECOMMENDED_RETRY_ATTEMPTS: u32 = 3;

/// Delay between retries when enabled without an explicit delay.
pub const RECOMMENDED_RETRY_DELAY: Duration = Duration::from_secs(1);

/// External-service API keys at or below this length are treated as unusable.
pub const MIN_API_KEY_LENGTH: usize = 20;

/// Prefix of generated account identifiers.
pub const ACCOUNT_ID_PREFIX: &str = "user_";
