//! Constants used throughout cubby.
//!
//! Centralizes magic strings and configuration values.

/// Key file name (contains the age identity; never commit this).
pub const KEY_FILE: &str = "master.key";

/// Secrets file name (encrypted values only; safe to commit).
pub const SECRETS_FILE: &str = "env.toml";

/// Environment variable that overrides the key file.
///
/// Accepts either a bare `AGE-SECRET-KEY-...` line or the full text of a
/// key file, so deployments can inject the key without a file on disk.
pub const MASTER_KEY_ENV: &str = "CUBBY_MASTER_KEY";

/// Environment used when none is named on the command line.
pub const DEFAULT_ENVIRONMENT: &str = "development";

/// Marker that opens an encrypted value.
pub const ENCRYPTED_PREFIX: &str = "ENC[";

/// Marker that closes an encrypted value.
pub const ENCRYPTED_SUFFIX: &str = "]";

/// Textual prefix of an age secret key line.
pub const SECRET_KEY_PREFIX: &str = "AGE-SECRET-KEY-";

/// Key-file comment that caches the public key.
pub const PUBLIC_KEY_COMMENT: &str = "# public key:";

/// Gitignore entry to keep the key file out of version control.
pub const GITIGNORE_ENTRY: &str = "/master.key";
