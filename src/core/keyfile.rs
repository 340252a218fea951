//! Key file generation, parsing, and resolution.
//!
//! The key file holds a single age x25519 identity plus informational
//! comments. The public key comment is only a cache: a file containing
//! nothing but the identity line still yields a full keypair.

use std::fs;
use std::path::Path;

use age::secrecy::ExposeSecret;
use age::x25519;
use chrono::Utc;
use tracing::debug;

use crate::core::constants;
use crate::error::{Error, Result};

/// An age keypair: the identity decrypts what the recipient encrypts.
///
/// The recipient is always derivable from the identity, so parsing never
/// leaves it unset.
pub struct KeyPair {
    identity: x25519::Identity,
    recipient: x25519::Recipient,
}

impl KeyPair {
    /// Generate a fresh keypair.
    pub fn generate() -> Self {
        let identity = x25519::Identity::generate();
        let recipient = identity.to_public();
        Self {
            identity,
            recipient,
        }
    }

    /// Generate a keypair and write it to `path`.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyFileExists` if `path` exists and `force` is false.
    pub fn generate_into(path: &Path, force: bool) -> Result<Self> {
        let keypair = Self::generate();
        keypair.write(path, force)?;
        Ok(keypair)
    }

    /// Parse a keypair from key-file text.
    ///
    /// Scans line by line: blank lines are skipped, a `# public key:`
    /// comment is used opportunistically to recover the recipient, other
    /// comments and unrecognized lines are ignored. The first line starting
    /// with `AGE-SECRET-KEY-` is the identity; scanning stops there (only
    /// one identity per file). When no usable comment was seen, the
    /// recipient is derived from the identity.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidKey` if an identity line fails to parse, or
    /// `Error::NoSecretKey` if no identity line is present.
    pub fn parse(text: &str) -> Result<Self> {
        let mut recipient: Option<x25519::Recipient> = None;

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(cached) = line.strip_prefix(constants::PUBLIC_KEY_COMMENT) {
                // An unparseable cached key is ignored; derivation covers it
                if let Ok(r) = cached.trim().parse::<x25519::Recipient>() {
                    recipient = Some(r);
                }
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            if line.starts_with(constants::SECRET_KEY_PREFIX) {
                let identity: x25519::Identity = line
                    .parse()
                    .map_err(|e: &str| Error::InvalidKey(e.to_string()))?;
                let recipient = recipient.unwrap_or_else(|| identity.to_public());
                return Ok(Self {
                    identity,
                    recipient,
                });
            }
        }

        Err(Error::NoSecretKey)
    }

    /// Read and parse the key file at `path`.
    pub fn read(path: &Path) -> Result<Self> {
        debug!("reading key file {}", path.display());
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::KeyFileNotFound(path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        Self::parse(&text)
    }

    /// Resolve the active keypair.
    ///
    /// If `CUBBY_MASTER_KEY` holds a non-empty value it is parsed directly
    /// (either a bare secret-key line or full key-file text); otherwise the
    /// key file at `path` is read.
    pub fn load(path: &Path) -> Result<Self> {
        if let Ok(value) = std::env::var(constants::MASTER_KEY_ENV) {
            if !value.trim().is_empty() {
                debug!("using key material from {}", constants::MASTER_KEY_ENV);
                return Self::parse(&value);
            }
        }
        Self::read(path)
    }

    /// Write the keypair to `path` with owner-only permissions.
    ///
    /// The file carries a creation timestamp and the public key as
    /// comments, then the identity line.
    ///
    /// # Errors
    ///
    /// Returns `Error::KeyFileExists` if `path` exists and `force` is false.
    pub fn write(&self, path: &Path, force: bool) -> Result<()> {
        if !force && path.exists() {
            return Err(Error::KeyFileExists(path.display().to_string()));
        }

        let mut contents = String::new();
        contents.push_str(&format!("# created: {}\n", Utc::now().to_rfc3339()));
        contents.push_str(&format!(
            "{} {}\n",
            constants::PUBLIC_KEY_COMMENT,
            self.recipient
        ));
        contents.push_str(&format!(
            "{}\n",
            self.identity.to_string().expose_secret()
        ));

        fs::write(path, contents)?;

        // Restrict permissions on key file (Unix only)
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        debug!("wrote key file {}", path.display());
        Ok(())
    }

    /// The private half, used for decryption.
    pub fn identity(&self) -> &x25519::Identity {
        &self.identity
    }

    /// The public half, used for encryption.
    pub fn recipient(&self) -> &x25519::Recipient {
        &self.recipient
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("recipient", &self.recipient.to_string())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_write_and_read_roundtrip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("master.key");

        let keypair = KeyPair::generate();
        keypair.write(&path, false).unwrap();

        let loaded = KeyPair::read(&path).unwrap();
        assert_eq!(
            loaded.recipient().to_string(),
            keypair.recipient().to_string()
        );
    }

    #[test]
    fn test_write_refuses_overwrite() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("master.key");

        KeyPair::generate().write(&path, false).unwrap();
        let err = KeyPair::generate().write(&path, false).unwrap_err();
        assert!(matches!(err, Error::KeyFileExists(_)));

        // force replaces the file
        KeyPair::generate().write(&path, true).unwrap();
    }

    #[test]
    fn test_key_file_format() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("master.key");

        KeyPair::generate().write(&path, false).unwrap();
        let contents = std::fs::read_to_string(&path).unwrap();

        assert!(contents.starts_with("# created: "));
        assert!(contents.contains("# public key: age1"));
        assert!(contents.contains("AGE-SECRET-KEY-"));
    }

    #[cfg(unix)]
    #[test]
    fn test_key_file_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("master.key");

        KeyPair::generate().write(&path, false).unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o600);
    }

    #[test]
    fn test_parse_bare_secret_key_line() {
        let keypair = KeyPair::generate();
        let line = keypair.identity().to_string().expose_secret().to_string();

        let parsed = KeyPair::parse(&line).unwrap();
        assert_eq!(
            parsed.recipient().to_string(),
            keypair.recipient().to_string()
        );
    }

    #[test]
    fn test_parse_recovers_recipient_from_comment() {
        let keypair = KeyPair::generate();
        let text = format!(
            "# created: 2026-01-01T00:00:00Z\n# public key: {}\n{}\n",
            keypair.recipient(),
            keypair.identity().to_string().expose_secret()
        );

        let parsed = KeyPair::parse(&text).unwrap();
        assert_eq!(
            parsed.recipient().to_string(),
            keypair.recipient().to_string()
        );
    }

    #[test]
    fn test_parse_ignores_garbage_recipient_comment() {
        let keypair = KeyPair::generate();
        let text = format!(
            "# public key: not-a-key\n{}\n",
            keypair.identity().to_string().expose_secret()
        );

        // Falls back to deriving the recipient from the identity
        let parsed = KeyPair::parse(&text).unwrap();
        assert_eq!(
            parsed.recipient().to_string(),
            keypair.recipient().to_string()
        );
    }

    #[test]
    fn test_parse_skips_blank_lines_and_comments() {
        let keypair = KeyPair::generate();
        let text = format!(
            "\n# some unrelated comment\n\nunrecognized line\n{}\n",
            keypair.identity().to_string().expose_secret()
        );

        assert!(KeyPair::parse(&text).is_ok());
    }

    #[test]
    fn test_parse_without_identity_fails() {
        let err = KeyPair::parse("# just a comment\n\n").unwrap_err();
        assert!(matches!(err, Error::NoSecretKey));
    }

    #[test]
    fn test_parse_invalid_identity_fails() {
        let err = KeyPair::parse("AGE-SECRET-KEY-NOTAREALKEY\n").unwrap_err();
        assert!(matches!(err, Error::InvalidKey(_)));
    }

    #[test]
    fn test_read_missing_file_fails() {
        let tmp = TempDir::new().unwrap();
        let err = KeyPair::read(&tmp.path().join("missing.key")).unwrap_err();
        assert!(matches!(err, Error::KeyFileNotFound(_)));
    }
}
