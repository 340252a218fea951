//! The secrets file model and the `ENC[...]` value envelope.
//!
//! An `env.toml` file maps environment names to tables of `KEY = "value"`
//! pairs. Keys stay plaintext; values are either plaintext or an
//! `ENC[<base64 armored ciphertext>]` envelope. The tag is purely
//! syntactic, so a plaintext value must never be authored in that shape.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use age::x25519;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use tracing::debug;

use crate::core::constants;
use crate::core::crypto;
use crate::error::{Error, Result};

/// A single environment: variable name to value, lexicographically ordered.
pub type Environment = BTreeMap<String, String>;

/// An `env.toml` file with one section per environment.
///
/// `BTreeMap` keeps environments and keys sorted, which makes every
/// serialization deterministic and diffable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecretsFile {
    pub environments: BTreeMap<String, Environment>,
}

impl SecretsFile {
    /// Load and parse a secrets file.
    ///
    /// # Errors
    ///
    /// Returns `Error::SecretsFileNotFound` if `path` does not exist, or
    /// `Error::SecretsParse` if it is not a table of string tables.
    pub fn load(path: &Path) -> Result<Self> {
        let data = match std::fs::read_to_string(path) {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(Error::SecretsFileNotFound(path.display().to_string()))
            }
            Err(e) => return Err(e.into()),
        };

        let environments: BTreeMap<String, Environment> =
            toml::from_str(&data).map_err(|e| Error::SecretsParse {
                path: path.display().to_string(),
                source: e,
            })?;

        debug!(
            "loaded {} with {} environments",
            path.display(),
            environments.len()
        );
        Ok(Self { environments })
    }

    /// Render the file in its canonical form.
    pub fn render(&self) -> Result<String> {
        Ok(toml::to_string(&self.environments)?)
    }

    /// Serialize and write the file, replacing prior contents atomically.
    ///
    /// The rendered text goes to a temp file in the same directory which is
    /// then renamed over `path`, so a failed save never leaves a partially
    /// written file behind.
    pub fn save(&self, path: &Path) -> Result<()> {
        let rendered = self.render()?;

        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(rendered.as_bytes())?;
        tmp.flush()?;
        tmp.as_file().sync_all()?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;

        debug!("saved {}", path.display());
        Ok(())
    }

    /// Look up an environment by name.
    pub fn get_environment(&self, name: &str) -> Result<&Environment> {
        self.environments
            .get(name)
            .ok_or_else(|| Error::EnvironmentNotFound(name.to_string()))
    }

    /// Write a new file with empty `development` and `production` sections.
    pub fn create_default(path: &Path) -> Result<Self> {
        let mut environments = BTreeMap::new();
        environments.insert("development".to_string(), Environment::new());
        environments.insert("production".to_string(), Environment::new());

        let file = Self { environments };
        file.save(path)?;
        Ok(file)
    }

    /// Decrypt every environment, keyed by name.
    ///
    /// # Errors
    ///
    /// Fails as a whole on the first value that cannot be decrypted, naming
    /// the offending environment and key.
    pub fn decrypt_all(
        &self,
        identity: &x25519::Identity,
    ) -> Result<BTreeMap<String, Environment>> {
        let mut decrypted = BTreeMap::new();
        for (name, env) in &self.environments {
            let plain = decrypt_environment(env, identity).map_err(|e| Error::Environment {
                name: name.clone(),
                source: Box::new(e),
            })?;
            decrypted.insert(name.clone(), plain);
        }
        Ok(decrypted)
    }
}

/// Whether a value carries the encrypted envelope.
///
/// Purely syntactic: no decryption is attempted. A plaintext value that
/// happens to start with `ENC[` and end with `]` is indistinguishable from
/// ciphertext; such values must not be authored.
pub fn is_encrypted(value: &str) -> bool {
    value.starts_with(constants::ENCRYPTED_PREFIX) && value.ends_with(constants::ENCRYPTED_SUFFIX)
}

/// Encrypt a plaintext value into a fresh `ENC[...]` envelope.
///
/// Always encrypts, even if the input already looks like an envelope;
/// selective behavior lives in [`encrypt_environment`].
pub fn encrypt_value(plaintext: &str, recipient: &x25519::Recipient) -> Result<String> {
    let armored = crypto::encrypt(plaintext.as_bytes(), recipient)?;
    Ok(format!(
        "{}{}{}",
        constants::ENCRYPTED_PREFIX,
        STANDARD.encode(&armored),
        constants::ENCRYPTED_SUFFIX
    ))
}

/// Decrypt an `ENC[...]` value; plaintext values pass through unchanged.
///
/// # Errors
///
/// Returns `Error::InvalidCiphertext` if the envelope payload is not valid
/// base64, or the decryption errors from [`crypto::decrypt`].
pub fn decrypt_value(value: &str, identity: &x25519::Identity) -> Result<String> {
    let Some(encoded) = value
        .strip_prefix(constants::ENCRYPTED_PREFIX)
        .and_then(|v| v.strip_suffix(constants::ENCRYPTED_SUFFIX))
    else {
        return Ok(value.to_string());
    };

    let armored = STANDARD
        .decode(encoded)
        .map_err(|e| Error::InvalidCiphertext(format!("{}", e)))?;
    let plaintext = crypto::decrypt(&armored, identity)?;

    String::from_utf8(plaintext)
        .map_err(|e| Error::DecryptionFailed(format!("value is not valid UTF-8: {}", e)))
}

/// Encrypt every plaintext value in an environment.
///
/// Values already carrying the envelope are passed through byte-for-byte,
/// so repeated encryption never churns ciphertext. Re-encrypting an
/// existing value takes an explicit decrypt-edit-encrypt cycle.
pub fn encrypt_environment(env: &Environment, recipient: &x25519::Recipient) -> Result<Environment> {
    let mut result = Environment::new();
    for (key, value) in env {
        if is_encrypted(value) {
            result.insert(key.clone(), value.clone());
        } else {
            let encrypted = encrypt_value(value, recipient).map_err(|e| Error::Value {
                key: key.clone(),
                source: Box::new(e),
            })?;
            result.insert(key.clone(), encrypted);
        }
    }
    Ok(result)
}

/// Decrypt every value in an environment.
///
/// # Errors
///
/// Fails as a whole on the first value that cannot be decrypted, naming the
/// offending key; no partial result is returned.
pub fn decrypt_environment(env: &Environment, identity: &x25519::Identity) -> Result<Environment> {
    let mut result = Environment::new();
    for (key, value) in env {
        let plaintext = decrypt_value(value, identity).map_err(|e| Error::Value {
            key: key.clone(),
            source: Box::new(e),
        })?;
        result.insert(key.clone(), plaintext);
    }
    Ok(result)
}
