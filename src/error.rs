use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("key file {0} already exists (use --force to overwrite)")]
    KeyFileExists(String),

    #[error("key file {0} not found")]
    KeyFileNotFound(String),

    #[error("no secret key found")]
    NoSecretKey,

    #[error("invalid secret key: {0}")]
    InvalidKey(String),

    #[error("secrets file {0} not found")]
    SecretsFileNotFound(String),

    #[error("failed to parse {path}: {source}")]
    SecretsParse {
        path: String,
        source: toml::de::Error,
    },

    #[error("environment {0:?} not found")]
    EnvironmentNotFound(String),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("decryption failed: {0}")]
    DecryptionFailed(String),

    #[error("invalid encrypted value: {0}")]
    InvalidCiphertext(String),

    #[error("{key}: {source}")]
    Value { key: String, source: Box<Error> },

    #[error("environment {name:?}: {source}")]
    Environment { name: String, source: Box<Error> },

    #[error("command not found: {0}")]
    CommandNotFound(String),

    #[error("{0}")]
    Other(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("toml serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
