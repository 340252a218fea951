//! Run command.
//!
//! Executes a command with decrypted secrets injected as environment
//! variables. Decrypted values are never written to disk; the parent waits
//! for the child and forwards its exit code.

use std::path::Path;

use zeroize::Zeroizing;

use crate::core::constants;
use crate::core::keyfile::KeyPair;
use crate::core::secrets::{self, SecretsFile};
use crate::error::{Error, Result};

/// Run a command with secrets injected as environment variables.
pub fn execute(environment: &str, command: &[String]) -> Result<()> {
    let exit_code = run_with_secrets(environment, command)?;
    std::process::exit(exit_code);
}

fn run_with_secrets(environment: &str, command: &[String]) -> Result<i32> {
    if command.is_empty() {
        return Err(Error::Other("no command specified".to_string()));
    }

    let keypair = KeyPair::load(Path::new(constants::KEY_FILE))?;
    let file = SecretsFile::load(Path::new(constants::SECRETS_FILE))?;

    let env = file.get_environment(environment)?;
    let decrypted = secrets::decrypt_environment(env, keypair.identity()).map_err(|e| {
        Error::Environment {
            name: environment.to_string(),
            source: Box::new(e),
        }
    })?;

    let mut cmd = std::process::Command::new(&command[0]);
    cmd.args(&command[1..]);

    // Wipe each decrypted value once it has been copied into the child env
    for (key, value) in decrypted {
        let value = Zeroizing::new(value);
        cmd.env(key, value.as_str());
    }

    let status = cmd.status().map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::CommandNotFound(command[0].clone())
        } else {
            Error::Io(e)
        }
    })?;

    // If the child was killed by a signal there is no code; report failure
    Ok(status.code().unwrap_or(1))
}
