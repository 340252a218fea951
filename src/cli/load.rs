//! Load command - print export statements for eval.
//!
//! ```text
//! eval "$(cubby load)"             # load development (default)
//! eval "$(cubby load production)"  # load production
//! ```

use std::path::Path;

use crate::core::constants;
use crate::core::keyfile::KeyPair;
use crate::core::secrets::{self, SecretsFile};
use crate::error::{Error, Result};

/// Print `export KEY='value'` lines for the named environment.
pub fn execute(environment: &str) -> Result<()> {
    let keypair = KeyPair::load(Path::new(constants::KEY_FILE))?;
    let file = SecretsFile::load(Path::new(constants::SECRETS_FILE))?;

    let env = file.get_environment(environment)?;
    let decrypted = secrets::decrypt_environment(env, keypair.identity()).map_err(|e| {
        Error::Environment {
            name: environment.to_string(),
            source: Box::new(e),
        }
    })?;

    for (key, value) in &decrypted {
        println!("export {}='{}'", key, shell_escape(value));
    }
    Ok(())
}

/// Escape a value for single-quoted POSIX shell: `'` becomes `'"'"'`.
fn shell_escape(value: &str) -> String {
    value.replace('\'', r#"'"'"'"#)
}
