//! Show command - print the secrets file with every value decrypted.

use std::path::Path;

use crate::core::constants;
use crate::core::keyfile::KeyPair;
use crate::core::secrets::SecretsFile;
use crate::error::Result;

/// Print the whole file decrypted, in canonical order.
pub fn execute() -> Result<()> {
    let keypair = KeyPair::load(Path::new(constants::KEY_FILE))?;
    let file = SecretsFile::load(Path::new(constants::SECRETS_FILE))?;

    let decrypted = SecretsFile {
        environments: file.decrypt_all(keypair.identity())?,
    };

    print!("{}", decrypted.render()?);
    Ok(())
}
