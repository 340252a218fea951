//! Key commands - print the public or private half of the keypair.

use std::path::Path;

use age::secrecy::ExposeSecret;

use crate::core::constants;
use crate::core::keyfile::KeyPair;
use crate::error::Result;

/// Print the public key (recipient).
pub fn public() -> Result<()> {
    let keypair = KeyPair::load(Path::new(constants::KEY_FILE))?;
    println!("{}", keypair.recipient());
    Ok(())
}

/// Print the private key (identity) line.
pub fn private() -> Result<()> {
    let keypair = KeyPair::load(Path::new(constants::KEY_FILE))?;
    println!("{}", keypair.identity().to_string().expose_secret());
    Ok(())
}
