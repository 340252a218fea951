//! Cryptographic operations using age encryption.
//!
//! Encrypts opaque byte payloads to an ASCII-armored format so ciphertext
//! can be embedded in line-oriented text files without corruption.

use std::io::{Read, Write};

use age::armor::{ArmoredReader, ArmoredWriter, Format};
use age::x25519;

use crate::error::{Error, Result};

/// Encrypt a payload for a recipient and return armored ciphertext.
///
/// Handles zero-length and arbitrary binary payloads. The output is
/// line-wrapped printable ASCII.
///
/// # Errors
///
/// Returns `Error::EncryptionFailed` if encryption fails at any stage.
pub fn encrypt(plaintext: &[u8], recipient: &x25519::Recipient) -> Result<Vec<u8>> {
    let encryptor =
        age::Encryptor::with_recipients(std::iter::once(recipient as &dyn age::Recipient))
            .map_err(|e| Error::EncryptionFailed(format!("{}", e)))?;

    let mut ciphertext = Vec::new();
    let mut writer = encryptor
        .wrap_output(ArmoredWriter::wrap_output(
            &mut ciphertext,
            Format::AsciiArmor,
        )?)
        .map_err(|e| Error::EncryptionFailed(format!("{}", e)))?;

    writer.write_all(plaintext)?;
    let armored = writer
        .finish()
        .map_err(|e| Error::EncryptionFailed(format!("{}", e)))?;
    armored
        .finish()
        .map_err(|e| Error::EncryptionFailed(format!("{}", e)))?;

    Ok(ciphertext)
}

/// Decrypt armored ciphertext using a private identity.
///
/// # Errors
///
/// Returns `Error::InvalidCiphertext` if the input is not valid armored age
/// data, or `Error::DecryptionFailed` if it was not encrypted for this
/// identity. No partial plaintext is ever returned.
pub fn decrypt(armored: &[u8], identity: &x25519::Identity) -> Result<Vec<u8>> {
    let reader = ArmoredReader::new(armored);
    let decryptor =
        age::Decryptor::new(reader).map_err(|e| Error::InvalidCiphertext(format!("{}", e)))?;

    let mut plaintext = Vec::new();
    let mut reader = decryptor
        .decrypt(std::iter::once(identity as &dyn age::Identity))
        .map_err(|e| Error::DecryptionFailed(format!("{}", e)))?;

    reader.read_to_end(&mut plaintext)?;

    Ok(plaintext)
}
