//! Analyze command - cross-environment consistency report.

use std::path::Path;

use crate::cli::output;
use crate::core::analyze::analyze;
use crate::core::constants;
use crate::core::keyfile::KeyPair;
use crate::core::secrets::SecretsFile;
use crate::error::Result;

/// Decrypt every environment and report missing, equal, and unique keys.
pub fn execute(json: bool) -> Result<()> {
    let keypair = KeyPair::load(Path::new(constants::KEY_FILE))?;
    let file = SecretsFile::load(Path::new(constants::SECRETS_FILE))?;

    let decrypted = file.decrypt_all(keypair.identity())?;

    let Some(report) = analyze(&decrypted) else {
        output::dimmed("need at least 2 environments to analyze");
        return Ok(());
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if report.is_empty() {
        output::dimmed("no findings");
    } else {
        print!("{}", report);
    }
    Ok(())
}
