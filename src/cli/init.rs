//! Init command - create the master key and a starter secrets file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::cli::output;
use crate::core::constants;
use crate::core::keyfile::KeyPair;
use crate::core::secrets::SecretsFile;
use crate::error::Result;

/// Initialize the current directory.
pub fn execute(force: bool) -> Result<()> {
    let keypair = KeyPair::generate_into(Path::new(constants::KEY_FILE), force)?;
    output::success(&format!("created {}", constants::KEY_FILE));
    info!("generated keypair, public key {}", keypair.recipient());

    let secrets_path = Path::new(constants::SECRETS_FILE);
    if force || !secrets_path.exists() {
        SecretsFile::create_default(secrets_path)?;
        output::success(&format!("created {}", constants::SECRETS_FILE));
    } else {
        output::dimmed(&format!(
            "skipped {} (already exists)",
            constants::SECRETS_FILE
        ));
    }

    // The key file must never be committed; env.toml is safe.
    if let Err(e) = ensure_gitignore(constants::GITIGNORE_ENTRY) {
        output::warn(&format!("could not update .gitignore: {}", e));
    }

    Ok(())
}

/// Append `entry` to .gitignore when the file exists and doesn't list it yet.
fn ensure_gitignore(entry: &str) -> Result<()> {
    let path = Path::new(".gitignore");
    if !path.exists() {
        return Ok(());
    }

    let contents = std::fs::read_to_string(path)?;
    if contents.lines().any(|line| line.trim() == entry) {
        return Ok(());
    }

    let mut file = OpenOptions::new().append(true).open(path)?;
    if !contents.is_empty() && !contents.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{}", entry)?;

    output::success(&format!("added {} to .gitignore", entry));
    Ok(())
}
