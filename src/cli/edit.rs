//! Edit command - decrypt to a temp file, edit, re-encrypt.
//!
//! The decrypted form only ever exists in a 0600 temp file that is removed
//! when the command finishes. Values still carrying the `ENC[...]` envelope
//! after the edit are kept as-is, so untouched secrets don't churn.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::process::Command;

use tracing::debug;

use crate::cli::output;
use crate::core::constants;
use crate::core::keyfile::KeyPair;
use crate::core::secrets::{self, Environment, SecretsFile};
use crate::error::{Error, Result};

/// Decrypt env.toml, run the editor, re-encrypt the result.
pub fn execute() -> Result<()> {
    let keypair = KeyPair::load(Path::new(constants::KEY_FILE))?;
    let file = SecretsFile::load(Path::new(constants::SECRETS_FILE))?;

    let decrypted = SecretsFile {
        environments: file.decrypt_all(keypair.identity())?,
    };

    // NamedTempFile is created 0600 and removed on drop
    let mut tmp = tempfile::Builder::new()
        .prefix("cubby-edit-")
        .suffix(".toml")
        .tempfile()?;
    tmp.write_all(decrypted.render()?.as_bytes())?;
    tmp.flush()?;

    run_editor(tmp.path())?;

    let edited = std::fs::read_to_string(tmp.path())?;
    let environments: BTreeMap<String, Environment> =
        toml::from_str(&edited).map_err(|e| Error::SecretsParse {
            path: tmp.path().display().to_string(),
            source: e,
        })?;

    let mut encrypted = SecretsFile::default();
    for (name, env) in &environments {
        let sealed =
            secrets::encrypt_environment(env, keypair.recipient()).map_err(|e| {
                Error::Environment {
                    name: name.clone(),
                    source: Box::new(e),
                }
            })?;
        encrypted.environments.insert(name.clone(), sealed);
    }

    encrypted.save(Path::new(constants::SECRETS_FILE))?;
    output::success(&format!("saved {}", constants::SECRETS_FILE));
    Ok(())
}

/// Pick an editor: $EDITOR, $VISUAL, VS Code if on PATH, then vim.
fn editor_command(path: &Path) -> Command {
    for var in ["EDITOR", "VISUAL"] {
        if let Some(editor) = std::env::var(var).ok().filter(|e| !e.is_empty()) {
            let mut cmd = Command::new(editor);
            cmd.arg(path);
            return cmd;
        }
    }

    if which::which("code").is_ok() {
        let mut cmd = Command::new("code");
        cmd.arg("--wait").arg(path);
        return cmd;
    }

    let mut cmd = Command::new("vim");
    cmd.arg(path);
    cmd
}

fn run_editor(path: &Path) -> Result<()> {
    debug!("opening editor for {}", path.display());
    let status = editor_command(path).status()?;
    if !status.success() {
        return Err(Error::Other(format!("editor exited with {}", status)));
    }
    Ok(())
}
