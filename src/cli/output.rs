//! Shared CLI output helpers for consistent terminal output.
//!
//! Color scheme:
//! - Green: success
//! - Red: errors
//! - Yellow: warnings
//! - Cyan: hints
//! - Dimmed: secondary info

use console::style;

/// Print a success message with checkmark (green).
///
/// Example: `✓ created master.key`
pub fn success(msg: &str) {
    println!("{} {}", style("✓").green(), msg);
}

/// Print an error message to stderr (red).
///
/// Example: `✗ secrets file env.toml not found`
pub fn error(msg: &str) {
    eprintln!("{} {}", style("✗").red(), msg);
}

/// Print a warning message (yellow).
pub fn warn(msg: &str) {
    println!("{} {}", style("⚠").yellow(), msg);
}

/// Print a hint message (cyan).
///
/// Example: `→ run: cubby init`
pub fn hint(msg: &str) {
    println!("{} {}", style("→").cyan(), style(msg).cyan());
}

/// Print a dimmed/secondary message.
pub fn dimmed(msg: &str) {
    println!("{}", style(msg).dim());
}
