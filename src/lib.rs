//! Cubby - encrypted per-environment configuration for small projects.
//!
//! # Architecture
//!
//! ```text
//! src/
//! ├── cli/              # Command-line interface
//! │   ├── init          # Create master.key and env.toml
//! │   ├── edit          # Decrypt, edit in $EDITOR, re-encrypt
//! │   ├── show          # Print the file with values decrypted
//! │   ├── load          # Shell export statements for eval
//! │   ├── run           # Run a command with secrets injected
//! │   ├── analyze       # Cross-environment consistency report
//! │   ├── key           # Print the public/private key
//! │   └── completions   # Shell completions
//! └── core/             # Core library components
//!     ├── crypto        # age encryption of opaque byte payloads
//!     ├── keyfile       # master.key generation, parsing, resolution
//!     ├── secrets       # env.toml model and the ENC[...] value envelope
//!     └── analyze       # missing/equal/unique key analysis
//! ```
//!
//! Keys in `env.toml` stay human-readable; only values are encrypted, so the
//! file diffs cleanly and is safe to commit. A single age keypair in
//! `master.key` (or injected via `CUBBY_MASTER_KEY`) decrypts everything.
//!
//! No file locking is provided: if two processes save the secrets file
//! concurrently, the last writer wins.

pub mod cli;
pub mod core;
pub mod error;
