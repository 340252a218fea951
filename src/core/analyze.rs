//! Cross-environment consistency analysis.
//!
//! A pure function over decrypted environments: it never sees ciphertext
//! or key material, which keeps it testable without cryptography.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::Serialize;

use crate::core::secrets::Environment;

/// A key that exists in some environments but not all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingKey {
    pub key: String,
    pub missing_from: Vec<String>,
}

/// A key whose decrypted value is identical across two or more
/// environments, a common sign of a copy-paste mistake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EqualValue {
    pub key: String,
    pub environments: Vec<String>,
}

/// Findings across all environments of a secrets file.
///
/// All keys and environment names are lexicographically sorted. Equal-value
/// groups for the same key are listed in order of the shared value so the
/// report is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    pub missing: Vec<MissingKey>,
    pub equal: Vec<EqualValue>,
    /// Keys present in every environment with a distinct value in each.
    pub unique: Vec<String>,
}

impl Report {
    pub fn is_empty(&self) -> bool {
        self.missing.is_empty() && self.equal.is_empty() && self.unique.is_empty()
    }
}

/// Compare keys and values across environments.
///
/// Returns `None` when there are fewer than two environments; there is
/// nothing to compare then.
pub fn analyze(environments: &BTreeMap<String, Environment>) -> Option<Report> {
    if environments.len() < 2 {
        return None;
    }

    let keys: BTreeSet<&str> = environments
        .values()
        .flat_map(|env| env.keys().map(String::as_str))
        .collect();

    let mut report = Report::default();

    for key in keys {
        let missing_from: Vec<String> = environments
            .iter()
            .filter(|(_, env)| !env.contains_key(key))
            .map(|(name, _)| name.clone())
            .collect();
        // A key from the union exists somewhere, so a non-empty set is
        // always a strict subset of the environments.
        let present_in_all = missing_from.is_empty();
        if !present_in_all {
            report.missing.push(MissingKey {
                key: key.to_string(),
                missing_from,
            });
        }

        let mut by_value: BTreeMap<&str, Vec<String>> = BTreeMap::new();
        for (name, env) in environments {
            if let Some(value) = env.get(key) {
                by_value.entry(value.as_str()).or_default().push(name.clone());
            }
        }

        let mut has_equal = false;
        for group in by_value.into_values() {
            if group.len() > 1 {
                report.equal.push(EqualValue {
                    key: key.to_string(),
                    environments: group,
                });
                has_equal = true;
            }
        }

        if present_in_all && !has_equal {
            report.unique.push(key.to_string());
        }
    }

    Some(report)
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sections = 0;

        if !self.missing.is_empty() {
            writeln!(f, "Missing keys:")?;
            for finding in &self.missing {
                writeln!(
                    f,
                    "  {} is not set in: {}",
                    finding.key,
                    finding.missing_from.join(", ")
                )?;
            }
            sections += 1;
        }

        if !self.equal.is_empty() {
            if sections > 0 {
                writeln!(f)?;
            }
            writeln!(f, "Equal values:")?;
            for finding in &self.equal {
                writeln!(
                    f,
                    "  {} is equal in: {}",
                    finding.key,
                    finding.environments.join(", ")
                )?;
            }
            sections += 1;
        }

        if !self.unique.is_empty() {
            if sections > 0 {
                writeln!(f)?;
            }
            writeln!(f, "Unique values:")?;
            for key in &self.unique {
                writeln!(f, "  {}", key)?;
            }
        }

        Ok(())
    }
}
