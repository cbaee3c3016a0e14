//! Manifest consistency checking.
//!
//! Every manifest entry should carry the hash of its own name. Entries
//! that do not were produced by a different hashing convention or were
//! edited by hand, and masks extracted for them will likely be empty.

use serde::Serialize;
use std::fmt;

use super::hash::hash_name_to_id;
use super::id::ObjectId;
use super::manifest::Manifest;

/// Options for manifest checking.
#[derive(Clone, Debug, Default)]
pub struct ManifestCheckOptions {
    /// If true, any mismatch fails the check.
    pub strict: bool,
}

/// One entry whose stored ID differs from the hash of its name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CheckIssue {
    pub name: String,
    pub stored: ObjectId,
    pub expected: ObjectId,
}

impl fmt::Display for CheckIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}': stored {} but name hashes to {}",
            self.name, self.stored, self.expected
        )
    }
}

/// The result of checking a manifest.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ManifestCheckReport {
    pub entry_count: usize,
    /// Mismatches are errors rather than warnings.
    pub strict: bool,
    pub issues: Vec<CheckIssue>,
}

impl ManifestCheckReport {
    pub fn mismatch_count(&self) -> usize {
        self.issues.len()
    }

    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns true unless the check ran in strict mode and found mismatches.
    pub fn passed(&self) -> bool {
        !self.strict || self.is_clean()
    }
}

impl fmt::Display for ManifestCheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.issues.is_empty() {
            return writeln!(
                f,
                "Manifest check passed: {} entries, all IDs match their names",
                self.entry_count
            );
        }

        writeln!(
            f,
            "Manifest check found {} mismatched ID(s) in {} entries:",
            self.mismatch_count(),
            self.entry_count
        )?;
        writeln!(f)?;
        let severity = if self.strict { "[ERROR]" } else { "[WARN ]" };
        for issue in &self.issues {
            writeln!(f, "  {} {}", severity, issue)?;
        }
        Ok(())
    }
}

/// Compares each entry's ID with the hash of its name.
pub fn check_manifest(manifest: &Manifest, opts: &ManifestCheckOptions) -> ManifestCheckReport {
    let issues = manifest
        .iter()
        .filter_map(|(name, stored)| {
            let expected = hash_name_to_id(name);
            (stored != expected).then(|| CheckIssue {
                name: name.to_string(),
                stored,
                expected,
            })
        })
        .collect();

    ManifestCheckReport {
        entry_count: manifest.len(),
        strict: opts.strict,
        issues,
    }
}
