//! Vendor identity canonicalization.

use std::collections::HashMap;

use chrono::Utc;
use rand::RngCore;
use rand::rngs::OsRng;

use crate::models::document::VendorIdentity;

/// Legal-entity suffixes dropped as whole words during normalization.
const LEGAL_SUFFIXES: [&str; 6] = ["inc", "ltd", "llc", "corp", "company", "pvt"];

/// Maps raw vendor names to identity records.
pub struct VendorCanonicalizer;

impl VendorCanonicalizer {
    pub fn new() -> Self {
        Self
    }

    /// Canonicalize a raw vendor name into an identity record.
    ///
    /// A fresh canonical ID is minted on every call, so two calls for the
    /// same vendor produce distinct IDs with equal normalized names. Use
    /// [`VendorRegistry::resolve`] when stable IDs are needed.
    pub fn canonicalize(&self, raw_name: Option<&str>) -> VendorIdentity {
        let Some(name) = raw_name.filter(|s| !s.trim().is_empty()) else {
            return VendorIdentity::unknown(raw_name.map(str::to_string));
        };

        VendorIdentity {
            canonical_id: fresh_canonical_id(),
            normalized_name: normalize_vendor_name(name),
            raw_input: Some(name.to_string()),
            first_seen: Some(Utc::now().to_rfc3339()),
        }
    }
}

impl Default for VendorCanonicalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Lowercase, strip everything but alphanumerics and spaces, collapse
/// whitespace, and drop legal-entity suffix tokens.
pub fn normalize_vendor_name(name: &str) -> String {
    let lowered = name.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect();

    stripped
        .split_whitespace()
        .filter(|token| !LEGAL_SUFFIXES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

fn fresh_canonical_id() -> String {
    format!("VENDOR_{:08X}", OsRng.next_u32())
}

/// Caller-owned registry resolving vendor names to stable identities.
///
/// The first sighting of a normalized name mints an identity; later
/// sightings of any variant that normalizes to the same name reuse it, so
/// "ABC Corporation" and "ABC Corp." share one canonical ID.
#[derive(Debug, Default)]
pub struct VendorRegistry {
    entries: HashMap<String, VendorIdentity>,
}

impl VendorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct vendors seen so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up or create the identity for a raw vendor name.
    pub fn resolve(&mut self, raw_name: Option<&str>) -> VendorIdentity {
        let Some(name) = raw_name.filter(|s| !s.trim().is_empty()) else {
            return VendorIdentity::unknown(raw_name.map(str::to_string));
        };

        let normalized = normalize_vendor_name(name);
        let entry = self
            .entries
            .entry(normalized.clone())
            .or_insert_with(|| VendorIdentity {
                canonical_id: fresh_canonical_id(),
                normalized_name: normalized,
                raw_input: Some(name.to_string()),
                first_seen: Some(Utc::now().to_rfc3339()),
            });

        VendorIdentity {
            raw_input: Some(name.to_string()),
            ..entry.clone()
        }
    }
}
