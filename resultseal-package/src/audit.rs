//! Signed provenance ledger.
//!
//! Each [`AuditEntry`] is signed over its canonical JSON form and stored in
//! the manifest keyed by the base64 signature. A reader verifies every entry
//! against the trusted signer before any file is decrypted; one bad entry
//! rejects the whole package.

use crate::canonical::to_canonical_json;
use crate::error::{PackageError, PackageResult};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, SecondsFormat, Utc};
use resultseal_crypto::{sign_message, verify_message, PrivateKey, PublicKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// Role of the party an audit entry is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditRole {
    Admin,
    Researcher,
    Member,
}

impl fmt::Display for AuditRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Admin => "admin",
            Self::Researcher => "researcher",
            Self::Member => "member",
        })
    }
}

/// One provenance event, e.g. "created by member X at time T".
///
/// The timestamp is kept as the exact string that was signed. Parsing it
/// into a date type and re-rendering could change its bytes and break the
/// signature.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AuditEntry {
    action: String,
    entity_id: String,
    timestamp: String,
    role: AuditRole,
}

impl AuditEntry {
    /// Creates an entry stamped with the current time.
    pub fn new(action: impl Into<String>, entity_id: impl Into<String>, role: AuditRole) -> Self {
        Self::at(action, entity_id, role, Utc::now())
    }

    /// Creates an entry with an explicit time, rendered as RFC 3339 UTC with
    /// millisecond precision (`2024-05-01T12:00:00.000Z`).
    pub fn at(
        action: impl Into<String>,
        entity_id: impl Into<String>,
        role: AuditRole,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            action: action.into(),
            entity_id: entity_id.into(),
            timestamp: timestamp.to_rfc3339_opts(SecondsFormat::Millis, true),
            role,
        }
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn entity_id(&self) -> &str {
        &self.entity_id
    }

    pub fn role(&self) -> AuditRole {
        self.role
    }

    /// The timestamp string exactly as signed.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// The timestamp parsed as a date, if it is valid RFC 3339.
    pub fn recorded_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.timestamp)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// The byte sequence that is signed and verified.
    pub fn canonical_bytes(&self) -> PackageResult<Vec<u8>> {
        Ok(to_canonical_json(self)?)
    }

    /// Signs this entry, returning the base64 signature.
    pub fn sign(&self, signer: &PrivateKey) -> PackageResult<String> {
        let signature = sign_message(signer, &self.canonical_bytes()?)?;
        Ok(STANDARD.encode(signature))
    }

    /// Checks a base64 signature over this entry.
    pub fn verify(&self, signature: &str, signer: &PublicKey) -> PackageResult<()> {
        let invalid = || PackageError::InvalidSignature {
            action: self.action.clone(),
            entity_id: self.entity_id.clone(),
        };
        let raw = STANDARD.decode(signature).map_err(|_| invalid())?;
        verify_message(signer, &self.canonical_bytes()?, &raw).map_err(|_| invalid())
    }
}

/// Mapping from base64 signature to the entry it signs.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLedger(BTreeMap<String, AuditEntry>);

impl AuditLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Signs and appends an entry, returning its signature.
    ///
    /// Signatures are deterministic, so recording an identical entry with
    /// the same key again is a no-op.
    pub fn record(&mut self, entry: AuditEntry, signer: &PrivateKey) -> PackageResult<String> {
        let signature = entry.sign(signer)?;
        debug!(
            action = entry.action(),
            entity_id = entry.entity_id(),
            signer = signer.fingerprint().short(),
            "recorded audit entry"
        );
        self.0.insert(signature.clone(), entry);
        Ok(signature)
    }

    /// Verifies every entry against `signer`. All-or-nothing: the first bad
    /// signature fails the whole ledger, and an empty ledger is rejected.
    pub fn verify_all(&self, signer: &PublicKey) -> PackageResult<()> {
        if self.0.is_empty() {
            return Err(PackageError::EmptyAudit);
        }
        for (signature, entry) in &self.0 {
            entry.verify(signature, signer)?;
        }
        Ok(())
    }

    pub fn get(&self, signature: &str) -> Option<&AuditEntry> {
        self.0.get(signature)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &AuditEntry)> {
        self.0.iter().map(|(sig, entry)| (sig.as_str(), entry))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
