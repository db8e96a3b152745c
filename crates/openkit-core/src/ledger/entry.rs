//! Per-agent ownership records
//!
//! An agent state is the slice of the ledger owned by one agent target. Its
//! file table maps normalized output paths to the content hash written at the
//! last successful install.

use chrono::{DateTime, SubsecRound, Utc};
use openkit_fs::checksum::sha256_hex;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// The pack (template bundle) last synced for an agent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackState {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub version: String,
}

impl PackState {
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }
}

/// Everything the ledger records for one agent target.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentState {
    #[serde(default)]
    pub pack: PackState,
    /// Installed files keyed by normalized, project-relative path
    #[serde(default, deserialize_with = "null_as_default")]
    pub files: BTreeMap<String, FileEntry>,
}

/// One file installed by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Opaque provenance of the content
    pub artifact_id: String,
    /// Hex SHA-256 of the bytes written at install time, not of current disk content
    pub installed_sha256: String,
    pub installed_at: DateTime<Utc>,
    /// Producer mode tag (`copy`, `render`, ...)
    pub mode: String,
}

impl FileEntry {
    /// Record `content` as installed now.
    pub fn installed(
        artifact_id: impl Into<String>,
        content: &[u8],
        mode: impl Into<String>,
    ) -> Self {
        Self {
            artifact_id: artifact_id.into(),
            installed_sha256: sha256_hex(content),
            installed_at: now_utc(),
            mode: mode.into(),
        }
    }
}

/// Current UTC time truncated to whole seconds.
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

/// Hand-edited ledgers sometimes carry `null` where a map is expected.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
