//! Managed state ledger
//!
//! The ledger records, per agent, which files this engine installed and the
//! content hash at install time. It is persisted as JSON at
//! `.openkit/managed.json` and is the only input that lets a sync tell an
//! untouched managed file from a user edit.

mod entry;

pub use entry::{AgentState, FileEntry, PackState, now_utc};

use crate::{Error, Result};
use openkit_fs::{KitPath, io};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The only schema version this build reads or writes.
pub const SCHEMA_VERSION: &str = "1";

/// Agent key used when an agent identifier is blank.
pub const UNKNOWN_AGENT: &str = "unknown";

/// Persisted ownership table, keyed by agent.
///
/// Maps are ordered so the serialized file is byte-stable between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    schema_version: String,
    #[serde(default, deserialize_with = "entry::null_as_default")]
    agents: BTreeMap<String, AgentState>,
}

impl Default for Ledger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger {
    /// Create an empty ledger at the current schema version
    pub fn new() -> Self {
        Self {
            schema_version: SCHEMA_VERSION.to_string(),
            agents: BTreeMap::new(),
        }
    }

    /// Load a ledger from a JSON file.
    ///
    /// # Errors
    ///
    /// - [`Error::Fs`] if the file cannot be read (including when it is absent)
    /// - [`Error::LedgerParse`] if the content is not a valid ledger document
    /// - [`Error::LedgerSchema`] if `schema_version` is missing or unsupported;
    ///   older or newer layouts are never migrated silently
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read(path).map_err(|e| openkit_fs::Error::io(path, e))?;
        Self::from_json(path, &content)
    }

    /// Load a ledger, or start a fresh one if the file does not exist.
    ///
    /// # Errors
    ///
    /// Same as [`Ledger::load`] for every failure other than a missing file.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match io::read_optional(path)? {
            Some(content) => Self::from_json(path, &content),
            None => {
                tracing::debug!(path = %path.display(), "No managed state yet, starting empty");
                Ok(Self::new())
            }
        }
    }

    fn from_json(path: &Path, content: &[u8]) -> Result<Self> {
        let ledger: Ledger = serde_json::from_slice(content).map_err(|source| Error::LedgerParse {
            path: path.to_path_buf(),
            source,
        })?;
        ledger.check_schema()?;
        Ok(ledger)
    }

    fn check_schema(&self) -> Result<()> {
        if self.schema_version == SCHEMA_VERSION {
            return Ok(());
        }
        Err(Error::LedgerSchema {
            found: (!self.schema_version.is_empty()).then(|| self.schema_version.clone()),
            expected: SCHEMA_VERSION,
        })
    }

    /// Save the ledger atomically as pretty-printed JSON.
    ///
    /// Parent directories are created as needed. A blank schema version is
    /// written as the current one.
    ///
    /// # Errors
    ///
    /// Returns [`Error::LedgerSchema`] if the ledger carries a foreign schema
    /// version, or an I/O error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        let mut content = if self.schema_version.is_empty() {
            serde_json::to_vec_pretty(&Ledger {
                schema_version: SCHEMA_VERSION.to_string(),
                agents: self.agents.clone(),
            })?
        } else {
            self.check_schema()?;
            serde_json::to_vec_pretty(self)?
        };
        content.push(b'\n');
        io::write_atomic(path, &content)?;
        Ok(())
    }

    /// Schema version carried by this ledger
    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// All agents, keyed by normalized agent id
    pub fn agents(&self) -> &BTreeMap<String, AgentState> {
        &self.agents
    }

    /// Look up an agent without creating it
    pub fn agent(&self, agent_id: &str) -> Option<&AgentState> {
        self.agents.get(&agent_key(agent_id))
    }

    /// Get the state for an agent, creating an empty one if needed
    pub fn ensure_agent(&mut self, agent_id: &str) -> &mut AgentState {
        self.agents.entry(agent_key(agent_id)).or_default()
    }
}

/// Normalize an agent identifier into its ledger key.
///
/// Keys are trimmed and lowercased; a blank id maps to [`UNKNOWN_AGENT`].
pub fn agent_key(agent_id: &str) -> String {
    let key = agent_id.trim().to_lowercase();
    if key.is_empty() {
        UNKNOWN_AGENT.to_string()
    } else {
        key
    }
}

/// Default ledger location for a project: `<root>/.openkit/managed.json`.
pub fn ledger_path(project_root: &Path) -> PathBuf {
    KitPath::Ledger.under(project_root)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn ledger_new_has_current_schema() {
        let ledger = Ledger::new();
        assert_eq!(ledger.schema_version(), SCHEMA_VERSION);
        assert!(ledger.agents().is_empty());
    }

    #[test]
    fn agent_keys_are_normalized() {
        assert_eq!(agent_key("  Claude "), "claude");
        assert_eq!(agent_key(""), UNKNOWN_AGENT);
        assert_eq!(agent_key("   "), UNKNOWN_AGENT);
    }

    #[test]
    fn ensure_agent_is_shared_across_spellings() {
        let mut ledger = Ledger::new();
        ledger
            .ensure_agent("OpenCode")
            .files
            .insert("a.md".into(), FileEntry::installed("x", b"1", "copy"));

        let agent = ledger.agent(" opencode").unwrap();
        assert!(agent.files.contains_key("a.md"));
        assert_eq!(ledger.agents().len(), 1);
    }

    #[test]
    fn ledger_save_is_atomic() {
        let dir = tempdir().unwrap();
        let path = dir.path().join(".openkit").join("managed.json");

        let mut ledger = Ledger::new();
        ledger.ensure_agent("codex").pack = PackState::new("openkit", "0.3.0");
        ledger.save(&path).unwrap();

        // Only the ledger itself remains, no temp files
        let names: Vec<_> = std::fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["managed.json".to_string()]);

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains("\"schema_version\": \"1\""));
        assert!(raw.ends_with('\n'));
    }

    #[test]
    fn save_rejects_foreign_schema() {
        let dir = tempdir().unwrap();
        let ledger: Ledger = serde_json::from_str(r#"{"schema_version":"2","agents":{}}"#).unwrap();
        let result = ledger.save(&dir.path().join("managed.json"));
        assert!(matches!(result, Err(Error::LedgerSchema { .. })));
    }

    #[test]
    fn save_fills_blank_schema() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("managed.json");
        let ledger: Ledger = serde_json::from_str(r#"{"agents":{}}"#).unwrap();
        assert_eq!(ledger.schema_version(), "");

        ledger.save(&path).unwrap();
        assert_eq!(Ledger::load(&path).unwrap().schema_version(), SCHEMA_VERSION);
    }
}
