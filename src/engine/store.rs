//! Persistent entry store: one JSON state document per sync root.
//!
//! Document shape (`version` 1):
//! ```json
//! { "version": 1, "activities": [["<id>", "<fingerprint>|null", "<hash>", "<relative path>"]] }
//! ```
//! The whole document is rewritten (temp file + rename) after every mutation.

use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use super::tools::{path_from_store_string, path_to_store_string};
use crate::Entry;
use crate::error::{IoContext, Result, SyncError};
use crate::utils::config::{PackagePaths, StateConsts};
use crate::utils::tempfiles::write_atomic;

/// Persisted row: `[id, fingerprint, hash, relative path]`.
pub type StoredRow = (String, Option<String>, String, String);

#[derive(Deserialize)]
struct VersionProbe {
    version: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct StateDocument {
    version: u32,
    #[serde(default)]
    activities: Vec<StoredRow>,
}

/// Ordered collection of [`Entry`] values keyed by id, backed by the state file.
#[derive(Debug)]
pub struct EntryStore {
    root: PathBuf,
    state_path: PathBuf,
    entries: Vec<Entry>,
    by_id: HashMap<String, usize>,
}

impl EntryStore {
    /// Open the store for `root`. Loads the state file, or writes an empty one if none exists.
    pub fn open(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(SyncError::RootMissing(root.to_path_buf()));
        }
        let state_path = root.join(PackagePaths::get().state_filename());
        let mut store = EntryStore {
            root: root.to_path_buf(),
            state_path,
            entries: Vec::new(),
            by_id: HashMap::new(),
        };
        if store.state_path.exists() {
            store.load()?;
        } else {
            store.save()?;
        }
        Ok(store)
    }

    /// Open for inspection only: loads the state file if present but never creates one.
    /// Used by dry runs, which must leave the tree untouched.
    pub fn open_readonly(root: &Path) -> Result<Self> {
        if !root.is_dir() {
            return Err(SyncError::RootMissing(root.to_path_buf()));
        }
        let mut store = EntryStore {
            root: root.to_path_buf(),
            state_path: root.join(PackagePaths::get().state_filename()),
            entries: Vec::new(),
            by_id: HashMap::new(),
        };
        if store.state_path.exists() {
            store.load()?;
        }
        Ok(store)
    }

    /// Replace in-memory entries with the state file's contents. Nothing is loaded on error.
    pub fn load(&mut self) -> Result<()> {
        let raw = std::fs::read_to_string(&self.state_path).at_path(&self.state_path)?;
        let rows = parse_state(&raw).map_err(|reason| SyncError::CorruptState {
            path: self.state_path.clone(),
            reason,
        })?;

        self.entries.clear();
        self.by_id.clear();
        for (id, fingerprint, hash, rel) in rows {
            if self.by_id.contains_key(&id) {
                warn!("Duplicate entry for {id} in state file; keeping the first");
                continue;
            }
            let path = path_from_store_string(&rel, &self.root);
            self.push(Entry {
                id,
                fingerprint,
                hash,
                path,
            });
        }
        debug!(
            "Loaded {} entries from {}",
            self.entries.len(),
            self.state_path.display()
        );
        Ok(())
    }

    /// Write the whole store to the state file atomically.
    pub fn save(&self) -> Result<()> {
        let doc = StateDocument {
            version: StateConsts::VERSION,
            activities: self
                .entries
                .iter()
                .map(|e| {
                    (
                        e.id.clone(),
                        e.fingerprint.clone(),
                        e.hash.clone(),
                        path_to_store_string(&e.path, &self.root),
                    )
                })
                .collect(),
        };
        let json = serde_json::to_vec_pretty(&doc).map_err(|e| SyncError::CorruptState {
            path: self.state_path.clone(),
            reason: e.to_string(),
        })?;
        write_atomic(&self.state_path, &json)
    }

    pub fn get(&self, id: &str) -> Option<&Entry> {
        self.by_id.get(id).map(|&i| &self.entries[i])
    }

    /// Insert or update the entry for `id`, then persist the whole store.
    pub fn upsert(
        &mut self,
        id: &str,
        fingerprint: Option<&str>,
        hash: &str,
        path: &Path,
    ) -> Result<()> {
        match self.by_id.get(id) {
            Some(&i) => {
                let entry = &mut self.entries[i];
                entry.fingerprint = fingerprint.map(str::to_string);
                entry.hash = hash.to_string();
                entry.path = path.to_path_buf();
            }
            None => self.push(Entry {
                id: id.to_string(),
                fingerprint: fingerprint.map(str::to_string),
                hash: hash.to_string(),
                path: path.to_path_buf(),
            }),
        }
        self.save()
    }

    /// Entries in persisted order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn state_path(&self) -> &Path {
        &self.state_path
    }

    fn push(&mut self, entry: Entry) {
        self.by_id.insert(entry.id.clone(), self.entries.len());
        self.entries.push(entry);
    }
}

/// Parse a state document. The version is checked before the rows so a future format
/// is rejected as such rather than as a shape mismatch.
pub fn parse_state(raw: &str) -> std::result::Result<Vec<StoredRow>, String> {
    let probe: VersionProbe =
        serde_json::from_str(raw).map_err(|e| format!("unreadable state document: {e}"))?;
    match probe.version {
        // JSON has no int/float split: `1.0` is version 1.
        Some(serde_json::Value::Number(n)) if n.as_f64() == Some(f64::from(StateConsts::VERSION)) => {}
        Some(v) => return Err(format!("unsupported state version {v}")),
        None => return Err("state document has no version".to_string()),
    }
    let doc: StateDocument =
        serde_json::from_str(raw).map_err(|e| format!("malformed state document: {e}"))?;
    Ok(doc.activities)
}
