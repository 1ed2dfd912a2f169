//! State stores.
//!
//! Stores are shared by all lamps and keyed by the lamp's unique id.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};

use redb::{Database, ReadableTable, TableDefinition};
use tracing::debug;

use crate::state::LastKnownState;
use crate::Result;

/// Table storing lamp states as JSON (key: unique id).
const LAMP_STATES_TABLE: TableDefinition<&str, &str> = TableDefinition::new("lamp_states");

/// Load/save access to last-known lamp state.
pub trait StateStore: Send + Sync {
    /// Load the last state of a lamp, if one was saved.
    fn load(&self, unique_id: &str) -> Result<Option<LastKnownState>>;

    /// Save the state of a lamp, replacing any previous one.
    fn save(&self, unique_id: &str, state: &LastKnownState) -> Result<()>;

    /// Forget a lamp. Returns whether a state was stored.
    fn remove(&self, unique_id: &str) -> Result<bool>;
}

/// redb-backed store.
pub struct RedbStateStore {
    db: Arc<Database>,
}

impl RedbStateStore {
    /// Open or create the database file, creating parent directories as needed.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path_ref = path.as_ref();
        if let Some(parent) = path_ref.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(path_ref)?;

        // Make sure the table exists so read transactions can open it
        let write_txn = db.begin_write()?;
        {
            let _states = write_txn.open_table(LAMP_STATES_TABLE)?;
        }
        write_txn.commit()?;

        debug!(path = %path_ref.display(), "Opened lamp state store");

        Ok(Self { db: Arc::new(db) })
    }

    /// List all stored lamp ids.
    pub fn list_ids(&self) -> Result<Vec<String>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LAMP_STATES_TABLE)?;

        let mut ids = Vec::new();
        for result in table.iter()? {
            let (key, _value) = result?;
            ids.push(key.value().to_string());
        }
        Ok(ids)
    }
}

impl StateStore for RedbStateStore {
    fn load(&self, unique_id: &str) -> Result<Option<LastKnownState>> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(LAMP_STATES_TABLE)?;

        match table.get(unique_id)? {
            Some(value) => {
                let state: LastKnownState = serde_json::from_str(value.value())?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    fn save(&self, unique_id: &str, state: &LastKnownState) -> Result<()> {
        let json = serde_json::to_string(state)?;

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(LAMP_STATES_TABLE)?;
            table.insert(unique_id, json.as_str())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    fn remove(&self, unique_id: &str) -> Result<bool> {
        let write_txn = self.db.begin_write()?;
        let removed = {
            let mut table = write_txn.open_table(LAMP_STATES_TABLE)?;
            let previous = table.remove(unique_id)?;
            previous.is_some()
        };
        write_txn.commit()?;
        Ok(removed)
    }
}

/// In-memory store, for tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: RwLock<HashMap<String, LastKnownState>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.states.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl StateStore for MemoryStateStore {
    fn load(&self, unique_id: &str) -> Result<Option<LastKnownState>> {
        let states = self.states.read().unwrap_or_else(|e| e.into_inner());
        Ok(states.get(unique_id).cloned())
    }

    fn save(&self, unique_id: &str, state: &LastKnownState) -> Result<()> {
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        states.insert(unique_id.to_string(), state.clone());
        Ok(())
    }

    fn remove(&self, unique_id: &str) -> Result<bool> {
        let mut states = self.states.write().unwrap_or_else(|e| e.into_inner());
        Ok(states.remove(unique_id).is_some())
    }
}
