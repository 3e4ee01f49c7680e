//! Data store seam.
//!
//! Records live in a remote backend. Lookups go through the [`DataStore`]
//! trait so the nearby service can be driven by any backend, and by
//! [`MemoryStore`] in tests and the CLI.
//!
//! Stores hand back raw JSON rows, unfiltered; typing and geofiltering happen
//! on this side of the seam.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Arc, RwLock};

use crate::error::{DomainError, Result};

/// Backend tables the app reads
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    SosAlerts,
    Communities,
    CommunityPosts,
    SmartAlerts,
    EmergencyContacts,
}

impl Table {
    pub const ALL: [Table; 5] = [
        Table::SosAlerts,
        Table::Communities,
        Table::CommunityPosts,
        Table::SmartAlerts,
        Table::EmergencyContacts,
    ];

    /// Backend table name
    pub fn as_str(&self) -> &'static str {
        match self {
            Table::SosAlerts => "sos_alerts",
            Table::Communities => "communities",
            Table::CommunityPosts => "community_posts",
            Table::SmartAlerts => "smart_alerts",
            Table::EmergencyContacts => "emergency_contacts",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Table {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self> {
        Table::ALL
            .into_iter()
            .find(|table| table.as_str() == s)
            .ok_or_else(|| DomainError::Store(format!("Unknown table: {}", s)))
    }
}

/// Read access to backend tables
pub trait DataStore: Send + Sync {
    /// Every row of `table`, in backend order
    fn fetch_all(&self, table: Table) -> Result<Vec<Value>>;
}

impl<S: DataStore + ?Sized> DataStore for Arc<S> {
    fn fetch_all(&self, table: Table) -> Result<Vec<Value>> {
        (**self).fetch_all(table)
    }
}

/// Fetch a whole table and deserialize each row
pub fn fetch_records<T, S>(store: &S, table: Table) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    S: DataStore + ?Sized,
{
    store
        .fetch_all(table)?
        .into_iter()
        .map(|row| serde_json::from_value(row).map_err(DomainError::from))
        .collect()
}

/// In-process store backed by JSON rows
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<Table, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a snapshot: a JSON object mapping table names to arrays of rows.
    ///
    /// ```json
    /// { "sos_alerts": [ ... ], "communities": [ ... ] }
    /// ```
    pub fn from_snapshot_str(snapshot: &str) -> Result<Self> {
        let raw: HashMap<String, Vec<Value>> = serde_json::from_str(snapshot)?;

        let mut tables = HashMap::new();
        for (name, rows) in raw {
            let table = name.parse::<Table>()?;
            tables.insert(table, rows);
        }

        Ok(Self {
            tables: RwLock::new(tables),
        })
    }

    pub fn from_snapshot_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            DomainError::Store(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let store = Self::from_snapshot_str(&content)?;
        tracing::info!(path = %path.display(), "Loaded snapshot");
        Ok(store)
    }

    /// Append a record to a table
    pub fn insert<T: Serialize>(&self, table: Table, record: &T) -> Result<()> {
        let row = serde_json::to_value(record)?;
        self.insert_value(table, row)
    }

    pub fn insert_value(&self, table: Table, row: Value) -> Result<()> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| DomainError::Store("Store lock poisoned".to_string()))?;
        tables.entry(table).or_default().push(row);
        Ok(())
    }

    /// Number of rows in a table
    pub fn len(&self, table: Table) -> usize {
        self.tables
            .read()
            .map(|tables| tables.get(&table).map_or(0, Vec::len))
            .unwrap_or(0)
    }

    pub fn is_empty(&self, table: Table) -> bool {
        self.len(table) == 0
    }
}

impl DataStore for MemoryStore {
    fn fetch_all(&self, table: Table) -> Result<Vec<Value>> {
        let tables = self
            .tables
            .read()
            .map_err(|_| DomainError::Store("Store lock poisoned".to_string()))?;
        Ok(tables.get(&table).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_table_names_round_trip() {
        for table in Table::ALL {
            assert_eq!(table.as_str().parse::<Table>().unwrap(), table);
        }
        assert!("users".parse::<Table>().is_err());
    }

    #[test]
    fn test_missing_table_is_empty() {
        let store = MemoryStore::new();
        assert!(store.fetch_all(Table::Communities).unwrap().is_empty());
        assert!(store.is_empty(Table::Communities));
    }

    #[test]
    fn test_insert_and_fetch_keeps_order() {
        let store = MemoryStore::new();
        store.insert_value(Table::SosAlerts, json!({"id": "a"})).unwrap();
        store.insert_value(Table::SosAlerts, json!({"id": "b"})).unwrap();

        let rows = store.fetch_all(Table::SosAlerts).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "a");
        assert_eq!(rows[1]["id"], "b");
        assert_eq!(store.len(Table::SosAlerts), 2);
    }

    #[test]
    fn test_snapshot_unknown_table() {
        let err = MemoryStore::from_snapshot_str(r#"{"profiles": []}"#).unwrap_err();
        assert!(matches!(err, DomainError::Store(_)));
    }

    #[test]
    fn test_snapshot_malformed() {
        let err = MemoryStore::from_snapshot_str("not json").unwrap_err();
        assert!(matches!(err, DomainError::Serialization(_)));
    }

    #[test]
    fn test_fetch_records_type_mismatch() {
        #[derive(serde::Deserialize)]
        #[allow(dead_code)]
        struct Row {
            id: String,
        }

        let store = MemoryStore::new();
        store.insert_value(Table::Communities, json!({"id": 5})).unwrap();
        let result: Result<Vec<Row>> = fetch_records(&store, Table::Communities);
        assert!(matches!(result, Err(DomainError::Serialization(_))));
    }

    #[test]
    fn test_arc_store() {
        let store = Arc::new(MemoryStore::new());
        store.insert_value(Table::SmartAlerts, json!({})).unwrap();
        let shared: Arc<dyn DataStore> = store.clone();
        assert_eq!(shared.fetch_all(Table::SmartAlerts).unwrap().len(), 1);
    }
}
