use crate::error::Result;
use crate::utils::constants::{META_TABLE, UNKNOWN_META_CODE};
use rusqlite::Connection;
use std::collections::HashMap;

/// Snapshot of the `meta` reference table: annotation names to codes.
///
/// Ids and names stay in the order the table returned them. A name that
/// appears more than once resolves to its first position.
#[derive(Debug, Clone, Default)]
pub struct MetaLookup {
    ids: Vec<i64>,
    names: Vec<String>,
    by_name: HashMap<String, usize>,
}

impl MetaLookup {
    /// Load every `(id, name)` pair of the reference table
    pub fn load(conn: &Connection) -> Result<Self> {
        let mut stmt = conn.prepare(&format!("SELECT id, name FROM {}", META_TABLE))?;
        let pairs = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(Self::from_pairs(pairs))
    }

    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (i64, S)>,
        S: Into<String>,
    {
        let mut lookup = Self::default();
        for (id, name) in pairs {
            let name = name.into();
            let position = lookup.ids.len();
            lookup.by_name.entry(name.clone()).or_insert(position);
            lookup.ids.push(id);
            lookup.names.push(name);
        }
        lookup
    }

    /// Code for an annotation name, or the sentinel `0` when unknown
    pub fn resolve(&self, name: &str) -> i64 {
        self.by_name
            .get(name)
            .map(|&position| self.ids[position])
            .unwrap_or(UNKNOWN_META_CODE)
    }

    /// Name registered for a code, if any
    pub fn name_of(&self, id: i64) -> Option<&str> {
        self.ids
            .iter()
            .position(|&candidate| candidate == id)
            .map(|position| self.names[position].as_str())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
