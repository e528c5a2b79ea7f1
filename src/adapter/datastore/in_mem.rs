use std::collections::{BTreeMap, HashMap};
use std::result::Result;

use tokio::sync::{Mutex, MutexGuard};

use storefront_common::config::AppInMemoryDbCfg;

use super::AppDStoreError;

pub type AppInMemRow = Vec<String>;

#[derive(Default)]
struct InMemTable {
    last_id: u64,
    rows: BTreeMap<u64, AppInMemRow>,
}

#[derive(Default)]
struct InMemTableSet(HashMap<String, InMemTable>);

/// Volatile table set for local demo and tests. Each row is a list of
/// stringified columns keyed by an auto-incremented id, repositories decide
/// how columns are laid out.
pub struct AppInMemoryDStore {
    max_items: u32,
    content: Mutex<InMemTableSet>,
}

/// Exclusive access to every table, callers keep it across a complete
/// read-modify-write sequence.
pub struct AppInMemDstoreLock<'a> {
    guard: MutexGuard<'a, InMemTableSet>,
    max_items: u32,
}

impl AppInMemoryDStore {
    pub fn new(cfg: &AppInMemoryDbCfg) -> Self {
        Self {
            max_items: cfg.max_items,
            content: Mutex::new(InMemTableSet::default()),
        }
    }

    pub async fn lock(&self) -> AppInMemDstoreLock<'_> {
        let guard = self.content.lock().await;
        AppInMemDstoreLock {
            guard,
            max_items: self.max_items,
        }
    }
}

impl<'a> AppInMemDstoreLock<'a> {
    pub fn fetch(&self, table: &str, id: u64) -> Option<AppInMemRow> {
        self.guard
            .0
            .get(table)
            .and_then(|t| t.rows.get(&id))
            .cloned()
    }

    pub fn fetch_all(&self, table: &str) -> Vec<(u64, AppInMemRow)> {
        self.guard
            .0
            .get(table)
            .map(|t| {
                t.rows
                    .iter()
                    .map(|(id, row)| (*id, row.clone()))
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default()
    }

    pub fn num_free_slots(&self, table: &str) -> usize {
        let used = self.guard.0.get(table).map(|t| t.rows.len()).unwrap_or(0);
        (self.max_items as usize).saturating_sub(used)
    }

    pub fn insert(&mut self, table: &str, row: AppInMemRow) -> Result<u64, AppDStoreError> {
        let max_items = self.max_items;
        let t = self.guard.0.entry(table.to_string()).or_default();
        if t.rows.len() >= (max_items as usize) {
            return Err(AppDStoreError::InMemExceedLimit {
                table: table.to_string(),
                max_items,
            });
        }
        t.last_id += 1;
        let id = t.last_id;
        t.rows.insert(id, row);
        Ok(id)
    }

    /// Overwrite an existing row, returns `false` if the id is absent
    pub fn update(&mut self, table: &str, id: u64, row: AppInMemRow) -> bool {
        match self.guard.0.get_mut(table).and_then(|t| t.rows.get_mut(&id)) {
            Some(saved) => {
                *saved = row;
                true
            }
            None => false,
        }
    }
} // end of impl AppInMemDstoreLock
