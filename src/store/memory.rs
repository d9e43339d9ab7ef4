//! In-process table store used by the upload tests.
use anyhow::{bail, Result};
use std::{collections::HashMap, sync::Mutex};

use super::TableStore;
use crate::dataset::Record;

#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<HashMap<String, Vec<Record>>>,
    /// When set, every insert fails with this message.
    fail_inserts: Option<String>,
}

impl MemoryStore {
    pub fn with_table(table: &str, rows: Vec<Record>) -> Self {
        let store = Self::default();
        store.tables.lock().unwrap().insert(table.to_string(), rows);
        store
    }

    pub fn failing_inserts(mut self, msg: &str) -> Self {
        self.fail_inserts = Some(msg.to_string());
        self
    }

    pub fn rows(&self, table: &str) -> Vec<Record> {
        self.tables
            .lock()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    fn with_rows<T>(&self, table: &str, f: impl FnOnce(&Vec<Record>) -> T) -> Result<T> {
        let tables = self.tables.lock().unwrap();
        match tables.get(table) {
            Some(rows) => Ok(f(rows)),
            None => bail!("relation \"public.{}\" does not exist", table),
        }
    }
}

impl TableStore for MemoryStore {
    async fn insert(&self, table: &str, records: &[Record]) -> Result<()> {
        if let Some(msg) = &self.fail_inserts {
            bail!("{}", msg);
        }
        let mut tables = self.tables.lock().unwrap();
        match tables.get_mut(table) {
            Some(rows) => {
                rows.extend_from_slice(records);
                Ok(())
            }
            None => bail!("relation \"public.{}\" does not exist", table),
        }
    }

    async fn count(&self, table: &str) -> Result<u64> {
        self.with_rows(table, |rows| rows.len() as u64)
    }

    async fn select_column(&self, table: &str, column: &str) -> Result<Vec<Option<String>>> {
        let column = column.to_string();
        self.with_rows(table, |rows| {
            rows.iter()
                .map(|r| match column.as_str() {
                    "gender" => Some(r.gender.clone()),
                    "findings" => Some(r.findings.clone()),
                    "human_impression" => Some(r.human_impression.clone()),
                    _ => None,
                })
                .collect()
        })
    }

    async fn fetch_records(&self, table: &str) -> Result<Vec<Record>> {
        self.with_rows(table, |rows| rows.clone())
    }
}
