//! Process-wide cache of the loaded source tables.
//!
//! Tables are loaded from disk on first use and held in memory until an
//! explicit `refresh()`. Concurrent readers each get an independent
//! snapshot (`Arc`); replacement of the files on disk mid-read is an
//! accepted last-writer-wins race, with no locking of the files
//! themselves.

use crate::loader;
use crm_core::{CrmError, CrmResult, SourceTables};
use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

pub struct TableStore {
    data_dir: Option<PathBuf>,
    cached: RwLock<Option<Arc<SourceTables>>>,
}

impl TableStore {
    /// A store backed by a data directory; tables load lazily.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: Some(data_dir.into()),
            cached: RwLock::new(None),
        }
    }

    /// A store pre-populated with in-memory tables. Used by tests and by
    /// callers that do their own ingestion; `refresh()` keeps returning
    /// the same snapshot.
    pub fn from_tables(tables: SourceTables) -> Self {
        Self {
            data_dir: None,
            cached: RwLock::new(Some(Arc::new(tables))),
        }
    }

    /// Current table snapshot, loading from disk if nothing is cached.
    pub fn snapshot(&self) -> CrmResult<Arc<SourceTables>> {
        if let Some(tables) = self.cached.read().clone() {
            return Ok(tables);
        }
        self.reload()
    }

    /// Re-read the tables from disk, replacing the cached snapshot.
    /// Readers holding the previous snapshot are unaffected.
    pub fn refresh(&self) -> CrmResult<Arc<SourceTables>> {
        match &self.data_dir {
            Some(_) => self.reload(),
            // In-memory stores have no backing files to re-read.
            None => self.snapshot(),
        }
    }

    fn reload(&self) -> CrmResult<Arc<SourceTables>> {
        let dir = self
            .data_dir
            .as_deref()
            .ok_or_else(|| CrmError::Config("table store has no data directory".to_string()))?;
        let tables = Arc::new(loader::load_tables(dir)?);
        *self.cached.write() = Some(tables.clone());
        info!(dir = %dir.display(), "table store refreshed");
        Ok(tables)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crm_core::{DealRecord, SpendRecord};
    use std::fs;
    use std::path::{Path, PathBuf};

    /// Uniquely named directory under the system temp dir, removed again
    /// when the test drops it.
    struct TempDataDir(PathBuf);

    impl TempDataDir {
        fn new() -> Self {
            let dir =
                std::env::temp_dir().join(format!("crm-datasource-{}", uuid::Uuid::new_v4()));
            fs::create_dir_all(&dir).unwrap();
            Self(dir)
        }

        fn path(&self) -> &Path {
            &self.0
        }
    }

    impl Drop for TempDataDir {
        fn drop(&mut self) {
            let _ = fs::remove_dir_all(&self.0);
        }
    }

    fn write_json(dir: &std::path::Path, name: &str, body: &str) {
        fs::write(dir.join(format!("{name}.json")), body).unwrap();
    }

    fn deal_json(id: &str, spend: f64) -> String {
        format!(
            r#"{{"id":"{id}","product":"Web Developer","stage":"payment done",
               "contact_name":"lead-1","offer_total_amount":{spend},
               "initial_amount_paid":null,"course_duration":10,
               "months_of_study":4,"created_at":"2024-03-01T10:00:00Z"}}"#
        )
    }

    fn write_all_tables(dir: &std::path::Path) {
        write_json(dir, "deals", &format!("[{}]", deal_json("d1", 1000.0)));
        write_json(dir, "spend", r#"[{"source":"ads","spend":500.0}]"#);
        write_json(dir, "contacts", r#"[{"id":"c1"},{"id":"c2"}]"#);
        write_json(dir, "calls", r#"[{"contact_id":"c1"}]"#);
    }

    #[test]
    fn test_snapshot_loads_all_tables() {
        let dir = TempDataDir::new();
        write_all_tables(dir.path());

        let store = TableStore::new(dir.path());
        let tables = store.snapshot().unwrap();
        assert_eq!(tables.deals.len(), 1);
        assert_eq!(tables.spend.len(), 1);
        assert_eq!(tables.contacts.len(), 2);
        assert_eq!(tables.calls.len(), 1);
        assert_eq!(tables.deals[0].stage.as_deref(), Some("payment done"));
    }

    #[test]
    fn test_missing_table_fails_whole_load() {
        let dir = TempDataDir::new();
        write_all_tables(dir.path());
        fs::remove_file(dir.path().join("calls.json")).unwrap();

        let store = TableStore::new(dir.path());
        match store.snapshot() {
            Err(CrmError::SourceUnavailable(name)) => assert_eq!(name, "calls"),
            other => panic!("expected SourceUnavailable, got {other:?}"),
        }
    }

    #[test]
    fn test_refresh_picks_up_rewritten_files() {
        let dir = TempDataDir::new();
        write_all_tables(dir.path());

        let store = TableStore::new(dir.path());
        let before = store.snapshot().unwrap();
        assert_eq!(before.deals.len(), 1);

        write_json(
            dir.path(),
            "deals",
            &format!("[{},{}]", deal_json("d1", 1000.0), deal_json("d2", 2000.0)),
        );
        // Cached snapshot is served until an explicit refresh.
        assert_eq!(store.snapshot().unwrap().deals.len(), 1);
        assert_eq!(store.refresh().unwrap().deals.len(), 2);
        // The old snapshot a reader held stays intact.
        assert_eq!(before.deals.len(), 1);
    }

    #[test]
    fn test_in_memory_store_refresh_is_stable() {
        let store = TableStore::from_tables(crm_core::SourceTables {
            deals: vec![],
            spend: vec![SpendRecord {
                source: None,
                spend: Some(100.0),
            }],
            contacts: vec![],
            calls: vec![],
        });
        assert_eq!(store.refresh().unwrap().spend.len(), 1);
    }

    #[test]
    fn test_deal_record_roundtrip() {
        let dir = TempDataDir::new();
        write_all_tables(dir.path());
        let store = TableStore::new(dir.path());
        let deal: &DealRecord = &store.snapshot().unwrap().deals[0];
        assert_eq!(deal.offer_total_amount, Some(1000.0));
        assert_eq!(deal.initial_amount_paid, None);
        assert!(deal.created_at.is_some());
    }
}
