//! Source-table loading. The upstream import/clean pipeline writes one
//! JSON file per table into the data directory; the loader maps a
//! missing or unreadable file to [`CrmError::SourceUnavailable`] so the
//! whole aggregation fails explicitly rather than producing a partial
//! result.

use crm_core::{CallRecord, ContactRecord, CrmError, CrmResult, DealRecord, SourceTables, SpendRecord};
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

pub const DEALS_TABLE: &str = "deals";
pub const SPEND_TABLE: &str = "spend";
pub const CONTACTS_TABLE: &str = "contacts";
pub const CALLS_TABLE: &str = "calls";

fn read_table<T: DeserializeOwned>(dir: &Path, name: &str) -> CrmResult<Vec<T>> {
    let path = dir.join(format!("{name}.json"));
    let raw = fs::read_to_string(&path)
        .map_err(|_| CrmError::SourceUnavailable(name.to_string()))?;
    let rows: Vec<T> = serde_json::from_str(&raw)?;
    debug!(table = name, rows = rows.len(), "loaded source table");
    Ok(rows)
}

/// Read all four source tables from `dir`. Any missing table fails the
/// entire load.
pub fn load_tables(dir: &Path) -> CrmResult<SourceTables> {
    let deals: Vec<DealRecord> = read_table(dir, DEALS_TABLE)?;
    let spend: Vec<SpendRecord> = read_table(dir, SPEND_TABLE)?;
    let contacts: Vec<ContactRecord> = read_table(dir, CONTACTS_TABLE)?;
    let calls: Vec<CallRecord> = read_table(dir, CALLS_TABLE)?;

    info!(
        deals = deals.len(),
        spend = spend.len(),
        contacts = contacts.len(),
        calls = calls.len(),
        "source tables loaded"
    );

    Ok(SourceTables {
        deals,
        spend,
        contacts,
        calls,
    })
}
