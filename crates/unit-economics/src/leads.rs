//! Lead-source reconciliation for units-acquired counting.
//!
//! UA can be counted from up to three source systems (deal contact
//! names, the contacts table, the calls table) with overlapping but
//! incomplete coverage of the same lead population. The reconciliation
//! policy is the MAXIMUM of the available distinct counts: any single
//! source may under-count, and a sum would double-count leads present in
//! more than one system. This is product-owner policy — do not replace
//! it with a union, join, or sum.

use crm_core::SourceTables;
use std::collections::HashSet;

/// Distinct non-empty identifiers in one source column.
pub fn distinct_count<'a, I>(ids: I) -> f64
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let unique: HashSet<&str> = ids
        .into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
        .collect();
    unique.len() as f64
}

/// Reconcile lead counts from independent sources: the maximum of the
/// available counts, or `None` when no source reported at all.
pub fn reconcile_lead_counts(sources: &[Option<f64>]) -> Option<f64> {
    sources
        .iter()
        .flatten()
        .copied()
        .fold(None, |best: Option<f64>, count| {
            Some(best.map_or(count, |b| b.max(count)))
        })
}

/// The three UA source counts for the loaded tables, in fixed order:
/// deal contact names, contact ids, call contact ids.
pub fn lead_source_counts(tables: &SourceTables) -> Vec<Option<f64>> {
    vec![
        Some(distinct_count(
            tables.deals.iter().map(|d| d.contact_name.as_deref()),
        )),
        Some(distinct_count(
            tables.contacts.iter().map(|c| c.id.as_deref()),
        )),
        Some(distinct_count(
            tables.calls.iter().map(|c| c.contact_id.as_deref()),
        )),
    ]
}
