//! Observed lead-arrival rates, derived from deal creation timestamps.
//!
//! The experiment sizer needs leads/day per segment. The rate is the
//! distinct lead count divided by the inclusive day span of the
//! segment's deal creation dates; undefined for empty segments, segments
//! without timestamps, or segments with no leads.

use crate::leads::distinct_count;
use crm_core::config::DealFilterConfig;
use crm_core::{DealRecord, SegmentName};
use chrono::NaiveDate;

/// Distinct leads per day over the inclusive creation-date span.
pub fn daily_lead_rate<'a, I>(deals: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a DealRecord> + Clone,
{
    let leads = distinct_count(
        deals
            .clone()
            .into_iter()
            .map(|d| d.contact_name.as_deref()),
    );
    if leads == 0.0 {
        return None;
    }

    let dates: Vec<NaiveDate> = deals
        .into_iter()
        .filter_map(|d| d.created_at)
        .map(|t| t.date_naive())
        .collect();
    let first = dates.iter().min()?;
    let last = dates.iter().max()?;
    let span_days = (*last - *first).num_days() + 1;
    if span_days <= 0 {
        return None;
    }

    Some(leads / span_days as f64)
}

/// Daily lead rate for the business and each configured product, in
/// segment report order. Rates are computed over ALL deals in the
/// segment, not just paid ones: every deal represents a lead arrival.
pub fn segment_daily_rates(
    deals: &[DealRecord],
    filter: &DealFilterConfig,
) -> Vec<(SegmentName, Option<f64>)> {
    let mut rates = Vec::with_capacity(1 + filter.products.len());
    rates.push((SegmentName::Business, daily_lead_rate(deals.iter())));
    for product in &filter.products {
        let subset = deals
            .iter()
            .filter(|d| d.product.as_deref() == Some(product.as_str()));
        rates.push((
            SegmentName::Product(product.clone()),
            daily_lead_rate(subset),
        ));
    }
    rates
}
