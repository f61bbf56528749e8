//! KPI aggregation — the standard unit-economics metric set, derived for
//! the whole business and for each configured product segment.
//!
//! Segment policy: UA is the business-wide reconciled lead count and AC
//! is the business-wide spend total for EVERY segment; only buyers,
//! transactions, and revenue are recomputed per product subset. The
//! source data attributes neither leads nor spend per product, so
//! segment CPA/CAC share their numerator with the business. Preserved as
//! product-owner policy; do not invent a per-product spend split.

use crate::attribution::{attributable_deals, AttributedDeal};
use crate::leads::{distinct_count, lead_source_counts, reconcile_lead_counts};
use crm_core::config::DealFilterConfig;
use crm_core::metric::{diff, product, ratio, scale};
use crm_core::{SegmentName, SourceTables};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The standard unit-economics metric set for one segment. Every field
/// is derived and optional: `None` means "no data" (a zero or undefined
/// denominator somewhere in the chain), which is a valid result, not an
/// error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSet {
    /// UA — distinct leads entering the funnel.
    pub units_acquired: Option<f64>,
    /// B — distinct paying deals.
    pub buyers: Option<f64>,
    /// AC — total marketing spend.
    pub acquisition_cost: Option<f64>,
    /// T — total elapsed billing periods across attributed deals.
    pub transactions: Option<f64>,
    /// Sum of recognized revenue across attributed deals.
    pub revenue: Option<f64>,
    /// C1 = B / UA, as a fraction. The scenario and experiment engines
    /// consume this form, never the percentage.
    pub conversion_rate: Option<f64>,
    /// C1 as a percentage, for display only.
    pub conversion_rate_pct: Option<f64>,
    /// CPA = AC / UA.
    pub cost_per_acquisition: Option<f64>,
    /// CAC = AC / B.
    pub cost_per_customer: Option<f64>,
    /// AOV = Revenue / T.
    pub avg_order_value: Option<f64>,
    /// APC = T / B.
    pub avg_periods_per_customer: Option<f64>,
    /// CLTV = AOV × APC.
    pub customer_lifetime_value: Option<f64>,
    /// LTV = CLTV × C1.
    pub lifetime_value_per_unit: Option<f64>,
    /// CM = UA × (LTV − CPA), the top-line target.
    pub contribution_margin: Option<f64>,
}

impl KpiSet {
    /// Derive the full metric chain from the five primary aggregates, in
    /// strict order UA → B → AC → T → Revenue → C1 → CPA → CAC → AOV →
    /// APC → CLTV → LTV → CM. Any undefined step propagates.
    pub fn derive(
        units_acquired: Option<f64>,
        buyers: Option<f64>,
        acquisition_cost: Option<f64>,
        transactions: Option<f64>,
        revenue: Option<f64>,
    ) -> Self {
        let conversion_rate = ratio(buyers, units_acquired);
        let conversion_rate_pct = scale(conversion_rate, 100.0);
        let cost_per_acquisition = ratio(acquisition_cost, units_acquired);
        let cost_per_customer = ratio(acquisition_cost, buyers);
        let avg_order_value = ratio(revenue, transactions);
        let avg_periods_per_customer = ratio(transactions, buyers);
        let customer_lifetime_value = product(avg_order_value, avg_periods_per_customer);
        let lifetime_value_per_unit = product(customer_lifetime_value, conversion_rate);
        let contribution_margin = product(
            units_acquired,
            diff(lifetime_value_per_unit, cost_per_acquisition),
        );

        Self {
            units_acquired,
            buyers,
            acquisition_cost,
            transactions,
            revenue,
            conversion_rate,
            conversion_rate_pct,
            cost_per_acquisition,
            cost_per_customer,
            avg_order_value,
            avg_periods_per_customer,
            customer_lifetime_value,
            lifetime_value_per_unit,
            contribution_margin,
        }
    }
}

/// The KPI set of one segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentKpis {
    pub segment: SegmentName,
    pub kpis: KpiSet,
}

/// Business-wide KPIs plus one segment per configured product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiReport {
    pub business: SegmentKpis,
    pub products: Vec<SegmentKpis>,
}

impl KpiReport {
    /// All segments in report order: business first, then products.
    pub fn segments(&self) -> Vec<SegmentKpis> {
        let mut segments = Vec::with_capacity(1 + self.products.len());
        segments.push(self.business.clone());
        segments.extend(self.products.iter().cloned());
        segments
    }
}

pub struct KpiAggregator {
    filter: DealFilterConfig,
}

impl KpiAggregator {
    pub fn new(filter: DealFilterConfig) -> Self {
        Self { filter }
    }

    /// Recompute the full KPI report from a table snapshot. Pure in its
    /// inputs: the same tables always yield the same report.
    pub fn aggregate(&self, tables: &SourceTables) -> KpiReport {
        let attributed = attributable_deals(&tables.deals, &self.filter);
        debug!(
            deals = tables.deals.len(),
            attributed = attributed.len(),
            "attribution set built"
        );

        let units_acquired = reconcile_lead_counts(&lead_source_counts(tables));
        let acquisition_cost = Some(tables.spend.iter().filter_map(|s| s.spend).sum());

        let all: Vec<&AttributedDeal> = attributed.iter().collect();
        let business = SegmentKpis {
            segment: SegmentName::Business,
            kpis: derive_segment(units_acquired, acquisition_cost, &all),
        };

        let products = self
            .filter
            .products
            .iter()
            .map(|name| {
                let subset: Vec<&AttributedDeal> = attributed
                    .iter()
                    .filter(|a| a.deal.product.as_deref() == Some(name.as_str()))
                    .collect();
                SegmentKpis {
                    segment: SegmentName::Product(name.clone()),
                    // UA and AC stay business-wide; see module docs.
                    kpis: derive_segment(units_acquired, acquisition_cost, &subset),
                }
            })
            .collect();

        KpiReport { business, products }
    }
}

fn derive_segment(
    units_acquired: Option<f64>,
    acquisition_cost: Option<f64>,
    deals: &[&AttributedDeal],
) -> KpiSet {
    let buyers = distinct_count(deals.iter().map(|a| Some(a.deal.id.as_str())));
    // Deals with missing elapsed periods count zero toward T; their
    // revenue is undefined and already excluded from the sum.
    let transactions: f64 = deals
        .iter()
        .map(|a| a.deal.months_of_study.unwrap_or(0.0))
        .sum();
    let revenue: f64 = deals.iter().filter_map(|a| a.recognized_revenue()).sum();

    KpiSet::derive(
        units_acquired,
        Some(buyers),
        acquisition_cost,
        Some(transactions),
        Some(revenue),
    )
}
