//! Record types for the cleaned source tables supplied by the upstream
//! import/clean pipeline. Numeric and temporal fields are optional: the
//! CRM export leaves gaps, and a gap must stay a gap (never a zero).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One deal exported from the CRM, cleaned and typed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DealRecord {
    pub id: String,
    pub product: Option<String>,
    /// Funnel stage; compared by equality against the configured
    /// paid/won marker.
    pub stage: Option<String>,
    /// Lead identifier used for units-acquired counting.
    pub contact_name: Option<String>,
    /// Total contracted amount.
    pub offer_total_amount: Option<f64>,
    /// Amount paid at signing. Absent means no deposit.
    pub initial_amount_paid: Option<f64>,
    /// Total engagement length in billing periods.
    pub course_duration: Option<f64>,
    /// Billing periods actually elapsed (e.g. months of study to date).
    pub months_of_study: Option<f64>,
    pub created_at: Option<DateTime<Utc>>,
}

/// One row of the marketing spend table. Spend is summable without
/// grouping; the source data carries no per-product breakdown.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpendRecord {
    pub source: Option<String>,
    pub spend: Option<f64>,
}

/// One row of the contacts table — an alternate lead source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRecord {
    pub id: Option<String>,
}

/// One row of the calls table — a third lead source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRecord {
    pub contact_id: Option<String>,
}

/// The four cleaned tables the analytics core consumes, as one snapshot.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceTables {
    pub deals: Vec<DealRecord>,
    pub spend: Vec<SpendRecord>,
    pub contacts: Vec<ContactRecord>,
    pub calls: Vec<CallRecord>,
}

/// A unit of analysis: the whole business or one product line. Segments
/// are derived on each aggregation, never stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SegmentName {
    Business,
    Product(String),
}

impl SegmentName {
    pub fn label(&self) -> &str {
        match self {
            SegmentName::Business => "Business",
            SegmentName::Product(name) => name,
        }
    }
}

impl fmt::Display for SegmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
