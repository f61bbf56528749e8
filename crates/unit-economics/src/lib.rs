//! Unit-economics computation engine — per-deal revenue attribution,
//! KPI aggregation, growth-scenario sensitivity analysis, and A/B
//! experiment sizing.

pub mod attribution;
pub mod experiment;
pub mod hadi;
pub mod kpi;
pub mod leads;
pub mod scenario;
pub mod traffic;

pub use attribution::{attributable_deals, attribute_deal, AttributedDeal, Attribution};
pub use experiment::{ExperimentSizer, ExperimentSizingRow};
pub use kpi::{KpiAggregator, KpiReport, KpiSet, SegmentKpis};
pub use leads::reconcile_lead_counts;
pub use scenario::{GrowthLever, GrowthScenarioEngine, GrowthScenarioRow};
