//! Dashboard-facing reporting surface — KPI tables, growth scenarios,
//! hypothesis narrative, and experiment sizing, as render-ready rows.

pub mod dashboard;

pub use dashboard::{
    BusinessKpiTable, ExperimentSizingTable, GrowthScenarioTable, MetricRow, ProductKpiRow,
    ProductKpiTable, UnitEconomicsDashboard,
};
