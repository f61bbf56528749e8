//! Unit-economics dashboard queries — the tabular outputs the web layer
//! renders directly.
//!
//! Every query recomputes from the current table snapshot; nothing
//! derived is persisted. Values are rounded to two decimals for display
//! and missing values serialize as `null`, never 0.

use chrono::{DateTime, Utc};
use crm_core::config::AnalyticsConfig;
use crm_core::{CrmResult, SegmentName};
use crm_datasource::TableStore;
use crm_unit_economics::hadi::{hadi_rows, HadiRow};
use crm_unit_economics::kpi::KpiSet;
use crm_unit_economics::{
    ExperimentSizer, ExperimentSizingRow, GrowthScenarioEngine, GrowthScenarioRow, KpiAggregator,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

// ─── Table types ─────────────────────────────────────────────────────────────

/// One metric of the business-wide KPI table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub metric: String,
    pub value: Option<f64>,
}

/// Business-wide KPI table, one row per metric.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusinessKpiTable {
    pub id: Uuid,
    pub rows: Vec<MetricRow>,
    pub generated_at: DateTime<Utc>,
}

/// One product segment's KPI set as a display row. C1 is the percentage
/// form; the fraction stays internal to the engines.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductKpiRow {
    pub product: String,
    pub units_acquired: Option<f64>,
    pub buyers: Option<f64>,
    pub acquisition_cost: Option<f64>,
    pub transactions: Option<f64>,
    pub revenue: Option<f64>,
    pub conversion_rate_pct: Option<f64>,
    pub cost_per_acquisition: Option<f64>,
    pub avg_order_value: Option<f64>,
    pub avg_periods_per_customer: Option<f64>,
    pub customer_lifetime_value: Option<f64>,
    pub lifetime_value_per_unit: Option<f64>,
    pub contribution_margin: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductKpiTable {
    pub id: Uuid,
    pub rows: Vec<ProductKpiRow>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GrowthScenarioTable {
    pub id: Uuid,
    pub rows: Vec<GrowthScenarioRow>,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentSizingTable {
    pub id: Uuid,
    pub rows: Vec<ExperimentSizingRow>,
    pub generated_at: DateTime<Utc>,
}

fn round2(value: Option<f64>) -> Option<f64> {
    value.map(|v| (v * 100.0).round() / 100.0)
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

/// The dashboard query surface over one table store.
pub struct UnitEconomicsDashboard {
    store: Arc<TableStore>,
    config: AnalyticsConfig,
    aggregator: KpiAggregator,
    scenarios: GrowthScenarioEngine,
    sizer: ExperimentSizer,
}

impl UnitEconomicsDashboard {
    pub fn new(store: Arc<TableStore>, config: AnalyticsConfig) -> Self {
        info!("unit-economics dashboard initialized");
        let aggregator = KpiAggregator::new(config.deals.clone());
        let scenarios = GrowthScenarioEngine::new(config.scenario.clone());
        let sizer = ExperimentSizer::new(config.experiment.clone());
        Self {
            store,
            config,
            aggregator,
            scenarios,
            sizer,
        }
    }

    /// Business-wide KPI table plus the per-product KPI table.
    pub fn unit_economics_tables(&self) -> CrmResult<(BusinessKpiTable, ProductKpiTable)> {
        let tables = self.store.snapshot()?;
        let report = self.aggregator.aggregate(&tables);

        let business = BusinessKpiTable {
            id: Uuid::new_v4(),
            rows: business_rows(&report.business.kpis),
            generated_at: Utc::now(),
        };

        let products = ProductKpiTable {
            id: Uuid::new_v4(),
            rows: report
                .products
                .iter()
                .map(|segment| product_row(&segment.segment, &segment.kpis))
                .collect(),
            generated_at: Utc::now(),
        };

        Ok((business, products))
    }

    /// Growth scenario rows for every segment × lever combination.
    pub fn growth_scenario_table(&self) -> CrmResult<GrowthScenarioTable> {
        let tables = self.store.snapshot()?;
        let report = self.aggregator.aggregate(&tables);
        let rows = self
            .scenarios
            .scenarios(&report.segments())
            .into_iter()
            .map(|row| GrowthScenarioRow {
                cm_base: round2(row.cm_base),
                cm_new: round2(row.cm_new),
                cm_delta: round2(row.cm_delta),
                cm_delta_pct: round2(row.cm_delta_pct),
                ..row
            })
            .collect();

        Ok(GrowthScenarioTable {
            id: Uuid::new_v4(),
            rows,
            generated_at: Utc::now(),
        })
    }

    /// Static H/A/D/I narrative rows.
    pub fn hypothesis_narrative(&self) -> Vec<HadiRow> {
        hadi_rows()
    }

    /// Experiment sizing rows, one per segment.
    pub fn experiment_sizing_table(&self) -> CrmResult<ExperimentSizingTable> {
        let tables = self.store.snapshot()?;
        let report = self.aggregator.aggregate(&tables);
        let rows = self
            .sizer
            .size_segments(&report.segments(), &tables.deals, &self.config.deals);

        Ok(ExperimentSizingTable {
            id: Uuid::new_v4(),
            rows,
            generated_at: Utc::now(),
        })
    }

    /// Re-read the source tables from disk. Subsequent queries see the
    /// new snapshot.
    pub fn refresh(&self) -> CrmResult<()> {
        self.store.refresh()?;
        Ok(())
    }
}

fn business_rows(kpis: &KpiSet) -> Vec<MetricRow> {
    let row = |metric: &str, value: Option<f64>| MetricRow {
        metric: metric.to_string(),
        value: round2(value),
    };
    vec![
        row("UA", kpis.units_acquired),
        row("B", kpis.buyers),
        row("AC", kpis.acquisition_cost),
        row("T", kpis.transactions),
        row("Revenue", kpis.revenue),
        row("C1", kpis.conversion_rate_pct),
        row("CPA", kpis.cost_per_acquisition),
        row("CAC", kpis.cost_per_customer),
        row("AOV", kpis.avg_order_value),
        row("APC", kpis.avg_periods_per_customer),
        row("CLTV", kpis.customer_lifetime_value),
        row("LTV", kpis.lifetime_value_per_unit),
        row("CM", kpis.contribution_margin),
    ]
}

fn product_row(segment: &SegmentName, kpis: &KpiSet) -> ProductKpiRow {
    ProductKpiRow {
        product: segment.label().to_string(),
        units_acquired: round2(kpis.units_acquired),
        buyers: round2(kpis.buyers),
        acquisition_cost: round2(kpis.acquisition_cost),
        transactions: round2(kpis.transactions),
        revenue: round2(kpis.revenue),
        conversion_rate_pct: round2(kpis.conversion_rate_pct),
        cost_per_acquisition: round2(kpis.cost_per_acquisition),
        avg_order_value: round2(kpis.avg_order_value),
        avg_periods_per_customer: round2(kpis.avg_periods_per_customer),
        customer_lifetime_value: round2(kpis.customer_lifetime_value),
        lifetime_value_per_unit: round2(kpis.lifetime_value_per_unit),
        contribution_margin: round2(kpis.contribution_margin),
    }
}
