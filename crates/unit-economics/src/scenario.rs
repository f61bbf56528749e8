//! Growth scenario analysis — sensitivity of contribution margin to
//! single-lever changes.
//!
//! Each scenario perturbs exactly one lever (UA, C1, CPA, AOV, APC) by
//! the configured magnitude, holds the others at baseline, and recomputes
//! CM through the same formula chain the aggregator uses. Rows come out
//! in segment order × fixed lever order; ranking and highlighting belong
//! to the presentation layer.

use crate::kpi::{KpiSet, SegmentKpis};
use crm_core::config::ScenarioConfig;
use crm_core::metric::{diff, product, ratio, scale};
use crm_core::SegmentName;
use serde::{Deserialize, Serialize};

/// An input lever of the CM formula chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthLever {
    UnitsAcquired,
    ConversionRate,
    CostPerAcquisition,
    AvgOrderValue,
    AvgPeriodsPerCustomer,
}

impl GrowthLever {
    /// Fixed report order.
    pub const ALL: [GrowthLever; 5] = [
        GrowthLever::UnitsAcquired,
        GrowthLever::ConversionRate,
        GrowthLever::CostPerAcquisition,
        GrowthLever::AvgOrderValue,
        GrowthLever::AvgPeriodsPerCustomer,
    ];

    /// Short code used in dashboard tables.
    pub fn code(&self) -> &'static str {
        match self {
            GrowthLever::UnitsAcquired => "UA",
            GrowthLever::ConversionRate => "C1",
            GrowthLever::CostPerAcquisition => "CPA",
            GrowthLever::AvgOrderValue => "AOV",
            GrowthLever::AvgPeriodsPerCustomer => "APC",
        }
    }
}

/// Effect of one lever perturbation on one segment's CM.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrowthScenarioRow {
    pub segment: SegmentName,
    pub lever: GrowthLever,
    pub cm_base: Option<f64>,
    pub cm_new: Option<f64>,
    pub cm_delta: Option<f64>,
    /// `(cm_new / cm_base − 1) × 100`; undefined when `cm_base` is zero
    /// or undefined.
    pub cm_delta_pct: Option<f64>,
}

/// The five levers in baseline form, extracted from a segment's KPI set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScenarioInputs {
    pub units_acquired: Option<f64>,
    /// Conversion as a fraction, never the display percentage.
    pub conversion_rate: Option<f64>,
    pub cost_per_acquisition: Option<f64>,
    pub avg_order_value: Option<f64>,
    pub avg_periods_per_customer: Option<f64>,
}

impl ScenarioInputs {
    pub fn from_kpis(kpis: &KpiSet) -> Self {
        Self {
            units_acquired: kpis.units_acquired,
            conversion_rate: kpis.conversion_rate,
            cost_per_acquisition: kpis.cost_per_acquisition,
            avg_order_value: kpis.avg_order_value,
            avg_periods_per_customer: kpis.avg_periods_per_customer,
        }
    }

    /// CM via the same chain the aggregator uses:
    /// CLTV = AOV × APC, LTV = CLTV × C1, CM = UA × (LTV − CPA).
    pub fn contribution_margin(&self) -> Option<f64> {
        let cltv = product(self.avg_order_value, self.avg_periods_per_customer);
        let ltv = product(cltv, self.conversion_rate);
        product(self.units_acquired, diff(ltv, self.cost_per_acquisition))
    }

    fn with_lever(&self, lever: GrowthLever, config: &ScenarioConfig) -> Self {
        let mut adjusted = *self;
        match lever {
            GrowthLever::UnitsAcquired => {
                adjusted.units_acquired = scale(adjusted.units_acquired, config.growth_factor());
            }
            GrowthLever::ConversionRate => {
                adjusted.conversion_rate = scale(adjusted.conversion_rate, config.growth_factor());
            }
            GrowthLever::CostPerAcquisition => {
                // Cost levers improve by decreasing.
                adjusted.cost_per_acquisition =
                    scale(adjusted.cost_per_acquisition, config.cost_factor());
            }
            GrowthLever::AvgOrderValue => {
                adjusted.avg_order_value = scale(adjusted.avg_order_value, config.growth_factor());
            }
            GrowthLever::AvgPeriodsPerCustomer => {
                adjusted.avg_periods_per_customer =
                    scale(adjusted.avg_periods_per_customer, config.growth_factor());
            }
        }
        adjusted
    }
}

pub struct GrowthScenarioEngine {
    config: ScenarioConfig,
}

impl GrowthScenarioEngine {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    /// One row per (segment × lever), in input order.
    pub fn scenarios(&self, segments: &[SegmentKpis]) -> Vec<GrowthScenarioRow> {
        let mut rows = Vec::with_capacity(segments.len() * GrowthLever::ALL.len());
        for segment in segments {
            let baseline = ScenarioInputs::from_kpis(&segment.kpis);
            let cm_base = segment.kpis.contribution_margin;
            for lever in GrowthLever::ALL {
                let cm_new = baseline
                    .with_lever(lever, &self.config)
                    .contribution_margin();
                let cm_delta = diff(cm_new, cm_base);
                let cm_delta_pct = match cm_base {
                    Some(base) if base != 0.0 => {
                        ratio(cm_new, Some(base)).map(|r| (r - 1.0) * 100.0)
                    }
                    _ => None,
                };
                rows.push(GrowthScenarioRow {
                    segment: segment.segment.clone(),
                    lever,
                    cm_base,
                    cm_new,
                    cm_delta,
                    cm_delta_pct,
                });
            }
        }
        rows
    }
}
