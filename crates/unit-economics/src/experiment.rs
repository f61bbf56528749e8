//! A/B experiment sizing — required sample size, test duration, and
//! minimum detectable effect for a two-proportion conversion test.
//!
//! Uses the standard approximation `n = k·p(1−p)/x²` per group, with `k`
//! taken from configuration (default 16, encoding two-sided α = 0.05 at
//! ~0.80 power). All infeasible cases — baseline at or above target,
//! non-positive baseline, no observed traffic — come back as explicit
//! not-applicable fields, never as a zero standing in for "unknown".

use crate::kpi::SegmentKpis;
use crate::traffic::segment_daily_rates;
use crm_core::config::{DealFilterConfig, ExperimentConfig};
use crm_core::metric::defined;
use crm_core::{DealRecord, SegmentName};
use serde::{Deserialize, Serialize};

/// Sizing outcome for one segment. Optional fields are `None` when the
/// quantity is undefined or not applicable for this segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentSizingRow {
    pub segment: SegmentName,
    /// Baseline conversion rate (C1 as a fraction).
    pub baseline_rate: Option<f64>,
    /// Target conversion rate the test should detect (absolute fraction).
    pub target_rate: f64,
    /// `target − baseline`; sizing applies only when positive.
    pub effect_size: Option<f64>,
    /// Required sample size per experiment group.
    pub sample_size_per_group: Option<f64>,
    /// Observed lead arrivals per day.
    pub daily_lead_rate: Option<f64>,
    /// Leads available within the test window at the observed rate.
    pub leads_available_in_window: Option<f64>,
    /// Days needed to reach the required sample at the observed rate.
    pub days_required: Option<f64>,
    /// Minimum daily rate that would fit the window.
    pub min_daily_lead_rate: Option<f64>,
    /// Smallest effect detectable with the window's traffic cap.
    pub min_detectable_effect: Option<f64>,
    /// Whether `days_required` fits the window. False when undefined.
    pub fits_window: bool,
    pub window_days: f64,
}

pub struct ExperimentSizer {
    config: ExperimentConfig,
}

impl ExperimentSizer {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    /// Size the test for one segment from its baseline conversion rate
    /// and observed daily lead rate.
    pub fn size_segment(
        &self,
        segment: SegmentName,
        baseline_rate: Option<f64>,
        daily_lead_rate: Option<f64>,
    ) -> ExperimentSizingRow {
        let k = self.config.sample_size_constant;
        let window = self.config.window_days;

        // A zero or negative baseline makes p(1−p) and the effect gap
        // meaningless; treat the whole baseline as undefined.
        let p = baseline_rate.filter(|p| p.is_finite() && *p > 0.0);
        let rate = daily_lead_rate.filter(|r| r.is_finite() && *r > 0.0);

        let effect_size = p.map(|p| self.config.target_rate - p);
        let leads_available = rate.map(|r| r * window);

        // A baseline past 1.0 (reconciled UA can undercount a segment's
        // buyers) makes p(1−p) negative; `defined` turns the resulting
        // NaN into no-data instead of letting it leak.
        let min_detectable_effect = match (p, leads_available) {
            (Some(p), Some(n)) if n > 0.0 => defined(Some((k * p * (1.0 - p) / n).sqrt())),
            _ => None,
        };

        // Sizing applies only when there is a positive gap to detect.
        let sample_size_per_group = match (p, effect_size) {
            (Some(p), Some(x)) if x > 0.0 => defined(Some(k * p * (1.0 - p) / (x * x))),
            _ => None,
        };
        let days_required = match (sample_size_per_group, rate) {
            (Some(n), Some(r)) => Some(n / r),
            _ => None,
        };
        let min_daily_lead_rate = sample_size_per_group.map(|n| n / window);
        let fits_window = matches!(days_required, Some(d) if d <= window);

        ExperimentSizingRow {
            segment,
            baseline_rate: p,
            target_rate: self.config.target_rate,
            effect_size,
            sample_size_per_group,
            daily_lead_rate: rate,
            leads_available_in_window: leads_available,
            days_required,
            min_daily_lead_rate,
            min_detectable_effect,
            fits_window,
            window_days: window,
        }
    }

    /// One sizing row per segment, pairing each segment's C1 with its
    /// observed daily lead rate from the deals table.
    pub fn size_segments(
        &self,
        segments: &[SegmentKpis],
        deals: &[DealRecord],
        filter: &DealFilterConfig,
    ) -> Vec<ExperimentSizingRow> {
        let rates = segment_daily_rates(deals, filter);
        segments
            .iter()
            .map(|segment| {
                let rate = rates
                    .iter()
                    .find(|(name, _)| *name == segment.segment)
                    .and_then(|(_, rate)| *rate);
                self.size_segment(
                    segment.segment.clone(),
                    segment.kpis.conversion_rate,
                    rate,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sizer() -> ExperimentSizer {
        ExperimentSizer::new(ExperimentConfig::default())
    }

    #[test]
    fn test_reference_sizing_scenario() {
        // p = 0.05, target = 0.10: n = 16·0.05·0.95 / 0.0025 = 304.
        let row = sizer().size_segment(SegmentName::Business, Some(0.05), Some(50.0));
        assert!((row.effect_size.unwrap() - 0.05).abs() < 1e-12);
        assert!((row.sample_size_per_group.unwrap() - 304.0).abs() < 1e-9);
        assert!((row.leads_available_in_window.unwrap() - 700.0).abs() < 1e-9);
        assert!((row.days_required.unwrap() - 6.08).abs() < 1e-9);
        assert!(row.fits_window);
        // MDE at the window cap: sqrt(16·0.05·0.95/700) ≈ 0.03295.
        assert!((row.min_detectable_effect.unwrap() - (0.76f64 / 700.0).sqrt()).abs() < 1e-12);
        // Minimum rate to finish inside the window: 304 / 14.
        assert!((row.min_daily_lead_rate.unwrap() - 304.0 / 14.0).abs() < 1e-9);
    }

    #[test]
    fn test_baseline_at_target_is_flagged_not_computed() {
        // x = 0: no division, sizing not applicable.
        let row = sizer().size_segment(SegmentName::Business, Some(0.10), Some(50.0));
        assert_eq!(row.effect_size, Some(0.0));
        assert_eq!(row.sample_size_per_group, None);
        assert_eq!(row.days_required, None);
        assert_eq!(row.min_daily_lead_rate, None);
        assert!(!row.fits_window);
        // MDE depends only on baseline and traffic, still defined.
        assert!(row.min_detectable_effect.is_some());
    }

    #[test]
    fn test_baseline_above_target_is_not_applicable() {
        let row = sizer().size_segment(SegmentName::Business, Some(0.20), Some(50.0));
        assert!(row.effect_size.unwrap() < 0.0);
        assert_eq!(row.sample_size_per_group, None);
        assert!(!row.fits_window);
    }

    #[test]
    fn test_zero_or_missing_baseline_is_undefined() {
        for baseline in [Some(0.0), Some(-0.1), None] {
            let row = sizer().size_segment(SegmentName::Business, baseline, Some(50.0));
            assert_eq!(row.baseline_rate, None);
            assert_eq!(row.effect_size, None);
            assert_eq!(row.sample_size_per_group, None);
            assert_eq!(row.min_detectable_effect, None);
            assert!(!row.fits_window);
        }
    }

    #[test]
    fn test_no_traffic_leaves_duration_fields_undefined() {
        let row = sizer().size_segment(SegmentName::Business, Some(0.05), None);
        // Sample size is still computable without traffic.
        assert!((row.sample_size_per_group.unwrap() - 304.0).abs() < 1e-9);
        assert_eq!(row.daily_lead_rate, None);
        assert_eq!(row.leads_available_in_window, None);
        assert_eq!(row.days_required, None);
        assert_eq!(row.min_detectable_effect, None);
        assert!(!row.fits_window);

        let zero = sizer().size_segment(SegmentName::Business, Some(0.05), Some(0.0));
        assert_eq!(zero.days_required, None);
        assert!(!zero.fits_window);
    }

    #[test]
    fn test_baseline_above_one_never_yields_nan() {
        // C1 can exceed 1.0 when the reconciled UA undercounts a
        // segment's buyers. p(1−p) is negative there; every dependent
        // field must come back as no-data, never a NaN inside Some.
        let row = sizer().size_segment(SegmentName::Business, Some(5.0), Some(50.0));
        assert_eq!(row.baseline_rate, Some(5.0));
        assert!(row.effect_size.unwrap() < 0.0);
        assert_eq!(row.min_detectable_effect, None);
        assert_eq!(row.sample_size_per_group, None);
        assert_eq!(row.days_required, None);
        assert_eq!(row.min_daily_lead_rate, None);
        assert!(!row.fits_window);
        for value in [
            row.effect_size,
            row.min_detectable_effect,
            row.sample_size_per_group,
            row.days_required,
            row.leads_available_in_window,
        ] {
            assert!(value.map_or(true, |v| v.is_finite()));
        }
    }

    #[test]
    fn test_slow_traffic_does_not_fit_window() {
        // 304 needed at 10/day = 30.4 days > 14.
        let row = sizer().size_segment(SegmentName::Business, Some(0.05), Some(10.0));
        assert!((row.days_required.unwrap() - 30.4).abs() < 1e-9);
        assert!(!row.fits_window);
    }

    #[test]
    fn test_constant_comes_from_config() {
        let sizer = ExperimentSizer::new(ExperimentConfig {
            target_rate: 0.10,
            window_days: 14.0,
            sample_size_constant: 21.0, // α = 0.05 at ~0.90 power
        });
        let row = sizer.size_segment(SegmentName::Business, Some(0.05), Some(50.0));
        assert!((row.sample_size_per_group.unwrap() - 21.0 * 0.05 * 0.95 / 0.0025).abs() < 1e-9);
    }
}
