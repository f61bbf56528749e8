use serde::Deserialize;

/// Root analytics configuration. Loaded from environment variables with
/// the prefix `CRM_ANALYTICS__`; every policy constant the engines use
/// (stage markers, perturbation magnitudes, experiment sizing constants)
/// is a named value here rather than a literal at the call site.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnalyticsConfig {
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub deals: DealFilterConfig,
    #[serde(default)]
    pub scenario: ScenarioConfig,
    #[serde(default)]
    pub experiment: ExperimentConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Directory holding the cleaned source tables, one JSON file per table.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
}

/// Which deals enter the attribution set, and how the business is
/// segmented by product.
#[derive(Debug, Clone, Deserialize)]
pub struct DealFilterConfig {
    /// Stage marker for a closed, paid deal.
    #[serde(default = "default_won_stage")]
    pub won_stage: String,
    /// Noise threshold: deals at or below this contracted amount are
    /// excluded from attribution entirely.
    #[serde(default = "default_min_offer_amount")]
    pub min_offer_amount: f64,
    /// Product lines reported as segments alongside the whole business.
    #[serde(default = "default_products")]
    pub products: Vec<String>,
}

/// Growth-scenario perturbation magnitudes.
#[derive(Debug, Clone, Deserialize)]
pub struct ScenarioConfig {
    /// Relative uplift applied to growth levers (UA, C1, AOV, APC).
    #[serde(default = "default_growth_uplift")]
    pub growth_uplift: f64,
    /// Relative reduction applied to cost levers (CPA improves by falling).
    #[serde(default = "default_cost_relief")]
    pub cost_relief: f64,
}

impl ScenarioConfig {
    pub fn growth_factor(&self) -> f64 {
        1.0 + self.growth_uplift
    }

    pub fn cost_factor(&self) -> f64 {
        1.0 - self.cost_relief
    }
}

/// A/B experiment sizing policy.
#[derive(Debug, Clone, Deserialize)]
pub struct ExperimentConfig {
    /// Target conversion rate the hypothesis aims for (absolute fraction).
    #[serde(default = "default_target_rate")]
    pub target_rate: f64,
    /// Test duration ceiling in days.
    #[serde(default = "default_window_days")]
    pub window_days: f64,
    /// The `n = k·p(1−p)/x²` constant of the two-proportion z-test
    /// approximation. The default 16 ≈ 2·(z_{α/2} + z_β)² encodes a
    /// two-sided α = 0.05 at ~0.80 power.
    #[serde(default = "default_sample_size_constant")]
    pub sample_size_constant: f64,
}

// Default functions
fn default_data_dir() -> String {
    "data/clean".to_string()
}
fn default_won_stage() -> String {
    "payment done".to_string()
}
fn default_min_offer_amount() -> f64 {
    10.0
}
fn default_products() -> Vec<String> {
    vec![
        "Web Developer".to_string(),
        "Digital Marketing".to_string(),
        "UX/UI Design".to_string(),
    ]
}
fn default_growth_uplift() -> f64 {
    0.10
}
fn default_cost_relief() -> f64 {
    0.10
}
fn default_target_rate() -> f64 {
    0.10
}
fn default_window_days() -> f64 {
    14.0
}
fn default_sample_size_constant() -> f64 {
    16.0
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

impl Default for DealFilterConfig {
    fn default() -> Self {
        Self {
            won_stage: default_won_stage(),
            min_offer_amount: default_min_offer_amount(),
            products: default_products(),
        }
    }
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            growth_uplift: default_growth_uplift(),
            cost_relief: default_cost_relief(),
        }
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            target_rate: default_target_rate(),
            window_days: default_window_days(),
            sample_size_constant: default_sample_size_constant(),
        }
    }
}

impl AnalyticsConfig {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder().add_source(
            config::Environment::with_prefix("CRM_ANALYTICS")
                .separator("__")
                .try_parsing(true)
                .list_separator(","),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
