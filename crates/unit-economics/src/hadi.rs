//! Static H/A/D/I narrative for the current conversion hypothesis.
//!
//! The dashboard renders these rows verbatim next to the experiment
//! sizing table; nothing here is computed.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HadiRow {
    pub part: String,
    pub description: String,
}

fn row(part: &str, description: &str) -> HadiRow {
    HadiRow {
        part: part.to_string(),
        description: description.to_string(),
    }
}

/// The four H/A/D/I rows for the lead response-time hypothesis.
pub fn hadi_rows() -> Vec<HadiRow> {
    vec![
        row(
            "H (hypothesis)",
            "If the time to first contact with a lead is brought under a 24-hour \
             SLA — via a response playbook, automatic CRM reminders, and lead \
             handling controls — then conversion C1 (B / UA) rises from its \
             current level to the ~10% target.",
        ),
        row(
            "A (actions)",
            "Run an A/B test on new leads. A (control): the current lead handling \
             process, unchanged. B (experiment): an automatic task for the manager \
             to make contact within 24 hours, push reminders in the CRM, message \
             templates and call scripts, and SLA alerts on handling time.",
        ),
        row(
            "D (data & metrics)",
            "Target metric: C1 = B / UA per group. Product metric: share of leads \
             handled within the 24-hour SLA. Supporting: stage-by-stage funnel \
             conversion and the SLA distribution. The test plan uses the computed \
             per-group sample size n, the segment's observed lead traffic per day, \
             and the minimum detectable effect x = target − p_base.",
        ),
        row(
            "I (interpretation)",
            "If C1 in group B reaches 10% and the gap between groups exceeds the \
             segment's minimum detectable effect x, the hypothesis is confirmed \
             and the new process is rolled out to the full lead flow. If the \
             uplift is below x, the null hypothesis stands and the next \
             hypothesis is drafted.",
        ),
    ]
}
