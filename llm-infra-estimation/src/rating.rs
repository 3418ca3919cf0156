//! Feasibility validation and the configuration rating heuristic.
//!
//! The rating is a pure function of the configuration and the derived
//! figures: a baseline of 50 adjusted by independent, bounded factors,
//! clamped to 0..=100. Hard failure states (VRAM infeasibility, priced
//! hardware that cannot serve, absurd sizing) pin the score and label.

use serde::Serialize;

use crate::catalog::{NetworkTier, RamGeneration, GPU_PRESETS, RAM_PRESETS};
use crate::config::{Configuration, Precision};
use crate::perf::{estimate_tokens_per_sec, PERFORMANCE_MATRIX};
use crate::sizing::SizingStatus;

/// Weights need head-room for activations and KV cache.
pub const VRAM_OVERHEAD_FACTOR: f64 = 1.2;

/// Above this GPU count the interconnect and RAM generation warnings
/// treat the deployment as a large cluster.
pub const LARGE_CLUSTER_GPUS: u64 = 32;

const BASELINE_SCORE: f64 = 50.0;
const SCORE_VRAM_ERROR: f64 = 5.0;
const SCORE_NON_FUNCTIONAL: f64 = 10.0;
const SCORE_UNREALISTIC: f64 = 10.0;
const SCORE_INACTIVE: f64 = 30.0;

// 5-year TCO per token/s of capacity, USD.
const CAPACITY_COST_TARGET: f64 = 400.0;
const CAPACITY_COST_HIGH: f64 = 2000.0;
// "Reasonable" absolute TCO is throughput-scaled; exceeding it by the
// factor below is penalised.
const REASONABLE_TCO_PER_TOKEN_PER_SEC: f64 = 1500.0;
const REASONABLE_TCO_FACTOR: f64 = 3.0;
const UTILIZATION_TARGET: f64 = 0.85;
const UTILIZATION_LOW: f64 = 0.5;
const UTILIZATION_FLOOR: f64 = 0.25;
// kW per token/s of capacity.
const POWER_TARGET: f64 = 0.005;
const POWER_HIGH: f64 = 0.02;
const ESTIMATE_PENALTY: f64 = 5.0;
const UNRESOLVED_PENALTY: f64 = 15.0;

/// Model does not fit in a single GPU's memory at the chosen precision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VramError {
    pub required_gb: f64,
    pub available_gb: f64,
    pub message: String,
}

/// Ordered from most to least severe; findings are sorted by this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    Warning,
    Info,
    Recommendation,
}

#[derive(Debug, Clone, Serialize)]
pub struct Finding {
    pub severity: Severity,
    pub message: String,
    pub remediation: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Rating {
    pub score: u8,
    pub label: String,
    pub explanation: String,
    /// True for VRAM-error, non-functional and unrealistic outcomes;
    /// the cheapest-configuration search filters on this.
    pub hard_failure: bool,
    pub findings: Vec<Finding>,
}

/// Figures the rating is computed from.
#[derive(Debug, Clone, Copy)]
pub struct RatingInputs<'a> {
    pub status: SizingStatus,
    pub five_year_tco_usd: f64,
    pub aggregate_tokens_per_sec: f64,
    pub total_power_kw: f64,
    pub gpu_slot_utilization: f64,
    pub estimated: bool,
    pub vram_error: Option<&'a VramError>,
}

/// Required GB per GPU with overhead: params x bytes/param x 1.2.
pub fn required_vram_gb(params_billion: f64, precision: Precision) -> f64 {
    params_billion * f64::from(precision.bits()) / 8.0 * VRAM_OVERHEAD_FACTOR
}

/// VRAM feasibility check. Equality is feasible; only a strict shortfall
/// is an error. Reported as data, never thrown.
pub fn check_model_fits_gpu(cfg: &Configuration) -> Option<VramError> {
    let required_gb = required_vram_gb(cfg.model_params_billion, cfg.precision);
    if required_gb > cfg.gpu_vram_gb {
        let message = format!(
            "A {}B model at {}-bit precision needs ~{:.1} GB VRAM but the selected GPU has \
             {:.0} GB ({:.1} GB short). Shard across GPUs or reduce precision.",
            cfg.model_params_billion,
            cfg.precision.bits(),
            required_gb,
            cfg.gpu_vram_gb,
            required_gb - cfg.gpu_vram_gb,
        );
        return Some(VramError {
            required_gb,
            available_gb: cfg.gpu_vram_gb,
            message,
        });
    }
    None
}

/// Advisory (non-fatal) configuration warnings.
pub fn config_warnings(
    cfg: &Configuration,
    required_gpus: u64,
    network_tier: NetworkTier,
) -> Vec<String> {
    let mut warnings = Vec::new();

    if required_gpus > 8 && network_tier == NetworkTier::Standard {
        warnings.push(format!(
            "{required_gpus} GPUs on a standard Ethernet fabric: inter-node bandwidth will \
             bottleneck tensor-parallel serving. Use a high-bandwidth interconnect (HDR 200G \
             or better) for clusters over 8 GPUs."
        ));
    }
    if required_gpus > LARGE_CLUSTER_GPUS && network_tier < NetworkTier::Top {
        warnings.push(format!(
            "{required_gpus} GPUs below the top interconnect tier: clusters over \
             {LARGE_CLUSTER_GPUS} GPUs should use NDR 400G-class fabric."
        ));
    }
    if required_gpus > LARGE_CLUSTER_GPUS {
        if let Some(ram) = RAM_PRESETS.get(cfg.ram_id.as_str()) {
            if ram.generation == RamGeneration::Ddr4 {
                warnings.push(
                    "DDR4 system memory is outdated for a cluster of this size; DDR5 platforms \
                     are the current baseline."
                        .to_string(),
                );
            }
        }
    }

    warnings
}

/// Up to three catalog GPUs that fit the model in VRAM and have
/// performance data, cheapest first.
fn gpus_fitting_vram(cfg: &Configuration, cheaper_than: Option<f64>) -> Vec<&'static str> {
    let required_gb = required_vram_gb(cfg.model_params_billion, cfg.precision);
    let mut candidates: Vec<(&'static str, f64)> = GPU_PRESETS
        .iter()
        .filter(|(key, gpu)| {
            gpu.vram_gb >= required_gb
                && cheaper_than.map_or(true, |limit| gpu.cost_usd < limit)
                && estimate_tokens_per_sec(&cfg.model_id, key, cfg.precision).is_some()
        })
        .map(|(key, gpu)| (*key, gpu.cost_usd))
        .collect();
    candidates.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(b.0)));
    candidates.into_iter().map(|(key, _)| key).take(3).collect()
}

fn name_list(keys: &[&'static str]) -> String {
    keys.iter()
        .map(|key| GPU_PRESETS[key].name)
        .collect::<Vec<_>>()
        .join(", ")
}

fn label_for_score(score: f64) -> &'static str {
    if score >= 85.0 {
        "excellent"
    } else if score >= 65.0 {
        "good"
    } else if score >= 40.0 {
        "compromise"
    } else {
        "inefficient"
    }
}

fn finish(score: f64, label: String, hard_failure: bool, mut findings: Vec<Finding>) -> Rating {
    findings.sort_by_key(|f| f.severity);
    let explanation = findings
        .iter()
        .map(|f| match &f.remediation {
            Some(fix) => format!("{} {}", f.message, fix),
            None => f.message.clone(),
        })
        .collect::<Vec<_>>()
        .join(" ");
    Rating {
        score: score.clamp(0.0, 100.0).round() as u8,
        label,
        explanation,
        hard_failure,
        findings,
    }
}

/// Composite 0-100 configuration rating.
pub fn rate(cfg: &Configuration, inputs: &RatingInputs) -> Rating {
    let mut findings = Vec::new();

    // Hard failure states pin the score and label.
    if let Some(err) = inputs.vram_error {
        let alternatives = gpus_fitting_vram(cfg, None);
        let remediation = if alternatives.is_empty() {
            Some("No single catalog GPU fits this model; plan for multi-GPU sharding.".to_string())
        } else {
            Some(format!(
                "GPUs with enough memory and known performance: {}.",
                name_list(&alternatives)
            ))
        };
        findings.push(Finding {
            severity: Severity::Critical,
            message: err.message.clone(),
            remediation,
        });
        return finish(SCORE_VRAM_ERROR, "VRAM error".to_string(), true, findings);
    }

    if inputs.status == SizingStatus::Unrealistic {
        findings.push(Finding {
            severity: Severity::Critical,
            message: "The required GPU count is beyond any realistic deployment; revisit the \
                      load assumptions or per-GPU throughput."
                .to_string(),
            remediation: None,
        });
        return finish(SCORE_UNREALISTIC, "unrealistic".to_string(), true, findings);
    }

    if inputs.status == SizingStatus::CannotEstimate {
        findings.push(Finding {
            severity: Severity::Warning,
            message: format!(
                "Throughput for '{}' could not be determined; cost and sizing figures are \
                 indicative only.",
                cfg.model_id
            ),
            remediation: if PERFORMANCE_MATRIX.contains_key(cfg.model_id.as_str()) {
                Some("Pick a GPU or precision with benchmark coverage.".to_string())
            } else {
                Some("Enter a measured tokens/sec figure for this model.".to_string())
            },
        });
        return finish(
            BASELINE_SCORE - UNRESOLVED_PENALTY,
            "requires clarification".to_string(),
            false,
            findings,
        );
    }

    if inputs.aggregate_tokens_per_sec <= 0.0 {
        return if inputs.five_year_tco_usd > 0.0 {
            findings.push(Finding {
                severity: Severity::Critical,
                message: "Hardware is priced but delivers zero throughput; the configuration \
                          cannot serve any load."
                    .to_string(),
                remediation: Some("Select a model and GPU with performance data.".to_string()),
            });
            finish(SCORE_NON_FUNCTIONAL, "non-functional".to_string(), true, findings)
        } else {
            findings.push(Finding {
                severity: Severity::Info,
                message: "Nothing is configured yet; pick a model and hardware to size the \
                          deployment."
                    .to_string(),
                remediation: None,
            });
            finish(SCORE_INACTIVE, "inactive".to_string(), false, findings)
        };
    }

    let mut score = BASELINE_SCORE;

    // (a) Cost of capacity: 5-year TCO per token/s.
    let capacity_cost = inputs.five_year_tco_usd / inputs.aggregate_tokens_per_sec;
    if capacity_cost <= CAPACITY_COST_TARGET {
        score += 15.0;
        findings.push(Finding {
            severity: Severity::Info,
            message: format!(
                "Excellent cost efficiency: ${capacity_cost:.0} of 5-year TCO per token/s."
            ),
            remediation: None,
        });
    } else if capacity_cost > CAPACITY_COST_HIGH {
        let penalty = (10.0 * capacity_cost / CAPACITY_COST_HIGH).min(25.0);
        score -= penalty;
        let cheaper = gpus_fitting_vram(cfg, Some(cfg.gpu_cost_usd));
        findings.push(Finding {
            severity: Severity::Warning,
            message: format!(
                "High cost of capacity: ${capacity_cost:.0} of 5-year TCO per token/s \
                 (threshold ${CAPACITY_COST_HIGH:.0})."
            ),
            remediation: if cheaper.is_empty() {
                None
            } else {
                Some(format!(
                    "Cheaper GPUs that still fit the model: {}.",
                    name_list(&cheaper)
                ))
            },
        });
    }

    // (b) Absolute TCO versus a throughput-scaled reasonable estimate.
    let reasonable_tco = inputs.aggregate_tokens_per_sec * REASONABLE_TCO_PER_TOKEN_PER_SEC;
    if reasonable_tco > 0.0 && inputs.five_year_tco_usd > reasonable_tco * REASONABLE_TCO_FACTOR {
        score -= 15.0;
        findings.push(Finding {
            severity: Severity::Warning,
            message: format!(
                "Total cost is more than {REASONABLE_TCO_FACTOR:.0}x a reasonable budget for \
                 this throughput."
            ),
            remediation: None,
        });
    }

    // (c) GPU slot utilization.
    if inputs.gpu_slot_utilization >= UTILIZATION_TARGET {
        score += 10.0;
        findings.push(Finding {
            severity: Severity::Info,
            message: format!(
                "Good chassis utilization: {:.0}% of GPU slots filled.",
                inputs.gpu_slot_utilization * 100.0
            ),
            remediation: None,
        });
    } else if inputs.gpu_slot_utilization < UTILIZATION_FLOOR {
        score -= 20.0;
        findings.push(Finding {
            severity: Severity::Warning,
            message: format!(
                "Very low chassis utilization ({:.0}% of GPU slots); most server capacity \
                 is paid for but idle.",
                inputs.gpu_slot_utilization * 100.0
            ),
            remediation: Some(
                "A smaller chassis (for example a 4-GPU server) would match the GPU count \
                 better."
                    .to_string(),
            ),
        });
    } else if inputs.gpu_slot_utilization < UTILIZATION_LOW {
        score -= 10.0;
        findings.push(Finding {
            severity: Severity::Recommendation,
            message: format!(
                "Low chassis utilization ({:.0}% of GPU slots).",
                inputs.gpu_slot_utilization * 100.0
            ),
            remediation: Some(
                "Consider fewer GPU slots per server or a higher-throughput load.".to_string(),
            ),
        });
    }

    // (d) Power per token/s of capacity.
    let power_per_token = inputs.total_power_kw / inputs.aggregate_tokens_per_sec;
    if power_per_token <= POWER_TARGET {
        score += 10.0;
        findings.push(Finding {
            severity: Severity::Info,
            message: format!("Energy-efficient: {power_per_token:.4} kW per token/s."),
            remediation: None,
        });
    } else if power_per_token > POWER_HIGH {
        let penalty = (8.0 * power_per_token / POWER_HIGH).min(20.0);
        score -= penalty;
        findings.push(Finding {
            severity: Severity::Warning,
            message: format!(
                "Power-hungry: {power_per_token:.4} kW per token/s (threshold {POWER_HIGH})."
            ),
            remediation: None,
        });
    }

    let degraded = findings
        .iter()
        .any(|f| matches!(f.severity, Severity::Critical | Severity::Warning));

    let mut label_suffix = "";
    if inputs.estimated {
        findings.push(Finding {
            severity: Severity::Info,
            message: "Throughput is extrapolated from a reference GPU, not measured."
                .to_string(),
            remediation: None,
        });
        if !degraded {
            score -= ESTIMATE_PENALTY;
            label_suffix = " (estimate)";
        }
    }

    let label = format!("{}{label_suffix}", label_for_score(score));
    finish(score, label, false, findings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vram_equality_is_feasible() {
        // 20B x 16 bit x 1.2 = 48 GB exactly.
        let cfg = Configuration {
            model_params_billion: 20.0,
            precision: Precision::Fp16,
            gpu_vram_gb: 48.0,
            ..Configuration::default()
        };
        assert!(check_model_fits_gpu(&cfg).is_none());

        let short = Configuration {
            gpu_vram_gb: 47.9,
            ..cfg
        };
        let err = check_model_fits_gpu(&short).unwrap();
        assert!(err.required_gb > err.available_gb);
        assert!(err.message.contains("48.0 GB"));
    }

    #[test]
    fn findings_sort_critical_first() {
        let mut findings = vec![
            Finding {
                severity: Severity::Recommendation,
                message: "r".into(),
                remediation: None,
            },
            Finding {
                severity: Severity::Critical,
                message: "c".into(),
                remediation: None,
            },
            Finding {
                severity: Severity::Warning,
                message: "w".into(),
                remediation: None,
            },
        ];
        findings.sort_by_key(|f| f.severity);
        let order: Vec<&str> = findings.iter().map(|f| f.message.as_str()).collect();
        assert_eq!(order, vec!["c", "w", "r"]);
    }
}
