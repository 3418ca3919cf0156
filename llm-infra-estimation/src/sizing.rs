//! Sizing and cost engine: GPU/server counts, CapEx, OpEx and TCO.
//!
//! `evaluate` is the whole pipeline: performance resolution, load model,
//! sizing, validation and rating. It is a total function of the
//! configuration and the static catalogs; every failure mode is a
//! structured result state, never a panic.

use serde::Serialize;

use crate::catalog::{NetworkTier, NETWORK_PRESETS};
use crate::config::Configuration;
use crate::load::{compute_load, LoadProfile};
use crate::perf::{estimate_tokens_per_sec, PerfEstimate};
use crate::rating::{self, Rating, RatingInputs, VramError};

/// Hard sanity ceiling on the GPU count; anything above it is reported
/// as an unrealistic configuration instead of being priced.
pub const MAX_REASONABLE_GPUS: f64 = 1_000_000.0;

/// Storage keeps several copies of the weights (versions, caches).
pub const STORAGE_MODEL_COPIES: f64 = 3.0;
/// Baseline per-server storage for datasets and logs, in GB.
pub const STORAGE_PER_SERVER_GB: f64 = 2000.0;
/// Recommended system RAM versus aggregate VRAM per server.
pub const RAM_VRAM_MULTIPLIER: f64 = 2.5;
/// Redundant network ports per server.
pub const PORTS_PER_SERVER: f64 = 2.0;
pub const TCO_YEARS: f64 = 5.0;
pub const HOURS_PER_YEAR: f64 = 24.0 * 365.0;

/// Division that treats a zero or non-finite denominator as yielding 0,
/// so bad inputs degrade instead of propagating NaN/Infinity.
pub fn safe_divide(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 || !denominator.is_finite() {
        0.0
    } else {
        numerator / denominator
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SizingStatus {
    /// Normal outcome.
    Sized,
    /// No direct or extrapolated throughput for the selected triple.
    CannotEstimate,
    /// GPU count non-finite or beyond the sanity ceiling.
    Unrealistic,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct CapexBreakdown {
    pub gpus_usd: f64,
    pub servers_usd: f64,
    pub network_usd: f64,
    pub storage_usd: f64,
    pub ram_usd: f64,
    pub total_usd: f64,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct OpexBreakdown {
    pub energy_usd: f64,
    pub maintenance_usd: f64,
    pub software_usd: f64,
    pub external_tools_usd: f64,
    pub total_usd: f64,
}

/// Full evaluation output, recomputed wholesale per call.
#[derive(Debug, Clone, Serialize)]
pub struct Results {
    pub status: SizingStatus,
    pub required_gpus: u64,
    pub servers_required: u64,
    pub gpu_slot_utilization: f64,
    pub per_gpu_tokens_per_sec: f64,
    pub per_gpu_estimated: bool,
    pub effective_tokens_per_sec_per_gpu: f64,
    pub aggregate_tokens_per_sec: f64,
    pub required_tokens_per_sec: f64,
    pub llm_calls_per_sec: f64,
    pub tool_calls_per_sec: f64,
    pub total_power_kw: f64,
    pub annual_energy_kwh: f64,
    pub model_size_gb: f64,
    pub storage_gb: f64,
    pub ram_per_server_gb: f64,
    pub network_type: String,
    pub capex: CapexBreakdown,
    pub opex: OpexBreakdown,
    pub five_year_tco_usd: f64,
    pub vram_error: Option<VramError>,
    pub warnings: Vec<String>,
    pub rating: Rating,
}

/// How the per-GPU throughput was (or was not) resolved.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PerfResolution {
    /// Caller supplied a manual tokens/sec figure.
    Manual(f64),
    /// Resolved from the performance matrix, directly or extrapolated.
    Resolved(PerfEstimate),
    /// A model is selected but no measurement or extrapolation exists.
    Unresolvable,
    /// No model selected and no manual figure: throughput is simply 0.
    Unconfigured,
}

pub fn resolve_per_gpu_perf(cfg: &Configuration) -> PerfResolution {
    if cfg.tokens_per_sec_per_gpu > 0.0 {
        return PerfResolution::Manual(cfg.tokens_per_sec_per_gpu);
    }
    if cfg.model_id.is_empty() {
        return PerfResolution::Unconfigured;
    }
    match estimate_tokens_per_sec(&cfg.model_id, &cfg.gpu_id, cfg.precision) {
        Some(est) => PerfResolution::Resolved(est),
        None => PerfResolution::Unresolvable,
    }
}

#[derive(Debug, Clone)]
pub struct ResolvedNetwork {
    pub name: String,
    pub tier: NetworkTier,
    pub cost_per_port_usd: f64,
}

/// Selected network preset, or a tier derived from cluster size when the
/// scenario names none (<=8 GPUs standard Ethernet, >8 HDR-class, >32
/// top-tier InfiniBand). An explicit per-port cost always wins.
pub fn resolve_network(cfg: &Configuration, required_gpus: u64) -> ResolvedNetwork {
    let preset = NETWORK_PRESETS.get(cfg.network_id.as_str()).map_or_else(
        || {
            let derived = if required_gpus > 32 {
                "ib-ndr-400g"
            } else if required_gpus > 8 {
                "ib-hdr-200g"
            } else {
                "eth-100g"
            };
            &NETWORK_PRESETS[derived]
        },
        |p| p,
    );
    let cost_per_port_usd = if cfg.network_cost_per_port_usd > 0.0 {
        cfg.network_cost_per_port_usd
    } else {
        preset.cost_per_port_usd
    };
    ResolvedNetwork {
        name: preset.name.to_string(),
        tier: preset.tier,
        cost_per_port_usd,
    }
}

fn calc_capex(
    cfg: &Configuration,
    required_gpus: u64,
    servers: u64,
    network: &ResolvedNetwork,
) -> (CapexBreakdown, f64, f64) {
    let gpus_f = required_gpus as f64;
    let servers_f = servers as f64;

    let gpus_usd = gpus_f * cfg.gpu_cost_usd;
    let servers_usd = servers_f * cfg.server_cost_usd;
    let network_usd = servers_f * PORTS_PER_SERVER * network.cost_per_port_usd;

    let storage_gb =
        STORAGE_MODEL_COPIES * cfg.model_size_gb() + servers_f * STORAGE_PER_SERVER_GB;
    let storage_usd = storage_gb * cfg.storage_cost_per_gb_usd;

    let ram_per_server_gb =
        cfg.gpu_vram_gb * f64::from(cfg.gpus_per_server) * RAM_VRAM_MULTIPLIER;
    let ram_usd = ram_per_server_gb * servers_f * cfg.ram_cost_per_gb_usd;

    let total_usd = gpus_usd + servers_usd + network_usd + storage_usd + ram_usd;
    (
        CapexBreakdown {
            gpus_usd,
            servers_usd,
            network_usd,
            storage_usd,
            ram_usd,
            total_usd,
        },
        storage_gb,
        ram_per_server_gb,
    )
}

fn calc_opex(
    cfg: &Configuration,
    required_gpus: u64,
    servers: u64,
    base_capex_usd: f64,
    annual_external_tool_cost_usd: f64,
) -> (OpexBreakdown, f64, f64) {
    let total_power_kw = required_gpus as f64 * cfg.gpu_power_kw
        + servers as f64 * cfg.server_power_overhead_kw;
    let annual_energy_kwh = total_power_kw * HOURS_PER_YEAR * cfg.pue;
    let energy_usd = annual_energy_kwh * cfg.electricity_usd_per_kwh;

    // Maintenance covers the base hardware (GPUs + servers) only.
    let maintenance_usd = base_capex_usd * cfg.annual_maintenance_rate;
    let software_usd = servers as f64 * cfg.software_annual_cost_per_server_usd;

    let total_usd = energy_usd + maintenance_usd + software_usd + annual_external_tool_cost_usd;
    (
        OpexBreakdown {
            energy_usd,
            maintenance_usd,
            software_usd,
            external_tools_usd: annual_external_tool_cost_usd,
            total_usd,
        },
        total_power_kw,
        annual_energy_kwh,
    )
}

fn short_circuit(
    cfg: &Configuration,
    status: SizingStatus,
    load: &LoadProfile,
    vram_error: Option<VramError>,
    warnings: Vec<String>,
) -> Results {
    let network = resolve_network(cfg, 0);
    let rating = rating::rate(
        cfg,
        &RatingInputs {
            status,
            five_year_tco_usd: 0.0,
            aggregate_tokens_per_sec: 0.0,
            total_power_kw: 0.0,
            gpu_slot_utilization: 0.0,
            estimated: false,
            vram_error: vram_error.as_ref(),
        },
    );
    Results {
        status,
        required_gpus: 0,
        servers_required: 0,
        gpu_slot_utilization: 0.0,
        per_gpu_tokens_per_sec: 0.0,
        per_gpu_estimated: false,
        effective_tokens_per_sec_per_gpu: 0.0,
        aggregate_tokens_per_sec: 0.0,
        required_tokens_per_sec: load.required_tokens_per_sec,
        llm_calls_per_sec: load.llm_calls_per_sec,
        tool_calls_per_sec: load.tool_calls_per_sec,
        total_power_kw: 0.0,
        annual_energy_kwh: 0.0,
        model_size_gb: cfg.model_size_gb(),
        storage_gb: 0.0,
        ram_per_server_gb: 0.0,
        network_type: network.name,
        capex: CapexBreakdown::default(),
        opex: OpexBreakdown::default(),
        five_year_tco_usd: 0.0,
        vram_error,
        warnings,
        rating,
    }
}

/// Run the full pipeline for one scenario.
pub fn evaluate(cfg: &Configuration) -> Results {
    let load = compute_load(cfg);
    let vram_error = rating::check_model_fits_gpu(cfg);

    let (per_gpu_tokens_per_sec, per_gpu_estimated) = match resolve_per_gpu_perf(cfg) {
        PerfResolution::Manual(v) => (v, false),
        PerfResolution::Resolved(est) => (est.tokens_per_sec, est.estimated),
        PerfResolution::Unconfigured => (0.0, false),
        PerfResolution::Unresolvable => {
            let warning = format!(
                "Cannot estimate performance for model '{}' on GPU '{}' at {}: no direct or \
                 extrapolated data. Sizing figures are zeroed.",
                cfg.model_id,
                if cfg.gpu_id.is_empty() { "<none>" } else { &cfg.gpu_id },
                cfg.precision.label()
            );
            log::debug!("{warning}");
            return short_circuit(
                cfg,
                SizingStatus::CannotEstimate,
                &load,
                vram_error,
                vec![warning],
            );
        }
    };

    let effective_per_gpu = per_gpu_tokens_per_sec * cfg.batching_factor;
    let raw_gpus = safe_divide(load.required_tokens_per_sec, effective_per_gpu).ceil();
    if !raw_gpus.is_finite() || raw_gpus > MAX_REASONABLE_GPUS {
        let warning = format!(
            "Unrealistic configuration: {raw_gpus:.0} GPUs would be required (ceiling is \
             {MAX_REASONABLE_GPUS:.0}). Cost figures are zeroed."
        );
        log::debug!("{warning}");
        return short_circuit(
            cfg,
            SizingStatus::Unrealistic,
            &load,
            vram_error,
            vec![warning],
        );
    }

    let required_gpus = raw_gpus as u64;
    let servers_required = safe_divide(raw_gpus, f64::from(cfg.gpus_per_server)).ceil() as u64;
    let gpu_slot_utilization = safe_divide(
        raw_gpus,
        servers_required as f64 * f64::from(cfg.gpus_per_server),
    );

    let network = resolve_network(cfg, required_gpus);
    let (capex, storage_gb, ram_per_server_gb) =
        calc_capex(cfg, required_gpus, servers_required, &network);
    let base_capex_usd = capex.gpus_usd + capex.servers_usd;
    let (opex, total_power_kw, annual_energy_kwh) = calc_opex(
        cfg,
        required_gpus,
        servers_required,
        base_capex_usd,
        load.annual_external_tool_cost_usd,
    );
    let five_year_tco_usd = capex.total_usd + TCO_YEARS * opex.total_usd;
    let aggregate_tokens_per_sec = required_gpus as f64 * effective_per_gpu;

    let warnings = rating::config_warnings(cfg, required_gpus, network.tier);
    if let Some(err) = &vram_error {
        log::debug!("VRAM feasibility failed: {}", err.message);
    }

    let rating = rating::rate(
        cfg,
        &RatingInputs {
            status: SizingStatus::Sized,
            five_year_tco_usd,
            aggregate_tokens_per_sec,
            total_power_kw,
            gpu_slot_utilization,
            estimated: per_gpu_estimated,
            vram_error: vram_error.as_ref(),
        },
    );

    Results {
        status: SizingStatus::Sized,
        required_gpus,
        servers_required,
        gpu_slot_utilization,
        per_gpu_tokens_per_sec,
        per_gpu_estimated,
        effective_tokens_per_sec_per_gpu: effective_per_gpu,
        aggregate_tokens_per_sec,
        required_tokens_per_sec: load.required_tokens_per_sec,
        llm_calls_per_sec: load.llm_calls_per_sec,
        tool_calls_per_sec: load.tool_calls_per_sec,
        total_power_kw,
        annual_energy_kwh,
        model_size_gb: cfg.model_size_gb(),
        storage_gb,
        ram_per_server_gb,
        network_type: network.name,
        capex,
        opex,
        five_year_tco_usd,
        vram_error,
        warnings,
        rating,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_divide_handles_bad_denominators() {
        assert_eq!(safe_divide(10.0, 0.0), 0.0);
        assert_eq!(safe_divide(10.0, f64::NAN), 0.0);
        assert_eq!(safe_divide(10.0, f64::INFINITY), 0.0);
        assert_eq!(safe_divide(10.0, 4.0), 2.5);
        assert_eq!(safe_divide(-9.0, 3.0), -3.0);
    }

    #[test]
    fn counts_are_integer_ceilings() {
        let cfg = Configuration {
            concurrent_users: 100,
            tokens_per_request: 100,
            response_time_sec: 2.0,
            tokens_per_sec_per_gpu: 60.0,
            gpus_per_server: 8,
            ..Configuration::default()
        };
        let results = evaluate(&cfg);
        // 5000 / 60 = 83.33 -> 84 GPUs, 84 / 8 = 10.5 -> 11 servers.
        assert_eq!(results.required_gpus, 84);
        assert_eq!(results.servers_required, 11);
    }

    #[test]
    fn zero_gpus_per_server_yields_zero_servers() {
        let cfg = Configuration {
            tokens_per_sec_per_gpu: 60.0,
            gpus_per_server: 0,
            ..Configuration::default()
        };
        let results = evaluate(&cfg);
        assert!(results.required_gpus > 0);
        assert_eq!(results.servers_required, 0);
    }
}
