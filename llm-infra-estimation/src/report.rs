//! Presentation helpers: prettytable views of results, catalogs and
//! search output, plus a plain-text technical report.

use fancy_regex::Regex;
use prettytable::{row, Table};

use crate::catalog::{
    NetworkTier, GPU_PRESETS, MODEL_PRESETS, NETWORK_PRESETS, RAM_PRESETS, SERVER_PRESETS,
    SOFTWARE_PRESETS, STORAGE_PRESETS,
};
use crate::commands::SortBy;
use crate::config::Configuration;
use crate::search::{SearchOutcome, SearchStatus};
use crate::sizing::{Results, SizingStatus};

/// Insert thousands separators into the integral part of a number.
pub fn format_thousands(value: f64) -> String {
    let whole = format!("{value:.0}");
    let re = Regex::new(r"(?<=\d)(?=(\d{3})+$)").unwrap();
    re.replace_all(&whole, ",").to_string()
}

pub fn format_usd(value: f64) -> String {
    format!("${}", format_thousands(value))
}

fn check_mark(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

fn tier_name(tier: NetworkTier) -> &'static str {
    match tier {
        NetworkTier::Standard => "standard",
        NetworkTier::HighBandwidth => "high-bandwidth",
        NetworkTier::Top => "top",
    }
}

pub fn results_table(results: &Results) -> Table {
    let mut table = Table::new();
    table.add_row(row!["Metric", "Value"]);

    let per_gpu = if results.per_gpu_estimated {
        format!("{:.0} (extrapolated)", results.per_gpu_tokens_per_sec)
    } else {
        format!("{:.0}", results.per_gpu_tokens_per_sec)
    };

    table.add_row(row!["Required GPUs", format_thousands(results.required_gpus as f64)]);
    table.add_row(row![
        "Servers required",
        format_thousands(results.servers_required as f64)
    ]);
    table.add_row(row![
        "GPU slot utilization",
        format!("{:.0}%", results.gpu_slot_utilization * 100.0)
    ]);
    table.add_row(row!["Tokens/sec per GPU", per_gpu]);
    table.add_row(row![
        "Effective tokens/sec per GPU",
        format!("{:.0}", results.effective_tokens_per_sec_per_gpu)
    ]);
    table.add_row(row![
        "Required throughput (tok/s)",
        format_thousands(results.required_tokens_per_sec)
    ]);
    table.add_row(row![
        "Deployed throughput (tok/s)",
        format_thousands(results.aggregate_tokens_per_sec)
    ]);
    table.add_row(row![
        "LLM calls/sec",
        format!("{:.2}", results.llm_calls_per_sec)
    ]);
    table.add_row(row![
        "Tool calls/sec",
        format!("{:.2}", results.tool_calls_per_sec)
    ]);
    table.add_row(row![
        "Total power (kW)",
        format!("{:.1}", results.total_power_kw)
    ]);
    table.add_row(row![
        "Annual energy (kWh)",
        format_thousands(results.annual_energy_kwh)
    ]);
    table.add_row(row![
        "Model size (GB)",
        format!("{:.1}", results.model_size_gb)
    ]);
    table.add_row(row!["Storage (GB)", format_thousands(results.storage_gb)]);
    table.add_row(row![
        "RAM per server (GB)",
        format_thousands(results.ram_per_server_gb)
    ]);
    table.add_row(row!["Network", results.network_type.clone()]);

    table.add_row(row!["CapEx: GPUs", format_usd(results.capex.gpus_usd)]);
    table.add_row(row!["CapEx: servers", format_usd(results.capex.servers_usd)]);
    table.add_row(row!["CapEx: network", format_usd(results.capex.network_usd)]);
    table.add_row(row!["CapEx: storage", format_usd(results.capex.storage_usd)]);
    table.add_row(row!["CapEx: RAM", format_usd(results.capex.ram_usd)]);
    table.add_row(row!["CapEx: total", format_usd(results.capex.total_usd)]);

    table.add_row(row!["OpEx: energy", format_usd(results.opex.energy_usd)]);
    table.add_row(row![
        "OpEx: maintenance",
        format_usd(results.opex.maintenance_usd)
    ]);
    table.add_row(row!["OpEx: software", format_usd(results.opex.software_usd)]);
    table.add_row(row![
        "OpEx: external tools",
        format_usd(results.opex.external_tools_usd)
    ]);
    table.add_row(row!["OpEx: total (annual)", format_usd(results.opex.total_usd)]);

    table.add_row(row!["5-year TCO", format_usd(results.five_year_tco_usd)]);
    table.add_row(row![
        "Rating",
        format!("{}/100 ({})", results.rating.score, results.rating.label)
    ]);
    table
}

pub fn models_table(sort: SortBy) -> Table {
    let mut entries: Vec<_> = MODEL_PRESETS.iter().collect();
    entries.sort_by(|a, b| match sort {
        SortBy::Name => a.0.cmp(b.0),
        SortBy::Cost | SortBy::Capacity => b
            .1
            .params_billion
            .total_cmp(&a.1.params_billion)
            .then(a.0.cmp(b.0)),
    });

    let mut table = Table::new();
    table.add_row(row![
        "Key",
        "Model",
        "Params (B)",
        "Baseline tok/s",
        "Tool calls",
        "Recommended"
    ]);
    for (key, preset) in entries {
        table.add_row(row![
            key,
            preset.name,
            format!("{:.1}", preset.params_billion),
            format!("{:.0}", preset.tokens_per_sec),
            check_mark(preset.supports_tool_calls),
            check_mark(preset.recommended)
        ]);
    }
    table
}

pub fn gpus_table(sort: SortBy) -> Table {
    let mut entries: Vec<_> = GPU_PRESETS.iter().collect();
    entries.sort_by(|a, b| match sort {
        SortBy::Name => a.0.cmp(b.0),
        SortBy::Cost => a.1.cost_usd.total_cmp(&b.1.cost_usd).then(a.0.cmp(b.0)),
        SortBy::Capacity => b.1.vram_gb.total_cmp(&a.1.vram_gb).then(a.0.cmp(b.0)),
    });

    let mut table = Table::new();
    table.add_row(row![
        "Key",
        "GPU",
        "Cost",
        "Power (kW)",
        "VRAM (GB)",
        "Recommended"
    ]);
    for (key, preset) in entries {
        table.add_row(row![
            key,
            preset.name,
            format_usd(preset.cost_usd),
            format!("{:.2}", preset.power_kw),
            format!("{:.0}", preset.vram_gb),
            check_mark(preset.recommended)
        ]);
    }
    table
}

pub fn servers_table(sort: SortBy) -> Table {
    let mut entries: Vec<_> = SERVER_PRESETS.iter().collect();
    entries.sort_by(|a, b| match sort {
        SortBy::Name => a.0.cmp(b.0),
        SortBy::Cost => a.1.cost_usd.total_cmp(&b.1.cost_usd).then(a.0.cmp(b.0)),
        SortBy::Capacity => b.1.gpu_slots.cmp(&a.1.gpu_slots).then(a.0.cmp(b.0)),
    });

    let mut table = Table::new();
    table.add_row(row![
        "Key",
        "Server",
        "Cost (excl. GPUs)",
        "Power overhead (kW)",
        "GPU slots",
        "Recommended"
    ]);
    for (key, preset) in entries {
        table.add_row(row![
            key,
            preset.name,
            format_usd(preset.cost_usd),
            format!("{:.2}", preset.power_overhead_kw),
            preset.gpu_slots,
            check_mark(preset.recommended)
        ]);
    }
    table
}

pub fn networks_table(sort: SortBy) -> Table {
    let mut entries: Vec<_> = NETWORK_PRESETS.iter().collect();
    entries.sort_by(|a, b| match sort {
        SortBy::Name | SortBy::Capacity => a.0.cmp(b.0),
        SortBy::Cost => a
            .1
            .cost_per_port_usd
            .total_cmp(&b.1.cost_per_port_usd)
            .then(a.0.cmp(b.0)),
    });

    let mut table = Table::new();
    table.add_row(row!["Key", "Network", "Cost/port", "Tier", "Recommended"]);
    for (key, preset) in entries {
        table.add_row(row![
            key,
            preset.name,
            format_usd(preset.cost_per_port_usd),
            tier_name(preset.tier),
            check_mark(preset.recommended)
        ]);
    }
    table
}

pub fn storage_table(sort: SortBy) -> Table {
    let mut entries: Vec<_> = STORAGE_PRESETS.iter().collect();
    entries.sort_by(|a, b| match sort {
        SortBy::Name | SortBy::Capacity => a.0.cmp(b.0),
        SortBy::Cost => a
            .1
            .cost_per_gb_usd
            .total_cmp(&b.1.cost_per_gb_usd)
            .then(a.0.cmp(b.0)),
    });

    let mut table = Table::new();
    table.add_row(row!["Key", "Storage", "Cost/GB", "Recommended"]);
    for (key, preset) in entries {
        table.add_row(row![
            key,
            preset.name,
            format!("${:.2}", preset.cost_per_gb_usd),
            check_mark(preset.recommended)
        ]);
    }
    table
}

pub fn ram_table(sort: SortBy) -> Table {
    let mut entries: Vec<_> = RAM_PRESETS.iter().collect();
    entries.sort_by(|a, b| match sort {
        SortBy::Name | SortBy::Capacity => a.0.cmp(b.0),
        SortBy::Cost => a
            .1
            .cost_per_gb_usd
            .total_cmp(&b.1.cost_per_gb_usd)
            .then(a.0.cmp(b.0)),
    });

    let mut table = Table::new();
    table.add_row(row!["Key", "RAM", "Cost/GB", "Recommended"]);
    for (key, preset) in entries {
        table.add_row(row![
            key,
            preset.name,
            format!("${:.2}", preset.cost_per_gb_usd),
            check_mark(preset.recommended)
        ]);
    }
    table
}

pub fn software_table(sort: SortBy) -> Table {
    let mut entries: Vec<_> = SOFTWARE_PRESETS.iter().collect();
    entries.sort_by(|a, b| match sort {
        SortBy::Name | SortBy::Capacity => a.0.cmp(b.0),
        SortBy::Cost => a
            .1
            .annual_cost_per_server_usd
            .total_cmp(&b.1.annual_cost_per_server_usd)
            .then(a.0.cmp(b.0)),
    });

    let mut table = Table::new();
    table.add_row(row!["Key", "Software", "Annual cost/server", "Recommended"]);
    for (key, preset) in entries {
        table.add_row(row![
            key,
            preset.name,
            format_usd(preset.annual_cost_per_server_usd),
            check_mark(preset.recommended)
        ]);
    }
    table
}

pub fn search_table(outcome: &SearchOutcome) -> Table {
    let mut table = Table::new();
    table.add_row(row![
        "#",
        "GPU",
        "Precision",
        "Server",
        "GPUs",
        "Servers",
        "5-year TCO",
        "Rating"
    ]);
    for (i, hit) in outcome.hits.iter().enumerate() {
        table.add_row(row![
            i + 1,
            hit.gpu_id,
            hit.precision.label(),
            hit.server_id,
            hit.results.required_gpus,
            hit.results.servers_required,
            format_usd(hit.results.five_year_tco_usd),
            format!("{}/100 ({})", hit.results.rating.score, hit.results.rating.label)
        ]);
    }
    table
}

pub fn search_status_line(outcome: &SearchOutcome) -> String {
    match outcome.status {
        SearchStatus::FoundAcceptable => format!(
            "Found {} configuration(s) ({} evaluated, {} pruned).",
            outcome.hits.len(),
            outcome.combinations_evaluated,
            outcome.combinations_pruned
        ),
        SearchStatus::FoundSuboptimal => format!(
            "Found {} configuration(s), but none meets the efficiency threshold; these are \
             merely the cheapest available ({} evaluated, {} pruned).",
            outcome.hits.len(),
            outcome.combinations_evaluated,
            outcome.combinations_pruned
        ),
        SearchStatus::NoneFound => format!(
            "No workable configuration found ({} evaluated, {} pruned).",
            outcome.combinations_evaluated,
            outcome.combinations_pruned
        ),
    }
}

/// Plain-text report covering inputs, sizing, costs and the rating.
pub fn technical_report(cfg: &Configuration, results: &Results) -> String {
    let mut out = String::new();
    let date = chrono::Local::now().format("%d/%m/%Y");

    out.push_str(&format!(
        "LLM INFRASTRUCTURE SIZING REPORT ({date})\n\
         =========================================\n\n"
    ));

    out.push_str("Scenario\n--------\n");
    let model_name = MODEL_PRESETS
        .get(cfg.model_id.as_str())
        .map_or("manual entry", |m| m.name);
    let gpu_name = GPU_PRESETS
        .get(cfg.gpu_id.as_str())
        .map_or("manual entry", |g| g.name);
    out.push_str(&format!(
        "Model: {model_name} ({}B params, {}-bit)\n",
        cfg.model_params_billion,
        cfg.precision.bits()
    ));
    out.push_str(&format!("GPU: {gpu_name}\n"));
    out.push_str(&format!(
        "Load: {} concurrent users, {} tokens/request, {}s target response\n",
        cfg.concurrent_users, cfg.tokens_per_request, cfg.response_time_sec
    ));
    if cfg.agent_mode {
        out.push_str(&format!(
            "Agent mode: {}% of requests, {} agents/task, {} LLM calls/agent, {} tool \
             calls/agent\n",
            cfg.agent_request_percentage,
            cfg.avg_agents_per_task,
            cfg.avg_llm_calls_per_agent,
            cfg.avg_tool_calls_per_agent
        ));
    }
    out.push_str(&format!("Batching factor: {}x\n\n", cfg.batching_factor));

    if let Some(err) = &results.vram_error {
        out.push_str(&format!("FEASIBILITY ERROR\n-----------------\n{}\n\n", err.message));
    }

    if results.status == SizingStatus::Sized {
        out.push_str("Sizing\n------\n");
        out.push_str(&format!(
            "{} GPUs across {} servers ({} network)\n",
            results.required_gpus, results.servers_required, results.network_type
        ));
        out.push_str(&format!(
            "Throughput: {} tok/s deployed vs {} tok/s required\n",
            format_thousands(results.aggregate_tokens_per_sec),
            format_thousands(results.required_tokens_per_sec)
        ));
        out.push_str(&format!(
            "Power: {:.1} kW, {} kWh/year\n\n",
            results.total_power_kw,
            format_thousands(results.annual_energy_kwh)
        ));

        out.push_str("Costs\n-----\n");
        out.push_str(&format!(
            "CapEx {} (GPUs {}, servers {}, network {}, storage {}, RAM {})\n",
            format_usd(results.capex.total_usd),
            format_usd(results.capex.gpus_usd),
            format_usd(results.capex.servers_usd),
            format_usd(results.capex.network_usd),
            format_usd(results.capex.storage_usd),
            format_usd(results.capex.ram_usd)
        ));
        out.push_str(&format!(
            "Annual OpEx {} (energy {}, maintenance {}, software {}, tools {})\n",
            format_usd(results.opex.total_usd),
            format_usd(results.opex.energy_usd),
            format_usd(results.opex.maintenance_usd),
            format_usd(results.opex.software_usd),
            format_usd(results.opex.external_tools_usd)
        ));
        out.push_str(&format!("5-year TCO {}\n\n", format_usd(results.five_year_tco_usd)));
    }

    out.push_str(&format!(
        "Rating: {}/100 ({})\n",
        results.rating.score, results.rating.label
    ));
    if !results.rating.explanation.is_empty() {
        out.push_str(&format!("{}\n", results.rating.explanation));
    }
    if !results.warnings.is_empty() {
        out.push_str("\nWarnings\n--------\n");
        for warning in &results.warnings {
            out.push_str(&format!("- {warning}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousands_separator() {
        assert_eq!(format_thousands(1234567.0), "1,234,567");
        assert_eq!(format_thousands(999.0), "999");
        assert_eq!(format_thousands(0.0), "0");
        assert_eq!(format_usd(2500000.0), "$2,500,000");
    }
}
