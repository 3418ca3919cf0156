use llm_infra_estimation::config::{Configuration, Precision};
use llm_infra_estimation::sizing::{evaluate, SizingStatus};

/// Fully manual scenario used by the cost-formula tests: 100 users,
/// 100 tokens/request, 2 s target, 60 tok/s per GPU.
fn manual_scenario() -> Configuration {
    Configuration {
        model_params_billion: 70.0,
        concurrent_users: 100,
        tokens_per_request: 100,
        response_time_sec: 2.0,
        tokens_per_sec_per_gpu: 60.0,
        gpus_per_server: 8,
        gpu_cost_usd: 15000.0,
        gpu_power_kw: 0.4,
        gpu_vram_gb: 80.0,
        server_cost_usd: 85000.0,
        server_power_overhead_kw: 1.5,
        ..Configuration::default()
    }
}

#[test]
fn scenario_a_required_gpus() {
    let results = evaluate(&manual_scenario());
    // 100 x 100 / 2 = 5000 tok/s, ceil(5000 / 60) = 84 GPUs.
    assert_eq!(results.required_tokens_per_sec, 5000.0);
    assert_eq!(results.required_gpus, 84);
    assert_eq!(results.servers_required, 11);
}

#[test]
fn scenario_b_batching_factor_scales_per_gpu_throughput() {
    let cfg = Configuration {
        batching_factor: 3.0,
        ..manual_scenario()
    };
    let results = evaluate(&cfg);
    assert_eq!(results.effective_tokens_per_sec_per_gpu, 180.0);
    assert_eq!(results.required_gpus, 28);
}

#[test]
fn scenario_d_agentic_load() {
    let cfg = Configuration {
        concurrent_users: 10,
        tokens_per_request: 100,
        response_time_sec: 5.0,
        agent_mode: true,
        agent_request_percentage: 100.0,
        avg_agents_per_task: 2.0,
        avg_llm_calls_per_agent: 3.0,
        avg_agent_llm_tokens: 1000.0,
        tokens_per_sec_per_gpu: 60.0,
        ..Configuration::default()
    };
    let results = evaluate(&cfg);
    assert_eq!(results.required_tokens_per_sec, 12200.0);
    assert_eq!(results.llm_calls_per_sec, 14.0);
}

#[test]
fn tco_identity_holds() {
    for cfg in [manual_scenario(), Configuration::recommended()] {
        let results = evaluate(&cfg);
        assert_eq!(
            results.five_year_tco_usd,
            results.capex.total_usd + 5.0 * results.opex.total_usd,
            "TCO must equal CapEx + 5 x annual OpEx"
        );
    }
}

#[test]
fn more_users_never_cost_less() {
    let mut previous_gpus = 0;
    let mut previous_tco = 0.0;
    for users in [10, 50, 100, 500, 1000, 5000] {
        let cfg = Configuration {
            concurrent_users: users,
            ..manual_scenario()
        };
        let results = evaluate(&cfg);
        assert!(
            results.required_gpus >= previous_gpus,
            "GPU count dropped from {previous_gpus} to {} at {users} users",
            results.required_gpus
        );
        assert!(
            results.five_year_tco_usd >= previous_tco,
            "TCO dropped at {users} users"
        );
        previous_gpus = results.required_gpus;
        previous_tco = results.five_year_tco_usd;
    }
}

#[test]
fn capex_breakdown_follows_the_sizing_formulas() {
    let cfg = manual_scenario();
    let results = evaluate(&cfg);

    assert_eq!(results.capex.gpus_usd, 84.0 * 15000.0);
    assert_eq!(results.capex.servers_usd, 11.0 * 85000.0);

    // 84 GPUs > 32 forces the top interconnect tier at $4000/port.
    assert_eq!(results.network_type, "InfiniBand NDR 400G");
    assert_eq!(results.capex.network_usd, 11.0 * 2.0 * 4000.0);

    // 70B fp16 weights are 140 GB; 3 copies + 2 TB per server.
    assert_eq!(results.model_size_gb, 140.0);
    assert_eq!(results.storage_gb, 3.0 * 140.0 + 11.0 * 2000.0);
    assert_eq!(results.capex.storage_usd, results.storage_gb * 0.15);

    // RAM is 2.5x aggregate VRAM per server.
    assert_eq!(results.ram_per_server_gb, 80.0 * 8.0 * 2.5);
    assert_eq!(results.capex.ram_usd, 1600.0 * 11.0 * 10.0);

    let sum = results.capex.gpus_usd
        + results.capex.servers_usd
        + results.capex.network_usd
        + results.capex.storage_usd
        + results.capex.ram_usd;
    assert_eq!(results.capex.total_usd, sum);
}

#[test]
fn opex_uses_pue_and_base_capex_maintenance() {
    let cfg = manual_scenario();
    let results = evaluate(&cfg);

    let power = 84.0 * 0.4 + 11.0 * 1.5;
    assert!((results.total_power_kw - power).abs() < 1e-9);
    assert!((results.annual_energy_kwh - power * 24.0 * 365.0 * 1.3).abs() < 1e-6);
    assert!(
        (results.opex.energy_usd - results.annual_energy_kwh * 0.08).abs() < 1e-6,
        "energy cost must be kWh x tariff"
    );
    // Maintenance is charged on GPU + server CapEx only, not on
    // network/storage/RAM.
    assert_eq!(
        results.opex.maintenance_usd,
        (results.capex.gpus_usd + results.capex.servers_usd) * 0.05
    );
}

#[test]
fn external_tool_cost_feeds_opex() {
    let cfg = Configuration {
        agent_mode: true,
        agent_request_percentage: 100.0,
        avg_external_tool_cost_usd: 0.002,
        ..manual_scenario()
    };
    let results = evaluate(&cfg);
    assert!(results.tool_calls_per_sec > 0.0);
    let expected = results.tool_calls_per_sec * 0.002 * 365.0 * 24.0 * 3600.0;
    assert!((results.opex.external_tools_usd - expected).abs() < 1e-6);
    assert!(results.opex.total_usd >= results.opex.external_tools_usd);
}

#[test]
fn small_cluster_keeps_standard_ethernet() {
    let cfg = Configuration {
        concurrent_users: 4,
        ..manual_scenario()
    };
    let results = evaluate(&cfg);
    // 4 x 100 / 2 = 200 tok/s -> 4 GPUs: standard tier is fine.
    assert_eq!(results.required_gpus, 4);
    assert_eq!(results.network_type, "Ethernet 100GbE");
    assert_eq!(results.capex.network_usd, 1.0 * 2.0 * 500.0);
}

#[test]
fn unrealistic_sizing_zeroes_cost_figures() {
    let cfg = Configuration {
        concurrent_users: 1_000_000,
        tokens_per_request: 1000,
        response_time_sec: 1.0,
        tokens_per_sec_per_gpu: 0.001,
        ..manual_scenario()
    };
    let results = evaluate(&cfg);
    assert_eq!(results.status, SizingStatus::Unrealistic);
    assert_eq!(results.required_gpus, 0);
    assert_eq!(results.capex.total_usd, 0.0);
    assert_eq!(results.five_year_tco_usd, 0.0);
    assert!(results
        .warnings
        .iter()
        .any(|w| w.contains("Unrealistic configuration")));
}

#[test]
fn unresolvable_performance_short_circuits() {
    // Qwen3-235B has no INT4 measurement anywhere, so neither direct
    // lookup nor extrapolation can produce a figure.
    let mut cfg = Configuration::recommended();
    cfg.apply_model_preset("qwen3-235b-a22b").unwrap();
    cfg.apply_gpu_preset("amd-mi325x").unwrap();
    cfg.precision = Precision::Int4;
    cfg.tokens_per_sec_per_gpu = 0.0;

    let results = evaluate(&cfg);
    assert_eq!(results.status, SizingStatus::CannotEstimate);
    assert_eq!(results.required_gpus, 0);
    assert_eq!(results.five_year_tco_usd, 0.0);
    assert!(results
        .warnings
        .iter()
        .any(|w| w.contains("Cannot estimate performance")));
}

#[test]
fn recommended_defaults_evaluate_cleanly() {
    let cfg = Configuration::recommended();
    assert_eq!(cfg.model_id, "llama3-8b");
    let results = evaluate(&cfg);
    assert_eq!(results.status, SizingStatus::Sized);
    assert!(results.required_gpus > 0);
    assert!(results.vram_error.is_none());
    assert!(!results.per_gpu_estimated, "recommended pair has measured data");
    assert!(results.five_year_tco_usd > 0.0);
}

#[test]
fn agent_mode_is_refused_for_models_without_tool_calls() {
    let mut cfg = Configuration::recommended();
    cfg.apply_model_preset("llama2-7b").unwrap();
    assert!(cfg.enable_agent_mode().is_err());
    assert!(!cfg.agent_mode);

    cfg.apply_model_preset("llama3-8b").unwrap();
    assert!(cfg.enable_agent_mode().is_ok());
    assert!(cfg.agent_mode);

    // Switching to a non-tool-call model drops the flag again.
    cfg.apply_model_preset("yi-34b").unwrap();
    assert!(!cfg.agent_mode);
}
