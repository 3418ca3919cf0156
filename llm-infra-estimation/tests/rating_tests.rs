use llm_infra_estimation::config::{Configuration, Precision};
use llm_infra_estimation::rating::check_model_fits_gpu;
use llm_infra_estimation::sizing::evaluate;

#[test]
fn scenario_c_vram_shortfall_forces_failing_rating() {
    // A model needing ~80 GB at 16-bit on a 40 GB GPU.
    let mut cfg = Configuration::recommended();
    cfg.apply_gpu_preset("a100-40gb").unwrap();
    cfg.model_id = "llama2-70b".to_string();
    cfg.model_params_billion = 33.0;
    cfg.precision = Precision::Fp16;
    // Other parameters look healthy on purpose; the error must win anyway.
    cfg.tokens_per_sec_per_gpu = 60.0;

    let err = check_model_fits_gpu(&cfg).expect("shortfall must be detected");
    assert!(err.required_gb > 40.0);
    assert!(err.message.contains("GB short"));

    let results = evaluate(&cfg);
    assert!(results.vram_error.is_some());
    assert_eq!(results.rating.label, "VRAM error");
    assert!(results.rating.hard_failure);
    assert!(results.rating.score <= 10);
    // Computation of the other fields is not stopped by the error.
    assert!(results.required_gpus > 0);
    assert!(results.five_year_tco_usd > 0.0);
}

#[test]
fn vram_boundary_equality_is_feasible() {
    // 20B x 2 bytes x 1.2 = 48 GB exactly on a 48 GB GPU.
    let cfg = Configuration {
        model_params_billion: 20.0,
        precision: Precision::Fp16,
        gpu_vram_gb: 48.0,
        ..Configuration::default()
    };
    assert!(check_model_fits_gpu(&cfg).is_none());
}

#[test]
fn standard_network_warns_past_eight_gpus() {
    let mut cfg = Configuration::recommended();
    cfg.apply_network_preset("eth-100g").unwrap();
    cfg.tokens_per_sec_per_gpu = 60.0;
    cfg.concurrent_users = 10; // 500 tok/s -> 9 GPUs

    let results = evaluate(&cfg);
    assert_eq!(results.required_gpus, 9);
    assert!(
        results.warnings.iter().any(|w| w.contains("over 8 GPUs")),
        "expected an interconnect warning, got {:?}",
        results.warnings
    );
}

#[test]
fn hdr_network_warns_only_past_thirtytwo_gpus() {
    let mut cfg = Configuration::recommended();
    cfg.apply_network_preset("ib-hdr-200g").unwrap();
    cfg.tokens_per_sec_per_gpu = 60.0;
    cfg.concurrent_users = 24; // 1200 tok/s -> 20 GPUs

    let results = evaluate(&cfg);
    assert!(results.required_gpus > 8 && results.required_gpus <= 32);
    assert!(results.warnings.is_empty(), "got {:?}", results.warnings);

    cfg.concurrent_users = 100; // 5000 tok/s -> 84 GPUs
    let results = evaluate(&cfg);
    assert!(results.required_gpus > 32);
    assert!(results
        .warnings
        .iter()
        .any(|w| w.contains("top interconnect tier") || w.contains("NDR")));
}

#[test]
fn auto_selected_top_tier_raises_no_network_warning() {
    let mut cfg = Configuration::recommended();
    cfg.network_id.clear();
    cfg.network_cost_per_port_usd = 0.0;
    cfg.tokens_per_sec_per_gpu = 60.0; // 84 GPUs at 100 users

    let results = evaluate(&cfg);
    assert!(results.required_gpus > 32);
    assert_eq!(results.network_type, "InfiniBand NDR 400G");
    assert!(!results
        .warnings
        .iter()
        .any(|w| w.contains("interconnect") || w.contains("Ethernet")));
}

#[test]
fn ddr4_warns_on_large_clusters_only() {
    let mut cfg = Configuration::recommended();
    cfg.apply_ram_preset("ddr4-3200").unwrap();
    cfg.tokens_per_sec_per_gpu = 60.0; // 84 GPUs

    let results = evaluate(&cfg);
    assert!(results.warnings.iter().any(|w| w.contains("DDR4")));

    cfg.concurrent_users = 4; // 4 GPUs
    let results = evaluate(&cfg);
    assert!(!results.warnings.iter().any(|w| w.contains("DDR4")));
}

#[test]
fn priced_hardware_with_zero_throughput_is_non_functional() {
    // No model and no manual throughput, but agent traffic still incurs
    // external tool spend: cost without capacity.
    let cfg = Configuration {
        agent_mode: true,
        agent_request_percentage: 100.0,
        avg_agents_per_task: 2.0,
        avg_tool_calls_per_agent: 2.0,
        avg_external_tool_cost_usd: 0.002,
        ..Configuration::default()
    };
    let results = evaluate(&cfg);
    assert_eq!(results.aggregate_tokens_per_sec, 0.0);
    assert!(results.five_year_tco_usd > 0.0);
    assert_eq!(results.rating.label, "non-functional");
    assert!(results.rating.hard_failure);
}

#[test]
fn empty_scenario_is_inactive_not_failing() {
    let results = evaluate(&Configuration::default());
    assert_eq!(results.rating.label, "inactive");
    assert!(!results.rating.hard_failure);
    assert_eq!(results.rating.score, 30);
}

#[test]
fn extrapolated_performance_gets_estimate_label() {
    // Ascend 910B has no measured data for LLaMA 3 8B; throughput comes
    // from the relative-performance fallback.
    let mut cfg = Configuration::recommended();
    cfg.apply_gpu_preset("huawei-ascend910b").unwrap();
    cfg.tokens_per_sec_per_gpu = 0.0;

    let results = evaluate(&cfg);
    assert!(results.per_gpu_estimated);
    assert!(
        results.rating.label.ends_with("(estimate)"),
        "label was '{}'",
        results.rating.label
    );
}

#[test]
fn missing_benchmark_coverage_requires_clarification() {
    // Qwen3-235B INT4 fits in a 256 GB GPU but has no INT4 data anywhere.
    let mut cfg = Configuration::recommended();
    cfg.apply_model_preset("qwen3-235b-a22b").unwrap();
    cfg.apply_gpu_preset("amd-mi325x").unwrap();
    cfg.precision = Precision::Int4;
    cfg.tokens_per_sec_per_gpu = 0.0;

    let results = evaluate(&cfg);
    assert!(results.vram_error.is_none());
    assert_eq!(results.rating.label, "requires clarification");
    assert!(!results.rating.hard_failure);
    assert!(results.rating.score > 0, "moderate penalty, not zeroed");
}

#[test]
fn vram_error_remediation_names_workable_gpus() {
    let mut cfg = Configuration::recommended();
    cfg.apply_model_preset("llama3-70b").unwrap();
    cfg.apply_gpu_preset("l40s-48gb").unwrap();
    cfg.precision = Precision::Fp16; // 168 GB needed, 48 GB available

    let results = evaluate(&cfg);
    assert_eq!(results.rating.label, "VRAM error");
    let critical = &results.rating.findings[0];
    let remediation = critical.remediation.as_deref().unwrap_or_default();
    // MI300X (192 GB) and MI325X (256 GB) both fit and have data.
    assert!(
        remediation.contains("MI300X") || remediation.contains("MI325X"),
        "remediation was '{remediation}'"
    );
}
