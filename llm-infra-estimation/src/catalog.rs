//! Static reference catalogs: models, GPUs, servers, network, storage,
//! RAM and software presets.
//!
//! Catalogs are loaded once and never mutated. The `recommended` flag on
//! an entry is only used when picking defaults, never in a calculation.

use once_cell::sync::Lazy;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct ModelPreset {
    pub name: &'static str,
    pub params_billion: f64,
    /// Baseline throughput on the reference GPU, shown in listings.
    pub tokens_per_sec: f64,
    pub supports_tool_calls: bool,
    pub recommended: bool,
}

#[derive(Debug, Clone)]
pub struct GpuPreset {
    pub name: &'static str,
    pub cost_usd: f64,
    pub power_kw: f64,
    pub vram_gb: f64,
    pub recommended: bool,
}

#[derive(Debug, Clone)]
pub struct ServerPreset {
    pub name: &'static str,
    pub cost_usd: f64,
    pub power_overhead_kw: f64,
    pub gpu_slots: u32,
    pub recommended: bool,
}

/// Interconnect tiers, ordered by bandwidth class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum NetworkTier {
    Standard,
    HighBandwidth,
    Top,
}

#[derive(Debug, Clone)]
pub struct NetworkPreset {
    pub name: &'static str,
    pub cost_per_port_usd: f64,
    pub tier: NetworkTier,
    pub recommended: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RamGeneration {
    Ddr4,
    Ddr5,
    Ddr5HighSpeed,
}

#[derive(Debug, Clone)]
pub struct RamPreset {
    pub name: &'static str,
    pub cost_per_gb_usd: f64,
    pub generation: RamGeneration,
    pub recommended: bool,
}

#[derive(Debug, Clone)]
pub struct StoragePreset {
    pub name: &'static str,
    pub cost_per_gb_usd: f64,
    pub recommended: bool,
}

#[derive(Debug, Clone)]
pub struct SoftwarePreset {
    pub name: &'static str,
    pub annual_cost_per_server_usd: f64,
    pub recommended: bool,
}

pub static MODEL_PRESETS: Lazy<HashMap<&'static str, ModelPreset>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut add = |key, name, params_billion, tokens_per_sec, supports_tool_calls, recommended| {
        m.insert(
            key,
            ModelPreset {
                name,
                params_billion,
                tokens_per_sec,
                supports_tool_calls,
                recommended,
            },
        );
    };
    add("llama2-7b", "LLaMA 2 7B", 7.0, 64.0, false, false);
    add("llama2-13b", "LLaMA 2 13B", 13.0, 37.0, false, false);
    add("llama2-70b", "LLaMA 2 70B", 70.0, 22.0, false, false);
    add("llama3-8b", "LLaMA 3 8B", 8.0, 1400.0, true, true);
    add("llama3-70b", "LLaMA 3 70B", 70.0, 675.0, true, false);
    add("mixtral-8x7b", "Mixtral 8x7B", 46.7, 5800.0, true, false);
    add("qwen-72b", "Qwen 72B", 72.0, 35.0, false, false);
    add("qwen2-72b", "Qwen2 72B", 72.0, 31.0, true, false);
    add("qwen2.5-72b", "Qwen2.5 72B", 72.7, 63.0, true, false);
    add("qwen3-235b-a22b", "Qwen3 235B-A22B (MoE)", 235.0, 650.0, true, false);
    add("deepseek-67b", "DeepSeek 67B", 67.0, 12.5, false, false);
    add("deepseek-v3-671b", "DeepSeek V3 671B (MoE)", 671.0, 60.0, true, false);
    add("yi-34b", "Yi 34B", 34.0, 21.3, false, false);
    add("qwq-32b", "QwQ 32B", 32.5, 12.3, true, false);
    m
});

pub static GPU_PRESETS: Lazy<HashMap<&'static str, GpuPreset>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut add = |key, name, cost_usd, power_kw, vram_gb, recommended| {
        m.insert(
            key,
            GpuPreset {
                name,
                cost_usd,
                power_kw,
                vram_gb,
                recommended,
            },
        );
    };
    add("a100-80gb", "NVIDIA A100 80GB", 15000.0, 0.4, 80.0, true);
    add("a100-40gb", "NVIDIA A100 40GB", 10000.0, 0.4, 40.0, false);
    add("h100-80gb", "NVIDIA H100 80GB", 35000.0, 0.7, 80.0, true);
    add("h200-141gb", "NVIDIA H200", 45000.0, 0.7, 141.0, true);
    add("b200-hbm3e", "NVIDIA B200", 45000.0, 0.8, 141.0, false);
    add("l40s-48gb", "NVIDIA L40S 48GB", 12000.0, 0.35, 48.0, true);
    add("a800-80gb", "NVIDIA A800 80GB (China)", 15000.0, 0.4, 80.0, false);
    add("h20-china", "NVIDIA H20 (China)", 25000.0, 0.65, 96.0, false);
    add("huawei-ascend910b", "Huawei Ascend 910B", 14000.0, 0.35, 64.0, false);
    add("huawei-ascend910c", "Huawei Ascend 910C", 18000.0, 0.45, 96.0, false);
    add("biren-br100", "Biren BR100", 11000.0, 0.4, 64.0, false);
    add("via-big-island", "Via/Zhaoxin Big Island", 9000.0, 0.3, 32.0, false);
    add("amd-mi300x", "AMD Instinct MI300X", 16000.0, 0.75, 192.0, true);
    add("amd-mi325x", "AMD Instinct MI325X", 18000.0, 0.55, 256.0, false);
    add("intel-gaudi3", "Intel Gaudi 3", 15625.0, 0.5, 96.0, false);
    add("groq-lpu", "Groq LPU", 20000.0, 0.25, 0.0, false);
    add("google-tpu-v5p", "Google TPU v5p", 22000.0, 0.65, 96.0, false);
    m
});

pub static SERVER_PRESETS: Lazy<HashMap<&'static str, ServerPreset>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut add = |key, name, cost_usd, power_overhead_kw, gpu_slots, recommended| {
        m.insert(
            key,
            ServerPreset {
                name,
                cost_usd,
                power_overhead_kw,
                gpu_slots,
                recommended,
            },
        );
    };
    add("dell-poweredge-xe9680", "Dell PowerEdge XE9680 (8xGPU)", 85000.0, 1.5, 8, true);
    add("dell-poweredge-xe8545", "Dell PowerEdge XE8545 (4xGPU)", 45000.0, 0.9, 4, false);
    add("hpe-proliant-xd685", "HPE ProLiant XD685 (8xGPU)", 90000.0, 1.6, 8, true);
    add("hpe-apollo-6500", "HPE Apollo 6500 (8xGPU)", 65000.0, 1.2, 8, false);
    add("supermicro-sys-421ge", "Supermicro SYS-421GE (8xGPU)", 70000.0, 1.3, 8, true);
    add("lenovo-thinksystem-sr670", "Lenovo ThinkSystem SR670 (4xGPU)", 55000.0, 1.0, 4, false);
    add("standard-4gpu", "Standard 4-GPU server", 30000.0, 0.7, 4, false);
    add("standard-8gpu", "Standard 8-GPU server", 65000.0, 1.2, 8, false);
    m
});

pub static NETWORK_PRESETS: Lazy<HashMap<&'static str, NetworkPreset>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut add = |key, name, cost_per_port_usd, tier, recommended| {
        m.insert(
            key,
            NetworkPreset {
                name,
                cost_per_port_usd,
                tier,
                recommended,
            },
        );
    };
    add("eth-100g", "Ethernet 100GbE", 500.0, NetworkTier::Standard, true);
    add("ib-hdr-200g", "InfiniBand HDR 200G", 2000.0, NetworkTier::HighBandwidth, false);
    add("ib-ndr-400g", "InfiniBand NDR 400G", 4000.0, NetworkTier::Top, false);
    add("eth-400g", "Ethernet 400GbE", 3500.0, NetworkTier::HighBandwidth, false);
    m
});

pub static RAM_PRESETS: Lazy<HashMap<&'static str, RamPreset>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut add = |key, name, cost_per_gb_usd, generation, recommended| {
        m.insert(
            key,
            RamPreset {
                name,
                cost_per_gb_usd,
                generation,
                recommended,
            },
        );
    };
    add("ddr4-3200", "DDR4 3200MHz", 8.0, RamGeneration::Ddr4, false);
    add("ddr5-4800", "DDR5 4800MHz", 10.0, RamGeneration::Ddr5, true);
    add("ddr5-5600", "DDR5 5600MHz+", 12.0, RamGeneration::Ddr5HighSpeed, false);
    m
});

pub static STORAGE_PRESETS: Lazy<HashMap<&'static str, StoragePreset>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut add = |key, name, cost_per_gb_usd, recommended| {
        m.insert(
            key,
            StoragePreset {
                name,
                cost_per_gb_usd,
                recommended,
            },
        );
    };
    add("nvme-gen4-standard", "NVMe Gen4 SSD (standard)", 0.15, true);
    add("nvme-gen5-high", "NVMe Gen5 SSD (high performance)", 0.25, false);
    add("nvme-gen4-mixed", "NVMe Gen4 SSD (mixed-use)", 0.20, false);
    m
});

pub static SOFTWARE_PRESETS: Lazy<HashMap<&'static str, SoftwarePreset>> = Lazy::new(|| {
    let mut m = HashMap::new();
    let mut add = |key, name, annual_cost_per_server_usd, recommended| {
        m.insert(
            key,
            SoftwarePreset {
                name,
                annual_cost_per_server_usd,
                recommended,
            },
        );
    };
    add("base-os", "Base OS + open source stack", 0.0, true);
    add("nvidia-ai-enterprise", "NVIDIA AI Enterprise", 5000.0, false);
    add("managed-kubernetes", "Managed Kubernetes + add-ons", 2000.0, false);
    add("custom-enterprise", "Custom enterprise stack", 3000.0, false);
    m
});

/// Key of the recommended entry in a catalog, if any entry is flagged.
pub fn recommended_key<T>(
    catalog: &HashMap<&'static str, T>,
    is_recommended: impl Fn(&T) -> bool,
) -> Option<&'static str> {
    let mut keys: Vec<&&'static str> = catalog
        .iter()
        .filter(|(_, v)| is_recommended(v))
        .map(|(k, _)| k)
        .collect();
    // Deterministic pick when several entries carry the flag.
    keys.sort_unstable();
    keys.first().map(|k| **k)
}
