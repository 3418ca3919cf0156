//! Scenario configuration: the single input record of the engine.

use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use crate::catalog::{
    recommended_key, GPU_PRESETS, MODEL_PRESETS, NETWORK_PRESETS, RAM_PRESETS, SERVER_PRESETS,
    SOFTWARE_PRESETS, STORAGE_PRESETS,
};

/// Weight precision used for serving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", try_from = "u32")]
pub enum Precision {
    Fp16,
    Int8,
    Int4,
}

impl Precision {
    pub const ALL: [Self; 3] = [Self::Fp16, Self::Int8, Self::Int4];

    pub const fn bits(self) -> u32 {
        match self {
            Self::Fp16 => 16,
            Self::Int8 => 8,
            Self::Int4 => 4,
        }
    }

    pub const fn from_bits(bits: u32) -> Option<Self> {
        match bits {
            16 => Some(Self::Fp16),
            8 => Some(Self::Int8),
            4 => Some(Self::Int4),
            _ => None,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Fp16 => "FP16",
            Self::Int8 => "INT8",
            Self::Int4 => "INT4",
        }
    }
}

impl From<Precision> for u32 {
    fn from(p: Precision) -> Self {
        p.bits()
    }
}

impl TryFrom<u32> for Precision {
    type Error = String;

    fn try_from(bits: u32) -> Result<Self, Self::Error> {
        Self::from_bits(bits).ok_or_else(|| format!("unsupported precision: {bits} bits"))
    }
}

/// One evaluation scenario. The engine never mutates it; every derived
/// figure is recomputed from scratch per call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Configuration {
    // Model
    pub model_id: String,
    pub model_params_billion: f64,
    pub precision: Precision,
    /// Manual per-GPU throughput override; 0 means "resolve from the
    /// performance matrix".
    pub tokens_per_sec_per_gpu: f64,

    // Load
    pub concurrent_users: u32,
    pub tokens_per_request: u32,
    pub response_time_sec: f64,
    pub agent_mode: bool,
    pub agent_request_percentage: f64,
    pub avg_agents_per_task: f64,
    pub avg_llm_calls_per_agent: f64,
    pub avg_tool_calls_per_agent: f64,
    pub avg_agent_llm_tokens: f64,
    pub avg_external_tool_cost_usd: f64,
    pub batching_factor: f64,

    // Hardware
    pub gpu_id: String,
    pub gpu_cost_usd: f64,
    pub gpu_power_kw: f64,
    pub gpu_vram_gb: f64,
    pub gpus_per_server: u32,
    pub server_cost_usd: f64,
    pub server_power_overhead_kw: f64,

    // Facility & pricing
    pub electricity_usd_per_kwh: f64,
    pub pue: f64,
    pub annual_maintenance_rate: f64,
    pub network_id: String,
    pub network_cost_per_port_usd: f64,
    pub storage_cost_per_gb_usd: f64,
    pub ram_id: String,
    pub ram_cost_per_gb_usd: f64,
    pub software_annual_cost_per_server_usd: f64,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            model_id: String::new(),
            model_params_billion: 0.0,
            precision: Precision::Fp16,
            tokens_per_sec_per_gpu: 0.0,

            concurrent_users: 100,
            tokens_per_request: 100,
            response_time_sec: 2.0,
            agent_mode: false,
            agent_request_percentage: 5.0,
            avg_agents_per_task: 3.0,
            avg_llm_calls_per_agent: 5.0,
            avg_tool_calls_per_agent: 2.0,
            avg_agent_llm_tokens: 1500.0,
            avg_external_tool_cost_usd: 0.002,
            batching_factor: 1.0,

            gpu_id: String::new(),
            gpu_cost_usd: 0.0,
            gpu_power_kw: 0.0,
            gpu_vram_gb: 0.0,
            gpus_per_server: 8,
            server_cost_usd: 0.0,
            server_power_overhead_kw: 0.0,

            electricity_usd_per_kwh: 0.08,
            pue: 1.3,
            annual_maintenance_rate: 0.05,
            network_id: String::new(),
            network_cost_per_port_usd: 0.0,
            storage_cost_per_gb_usd: 0.15,
            ram_id: String::new(),
            ram_cost_per_gb_usd: 10.0,
            software_annual_cost_per_server_usd: 0.0,
        }
    }
}

impl Configuration {
    /// Default scenario with every `recommended` catalog entry applied.
    pub fn recommended() -> Self {
        let mut cfg = Self::default();
        if let Some(key) = recommended_key(&MODEL_PRESETS, |m| m.recommended) {
            cfg.apply_model_preset(key).ok();
        }
        if let Some(key) = recommended_key(&GPU_PRESETS, |g| g.recommended) {
            cfg.apply_gpu_preset(key).ok();
        }
        if let Some(key) = recommended_key(&SERVER_PRESETS, |s| s.recommended) {
            cfg.apply_server_preset(key).ok();
        }
        if let Some(key) = recommended_key(&NETWORK_PRESETS, |n| n.recommended) {
            cfg.apply_network_preset(key).ok();
        }
        if let Some(key) = recommended_key(&STORAGE_PRESETS, |s| s.recommended) {
            cfg.apply_storage_preset(key).ok();
        }
        if let Some(key) = recommended_key(&RAM_PRESETS, |r| r.recommended) {
            cfg.apply_ram_preset(key).ok();
        }
        if let Some(key) = recommended_key(&SOFTWARE_PRESETS, |s| s.recommended) {
            cfg.apply_software_preset(key).ok();
        }
        cfg
    }

    pub fn apply_model_preset(&mut self, key: &str) -> Result<(), String> {
        let preset = MODEL_PRESETS
            .get(key)
            .ok_or_else(|| format!("unknown model preset '{key}'"))?;
        self.model_id = key.to_string();
        self.model_params_billion = preset.params_billion;
        if !preset.supports_tool_calls {
            self.agent_mode = false;
        }
        Ok(())
    }

    pub fn apply_gpu_preset(&mut self, key: &str) -> Result<(), String> {
        let preset = GPU_PRESETS
            .get(key)
            .ok_or_else(|| format!("unknown GPU preset '{key}'"))?;
        self.gpu_id = key.to_string();
        self.gpu_cost_usd = preset.cost_usd;
        self.gpu_power_kw = preset.power_kw;
        self.gpu_vram_gb = preset.vram_gb;
        Ok(())
    }

    pub fn apply_server_preset(&mut self, key: &str) -> Result<(), String> {
        let preset = SERVER_PRESETS
            .get(key)
            .ok_or_else(|| format!("unknown server preset '{key}'"))?;
        self.gpus_per_server = preset.gpu_slots;
        self.server_cost_usd = preset.cost_usd;
        self.server_power_overhead_kw = preset.power_overhead_kw;
        Ok(())
    }

    pub fn apply_network_preset(&mut self, key: &str) -> Result<(), String> {
        let preset = NETWORK_PRESETS
            .get(key)
            .ok_or_else(|| format!("unknown network preset '{key}'"))?;
        self.network_id = key.to_string();
        self.network_cost_per_port_usd = preset.cost_per_port_usd;
        Ok(())
    }

    pub fn apply_storage_preset(&mut self, key: &str) -> Result<(), String> {
        let preset = STORAGE_PRESETS
            .get(key)
            .ok_or_else(|| format!("unknown storage preset '{key}'"))?;
        self.storage_cost_per_gb_usd = preset.cost_per_gb_usd;
        Ok(())
    }

    pub fn apply_ram_preset(&mut self, key: &str) -> Result<(), String> {
        let preset = RAM_PRESETS
            .get(key)
            .ok_or_else(|| format!("unknown RAM preset '{key}'"))?;
        self.ram_id = key.to_string();
        self.ram_cost_per_gb_usd = preset.cost_per_gb_usd;
        Ok(())
    }

    pub fn apply_software_preset(&mut self, key: &str) -> Result<(), String> {
        let preset = SOFTWARE_PRESETS
            .get(key)
            .ok_or_else(|| format!("unknown software preset '{key}'"))?;
        self.software_annual_cost_per_server_usd = preset.annual_cost_per_server_usd;
        Ok(())
    }

    /// Turn agent mode on, refusing when the selected model is known not
    /// to support tool calls.
    pub fn enable_agent_mode(&mut self) -> Result<(), String> {
        if let Some(preset) = MODEL_PRESETS.get(self.model_id.as_str()) {
            if !preset.supports_tool_calls {
                return Err(format!(
                    "model '{}' does not support tool calls; agent mode unavailable",
                    self.model_id
                ));
            }
        }
        self.agent_mode = true;
        Ok(())
    }

    /// Weight footprint in GB: params (billions) x bits / 8.
    pub fn model_size_gb(&self) -> f64 {
        self.model_params_billion * f64::from(self.precision.bits()) / 8.0
    }
}

/// Load a scenario file, degrading gracefully: a missing file creates a
/// template with recommended defaults, an unreadable or invalid one
/// falls back to the recommended defaults with a message on stderr.
pub fn load_scenario(file_path: &PathBuf) -> Configuration {
    if !file_path.exists() {
        eprintln!(
            "Scenario file '{}' does not exist. Creating a template with recommended presets.",
            file_path.display()
        );
        let cfg = Configuration::recommended();
        save_scenario(&cfg, file_path);
        return cfg;
    }

    let file = match File::open(file_path) {
        Ok(file) => file,
        Err(_) => {
            eprintln!("Failed to open the scenario file: {}", file_path.display());
            return Configuration::recommended();
        }
    };

    let reader = BufReader::new(file);
    serde_json::from_reader(reader).unwrap_or_else(|_| {
        eprintln!(
            "Scenario file '{}' is empty or invalid. Using recommended defaults.",
            file_path.display()
        );
        Configuration::recommended()
    })
}

pub fn save_scenario(cfg: &Configuration, file_path: &PathBuf) {
    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(file_path)
        .expect("Failed to open the scenario file for writing.");
    let writer = BufWriter::new(file);
    serde_json::to_writer_pretty(writer, cfg).expect("Failed to write the scenario file.");
}
