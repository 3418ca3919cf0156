use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::config::{load_scenario, Configuration, Precision};

#[derive(Parser)]
#[command(version, about, long_about = None)]
/// Estimate GPU count, server count, CapEx, OpEx and 5-year TCO for
/// self-hosted LLM inference from load, model and hardware parameters.
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a scenario: sizing, cost breakdowns and a rating
    Evaluate {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Print a plain-text technical report instead of the table
        #[arg(long)]
        report: bool,

        /// Emit the full results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Scan every GPU x precision x server combination for the cheapest
    /// workable configurations
    Search {
        #[command(flatten)]
        scenario: ScenarioArgs,

        /// Emit the search outcome as JSON
        #[arg(long)]
        json: bool,
    },

    /// List a reference catalog
    List {
        /// Which catalog to print
        #[arg(value_enum)]
        catalog: CatalogKind,

        /// Sort the list by the specified metric
        #[arg(long, value_enum, default_value_t = SortBy::Name)]
        sort: SortBy,
    },

    /// Write a scenario template with the recommended presets applied
    Init {
        /// Path of the template file
        #[arg(short, long, value_name = "FILE", default_value = "llm_infra_scenario.json")]
        file: PathBuf,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum CatalogKind {
    Models,
    Gpus,
    Servers,
    Networks,
    Storage,
    Ram,
    Software,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    Name,
    Cost,
    /// Params for models, VRAM for GPUs, slots for servers
    Capacity,
}

/// Scenario source plus field overrides shared by `evaluate` and
/// `search`. Flags override whatever the file (or the recommended
/// defaults) provide.
#[derive(Args)]
pub struct ScenarioArgs {
    /// Path to a JSON scenario file
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Model preset key (see `list models`)
    #[arg(long)]
    pub model: Option<String>,

    /// GPU preset key (see `list gpus`)
    #[arg(long)]
    pub gpu: Option<String>,

    /// Server preset key (see `list servers`)
    #[arg(long)]
    pub server: Option<String>,

    /// Weight precision in bits (16, 8 or 4)
    #[arg(long)]
    pub precision: Option<u32>,

    /// Concurrent users
    #[arg(long)]
    pub users: Option<u32>,

    /// Tokens per simple request
    #[arg(long)]
    pub tokens: Option<u32>,

    /// Target response time in seconds
    #[arg(long)]
    pub response_time: Option<f64>,

    /// Batching optimization factor (1, 2, 3 or 5)
    #[arg(long)]
    pub batching: Option<f64>,

    /// Manual tokens/sec per GPU, bypassing the performance matrix
    #[arg(long)]
    pub tokens_per_sec: Option<f64>,

    /// Enable the multi-agent load model
    #[arg(long)]
    pub agent_mode: bool,

    /// Percentage of requests that are agentic (0-100)
    #[arg(long)]
    pub agent_percentage: Option<f64>,
}

impl ScenarioArgs {
    /// Resolve the scenario: file (or recommended defaults), then
    /// presets, then scalar overrides.
    pub fn build(&self) -> Result<Configuration, String> {
        let mut cfg = self
            .file
            .as_ref()
            .map_or_else(Configuration::recommended, load_scenario);

        if let Some(model) = &self.model {
            cfg.apply_model_preset(model)?;
        }
        if let Some(gpu) = &self.gpu {
            cfg.apply_gpu_preset(gpu)?;
        }
        if let Some(server) = &self.server {
            cfg.apply_server_preset(server)?;
        }
        if let Some(bits) = self.precision {
            cfg.precision = Precision::from_bits(bits)
                .ok_or_else(|| format!("unsupported precision: {bits} bits (use 16, 8 or 4)"))?;
        }
        if let Some(users) = self.users {
            cfg.concurrent_users = users;
        }
        if let Some(tokens) = self.tokens {
            cfg.tokens_per_request = tokens;
        }
        if let Some(response_time) = self.response_time {
            cfg.response_time_sec = response_time;
        }
        if let Some(batching) = self.batching {
            if ![1.0, 2.0, 3.0, 5.0].contains(&batching) {
                return Err(format!("batching factor must be 1, 2, 3 or 5, got {batching}"));
            }
            cfg.batching_factor = batching;
        }
        if let Some(tokens_per_sec) = self.tokens_per_sec {
            cfg.tokens_per_sec_per_gpu = tokens_per_sec;
        }
        if self.agent_mode {
            cfg.enable_agent_mode()?;
        }
        if let Some(percentage) = self.agent_percentage {
            if !(0.0..=100.0).contains(&percentage) {
                return Err(format!(
                    "agentic request percentage must be within 0-100, got {percentage}"
                ));
            }
            cfg.agent_request_percentage = percentage;
        }
        Ok(cfg)
    }
}
