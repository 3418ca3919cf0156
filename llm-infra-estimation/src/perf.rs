//! Per-GPU throughput estimation.
//!
//! A sparse matrix holds measured tokens/sec per (model, GPU, precision).
//! An explicit `None` inside a cell means the combination is known not to
//! work at that precision (usually insufficient memory); a GPU key that is
//! missing from a model's row means there is no direct data at all. For
//! missing data the estimator falls back to scaling a reference GPU's
//! measurement by relative-performance factors.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::config::Precision;

/// Measured tokens/sec per precision; `None` = known not to work.
#[derive(Debug, Clone, Copy)]
pub struct PerfCell {
    pub fp16: Option<f64>,
    pub int8: Option<f64>,
    pub int4: Option<f64>,
}

impl PerfCell {
    pub fn at(&self, precision: Precision) -> Option<f64> {
        match precision {
            Precision::Fp16 => self.fp16,
            Precision::Int8 => self.int8,
            Precision::Int4 => self.int4,
        }
    }
}

/// Outcome of a direct matrix lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DirectLookup {
    Measured(f64),
    /// Cell exists but is null at this precision: known not to work.
    Unsupported,
    /// No cell for this GPU at all.
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerfEstimate {
    pub tokens_per_sec: f64,
    /// True when the value was extrapolated rather than measured.
    pub estimated: bool,
}

/// Reference devices tried in order when extrapolating.
pub const BASE_GPUS: [&str; 3] = ["l40s-48gb", "h100-80gb", "a100-80gb"];

/// Factor applied to GPUs absent from `GPU_RELATIVE_PERFORMANCE`.
pub const DEFAULT_RELATIVE_PERFORMANCE: f64 = 0.1;

/// Relative throughput versus the L40S reference (L40S = 1.0).
pub static GPU_RELATIVE_PERFORMANCE: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("l40s-48gb", 1.0),
        ("h100-80gb", 2.2),
        ("h200-141gb", 2.8),
        ("b200-hbm3e", 4.0),
        ("a100-80gb", 1.2),
        ("a100-40gb", 1.0),
        ("a800-80gb", 1.1),
        ("h20-china", 0.5),
        ("amd-mi300x", 2.5),
        ("amd-mi325x", 3.0),
        ("intel-gaudi3", 1.5),
        ("google-tpu-v5p", 1.7),
        ("huawei-ascend910b", 0.7),
        ("huawei-ascend910c", 1.0),
        ("biren-br100", 0.9),
        ("via-big-island", 0.1),
        ("groq-lpu", 1.6),
    ])
});

pub fn relative_performance(gpu_id: &str) -> f64 {
    GPU_RELATIVE_PERFORMANCE
        .get(gpu_id)
        .copied()
        .unwrap_or(DEFAULT_RELATIVE_PERFORMANCE)
}

type ModelRow = HashMap<&'static str, PerfCell>;

fn row(cells: &[(&'static str, [Option<f64>; 3])]) -> ModelRow {
    cells
        .iter()
        .map(|(gpu, [fp16, int8, int4])| {
            (
                *gpu,
                PerfCell {
                    fp16: *fp16,
                    int8: *int8,
                    int4: *int4,
                },
            )
        })
        .collect()
}

/// Measured throughput in tokens/sec per single GPU, keyed by model then
/// GPU. Values collected from published benchmarks; multi-GPU figures are
/// normalised to one device.
pub static PERFORMANCE_MATRIX: Lazy<HashMap<&'static str, ModelRow>> = Lazy::new(|| {
    let n = None;
    let mut m = HashMap::new();
    m.insert(
        "llama2-7b",
        row(&[
            ("a100-80gb", [Some(92.0), n, Some(180.0)]),
            ("a100-40gb", [Some(88.0), n, Some(171.0)]),
            ("h100-80gb", [Some(230.0), Some(400.0), Some(450.0)]),
            ("h200-141gb", [Some(322.0), Some(550.0), Some(630.0)]),
            ("b200-hbm3e", [Some(552.0), Some(700.0), Some(1440.0)]),
            ("l40s-48gb", [Some(64.0), n, Some(126.0)]),
            ("a800-80gb", [Some(83.0), n, Some(162.0)]),
            ("h20-china", [Some(166.0), Some(350.0), Some(324.0)]),
            ("amd-mi300x", [Some(304.0), Some(520.0), Some(594.0)]),
            ("amd-mi325x", [Some(368.0), Some(600.0), Some(720.0)]),
            ("intel-gaudi3", [Some(180.0), Some(300.0), Some(400.0)]),
            ("google-tpu-v5p", [Some(200.0), Some(380.0), Some(420.0)]),
        ]),
    );
    m.insert(
        "llama2-13b",
        row(&[
            ("a100-80gb", [Some(52.6), n, Some(110.0)]),
            ("a100-40gb", [Some(50.0), n, Some(105.0)]),
            ("h100-80gb", [Some(132.0), Some(240.0), Some(275.0)]),
            ("h200-141gb", [Some(184.0), Some(330.0), Some(385.0)]),
            ("b200-hbm3e", [Some(316.0), Some(420.0), Some(880.0)]),
            ("l40s-48gb", [Some(37.0), n, Some(77.0)]),
            ("a800-80gb", [Some(47.0), n, Some(99.0)]),
            ("h20-china", [Some(95.0), Some(210.0), Some(198.0)]),
            ("amd-mi300x", [Some(174.0), Some(310.0), Some(363.0)]),
            ("amd-mi325x", [Some(210.0), Some(350.0), Some(440.0)]),
            ("intel-gaudi3", [Some(100.0), Some(180.0), Some(240.0)]),
            ("google-tpu-v5p", [Some(115.0), Some(220.0), Some(260.0)]),
        ]),
    );
    m.insert(
        "llama2-70b",
        row(&[
            ("a100-80gb", [n, n, Some(9.0)]),
            ("a100-40gb", [n, n, Some(9.0)]),
            ("h100-80gb", [Some(22.0), Some(45.0), Some(23.0)]),
            ("h200-141gb", [Some(31.0), Some(60.0), Some(32.0)]),
            ("b200-hbm3e", [Some(53.0), Some(80.0), Some(72.0)]),
            ("l40s-48gb", [n, n, n]),
            ("a800-80gb", [n, n, Some(8.0)]),
            ("h20-china", [n, n, Some(16.0)]),
            ("amd-mi300x", [Some(29.0), Some(55.0), Some(30.0)]),
            ("amd-mi325x", [Some(35.0), Some(65.0), Some(36.0)]),
            ("intel-gaudi3", [n, Some(35.0), Some(18.0)]),
            ("google-tpu-v5p", [n, Some(40.0), Some(20.0)]),
        ]),
    );
    m.insert(
        "llama3-8b",
        row(&[
            ("a100-80gb", [Some(2000.0), Some(3800.0), Some(5000.0)]),
            ("a100-40gb", [Some(1900.0), Some(3610.0), Some(4750.0)]),
            ("h100-80gb", [Some(5000.0), Some(9000.0), Some(11000.0)]),
            ("h200-141gb", [Some(7000.0), Some(12000.0), Some(14000.0)]),
            ("b200-hbm3e", [Some(12000.0), Some(15000.0), Some(40000.0)]),
            ("l40s-48gb", [Some(1400.0), Some(2660.0), Some(3500.0)]),
            ("a800-80gb", [Some(1800.0), Some(3420.0), Some(4500.0)]),
            ("h20-china", [Some(3600.0), Some(7500.0), Some(9000.0)]),
            ("amd-mi300x", [Some(6600.0), Some(11000.0), Some(13200.0)]),
            ("amd-mi325x", [Some(8000.0), Some(13000.0), Some(16000.0)]),
            ("intel-gaudi3", [Some(4000.0), Some(7000.0), Some(9500.0)]),
            ("google-tpu-v5p", [Some(4500.0), Some(8500.0), Some(10500.0)]),
        ]),
    );
    m.insert(
        "llama3-70b",
        row(&[
            ("a100-80gb", [n, n, Some(700.0)]),
            ("a100-40gb", [n, n, n]),
            ("h100-80gb", [Some(675.0), Some(1300.0), Some(1700.0)]),
            ("h200-141gb", [Some(945.0), Some(1800.0), Some(2400.0)]),
            ("b200-hbm3e", [Some(1620.0), Some(2200.0), Some(5600.0)]),
            ("l40s-48gb", [n, n, n]),
            ("a800-80gb", [n, n, Some(630.0)]),
            ("h20-china", [n, Some(900.0), Some(1260.0)]),
            ("amd-mi300x", [Some(890.0), Some(1600.0), Some(2240.0)]),
            ("amd-mi325x", [Some(1080.0), Some(1900.0), Some(2720.0)]),
            ("intel-gaudi3", [Some(500.0), Some(1000.0), Some(1400.0)]),
            ("google-tpu-v5p", [Some(600.0), Some(1200.0), Some(1600.0)]),
        ]),
    );
    m.insert(
        "mixtral-8x7b",
        row(&[
            ("a100-80gb", [Some(5800.0), Some(10000.0), Some(12000.0)]),
            ("a100-40gb", [Some(5510.0), Some(9500.0), Some(11400.0)]),
            ("h100-80gb", [Some(14500.0), Some(21000.0), Some(30000.0)]),
            ("h200-141gb", [Some(20300.0), Some(29000.0), Some(42000.0)]),
            ("b200-hbm3e", [Some(34800.0), Some(42000.0), Some(96000.0)]),
            ("l40s-48gb", [n, n, n]),
            ("a800-80gb", [Some(5220.0), Some(9000.0), Some(10800.0)]),
            ("h20-china", [Some(10440.0), Some(18000.0), Some(21600.0)]),
            ("amd-mi300x", [Some(19140.0), Some(27000.0), Some(39600.0)]),
            ("amd-mi325x", [Some(23200.0), Some(31000.0), Some(48000.0)]),
            ("intel-gaudi3", [Some(11000.0), Some(18000.0), Some(25000.0)]),
            ("google-tpu-v5p", [Some(13000.0), Some(20000.0), Some(28000.0)]),
        ]),
    );
    m.insert(
        "qwen-72b",
        row(&[
            ("a100-80gb", [Some(35.0), Some(65.0), Some(90.0)]),
            ("a100-40gb", [n, n, n]),
            ("h100-80gb", [Some(88.0), Some(150.0), Some(225.0)]),
            ("h200-141gb", [Some(123.0), Some(210.0), Some(315.0)]),
            ("b200-hbm3e", [Some(210.0), Some(300.0), Some(720.0)]),
            ("l40s-48gb", [n, n, n]),
            ("a800-80gb", [Some(32.0), Some(59.0), Some(81.0)]),
            ("h20-china", [Some(63.0), Some(130.0), Some(162.0)]),
            ("amd-mi300x", [Some(116.0), Some(200.0), Some(297.0)]),
            ("amd-mi325x", [Some(140.0), Some(240.0), Some(360.0)]),
            ("intel-gaudi3", [Some(70.0), Some(120.0), Some(180.0)]),
            ("google-tpu-v5p", [Some(80.0), Some(140.0), Some(210.0)]),
        ]),
    );
    m.insert(
        "qwen2-72b",
        row(&[
            ("a100-80gb", [Some(31.0), Some(55.0), Some(78.0)]),
            ("a100-40gb", [n, n, n]),
            ("h100-80gb", [Some(78.0), Some(140.0), Some(195.0)]),
            ("h200-141gb", [Some(109.0), Some(190.0), Some(273.0)]),
            ("b200-hbm3e", [Some(186.0), Some(260.0), Some(624.0)]),
            ("l40s-48gb", [n, n, n]),
            ("a800-80gb", [Some(28.0), Some(50.0), Some(70.0)]),
            ("h20-china", [Some(56.0), Some(120.0), Some(140.0)]),
            ("amd-mi300x", [Some(102.0), Some(180.0), Some(257.0)]),
            ("amd-mi325x", [Some(124.0), Some(210.0), Some(312.0)]),
            ("intel-gaudi3", [Some(60.0), Some(110.0), Some(160.0)]),
            ("google-tpu-v5p", [Some(70.0), Some(130.0), Some(185.0)]),
        ]),
    );
    m.insert(
        "qwen2.5-72b",
        row(&[
            ("a100-80gb", [Some(63.0), Some(110.0), Some(158.0)]),
            ("a100-40gb", [n, n, n]),
            ("h100-80gb", [Some(158.0), Some(280.0), Some(395.0)]),
            ("h200-141gb", [Some(221.0), Some(380.0), Some(553.0)]),
            ("b200-hbm3e", [Some(378.0), Some(520.0), Some(1264.0)]),
            ("l40s-48gb", [n, n, n]),
            ("a800-80gb", [Some(57.0), Some(99.0), Some(142.0)]),
            ("h20-china", [Some(113.0), Some(240.0), Some(284.0)]),
            ("amd-mi300x", [Some(208.0), Some(360.0), Some(521.0)]),
            ("amd-mi325x", [Some(252.0), Some(420.0), Some(632.0)]),
            ("intel-gaudi3", [Some(120.0), Some(220.0), Some(320.0)]),
            ("google-tpu-v5p", [Some(140.0), Some(260.0), Some(370.0)]),
        ]),
    );
    m.insert(
        "qwen3-235b-a22b",
        row(&[
            ("a100-80gb", [n, n, n]),
            ("a100-40gb", [n, n, n]),
            ("h100-80gb", [n, Some(650.0), n]),
            ("h200-141gb", [n, Some(910.0), n]),
            ("b200-hbm3e", [n, Some(1200.0), n]),
            ("l40s-48gb", [n, n, n]),
            ("a800-80gb", [n, n, n]),
            ("h20-china", [n, Some(450.0), n]),
            ("amd-mi300x", [n, Some(850.0), n]),
            ("amd-mi325x", [n, Some(1050.0), n]),
            ("intel-gaudi3", [n, Some(500.0), n]),
            ("google-tpu-v5p", [n, Some(600.0), n]),
        ]),
    );
    m.insert(
        "deepseek-67b",
        row(&[
            ("a100-80gb", [Some(12.5), Some(23.0), Some(31.0)]),
            ("a100-40gb", [n, n, n]),
            ("h100-80gb", [Some(31.0), Some(60.0), Some(78.0)]),
            ("h200-141gb", [Some(44.0), Some(80.0), Some(109.0)]),
            ("b200-hbm3e", [Some(75.0), Some(105.0), Some(248.0)]),
            ("l40s-48gb", [n, n, n]),
            ("a800-80gb", [Some(11.0), Some(21.0), Some(28.0)]),
            ("h20-china", [Some(22.0), Some(50.0), Some(56.0)]),
            ("amd-mi300x", [Some(41.0), Some(75.0), Some(102.0)]),
            ("amd-mi325x", [Some(50.0), Some(90.0), Some(124.0)]),
            ("intel-gaudi3", [Some(25.0), Some(50.0), Some(65.0)]),
            ("google-tpu-v5p", [Some(28.0), Some(55.0), Some(70.0)]),
        ]),
    );
    m.insert(
        "deepseek-v3-671b",
        row(&[
            ("a100-80gb", [n, n, n]),
            ("a100-40gb", [n, n, n]),
            ("h100-80gb", [n, Some(60.0), n]),
            ("h200-141gb", [n, Some(85.0), n]),
            ("b200-hbm3e", [n, Some(150.0), n]),
            ("l40s-48gb", [n, n, n]),
            ("a800-80gb", [n, n, n]),
            ("h20-china", [n, Some(45.0), n]),
            ("amd-mi300x", [n, Some(75.0), n]),
            ("amd-mi325x", [n, Some(95.0), n]),
            ("intel-gaudi3", [n, Some(50.0), n]),
            ("google-tpu-v5p", [n, Some(55.0), n]),
        ]),
    );
    m.insert(
        "yi-34b",
        row(&[
            ("a100-80gb", [Some(21.26), Some(40.0), Some(53.0)]),
            ("a100-40gb", [Some(20.0), Some(38.0), Some(50.0)]),
            ("h100-80gb", [Some(53.0), Some(95.0), Some(133.0)]),
            ("h200-141gb", [Some(74.0), Some(130.0), Some(186.0)]),
            ("b200-hbm3e", [Some(128.0), Some(175.0), Some(424.0)]),
            ("l40s-48gb", [Some(15.0), Some(28.0), Some(37.0)]),
            ("a800-80gb", [Some(19.0), Some(36.0), Some(48.0)]),
            ("h20-china", [Some(38.0), Some(80.0), Some(95.0)]),
            ("amd-mi300x", [Some(70.0), Some(125.0), Some(175.0)]),
            ("amd-mi325x", [Some(85.0), Some(150.0), Some(212.0)]),
            ("intel-gaudi3", [Some(42.0), Some(80.0), Some(110.0)]),
            ("google-tpu-v5p", [Some(48.0), Some(90.0), Some(125.0)]),
        ]),
    );
    m.insert(
        "qwq-32b",
        row(&[
            ("a100-80gb", [Some(12.3), Some(23.0), Some(31.0)]),
            ("a100-40gb", [Some(11.7), Some(22.0), Some(29.0)]),
            ("h100-80gb", [Some(31.0), Some(55.0), Some(78.0)]),
            ("h200-141gb", [Some(43.0), Some(75.0), Some(109.0)]),
            ("b200-hbm3e", [Some(74.0), Some(100.0), Some(248.0)]),
            ("l40s-48gb", [Some(8.6), Some(16.0), Some(22.0)]),
            ("a800-80gb", [Some(11.0), Some(21.0), Some(28.0)]),
            ("h20-china", [Some(22.0), Some(45.0), Some(56.0)]),
            ("amd-mi300x", [Some(41.0), Some(70.0), Some(102.0)]),
            ("amd-mi325x", [Some(49.0), Some(85.0), Some(124.0)]),
            ("intel-gaudi3", [Some(25.0), Some(45.0), Some(65.0)]),
            ("google-tpu-v5p", [Some(28.0), Some(50.0), Some(75.0)]),
        ]),
    );
    m
});

pub fn direct_lookup(model_id: &str, gpu_id: &str, precision: Precision) -> DirectLookup {
    match PERFORMANCE_MATRIX
        .get(model_id)
        .and_then(|cells| cells.get(gpu_id))
    {
        Some(cell) => match cell.at(precision) {
            Some(v) => DirectLookup::Measured(v),
            None => DirectLookup::Unsupported,
        },
        None => DirectLookup::NoData,
    }
}

/// Resolve tokens/sec for a single GPU, falling back to cross-device
/// extrapolation when there is no usable direct measurement. Returns
/// `None` when nothing can be said; callers must treat that as "cannot
/// estimate", not as zero throughput.
pub fn estimate_tokens_per_sec(
    model_id: &str,
    gpu_id: &str,
    precision: Precision,
) -> Option<PerfEstimate> {
    if let DirectLookup::Measured(v) = direct_lookup(model_id, gpu_id, precision) {
        if v > 0.0 {
            return Some(PerfEstimate {
                tokens_per_sec: v,
                estimated: false,
            });
        }
    }

    if !PERFORMANCE_MATRIX.contains_key(model_id) {
        return None;
    }

    let target_factor = relative_performance(gpu_id);
    for base in BASE_GPUS {
        if base == gpu_id {
            continue;
        }
        if let DirectLookup::Measured(v) = direct_lookup(model_id, base, precision) {
            if v > 0.0 {
                let scaled = (v * target_factor / relative_performance(base)).round();
                return Some(PerfEstimate {
                    tokens_per_sec: scaled,
                    estimated: true,
                });
            }
        }
    }

    None
}
