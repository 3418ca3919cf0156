//! Cheapest-configuration search over GPU x precision x server.
//!
//! The scan drives the full evaluation pipeline for every combination,
//! pruning (GPU, precision) pairs that fail the VRAM check or have no
//! resolvable performance before any sizing work. It is cooperative: the
//! caller owns a cancellation token checked once per server iteration,
//! and a progress callback fires at the same cadence. A fresh invocation
//! uses a fresh token; a cancelled scan's output is discarded, never
//! merged.

use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::catalog::{GPU_PRESETS, SERVER_PRESETS};
use crate::config::{Configuration, Precision};
use crate::perf::estimate_tokens_per_sec;
use crate::rating::check_model_fits_gpu;
use crate::sizing::{evaluate, Results};

pub const MAX_RESULTS: usize = 3;
pub const MIN_ACCEPTABLE_SCORE: u8 = 40;

/// Shared cancellation flag; clone it into whatever drives the scan.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub gpu_id: String,
    pub server_id: String,
    pub precision: Precision,
    pub results: Results,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStatus {
    /// At least one returned configuration meets the acceptance score.
    FoundAcceptable,
    /// Cheapest configurations exist but none is efficiency-acceptable.
    FoundSuboptimal,
    /// Nothing without a critical failure was found.
    NoneFound,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchOutcome {
    pub status: SearchStatus,
    /// Up to `MAX_RESULTS` feasible configurations, ascending 5-year TCO.
    pub hits: Vec<SearchHit>,
    pub combinations_evaluated: usize,
    pub combinations_pruned: usize,
}

/// Exhaustive scan; returns `None` when cancelled mid-flight.
pub fn search_cheapest(base: &Configuration, cancel: &CancelToken) -> Option<SearchOutcome> {
    search_cheapest_with_progress(base, cancel, &mut |_, _| {})
}

pub fn search_cheapest_with_progress(
    base: &Configuration,
    cancel: &CancelToken,
    progress: &mut dyn FnMut(usize, usize),
) -> Option<SearchOutcome> {
    let mut gpu_keys: Vec<&'static str> = GPU_PRESETS.keys().copied().collect();
    gpu_keys.sort_unstable();
    let mut server_keys: Vec<&'static str> = SERVER_PRESETS.keys().copied().collect();
    server_keys.sort_unstable();

    let total = gpu_keys.len() * Precision::ALL.len() * server_keys.len();
    let mut done = 0;
    let mut pruned = 0;
    let mut evaluated = 0;
    let mut hits: Vec<SearchHit> = Vec::new();

    for gpu_key in &gpu_keys {
        for precision in Precision::ALL {
            if cancel.is_cancelled() {
                log::debug!("search cancelled after {done}/{total} combinations");
                return None;
            }

            // Prune before any sizing: the cross-product is large and
            // most of it fails here.
            let mut probe = base.clone();
            probe.tokens_per_sec_per_gpu = 0.0;
            probe.precision = precision;
            if probe.apply_gpu_preset(gpu_key).is_err() {
                done += server_keys.len();
                continue;
            }
            let infeasible = check_model_fits_gpu(&probe).is_some()
                || estimate_tokens_per_sec(&probe.model_id, gpu_key, precision).is_none();
            if infeasible {
                pruned += server_keys.len();
                done += server_keys.len();
                continue;
            }

            for server_key in &server_keys {
                if cancel.is_cancelled() {
                    log::debug!("search cancelled after {done}/{total} combinations");
                    return None;
                }

                let mut candidate = probe.clone();
                if candidate.apply_server_preset(server_key).is_err() {
                    done += 1;
                    continue;
                }
                let results = evaluate(&candidate);
                evaluated += 1;
                done += 1;
                if results.five_year_tco_usd > 0.0 && results.five_year_tco_usd.is_finite() {
                    hits.push(SearchHit {
                        gpu_id: (*gpu_key).to_string(),
                        server_id: (*server_key).to_string(),
                        precision,
                        results,
                    });
                }
                progress(done, total);
            }
        }
    }

    let mut viable: Vec<SearchHit> = hits
        .into_iter()
        .filter(|hit| !hit.results.rating.hard_failure)
        .collect();

    if viable.is_empty() {
        return Some(SearchOutcome {
            status: SearchStatus::NoneFound,
            hits: Vec::new(),
            combinations_evaluated: evaluated,
            combinations_pruned: pruned,
        });
    }

    viable.sort_by(|a, b| {
        a.results
            .five_year_tco_usd
            .total_cmp(&b.results.five_year_tco_usd)
    });
    viable.truncate(MAX_RESULTS);

    let status = if viable
        .iter()
        .any(|hit| hit.results.rating.score >= MIN_ACCEPTABLE_SCORE)
    {
        SearchStatus::FoundAcceptable
    } else {
        SearchStatus::FoundSuboptimal
    };

    Some(SearchOutcome {
        status,
        hits: viable,
        combinations_evaluated: evaluated,
        combinations_pruned: pruned,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_token_round_trip() {
        let token = CancelToken::new();
        assert!(!token.is_cancelled());
        let clone = token.clone();
        clone.cancel();
        assert!(token.is_cancelled());
    }

    #[test]
    fn pre_cancelled_search_returns_none() {
        let token = CancelToken::new();
        token.cancel();
        let base = Configuration::recommended();
        assert!(search_cheapest(&base, &token).is_none());
    }
}
