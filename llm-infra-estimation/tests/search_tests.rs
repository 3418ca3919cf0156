use llm_infra_estimation::config::Configuration;
use llm_infra_estimation::perf::estimate_tokens_per_sec;
use llm_infra_estimation::rating::check_model_fits_gpu;
use llm_infra_estimation::search::{
    search_cheapest, search_cheapest_with_progress, CancelToken, SearchStatus, MAX_RESULTS,
    MIN_ACCEPTABLE_SCORE,
};

#[test]
fn finds_cheap_configurations_for_a_mainstream_model() {
    let base = Configuration::recommended();
    let outcome = search_cheapest(&base, &CancelToken::new()).expect("not cancelled");

    assert_eq!(outcome.status, SearchStatus::FoundAcceptable);
    assert!(!outcome.hits.is_empty());
    assert!(outcome.hits.len() <= MAX_RESULTS);
    assert!(outcome
        .hits
        .iter()
        .any(|hit| hit.results.rating.score >= MIN_ACCEPTABLE_SCORE));
}

#[test]
fn hits_are_sorted_by_ascending_tco() {
    let base = Configuration::recommended();
    let outcome = search_cheapest(&base, &CancelToken::new()).expect("not cancelled");
    let tcos: Vec<f64> = outcome
        .hits
        .iter()
        .map(|hit| hit.results.five_year_tco_usd)
        .collect();
    assert!(
        tcos.windows(2).all(|pair| pair[0] <= pair[1]),
        "TCOs not ascending: {tcos:?}"
    );
    assert!(tcos.iter().all(|tco| *tco > 0.0 && tco.is_finite()));
}

#[test]
fn no_hit_violates_vram_or_lacks_performance_data() {
    let mut base = Configuration::recommended();
    base.apply_model_preset("llama2-70b").unwrap();
    let outcome = search_cheapest(&base, &CancelToken::new()).expect("not cancelled");

    // 70B rules out most GPU x precision pairs, so pruning must have
    // done real work.
    assert!(outcome.combinations_pruned > 0);

    for hit in &outcome.hits {
        let mut candidate = base.clone();
        candidate.tokens_per_sec_per_gpu = 0.0;
        candidate.precision = hit.precision;
        candidate.apply_gpu_preset(&hit.gpu_id).unwrap();
        candidate.apply_server_preset(&hit.server_id).unwrap();

        assert!(
            check_model_fits_gpu(&candidate).is_none(),
            "{} fails the VRAM check at {} bits",
            hit.gpu_id,
            u32::from(hit.precision)
        );
        assert!(
            estimate_tokens_per_sec(&candidate.model_id, &hit.gpu_id, hit.precision).is_some(),
            "{} has no resolvable performance",
            hit.gpu_id
        );
        assert!(!hit.results.rating.hard_failure);
    }
}

#[test]
fn unknown_model_finds_nothing() {
    let mut base = Configuration::recommended();
    base.model_id = "bespoke-finetune-12b".to_string();
    base.model_params_billion = 12.0;
    base.tokens_per_sec_per_gpu = 0.0;

    let outcome = search_cheapest(&base, &CancelToken::new()).expect("not cancelled");
    assert_eq!(outcome.status, SearchStatus::NoneFound);
    assert!(outcome.hits.is_empty());
    assert_eq!(outcome.combinations_evaluated, 0);
}

#[test]
fn status_is_consistent_with_scores() {
    // A near-idle deployment of a heavy model: everything is expensive
    // per token, so whichever status comes back must match the scores.
    let mut base = Configuration::recommended();
    base.apply_model_preset("llama2-70b").unwrap();
    base.concurrent_users = 1;
    base.tokens_per_request = 1;
    base.response_time_sec = 10.0;

    let outcome = search_cheapest(&base, &CancelToken::new()).expect("not cancelled");
    match outcome.status {
        SearchStatus::FoundAcceptable => assert!(outcome
            .hits
            .iter()
            .any(|hit| hit.results.rating.score >= MIN_ACCEPTABLE_SCORE)),
        SearchStatus::FoundSuboptimal => {
            assert!(!outcome.hits.is_empty());
            assert!(outcome
                .hits
                .iter()
                .all(|hit| hit.results.rating.score < MIN_ACCEPTABLE_SCORE));
        }
        SearchStatus::NoneFound => assert!(outcome.hits.is_empty()),
    }
}

#[test]
fn cancellation_mid_scan_discards_the_run() {
    let base = Configuration::recommended();
    let cancel = CancelToken::new();
    let handle = cancel.clone();
    let outcome = search_cheapest_with_progress(&base, &cancel, &mut move |done, _total| {
        if done >= 5 {
            handle.cancel();
        }
    });
    assert!(outcome.is_none(), "a cancelled search must not return results");
}

#[test]
fn progress_reports_every_server_iteration() {
    let base = Configuration::recommended();
    let mut calls = 0_usize;
    let mut last = 0_usize;
    let outcome = search_cheapest_with_progress(&base, &CancelToken::new(), &mut |done, total| {
        calls += 1;
        assert!(done > last, "progress must advance");
        assert!(done <= total);
        last = done;
    })
    .expect("not cancelled");
    assert_eq!(calls, outcome.combinations_evaluated);
}
