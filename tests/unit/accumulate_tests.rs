//! Unit tests for running totals and the shared accumulator

use lograte::services::accumulate::RateAccumulator;
use lograte::{RateResult, RunningTotals, StatusClass};
use rayon::prelude::*;

#[test]
fn status_class_boundaries() {
    assert_eq!(StatusClass::from_code(199), StatusClass::Unknown);
    assert_eq!(StatusClass::from_code(200), StatusClass::Success);
    assert_eq!(StatusClass::from_code(299), StatusClass::Success);
    assert_eq!(StatusClass::from_code(304), StatusClass::Redirect);
    assert_eq!(StatusClass::from_code(400), StatusClass::ClientError);
    assert_eq!(StatusClass::from_code(599), StatusClass::ServerError);
    assert_eq!(StatusClass::from_code(600), StatusClass::Unknown);
}

#[test]
fn empty_totals_have_zero_rates() {
    let totals = RunningTotals::new();
    assert_eq!(totals.rates(), RateResult::default());

    let mut only_unclassified = RunningTotals::new();
    only_unclassified.record(StatusClass::Unknown);
    only_unclassified.record(StatusClass::Redirect);
    only_unclassified.record_malformed(4);
    assert_eq!(only_unclassified.total, 0);
    assert_eq!(only_unclassified.unclassified, 2);
    assert_eq!(only_unclassified.rates(), RateResult::default());
}

#[test]
fn merge_is_order_independent() {
    let mut a = RunningTotals::new();
    a.record(StatusClass::Success);
    a.record(StatusClass::ClientError);
    a.record_malformed(1);

    let mut b = RunningTotals::new();
    b.record(StatusClass::ServerError);
    b.record(StatusClass::Unknown);

    let mut ab = a;
    ab.merge(&b);
    let mut ba = b;
    ba.merge(&a);

    assert_eq!(ab, ba);
    assert_eq!(ab.total, ab.count_2xx + ab.count_4xx + ab.count_5xx);
}

#[test]
fn accumulator_under_parallel_merges() {
    let accumulator = RateAccumulator::new();

    (0..1000u64).into_par_iter().for_each(|i| {
        let class = match i % 4 {
            0 | 1 => StatusClass::Success,
            2 => StatusClass::ClientError,
            _ => StatusClass::ServerError,
        };
        if i % 2 == 0 {
            accumulator.record(class);
        } else {
            let mut local = RunningTotals::new();
            local.record(class);
            accumulator.merge(&local);
        }
    });

    let totals = accumulator.totals();
    assert_eq!(totals.total, 1000);
    assert_eq!(totals.count_2xx, 500);
    assert_eq!(totals.count_4xx, 250);
    assert_eq!(totals.count_5xx, 250);

    let snapshot = accumulator.snapshot();
    assert_eq!(snapshot.rate_2xx, 0.5);
    assert_eq!(snapshot.rate_4xx, 0.25);
    assert_eq!(accumulator.into_totals(), totals);
}
