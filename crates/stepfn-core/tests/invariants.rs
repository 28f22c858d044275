//! Invariants for the maxima container.
//!
//! These tests treat a plain `BTreeMap` plus a full recompute of the
//! local-maximum rule as the authoritative model, and check that the
//! incremental container agrees with it after every single operation.

use proptest::prelude::*;
use std::collections::BTreeMap;
use stepfn_core::FunctionMaxima;

#[derive(Clone, Copy, Debug)]
enum Step {
    Set(i64, i64),
    Erase(i64),
}

/// Arguments and values drawn from small ranges so sequences collide often:
/// updates, plateaus, and erases of present points all occur routinely.
fn arb_step() -> impl Strategy<Value = Step> {
    prop_oneof![
        3 => (0i64..12, -6i64..6).prop_map(|(a, v)| Step::Set(a, v)),
        1 => (0i64..12).prop_map(Step::Erase),
    ]
}

/// Full recompute of the maxima view from the model: keep every point whose
/// neighbors (where present) are not strictly greater, then order by value
/// descending and argument ascending on ties.
fn naive_maxima(model: &BTreeMap<i64, i64>) -> Vec<(i64, i64)> {
    let pts: Vec<(i64, i64)> = model.iter().map(|(&a, &v)| (a, v)).collect();
    let mut mx: Vec<(i64, i64)> = pts
        .iter()
        .enumerate()
        .filter(|&(i, &(_, v))| {
            let left_ok = i == 0 || pts[i - 1].1 <= v;
            let right_ok = i + 1 == pts.len() || pts[i + 1].1 <= v;
            left_ok && right_ok
        })
        .map(|(_, &p)| p)
        .collect();
    mx.sort_by(|x, y| y.1.cmp(&x.1).then(x.0.cmp(&y.0)));
    mx
}

fn function_view(f: &FunctionMaxima<i64, i64>) -> Vec<(i64, i64)> {
    f.iter().map(|p| (*p.arg(), *p.value())).collect()
}

fn maxima_view(f: &FunctionMaxima<i64, i64>) -> Vec<(i64, i64)> {
    f.maxima().map(|p| (*p.arg(), *p.value())).collect()
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256, // checked after every op, so sequences stay short
        .. ProptestConfig::default()
    })]

    // Invariant: after every operation, both views match the naive model.
    #[test]
    fn views_match_naive_recompute(steps in prop::collection::vec(arb_step(), 1..48)) {
        let mut f = FunctionMaxima::new();
        let mut model = BTreeMap::new();

        for step in steps {
            match step {
                Step::Set(a, v) => {
                    f.set_value(a, v);
                    model.insert(a, v);
                }
                Step::Erase(a) => {
                    f.erase(&a);
                    model.remove(&a);
                }
            }

            let expect: Vec<(i64, i64)> = model.iter().map(|(&a, &v)| (a, v)).collect();
            prop_assert_eq!(function_view(&f), expect);
            prop_assert_eq!(maxima_view(&f), naive_maxima(&model));
            prop_assert_eq!(f.len(), model.len());
        }
    }

    // Ordering law: the function view is strictly increasing in argument;
    // the maxima view is non-increasing in value with strictly increasing
    // arguments among value-ties.
    #[test]
    fn views_obey_their_orderings(steps in prop::collection::vec(arb_step(), 1..48)) {
        let mut f = FunctionMaxima::new();
        for step in steps {
            match step {
                Step::Set(a, v) => f.set_value(a, v),
                Step::Erase(a) => f.erase(&a),
            }
        }

        let fun = function_view(&f);
        for w in fun.windows(2) {
            prop_assert!(w[0].0 < w[1].0, "function view not strictly increasing: {w:?}");
        }

        let mx = maxima_view(&f);
        for w in mx.windows(2) {
            prop_assert!(w[0].1 >= w[1].1, "maxima view values increased: {w:?}");
            if w[0].1 == w[1].1 {
                prop_assert!(w[0].0 < w[1].0, "tied maxima not by ascending argument: {w:?}");
            }
        }
    }

    // Idempotence: re-setting every point to its current value changes
    // nothing in either view.
    #[test]
    fn equal_value_resets_are_idempotent(steps in prop::collection::vec(arb_step(), 1..48)) {
        let mut f = FunctionMaxima::new();
        for step in steps {
            match step {
                Step::Set(a, v) => f.set_value(a, v),
                Step::Erase(a) => f.erase(&a),
            }
        }

        let fun = function_view(&f);
        let mx = maxima_view(&f);
        for &(a, v) in &fun {
            f.set_value(a, v);
        }
        prop_assert_eq!(function_view(&f), fun);
        prop_assert_eq!(maxima_view(&f), mx);
    }

    // Lookup agreement: value_at and find answer exactly for the arguments
    // that are set.
    #[test]
    fn lookups_agree_with_the_model(steps in prop::collection::vec(arb_step(), 1..48)) {
        let mut f = FunctionMaxima::new();
        let mut model = BTreeMap::new();
        for step in steps {
            match step {
                Step::Set(a, v) => {
                    f.set_value(a, v);
                    model.insert(a, v);
                }
                Step::Erase(a) => {
                    f.erase(&a);
                    model.remove(&a);
                }
            }
        }

        for a in 0i64..12 {
            match model.get(&a) {
                Some(v) => {
                    prop_assert_eq!(f.value_at(&a), Ok(v));
                    let p = f.find(&a);
                    prop_assert!(p.is_some_and(|p| p.arg() == &a && p.value() == v));
                }
                None => {
                    prop_assert!(f.value_at(&a).is_err());
                    prop_assert!(f.find(&a).is_none());
                }
            }
        }
    }
}
