//! Deadlines, depth caps and native stack exhaustion.
//!
//! Every abort must surface as an evaluation error carrying one of the two
//! fixed messages, no matter which mechanism stopped the evaluation.

mod common;

use jsonata_sandbox_core::api::{
    Bindings, Error, EvaluationOptions, STACK_OVERFLOW_MESSAGE, TIMEOUT_MESSAGE,
};
use jsonata_sandbox_core::value::HostValue;
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::{Duration, Instant};

const INFINITE_TAIL_RECURSION: &str = "($inf := function(){ $inf() }; $inf())";
const EXPONENTIAL_RECURSION: &str = "($f1 := function($x){ $f1($x) + $f1($x) }; $f1(1))";

fn deadline(millis: u64) -> EvaluationOptions {
    EvaluationOptions::default()
        .with_deadline(Duration::from_millis(millis))
        .unwrap()
}

fn assert_timeout(err: &Error) {
    assert!(err.is_timeout(), "expected a timeout, got {err:?}");
    assert_eq!(err.to_string(), TIMEOUT_MESSAGE);
}

#[test]
fn test_deadline_stops_infinite_recursion() {
    let engine = common::engine();
    let expr = engine.parse(INFINITE_TAIL_RECURSION, &deadline(500)).unwrap();

    let started = Instant::now();
    let err = expr.evaluate(&HostValue::Missing, &Bindings::new()).unwrap_err();
    let elapsed = started.elapsed();

    assert_timeout(&err);
    assert!(elapsed >= Duration::from_millis(500), "{elapsed:?}");
    assert!(elapsed < Duration::from_secs(1), "{elapsed:?}");
}

#[test]
fn test_deadline_stops_catching_loop_in_registered_function() {
    let engine = common::engine();
    let expr = engine.parse("$spin()", &deadline(200)).unwrap();
    expr.register_function(
        "spin",
        "() => { for (;;) { try { for (;;) {} } catch (e) {} } }",
        None,
    )
    .unwrap();

    let started = Instant::now();
    let err = expr.evaluate(&HostValue::Missing, &Bindings::new()).unwrap_err();
    assert_timeout(&err);
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn test_deadline_bounds_binding_sources() {
    let engine = common::engine();
    let expr = engine.parse("$x", &deadline(100)).unwrap();
    let err = expr
        .bind("x", jsonata_sandbox_core::api::BindingValue::expression("(function () { for (;;) {} })()"))
        .unwrap_err();
    assert_timeout(&err);
}

#[test]
fn test_engine_recovers_after_timeout() {
    let engine = common::engine();
    let looping = engine.parse(INFINITE_TAIL_RECURSION, &deadline(100)).unwrap();
    assert_timeout(&looping.evaluate(&HostValue::Missing, &Bindings::new()).unwrap_err());

    let expr = engine.parse("1 + 1", &EvaluationOptions::default()).unwrap();
    assert_eq!(expr.evaluate(&HostValue::Missing, &Bindings::new()).unwrap(), HostValue::from(json!(2)));

    // The same expression can run again and time out again.
    assert_timeout(&looping.evaluate(&HostValue::Missing, &Bindings::new()).unwrap_err());
}

#[test]
fn test_depth_cap_stops_recursion() {
    let engine = common::engine();
    let options = EvaluationOptions::default().with_max_depth(10).unwrap();
    let expr = engine.parse(EXPONENTIAL_RECURSION, &options).unwrap();

    let err = expr.evaluate(&HostValue::Missing, &Bindings::new()).unwrap_err();
    assert!(err.is_recursion_overflow(), "{err:?}");
    assert_eq!(err.to_string(), STACK_OVERFLOW_MESSAGE);
    let classified = err.classified().unwrap();
    assert_eq!(classified.code(), Some("U1001"));
}

#[test]
fn test_depth_cap_allows_bounded_recursion() {
    let engine = common::engine();
    let options = EvaluationOptions::default().with_max_depth(200).unwrap();
    let expr = engine
        .parse("($f := function($n){ $n <= 0 ? 0 : $n + $f($n - 1) }; $f(5))", &options)
        .unwrap();
    assert_eq!(expr.evaluate(&HostValue::Missing, &Bindings::new()).unwrap(), HostValue::from(json!(15)));

    let shallow = EvaluationOptions::default().with_max_depth(10).unwrap();
    let expr = engine.parse("1 + 1", &shallow).unwrap();
    assert_eq!(expr.evaluate(&HostValue::Missing, &Bindings::new()).unwrap(), HostValue::from(json!(2)));
}

#[test]
fn test_depth_counter_resets_between_evaluations() {
    let engine = common::engine();
    let options = EvaluationOptions::default().with_max_depth(40).unwrap();
    let expr = engine
        .parse("($f := function($n){ $n <= 0 ? 0 : 1 + $f($n - 1) }; $f(3))", &options)
        .unwrap();
    for _ in 0..5 {
        assert_eq!(expr.evaluate(&HostValue::Missing, &Bindings::new()).unwrap(), HostValue::from(json!(3)));
    }
}

#[test]
fn test_native_stack_exhaustion_is_normalized() {
    let engine = common::engine();
    let expr = engine.parse(EXPONENTIAL_RECURSION, &EvaluationOptions::default()).unwrap();

    let err = expr.evaluate(&HostValue::Missing, &Bindings::new()).unwrap_err();
    assert!(err.is_recursion_overflow(), "{err:?}");
    assert_eq!(err.to_string(), STACK_OVERFLOW_MESSAGE);
    assert!(err.classified().unwrap().payload().is_none());
}

#[test]
fn test_both_limits_together() {
    let engine = common::engine();
    let options = deadline(500).with_max_depth(10).unwrap();

    let deep = engine.parse(EXPONENTIAL_RECURSION, &options).unwrap();
    assert!(deep.evaluate(&HostValue::Missing, &Bindings::new()).unwrap_err().is_recursion_overflow());

    let long = engine.parse(INFINITE_TAIL_RECURSION, &options).unwrap();
    assert_timeout(&long.evaluate(&HostValue::Missing, &Bindings::new()).unwrap_err());
}
