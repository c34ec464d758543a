//! Table-driven JSONata cases run through the public facade.

#[macro_use]
mod cases;

use indoc::indoc;
use jsonata_sandbox::serde_json::json;
use jsonata_sandbox::{
    Bindings, Engine, EngineOptions, EngineSource, Error, EvaluationOptions, HostValue,
};
use once_cell::sync::Lazy;
use std::time::Duration;

static ENGINE: Lazy<Engine> = Lazy::new(|| {
    let source = include_str!("../core/tests/fixtures/jsonata-lite.js");
    Engine::new(EngineOptions::default().with_source(EngineSource::Inline(source.to_string())))
        .expect("fixture engine should bootstrap")
});

/// Parses and evaluates `source` with a generous deadline and depth cap.
fn evaluate(source: &str) -> Result<HostValue, Error> {
    let options = EvaluationOptions::default()
        .with_deadline(Duration::from_secs(5))?
        .with_max_depth(100)?;
    let expr = ENGINE.parse(source, &options)?;
    let input = HostValue::from(json!({
        "account": {
            "name": "Firefly",
            "orders": [
                {"id": "A1", "price": 34.45, "quantity": 2},
                {"id": "B2", "price": 21.67, "quantity": 1},
                {"id": "C3", "price": 107.99, "quantity": 4}
            ]
        }
    }));
    expr.evaluate(&input, &Bindings::new())
}

test_case! {
    name: arithmetic_precedence,
    input: "1 + 2 * 3 - 4 / 2",
    result: { HostValue::from(json!(5)) },
}

test_case! {
    name: path_navigation,
    input: "account.name",
    result: { HostValue::from("Firefly") },
}

test_case! {
    name: path_over_array,
    input: "account.orders.id",
    result: { HostValue::from(json!(["A1", "B2", "C3"])) },
}

test_case! {
    name: predicate_filter,
    input: "account.orders[quantity > 1].id",
    result: { HostValue::from(json!(["A1", "C3"])) },
}

test_case! {
    name: index_predicate,
    input: "account.orders[-1].id",
    result: { HostValue::from("C3") },
}

test_case! {
    name: aggregate,
    input: "$count(account.orders)",
    result: { HostValue::from(json!(3)) },
}

test_case! {
    name: conditional,
    input: "$count(account.orders) > 2 ? \"many\" : \"few\"",
    result: { HostValue::from("many") },
}

test_case! {
    name: object_constructor,
    input: "{\"customer\": account.name, \"missing\": account.nothing, \"first\": account.orders[0].id}",
    result: { HostValue::from(json!({"customer": "Firefly", "first": "A1"})) },
}

test_case! {
    name: string_concatenation,
    input: "account.name & \": \" & $string($count(account.orders))",
    result: { HostValue::from("Firefly: 3") },
}

test_case! {
    name: block_with_lambda,
    input: indoc! {"
        (
            $double := function($x) { $x * 2 };
            $double(21)
        )
    "},
    result: { HostValue::from(json!(42)) },
}

test_case! {
    name: tail_recursion_runs_in_constant_stack,
    input: "($loop := function($n, $acc) { $n = 0 ? $acc : $loop($n - 1, $acc + 1) }; $loop(2000, 0))",
    result: { HostValue::from(json!(2000)) },
}

test_case! {
    name: comment_is_ignored,
    input: "/* total */ 40 + 2",
    result: { HostValue::from(json!(42)) },
}

test_case! {
    name: missing_input_field,
    input: "account.nothing",
    result: { HostValue::Missing },
}

test_case! {
    name: left_operand_not_number,
    input: "account.name * 2",
    code: { Some("T2001") },
    error: { indoc! {"
        [T2001] Error: The left side of the \"*\" operator must evaluate to a number
    "} },
}

test_case! {
    name: right_operand_not_number,
    input: "2 - account.name",
    code: { Some("T2002") },
}

test_case! {
    name: invoke_non_function,
    input: "$nope(1)",
    code: { Some("T1006") },
    error: { indoc! {"
        [T1006] Error: Attempted to invoke a non-function
    "} },
}

test_case! {
    name: runaway_recursion_hits_depth_cap,
    input: "($f := function($x) { 1 + $f($x) }; $f(0))",
    code: { Some("U1001") },
    error: { indoc! {"
        [U1001] Error: Stack overflow error: Check for non-terminating recursive function. Consider rewriting as tail-recursive.
    "} },
}

test_case! {
    name: unary_operator_syntax_error,
    input: "1 + * 2",
    code: { Some("S0211") },
    error: { Ok(rendered) if rendered.contains("[S0211] Error:") && rendered.contains("1 + * 2") },
}

test_case! {
    name: unterminated_string,
    input: "\"abc",
    code: { Some("S0101") },
}

test_case! {
    name: unterminated_block,
    input: "(1; 2",
    code: { Some("S0203") },
}
