//! Integration tests for expression evaluation.

use serde_json::{json, Value as Json};
use style_expression::{
    create_expression, EvaluationInput, Feature, GeometryType, GlobalProperties, Value,
};

fn eval_with(expression: Json, globals: &GlobalProperties, feature: &Feature) -> Value {
    let mut compiled = create_expression(&expression, None)
        .unwrap_or_else(|e| panic!("create_expression({}) failed: {:?}", expression, e));
    let input = EvaluationInput::new(globals).with_feature(feature);
    compiled
        .evaluate_without_error_handling(input)
        .unwrap_or_else(|e| panic!("evaluate({}) failed: {}", expression, e))
}

fn check(expression: Json, expected: Json, feature: &Feature) {
    let result = eval_with(expression.clone(), &GlobalProperties::default(), feature);
    assert_eq!(result.to_json(), expected, "expression: {}", expression);
}

fn check_err(expression: Json, feature: &Feature) -> String {
    let mut compiled = create_expression(&expression, None)
        .unwrap_or_else(|e| panic!("create_expression({}) failed: {:?}", expression, e));
    let globals = GlobalProperties::default();
    compiled
        .evaluate_without_error_handling(EvaluationInput::new(&globals).with_feature(feature))
        .err()
        .unwrap_or_else(|| panic!("expected error for {}", expression))
        .to_string()
}

fn point() -> Feature {
    Feature::new(GeometryType::Point)
}

// ------------------------------------------------------------------ Branching

#[test]
fn test_case() {
    check(json!(["case", ["<", 1, 2], "a", "b"]), json!("a"), &point());
    check(json!(["case", [">", 1, 2], "a", "b"]), json!("b"), &point());
    check(
        json!(["case", ["has", "x"], "x", ["has", "y"], "y", "none"]),
        json!("y"),
        &point().with_property("y", 1.0),
    );
}

#[test]
fn test_match() {
    let expr = json!(["match", ["get", "x"], 1, "one", 2, "two", "other"]);
    check(expr.clone(), json!("one"), &point().with_property("x", 1.0));
    check(expr.clone(), json!("two"), &point().with_property("x", 2.0));
    check(expr.clone(), json!("other"), &point().with_property("x", 3.0));
    check(expr, json!("other"), &point().with_property("x", "1"));
}

#[test]
fn test_match_label_lists() {
    let expr = json!(["match", ["get", "k"], ["a", "b"], 1, ["c"], 2, 0]);
    check(expr.clone(), json!(1), &point().with_property("k", "b"));
    check(expr.clone(), json!(2), &point().with_property("k", "c"));
    check(expr, json!(0), &point().with_property("k", "d"));
}

#[test]
fn test_coalesce() {
    check(
        json!(["coalesce", ["get", "a"], ["get", "b"], "fallback"]),
        json!("b"),
        &point().with_property("b", "b"),
    );
    check(
        json!(["coalesce", ["get", "a"], ["get", "b"], "fallback"]),
        json!("fallback"),
        &point(),
    );
}

#[test]
fn test_let_var() {
    check(
        json!(["let", "a", 2, "b", 3, ["*", ["var", "a"], ["var", "b"]]]),
        json!(6),
        &point(),
    );
    check(
        json!(["let", "n", ["get", "n"], ["+", ["var", "n"], 1]]),
        json!(5),
        &point().with_property("n", 4.0),
    );
}

// ------------------------------------------------------------------ Curves

#[test]
fn test_interpolate_linear() {
    let expr = json!(["interpolate", ["linear"], ["zoom"], 0, 1, 10, 5]);
    let feature = point();
    for (zoom, expected) in [(-1.0, 1.0), (0.0, 1.0), (5.0, 3.0), (10.0, 5.0), (12.0, 5.0)] {
        let out = eval_with(expr.clone(), &GlobalProperties::at_zoom(zoom), &feature);
        assert_eq!(out, Value::Number(expected), "zoom {}", zoom);
    }
}

#[test]
fn test_step() {
    let expr = json!(["step", ["get", "n"], "small", 10, "medium", 100, "large"]);
    check(expr.clone(), json!("small"), &point().with_property("n", 5.0));
    check(expr.clone(), json!("medium"), &point().with_property("n", 10.0));
    check(expr, json!("large"), &point().with_property("n", 500.0));
}

// ------------------------------------------------------------------ Lookup

#[test]
fn test_get_has() {
    let feature = point().with_property("name", "park");
    check(json!(["get", "name"]), json!("park"), &feature);
    check(json!(["get", "missing"]), json!(null), &feature);
    check(json!(["has", "name"]), json!(true), &feature);
    check(json!(["has", "missing"]), json!(false), &feature);
    check(json!(["get", "b", ["literal", {"b": 2}]]), json!(2), &feature);
}

#[test]
fn test_feature_accessors() {
    let feature = Feature::new(GeometryType::LineString).with_id(7.0);
    check(json!(["geometry-type"]), json!("LineString"), &feature);
    check(json!(["id"]), json!(7), &feature);
    check(json!(["id"]), json!(null), &point());
}

#[test]
fn test_at_out_of_bounds() {
    let feature = point().with_property(
        "arr",
        Value::from(vec![Value::Number(1.0), Value::Number(2.0), Value::Number(3.0)]),
    );
    check(json!(["at", 1, ["array", ["get", "arr"]]]), json!(2), &feature);
    assert_eq!(
        check_err(json!(["at", 3, ["array", ["get", "arr"]]]), &feature),
        "Array index out of bounds: 3 > 2."
    );
}

// ------------------------------------------------------------------ Operators

#[test]
fn test_arithmetic() {
    let feature = point().with_property("n", 3.0);
    check(json!(["+", ["get", "n"], 1, 2]), json!(6), &feature);
    check(json!(["-", ["get", "n"]]), json!(-3), &feature);
    check(json!(["/", ["get", "n"], 2]), json!(1.5), &feature);
    check(json!(["%", ["get", "n"], 2]), json!(1), &feature);
    check(json!(["^", ["get", "n"], 2]), json!(9), &feature);
    check(json!(["max", ["get", "n"], 10, 4]), json!(10), &feature);
}

#[test]
fn test_boolean_short_circuit() {
    // The second operand would fail its assertion if it were evaluated.
    let feature = point().with_property("s", "text");
    check(
        json!(["any", true, ["boolean", ["get", "s"]]]),
        json!(true),
        &feature,
    );
    check(
        json!(["all", false, ["boolean", ["get", "s"]]]),
        json!(false),
        &feature,
    );
}

#[test]
fn test_string_operators() {
    let feature = point().with_property("name", "Main St");
    check(json!(["upcase", ["get", "name"]]), json!("MAIN ST"), &feature);
    check(json!(["downcase", ["get", "name"]]), json!("main st"), &feature);
    check(
        json!(["concat", ["get", "name"], " #", 4]),
        json!("Main St #4"),
        &feature,
    );
}

#[test]
fn test_collator_ordering() {
    let feature = point();
    let case = json!(["collator", {"case-sensitive": true}]);
    let accent = json!(["collator", {"diacritic-sensitive": true}]);
    check(json!(["<", "a", "B", case.clone()]), json!(true), &feature);
    check(json!([">", "B", "a", case.clone()]), json!(true), &feature);
    check(json!(["<", "a", "A", case.clone()]), json!(true), &feature);
    check(json!(["==", "é", "e", case]), json!(true), &feature);
    check(json!(["<", "é", "f", accent.clone()]), json!(true), &feature);
    check(json!([">", "é", "e", accent.clone()]), json!(true), &feature);
    check(json!(["==", "É", "é", accent]), json!(true), &feature);
    check(json!(["<", "Zebra", "apple", ["collator", {}]]), json!(false), &feature);
}

#[test]
fn test_in_and_index_of() {
    let feature = point();
    check(json!(["in", "b", "abc"]), json!(true), &feature);
    check(json!(["in", null, "abc"]), json!(false), &feature);
    check(json!(["in", null, "not null"]), json!(true), &feature);
    check(json!(["in", null, ["literal", [1, null]]]), json!(true), &feature);
    check(json!(["index-of", null, "abc"]), json!(-1), &feature);
    check(json!(["index-of", "c", "abc"]), json!(2), &feature);
}

#[test]
fn test_index_of_negative_start() {
    let feature = point();
    check(json!(["index-of", "a", "abca", -1]), json!(0), &feature);
    check(json!(["index-of", "a", "abca", -10]), json!(0), &feature);
    check(json!(["index-of", "a", "abca", 1]), json!(3), &feature);
    let items = json!(["literal", ["a", "b", "c", "a"]]);
    check(json!(["index-of", "a", items.clone(), -1]), json!(3), &feature);
    check(json!(["index-of", "a", items.clone(), -10]), json!(0), &feature);
    check(json!(["index-of", "b", items, -1]), json!(-1), &feature);
}

#[test]
fn test_assertion_failure() {
    let feature = point().with_property("x", "abc");
    assert_eq!(
        check_err(json!(["number", ["get", "x"]]), &feature),
        "Expected value to be of type number, but found string instead."
    );
}

#[test]
fn test_error_operator() {
    assert_eq!(
        check_err(json!(["case", ["has", "x"], 1, ["error", "no x"]]), &point()),
        "no x"
    );
}

#[test]
fn test_typeof() {
    let feature = point()
        .with_property("n", 1.0)
        .with_property("s", "a")
        .with_property("b", true);
    check(json!(["typeof", ["get", "n"]]), json!("number"), &feature);
    check(json!(["typeof", ["get", "s"]]), json!("string"), &feature);
    check(json!(["typeof", ["get", "b"]]), json!("boolean"), &feature);
    check(json!(["typeof", ["get", "missing"]]), json!("null"), &feature);
}

#[test]
fn test_compare_across_types_is_an_error() {
    let feature = point().with_property("y", "1");
    let message = check_err(json!([">", ["get", "y"], 0]), &feature);
    assert_eq!(
        message,
        "Expected arguments for \">\" to be (string, string) or (number, number), but found (string, number) instead."
    );
}
