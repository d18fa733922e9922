//! Parse-time behaviour: error reporting, overload resolution, type
//! annotations and serialization.

use pretty_assertions::assert_eq;
use serde_json::{json, Value as Json};
use style_expression::{
    create_expression, EvaluationInput, ExpressionRegistry, Feature, GeometryType,
    GlobalProperties, ParseOptions, ParsingContext, ParsingError, PropertySpecification, Type,
};

fn parse_errors(expression: Json) -> Vec<ParsingError> {
    match create_expression(&expression, None) {
        Ok(_) => panic!("expected {} to fail to parse", expression),
        Err(errors) => errors,
    }
}

fn spec(value: Json) -> PropertySpecification {
    serde_json::from_value(value).unwrap()
}

#[test]
fn test_duplicate_match_labels() {
    let errors = parse_errors(json!(["match", ["get", "x"], 1, "a", 1, "b", "c"]));
    assert_eq!(errors, vec![ParsingError::new("[4]", "Branch labels must be unique.")]);

    let errors = parse_errors(json!(["match", ["get", "x"], ["a", "b"], 1, ["c", "a"], 2, 0]));
    assert_eq!(errors, vec![ParsingError::new("[4]", "Branch labels must be unique.")]);
}

#[test]
fn test_unknown_expression() {
    let errors = parse_errors(json!(["nope", 1]));
    assert_eq!(
        errors,
        vec![ParsingError::new(
            "[0]",
            "Unknown expression \"nope\". If you wanted a literal array, use [\"literal\", [...]]."
        )]
    );
}

#[test]
fn test_empty_array() {
    let errors = parse_errors(json!([]));
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].key, "");
    assert!(errors[0].message.starts_with("Expected an array with at least one element."));
}

#[test]
fn test_nested_error_keys() {
    let errors = parse_errors(json!(["+", 1, ["*", 2, "x"]]));
    assert_eq!(
        errors,
        vec![ParsingError::new("[2][2]", "Expected number but found string instead.")]
    );
}

#[test]
fn test_single_overload_reports_argument_errors() {
    let errors = parse_errors(json!(["+", "a", 1]));
    assert_eq!(
        errors,
        vec![ParsingError::new("[1]", "Expected number but found string instead.")]
    );
}

#[test]
fn test_failed_overloads_are_summarized() {
    let errors = parse_errors(json!(["all", 1, 2]));
    assert_eq!(
        errors,
        vec![ParsingError::new(
            "",
            "Expected arguments of type (boolean, boolean) | (boolean...), but found (number, number) instead."
        )]
    );
}

#[test]
fn test_case_arity() {
    let errors = parse_errors(json!(["case", true, 1]));
    assert_eq!(
        errors,
        vec![ParsingError::new("", "Expected at least 3 arguments, but found only 2.")]
    );
    let errors = parse_errors(json!(["case", true, 1, false, 2]));
    assert_eq!(
        errors,
        vec![ParsingError::new("", "Expected an odd number of arguments.")]
    );
}

#[test]
fn test_expected_type_from_property() {
    let number = spec(json!({"type": "number"}));
    let errors = create_expression(&json!("not a number"), Some(&number)).unwrap_err();
    assert_eq!(
        errors,
        vec![ParsingError::new("", "Expected number but found string instead.")]
    );

    // Values of unknown type are asserted at runtime instead.
    assert!(create_expression(&json!(["get", "x"]), Some(&number)).is_ok());
}

#[test]
fn test_constant_subexpressions_fold() {
    let compiled = create_expression(&json!(["+", 1, ["*", 2, 3]]), None).unwrap();
    assert_eq!(compiled.expression.serialize(), json!(7));
}

#[test]
fn test_parsing_context_directly() {
    let mut errors = Vec::new();
    let parsed = ParsingContext::new(ExpressionRegistry::shared(), &mut errors, Some(Type::String))
        .parse_node(&json!(["get", "name"]), ParseOptions::default())
        .unwrap();
    assert!(errors.is_empty());
    assert_eq!(parsed.ty(), &Type::String);
}

/// Parsing the serialized form of a parsed expression gives an expression
/// of the same type that evaluates the same way.
#[test]
fn test_serialization_round_trip() {
    let expressions = [
        json!(["case", ["<", ["get", "n"], 2], "a", "b"]),
        json!(["match", ["get", "n"], [1, 2], "low", 3, "three", "other"]),
        json!(["interpolate", ["linear"], ["get", "n"], 0, 0, 10, 100]),
        json!(["interpolate", ["exponential", 2], ["get", "n"], 0, 0, 10, 100]),
        json!(["step", ["get", "n"], 0, 1, 10, 5, 20]),
        json!(["let", "x", ["get", "n"], ["*", ["var", "x"], ["var", "x"]]]),
        json!(["coalesce", ["get", "missing"], ["get", "n"]]),
        json!(["concat", "n=", ["to-string", ["get", "n"]]]),
        json!(["+", ["get", "n"], 1]),
        json!(["at", 1, ["literal", [10, 20, 30]]]),
        json!(["in", "b", ["literal", ["a", "b"]]]),
        json!(["to-color", ["get", "c"], "red"]),
    ];
    let globals = GlobalProperties::default();
    let features: Vec<Feature> = [0.0, 1.0, 3.0, 7.5, 15.0]
        .into_iter()
        .map(|n| {
            Feature::new(GeometryType::Point)
                .with_property("n", n)
                .with_property("c", "blue")
        })
        .collect();

    for expression in expressions {
        let mut first = create_expression(&expression, None)
            .unwrap_or_else(|e| panic!("{} failed to parse: {:?}", expression, e));
        let serialized = first.expression.serialize();
        let mut second = create_expression(&serialized, None)
            .unwrap_or_else(|e| panic!("{} failed to re-parse: {:?}", serialized, e));
        assert_eq!(first.expression.ty(), second.expression.ty(), "{}", expression);
        for feature in &features {
            let input = EvaluationInput::new(&globals).with_feature(feature);
            assert_eq!(
                first.evaluate_without_error_handling(input),
                second.evaluate_without_error_handling(input),
                "{} vs {}",
                expression,
                serialized
            );
        }
    }
}
