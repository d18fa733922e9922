//! Classification and evaluation of property expressions.

use pretty_assertions::assert_eq;
use serde_json::{json, Value as Json};
use style_expression::definitions::InterpolationType;
use style_expression::{
    create_property_expression, normalize_property_expression, Color, EvaluationInput,
    EvaluationKind, Feature, GeometryType, GlobalProperties, NormalizeError, ParsingError,
    PropertySpecification, Value,
};

fn spec(value: Json) -> PropertySpecification {
    serde_json::from_value(value).unwrap()
}

fn data_driven_number() -> PropertySpecification {
    spec(json!({
        "type": "number",
        "default": 1,
        "property-type": "data-driven",
        "expression": {"interpolated": true, "parameters": ["zoom", "feature", "feature-state"]}
    }))
}

fn errors_of(expression: Json, spec: &PropertySpecification) -> Vec<ParsingError> {
    match create_property_expression(&expression, spec) {
        Ok(compiled) => panic!("{} compiled as {}", expression, compiled.kind()),
        Err(errors) => errors,
    }
}

#[test]
fn test_constant_and_source() {
    let spec = data_driven_number();
    let constant = create_property_expression(&json!(["+", 1, 2]), &spec).unwrap();
    assert_eq!(constant.kind(), EvaluationKind::Constant);
    assert_eq!(constant.zoom_stops(), None);

    let source = create_property_expression(&json!(["get", "size"]), &spec).unwrap();
    assert_eq!(source.kind(), EvaluationKind::Source);
    assert!(!source.is_state_dependent());
    assert_eq!(source.interpolation_factor(5.0, 0.0, 10.0), None);
}

#[test]
fn test_camera_and_composite() {
    let spec = data_driven_number();
    let camera =
        create_property_expression(&json!(["interpolate", ["linear"], ["zoom"], 0, 1, 10, 5]), &spec)
            .unwrap();
    assert_eq!(camera.kind(), EvaluationKind::Camera);
    assert_eq!(camera.zoom_stops(), Some(&[0.0, 10.0][..]));
    assert_eq!(camera.interpolation_type(), Some(InterpolationType::Linear));
    assert_eq!(camera.interpolation_factor(5.0, 0.0, 10.0), Some(0.5));

    let composite = create_property_expression(
        &json!(["interpolate", ["linear"], ["zoom"], 0, ["get", "a"], 10, 5]),
        &spec,
    )
    .unwrap();
    assert_eq!(composite.kind(), EvaluationKind::Composite);
    assert_eq!(composite.zoom_stops(), Some(&[0.0, 10.0][..]));
}

#[test]
fn test_step_curve_inside_coalesce() {
    let spec = data_driven_number();
    let compiled = create_property_expression(
        &json!(["coalesce", ["step", ["zoom"], 1, 5, 2], 0]),
        &spec,
    )
    .unwrap();
    assert_eq!(compiled.kind(), EvaluationKind::Camera);
    assert_eq!(compiled.interpolation_type(), None);
    assert_eq!(compiled.zoom_stops(), Some(&[f64::NEG_INFINITY, 5.0][..]));
    assert_eq!(compiled.interpolation_factor(3.0, 0.0, 5.0), Some(0.0));
}

#[test]
fn test_zoom_must_be_a_top_level_curve_input() {
    let spec = data_driven_number();
    let message = "\"zoom\" expression may only be used as input to a top-level \"step\" or \"interpolate\" expression.";
    assert_eq!(
        errors_of(json!(["+", ["interpolate", ["linear"], ["zoom"], 0, 0, 1, 1], 1]), &spec),
        vec![ParsingError::new("", message)]
    );
    assert_eq!(
        errors_of(json!(["*", ["zoom"], 2]), &spec),
        vec![ParsingError::new("", message)]
    );
}

#[test]
fn test_property_capabilities() {
    let constant_only = spec(json!({
        "type": "number",
        "property-type": "data-constant",
        "expression": {"interpolated": false, "parameters": ["zoom"]}
    }));
    assert_eq!(
        errors_of(json!(["get", "a"]), &constant_only),
        vec![ParsingError::new("", "data expressions not supported")]
    );
    assert_eq!(
        errors_of(json!(["interpolate", ["linear"], ["zoom"], 0, 1, 10, 5]), &constant_only),
        vec![ParsingError::new(
            "",
            "\"interpolate\" expressions cannot be used with this property"
        )]
    );
    assert!(create_property_expression(&json!(["step", ["zoom"], 1, 10, 5]), &constant_only).is_ok());

    let no_zoom = spec(json!({"type": "number", "property-type": "constant"}));
    assert_eq!(
        errors_of(json!(["step", ["zoom"], 1, 10, 5]), &no_zoom),
        vec![ParsingError::new("", "zoom expressions not supported")]
    );
}

#[test]
fn test_feature_state_dependency() {
    let spec = data_driven_number();
    let compiled =
        create_property_expression(&json!(["number", ["feature-state", "hover"], 0]), &spec)
            .unwrap();
    assert_eq!(compiled.kind(), EvaluationKind::Source);
    assert!(compiled.is_state_dependent());
}

#[test]
fn test_evaluate_falls_back_to_default() {
    let spec = data_driven_number();
    let mut compiled = create_property_expression(&json!(["get", "size"]), &spec).unwrap();
    let globals = GlobalProperties::default();
    let sized = Feature::new(GeometryType::Point).with_property("size", 3.0);
    let r#unsized = Feature::new(GeometryType::Point).with_property("size", "big");

    assert_eq!(
        compiled.evaluate(EvaluationInput::new(&globals).with_feature(&sized)),
        Value::Number(3.0)
    );
    assert_eq!(
        compiled.evaluate(EvaluationInput::new(&globals).with_feature(&r#unsized)),
        Value::Number(1.0)
    );
    assert!(compiled
        .evaluate_without_error_handling(EvaluationInput::new(&globals).with_feature(&r#unsized))
        .is_err());
}

#[test]
fn test_normalize_constants() {
    let color = spec(json!({"type": "color", "default": "#000000", "property-type": "data-driven"}));
    let mut compiled = normalize_property_expression(&json!("red"), &color).unwrap();
    assert_eq!(compiled.kind(), EvaluationKind::Constant);
    let globals = GlobalProperties::default();
    assert_eq!(
        compiled.evaluate(EvaluationInput::new(&globals)),
        Value::Color(Color::RED)
    );

    let number = data_driven_number();
    let mut compiled = normalize_property_expression(&Json::Null, &number).unwrap();
    assert_eq!(compiled.evaluate(EvaluationInput::new(&globals)), Value::Number(1.0));
}

#[test]
fn test_normalize_functions() {
    let spec = data_driven_number();
    let mut camera =
        normalize_property_expression(&json!({"stops": [[0, 1], [10, 5]]}), &spec).unwrap();
    assert_eq!(camera.kind(), EvaluationKind::Camera);
    assert_eq!(camera.zoom_stops(), Some(&[0.0, 10.0][..]));
    let globals = GlobalProperties::at_zoom(5.0);
    assert_eq!(camera.evaluate(EvaluationInput::new(&globals)), Value::Number(3.0));

    let source = normalize_property_expression(
        &json!({"property": "size", "type": "identity"}),
        &spec,
    )
    .unwrap();
    assert_eq!(source.kind(), EvaluationKind::Source);

    let err = normalize_property_expression(&json!({"stops": [[0, 1]], "type": "bogus"}), &spec)
        .unwrap_err();
    assert!(matches!(err, NormalizeError::Convert(_)));
    assert_eq!(err.to_string(), "Unknown zoom function type \"bogus\"");
}

#[test]
fn test_normalize_expressions() {
    let spec = data_driven_number();
    let compiled = normalize_property_expression(&json!(["get", "size"]), &spec).unwrap();
    assert_eq!(compiled.kind(), EvaluationKind::Source);

    let err = normalize_property_expression(&json!(["get", 1]), &spec).unwrap_err();
    assert!(matches!(err, NormalizeError::Parse(_)));
}
