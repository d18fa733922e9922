//! Compiled expressions and the top-level compile entry points.

use crate::error::{ParsingError, RuntimeError};
use crate::eval_ctx::{EvaluationContext, EvaluationInput};
use crate::expression::Expression;
use crate::parsing_context::{ParseOptions, ParsingContext, TypeAnnotation};
use crate::property_spec::{PropertySpecification, PropertyValueType};
use crate::registry::ExpressionRegistry;
use crate::values::{Color, Value};
use serde_json::Value as Json;
use std::collections::{HashMap, HashSet};

/// A parsed expression together with the state its evaluations share: the
/// default value, the warn-once history and the colour parse cache.
///
/// Evaluation takes `&mut self`; callers evaluating from several threads
/// need one instance per thread.
#[derive(Debug, Clone)]
pub struct StyleExpression {
    pub expression: Expression,
    default_value: Value,
    enum_values: Option<Vec<String>>,
    warning_history: HashSet<String>,
    color_cache: HashMap<String, Option<Color>>,
}

impl StyleExpression {
    pub fn new(expression: Expression, spec: Option<&PropertySpecification>) -> Self {
        StyleExpression {
            expression,
            default_value: spec.map(PropertySpecification::default_value).unwrap_or_default(),
            enum_values: spec.and_then(PropertySpecification::enum_values),
            warning_history: HashSet::new(),
            color_cache: HashMap::new(),
        }
    }

    pub fn default_value(&self) -> &Value {
        &self.default_value
    }

    /// Evaluates and returns runtime errors to the caller.
    pub fn evaluate_without_error_handling(
        &mut self,
        input: EvaluationInput<'_>,
    ) -> Result<Value, RuntimeError> {
        let mut ctx = EvaluationContext::new(input, &mut self.color_cache);
        self.expression.evaluate(&mut ctx)
    }

    /// Evaluates, substituting the default value for `null`, NaN, values
    /// outside an enum, and runtime errors. Each distinct error message is
    /// logged once per instance.
    pub fn evaluate(&mut self, input: EvaluationInput<'_>) -> Value {
        match self.evaluate_checked(input) {
            Ok(Some(value)) => value,
            Ok(None) => self.default_value.clone(),
            Err(e) => {
                let message = e.to_string();
                if self.warning_history.insert(message.clone()) {
                    tracing::warn!(%message, "expression evaluation failed, using default");
                }
                self.default_value.clone()
            }
        }
    }

    fn evaluate_checked(&mut self, input: EvaluationInput<'_>) -> Result<Option<Value>, RuntimeError> {
        let value = self.evaluate_without_error_handling(input)?;
        match &value {
            Value::Null => return Ok(None),
            Value::Number(n) if n.is_nan() => return Ok(None),
            _ => {}
        }
        if let Some(allowed) = &self.enum_values {
            let found = value.to_string();
            if !allowed.iter().any(|v| *v == found) {
                let expected: Vec<String> = allowed.iter().map(|v| Json::from(v.as_str()).to_string()).collect();
                return Err(RuntimeError::Other(format!(
                    "Expected value to be one of {}, but found {} instead.",
                    expected.join(", "),
                    value.to_json()
                )));
            }
        }
        Ok(Some(value))
    }
}

/// Whether `value` is an array whose head names a registered operator.
pub fn is_expression(value: &Json) -> bool {
    is_expression_in(ExpressionRegistry::shared(), value)
}

pub fn is_expression_in(registry: &ExpressionRegistry, value: &Json) -> bool {
    value
        .as_array()
        .and_then(|items| items.first())
        .and_then(Json::as_str)
        .is_some_and(|name| registry.contains(name))
}

/// Parses and type-checks `expression` against the standard registry.
pub fn create_expression(
    expression: &Json,
    spec: Option<&PropertySpecification>,
) -> Result<StyleExpression, Vec<ParsingError>> {
    create_expression_in(ExpressionRegistry::shared(), expression, spec)
}

/// Parses and type-checks `expression`. String properties coerce their
/// result instead of asserting it.
pub fn create_expression_in(
    registry: &ExpressionRegistry,
    expression: &Json,
    spec: Option<&PropertySpecification>,
) -> Result<StyleExpression, Vec<ParsingError>> {
    let mut errors = Vec::new();
    let expected = spec.map(PropertySpecification::expected_type);
    let options = match spec {
        Some(spec) if spec.value_type == PropertyValueType::String => {
            ParseOptions::with_annotation(TypeAnnotation::Coerce)
        }
        _ => ParseOptions::default(),
    };
    let parsed = ParsingContext::new(registry, &mut errors, expected).parse_node(expression, options);
    match parsed {
        Some(parsed) if errors.is_empty() => Ok(StyleExpression::new(parsed, spec)),
        _ => {
            tracing::debug!(errors = errors.len(), "expression failed to parse");
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval_ctx::{Feature, GeometryType, GlobalProperties};
    use serde_json::json;

    fn spec(value: Json) -> PropertySpecification {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_null_falls_back_to_default() {
        let spec = spec(json!({"type": "number", "default": 4}));
        let mut e = create_expression(&json!(["get", "x"]), Some(&spec)).unwrap();
        let globals = GlobalProperties::default();
        let feature = Feature::new(GeometryType::Point);
        let out = e.evaluate(EvaluationInput::new(&globals).with_feature(&feature));
        assert_eq!(out, Value::Number(4.0));
    }

    #[test]
    fn test_runtime_error_is_returned_without_handling() {
        let spec = spec(json!({"type": "number", "default": 1}));
        let mut e = create_expression(&json!(["number", ["get", "x"]]), Some(&spec)).unwrap();
        let globals = GlobalProperties::default();
        let feature = Feature::new(GeometryType::Point).with_property("x", "abc");
        let input = EvaluationInput::new(&globals).with_feature(&feature);
        assert_eq!(
            e.evaluate_without_error_handling(input).unwrap_err().to_string(),
            "Expected value to be of type number, but found string instead."
        );
        assert_eq!(e.evaluate(input), Value::Number(1.0));
    }

    #[test]
    fn test_enum_membership() {
        let spec = spec(json!({"type": "enum", "values": {"a": {}, "b": {}}, "default": "a"}));
        let mut e = create_expression(&json!(["get", "x"]), Some(&spec)).unwrap();
        let globals = GlobalProperties::default();
        let ok = Feature::new(GeometryType::Point).with_property("x", "b");
        let bad = Feature::new(GeometryType::Point).with_property("x", "c");
        assert_eq!(e.evaluate(EvaluationInput::new(&globals).with_feature(&ok)), Value::from("b"));
        assert_eq!(e.evaluate(EvaluationInput::new(&globals).with_feature(&bad)), Value::from("a"));
        let err = e
            .evaluate_checked(EvaluationInput::new(&globals).with_feature(&bad))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            r#"Expected value to be one of "a", "b", but found "c" instead."#
        );
    }

    #[test]
    fn test_string_property_coerces() {
        let spec = spec(json!({"type": "string"}));
        let mut e = create_expression(&json!(["get", "n"]), Some(&spec)).unwrap();
        let globals = GlobalProperties::default();
        let feature = Feature::new(GeometryType::Point).with_property("n", 5.0);
        assert_eq!(
            e.evaluate(EvaluationInput::new(&globals).with_feature(&feature)),
            Value::from("5")
        );
    }

    #[test]
    fn test_is_expression() {
        assert!(is_expression(&json!(["get", "x"])));
        assert!(!is_expression(&json!(["nope"])));
        assert!(!is_expression(&json!([])));
        assert!(!is_expression(&json!({"stops": []})));
    }
}
