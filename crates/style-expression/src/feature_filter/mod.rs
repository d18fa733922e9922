//! Feature filters.
//!
//! A layer filter is either a boolean expression or a legacy filter such as
//! `["==", "class", "park"]`. The two grammars overlap, so
//! [`is_expression_filter`] decides which one a given value is written in.

mod convert;
mod legacy;

pub use convert::convert_filter;
pub use legacy::legacy_filter_to_expression;

use crate::error::FilterError;
use crate::eval_ctx::{CanonicalTileId, EvaluationInput, Feature, GlobalProperties};
use crate::property_spec::{
    ExpressionParameter, ExpressionSupport, PropertySpecification, PropertyType, PropertyValueType,
};
use crate::style_expression::{create_expression, StyleExpression};
use crate::values::Value;
use serde_json::Value as Json;

/// Whether `filter` is written in the expression grammar. Ambiguous forms
/// such as `["in", "color", "red"]` are read as legacy filters.
pub fn is_expression_filter(filter: &Json) -> bool {
    let items = match filter {
        Json::Bool(_) => return true,
        Json::Array(items) if !items.is_empty() => items,
        _ => return false,
    };
    match items[0].as_str() {
        Some("has") => items.len() >= 2 && items[1] != "$id" && items[1] != "$type",
        Some("in") => items.len() >= 3 && (!items[1].is_string() || items[2].is_array()),
        Some("!in" | "!has" | "none") => false,
        Some("==" | "!=" | ">" | ">=" | "<" | "<=") => {
            items.len() != 3 || items[1].is_array() || items[2].is_array()
        }
        Some("any" | "all") => items[1..]
            .iter()
            .all(|f| is_expression_filter(f) || f.is_boolean()),
        _ => true,
    }
}

fn filter_spec() -> PropertySpecification {
    PropertySpecification {
        property_type: Some(PropertyType::DataDriven),
        expression: Some(ExpressionSupport {
            interpolated: false,
            parameters: vec![ExpressionParameter::Zoom, ExpressionParameter::Feature],
        }),
        default: Some(Json::Bool(false)),
        ..PropertySpecification::new(PropertyValueType::Boolean)
    }
}

/// A compiled filter. Evaluation errors count as a rejection.
#[derive(Debug, Clone)]
pub struct FeatureFilter {
    expression: Option<StyleExpression>,
}

impl FeatureFilter {
    /// A filter that accepts every feature.
    pub fn accept_all() -> Self {
        FeatureFilter { expression: None }
    }

    pub fn filter(
        &mut self,
        globals: &GlobalProperties,
        feature: &Feature,
        canonical: Option<&CanonicalTileId>,
    ) -> bool {
        let Some(expression) = self.expression.as_mut() else {
            return true;
        };
        let mut input = EvaluationInput::new(globals).with_feature(feature);
        if let Some(canonical) = canonical {
            input = input.with_canonical(canonical);
        }
        matches!(expression.evaluate(input), Value::Boolean(true))
    }
}

/// Compiles a layer filter. An absent (or `null`) filter accepts everything;
/// a legacy filter is lowered onto the `filter-*` primitives first.
pub fn create_filter(filter: Option<&Json>) -> Result<FeatureFilter, FilterError> {
    let filter = match filter {
        None | Some(Json::Null) => return Ok(FeatureFilter::accept_all()),
        Some(filter) => filter,
    };
    let lowered;
    let expression = if is_expression_filter(filter) {
        filter
    } else {
        lowered = legacy_filter_to_expression(filter);
        tracing::trace!(%filter, %lowered, "lowered legacy filter");
        &lowered
    };
    let spec = filter_spec();
    let compiled = create_expression(expression, Some(&spec)).map_err(FilterError)?;
    Ok(FeatureFilter {
        expression: Some(compiled),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval_ctx::GeometryType;
    use serde_json::json;

    #[test]
    fn test_legacy_detection() {
        assert!(!is_expression_filter(&json!(["in", "color", "red", "blue"])));
        assert!(!is_expression_filter(&json!(["in", "value", 42])));
        assert!(!is_expression_filter(&json!(["in", "value", true])));
        assert!(!is_expression_filter(&json!(["in", "color", "red"])));
        assert!(!is_expression_filter(&json!(["has", "$id"])));
        assert!(!is_expression_filter(&json!(["any", ["==", "a", 1], true])));
    }

    #[test]
    fn test_expression_detection() {
        assert!(is_expression_filter(&json!(true)));
        assert!(is_expression_filter(&json!(["in", ["get", "color"], "reddish"])));
        assert!(is_expression_filter(&json!(["in", ["get", "color"], ["red", "blue"]])));
        assert!(is_expression_filter(&json!(["in", 42, 42])));
        assert!(is_expression_filter(&json!(["in", "red", ["get", "colors"]])));
        assert!(is_expression_filter(&json!(["==", ["get", "a"], 1])));
        assert!(is_expression_filter(&json!(["all", true, ["has", "a"]])));
    }

    #[test]
    fn test_absent_filter_accepts_everything() {
        let globals = GlobalProperties::default();
        let feature = Feature::new(GeometryType::Polygon);
        assert!(create_filter(None).unwrap().filter(&globals, &feature, None));
        assert!(create_filter(Some(&Json::Null)).unwrap().filter(&globals, &feature, None));
    }

    #[test]
    fn test_type_errors_reject_at_compile_time() {
        assert!(create_filter(Some(&json!(["==", ["number", ["get", "x"]], ["string", ["get", "y"]]]))).is_err());
        assert!(create_filter(Some(&json!(["number", ["get", "x"]]))).is_err());
        assert!(create_filter(Some(&json!(["boolean", ["get", "x"]]))).is_ok());
    }
}
