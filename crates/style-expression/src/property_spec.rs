//! Style-reference property specifications.
//!
//! These seed the expected type and default value of a compiled property
//! and decide which dependencies it may have.

use crate::types::Type;
use crate::values::{Color, Padding, Value};
use serde::{Deserialize, Serialize};
use serde_json::Value as Json;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyValueType {
    Number,
    String,
    Boolean,
    Enum,
    Color,
    Array,
    Padding,
    Formatted,
    ResolvedImage,
}

impl PropertyValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyValueType::Number => "number",
            PropertyValueType::String => "string",
            PropertyValueType::Boolean => "boolean",
            PropertyValueType::Enum => "enum",
            PropertyValueType::Color => "color",
            PropertyValueType::Array => "array",
            PropertyValueType::Padding => "padding",
            PropertyValueType::Formatted => "formatted",
            PropertyValueType::ResolvedImage => "resolvedImage",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PropertyType {
    DataDriven,
    DataConstant,
    CrossFaded,
    CrossFadedDataDriven,
    ColorRamp,
    Constant,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExpressionParameter {
    Zoom,
    Feature,
    FeatureState,
    HeatmapDensity,
    LineProgress,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpressionSupport {
    #[serde(default)]
    pub interpolated: bool,
    #[serde(default)]
    pub parameters: Vec<ExpressionParameter>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertySpecification {
    #[serde(rename = "type")]
    pub value_type: PropertyValueType,
    #[serde(rename = "property-type", default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<PropertyType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expression: Option<ExpressionSupport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Json>,
    /// Enum members, either a list of names or an object keyed by name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<Json>,
    /// Item type of an array property.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<PropertyValueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<usize>,
    #[serde(default)]
    pub tokens: bool,
}

impl PropertySpecification {
    pub fn new(value_type: PropertyValueType) -> Self {
        PropertySpecification {
            value_type,
            property_type: None,
            expression: None,
            default: None,
            values: None,
            value: None,
            length: None,
            tokens: false,
        }
    }

    /// The type a property expression must produce.
    pub fn expected_type(&self) -> Type {
        if self.value_type == PropertyValueType::Array {
            let item = self.value.map(scalar_type).unwrap_or(Type::Value);
            return Type::array(item, self.length);
        }
        scalar_type(self.value_type)
    }

    /// The value substituted for null, NaN and failed evaluations.
    pub fn default_value(&self) -> Value {
        match (self.value_type, &self.default) {
            // A colour ramp default is itself a function.
            (PropertyValueType::Color, Some(Json::Object(_))) => Value::Color(Color::TRANSPARENT),
            (PropertyValueType::Color, Some(Json::String(s))) => {
                Color::parse(s).map(Value::Color).unwrap_or_default()
            }
            (PropertyValueType::Color, _) => Value::Null,
            (PropertyValueType::Padding, Some(default)) => Padding::parse(&Value::from(default))
                .map(Value::Padding)
                .unwrap_or_default(),
            (_, Some(default)) => Value::from(default),
            (_, None) => Value::Null,
        }
    }

    /// Names accepted by an enum property.
    pub fn enum_values(&self) -> Option<Vec<String>> {
        if self.value_type != PropertyValueType::Enum {
            return None;
        }
        match self.values.as_ref()? {
            Json::Object(map) => Some(map.keys().cloned().collect()),
            Json::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|v| v.as_str().map(str::to_string))
                    .collect(),
            ),
            _ => None,
        }
    }

    pub fn supports_property_expression(&self) -> bool {
        matches!(
            self.property_type,
            Some(PropertyType::DataDriven | PropertyType::CrossFadedDataDriven)
        )
    }

    pub fn supports_zoom_expression(&self) -> bool {
        self.expression
            .as_ref()
            .is_some_and(|e| e.parameters.contains(&ExpressionParameter::Zoom))
    }

    pub fn supports_interpolation(&self) -> bool {
        self.expression.as_ref().is_some_and(|e| e.interpolated)
    }
}

fn scalar_type(t: PropertyValueType) -> Type {
    match t {
        PropertyValueType::Number => Type::Number,
        PropertyValueType::String | PropertyValueType::Enum => Type::String,
        PropertyValueType::Boolean => Type::Boolean,
        PropertyValueType::Color => Type::Color,
        PropertyValueType::Padding => Type::Padding,
        PropertyValueType::Formatted => Type::Formatted,
        PropertyValueType::ResolvedImage => Type::ResolvedImage,
        PropertyValueType::Array => Type::Value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_style_reference_shape() {
        let spec: PropertySpecification = serde_json::from_value(json!({
            "type": "array",
            "value": "number",
            "length": 2,
            "property-type": "data-constant",
            "expression": {"interpolated": true, "parameters": ["zoom"]},
            "default": [0, 0]
        }))
        .unwrap();
        assert_eq!(spec.expected_type(), Type::array(Type::Number, Some(2)));
        assert!(spec.supports_zoom_expression());
        assert!(spec.supports_interpolation());
        assert!(!spec.supports_property_expression());
        assert_eq!(spec.default_value(), Value::from(json!([0, 0])));
    }

    #[test]
    fn test_enum_values() {
        let spec: PropertySpecification = serde_json::from_value(json!({
            "type": "enum",
            "values": {"butt": {}, "round": {}, "square": {}},
            "default": "butt"
        }))
        .unwrap();
        assert_eq!(spec.expected_type(), Type::String);
        assert_eq!(
            spec.enum_values(),
            Some(vec!["butt".to_string(), "round".to_string(), "square".to_string()])
        );
    }

    #[test]
    fn test_color_defaults() {
        let mut spec = PropertySpecification::new(PropertyValueType::Color);
        spec.default = Some(json!("#ff0000"));
        assert_eq!(spec.default_value(), Value::Color(Color::RED));
        spec.default = Some(json!({"stops": [[0, "red"]]}));
        assert_eq!(spec.default_value(), Value::Color(Color::TRANSPARENT));
        spec.default = None;
        assert_eq!(spec.default_value(), Value::Null);
    }
}
