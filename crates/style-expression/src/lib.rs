//! Map-style expression engine.
//!
//! # Overview
//!
//! Style expressions are JSON arrays of the form `[operator, ...arguments]`
//! describing a paint or layout property value, or a feature filter, as a
//! function of zoom, feature properties, feature state and tile context.
//!
//! Compilation parses and type-checks the JSON against an
//! [`ExpressionRegistry`], producing an [`Expression`] tree. The tree is then
//! classified by its dependencies (constant, source, camera or composite) so
//! renderers can pick an evaluation strategy, and zoom-dependent properties
//! expose the stops of their top-level zoom curve.
//!
//! Two older formats are still accepted and converted on the way in: stop
//! functions ([`function`]) and legacy filters ([`feature_filter`]).
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use style_expression::{create_expression, EvaluationInput, Feature, GeometryType, GlobalProperties, Value};
//!
//! let mut expr = create_expression(&json!(["+", ["get", "a"], 1]), None).unwrap();
//! let globals = GlobalProperties::default();
//! let feature = Feature::new(GeometryType::Point).with_property("a", 2.0);
//! let out = expr.evaluate(EvaluationInput::new(&globals).with_feature(&feature));
//!
//! assert_eq!(out, Value::Number(3.0));
//! ```

pub mod definitions;
pub mod error;
pub mod eval_ctx;
pub mod expression;
pub mod feature_filter;
pub mod function;
pub mod is_constant;
pub mod operators;
pub mod parsing_context;
pub mod property_expression;
pub mod property_spec;
pub mod registry;
pub mod scope;
pub mod style_expression;
pub mod types;
pub mod util;
pub mod values;

// Re-export the core public API
pub use error::{ConvertError, FilterError, NormalizeError, ParsingError, RuntimeError};
pub use eval_ctx::{
    CanonicalTileId, EvaluationContext, EvaluationInput, Feature, FeatureState, GeometryType,
    GlobalProperties,
};
pub use expression::Expression;
pub use feature_filter::{create_filter, is_expression_filter, FeatureFilter};
pub use function::{convert_function, is_function};
pub use parsing_context::{ParseOptions, ParsingContext, TypeAnnotation};
pub use property_expression::{
    create_property_expression, find_zoom_curve, normalize_property_expression, EvaluationKind,
    StylePropertyExpression, ZoomConstantExpression, ZoomCurve, ZoomDependentExpression,
};
pub use property_spec::PropertySpecification;
pub use registry::ExpressionRegistry;
pub use style_expression::{create_expression, is_expression, StyleExpression};
pub use types::Type;
pub use values::{Color, Value};
