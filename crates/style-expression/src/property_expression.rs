//! Classification of property expressions by what they depend on.
//!
//! A property expression is one of four kinds:
//!
//! | kind        | reads the feature | reads the zoom |
//! |-------------|-------------------|----------------|
//! | `constant`  | no                | no             |
//! | `source`    | yes               | no             |
//! | `camera`    | no                | yes            |
//! | `composite` | yes               | yes            |
//!
//! Zoom may only be read as the input of a single top-level `step` or
//! `interpolate` (the zoom curve), optionally wrapped in `let` or
//! `coalesce`. Its stops are exposed so callers can evaluate at stop zooms
//! and interpolate in between.

use crate::definitions::{Interpolate, InterpolationType, Literal, Step};
use crate::error::{NormalizeError, ParsingError, RuntimeError};
use crate::eval_ctx::EvaluationInput;
use crate::expression::Expression;
use crate::function::{convert_function, is_function};
use crate::is_constant::{is_feature_constant, is_global_property_constant, is_state_constant};
use crate::property_spec::{PropertySpecification, PropertyValueType};
use crate::style_expression::{create_expression, is_expression, StyleExpression};
use crate::values::{type_of, Color, Padding, Value};
use serde_json::Value as Json;
use std::fmt;

const ZOOM_NOT_TOP_LEVEL: &str =
    "\"zoom\" expression may only be used as input to a top-level \"step\" or \"interpolate\" expression.";
const MULTIPLE_ZOOM_CURVES: &str =
    "Only one zoom-based \"step\" or \"interpolate\" subexpression may be used in an expression.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvaluationKind {
    Constant,
    Source,
    Camera,
    Composite,
}

impl EvaluationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationKind::Constant => "constant",
            EvaluationKind::Source => "source",
            EvaluationKind::Camera => "camera",
            EvaluationKind::Composite => "composite",
        }
    }
}

impl fmt::Display for EvaluationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The zoom-keyed `step` or `interpolate` of an expression.
#[derive(Debug, Clone, Copy)]
pub enum ZoomCurve<'e> {
    Step(&'e Step),
    Interpolate(&'e Interpolate),
}

impl<'e> ZoomCurve<'e> {
    pub fn labels(&self) -> &'e [f64] {
        match self {
            ZoomCurve::Step(s) => &s.labels,
            ZoomCurve::Interpolate(i) => &i.labels,
        }
    }

    pub fn interpolation_type(&self) -> Option<InterpolationType> {
        match self {
            ZoomCurve::Step(_) => None,
            ZoomCurve::Interpolate(i) => Some(i.interpolation),
        }
    }

    fn same_node(&self, other: &ZoomCurve<'_>) -> bool {
        match (self, other) {
            (ZoomCurve::Step(a), ZoomCurve::Step(b)) => std::ptr::eq(*a, *b),
            (ZoomCurve::Interpolate(a), ZoomCurve::Interpolate(b)) => std::ptr::eq(*a, *b),
            _ => false,
        }
    }
}

/// Locates the zoom curve. Errors if a zoom curve is nested anywhere but
/// the top level or if there is more than one.
pub fn find_zoom_curve(e: &Expression) -> Result<Option<ZoomCurve<'_>>, ParsingError> {
    let result = match e {
        Expression::Let(l) => find_zoom_curve(&l.result)?,
        Expression::Coalesce(c) => {
            let mut found = None;
            for arg in &c.args {
                found = find_zoom_curve(arg)?;
                if found.is_some() {
                    break;
                }
            }
            found
        }
        Expression::Step(s) if s.input.compound_name() == Some("zoom") => Some(ZoomCurve::Step(s)),
        Expression::Interpolate(i) if i.input.compound_name() == Some("zoom") => {
            Some(ZoomCurve::Interpolate(i))
        }
        _ => None,
    };

    let mut error = None;
    e.each_child(&mut |child| {
        if error.is_some() {
            return;
        }
        match find_zoom_curve(child) {
            Err(err) => error = Some(err),
            Ok(None) => {}
            Ok(Some(child_curve)) => match &result {
                None => error = Some(ParsingError::new("", ZOOM_NOT_TOP_LEVEL)),
                Some(curve) if !curve.same_node(&child_curve) => {
                    error = Some(ParsingError::new("", MULTIPLE_ZOOM_CURVES))
                }
                Some(_) => {}
            },
        }
    });
    match error {
        Some(err) => Err(err),
        None => Ok(result),
    }
}

/// An expression without a zoom curve: `constant` or `source`.
#[derive(Debug, Clone)]
pub struct ZoomConstantExpression {
    pub expression: StyleExpression,
    pub is_state_dependent: bool,
}

impl ZoomConstantExpression {
    fn new(kind: EvaluationKind, expression: StyleExpression) -> Self {
        let is_state_dependent =
            kind != EvaluationKind::Constant && !is_state_constant(&expression.expression);
        ZoomConstantExpression {
            expression,
            is_state_dependent,
        }
    }
}

/// An expression with a zoom curve: `camera` or `composite`.
#[derive(Debug, Clone)]
pub struct ZoomDependentExpression {
    pub expression: StyleExpression,
    pub is_state_dependent: bool,
    pub zoom_stops: Vec<f64>,
    /// `None` for a `step` curve.
    pub interpolation_type: Option<InterpolationType>,
}

impl ZoomDependentExpression {
    fn new(
        kind: EvaluationKind,
        expression: StyleExpression,
        zoom_stops: Vec<f64>,
        interpolation_type: Option<InterpolationType>,
    ) -> Self {
        let is_state_dependent =
            kind != EvaluationKind::Camera && !is_state_constant(&expression.expression);
        ZoomDependentExpression {
            expression,
            is_state_dependent,
            zoom_stops,
            interpolation_type,
        }
    }

    pub fn interpolation_factor(&self, input: f64, lower: f64, upper: f64) -> f64 {
        match &self.interpolation_type {
            Some(t) => t.factor(input, lower, upper),
            None => 0.0,
        }
    }
}

/// A compiled property value, tagged with its evaluation kind.
#[derive(Debug, Clone)]
pub enum StylePropertyExpression {
    Constant(ZoomConstantExpression),
    Source(ZoomConstantExpression),
    Camera(ZoomDependentExpression),
    Composite(ZoomDependentExpression),
}

impl StylePropertyExpression {
    pub fn kind(&self) -> EvaluationKind {
        match self {
            StylePropertyExpression::Constant(_) => EvaluationKind::Constant,
            StylePropertyExpression::Source(_) => EvaluationKind::Source,
            StylePropertyExpression::Camera(_) => EvaluationKind::Camera,
            StylePropertyExpression::Composite(_) => EvaluationKind::Composite,
        }
    }

    pub fn style_expression(&self) -> &StyleExpression {
        match self {
            StylePropertyExpression::Constant(e) | StylePropertyExpression::Source(e) => &e.expression,
            StylePropertyExpression::Camera(e) | StylePropertyExpression::Composite(e) => &e.expression,
        }
    }

    fn style_expression_mut(&mut self) -> &mut StyleExpression {
        match self {
            StylePropertyExpression::Constant(e) | StylePropertyExpression::Source(e) => {
                &mut e.expression
            }
            StylePropertyExpression::Camera(e) | StylePropertyExpression::Composite(e) => {
                &mut e.expression
            }
        }
    }

    pub fn evaluate(&mut self, input: EvaluationInput<'_>) -> Value {
        self.style_expression_mut().evaluate(input)
    }

    pub fn evaluate_without_error_handling(
        &mut self,
        input: EvaluationInput<'_>,
    ) -> Result<Value, RuntimeError> {
        self.style_expression_mut().evaluate_without_error_handling(input)
    }

    pub fn is_state_dependent(&self) -> bool {
        match self {
            StylePropertyExpression::Constant(e) | StylePropertyExpression::Source(e) => {
                e.is_state_dependent
            }
            StylePropertyExpression::Camera(e) | StylePropertyExpression::Composite(e) => {
                e.is_state_dependent
            }
        }
    }

    pub fn zoom_stops(&self) -> Option<&[f64]> {
        match self {
            StylePropertyExpression::Camera(e) | StylePropertyExpression::Composite(e) => {
                Some(&e.zoom_stops)
            }
            _ => None,
        }
    }

    pub fn interpolation_type(&self) -> Option<InterpolationType> {
        match self {
            StylePropertyExpression::Camera(e) | StylePropertyExpression::Composite(e) => {
                e.interpolation_type
            }
            _ => None,
        }
    }

    /// Progress between two zoom stops; `None` for zoom-constant kinds.
    pub fn interpolation_factor(&self, input: f64, lower: f64, upper: f64) -> Option<f64> {
        match self {
            StylePropertyExpression::Camera(e) | StylePropertyExpression::Composite(e) => {
                Some(e.interpolation_factor(input, lower, upper))
            }
            _ => None,
        }
    }
}

fn single_error(message: &str) -> Vec<ParsingError> {
    vec![ParsingError::new("", message)]
}

/// Compiles `expression` for a property and classifies it.
pub fn create_property_expression(
    expression: &Json,
    spec: &PropertySpecification,
) -> Result<StylePropertyExpression, Vec<ParsingError>> {
    let style = create_expression(expression, Some(spec))?;
    let parsed = &style.expression;

    let feature_constant = is_feature_constant(parsed);
    if !feature_constant && !spec.supports_property_expression() {
        return Err(single_error("data expressions not supported"));
    }

    let zoom_constant = is_global_property_constant(parsed, &["zoom"]);
    if !zoom_constant && !spec.supports_zoom_expression() {
        return Err(single_error("zoom expressions not supported"));
    }

    let curve = find_zoom_curve(parsed).map_err(|e| vec![e])?;
    let curve = match curve {
        None if !zoom_constant => return Err(single_error(ZOOM_NOT_TOP_LEVEL)),
        Some(ZoomCurve::Interpolate(_)) if !spec.supports_interpolation() => {
            return Err(single_error(
                "\"interpolate\" expressions cannot be used with this property",
            ));
        }
        curve => curve.map(|c| (c.labels().to_vec(), c.interpolation_type())),
    };

    let compiled = match (curve, feature_constant) {
        (None, true) => {
            StylePropertyExpression::Constant(ZoomConstantExpression::new(EvaluationKind::Constant, style))
        }
        (None, false) => {
            StylePropertyExpression::Source(ZoomConstantExpression::new(EvaluationKind::Source, style))
        }
        (Some((stops, interpolation)), true) => StylePropertyExpression::Camera(
            ZoomDependentExpression::new(EvaluationKind::Camera, style, stops, interpolation),
        ),
        (Some((stops, interpolation)), false) => StylePropertyExpression::Composite(
            ZoomDependentExpression::new(EvaluationKind::Composite, style, stops, interpolation),
        ),
    };
    tracing::debug!(kind = %compiled.kind(), state_dependent = compiled.is_state_dependent(), "classified property expression");
    Ok(compiled)
}

/// Compiles any accepted property value: a stop function, an expression or
/// a plain constant.
pub fn normalize_property_expression(
    value: &Json,
    spec: &PropertySpecification,
) -> Result<StylePropertyExpression, NormalizeError> {
    if is_function(value) {
        let converted = convert_function(value, spec)?;
        return create_property_expression(&converted, spec).map_err(NormalizeError::Parse);
    }
    if is_expression(value) {
        return create_property_expression(value, spec).map_err(NormalizeError::Parse);
    }
    let constant = match (spec.value_type, value) {
        (PropertyValueType::Color, Json::String(s)) => {
            Color::parse(s).map(Value::Color).unwrap_or_default()
        }
        (PropertyValueType::Padding, Json::Number(_) | Json::Array(_)) => {
            Padding::parse(&Value::from(value)).map(Value::Padding).unwrap_or_default()
        }
        _ => Value::from(value),
    };
    let literal = Expression::Literal(Literal::new(type_of(&constant), constant));
    Ok(StylePropertyExpression::Constant(ZoomConstantExpression::new(
        EvaluationKind::Constant,
        StyleExpression::new(literal, Some(spec)),
    )))
}
