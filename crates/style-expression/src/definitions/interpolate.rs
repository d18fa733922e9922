use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::{is_subtype, Type};
use crate::util::{
    exponential_interpolation, find_stop_less_than_or_equal_to, interpolate_array,
    interpolate_number, UnitBezier,
};
use crate::values::color_spaces::{interpolate_hcl, interpolate_lab};
use crate::values::{number_to_json, type_of, Color, Padding, Value};
use serde_json::Value as Json;

/// The curve between two adjacent stops.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InterpolationType {
    Linear,
    Exponential { base: f64 },
    CubicBezier { control_points: [f64; 4] },
}

impl InterpolationType {
    /// Progress in `[0, 1]` of `input` between the stops `lower` and `upper`.
    pub fn factor(&self, input: f64, lower: f64, upper: f64) -> f64 {
        match self {
            InterpolationType::Linear => exponential_interpolation(input, 1.0, lower, upper),
            InterpolationType::Exponential { base } => {
                exponential_interpolation(input, *base, lower, upper)
            }
            InterpolationType::CubicBezier { control_points: [x1, y1, x2, y2] } => {
                let t = exponential_interpolation(input, 1.0, lower, upper);
                UnitBezier::new(*x1, *y1, *x2, *y2).solve(t)
            }
        }
    }

    fn serialize(&self) -> Json {
        match self {
            InterpolationType::Linear => Json::from(vec!["linear"]),
            InterpolationType::Exponential { base } if *base == 1.0 => Json::from(vec!["linear"]),
            InterpolationType::Exponential { base } => {
                Json::Array(vec![Json::from("exponential"), number_to_json(*base)])
            }
            InterpolationType::CubicBezier { control_points } => {
                let mut out = vec![Json::from("cubic-bezier")];
                out.extend(control_points.iter().map(|v| number_to_json(*v)));
                Json::Array(out)
            }
        }
    }

    fn parse(json: &Json, ctx: &mut ParsingContext<'_>) -> Option<InterpolationType> {
        let items = match json {
            Json::Array(items) if !items.is_empty() => items,
            _ => {
                ctx.error_at("Expected an interpolation type expression.", &[1]);
                return None;
            }
        };
        match items[0].as_str() {
            Some("linear") => Some(InterpolationType::Linear),
            Some("exponential") => match items.get(1).and_then(Json::as_f64) {
                Some(base) => Some(InterpolationType::Exponential { base }),
                None => {
                    ctx.error_at("Exponential interpolation requires a numeric base.", &[1, 1]);
                    None
                }
            },
            Some("cubic-bezier") => {
                let points: Vec<f64> = items[1..]
                    .iter()
                    .filter_map(Json::as_f64)
                    .filter(|t| (0.0..=1.0).contains(t))
                    .collect();
                match <[f64; 4]>::try_from(points) {
                    Ok(control_points) if items.len() == 5 => {
                        Some(InterpolationType::CubicBezier { control_points })
                    }
                    _ => {
                        ctx.error_at(
                            "Cubic bezier interpolation requires four numeric arguments with values between 0 and 1.",
                            &[1],
                        );
                        None
                    }
                }
            }
            _ => {
                let shown = match &items[0] {
                    Json::String(s) => s.clone(),
                    other => other.to_string(),
                };
                ctx.error_at(format!("Unknown interpolation type {}", shown), &[1, 0]);
                None
            }
        }
    }
}

/// The space colour outputs are blended in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorSpace {
    Rgb,
    Hcl,
    Lab,
}

impl ColorSpace {
    fn operator(&self) -> &'static str {
        match self {
            ColorSpace::Rgb => "interpolate",
            ColorSpace::Hcl => "interpolate-hcl",
            ColorSpace::Lab => "interpolate-lab",
        }
    }
}

/// Continuous function of a numeric input, blending between stop outputs.
#[derive(Debug, Clone)]
pub struct Interpolate {
    pub ty: Type,
    pub color_space: ColorSpace,
    pub interpolation: InterpolationType,
    pub input: Box<Expression>,
    pub labels: Vec<f64>,
    pub outputs: Vec<Expression>,
}

impl Interpolate {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        let color_space = match args[0].as_str() {
            Some("interpolate-hcl") => ColorSpace::Hcl,
            Some("interpolate-lab") => ColorSpace::Lab,
            _ => ColorSpace::Rgb,
        };
        let interpolation = InterpolationType::parse(args.get(1).unwrap_or(&Json::Null), ctx)?;

        if args.len() - 1 < 4 {
            ctx.error(format!(
                "Expected at least 4 arguments, but found only {}.",
                args.len() - 1
            ));
            return None;
        }
        if (args.len() - 1) % 2 != 0 {
            ctx.error("Expected an even number of arguments.");
            return None;
        }

        let input = ctx.parse(&args[2], 2, Some(Type::Number))?;
        let mut output_type = if color_space == ColorSpace::Rgb {
            ctx.expected_type.clone().filter(|t| !t.is_value())
        } else {
            Some(Type::Color)
        };

        let mut labels: Vec<f64> = Vec::new();
        let mut outputs = Vec::new();
        for label_key in (3..args.len()).step_by(2) {
            let Some(label) = args[label_key].as_f64() else {
                ctx.error_at(
                    "Input/output pairs for \"interpolate\" expressions must be defined using literal numeric values (not computed expressions) for the input values.",
                    &[label_key],
                );
                return None;
            };
            if labels.last().is_some_and(|prev| *prev >= label) {
                ctx.error_at(
                    "Input/output pairs for \"interpolate\" expressions must be arranged with input values in strictly ascending order.",
                    &[label_key],
                );
                return None;
            }
            let parsed = ctx.parse(&args[label_key + 1], label_key + 1, output_type.clone())?;
            if output_type.is_none() {
                output_type = Some(parsed.ty().clone());
            }
            labels.push(label);
            outputs.push(parsed);
        }

        let ty = output_type.unwrap_or(Type::Value);
        let interpolatable = [
            Type::Number,
            Type::Color,
            Type::Padding,
            Type::array(Type::Number, None),
        ]
        .iter()
        .any(|t| is_subtype(t, &ty));
        if !interpolatable {
            ctx.error(format!("Type {} is not interpolatable.", ty));
            return None;
        }

        Some(Expression::Interpolate(Interpolate {
            ty,
            color_space,
            interpolation,
            input: Box::new(input),
            labels,
            outputs,
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let labels = &self.labels;
        if labels.len() == 1 {
            return self.outputs[0].evaluate(ctx);
        }
        let value = self.input.evaluate(ctx)?.to_number();
        if value <= labels[0] {
            return self.outputs[0].evaluate(ctx);
        }
        let last = labels.len() - 1;
        if value >= labels[last] {
            return self.outputs[last].evaluate(ctx);
        }

        let index = find_stop_less_than_or_equal_to(labels, value)?;
        let t = self
            .interpolation
            .factor(value, labels[index], labels[index + 1]);
        let lower = self.outputs[index].evaluate(ctx)?;
        let upper = self.outputs[index + 1].evaluate(ctx)?;
        self.blend(lower, upper, t)
    }

    fn blend(&self, lower: Value, upper: Value, t: f64) -> Result<Value, RuntimeError> {
        match (lower, upper) {
            (Value::Number(a), Value::Number(b)) => Ok(Value::Number(interpolate_number(a, b, t))),
            (Value::Color(a), Value::Color(b)) => Ok(Value::Color(match self.color_space {
                ColorSpace::Rgb => Color::interpolate(&a, &b, t),
                ColorSpace::Hcl => interpolate_hcl(&a, &b, t),
                ColorSpace::Lab => interpolate_lab(&a, &b, t),
            })),
            (Value::Padding(a), Value::Padding(b)) => {
                Ok(Value::Padding(Padding::interpolate(&a, &b, t)))
            }
            (Value::Array(a), Value::Array(b)) => {
                let nums = |items: &[Value]| items.iter().map(Value::as_f64).collect::<Option<Vec<f64>>>();
                match (nums(&a), nums(&b)) {
                    (Some(a), Some(b)) if a.len() == b.len() => Ok(Value::Array(
                        interpolate_array(&a, &b, t).into_iter().map(Value::Number).collect(),
                    )),
                    _ => Err(RuntimeError::TypeMismatch {
                        expected: self.ty.to_string(),
                        found: type_of(&Value::Array(b)).to_string(),
                    }),
                }
            }
            (_, other) => Err(RuntimeError::TypeMismatch {
                expected: self.ty.to_string(),
                found: type_of(&other).to_string(),
            }),
        }
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.input);
        self.outputs.iter().for_each(f);
    }

    pub fn output_defined(&self) -> bool {
        self.outputs.iter().all(Expression::output_defined)
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![
            Json::from(self.color_space.operator()),
            self.interpolation.serialize(),
            self.input.serialize(),
        ];
        for (label, output) in self.labels.iter().zip(&self.outputs) {
            out.push(number_to_json(*label));
            out.push(output.serialize());
        }
        Json::Array(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factor() {
        assert_eq!(InterpolationType::Linear.factor(5.0, 0.0, 10.0), 0.5);
        let exp = InterpolationType::Exponential { base: 2.0 };
        assert!(exp.factor(5.0, 0.0, 10.0) < 0.5);
        let ease = InterpolationType::CubicBezier { control_points: [0.0, 0.0, 1.0, 1.0] };
        assert!((ease.factor(5.0, 0.0, 10.0) - 0.5).abs() < 1e-6);
    }
}
