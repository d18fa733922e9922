use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::color::validate_rgba;
use crate::values::{Color, Formatted, Padding, ResolvedImage, Value};
use serde_json::Value as Json;

/// A conversion between types. Like assertions, later arguments are
/// fallbacks for earlier ones that cannot be converted.
#[derive(Debug, Clone)]
pub struct Coercion {
    pub ty: Type,
    pub args: Vec<Expression>,
}

fn shown(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_json().to_string(),
    }
}

impl Coercion {
    pub fn wrap(ty: Type, expr: Expression) -> Expression {
        Expression::Coercion(Coercion {
            ty,
            args: vec![expr],
        })
    }

    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() < 2 {
            ctx.error("Expected at least one argument.");
            return None;
        }
        let name = args[0].as_str().unwrap_or_default();
        let ty = match name {
            "to-boolean" => Type::Boolean,
            "to-color" => Type::Color,
            "to-number" => Type::Number,
            "to-string" => Type::String,
            _ => return None,
        };
        if matches!(ty, Type::Boolean | Type::String) && args.len() != 2 {
            ctx.error("Expected one argument.");
            return None;
        }
        let mut parsed = Vec::with_capacity(args.len() - 1);
        for (index, arg) in args.iter().enumerate().skip(1) {
            parsed.push(ctx.parse(arg, index, Some(Type::Value))?);
        }
        Some(Expression::Coercion(Coercion { ty, args: parsed }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        match self.ty {
            Type::Boolean => Ok(Value::Boolean(self.args[0].evaluate(ctx)?.is_truthy())),
            Type::Color => self.to_color(ctx),
            Type::Padding => {
                let mut input = Value::Null;
                for arg in &self.args {
                    input = arg.evaluate(ctx)?;
                    if let Some(padding) = Padding::parse(&input) {
                        return Ok(Value::Padding(padding));
                    }
                }
                Err(RuntimeError::Other(format!(
                    "Could not parse padding from value '{}'",
                    shown(&input)
                )))
            }
            Type::Number => {
                let mut value = Value::Null;
                for arg in &self.args {
                    value = arg.evaluate(ctx)?;
                    if value.is_null() {
                        return Ok(Value::Number(0.0));
                    }
                    let n = value.to_number();
                    if !n.is_nan() {
                        return Ok(Value::Number(n));
                    }
                }
                Err(RuntimeError::Other(format!(
                    "Could not convert {} to number.",
                    value.to_json()
                )))
            }
            Type::Formatted => {
                let value = self.args[0].evaluate(ctx)?;
                Ok(match value {
                    Value::Formatted(f) => Value::Formatted(f),
                    other => Value::Formatted(Formatted::from_string(&other.to_string())),
                })
            }
            Type::ResolvedImage => {
                let value = self.args[0].evaluate(ctx)?;
                Ok(match value {
                    Value::ResolvedImage(img) => Value::ResolvedImage(img),
                    other => ResolvedImage::from_string(&other.to_string())
                        .map(Value::ResolvedImage)
                        .unwrap_or(Value::Null),
                })
            }
            _ => Ok(Value::String(self.args[0].evaluate(ctx)?.to_string())),
        }
    }

    fn to_color(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let mut input = Value::Null;
        let mut error = None;
        for arg in &self.args {
            input = arg.evaluate(ctx)?;
            error = None;
            match &input {
                Value::Color(c) => return Ok(Value::Color(*c)),
                Value::String(s) => {
                    if let Some(c) = ctx.parse_color(s) {
                        return Ok(Value::Color(c));
                    }
                }
                Value::Array(items) => {
                    if !(3..=4).contains(&items.len()) {
                        error = Some(format!(
                            "Invalid rbga value {}: expected an array containing either three or four numeric values.",
                            input.to_json()
                        ));
                    } else {
                        error = validate_rgba(&items[0], &items[1], &items[2], items.get(3));
                    }
                    if error.is_none() {
                        let channel = |i: usize| items.get(i).and_then(Value::as_f64);
                        if let (Some(r), Some(g), Some(b)) = (channel(0), channel(1), channel(2)) {
                            let a = channel(3).unwrap_or(1.0);
                            return Ok(Value::Color(Color::from_rgba(r, g, b, a)));
                        }
                    }
                }
                _ => {}
            }
        }
        Err(RuntimeError::Other(error.unwrap_or_else(|| {
            format!("Could not parse color from value '{}'", shown(&input))
        })))
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        self.args.iter().for_each(f);
    }

    pub fn output_defined(&self) -> bool {
        self.args.iter().all(Expression::output_defined)
    }

    pub fn serialize(&self) -> Json {
        match self.ty {
            Type::Formatted => super::format::serialize_plain_section(&self.args[0]),
            Type::ResolvedImage => Json::Array(vec![Json::from("image"), self.args[0].serialize()]),
            // Padding coercions only come from annotations; the argument
            // re-parses into the same coercion.
            Type::Padding => self.args[0].serialize(),
            _ => {
                let mut out = vec![Json::from(format!("to-{}", self.ty.kind()))];
                out.extend(self.args.iter().map(Expression::serialize));
                Json::Array(out)
            }
        }
    }
}
