use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::{check_subtype, Type};
use crate::values::{type_of, Value};
use serde_json::Value as Json;

/// A runtime-checked cast. Later arguments are fallbacks tried in order when
/// earlier ones have the wrong type.
#[derive(Debug, Clone)]
pub struct Assertion {
    pub ty: Type,
    pub args: Vec<Expression>,
}

fn scalar_type(name: &str) -> Option<Type> {
    match name {
        "string" => Some(Type::String),
        "number" => Some(Type::Number),
        "boolean" => Some(Type::Boolean),
        "object" => Some(Type::Object),
        _ => None,
    }
}

impl Assertion {
    pub fn wrap(ty: Type, expr: Expression) -> Expression {
        Expression::Assertion(Assertion {
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
        let mut i = 1;
        let ty = if name == "array" {
            let item = if args.len() > 2 {
                match args[1].as_str().and_then(scalar_type) {
                    Some(t) if t != Type::Object => {
                        i += 1;
                        t
                    }
                    _ => {
                        ctx.error_at(
                            "The item type argument of \"array\" must be one of string, number, boolean",
                            &[1],
                        );
                        return None;
                    }
                }
            } else {
                Type::Value
            };
            let mut n = None;
            if args.len() > 3 {
                match &args[2] {
                    Json::Null => {}
                    Json::Number(num)
                        if num.as_f64().is_some_and(|v| v >= 0.0 && v.fract() == 0.0) =>
                    {
                        n = num.as_f64().map(|v| v as usize);
                    }
                    _ => {
                        ctx.error_at(
                            "The length argument to \"array\" must be a positive integer literal",
                            &[2],
                        );
                        return None;
                    }
                }
                i += 1;
            }
            Type::array(item, n)
        } else {
            scalar_type(name)?
        };

        let mut parsed = Vec::with_capacity(args.len() - i);
        for (index, arg) in args.iter().enumerate().skip(i) {
            parsed.push(ctx.parse(arg, index, Some(Type::Value))?);
        }
        Some(Expression::Assertion(Assertion { ty, args: parsed }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let mut last_found = Type::Value;
        for arg in &self.args {
            let value = arg.evaluate(ctx)?;
            let found = type_of(&value);
            if check_subtype(&self.ty, &found).is_none() {
                return Ok(value);
            }
            last_found = found;
        }
        Err(RuntimeError::TypeMismatch {
            expected: self.ty.to_string(),
            found: last_found.to_string(),
        })
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        self.args.iter().for_each(f);
    }

    pub fn output_defined(&self) -> bool {
        self.args.iter().all(Expression::output_defined)
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![Json::from(self.ty.kind())];
        if let Type::Array { item, n } = &self.ty {
            if matches!(**item, Type::String | Type::Number | Type::Boolean) {
                out.push(Json::from(item.kind()));
                if n.is_some() || self.args.len() > 1 {
                    out.push(n.map(Json::from).unwrap_or(Json::Null));
                }
            }
        }
        out.extend(self.args.iter().map(Expression::serialize));
        Json::Array(out)
    }
}
