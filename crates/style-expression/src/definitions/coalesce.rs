use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::{ParseOptions, ParsingContext, TypeAnnotation};
use crate::types::{check_subtype, Type};
use crate::values::Value;
use serde_json::Value as Json;

/// First non-null argument. Images the renderer lacks count as null.
#[derive(Debug, Clone)]
pub struct Coalesce {
    pub ty: Type,
    pub args: Vec<Expression>,
}

impl Coalesce {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() < 2 {
            ctx.error("Expectected at least one argument.");
            return None;
        }
        let expected = ctx.expected_type.clone();
        let mut output_type = expected.clone().filter(|t| !t.is_value());
        let mut parsed = Vec::with_capacity(args.len() - 1);
        for (index, arg) in args.iter().enumerate().skip(1) {
            let expr = ctx.parse_with(
                arg,
                index,
                output_type.clone(),
                None,
                ParseOptions::with_annotation(TypeAnnotation::Omit),
            )?;
            if output_type.is_none() {
                output_type = Some(expr.ty().clone());
            }
            parsed.push(expr);
        }

        // Arguments were parsed without annotations, so when any of them is
        // wider than expected the whole node is typed `value` and the caller
        // wraps it once.
        let needs_annotation = expected
            .as_ref()
            .is_some_and(|e| parsed.iter().any(|arg| check_subtype(e, arg.ty()).is_some()));
        let ty = if needs_annotation {
            Type::Value
        } else {
            output_type.unwrap_or(Type::Value)
        };
        Some(Expression::Coalesce(Coalesce { ty, args: parsed }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let mut requested_image: Option<String> = None;
        let count = self.args.len();
        for (i, arg) in self.args.iter().enumerate() {
            let mut result = arg.evaluate(ctx)?;
            if let Value::ResolvedImage(img) = &result {
                if !img.available {
                    let name = requested_image.get_or_insert_with(|| img.name.clone()).clone();
                    result = if i + 1 == count {
                        Value::String(name)
                    } else {
                        Value::Null
                    };
                }
            }
            if !result.is_null() {
                return Ok(result);
            }
        }
        Ok(Value::Null)
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        self.args.iter().for_each(f);
    }

    pub fn output_defined(&self) -> bool {
        self.args.iter().all(Expression::output_defined)
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![Json::from("coalesce")];
        out.extend(self.args.iter().map(Expression::serialize));
        Json::Array(out)
    }
}
