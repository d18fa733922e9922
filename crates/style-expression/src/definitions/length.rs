use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::{type_of, Value};
use serde_json::Value as Json;

#[derive(Debug, Clone)]
pub struct Length {
    pub ty: Type,
    pub input: Box<Expression>,
}

impl Length {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() != 2 {
            ctx.error(format!("Expected 1 argument, but found {} instead.", args.len() - 1));
            return None;
        }
        let input = ctx.parse(&args[1], 1, None)?;
        if !matches!(input.ty(), Type::Array { .. } | Type::String | Type::Value) {
            ctx.error(format!(
                "Expected argument of type string or array, but found {} instead.",
                input.ty()
            ));
            return None;
        }
        Some(Expression::Length(Length {
            ty: Type::Number,
            input: Box::new(input),
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        match self.input.evaluate(ctx)? {
            Value::String(s) => Ok(Value::Number(s.chars().count() as f64)),
            Value::Array(items) => Ok(Value::Number(items.len() as f64)),
            other => Err(RuntimeError::Other(format!(
                "Expected value to be of type string or array, but found {} instead.",
                type_of(&other)
            ))),
        }
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.input);
    }

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        Json::Array(vec![Json::from("length"), self.input.serialize()])
    }
}
