use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::util::number_to_string;
use crate::values::Value;
use serde_json::Value as Json;

#[derive(Debug, Clone)]
pub struct At {
    pub ty: Type,
    pub index: Box<Expression>,
    pub input: Box<Expression>,
}

impl At {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() != 3 {
            ctx.error(format!("Expected 2 arguments, but found {} instead.", args.len() - 1));
            return None;
        }
        let item = ctx.expected_type.clone().unwrap_or(Type::Value);
        let index = ctx.parse(&args[1], 1, Some(Type::Number));
        let input = ctx.parse(&args[2], 2, Some(Type::array(item, None)));
        let (index, input) = (index?, input?);
        let ty = match input.ty() {
            Type::Array { item, .. } => (**item).clone(),
            _ => Type::Value,
        };
        Some(Expression::At(At {
            ty,
            index: Box::new(index),
            input: Box::new(input),
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let index = self.index.evaluate(ctx)?.to_number();
        let input = self.input.evaluate(ctx)?;
        let items = input.as_array().unwrap_or_default();
        if index < 0.0 {
            return Err(RuntimeError::IndexBelowZero(number_to_string(index)));
        }
        if index >= items.len() as f64 {
            return Err(RuntimeError::IndexAboveLength {
                index: number_to_string(index),
                last: number_to_string(items.len() as f64 - 1.0),
            });
        }
        if index.fract() != 0.0 {
            return Err(RuntimeError::IndexNotInteger(number_to_string(index)));
        }
        Ok(items[index as usize].clone())
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.index);
        f(&self.input);
    }

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        Json::Array(vec![
            Json::from("at"),
            self.index.serialize(),
            self.input.serialize(),
        ])
    }
}
