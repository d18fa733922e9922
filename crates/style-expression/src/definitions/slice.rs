use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::{is_valid_type, Type};
use crate::util::slice_bounds;
use crate::values::{type_of, Value};
use serde_json::Value as Json;

/// Substring or sub-array with JavaScript `slice` index rules.
#[derive(Debug, Clone)]
pub struct Slice {
    pub ty: Type,
    pub input: Box<Expression>,
    pub begin: Box<Expression>,
    pub end: Option<Box<Expression>>,
}

impl Slice {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() <= 2 || args.len() >= 5 {
            ctx.error(format!(
                "Expected 3 or 4 arguments, but found {} instead.",
                args.len() - 1
            ));
            return None;
        }
        let input = ctx.parse(&args[1], 1, Some(Type::Value));
        let begin = ctx.parse(&args[2], 2, Some(Type::Number));
        let (input, begin) = (input?, begin?);
        if !is_valid_type(
            input.ty(),
            &[Type::array(Type::Value, None), Type::String, Type::Value],
        ) {
            ctx.error(format!(
                "Expected first argument to be of type array or string, but found {} instead",
                input.ty()
            ));
            return None;
        }
        let end = match args.get(3) {
            Some(arg) => Some(Box::new(ctx.parse(arg, 3, Some(Type::Number))?)),
            None => None,
        };
        // The result length is not known statically.
        let ty = match input.ty() {
            Type::Array { item, .. } => Type::array((**item).clone(), None),
            other => other.clone(),
        };
        Some(Expression::Slice(Slice {
            ty,
            input: Box::new(input),
            begin: Box::new(begin),
            end,
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let input = self.input.evaluate(ctx)?;
        let begin = self.begin.evaluate(ctx)?.to_number();
        let end = match &self.end {
            Some(end) => Some(end.evaluate(ctx)?.to_number()),
            None => None,
        };
        match input {
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let (from, to) = slice_bounds(chars.len(), begin, end);
                Ok(Value::String(chars[from..to].iter().collect()))
            }
            Value::Array(items) => {
                let (from, to) = slice_bounds(items.len(), begin, end);
                Ok(Value::Array(items[from..to].to_vec()))
            }
            other => Err(RuntimeError::Other(format!(
                "Expected first argument to be of type array or string, but found {} instead.",
                type_of(&other)
            ))),
        }
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.input);
        f(&self.begin);
        if let Some(end) = &self.end {
            f(end);
        }
    }

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![
            Json::from("slice"),
            self.input.serialize(),
            self.begin.serialize(),
        ];
        if let Some(end) = &self.end {
            out.push(end.serialize());
        }
        Json::Array(out)
    }
}
