use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::{ResolvedImage, Value};
use serde_json::Value as Json;

/// Looks up an image by name and records whether the renderer has it.
#[derive(Debug, Clone)]
pub struct ImageExpression {
    pub ty: Type,
    pub input: Box<Expression>,
}

impl ImageExpression {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() != 2 {
            ctx.error("Expected two arguments.");
            return None;
        }
        let Some(input) = ctx.parse(&args[1], 1, Some(Type::String)) else {
            ctx.error("No image name provided.");
            return None;
        };
        Some(Expression::Image(ImageExpression {
            ty: Type::ResolvedImage,
            input: Box::new(input),
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let name = self.input.evaluate(ctx)?.to_string();
        let Some(mut image) = ResolvedImage::from_string(&name) else {
            return Ok(Value::Null);
        };
        if let Some(available) = ctx.available_images() {
            image.available = available.iter().any(|n| *n == name);
        }
        Ok(Value::ResolvedImage(image))
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.input);
    }

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        Json::Array(vec![Json::from("image"), self.input.serialize()])
    }
}
