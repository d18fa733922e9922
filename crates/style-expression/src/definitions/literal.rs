use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::{is_value, number_to_json, type_of, Value};
use serde_json::{json, Value as Json};

#[derive(Debug, Clone)]
pub struct Literal {
    pub ty: Type,
    pub value: Value,
}

impl Literal {
    pub fn new(ty: Type, value: Value) -> Self {
        Literal { ty, value }
    }

    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() != 2 {
            ctx.error(format!(
                "'literal' expression requires exactly one argument, but found {} instead.",
                args.len() - 1
            ));
            return None;
        }
        if !is_value(&args[1]) {
            ctx.error("invalid value");
            return None;
        }
        let value = Value::from(&args[1]);
        let mut ty = type_of(&value);
        // An empty array literal takes on the expected array type.
        if matches!(ty, Type::Array { n: Some(0), .. }) {
            if let Some(expected) = &ctx.expected_type {
                if let Type::Array { n, .. } = expected {
                    if n.is_none() || *n == Some(0) {
                        ty = expected.clone();
                    }
                }
            }
        }
        Some(Expression::Literal(Literal::new(ty, value)))
    }

    pub fn evaluate(&self, _ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        Ok(self.value.clone())
    }

    pub fn each_child<'s>(&'s self, _f: &mut dyn FnMut(&'s Expression)) {}

    pub fn output_defined(&self) -> bool {
        true
    }

    pub fn serialize(&self) -> Json {
        match &self.value {
            Value::Array(_) | Value::Object(_) => json!(["literal", self.value.to_json()]),
            Value::Color(c) => {
                let mut out = vec![Json::from("rgba")];
                out.extend(c.to_array().iter().map(|v| number_to_json(*v)));
                Json::Array(out)
            }
            Value::Padding(p) => json!([
                "literal",
                p.values.iter().map(|v| number_to_json(*v)).collect::<Vec<_>>()
            ]),
            Value::Formatted(f) => super::format::serialize_formatted(f),
            Value::ResolvedImage(img) => json!(["image", img.name]),
            other => other.to_json(),
        }
    }
}
