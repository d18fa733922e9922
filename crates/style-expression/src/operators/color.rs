//! Colour constructors and decomposition.

use super::{fixed, CompoundDefinition};
use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::types::Type;
use crate::values::color::validate_rgba;
use crate::values::{type_of, Color, Value};
use std::sync::Arc;

fn rgba_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let r = args[0].evaluate(ctx)?;
    let g = args[1].evaluate(ctx)?;
    let b = args[2].evaluate(ctx)?;
    let a = match args.get(3) {
        Some(a) => a.evaluate(ctx)?,
        None => Value::Number(1.0),
    };
    if let Some(message) = validate_rgba(&r, &g, &b, Some(&a)) {
        return Err(RuntimeError::Other(message));
    }
    Ok(Value::Color(Color::from_rgba(
        r.to_number(),
        g.to_number(),
        b.to_number(),
        a.to_number(),
    )))
}

fn to_rgba_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    match args[0].evaluate(ctx)? {
        Value::Color(color) => Ok(Value::Array(
            color.to_array().into_iter().map(Value::Number).collect(),
        )),
        other => Err(RuntimeError::TypeMismatch {
            expected: Type::Color.to_string(),
            found: type_of(&other).to_string(),
        }),
    }
}

pub fn operators() -> Vec<Arc<CompoundDefinition>> {
    vec![
        CompoundDefinition::new(
            "to-rgba",
            Type::array(Type::Number, Some(4)),
            vec![fixed(vec![Type::Color], to_rgba_eval)],
        ),
        CompoundDefinition::new(
            "rgb",
            Type::Color,
            vec![fixed(vec![Type::Number, Type::Number, Type::Number], rgba_eval)],
        ),
        CompoundDefinition::new(
            "rgba",
            Type::Color,
            vec![fixed(
                vec![Type::Number, Type::Number, Type::Number, Type::Number],
                rgba_eval,
            )],
        ),
    ]
}
