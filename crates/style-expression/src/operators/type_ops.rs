//! Type introspection and the `error` operator.

use super::{eval_string, fixed, CompoundDefinition};
use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::types::Type;
use crate::values::{type_of, Value};
use std::sync::Arc;

fn error_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    Err(RuntimeError::Thrown(eval_string(ctx, &args[0])?))
}

fn typeof_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let value = args[0].evaluate(ctx)?;
    Ok(Value::String(type_of(&value).to_string()))
}

pub fn operators() -> Vec<Arc<CompoundDefinition>> {
    vec![
        CompoundDefinition::new("error", Type::Error, vec![fixed(vec![Type::String], error_eval)]),
        CompoundDefinition::new("typeof", Type::String, vec![fixed(vec![Type::Value], typeof_eval)]),
    ]
}
