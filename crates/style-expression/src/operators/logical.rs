//! Boolean operators. `all` and `any` short-circuit.

use super::{eval_bool, fixed, varargs, CompoundDefinition};
use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::types::Type;
use crate::values::Value;
use std::sync::Arc;

fn and_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    for arg in args {
        if !eval_bool(ctx, arg)? {
            return Ok(Value::Boolean(false));
        }
    }
    Ok(Value::Boolean(true))
}

fn or_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    for arg in args {
        if eval_bool(ctx, arg)? {
            return Ok(Value::Boolean(true));
        }
    }
    Ok(Value::Boolean(false))
}

fn not_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(!eval_bool(ctx, &args[0])?))
}

pub fn operators() -> Vec<Arc<CompoundDefinition>> {
    vec![
        CompoundDefinition::new(
            "all",
            Type::Boolean,
            vec![
                fixed(vec![Type::Boolean, Type::Boolean], and_eval),
                varargs(Type::Boolean, and_eval),
            ],
        ),
        CompoundDefinition::new(
            "any",
            Type::Boolean,
            vec![
                fixed(vec![Type::Boolean, Type::Boolean], or_eval),
                varargs(Type::Boolean, or_eval),
            ],
        ),
        CompoundDefinition::new("!", Type::Boolean, vec![fixed(vec![Type::Boolean], not_eval)]),
    ]
}
