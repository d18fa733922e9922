//! String operators.

use super::{eval_string, fixed, varargs, CompoundDefinition};
use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::types::Type;
use crate::values::Value;
use std::sync::Arc;

fn is_supported_script_eval(
    ctx: &mut EvaluationContext<'_>,
    args: &[Expression],
) -> Result<Value, RuntimeError> {
    let text = eval_string(ctx, &args[0])?;
    let supported = match ctx.globals().is_supported_script {
        Some(check) => check(&text),
        None => true,
    };
    Ok(Value::Boolean(supported))
}

fn upcase_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(Value::String(eval_string(ctx, &args[0])?.to_uppercase()))
}

fn downcase_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(Value::String(eval_string(ctx, &args[0])?.to_lowercase()))
}

fn concat_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let mut out = String::new();
    for arg in args {
        out.push_str(&arg.evaluate(ctx)?.to_string());
    }
    Ok(Value::String(out))
}

fn resolved_locale_eval(
    ctx: &mut EvaluationContext<'_>,
    args: &[Expression],
) -> Result<Value, RuntimeError> {
    match args[0].evaluate(ctx)? {
        Value::Collator(collator) => Ok(Value::String(collator.resolved_locale())),
        other => Err(RuntimeError::TypeMismatch {
            expected: Type::Collator.to_string(),
            found: crate::values::type_of(&other).to_string(),
        }),
    }
}

pub fn operators() -> Vec<Arc<CompoundDefinition>> {
    vec![
        CompoundDefinition::new(
            "is-supported-script",
            Type::Boolean,
            vec![fixed(vec![Type::String], is_supported_script_eval)],
        ),
        CompoundDefinition::new("upcase", Type::String, vec![fixed(vec![Type::String], upcase_eval)]),
        CompoundDefinition::new(
            "downcase",
            Type::String,
            vec![fixed(vec![Type::String], downcase_eval)],
        ),
        CompoundDefinition::new("concat", Type::String, vec![varargs(Type::Value, concat_eval)]),
        CompoundDefinition::new(
            "resolved-locale",
            Type::String,
            vec![fixed(vec![Type::Collator], resolved_locale_eval)],
        ),
    ]
}
