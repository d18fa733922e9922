//! `filter-*` primitives targeted by the legacy filter converter.
//!
//! These mirror the old filter semantics exactly: comparisons only hold
//! between values of the same primitive kind, and a missing property never
//! equals anything, not even `null`.

use super::{eval_string, fixed, CompoundDefinition};
use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::types::Type;
use crate::values::Value;
use std::borrow::Cow;
use std::cmp::Ordering;
use std::sync::Arc;

/// Literal arguments are read in place instead of being cloned per call.
fn argument<'e>(
    ctx: &mut EvaluationContext<'_>,
    expr: &'e Expression,
) -> Result<Cow<'e, Value>, RuntimeError> {
    match expr {
        Expression::Literal(literal) => Ok(Cow::Borrowed(&literal.value)),
        other => Ok(Cow::Owned(other.evaluate(ctx)?)),
    }
}

fn legacy_order(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.partial_cmp(y),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Boolean(x), Value::Boolean(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

fn property_compare(
    ctx: &mut EvaluationContext<'_>,
    args: &[Expression],
    accept: fn(Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    let value = argument(ctx, &args[1])?;
    let holds = ctx
        .properties()
        .get(&key)
        .and_then(|property| legacy_order(property, &value))
        .is_some_and(accept);
    Ok(Value::Boolean(holds))
}

fn id_compare(
    ctx: &mut EvaluationContext<'_>,
    args: &[Expression],
    accept: fn(Ordering) -> bool,
) -> Result<Value, RuntimeError> {
    let value = argument(ctx, &args[0])?;
    let holds = legacy_order(&ctx.id(), &value).is_some_and(accept);
    Ok(Value::Boolean(holds))
}

fn eq_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    let value = argument(ctx, &args[1])?;
    let holds = ctx
        .properties()
        .get(&key)
        .is_some_and(|property| property.strict_equals(&value));
    Ok(Value::Boolean(holds))
}

fn id_eq_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let value = argument(ctx, &args[0])?;
    Ok(Value::Boolean(ctx.id().strict_equals(&value)))
}

fn type_eq_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let value = argument(ctx, &args[0])?;
    let holds = match (ctx.geometry_type(), value.as_str()) {
        (Some(actual), Some(expected)) => actual == expected,
        _ => false,
    };
    Ok(Value::Boolean(holds))
}

fn lt_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    property_compare(ctx, args, Ordering::is_lt)
}

fn gt_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    property_compare(ctx, args, Ordering::is_gt)
}

fn le_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    property_compare(ctx, args, Ordering::is_le)
}

fn ge_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    property_compare(ctx, args, Ordering::is_ge)
}

fn id_lt_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    id_compare(ctx, args, Ordering::is_lt)
}

fn id_gt_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    id_compare(ctx, args, Ordering::is_gt)
}

fn id_le_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    id_compare(ctx, args, Ordering::is_le)
}

fn id_ge_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    id_compare(ctx, args, Ordering::is_ge)
}

fn has_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    Ok(Value::Boolean(ctx.properties().contains_key(&key)))
}

fn has_id_eval(ctx: &mut EvaluationContext<'_>, _: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(Value::Boolean(!ctx.id().is_null()))
}

fn type_in_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let values = argument(ctx, &args[0])?;
    let holds = match ctx.geometry_type() {
        Some(actual) => values
            .as_array()
            .unwrap_or_default()
            .iter()
            .any(|v| v.as_str() == Some(actual)),
        None => false,
    };
    Ok(Value::Boolean(holds))
}

fn id_in_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let values = argument(ctx, &args[0])?;
    let id = ctx.id();
    let holds = values
        .as_array()
        .unwrap_or_default()
        .iter()
        .any(|v| v.strict_equals(&id));
    Ok(Value::Boolean(holds))
}

fn in_small_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    let values = argument(ctx, &args[1])?;
    let holds = match ctx.properties().get(&key) {
        Some(property) => values
            .as_array()
            .unwrap_or_default()
            .iter()
            .any(|v| v.strict_equals(property)),
        None => false,
    };
    Ok(Value::Boolean(holds))
}

/// Membership in a sorted, single-kind list.
fn in_large_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    let values = argument(ctx, &args[1])?;
    let holds = match ctx.properties().get(&key) {
        Some(property) => binary_search(property, values.as_array().unwrap_or_default()),
        None => false,
    };
    Ok(Value::Boolean(holds))
}

fn binary_search(needle: &Value, haystack: &[Value]) -> bool {
    haystack
        .binary_search_by(|probe| legacy_order(probe, needle).unwrap_or(Ordering::Less))
        .is_ok_and(|i| haystack[i].strict_equals(needle))
}

fn keyed(name: &'static str, eval: super::EvalFn) -> Arc<CompoundDefinition> {
    CompoundDefinition::new(
        name,
        Type::Boolean,
        vec![fixed(vec![Type::String, Type::Value], eval)],
    )
}

fn unkeyed(name: &'static str, param: Type, eval: super::EvalFn) -> Arc<CompoundDefinition> {
    CompoundDefinition::new(name, Type::Boolean, vec![fixed(vec![param], eval)])
}

pub fn operators() -> Vec<Arc<CompoundDefinition>> {
    vec![
        keyed("filter-==", eq_eval),
        unkeyed("filter-id-==", Type::Value, id_eq_eval),
        unkeyed("filter-type-==", Type::String, type_eq_eval),
        keyed("filter-<", lt_eval),
        unkeyed("filter-id-<", Type::Value, id_lt_eval),
        keyed("filter->", gt_eval),
        unkeyed("filter-id->", Type::Value, id_gt_eval),
        keyed("filter-<=", le_eval),
        unkeyed("filter-id-<=", Type::Value, id_le_eval),
        keyed("filter->=", ge_eval),
        unkeyed("filter-id->=", Type::Value, id_ge_eval),
        unkeyed("filter-has", Type::Value, has_eval),
        CompoundDefinition::new("filter-has-id", Type::Boolean, vec![fixed(vec![], has_id_eval)]),
        unkeyed("filter-type-in", Type::array(Type::String, None), type_in_eval),
        unkeyed("filter-id-in", Type::array(Type::Value, None), id_in_eval),
        CompoundDefinition::new(
            "filter-in-small",
            Type::Boolean,
            vec![fixed(
                vec![Type::String, Type::array(Type::Value, None)],
                in_small_eval,
            )],
        ),
        CompoundDefinition::new(
            "filter-in-large",
            Type::Boolean,
            vec![fixed(
                vec![Type::String, Type::array(Type::Value, None)],
                in_large_eval,
            )],
        ),
    ]
}
