//! Feature and camera accessors.

use super::{eval_string, fixed, CompoundDefinition};
use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::types::Type;
use crate::values::{Object, Value};
use std::sync::Arc;

fn eval_object(ctx: &mut EvaluationContext<'_>, expr: &Expression) -> Result<Object, RuntimeError> {
    match expr.evaluate(ctx)? {
        Value::Object(map) => Ok(map),
        _ => Ok(Object::new()),
    }
}

fn get_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    Ok(ctx.properties().get(&key).cloned().unwrap_or_default())
}

fn get_from_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    let object = eval_object(ctx, &args[1])?;
    Ok(object.get(&key).cloned().unwrap_or_default())
}

fn has_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    Ok(Value::Boolean(ctx.properties().contains_key(&key)))
}

fn has_in_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    let object = eval_object(ctx, &args[1])?;
    Ok(Value::Boolean(object.contains_key(&key)))
}

fn feature_state_eval(
    ctx: &mut EvaluationContext<'_>,
    args: &[Expression],
) -> Result<Value, RuntimeError> {
    let key = eval_string(ctx, &args[0])?;
    Ok(ctx.feature_state().get(&key).cloned().unwrap_or_default())
}

fn properties_eval(ctx: &mut EvaluationContext<'_>, _: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(Value::Object(ctx.properties().clone()))
}

fn geometry_type_eval(ctx: &mut EvaluationContext<'_>, _: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(ctx.geometry_type().map(Value::from).unwrap_or_default())
}

fn id_eval(ctx: &mut EvaluationContext<'_>, _: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(ctx.id())
}

fn zoom_eval(ctx: &mut EvaluationContext<'_>, _: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(ctx.globals().zoom))
}

fn heatmap_density_eval(ctx: &mut EvaluationContext<'_>, _: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(ctx.globals().heatmap_density.unwrap_or(0.0)))
}

fn line_progress_eval(ctx: &mut EvaluationContext<'_>, _: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(ctx.globals().line_progress.unwrap_or(0.0)))
}

fn accumulated_eval(ctx: &mut EvaluationContext<'_>, _: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(ctx.globals().accumulated.clone().unwrap_or_default())
}

pub fn operators() -> Vec<Arc<CompoundDefinition>> {
    vec![
        CompoundDefinition::new(
            "get",
            Type::Value,
            vec![
                fixed(vec![Type::String], get_eval),
                fixed(vec![Type::String, Type::Object], get_from_eval),
            ],
        ),
        CompoundDefinition::new(
            "has",
            Type::Boolean,
            vec![
                fixed(vec![Type::String], has_eval),
                fixed(vec![Type::String, Type::Object], has_in_eval),
            ],
        ),
        CompoundDefinition::new(
            "feature-state",
            Type::Value,
            vec![fixed(vec![Type::String], feature_state_eval)],
        ),
        CompoundDefinition::new("properties", Type::Object, vec![fixed(vec![], properties_eval)]),
        CompoundDefinition::new(
            "geometry-type",
            Type::String,
            vec![fixed(vec![], geometry_type_eval)],
        ),
        CompoundDefinition::new("id", Type::Value, vec![fixed(vec![], id_eval)]),
        CompoundDefinition::new("zoom", Type::Number, vec![fixed(vec![], zoom_eval)]),
        CompoundDefinition::new(
            "heatmap-density",
            Type::Number,
            vec![fixed(vec![], heatmap_density_eval)],
        ),
        CompoundDefinition::new(
            "line-progress",
            Type::Number,
            vec![fixed(vec![], line_progress_eval)],
        ),
        CompoundDefinition::new("accumulated", Type::Value, vec![fixed(vec![], accumulated_eval)]),
    ]
}
