//! Arithmetic and math operators.

use super::{eval_number, fixed, varargs, CompoundDefinition, EvalFn};
use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::types::Type;
use crate::values::Value;
use std::f64::consts;
use std::sync::Arc;

fn sum_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let mut result = 0.0;
    for arg in args {
        result += eval_number(ctx, arg)?;
    }
    Ok(Value::Number(result))
}

fn product_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let mut result = 1.0;
    for arg in args {
        result *= eval_number(ctx, arg)?;
    }
    Ok(Value::Number(result))
}

fn subtract_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let a = eval_number(ctx, &args[0])?;
    let b = eval_number(ctx, &args[1])?;
    Ok(Value::Number(a - b))
}

fn negate_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    Ok(Value::Number(-eval_number(ctx, &args[0])?))
}

fn divide_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let a = eval_number(ctx, &args[0])?;
    let b = eval_number(ctx, &args[1])?;
    Ok(Value::Number(a / b))
}

fn remainder_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let a = eval_number(ctx, &args[0])?;
    let b = eval_number(ctx, &args[1])?;
    Ok(Value::Number(a % b))
}

fn power_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    let base = eval_number(ctx, &args[0])?;
    let exponent = eval_number(ctx, &args[1])?;
    Ok(Value::Number(base.powf(exponent)))
}

/// `min`/`max` propagate NaN and return the identity for no arguments.
fn fold_extreme(
    ctx: &mut EvaluationContext<'_>,
    args: &[Expression],
    init: f64,
    pick: fn(f64, f64) -> f64,
) -> Result<Value, RuntimeError> {
    let mut result = init;
    for arg in args {
        let n = eval_number(ctx, arg)?;
        result = if n.is_nan() || result.is_nan() { f64::NAN } else { pick(result, n) };
    }
    Ok(Value::Number(result))
}

fn min_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    fold_extreme(ctx, args, f64::INFINITY, f64::min)
}

fn max_eval(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
    fold_extreme(ctx, args, f64::NEG_INFINITY, f64::max)
}

macro_rules! constant {
    ($name:ident, $value:expr) => {
        fn $name(_: &mut EvaluationContext<'_>, _: &[Expression]) -> Result<Value, RuntimeError> {
            Ok(Value::Number($value))
        }
    };
}

macro_rules! unary {
    ($name:ident, $op:expr) => {
        fn $name(ctx: &mut EvaluationContext<'_>, args: &[Expression]) -> Result<Value, RuntimeError> {
            let f: fn(f64) -> f64 = $op;
            Ok(Value::Number(f(eval_number(ctx, &args[0])?)))
        }
    };
}

constant!(ln2_eval, consts::LN_2);
constant!(pi_eval, consts::PI);
constant!(e_eval, consts::E);

unary!(sqrt_eval, f64::sqrt);
unary!(log10_eval, f64::log10);
unary!(ln_eval, f64::ln);
unary!(log2_eval, f64::log2);
unary!(sin_eval, f64::sin);
unary!(cos_eval, f64::cos);
unary!(tan_eval, f64::tan);
unary!(asin_eval, f64::asin);
unary!(acos_eval, f64::acos);
unary!(atan_eval, f64::atan);
unary!(abs_eval, f64::abs);
// Halves round away from zero.
unary!(round_eval, f64::round);
unary!(floor_eval, f64::floor);
unary!(ceil_eval, f64::ceil);

fn unary_op(name: &'static str, eval: EvalFn) -> Arc<CompoundDefinition> {
    CompoundDefinition::new(name, Type::Number, vec![fixed(vec![Type::Number], eval)])
}

fn binary_op(name: &'static str, eval: EvalFn) -> Arc<CompoundDefinition> {
    CompoundDefinition::new(
        name,
        Type::Number,
        vec![fixed(vec![Type::Number, Type::Number], eval)],
    )
}

fn nullary_op(name: &'static str, eval: EvalFn) -> Arc<CompoundDefinition> {
    CompoundDefinition::new(name, Type::Number, vec![fixed(vec![], eval)])
}

pub fn operators() -> Vec<Arc<CompoundDefinition>> {
    vec![
        CompoundDefinition::new("+", Type::Number, vec![varargs(Type::Number, sum_eval)]),
        CompoundDefinition::new("*", Type::Number, vec![varargs(Type::Number, product_eval)]),
        CompoundDefinition::new(
            "-",
            Type::Number,
            vec![
                fixed(vec![Type::Number, Type::Number], subtract_eval),
                fixed(vec![Type::Number], negate_eval),
            ],
        ),
        binary_op("/", divide_eval),
        binary_op("%", remainder_eval),
        binary_op("^", power_eval),
        nullary_op("ln2", ln2_eval),
        nullary_op("pi", pi_eval),
        nullary_op("e", e_eval),
        unary_op("sqrt", sqrt_eval),
        unary_op("log10", log10_eval),
        unary_op("ln", ln_eval),
        unary_op("log2", log2_eval),
        unary_op("sin", sin_eval),
        unary_op("cos", cos_eval),
        unary_op("tan", tan_eval),
        unary_op("asin", asin_eval),
        unary_op("acos", acos_eval),
        unary_op("atan", atan_eval),
        CompoundDefinition::new("min", Type::Number, vec![varargs(Type::Number, min_eval)]),
        CompoundDefinition::new("max", Type::Number, vec![varargs(Type::Number, max_eval)]),
        unary_op("abs", abs_eval),
        unary_op("round", round_eval),
        unary_op("floor", floor_eval),
        unary_op("ceil", ceil_eval),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definitions::Literal;
    use crate::eval_ctx::{EvaluationInput, GlobalProperties};
    use std::collections::HashMap;

    fn num(n: f64) -> Expression {
        Expression::Literal(Literal::new(Type::Number, Value::Number(n)))
    }

    fn run(eval: EvalFn, args: &[Expression]) -> Value {
        let globals = GlobalProperties::default();
        let mut cache = HashMap::new();
        let mut ctx = EvaluationContext::new(EvaluationInput::new(&globals), &mut cache);
        eval(&mut ctx, args).unwrap()
    }

    #[test]
    fn test_empty_varargs() {
        assert_eq!(run(sum_eval, &[]), Value::Number(0.0));
        assert_eq!(run(product_eval, &[]), Value::Number(1.0));
        assert_eq!(run(min_eval, &[]), Value::Number(f64::INFINITY));
    }

    #[test]
    fn test_min_propagates_nan() {
        let out = run(min_eval, &[num(1.0), num(f64::NAN), num(-3.0)]);
        assert!(out.as_f64().unwrap().is_nan());
        assert_eq!(run(max_eval, &[num(1.0), num(7.0)]), Value::Number(7.0));
    }

    #[test]
    fn test_round_half_away_from_zero() {
        assert_eq!(run(round_eval, &[num(2.5)]), Value::Number(3.0));
        assert_eq!(run(round_eval, &[num(-2.5)]), Value::Number(-3.0));
    }

    #[test]
    fn test_remainder_keeps_dividend_sign() {
        assert_eq!(run(remainder_eval, &[num(-7.0), num(3.0)]), Value::Number(-1.0));
    }
}
