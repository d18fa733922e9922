//! Compound operators: nodes whose typing is a plain signature table.
//!
//! Each category module exposes `operators()`, a list of definitions with
//! one or more overloads. Parsing picks the first overload whose signature
//! accepts the arguments.

pub mod arithmetic;
pub mod color;
pub mod filter;
pub mod input;
pub mod logical;
pub mod string;
pub mod type_ops;

use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::Value;
use serde_json::Value as Json;
use std::fmt;
use std::sync::Arc;

pub type EvalFn = fn(&mut EvaluationContext<'_>, &[Expression]) -> Result<Value, RuntimeError>;

/// Parameter list of one overload.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Fixed(Vec<Type>),
    /// Any number of arguments of one type.
    Varargs(Type),
}

impl Params {
    fn accepts_arity(&self, n: usize) -> bool {
        match self {
            Params::Fixed(types) => types.len() == n,
            Params::Varargs(_) => true,
        }
    }

    fn param(&self, i: usize) -> Type {
        match self {
            Params::Fixed(types) => types.get(i).cloned().unwrap_or(Type::Value),
            Params::Varargs(t) => t.clone(),
        }
    }
}

impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Params::Fixed(types) => {
                let types: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                write!(f, "({})", types.join(", "))
            }
            Params::Varargs(t) => write!(f, "({}...)", t),
        }
    }
}

#[derive(Clone)]
pub struct Overload {
    pub params: Params,
    pub eval: EvalFn,
}

impl fmt::Debug for Overload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Overload").field("params", &self.params).finish()
    }
}

pub fn fixed(params: Vec<Type>, eval: EvalFn) -> Overload {
    Overload {
        params: Params::Fixed(params),
        eval,
    }
}

pub fn varargs(param: Type, eval: EvalFn) -> Overload {
    Overload {
        params: Params::Varargs(param),
        eval,
    }
}

#[derive(Debug, Clone)]
pub struct CompoundDefinition {
    pub name: &'static str,
    pub ty: Type,
    pub overloads: Vec<Overload>,
}

impl CompoundDefinition {
    pub fn new(name: &'static str, ty: Type, overloads: Vec<Overload>) -> Arc<Self> {
        Arc::new(CompoundDefinition { name, ty, overloads })
    }
}

/// A parsed call to a compound operator, bound to the overload that matched.
#[derive(Clone)]
pub struct CompoundExpression {
    pub name: &'static str,
    pub ty: Type,
    pub eval: EvalFn,
    pub args: Vec<Expression>,
}

impl fmt::Debug for CompoundExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundExpression")
            .field("name", &self.name)
            .field("ty", &self.ty)
            .field("args", &self.args)
            .finish()
    }
}

impl CompoundExpression {
    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        (self.eval)(ctx, &self.args)
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        for arg in &self.args {
            f(arg);
        }
    }

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![Json::from(self.name)];
        out.extend(self.args.iter().map(Expression::serialize));
        Json::Array(out)
    }
}

/// Parses a call against each overload in turn. Every attempt reports into
/// its own error vector; only a lone candidate's errors are kept, otherwise
/// a summary of the signatures is reported.
pub fn parse_compound(
    def: &Arc<CompoundDefinition>,
    args: &[Json],
    ctx: &mut ParsingContext<'_>,
) -> Option<Expression> {
    let arity = args.len() - 1;
    let candidates: Vec<&Overload> = def
        .overloads
        .iter()
        .filter(|o| o.params.accepts_arity(arity))
        .collect();

    let mut last_errors = Vec::new();
    for overload in &candidates {
        let mut errors = Vec::new();
        let parsed = {
            let mut attempt = ctx.detached(&mut errors);
            let mut parsed = Vec::with_capacity(arity);
            let mut failed = false;
            for (i, arg) in args.iter().enumerate().skip(1) {
                match attempt.parse(arg, i, Some(overload.params.param(i - 1))) {
                    Some(expr) => parsed.push(expr),
                    None => {
                        failed = true;
                        break;
                    }
                }
            }
            if !failed {
                for (i, expr) in parsed.iter().enumerate() {
                    let expected = overload.params.param(i);
                    attempt.concat(i + 1, None, None).check_subtype(&expected, expr.ty());
                }
            }
            (!failed).then_some(parsed)
        };
        match parsed {
            Some(parsed) if errors.is_empty() => {
                return Some(Expression::Compound(CompoundExpression {
                    name: def.name,
                    ty: def.ty.clone(),
                    eval: overload.eval,
                    args: parsed,
                }));
            }
            _ => last_errors = errors,
        }
    }

    if candidates.len() == 1 {
        ctx.errors.extend(last_errors);
        return None;
    }

    let shown: Vec<&Overload> = if candidates.is_empty() {
        def.overloads.iter().collect()
    } else {
        candidates
    };
    let signatures: Vec<String> = shown.iter().map(|o| o.params.to_string()).collect();
    let mut actual = Vec::with_capacity(arity);
    for (i, arg) in args.iter().enumerate().skip(1) {
        let parsed = ctx.parse(arg, i, None)?;
        actual.push(parsed.ty().to_string());
    }
    ctx.error(format!(
        "Expected arguments of type {}, but found ({}) instead.",
        signatures.join(" | "),
        actual.join(", ")
    ));
    None
}

// ----------------------------------------------------------------- Helpers

pub(crate) fn eval_number(ctx: &mut EvaluationContext<'_>, expr: &Expression) -> Result<f64, RuntimeError> {
    Ok(expr.evaluate(ctx)?.to_number())
}

pub(crate) fn eval_bool(ctx: &mut EvaluationContext<'_>, expr: &Expression) -> Result<bool, RuntimeError> {
    Ok(expr.evaluate(ctx)?.is_truthy())
}

pub(crate) fn eval_string(ctx: &mut EvaluationContext<'_>, expr: &Expression) -> Result<String, RuntimeError> {
    Ok(match expr.evaluate(ctx)? {
        Value::String(s) => s,
        other => other.to_string(),
    })
}

/// Every compound definition, in registration order.
pub fn all_operators() -> Vec<Arc<CompoundDefinition>> {
    let mut defs = Vec::new();
    defs.extend(input::operators());
    defs.extend(arithmetic::operators());
    defs.extend(logical::operators());
    defs.extend(string::operators());
    defs.extend(color::operators());
    defs.extend(type_ops::operators());
    defs.extend(filter::operators());
    defs
}
