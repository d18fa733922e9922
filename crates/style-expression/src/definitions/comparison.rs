use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::{type_of, Collator, Value};
use serde_json::Value as Json;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Neq,
    Lt,
    Gt,
    Le,
    Ge,
}

impl ComparisonOp {
    pub fn from_name(name: &str) -> Option<ComparisonOp> {
        Some(match name {
            "==" => ComparisonOp::Eq,
            "!=" => ComparisonOp::Neq,
            "<" => ComparisonOp::Lt,
            ">" => ComparisonOp::Gt,
            "<=" => ComparisonOp::Le,
            ">=" => ComparisonOp::Ge,
            _ => return None,
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Neq => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Gt => ">",
            ComparisonOp::Le => "<=",
            ComparisonOp::Ge => ">=",
        }
    }

    pub fn is_order(&self) -> bool {
        !matches!(self, ComparisonOp::Eq | ComparisonOp::Neq)
    }

    fn is_comparable(&self, t: &Type) -> bool {
        match t {
            Type::String | Type::Number | Type::Value => true,
            Type::Boolean | Type::Null => !self.is_order(),
            _ => false,
        }
    }

    fn holds(&self, ordering: Option<Ordering>) -> bool {
        match (self, ordering) {
            (ComparisonOp::Eq, o) => o == Some(Ordering::Equal),
            (ComparisonOp::Neq, o) => o != Some(Ordering::Equal),
            (_, None) => false,
            (ComparisonOp::Lt, Some(o)) => o == Ordering::Less,
            (ComparisonOp::Gt, Some(o)) => o == Ordering::Greater,
            (ComparisonOp::Le, Some(o)) => o != Ordering::Greater,
            (ComparisonOp::Ge, Some(o)) => o != Ordering::Less,
        }
    }

    /// Compares without a collator: strict equality for `==`/`!=`, numeric
    /// or lexicographic order otherwise.
    pub fn compare(&self, lhs: &Value, rhs: &Value) -> bool {
        if !self.is_order() {
            let equal = lhs.strict_equals(rhs);
            return if *self == ComparisonOp::Eq { equal } else { !equal };
        }
        let ordering = match (lhs, rhs) {
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            _ => None,
        };
        self.holds(ordering)
    }

    pub fn compare_with_collator(&self, lhs: &str, rhs: &str, collator: &Collator) -> bool {
        self.holds(Some(collator.compare(lhs, rhs)))
    }
}

#[derive(Debug, Clone)]
pub struct Comparison {
    pub ty: Type,
    pub op: ComparisonOp,
    pub lhs: Box<Expression>,
    pub rhs: Box<Expression>,
    pub collator: Option<Box<Expression>>,
    has_untyped_argument: bool,
}

impl Comparison {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() != 3 && args.len() != 4 {
            ctx.error("Expected two or three arguments.");
            return None;
        }
        let op = ComparisonOp::from_name(args[0].as_str().unwrap_or_default())?;

        let mut lhs = ctx.parse(&args[1], 1, Some(Type::Value))?;
        if !op.is_comparable(lhs.ty()) {
            ctx.error_at(
                format!(
                    "\"{}\" comparisons are not supported for type '{}'.",
                    op.as_str(),
                    lhs.ty()
                ),
                &[1],
            );
            return None;
        }
        let mut rhs = ctx.parse(&args[2], 2, Some(Type::Value))?;
        if !op.is_comparable(rhs.ty()) {
            ctx.error_at(
                format!(
                    "\"{}\" comparisons are not supported for type '{}'.",
                    op.as_str(),
                    rhs.ty()
                ),
                &[2],
            );
            return None;
        }

        let (lt, rt) = (lhs.ty().clone(), rhs.ty().clone());
        if !lt.same_kind(&rt) && !lt.is_value() && !rt.is_value() {
            ctx.error(format!("Cannot compare types '{}' and '{}'.", lt, rt));
            return None;
        }

        if op.is_order() {
            if lt.is_value() && !rt.is_value() {
                lhs = super::Assertion::wrap(rt.clone(), lhs);
            } else if !lt.is_value() && rt.is_value() {
                rhs = super::Assertion::wrap(lt.clone(), rhs);
            }
        }

        let collator = match args.get(3) {
            Some(arg) => {
                let stringish = |t: &Type| matches!(t, Type::String | Type::Value);
                if !stringish(lhs.ty()) && !stringish(rhs.ty()) {
                    ctx.error("Cannot use collator to compare non-string types.");
                    return None;
                }
                Some(Box::new(ctx.parse(arg, 3, Some(Type::Collator))?))
            }
            None => None,
        };

        let has_untyped_argument = lhs.ty().is_value() || rhs.ty().is_value();
        Some(Expression::Comparison(Comparison {
            ty: Type::Boolean,
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            collator,
            has_untyped_argument,
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let lhs = self.lhs.evaluate(ctx)?;
        let rhs = self.rhs.evaluate(ctx)?;

        if self.op.is_order() && self.has_untyped_argument {
            let (lt, rt) = (type_of(&lhs), type_of(&rhs));
            if !lt.same_kind(&rt) || !matches!(lt, Type::String | Type::Number) {
                return Err(RuntimeError::Other(format!(
                    "Expected arguments for \"{}\" to be (string, string) or (number, number), but found ({}, {}) instead.",
                    self.op.as_str(),
                    lt.kind(),
                    rt.kind()
                )));
            }
        }

        let Some(collator) = &self.collator else {
            return Ok(Value::Boolean(self.op.compare(&lhs, &rhs)));
        };
        match (&lhs, &rhs) {
            (Value::String(a), Value::String(b)) => match collator.evaluate(ctx)? {
                Value::Collator(c) => Ok(Value::Boolean(self.op.compare_with_collator(a, b, &c))),
                other => Err(RuntimeError::TypeMismatch {
                    expected: Type::Collator.to_string(),
                    found: type_of(&other).to_string(),
                }),
            },
            _ => Ok(Value::Boolean(self.op.compare(&lhs, &rhs))),
        }
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.lhs);
        f(&self.rhs);
        if let Some(collator) = &self.collator {
            f(collator);
        }
    }

    pub fn output_defined(&self) -> bool {
        true
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![Json::from(self.op.as_str())];
        self.each_child(&mut |child| out.push(child.serialize()));
        Json::Array(out)
    }
}
