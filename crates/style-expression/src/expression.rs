//! The typed expression tree.

use crate::definitions::*;
use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::operators::CompoundExpression;
use crate::types::Type;
use crate::values::Value;
use serde_json::Value as Json;

/// A parsed, type-checked expression node.
#[derive(Debug, Clone)]
pub enum Expression {
    Literal(Literal),
    Var(Var),
    Let(Let),
    Assertion(Assertion),
    Coercion(Coercion),
    At(At),
    In(In),
    IndexOf(IndexOf),
    Slice(Slice),
    Length(Length),
    Match(Match),
    Case(Case),
    Coalesce(Coalesce),
    Step(Step),
    Interpolate(Interpolate),
    Comparison(Comparison),
    Collator(CollatorExpression),
    NumberFormat(NumberFormat),
    Format(FormatExpression),
    Image(ImageExpression),
    Compound(CompoundExpression),
}

macro_rules! dispatch {
    ($self:expr, $node:ident => $body:expr) => {
        match $self {
            Expression::Literal($node) => $body,
            Expression::Var($node) => $body,
            Expression::Let($node) => $body,
            Expression::Assertion($node) => $body,
            Expression::Coercion($node) => $body,
            Expression::At($node) => $body,
            Expression::In($node) => $body,
            Expression::IndexOf($node) => $body,
            Expression::Slice($node) => $body,
            Expression::Length($node) => $body,
            Expression::Match($node) => $body,
            Expression::Case($node) => $body,
            Expression::Coalesce($node) => $body,
            Expression::Step($node) => $body,
            Expression::Interpolate($node) => $body,
            Expression::Comparison($node) => $body,
            Expression::Collator($node) => $body,
            Expression::NumberFormat($node) => $body,
            Expression::Format($node) => $body,
            Expression::Image($node) => $body,
            Expression::Compound($node) => $body,
        }
    };
}

impl Expression {
    pub fn ty(&self) -> &Type {
        dispatch!(self, node => &node.ty)
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        dispatch!(self, node => node.evaluate(ctx))
    }

    /// Visits the direct children in argument order.
    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        dispatch!(self, node => node.each_child(f))
    }

    pub fn children(&self) -> Vec<&Expression> {
        let mut out = Vec::new();
        self.each_child(&mut |child| out.push(child));
        out
    }

    /// Whether the node is guaranteed to produce a non-null value for every
    /// input.
    pub fn output_defined(&self) -> bool {
        dispatch!(self, node => node.output_defined())
    }

    /// Converts the node back to its JSON form. Parsing the result yields an
    /// equivalent tree.
    pub fn serialize(&self) -> Json {
        dispatch!(self, node => node.serialize())
    }

    /// The operator name for compound nodes.
    pub fn compound_name(&self) -> Option<&'static str> {
        match self {
            Expression::Compound(c) => Some(c.name),
            _ => None,
        }
    }
}
