//! Special forms: nodes with their own parsing and typing rules.
//!
//! Operators whose typing is a plain signature table live in
//! [`crate::operators`] instead.

mod assertion;
mod at;
mod case;
mod coalesce;
mod coercion;
mod collator;
mod comparison;
mod format;
mod image;
mod interpolate;
mod length;
mod let_expr;
mod literal;
mod match_expr;
mod membership;
mod number_format;
mod slice;
mod step;
mod var;

pub use assertion::Assertion;
pub use at::At;
pub use case::Case;
pub use coalesce::Coalesce;
pub use coercion::Coercion;
pub use collator::CollatorExpression;
pub use comparison::{Comparison, ComparisonOp};
pub use format::{FormatExpression, FormatSection};
pub use image::ImageExpression;
pub use interpolate::{Interpolate, InterpolationType};
pub use length::Length;
pub use let_expr::Let;
pub use literal::Literal;
pub use match_expr::Match;
pub use membership::{In, IndexOf};
pub use number_format::NumberFormat;
pub use slice::Slice;
pub use step::Step;
pub use var::Var;

use crate::registry::ExpressionRegistry;

/// Registers every special form.
pub fn register(registry: &mut ExpressionRegistry) {
    registry.register_special("literal", Literal::parse);
    registry.register_special("var", Var::parse);
    registry.register_special("let", Let::parse);
    for name in ["array", "boolean", "number", "object", "string"] {
        registry.register_special(name, Assertion::parse);
    }
    for name in ["to-boolean", "to-color", "to-number", "to-string"] {
        registry.register_special(name, Coercion::parse);
    }
    registry.register_special("at", At::parse);
    registry.register_special("in", In::parse);
    registry.register_special("index-of", IndexOf::parse);
    registry.register_special("slice", Slice::parse);
    registry.register_special("length", Length::parse);
    registry.register_special("match", Match::parse);
    registry.register_special("case", Case::parse);
    registry.register_special("coalesce", Coalesce::parse);
    registry.register_special("step", Step::parse);
    for name in ["interpolate", "interpolate-hcl", "interpolate-lab"] {
        registry.register_special(name, Interpolate::parse);
    }
    for name in ["==", "!=", "<", ">", "<=", ">="] {
        registry.register_special(name, Comparison::parse);
    }
    registry.register_special("collator", CollatorExpression::parse);
    registry.register_special("number-format", NumberFormat::parse);
    registry.register_special("format", FormatExpression::parse);
    registry.register_special("image", ImageExpression::parse);
}
