use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::Value;
use serde_json::{json, Value as Json};
use std::sync::Arc;

/// A reference to a `let` binding. Shares the bound subtree with the `let`.
#[derive(Debug, Clone)]
pub struct Var {
    pub ty: Type,
    pub name: String,
    pub bound: Arc<Expression>,
}

impl Var {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        let name = match args {
            [_, Json::String(name)] => name,
            _ => {
                ctx.error("'var' expression requires exactly one string literal argument.");
                return None;
            }
        };
        let Some(bound) = ctx.scope.get(name) else {
            ctx.error_at(
                format!(
                    "Unknown variable \"{name}\". Make sure \"{name}\" has been bound in an enclosing \"let\" expression before using it."
                ),
                &[1],
            );
            return None;
        };
        Some(Expression::Var(Var {
            ty: bound.ty().clone(),
            name: name.clone(),
            bound,
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        self.bound.evaluate(ctx)
    }

    /// The bound expression belongs to the enclosing `let`, not to this node.
    pub fn each_child<'s>(&'s self, _f: &mut dyn FnMut(&'s Expression)) {}

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        json!(["var", self.name])
    }
}
