use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::Value;
use serde_json::Value as Json;

#[derive(Debug, Clone)]
pub struct Case {
    pub ty: Type,
    pub branches: Vec<(Expression, Expression)>,
    pub otherwise: Box<Expression>,
}

impl Case {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() < 4 {
            ctx.error(format!(
                "Expected at least 3 arguments, but found only {}.",
                args.len() - 1
            ));
            return None;
        }
        if args.len() % 2 != 0 {
            ctx.error("Expected an odd number of arguments.");
            return None;
        }

        let mut output_type = ctx.expected_type.clone().filter(|t| !t.is_value());
        let mut branches = Vec::new();
        let last = args.len() - 1;
        for i in (1..last).step_by(2) {
            let test = ctx.parse(&args[i], i, Some(Type::Boolean))?;
            let result = ctx.parse(&args[i + 1], i + 1, output_type.clone())?;
            if output_type.is_none() {
                output_type = Some(result.ty().clone());
            }
            branches.push((test, result));
        }
        let otherwise = ctx.parse(&args[last], last, output_type.clone())?;
        Some(Expression::Case(Case {
            ty: output_type.unwrap_or(Type::Value),
            branches,
            otherwise: Box::new(otherwise),
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        for (test, result) in &self.branches {
            if test.evaluate(ctx)?.is_truthy() {
                return result.evaluate(ctx);
            }
        }
        self.otherwise.evaluate(ctx)
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        for (test, result) in &self.branches {
            f(test);
            f(result);
        }
        f(&self.otherwise);
    }

    pub fn output_defined(&self) -> bool {
        self.branches.iter().all(|(_, out)| out.output_defined()) && self.otherwise.output_defined()
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![Json::from("case")];
        for (test, result) in &self.branches {
            out.push(test.serialize());
            out.push(result.serialize());
        }
        out.push(self.otherwise.serialize());
        Json::Array(out)
    }
}
