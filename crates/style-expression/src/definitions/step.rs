use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::util::find_stop_less_than_or_equal_to;
use crate::values::{number_to_json, Value};
use serde_json::Value as Json;

/// Piecewise-constant function of a numeric input.
#[derive(Debug, Clone)]
pub struct Step {
    pub ty: Type,
    pub input: Box<Expression>,
    /// Stop inputs. The first is always negative infinity.
    pub labels: Vec<f64>,
    pub outputs: Vec<Expression>,
}

impl Step {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() - 1 < 4 {
            ctx.error(format!(
                "Expected at least 4 arguments, but found only {}.",
                args.len() - 1
            ));
            return None;
        }
        if (args.len() - 1) % 2 != 0 {
            ctx.error("Expected an even number of arguments.");
            return None;
        }

        let input = ctx.parse(&args[1], 1, Some(Type::Number))?;
        let mut output_type = ctx.expected_type.clone().filter(|t| !t.is_value());
        let mut labels: Vec<f64> = Vec::new();
        let mut outputs = Vec::new();

        for i in (1..args.len()).step_by(2) {
            let label = if i == 1 {
                f64::NEG_INFINITY
            } else {
                match args[i].as_f64() {
                    Some(n) => n,
                    None => {
                        ctx.error_at(
                            "Input/output pairs for \"step\" expressions must be defined using literal numeric values (not computed expressions) for the input values.",
                            &[i],
                        );
                        return None;
                    }
                }
            };
            if labels.last().is_some_and(|prev| *prev >= label) {
                ctx.error_at(
                    "Input/output pairs for \"step\" expressions must be arranged with input values in strictly ascending order.",
                    &[i],
                );
                return None;
            }
            let parsed = ctx.parse(&args[i + 1], i + 1, output_type.clone())?;
            if output_type.is_none() {
                output_type = Some(parsed.ty().clone());
            }
            labels.push(label);
            outputs.push(parsed);
        }

        Some(Expression::Step(Step {
            ty: output_type.unwrap_or(Type::Value),
            input: Box::new(input),
            labels,
            outputs,
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let labels = &self.labels;
        if labels.len() == 1 {
            return self.outputs[0].evaluate(ctx);
        }
        let value = self.input.evaluate(ctx)?.to_number();
        if value <= labels[0] {
            return self.outputs[0].evaluate(ctx);
        }
        let last = labels.len() - 1;
        if value >= labels[last] {
            return self.outputs[last].evaluate(ctx);
        }
        let index = find_stop_less_than_or_equal_to(labels, value)?;
        self.outputs[index].evaluate(ctx)
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.input);
        self.outputs.iter().for_each(f);
    }

    pub fn output_defined(&self) -> bool {
        self.outputs.iter().all(Expression::output_defined)
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![Json::from("step"), self.input.serialize()];
        for (i, (label, output)) in self.labels.iter().zip(&self.outputs).enumerate() {
            if i > 0 {
                out.push(number_to_json(*label));
            }
            out.push(output.serialize());
        }
        Json::Array(out)
    }
}
