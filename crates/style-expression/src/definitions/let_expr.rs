use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::{ParseOptions, ParsingContext};
use crate::scope::Binding;
use crate::types::Type;
use crate::values::Value;
use regex::Regex;
use serde_json::Value as Json;
use std::sync::{Arc, OnceLock};

fn invalid_name_char_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-zA-Z0-9_]").expect("static regex"))
}

#[derive(Debug, Clone)]
pub struct Let {
    pub ty: Type,
    pub bindings: Vec<Binding>,
    pub result: Box<Expression>,
}

impl Let {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() < 4 {
            ctx.error(format!(
                "Expected at least 3 arguments, but found {} instead.",
                args.len() - 1
            ));
            return None;
        }

        let mut bindings: Vec<Binding> = Vec::new();
        let last = args.len() - 1;
        let mut i = 1;
        while i < last {
            let Some(name) = args[i].as_str() else {
                ctx.error_at(
                    format!("Expected string, but found {} instead.", json_typeof(&args[i])),
                    &[i],
                );
                return None;
            };
            if invalid_name_char_re().is_match(name) {
                ctx.error_at(
                    "Variable names must contain only alphanumeric characters or '_'.",
                    &[i],
                );
                return None;
            }
            let value = ctx.parse(&args[i + 1], i + 1, None)?;
            bindings.push((name.to_string(), Arc::new(value)));
            i += 2;
        }

        let expected = ctx.expected_type.clone();
        let result = ctx.parse_with(
            &args[last],
            last,
            expected,
            Some(bindings.clone()),
            ParseOptions::default(),
        )?;
        Some(Expression::Let(Let {
            ty: result.ty().clone(),
            bindings,
            result: Box::new(result),
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        self.result.evaluate(ctx)
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        for (_, bound) in &self.bindings {
            f(bound);
        }
        f(&self.result);
    }

    pub fn output_defined(&self) -> bool {
        self.result.output_defined()
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![Json::from("let")];
        for (name, bound) in &self.bindings {
            out.push(Json::from(name.as_str()));
            out.push(bound.serialize());
        }
        out.push(self.result.serialize());
        Json::Array(out)
    }
}

fn json_typeof(json: &Json) -> &'static str {
    match json {
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        _ => "object",
    }
}
