use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::{type_of, Value};
use serde_json::Value as Json;
use std::collections::HashMap;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// A branch label. Numeric labels are integral, so they key exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Label {
    Number(i64),
    String(String),
}

impl Label {
    fn of(value: &Value) -> Option<Label> {
        match value {
            Value::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER => {
                Some(Label::Number(*n as i64))
            }
            Value::String(s) => Some(Label::String(s.clone())),
            _ => None,
        }
    }

    fn to_json(&self) -> Json {
        match self {
            Label::Number(n) => Json::from(*n),
            Label::String(s) => Json::from(s.as_str()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Match {
    pub ty: Type,
    pub input_type: Type,
    pub input: Box<Expression>,
    labels: Vec<(Label, usize)>,
    cases: HashMap<Label, usize>,
    pub outputs: Vec<Expression>,
    pub otherwise: Box<Expression>,
}

impl Match {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() < 5 {
            ctx.error(format!(
                "Expected at least 4 arguments, but found only {}.",
                args.len() - 1
            ));
            return None;
        }
        if args.len() % 2 != 1 {
            ctx.error("Expected an even number of arguments.");
            return None;
        }

        let mut output_type = ctx.expected_type.clone().filter(|t| !t.is_value());
        let mut input_type: Option<Type> = None;
        let mut labels = Vec::new();
        let mut cases = HashMap::new();
        let mut outputs = Vec::new();

        let last = args.len() - 1;
        for i in (2..last).step_by(2) {
            let raw_labels = match &args[i] {
                Json::Array(items) => items.clone(),
                single => vec![single.clone()],
            };
            {
                let mut label_ctx = ctx.concat(i, None, None);
                if raw_labels.is_empty() {
                    label_ctx.error("Expected at least one branch label.");
                    return None;
                }
                for raw in &raw_labels {
                    let value = match raw {
                        Json::Number(_) | Json::String(_) => Value::from(raw),
                        _ => {
                            label_ctx.error("Branch labels must be numbers or strings.");
                            return None;
                        }
                    };
                    if let Value::Number(n) = value {
                        if n.abs() > MAX_SAFE_INTEGER {
                            label_ctx.error(format!(
                                "Branch labels must be integers no larger than {}.",
                                MAX_SAFE_INTEGER as i64
                            ));
                            return None;
                        }
                        if n.fract() != 0.0 {
                            label_ctx.error("Numeric branch labels must be integer values.");
                            return None;
                        }
                    }
                    match &input_type {
                        None => input_type = Some(type_of(&value)),
                        Some(t) => {
                            if label_ctx.check_subtype(t, &type_of(&value)).is_some() {
                                return None;
                            }
                        }
                    }
                    let Some(label) = Label::of(&value) else {
                        return None;
                    };
                    if cases.contains_key(&label) {
                        label_ctx.error("Branch labels must be unique.");
                        return None;
                    }
                    cases.insert(label.clone(), outputs.len());
                    labels.push((label, outputs.len()));
                }
            }

            let result = ctx.parse(&args[i + 1], i + 1, output_type.clone())?;
            if output_type.is_none() {
                output_type = Some(result.ty().clone());
            }
            outputs.push(result);
        }

        let input = ctx.parse(&args[1], 1, Some(Type::Value))?;
        let otherwise = ctx.parse(&args[last], last, output_type.clone())?;
        let input_type = input_type.unwrap_or(Type::Value);
        if !input.ty().is_value() {
            let mut input_ctx = ctx.concat(1, None, None);
            if input_ctx.check_subtype(&input_type, input.ty()).is_some() {
                return None;
            }
        }

        Some(Expression::Match(Match {
            ty: output_type.unwrap_or(Type::Value),
            input_type,
            input: Box::new(input),
            labels,
            cases,
            outputs,
            otherwise: Box::new(otherwise),
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let input = self.input.evaluate(ctx)?;
        let branch = if type_of(&input) == self.input_type {
            Label::of(&input).and_then(|label| self.cases.get(&label))
        } else {
            None
        };
        match branch {
            Some(&index) => self.outputs[index].evaluate(ctx),
            None => self.otherwise.evaluate(ctx),
        }
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.input);
        self.outputs.iter().for_each(&mut *f);
        f(&self.otherwise);
    }

    pub fn output_defined(&self) -> bool {
        self.outputs.iter().all(Expression::output_defined) && self.otherwise.output_defined()
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![Json::from("match"), self.input.serialize()];
        for (index, output) in self.outputs.iter().enumerate() {
            let group: Vec<Json> = self
                .labels
                .iter()
                .filter(|(_, i)| *i == index)
                .map(|(label, _)| label.to_json())
                .collect();
            if group.len() == 1 {
                out.extend(group);
            } else {
                out.push(Json::Array(group));
            }
            out.push(output.serialize());
        }
        out.push(self.otherwise.serialize());
        Json::Array(out)
    }
}
