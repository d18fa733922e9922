use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::{is_valid_type, Type};
use crate::values::{type_of, Value};
use serde_json::Value as Json;

fn needle_types() -> [Type; 5] {
    [Type::Boolean, Type::String, Type::Number, Type::Null, Type::Value]
}

fn is_valid_needle(value: &Value) -> bool {
    matches!(
        value,
        Value::Boolean(_) | Value::String(_) | Value::Number(_) | Value::Null
    )
}

fn check_needle(value: &Value) -> Result<(), RuntimeError> {
    if is_valid_needle(value) {
        return Ok(());
    }
    Err(RuntimeError::Other(format!(
        "Expected first argument to be of type boolean, string, number or null, but found {} instead.",
        type_of(value)
    )))
}

// A string haystack searches for the needle's JS string form.
fn needle_text(needle: &Value) -> String {
    match needle {
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn haystack_error(value: &Value) -> RuntimeError {
    RuntimeError::Other(format!(
        "Expected second argument to be of type array or string, but found {} instead.",
        type_of(value)
    ))
}

fn parse_operands(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<(Expression, Expression)> {
    let needle = ctx.parse(&args[1], 1, Some(Type::Value));
    let haystack = ctx.parse(&args[2], 2, Some(Type::Value));
    let (needle, haystack) = (needle?, haystack?);
    if !is_valid_type(needle.ty(), &needle_types()) {
        ctx.error(format!(
            "Expected first argument to be of type boolean, string, number or null, but found {} instead",
            needle.ty()
        ));
        return None;
    }
    if !is_valid_type(
        haystack.ty(),
        &[Type::array(Type::Value, None), Type::String, Type::Value],
    ) {
        ctx.error(format!(
            "Expected second argument to be of type array or string, but found {} instead",
            haystack.ty()
        ));
        return None;
    }
    Some((needle, haystack))
}

/// Membership test against an array or substring test against a string.
#[derive(Debug, Clone)]
pub struct In {
    pub ty: Type,
    pub needle: Box<Expression>,
    pub haystack: Box<Expression>,
}

impl In {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() != 3 {
            ctx.error(format!("Expected 2 arguments, but found {} instead.", args.len() - 1));
            return None;
        }
        let (needle, haystack) = parse_operands(args, ctx)?;
        Some(Expression::In(In {
            ty: Type::Boolean,
            needle: Box::new(needle),
            haystack: Box::new(haystack),
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let needle = self.needle.evaluate(ctx)?;
        let haystack = self.haystack.evaluate(ctx)?;
        if !haystack.is_truthy() {
            return Ok(Value::Boolean(false));
        }
        check_needle(&needle)?;
        match &haystack {
            Value::String(s) => Ok(Value::Boolean(s.contains(&needle_text(&needle)))),
            Value::Array(items) => Ok(Value::Boolean(
                items.iter().any(|item| item.strict_equals(&needle)),
            )),
            other => Err(haystack_error(other)),
        }
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.needle);
        f(&self.haystack);
    }

    pub fn output_defined(&self) -> bool {
        true
    }

    pub fn serialize(&self) -> Json {
        Json::Array(vec![
            Json::from("in"),
            self.needle.serialize(),
            self.haystack.serialize(),
        ])
    }
}

/// Position of the first match, in characters for strings, or -1.
#[derive(Debug, Clone)]
pub struct IndexOf {
    pub ty: Type,
    pub needle: Box<Expression>,
    pub haystack: Box<Expression>,
    pub from_index: Option<Box<Expression>>,
}

/// Strings clamp a negative start to 0; arrays count it from the end.
fn resolve_from_index(from: Option<f64>, len: usize, from_end: bool) -> usize {
    match from {
        None => 0,
        Some(f) if f.is_nan() => 0,
        Some(f) if f < 0.0 && from_end => (len as f64 + f.trunc()).max(0.0) as usize,
        Some(f) if f < 0.0 => 0,
        Some(f) => (f.trunc() as usize).min(len),
    }
}

impl IndexOf {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() <= 2 || args.len() >= 5 {
            ctx.error(format!(
                "Expected 3 or 4 arguments, but found {} instead.",
                args.len() - 1
            ));
            return None;
        }
        let (needle, haystack) = parse_operands(args, ctx)?;
        let from_index = match args.get(3) {
            Some(arg) => Some(Box::new(ctx.parse(arg, 3, Some(Type::Number))?)),
            None => None,
        };
        Some(Expression::IndexOf(IndexOf {
            ty: Type::Number,
            needle: Box::new(needle),
            haystack: Box::new(haystack),
            from_index,
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let needle = self.needle.evaluate(ctx)?;
        let haystack = self.haystack.evaluate(ctx)?;
        check_needle(&needle)?;
        let from = match &self.from_index {
            Some(e) => Some(e.evaluate(ctx)?.to_number()),
            None => None,
        };
        let position = match &haystack {
            Value::String(s) => {
                let chars: Vec<char> = s.chars().collect();
                let target: Vec<char> = needle_text(&needle).chars().collect();
                let start = resolve_from_index(from, chars.len(), false);
                if target.is_empty() {
                    Some(start)
                } else {
                    chars[start..]
                        .windows(target.len())
                        .position(|w| w == target.as_slice())
                        .map(|p| p + start)
                }
            }
            Value::Array(items) => {
                let start = resolve_from_index(from, items.len(), true);
                items[start..]
                    .iter()
                    .position(|item| item.strict_equals(&needle))
                    .map(|p| p + start)
            }
            other => return Err(haystack_error(other)),
        };
        Ok(Value::Number(position.map(|p| p as f64).unwrap_or(-1.0)))
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.needle);
        f(&self.haystack);
        if let Some(from) = &self.from_index {
            f(from);
        }
    }

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![
            Json::from("index-of"),
            self.needle.serialize(),
            self.haystack.serialize(),
        ];
        if let Some(from) = &self.from_index {
            out.push(from.serialize());
        }
        Json::Array(out)
    }
}
