//! The recursive-descent parser and type checker.

use crate::error::ParsingError;
use crate::eval_ctx::{EvaluationContext, EvaluationInput, GlobalProperties};
use crate::expression::Expression;
use crate::is_constant::is_expression_constant;
use crate::registry::{Definition, ExpressionRegistry};
use crate::scope::{Binding, Scope};
use crate::types::{check_subtype, Type};
use crate::definitions::{Assertion, Coercion, Literal};
use serde_json::Value as Json;
use std::collections::HashMap;
use std::sync::Arc;

/// How a node whose type is wider than the expected type gets narrowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeAnnotation {
    /// Wrap in a runtime-checked assertion.
    Assert,
    /// Wrap in a coercion.
    Coerce,
    /// Leave the node as is; the caller checks types itself.
    Omit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
    pub type_annotation: Option<TypeAnnotation>,
}

impl ParseOptions {
    pub fn with_annotation(annotation: TypeAnnotation) -> Self {
        ParseOptions {
            type_annotation: Some(annotation),
        }
    }
}

/// State for parsing one subtree: where it sits (`path`/`key`), which
/// bindings are in scope and what type the parent expects.
///
/// Errors go to a borrowed accumulator, so each overload attempt can parse
/// into a fresh vector and discard it.
pub struct ParsingContext<'a> {
    pub registry: &'a ExpressionRegistry,
    pub path: Vec<usize>,
    pub key: String,
    pub scope: Arc<Scope>,
    pub errors: &'a mut Vec<ParsingError>,
    pub expected_type: Option<Type>,
}

fn key_for(path: &[usize]) -> String {
    path.iter().map(|i| format!("[{}]", i)).collect()
}

fn js_typeof(json: &Json) -> &'static str {
    match json {
        Json::Bool(_) => "boolean",
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Null | Json::Array(_) | Json::Object(_) => "object",
    }
}

impl<'a> ParsingContext<'a> {
    pub fn new(
        registry: &'a ExpressionRegistry,
        errors: &'a mut Vec<ParsingError>,
        expected_type: Option<Type>,
    ) -> Self {
        ParsingContext {
            registry,
            path: Vec::new(),
            key: String::new(),
            scope: Scope::root(),
            errors,
            expected_type,
        }
    }

    /// A sibling context at the same path and scope that reports into a
    /// different error vector.
    pub fn detached<'b>(&self, errors: &'b mut Vec<ParsingError>) -> ParsingContext<'b>
    where
        'a: 'b,
    {
        ParsingContext {
            registry: self.registry,
            path: self.path.clone(),
            key: self.key.clone(),
            scope: Arc::clone(&self.scope),
            errors,
            expected_type: None,
        }
    }

    /// A child context for the argument at `index`.
    pub fn concat(
        &mut self,
        index: usize,
        expected_type: Option<Type>,
        bindings: Option<Vec<Binding>>,
    ) -> ParsingContext<'_> {
        let mut path = self.path.clone();
        path.push(index);
        let scope = match bindings {
            Some(bindings) => Scope::concat(&self.scope, bindings),
            None => Arc::clone(&self.scope),
        };
        ParsingContext {
            registry: self.registry,
            key: key_for(&path),
            path,
            scope,
            errors: &mut *self.errors,
            expected_type,
        }
    }

    /// Parses the argument at `index`, expecting `expected_type`.
    pub fn parse(&mut self, expr: &Json, index: usize, expected_type: Option<Type>) -> Option<Expression> {
        self.parse_with(expr, index, expected_type, None, ParseOptions::default())
    }

    pub fn parse_with(
        &mut self,
        expr: &Json,
        index: usize,
        expected_type: Option<Type>,
        bindings: Option<Vec<Binding>>,
        options: ParseOptions,
    ) -> Option<Expression> {
        self.concat(index, expected_type, bindings).parse_node(expr, options)
    }

    /// Parses `expr` at this context's own position.
    pub fn parse_node(&mut self, expr: &Json, options: ParseOptions) -> Option<Expression> {
        let items = match expr {
            Json::Array(items) => items.as_slice(),
            // Scalars and bare objects are literals.
            other => return self.parse_node(&Json::Array(vec![Json::from("literal"), other.clone()]), options),
        };

        let Some(op) = items.first() else {
            self.error(
                "Expected an array with at least one element. If you wanted a literal array, use [\"literal\", []].",
            );
            return None;
        };
        let Some(name) = op.as_str() else {
            self.error_at(
                format!(
                    "Expression name must be a string, but found {} instead. If you wanted a literal array, use [\"literal\", [...]].",
                    js_typeof(op)
                ),
                &[0],
            );
            return None;
        };

        let registry = self.registry;
        let parsed = match registry.get(name) {
            Some(Definition::Special(parse)) => parse(items, self),
            Some(Definition::Compound(def)) => crate::operators::parse_compound(def, items, self),
            None => {
                self.error_at(
                    format!(
                        "Unknown expression \"{}\". If you wanted a literal array, use [\"literal\", [...]].",
                        name
                    ),
                    &[0],
                );
                return None;
            }
        }?;

        let parsed = self.annotate(parsed, options)?;

        if !matches!(parsed, Expression::Literal(_))
            && !matches!(parsed.ty(), Type::ResolvedImage)
            && is_expression_constant(&parsed)
        {
            return self.fold(parsed);
        }
        Some(parsed)
    }

    fn annotate(&mut self, parsed: Expression, options: ParseOptions) -> Option<Expression> {
        let Some(expected) = self.expected_type.clone() else {
            return Some(parsed);
        };
        let actual = parsed.ty();
        let default_annotation = match (&expected, actual) {
            (
                Type::String | Type::Number | Type::Boolean | Type::Object | Type::Array { .. },
                Type::Value,
            ) => Some(TypeAnnotation::Assert),
            (
                Type::Color | Type::Formatted | Type::ResolvedImage,
                Type::Value | Type::String,
            ) => Some(TypeAnnotation::Coerce),
            (Type::Padding, Type::Value | Type::Number | Type::Array { .. }) => {
                Some(TypeAnnotation::Coerce)
            }
            _ => None,
        };
        match default_annotation {
            Some(default) => Some(match options.type_annotation.unwrap_or(default) {
                TypeAnnotation::Assert => Assertion::wrap(expected, parsed),
                TypeAnnotation::Coerce => Coercion::wrap(expected, parsed),
                TypeAnnotation::Omit => parsed,
            }),
            None => {
                if self.check_subtype(&expected, actual).is_some() {
                    return None;
                }
                Some(parsed)
            }
        }
    }

    fn fold(&mut self, parsed: Expression) -> Option<Expression> {
        let globals = GlobalProperties::default();
        let mut cache = HashMap::new();
        let mut ctx = EvaluationContext::new(EvaluationInput::new(&globals), &mut cache);
        match parsed.evaluate(&mut ctx) {
            Ok(value) => Some(Expression::Literal(Literal::new(parsed.ty().clone(), value))),
            Err(e) => {
                tracing::trace!(key = %self.key, error = %e, "constant folding failed");
                self.error(e.to_string());
                None
            }
        }
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.errors.push(ParsingError::new(self.key.clone(), message));
    }

    /// Records an error at a position below this context, e.g. `&[1]` for
    /// this node's first argument.
    pub fn error_at(&mut self, message: impl Into<String>, keys: &[usize]) {
        let key = format!("{}{}", self.key, key_for(keys));
        self.errors.push(ParsingError::new(key, message));
    }

    /// Records and returns a subtyping error, if any.
    pub fn check_subtype(&mut self, expected: &Type, t: &Type) -> Option<String> {
        let error = check_subtype(expected, t);
        if let Some(message) = &error {
            self.error(message.clone());
        }
        error
    }
}
