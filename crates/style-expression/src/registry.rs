//! Operator-name lookup for the parser.

use crate::definitions;
use crate::expression::Expression;
use crate::operators::{self, CompoundDefinition};
use crate::parsing_context::ParsingContext;
use serde_json::Value as Json;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

/// Parser entry point of a special form. `args[0]` is the operator name.
pub type ParseFn = fn(&[Json], &mut ParsingContext<'_>) -> Option<Expression>;

#[derive(Clone)]
pub enum Definition {
    /// A node with its own parsing rules.
    Special(ParseFn),
    /// A signature table resolved by overload matching.
    Compound(Arc<CompoundDefinition>),
}

/// Maps operator names to their definitions.
#[derive(Clone, Default)]
pub struct ExpressionRegistry {
    definitions: HashMap<&'static str, Definition>,
}

impl fmt::Debug for ExpressionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&&str> = self.definitions.keys().collect();
        names.sort();
        f.debug_struct("ExpressionRegistry").field("names", &names).finish()
    }
}

static SHARED: OnceLock<ExpressionRegistry> = OnceLock::new();

impl ExpressionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every special form and compound operator of the language.
    pub fn standard() -> Self {
        let mut registry = Self::new();
        definitions::register(&mut registry);
        for def in operators::all_operators() {
            registry.register_compound(def);
        }
        registry
    }

    /// The standard registry, built once per process.
    pub fn shared() -> &'static ExpressionRegistry {
        SHARED.get_or_init(Self::standard)
    }

    pub fn register_special(&mut self, name: &'static str, parse: ParseFn) {
        self.definitions.insert(name, Definition::Special(parse));
    }

    pub fn register_compound(&mut self, def: Arc<CompoundDefinition>) {
        self.definitions.insert(def.name, Definition::Compound(def));
    }

    pub fn get(&self, name: &str) -> Option<&Definition> {
        self.definitions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.definitions.keys().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry() {
        let registry = ExpressionRegistry::shared();
        for name in ["literal", "let", "match", "interpolate-hcl", "+", "get", "filter-in-large"] {
            assert!(registry.contains(name), "{name}");
        }
        assert!(!registry.contains("$"));
        assert!(matches!(registry.get("case"), Some(Definition::Special(_))));
        assert!(matches!(registry.get("zoom"), Some(Definition::Compound(_))));
    }
}
