use crate::expression::Expression;
use std::sync::Arc;

pub type Binding = (String, Arc<Expression>);

/// A lexical scope of `let` bindings.
///
/// Scopes form a persistent chain: entering a `let` creates a child that
/// points at its parent, so sibling subtrees never see each other's names.
#[derive(Debug, Default)]
pub struct Scope {
    parent: Option<Arc<Scope>>,
    bindings: Vec<Binding>,
}

impl Scope {
    pub fn root() -> Arc<Scope> {
        Arc::new(Scope::default())
    }

    pub fn concat(parent: &Arc<Scope>, bindings: Vec<Binding>) -> Arc<Scope> {
        Arc::new(Scope {
            parent: Some(Arc::clone(parent)),
            bindings,
        })
    }

    /// Innermost binding for `name`.
    pub fn get(&self, name: &str) -> Option<Arc<Expression>> {
        self.bindings
            .iter()
            .rev()
            .find(|(n, _)| n == name)
            .map(|(_, e)| Arc::clone(e))
            .or_else(|| self.parent.as_ref().and_then(|p| p.get(name)))
    }

    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }
}
