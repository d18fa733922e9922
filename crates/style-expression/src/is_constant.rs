//! Dependency analysis over parsed trees.

use crate::expression::Expression;

/// Operators that read camera or rendering state.
pub const GLOBAL_PROPERTIES: [&str; 5] = [
    "zoom",
    "heatmap-density",
    "line-progress",
    "accumulated",
    "is-supported-script",
];

fn all_children(e: &Expression, pred: impl Fn(&Expression) -> bool) -> bool {
    let mut result = true;
    e.each_child(&mut |child| {
        if result && !pred(child) {
            result = false;
        }
    });
    result
}

/// Whether `e` never reads the feature: no property, id, geometry type or
/// state lookups and no `filter-*` primitives.
pub fn is_feature_constant(e: &Expression) -> bool {
    if let Expression::Compound(c) = e {
        match c.name {
            "get" | "has" if c.args.len() == 1 => return false,
            "feature-state" | "properties" | "geometry-type" | "id" => return false,
            name if name.starts_with("filter-") => return false,
            _ => {}
        }
    }
    all_children(e, is_feature_constant)
}

/// Whether `e` never reads feature state.
pub fn is_state_constant(e: &Expression) -> bool {
    if e.compound_name() == Some("feature-state") {
        return false;
    }
    all_children(e, is_state_constant)
}

/// Whether `e` never calls any operator in `properties`.
pub fn is_global_property_constant(e: &Expression, properties: &[&str]) -> bool {
    if e.compound_name().is_some_and(|name| properties.contains(&name)) {
        return false;
    }
    all_children(e, |child| is_global_property_constant(child, properties))
}

/// Whether `e` can be evaluated once at parse time: every direct child is
/// already a literal and the node reads neither the feature nor the camera.
pub fn is_expression_constant(e: &Expression) -> bool {
    match e {
        Expression::Var(var) => return is_expression_constant(&var.bound),
        Expression::Compound(c) if c.name == "error" => return false,
        Expression::Collator(_) => return false,
        _ => {}
    }
    let children_constant = if matches!(e, Expression::Assertion(_) | Expression::Coercion(_)) {
        all_children(e, is_expression_constant)
    } else {
        all_children(e, |child| matches!(child, Expression::Literal(_)))
    };
    children_constant
        && is_feature_constant(e)
        && is_global_property_constant(e, &GLOBAL_PROPERTIES)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ExpressionRegistry;
    use crate::parsing_context::ParsingContext;
    use serde_json::{json, Value as Json};

    fn parse(expr: Json) -> Expression {
        let mut errors = Vec::new();
        let mut ctx = ParsingContext::new(ExpressionRegistry::shared(), &mut errors, None);
        ctx.parse_node(&expr, Default::default()).unwrap()
    }

    #[test]
    fn test_feature_constant() {
        assert!(!is_feature_constant(&parse(json!(["get", "x"]))));
        assert!(is_feature_constant(&parse(json!(["get", "x", ["literal", {"x": 1}]]))));
        assert!(!is_feature_constant(&parse(json!(["+", 1, ["to-number", ["id"]]]))));
        assert!(is_feature_constant(&parse(json!(["zoom"]))));
    }

    #[test]
    fn test_state_constant() {
        assert!(!is_state_constant(&parse(json!(["number", ["feature-state", "hover"]]))));
        assert!(is_state_constant(&parse(json!(["get", "hover"]))));
    }

    #[test]
    fn test_global_property_constant() {
        let e = parse(json!(["interpolate", ["linear"], ["zoom"], 0, 0, 10, 1]));
        assert!(!is_global_property_constant(&e, &["zoom"]));
        assert!(is_global_property_constant(&e, &["line-progress"]));
    }

    #[test]
    fn test_constant_subtrees_fold() {
        assert!(matches!(parse(json!(["+", 1, 2])), Expression::Literal(_)));
        assert!(matches!(parse(json!(["concat", "a", ["upcase", "b"]])), Expression::Literal(_)));
        assert!(!matches!(parse(json!(["+", 1, ["zoom"]])), Expression::Literal(_)));
    }
}
