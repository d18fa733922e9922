use super::is_expression_filter;
use indexmap::IndexMap;
use serde_json::{json, Value as Json};
use std::cmp::Ordering;

/// Runtime type names, keyed by the property a comparison dereferences.
type ExpectedTypes = IndexMap<String, &'static str>;

/// Converts a legacy filter into a plain expression.
///
/// Legacy filters treat a comparison against a value of the wrong type as
/// `false`, where the expression equivalent raises an error and aborts the
/// whole evaluation. Within `any` that difference is observable, so every
/// disjunct is wrapped in a `case` that first checks the `typeof` of each
/// property it compares:
///
/// ```text
/// ["any", [">", "x", 0], ...]
/// ["any", ["case", ["==", ["typeof", ["get", "x"]], "number"], [">", ["get", "x"], 0], false], ...]
/// ```
///
/// Outside `any` a runtime error already yields `false`, so no guard is added.
pub fn convert_filter(filter: &Json) -> Json {
    convert(filter, &mut ExpectedTypes::new())
}

fn convert(filter: &Json, expected: &mut ExpectedTypes) -> Json {
    if is_expression_filter(filter) {
        return filter.clone();
    }
    let items = match filter {
        Json::Array(items) => items,
        _ => return Json::Bool(true),
    };
    let op = items.first().and_then(Json::as_str).unwrap_or_default();
    if items.len() <= 1 {
        return Json::Bool(op != "any");
    }
    let null = Json::Null;
    let arg = |i: usize| items.get(i).unwrap_or(&null);

    match op {
        "==" | "!=" | "<" | ">" | "<=" | ">=" => {
            convert_comparison(op, arg(1), arg(2), expected)
        }
        "any" => {
            let mut converted = vec![json!("any")];
            for child in &items[1..] {
                let mut types = ExpectedTypes::new();
                let child = convert(child, &mut types);
                converted.push(match runtime_type_checks(&types) {
                    Json::Bool(true) => child,
                    checks => json!(["case", checks, child, false]),
                });
            }
            Json::Array(converted)
        }
        "all" => {
            let mut children: Vec<Json> = items[1..].iter().map(|f| convert(f, expected)).collect();
            if children.len() == 1 {
                children.remove(0)
            } else {
                children.insert(0, json!("all"));
                Json::Array(children)
            }
        }
        "none" => {
            let mut any = vec![json!("any")];
            any.extend(items[1..].iter().cloned());
            json!(["!", convert(&Json::Array(any), &mut ExpectedTypes::new())])
        }
        "in" => convert_in(arg(1), &items[2..], false),
        "!in" => convert_in(arg(1), &items[2..], true),
        "has" => convert_has(arg(1)),
        "!has" => json!(["!", convert_has(arg(1))]),
        _ => Json::Bool(true),
    }
}

fn accessor(property: &Json) -> Json {
    if property == "$type" {
        json!(["geometry-type"])
    } else if property == "$id" {
        json!(["id"])
    } else {
        json!(["get", property])
    }
}

fn js_typeof(value: &Json) -> &'static str {
    match value {
        Json::Number(_) => "number",
        Json::String(_) => "string",
        Json::Bool(_) => "boolean",
        _ => "object",
    }
}

fn runtime_type_checks(expected: &ExpectedTypes) -> Json {
    let mut conditions: Vec<Json> = expected
        .iter()
        .map(|(property, ty)| {
            let get = if property == "$id" {
                json!(["id"])
            } else {
                json!(["get", property])
            };
            json!(["==", ["typeof", get], ty])
        })
        .collect();
    match conditions.len() {
        0 => Json::Bool(true),
        1 => conditions.remove(0),
        _ => {
            conditions.insert(0, json!("all"));
            Json::Array(conditions)
        }
    }
}

fn convert_comparison(
    op: &str,
    property: &Json,
    value: &Json,
    expected: &mut ExpectedTypes,
) -> Json {
    if property == "$type" {
        return json!([op, ["geometry-type"], value]);
    }
    let get = accessor(property);
    if let Some(key) = property.as_str().filter(|_| !value.is_null()) {
        expected.insert(key.to_string(), js_typeof(value));
    }
    let is_id = property == "$id";
    match op {
        // A missing property is not null to a legacy filter.
        "==" if !is_id && value.is_null() => {
            json!(["all", ["has", property], ["==", get, null]])
        }
        "!=" if !is_id && value.is_null() => {
            json!(["any", ["!", ["has", property]], ["!=", get, null]])
        }
        _ => json!([op, get, value]),
    }
}

fn match_label_order(a: &Json, b: &Json) -> Ordering {
    match (a, b) {
        (Json::Number(x), Json::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Json::String(x), Json::String(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn convert_in(property: &Json, values: &[Json], negate: bool) -> Json {
    let Some(first) = values.first() else {
        return Json::Bool(negate);
    };
    let get = accessor(property);

    let kind = js_typeof(first);
    let uniform = values.iter().all(|v| js_typeof(v) == kind);
    if uniform && (kind == "string" || kind == "number") {
        // Match labels must be unique.
        let mut labels = values.to_vec();
        labels.sort_by(match_label_order);
        labels.dedup_by(|a, b| match_label_order(a, b) == Ordering::Equal);
        return json!(["match", get, labels, !negate, negate]);
    }

    let (combinator, test) = if negate { ("all", "!=") } else { ("any", "==") };
    let mut converted = vec![json!(combinator)];
    converted.extend(values.iter().map(|v| json!([test, get, v])));
    Json::Array(converted)
}

fn convert_has(property: &Json) -> Json {
    if property == "$type" {
        Json::Bool(true)
    } else if property == "$id" {
        json!(["!=", ["id"], null])
    } else {
        json!(["has", property])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_flattens_single_child_all() {
        let filter = json!([
            "all",
            ["in", "$type", "Polygon", "LineString", "Point"],
            ["all", ["in", "type", "island"]]
        ]);
        assert_eq!(
            convert_filter(&filter),
            json!([
                "all",
                ["match", ["geometry-type"], ["LineString", "Point", "Polygon"], true, false],
                ["match", ["get", "type"], ["island"], true, false]
            ])
        );
    }

    #[test]
    fn test_in_deduplicates_and_sorts_numerically() {
        let filter = json!(["in", "$id", 10, 2, 3, 2, 10]);
        assert_eq!(
            convert_filter(&filter),
            json!(["match", ["id"], [2, 3, 10], true, false])
        );
        assert_eq!(convert_filter(&json!(["!in", "x"])), json!(true));
    }

    #[test]
    fn test_any_children_get_type_guards() {
        let filter = json!(["any", ["all", [">", "y", 0], [">", "y", 0]], [">", "x", 0]]);
        assert_eq!(
            convert_filter(&filter),
            json!([
                "any",
                [
                    "case",
                    ["==", ["typeof", ["get", "y"]], "number"],
                    ["all", [">", ["get", "y"], 0], [">", ["get", "y"], 0]],
                    false
                ],
                ["case", ["==", ["typeof", ["get", "x"]], "number"], [">", ["get", "x"], 0], false]
            ])
        );
    }

    #[test]
    fn test_null_comparisons() {
        assert_eq!(
            convert_filter(&json!(["==", "foo", null])),
            json!(["all", ["has", "foo"], ["==", ["get", "foo"], null]])
        );
        assert_eq!(
            convert_filter(&json!(["!=", "foo", null])),
            json!(["any", ["!", ["has", "foo"]], ["!=", ["get", "foo"], null]])
        );
        assert_eq!(
            convert_filter(&json!(["==", "$id", null])),
            json!(["==", ["id"], null])
        );
    }

    #[test]
    fn test_degenerate() {
        assert_eq!(convert_filter(&Json::Null), json!(true));
        assert_eq!(convert_filter(&json!(["any"])), json!(["any"]));
        assert_eq!(convert_filter(&json!(["none", ["has", "$type"]])), json!(["!", ["any", true]]));
        assert_eq!(convert_filter(&json!(["!has", "$id"])), json!(["!", ["!=", ["id"], null]]));
    }
}
