use serde_json::{json, Value as Json};
use std::cmp::Ordering;

/// Value lists longer than this are sorted and searched with `filter-in-large`.
const LARGE_IN_THRESHOLD: usize = 200;

/// Lowers a legacy filter onto the `filter-*` primitives, which implement
/// the legacy comparison rules directly.
pub fn legacy_filter_to_expression(filter: &Json) -> Json {
    let Some(items) = filter.as_array() else {
        return Json::Bool(true);
    };
    let op = items.first().and_then(Json::as_str).unwrap_or_default();
    if items.len() <= 1 {
        return Json::Bool(op != "any");
    }
    let null = Json::Null;
    let arg = |i: usize| items.get(i).unwrap_or(&null);

    match op {
        "==" | "<" | ">" | "<=" | ">=" => comparison(arg(1), arg(2), op),
        "!=" => negate(comparison(arg(1), arg(2), "==")),
        "any" | "all" => {
            let mut converted = vec![json!(op)];
            converted.extend(items[1..].iter().map(legacy_filter_to_expression));
            Json::Array(converted)
        }
        "none" => {
            let mut converted = vec![json!("all")];
            converted.extend(items[1..].iter().map(|f| negate(legacy_filter_to_expression(f))));
            Json::Array(converted)
        }
        "in" => membership(arg(1), &items[2..]),
        "!in" => negate(membership(arg(1), &items[2..])),
        "has" => has(arg(1)),
        "!has" => negate(has(arg(1))),
        _ => Json::Bool(true),
    }
}

fn negate(filter: Json) -> Json {
    json!(["!", filter])
}

/// Quotes compound values so they parse as literals.
fn operand(value: &Json) -> Json {
    match value {
        Json::Array(_) | Json::Object(_) => json!(["literal", value]),
        other => other.clone(),
    }
}

fn comparison(property: &Json, value: &Json, op: &str) -> Json {
    if property == "$type" {
        json!([format!("filter-type-{op}"), operand(value)])
    } else if property == "$id" {
        json!([format!("filter-id-{op}"), operand(value)])
    } else {
        json!([format!("filter-{op}"), property, operand(value)])
    }
}

fn kind(value: &Json) -> u8 {
    match value {
        Json::Null => 0,
        Json::Bool(_) => 1,
        Json::Number(_) => 2,
        Json::String(_) => 3,
        Json::Array(_) => 4,
        Json::Object(_) => 5,
    }
}

fn ascending(a: &Json, b: &Json) -> Ordering {
    match (a, b) {
        (Json::Number(x), Json::Number(y)) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Json::String(x), Json::String(y)) => x.cmp(y),
        (Json::Bool(x), Json::Bool(y)) => x.cmp(y),
        _ => Ordering::Equal,
    }
}

fn membership(property: &Json, values: &[Json]) -> Json {
    if values.is_empty() {
        return Json::Bool(false);
    }
    if property == "$type" {
        return json!(["filter-type-in", ["literal", values]]);
    }
    if property == "$id" {
        return json!(["filter-id-in", ["literal", values]]);
    }
    let uniform = values.iter().all(|v| kind(v) == kind(&values[0]));
    if values.len() > LARGE_IN_THRESHOLD && uniform {
        let mut sorted = values.to_vec();
        sorted.sort_by(ascending);
        json!(["filter-in-large", property, ["literal", sorted]])
    } else {
        json!(["filter-in-small", property, ["literal", values]])
    }
}

fn has(property: &Json) -> Json {
    if property == "$type" {
        Json::Bool(true)
    } else if property == "$id" {
        json!(["filter-has-id"])
    } else {
        json!(["filter-has", property])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_comparisons() {
        assert_eq!(
            legacy_filter_to_expression(&json!(["==", "foo", "bar"])),
            json!(["filter-==", "foo", "bar"])
        );
        assert_eq!(
            legacy_filter_to_expression(&json!(["!=", "$type", "Point"])),
            json!(["!", ["filter-type-==", "Point"]])
        );
        assert_eq!(
            legacy_filter_to_expression(&json!(["<=", "$id", 4])),
            json!(["filter-id-<=", 4])
        );
    }

    #[test]
    fn test_combinators() {
        assert_eq!(
            legacy_filter_to_expression(&json!(["none", ["has", "a"], ["!has", "$id"]])),
            json!(["all", ["!", ["filter-has", "a"]], ["!", ["!", ["filter-has-id"]]]])
        );
        assert_eq!(legacy_filter_to_expression(&json!(["any"])), json!(false));
        assert_eq!(legacy_filter_to_expression(&json!(["all"])), json!(true));
        assert_eq!(legacy_filter_to_expression(&json!(["has", "$type"])), json!(true));
    }

    #[test]
    fn test_membership_forms() {
        assert_eq!(legacy_filter_to_expression(&json!(["in", "foo"])), json!(false));
        assert_eq!(
            legacy_filter_to_expression(&json!(["in", "$type", "Point", "Polygon"])),
            json!(["filter-type-in", ["literal", ["Point", "Polygon"]]])
        );
        assert_eq!(
            legacy_filter_to_expression(&json!(["!in", "foo", 2, 1])),
            json!(["!", ["filter-in-small", "foo", ["literal", [2, 1]]]])
        );

        let mut filter = vec![json!("in"), json!("foo")];
        filter.extend((0..300).rev().map(|i| json!(i)));
        let converted = legacy_filter_to_expression(&Json::Array(filter));
        assert_eq!(converted[0], json!("filter-in-large"));
        assert_eq!(converted[2][1][0], json!(0));
        assert_eq!(converted[2][1][299], json!(299));
    }
}
