//! Feature filters, in both the expression and the legacy grammar. Legacy
//! filters are checked through both lowerings: the `filter-*` primitives
//! and the guarded plain-expression conversion.

use proptest::prelude::*;
use serde_json::{json, Value as Json};
use style_expression::feature_filter::convert_filter;
use style_expression::{create_filter, Feature, FeatureFilter, GeometryType, GlobalProperties, Value};

fn compile_both(filter: Json) -> [FeatureFilter; 2] {
    let direct = create_filter(Some(&filter))
        .unwrap_or_else(|e| panic!("create_filter({}) failed: {}", filter, e));
    let converted = convert_filter(&filter);
    let via_expression = create_filter(Some(&converted))
        .unwrap_or_else(|e| panic!("create_filter({}) failed: {}", converted, e));
    [direct, via_expression]
}

fn matches(filter: &mut FeatureFilter, feature: &Feature) -> bool {
    filter.filter(&GlobalProperties::default(), feature, None)
}

fn point() -> Feature {
    Feature::new(GeometryType::Point)
}

fn assert_legacy(filter: Json, cases: &[(Feature, bool)]) {
    for mut compiled in compile_both(filter.clone()) {
        for (feature, expected) in cases {
            assert_eq!(
                matches(&mut compiled, feature),
                *expected,
                "{} on {:?}",
                filter,
                feature.properties
            );
        }
    }
}

#[test]
fn test_expression_zoom() {
    let mut f = create_filter(Some(&json!([">=", ["number", ["get", "x"]], ["zoom"]]))).unwrap();
    for (zoom, x, expected) in [
        (1.0, 0.0, false),
        (1.0, 1.5, true),
        (1.0, 2.5, true),
        (2.0, 0.0, false),
        (2.0, 1.5, false),
        (2.0, 2.5, true),
    ] {
        let feature = point().with_property("x", x);
        assert_eq!(
            f.filter(&GlobalProperties::at_zoom(zoom), &feature, None),
            expected,
            "zoom {} x {}",
            zoom,
            x
        );
    }
}

#[test]
fn test_expression_runtime_error_rejects() {
    let mut f =
        create_filter(Some(&json!(["==", ["string", ["get", "x"]], ["string", ["get", "y"]]]))).unwrap();
    assert!(!matches(&mut f, &point().with_property("x", 1.0).with_property("y", 1.0)));
    assert!(matches(&mut f, &point().with_property("x", "1").with_property("y", "1")));
    assert!(!matches(&mut f, &point().with_property("x", Value::Null)));
}

#[test]
fn test_expression_any_all() {
    let feature = point();
    for (filter, expected) in [
        (json!(["all"]), true),
        (json!(["all", true]), true),
        (json!(["all", true, false]), false),
        (json!(["any"]), false),
        (json!(["any", true, false]), true),
        (json!(["any", false, false]), false),
    ] {
        let mut f = create_filter(Some(&filter)).unwrap();
        assert_eq!(matches(&mut f, &feature), expected, "{}", filter);
    }
}

#[test]
fn test_legacy_type_mismatch_means_false() {
    let filter = json!(["any", ["all", [">", "y", 0], [">", "y", 0]], [">", "x", 0]]);
    let feature = |x: Value, y: Value| point().with_property("x", x).with_property("y", y).with_property("z", 1.0);
    assert_legacy(
        filter,
        &[
            (feature(Value::Number(0.0), Value::Number(1.0)), true),
            (feature(Value::Number(1.0), Value::Number(0.0)), true),
            (feature(Value::Number(0.0), Value::Number(0.0)), false),
            (feature(Value::Null, Value::Number(1.0)), true),
            (feature(Value::Number(1.0), Value::Null), true),
            (feature(Value::Null, Value::Null), false),
        ],
    );
}

#[test]
fn test_legacy_equality() {
    assert_legacy(
        json!(["==", "foo", 0]),
        &[
            (point().with_property("foo", 0.0), true),
            (point().with_property("foo", 1.0), false),
            (point().with_property("foo", "0"), false),
            (point().with_property("foo", true), false),
            (point(), false),
        ],
    );
    assert_legacy(
        json!(["!=", "foo", "bar"]),
        &[
            (point().with_property("foo", "bar"), false),
            (point().with_property("foo", "baz"), true),
            (point(), true),
        ],
    );
}

#[test]
fn test_legacy_null_is_not_missing() {
    assert_legacy(
        json!(["==", "foo", null]),
        &[
            (point().with_property("foo", Value::Null), true),
            (point().with_property("foo", 0.0), false),
            (point(), false),
        ],
    );
    assert_legacy(
        json!(["!=", "foo", null]),
        &[
            (point().with_property("foo", Value::Null), false),
            (point().with_property("foo", 0.0), true),
            (point(), true),
        ],
    );
}

#[test]
fn test_legacy_ordering() {
    assert_legacy(
        json!(["<", "foo", 0]),
        &[
            (point().with_property("foo", -1.0), true),
            (point().with_property("foo", 0.0), false),
            (point().with_property("foo", "-1"), false),
        ],
    );
    assert_legacy(
        json!([">=", "foo", "b"]),
        &[
            (point().with_property("foo", "b"), true),
            (point().with_property("foo", "c"), true),
            (point().with_property("foo", "a"), false),
            (point().with_property("foo", 5.0), false),
        ],
    );
}

#[test]
fn test_legacy_type_and_id() {
    assert_legacy(
        json!(["==", "$type", "LineString"]),
        &[
            (Feature::new(GeometryType::LineString), true),
            (point(), false),
        ],
    );
    assert_legacy(
        json!(["in", "$type", "Point", "Polygon"]),
        &[
            (point(), true),
            (Feature::new(GeometryType::Polygon), true),
            (Feature::new(GeometryType::LineString), false),
        ],
    );
    assert_legacy(
        json!(["==", "$id", 1234]),
        &[
            (point().with_id(1234.0), true),
            (point().with_id("1234"), false),
            (point(), false),
        ],
    );
    assert_legacy(
        json!(["has", "$id"]),
        &[(point().with_id(1.0), true), (point(), false)],
    );
}

#[test]
fn test_legacy_in() {
    assert_legacy(
        json!(["in", "foo", 0]),
        &[
            (point().with_property("foo", 0.0), true),
            (point().with_property("foo", 1.0), false),
            (point().with_property("foo", "0"), false),
            (point(), false),
        ],
    );
    assert_legacy(
        json!(["!in", "foo", "a", "b"]),
        &[
            (point().with_property("foo", "a"), false),
            (point().with_property("foo", "c"), true),
            (point(), true),
        ],
    );
    assert_legacy(
        json!(["in", "foo", 0, "0"]),
        &[
            (point().with_property("foo", 0.0), true),
            (point().with_property("foo", "0"), true),
            (point().with_property("foo", 1.0), false),
        ],
    );
    assert_legacy(json!(["in", "foo"]), &[(point().with_property("foo", 0.0), false)]);
}

fn large_in_filter() -> Json {
    let mut filter = vec![json!("in"), json!("foo")];
    filter.extend((0..2000).map(|i| json!(i)));
    Json::Array(filter)
}

#[test]
fn test_legacy_large_in() {
    assert_legacy(
        large_in_filter(),
        &[
            (point().with_property("foo", 0.0), true),
            (point().with_property("foo", 1999.0), true),
            (point().with_property("foo", 2000.0), false),
            (point().with_property("foo", -1.0), false),
            (point().with_property("foo", "1"), false),
        ],
    );
}

#[test]
fn test_legacy_combinators() {
    let feature = point().with_property("a", 1.0);
    for (filter, expected) in [
        (json!(["all", ["has", "a"], ["==", "a", 1]]), true),
        (json!(["all", ["has", "a"], ["==", "a", 2]]), false),
        (json!(["any", ["has", "b"], ["==", "a", 1]]), true),
        (json!(["none", ["has", "b"], ["==", "a", 2]]), true),
        (json!(["none", ["has", "a"]]), false),
        (json!(["!has", "a"]), false),
        (json!(["has", "$type"]), true),
    ] {
        for mut compiled in compile_both(filter.clone()) {
            assert_eq!(matches(&mut compiled, &feature), expected, "{}", filter);
        }
    }
}

#[test]
fn test_absent_filter() {
    assert!(matches(&mut create_filter(None).unwrap(), &point()));
}

#[test]
fn test_invalid_filter_is_an_error() {
    let err = create_filter(Some(&json!(["==", ["number", ["get", "x"]], ["string", ["get", "y"]]])))
        .unwrap_err();
    assert!(!err.0.is_empty());
}

proptest! {
    #[test]
    fn prop_large_in_membership(needle in -100i64..2100) {
        let mut filter = create_filter(Some(&large_in_filter())).unwrap();
        let feature = point().with_property("foo", needle as f64);
        prop_assert_eq!(matches(&mut filter, &feature), (0..2000).contains(&needle));
    }
}
