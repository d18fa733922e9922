use crate::error::ConvertError;
use crate::property_spec::{PropertySpecification, PropertyValueType};
use regex::Regex;
use serde_json::{json, Map, Value as Json};
use std::sync::OnceLock;

/// The fields of a stop function that steer conversion.
#[derive(Debug, Clone, Copy, Default)]
struct FunctionParams<'a> {
    ty: Option<&'a str>,
    property: Option<&'a Json>,
    default: Option<&'a Json>,
    base: Option<&'a Json>,
    color_space: Option<&'a str>,
}

impl<'a> FunctionParams<'a> {
    fn from_object(map: &'a Map<String, Json>) -> Self {
        FunctionParams {
            ty: map.get("type").and_then(Json::as_str),
            property: map.get("property"),
            default: map.get("default"),
            base: map.get("base"),
            color_space: map.get("colorSpace").and_then(Json::as_str),
        }
    }

    /// The declared type, or the one implied by the property.
    fn function_type(&self, spec: &PropertySpecification) -> &'a str {
        match self.ty {
            Some(ty) => ty,
            None if spec.supports_interpolation() => "exponential",
            None => "interval",
        }
    }

    fn interpolate_operator(&self) -> &'static str {
        match self.color_space {
            Some("hcl") => "interpolate-hcl",
            Some("lab") => "interpolate-lab",
            _ => "interpolate",
        }
    }

    fn interpolation(&self) -> Json {
        match self.base {
            Some(base) if base.as_f64() != Some(1.0) => json!(["exponential", base]),
            _ => json!(["linear"]),
        }
    }

    fn get(&self) -> Json {
        json!(["get", self.property.unwrap_or(&Json::Null)])
    }
}

type Stop = (Json, Json);

/// Objects, arrays and null must be quoted to parse as values.
fn convert_literal(value: &Json) -> Json {
    match value {
        Json::Object(_) | Json::Array(_) | Json::Null => json!(["literal", value]),
        other => other.clone(),
    }
}

/// Stop inputs compare numerically, so `1` and `1.0` are the same stop.
fn same_stop(a: &Json, b: &Json) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

fn append_stop_pair(curve: &mut Vec<Json>, input: Json, output: Json, is_step: bool) {
    // Functions never rejected duplicate stops; expressions do.
    if curve.len() > 3 && same_stop(&input, &curve[curve.len() - 2]) {
        return;
    }
    // A step curve's first stop input is implied.
    if !(is_step && curve.len() == 2) {
        curve.push(input);
    }
    curve.push(output);
}

/// A step with a single output gets a redundant stop so it still parses.
fn fixup_degenerate_step_curve(curve: &mut Vec<Json>) {
    if curve.len() == 3 && curve[0] == "step" {
        let output = curve[2].clone();
        curve.push(json!(0));
        curve.push(output);
    }
}

/// Converts a stop function into an expression for the given property.
pub fn convert_function(
    parameters: &Json,
    spec: &PropertySpecification,
) -> Result<Json, ConvertError> {
    let map = parameters.as_object().ok_or(ConvertError::MalformedStop)?;
    let params = FunctionParams::from_object(map);
    let Some(raw_stops) = map.get("stops") else {
        return convert_identity_function(&params, spec);
    };
    let raw_stops = raw_stops.as_array().ok_or(ConvertError::MalformedStop)?;
    let mut parsed = Vec::with_capacity(raw_stops.len());
    for stop in raw_stops {
        match stop.as_array().map(Vec::as_slice) {
            Some([input, output]) => parsed.push((input, output)),
            _ => return Err(ConvertError::MalformedStop),
        }
    }
    let Some((first_input, _)) = parsed.first() else {
        return Err(ConvertError::MalformedStop);
    };

    let zoom_and_feature_dependent = first_input.is_object();
    let feature_dependent = zoom_and_feature_dependent || params.property.is_some();
    let zoom_dependent = zoom_and_feature_dependent || !feature_dependent;

    let stops: Vec<Stop> = parsed
        .into_iter()
        .map(|(input, output)| {
            let output = match output {
                Json::String(s) if !feature_dependent && spec.tokens => convert_token_string(s),
                other => convert_literal(other),
            };
            (input.clone(), output)
        })
        .collect();

    let converted = if zoom_and_feature_dependent {
        convert_zoom_and_property_function(&params, spec, stops)
    } else if zoom_dependent {
        convert_zoom_function(&params, spec, stops)
    } else {
        convert_property_function(&params, spec, stops)
    }?;
    tracing::trace!(%converted, "converted stop function");
    Ok(converted)
}

fn convert_identity_function(
    params: &FunctionParams<'_>,
    spec: &PropertySpecification,
) -> Result<Json, ConvertError> {
    if params.property.is_none() {
        return Err(ConvertError::MissingProperty);
    }
    let get = params.get();
    let Some(default) = params.default else {
        // String properties coerce by default; a function asserts instead.
        return Ok(match spec.value_type {
            PropertyValueType::String => json!(["string", get]),
            _ => get,
        });
    };
    let expression = match spec.value_type {
        PropertyValueType::Enum => {
            json!(["match", get, spec.enum_values().unwrap_or_default(), get, default])
        }
        PropertyValueType::Color => json!(["to-color", get, convert_literal(default)]),
        PropertyValueType::Array => json!([
            "array",
            spec.value.map(|v| v.as_str()).unwrap_or("value"),
            spec.length,
            get,
            convert_literal(default)
        ]),
        PropertyValueType::Number | PropertyValueType::String | PropertyValueType::Boolean => {
            json!([spec.value_type.as_str(), get, convert_literal(default)])
        }
        PropertyValueType::Padding | PropertyValueType::Formatted | PropertyValueType::ResolvedImage => {
            json!(["coalesce", get, convert_literal(default)])
        }
    };
    Ok(expression)
}

fn fallback(params: &FunctionParams<'_>, spec: &PropertySpecification) -> Json {
    match params.default.or(spec.default.as_ref()) {
        Some(default) => convert_literal(default),
        None if spec.value_type == PropertyValueType::ResolvedImage => json!(""),
        None => Json::Null,
    }
}

/// Guards a numeric curve so non-numeric inputs take the function default.
fn with_numeric_guard(params: &FunctionParams<'_>, expression: Json) -> Json {
    match params.default {
        None => expression,
        Some(default) => json!([
            "case",
            ["==", ["typeof", params.get()], "number"],
            expression,
            convert_literal(default)
        ]),
    }
}

fn convert_property_function(
    params: &FunctionParams<'_>,
    spec: &PropertySpecification,
    stops: Vec<Stop>,
) -> Result<Json, ConvertError> {
    let get = params.get();
    let ty = params.function_type(spec);
    match ty {
        "categorical" if stops.first().is_some_and(|(input, _)| input.is_boolean()) => {
            let mut expression = vec![json!("case")];
            for (input, output) in stops {
                expression.push(json!(["==", get, input]));
                expression.push(output);
            }
            expression.push(fallback(params, spec));
            Ok(Json::Array(expression))
        }
        "categorical" => {
            let mut expression = vec![json!("match"), get];
            for (input, output) in stops {
                append_stop_pair(&mut expression, input, output, false);
            }
            expression.push(fallback(params, spec));
            Ok(Json::Array(expression))
        }
        "interval" => {
            let mut expression = vec![json!("step"), json!(["number", get])];
            for (input, output) in stops {
                append_stop_pair(&mut expression, input, output, true);
            }
            fixup_degenerate_step_curve(&mut expression);
            Ok(with_numeric_guard(params, Json::Array(expression)))
        }
        "exponential" => {
            let mut expression = vec![
                json!(params.interpolate_operator()),
                params.interpolation(),
                json!(["number", get]),
            ];
            for (input, output) in stops {
                append_stop_pair(&mut expression, input, output, false);
            }
            Ok(with_numeric_guard(params, Json::Array(expression)))
        }
        other => Err(ConvertError::UnknownPropertyFunctionType(other.to_string())),
    }
}

fn convert_zoom_function(
    params: &FunctionParams<'_>,
    spec: &PropertySpecification,
    stops: Vec<Stop>,
) -> Result<Json, ConvertError> {
    let (mut expression, is_step) = match params.function_type(spec) {
        "interval" => (vec![json!("step"), json!(["zoom"])], true),
        "exponential" => (
            vec![
                json!(params.interpolate_operator()),
                params.interpolation(),
                json!(["zoom"]),
            ],
            false,
        ),
        other => return Err(ConvertError::UnknownZoomFunctionType(other.to_string())),
    };
    for (input, output) in stops {
        append_stop_pair(&mut expression, input, output, is_step);
    }
    fixup_degenerate_step_curve(&mut expression);
    Ok(Json::Array(expression))
}

/// Two-dimensional stops `[{"zoom": z, "value": v}, output]` become a zoom
/// curve whose outputs are property curves, one per distinct zoom.
fn convert_zoom_and_property_function(
    params: &FunctionParams<'_>,
    spec: &PropertySpecification,
    stops: Vec<Stop>,
) -> Result<Json, ConvertError> {
    let mut groups: Vec<(Json, Vec<Stop>)> = Vec::new();
    for (input, output) in stops {
        let zoom = input.get("zoom").cloned().unwrap_or(Json::Null);
        let value = input.get("value").cloned().unwrap_or(Json::Null);
        match groups.iter_mut().find(|(z, _)| same_stop(z, &zoom)) {
            Some((_, group)) => group.push((value, output)),
            None => groups.push((zoom, vec![(value, output)])),
        }
    }

    // The inner curves only inherit the function type, property and default.
    let inner = FunctionParams {
        ty: params.ty,
        property: params.property,
        default: params.default,
        ..Default::default()
    };
    let interpolated = FunctionParams::default().function_type(spec) == "exponential";
    let mut expression = if interpolated {
        vec![
            json!(params.interpolate_operator()),
            json!(["linear"]),
            json!(["zoom"]),
        ]
    } else {
        vec![json!("step"), json!(["zoom"])]
    };
    for (zoom, group) in groups {
        let output = convert_property_function(&inner, spec, group)?;
        append_stop_pair(&mut expression, zoom, output, !interpolated);
    }
    if !interpolated {
        fixup_degenerate_step_curve(&mut expression);
    }
    Ok(Json::Array(expression))
}

fn token_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]+)\}").expect("static regex"))
}

/// Expands `{name}` tokens: `"a {b} c"` becomes
/// `["concat", "a ", ["get", "b"], " c"]`. Strings without tokens are
/// returned unchanged, and a lone token becomes a `to-string`.
pub fn convert_token_string(s: &str) -> Json {
    let mut result = vec![json!("concat")];
    let mut pos = 0;
    for caps in token_regex().captures_iter(s) {
        let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let literal = &s[pos..whole.start()];
        pos = whole.end();
        if !literal.is_empty() {
            result.push(json!(literal));
        }
        result.push(json!(["get", name.as_str()]));
    }
    if result.len() == 1 {
        return json!(s);
    }
    if pos < s.len() {
        result.push(json!(&s[pos..]));
    } else if result.len() == 2 {
        return json!(["to-string", result[1]]);
    }
    Json::Array(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_token_strings() {
        assert_eq!(convert_token_string("plain"), json!("plain"));
        assert_eq!(convert_token_string("{name}"), json!(["to-string", ["get", "name"]]));
        assert_eq!(
            convert_token_string("a {b} c {d}"),
            json!(["concat", "a ", ["get", "b"], " c ", ["get", "d"]])
        );
        assert_eq!(
            convert_token_string("{a}-{b}!"),
            json!(["concat", ["get", "a"], "-", ["get", "b"], "!"])
        );
    }

    #[test]
    fn test_append_stop_pair_skips_duplicates() {
        let mut curve = vec![json!("interpolate"), json!(["linear"]), json!(["zoom"])];
        append_stop_pair(&mut curve, json!(1), json!(10), false);
        append_stop_pair(&mut curve, json!(1.0), json!(20), false);
        append_stop_pair(&mut curve, json!(2), json!(30), false);
        assert_eq!(
            Json::Array(curve),
            json!(["interpolate", ["linear"], ["zoom"], 1, 10, 2, 30])
        );
    }

    #[test]
    fn test_degenerate_step() {
        let mut curve = vec![json!("step"), json!(["zoom"]), json!("a")];
        fixup_degenerate_step_curve(&mut curve);
        assert_eq!(Json::Array(curve), json!(["step", ["zoom"], "a", 0, "a"]));
    }
}
