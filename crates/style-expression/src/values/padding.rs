use crate::util::{interpolate_number, number_to_string};
use crate::values::Value;
use std::fmt;

/// Box padding as `[top, right, bottom, left]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Padding {
    pub values: [f64; 4],
}

impl Padding {
    pub fn new(values: [f64; 4]) -> Self {
        Padding { values }
    }

    /// Accepts a single number or a one to four element number array, with
    /// CSS shorthand expansion.
    pub fn parse(input: &Value) -> Option<Padding> {
        match input {
            Value::Padding(p) => Some(*p),
            Value::Number(n) => Some(Padding::new([*n; 4])),
            Value::Array(items) => {
                let nums = items
                    .iter()
                    .map(Value::as_f64)
                    .collect::<Option<Vec<f64>>>()?;
                let values = match nums.as_slice() {
                    [a] => [*a, *a, *a, *a],
                    [a, b] => [*a, *b, *a, *b],
                    [a, b, c] => [*a, *b, *c, *b],
                    [a, b, c, d] => [*a, *b, *c, *d],
                    _ => return None,
                };
                Some(Padding::new(values))
            }
            _ => None,
        }
    }

    pub fn interpolate(from: &Padding, to: &Padding, t: f64) -> Padding {
        let mut values = [0.0; 4];
        for (i, v) in values.iter_mut().enumerate() {
            *v = interpolate_number(from.values[i], to.values[i], t);
        }
        Padding::new(values)
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.values.iter().map(|v| number_to_string(*v)).collect();
        write!(f, "[{}]", parts.join(","))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_shorthand() {
        let p = |v| Padding::parse(&Value::from(v)).map(|p| p.values);
        assert_eq!(p(json!(2)), Some([2.0; 4]));
        assert_eq!(p(json!([1, 2])), Some([1.0, 2.0, 1.0, 2.0]));
        assert_eq!(p(json!([1, 2, 3])), Some([1.0, 2.0, 3.0, 2.0]));
        assert_eq!(p(json!([1, 2, 3, 4, 5])), None);
        assert_eq!(p(json!([])), None);
        assert_eq!(p(json!(["1"])), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(Padding::new([1.0, 2.5, 3.0, 4.0]).to_string(), "[1,2.5,3,4]");
    }
}
