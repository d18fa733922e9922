//! Static types of the expression language.

use std::fmt;

/// A type in the expression language.
///
/// `Value` is the top type: every other type except `Collator` widens to it.
#[derive(Debug, Clone, PartialEq)]
pub enum Type {
    Null,
    Number,
    String,
    Boolean,
    Color,
    Object,
    Value,
    Error,
    Collator,
    Formatted,
    Padding,
    ResolvedImage,
    Array {
        item: Box<Type>,
        n: Option<usize>,
    },
}

impl Type {
    pub fn array(item: Type, n: Option<usize>) -> Type {
        Type::Array {
            item: Box::new(item),
            n,
        }
    }

    /// The type tag without array parameters, as used by `typeof`-style
    /// checks and error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Type::Null => "null",
            Type::Number => "number",
            Type::String => "string",
            Type::Boolean => "boolean",
            Type::Color => "color",
            Type::Object => "object",
            Type::Value => "value",
            Type::Error => "error",
            Type::Collator => "collator",
            Type::Formatted => "formatted",
            Type::Padding => "padding",
            Type::ResolvedImage => "resolvedImage",
            Type::Array { .. } => "array",
        }
    }

    pub fn same_kind(&self, other: &Type) -> bool {
        self.kind() == other.kind()
    }

    pub fn is_value(&self) -> bool {
        matches!(self, Type::Value)
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Array { item, n: Some(n) } => write!(f, "array<{}, {}>", item, n),
            Type::Array { item, n: None } if item.is_value() => f.write_str("array"),
            Type::Array { item, n: None } => write!(f, "array<{}>", item),
            other => f.write_str(other.kind()),
        }
    }
}

fn value_member_types() -> [Type; 10] {
    [
        Type::Null,
        Type::Number,
        Type::String,
        Type::Boolean,
        Type::Color,
        Type::Formatted,
        Type::Object,
        Type::array(Type::Value, None),
        Type::Padding,
        Type::ResolvedImage,
    ]
}

/// Returns `None` if `t` is a subtype of `expected`, or an error message
/// otherwise.
pub fn check_subtype(expected: &Type, t: &Type) -> Option<String> {
    if matches!(t, Type::Error) {
        // A throwing expression fits any slot.
        return None;
    }
    let ok = match (expected, t) {
        (
            Type::Array { item: expected_item, n: expected_n },
            Type::Array { item, n },
        ) => {
            let empty_untyped = *n == Some(0) && item.is_value();
            (empty_untyped || check_subtype(expected_item, item).is_none())
                && (expected_n.is_none() || expected_n == n)
        }
        (Type::Array { .. }, _) => false,
        (Type::Value, _) => {
            t.is_value()
                || value_member_types()
                    .iter()
                    .any(|member| check_subtype(member, t).is_none())
        }
        _ => expected.kind() == t.kind(),
    };
    if ok {
        None
    } else {
        Some(format!("Expected {} but found {} instead.", expected, t))
    }
}

pub fn is_subtype(expected: &Type, t: &Type) -> bool {
    check_subtype(expected, t).is_none()
}

/// Whether `provided` has the same kind as one of `allowed`.
pub fn is_valid_type(provided: &Type, allowed: &[Type]) -> bool {
    allowed.iter().any(|t| t.same_kind(provided))
}
