use thiserror::Error;

/// A parse-time error, keyed by the path of the offending node (`[1][2]`).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{key}: {message}")]
pub struct ParsingError {
    pub key: String,
    pub message: String,
}

impl ParsingError {
    pub fn new(key: impl Into<String>, message: impl Into<String>) -> Self {
        ParsingError {
            key: key.into(),
            message: message.into(),
        }
    }
}

/// An evaluation-time error raised by a node whose runtime input violates a
/// constraint the type checker could not rule out.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RuntimeError {
    /// Raised by the `error` operator.
    #[error("{0}")]
    Thrown(String),

    #[error("Expected value to be of type {expected}, but found {found} instead.")]
    TypeMismatch { expected: String, found: String },

    #[error("Array index out of bounds: {0} < 0.")]
    IndexBelowZero(String),

    #[error("Array index out of bounds: {index} > {last}.")]
    IndexAboveLength { index: String, last: String },

    #[error("Array index must be an integer, but found {0} instead.")]
    IndexNotInteger(String),

    #[error("Input is not a number.")]
    InputNotNumber,

    #[error("{0}")]
    Other(String),
}

/// A stop function that cannot be expressed in the expression language.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConvertError {
    #[error("Unknown zoom function type \"{0}\"")]
    UnknownZoomFunctionType(String),

    #[error("Unknown property function type {0}")]
    UnknownPropertyFunctionType(String),

    #[error("function has no stops and no property")]
    MissingProperty,

    #[error("function stops must be [input, output] pairs")]
    MalformedStop,
}

/// A filter that fails to compile.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{}", join_parsing_errors(.0))]
pub struct FilterError(pub Vec<ParsingError>);

/// Failure of `normalize_property_expression`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum NormalizeError {
    #[error(transparent)]
    Convert(#[from] ConvertError),

    #[error("{}", join_parsing_errors(.0))]
    Parse(Vec<ParsingError>),
}

pub(crate) fn join_parsing_errors(errors: &[ParsingError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
