//! Legacy stop functions.
//!
//! Before expressions, data- and zoom-driven values were written as
//! `{"stops": [[input, output], ...], "property": ..., "type": ...}`
//! objects. They are converted to the equivalent expression and compiled
//! like any other.

mod convert;

pub use convert::{convert_function, convert_token_string};

use serde_json::Value as Json;

/// Whether a property value is a stop function rather than an expression or
/// constant.
pub fn is_function(value: &Json) -> bool {
    value.is_object()
}
