use std::fmt;

/// An image reference together with whether the renderer has it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedImage {
    pub name: String,
    pub available: bool,
}

impl ResolvedImage {
    /// An unavailable image named `name`, or `None` for an empty name.
    pub fn from_string(name: &str) -> Option<ResolvedImage> {
        if name.is_empty() {
            return None;
        }
        Some(ResolvedImage {
            name: name.to_string(),
            available: false,
        })
    }
}

impl fmt::Display for ResolvedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
