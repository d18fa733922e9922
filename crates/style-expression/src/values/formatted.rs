use super::{Color, ResolvedImage};
use std::fmt;

/// One run of rich text, or an inline image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FormattedSection {
    pub text: String,
    pub image: Option<ResolvedImage>,
    pub scale: Option<f64>,
    pub font_stack: Option<String>,
    pub text_color: Option<Color>,
}

impl FormattedSection {
    pub fn text(text: impl Into<String>) -> Self {
        FormattedSection {
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Rich text produced by `format`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Formatted {
    pub sections: Vec<FormattedSection>,
}

impl Formatted {
    pub fn new(sections: Vec<FormattedSection>) -> Self {
        Formatted { sections }
    }

    pub fn from_string(text: &str) -> Self {
        Formatted::new(vec![FormattedSection::text(text)])
    }

    /// True when no section carries text or a named image.
    pub fn is_empty(&self) -> bool {
        !self.sections.iter().any(|s| {
            !s.text.is_empty() || s.image.as_ref().is_some_and(|img| !img.name.is_empty())
        })
    }
}

impl fmt::Display for Formatted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for section in &self.sections {
            f.write_str(&section.text)?;
        }
        Ok(())
    }
}
