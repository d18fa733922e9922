use crate::values::{Color, FormattedSection, Object, Value};
use std::collections::HashMap;

/// Camera and rendering inputs shared by every feature in a frame.
#[derive(Debug, Clone, Default)]
pub struct GlobalProperties {
    pub zoom: f64,
    pub heatmap_density: Option<f64>,
    pub line_progress: Option<f64>,
    pub is_supported_script: Option<fn(&str) -> bool>,
    pub accumulated: Option<Value>,
}

impl GlobalProperties {
    pub fn at_zoom(zoom: f64) -> Self {
        GlobalProperties {
            zoom,
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GeometryType {
    #[default]
    Unknown,
    Point,
    LineString,
    Polygon,
}

impl GeometryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GeometryType::Unknown => "Unknown",
            GeometryType::Point => "Point",
            GeometryType::LineString => "LineString",
            GeometryType::Polygon => "Polygon",
        }
    }
}

/// The slice of a vector-tile feature that expressions can observe.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Feature {
    pub geometry_type: GeometryType,
    pub id: Option<Value>,
    pub properties: Object,
}

impl Feature {
    pub fn new(geometry_type: GeometryType) -> Self {
        Feature {
            geometry_type,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<Value>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

pub type FeatureState = Object;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CanonicalTileId {
    pub z: u8,
    pub x: u32,
    pub y: u32,
}

/// Per-call inputs to an evaluation. Everything but the globals is optional.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationInput<'a> {
    pub globals: &'a GlobalProperties,
    pub feature: Option<&'a Feature>,
    pub feature_state: Option<&'a FeatureState>,
    pub canonical: Option<&'a CanonicalTileId>,
    pub available_images: Option<&'a [String]>,
    pub formatted_section: Option<&'a FormattedSection>,
}

impl<'a> EvaluationInput<'a> {
    pub fn new(globals: &'a GlobalProperties) -> Self {
        EvaluationInput {
            globals,
            feature: None,
            feature_state: None,
            canonical: None,
            available_images: None,
            formatted_section: None,
        }
    }

    pub fn with_feature(mut self, feature: &'a Feature) -> Self {
        self.feature = Some(feature);
        self
    }

    pub fn with_feature_state(mut self, state: &'a FeatureState) -> Self {
        self.feature_state = Some(state);
        self
    }

    pub fn with_canonical(mut self, canonical: &'a CanonicalTileId) -> Self {
        self.canonical = Some(canonical);
        self
    }

    pub fn with_available_images(mut self, images: &'a [String]) -> Self {
        self.available_images = Some(images);
        self
    }

    pub fn with_formatted_section(mut self, section: &'a FormattedSection) -> Self {
        self.formatted_section = Some(section);
        self
    }
}

/// The context passed to every node's `evaluate`.
///
/// The per-call inputs are borrowed for one evaluation; the colour cache is
/// owned by the compiled expression and survives across calls.
pub struct EvaluationContext<'a> {
    pub input: EvaluationInput<'a>,
    color_cache: &'a mut HashMap<String, Option<Color>>,
}

static EMPTY_OBJECT: std::sync::OnceLock<Object> = std::sync::OnceLock::new();

impl<'a> EvaluationContext<'a> {
    pub fn new(input: EvaluationInput<'a>, color_cache: &'a mut HashMap<String, Option<Color>>) -> Self {
        EvaluationContext { input, color_cache }
    }

    pub fn globals(&self) -> &GlobalProperties {
        self.input.globals
    }

    /// The feature id, or `null` without a feature or id.
    pub fn id(&self) -> Value {
        self.input
            .feature
            .and_then(|f| f.id.clone())
            .unwrap_or(Value::Null)
    }

    pub fn geometry_type(&self) -> Option<&'static str> {
        self.input.feature.map(|f| f.geometry_type.as_str())
    }

    pub fn properties(&self) -> &Object {
        match self.input.feature {
            Some(f) => &f.properties,
            None => EMPTY_OBJECT.get_or_init(Object::new),
        }
    }

    pub fn feature_state(&self) -> &Object {
        match self.input.feature_state {
            Some(state) => state,
            None => EMPTY_OBJECT.get_or_init(Object::new),
        }
    }

    pub fn canonical_id(&self) -> Option<&CanonicalTileId> {
        self.input.canonical
    }

    pub fn available_images(&self) -> Option<&[String]> {
        self.input.available_images
    }

    pub fn formatted_section(&self) -> Option<&FormattedSection> {
        self.input.formatted_section
    }

    /// Parses a CSS colour, memoising the result per input string.
    pub fn parse_color(&mut self, input: &str) -> Option<Color> {
        if let Some(cached) = self.color_cache.get(input) {
            return *cached;
        }
        let parsed = Color::parse(input);
        self.color_cache.insert(input.to_string(), parsed);
        parsed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_exposes_input() {
        let globals = GlobalProperties::at_zoom(3.0);
        let feature = Feature::new(GeometryType::Polygon)
            .with_id(7.0)
            .with_property("name", "x");
        let tile = CanonicalTileId { z: 3, x: 1, y: 2 };
        let images = vec!["marker".to_string()];
        let section = FormattedSection::text("label");
        let input = EvaluationInput::new(&globals)
            .with_feature(&feature)
            .with_canonical(&tile)
            .with_available_images(&images)
            .with_formatted_section(&section);

        let mut cache = HashMap::new();
        let ctx = EvaluationContext::new(input, &mut cache);
        assert_eq!(ctx.globals().zoom, 3.0);
        assert_eq!(ctx.id(), Value::Number(7.0));
        assert_eq!(ctx.geometry_type(), Some("Polygon"));
        assert_eq!(ctx.properties().get("name"), Some(&Value::from("x")));
        assert!(ctx.feature_state().is_empty());
        assert_eq!(ctx.canonical_id(), Some(&tile));
        assert_eq!(ctx.available_images(), Some(&images[..]));
        assert_eq!(ctx.formatted_section().map(|s| s.text.as_str()), Some("label"));
    }

    #[test]
    fn test_defaults_without_feature() {
        let globals = GlobalProperties::default();
        let mut cache = HashMap::new();
        let ctx = EvaluationContext::new(EvaluationInput::new(&globals), &mut cache);
        assert_eq!(ctx.id(), Value::Null);
        assert_eq!(ctx.geometry_type(), None);
        assert!(ctx.properties().is_empty());
        assert_eq!(ctx.canonical_id(), None);
        assert!(ctx.formatted_section().is_none());
    }
}
