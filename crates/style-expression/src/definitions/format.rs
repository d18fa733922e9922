use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::{number_to_json, Formatted, FormattedSection, Value};
use serde_json::{json, Map, Value as Json};

/// One text or image run of a `format` expression with its style overrides.
#[derive(Debug, Clone)]
pub struct FormatSection {
    pub content: Expression,
    pub scale: Option<Expression>,
    pub font: Option<Expression>,
    pub text_color: Option<Expression>,
}

#[derive(Debug, Clone)]
pub struct FormatExpression {
    pub ty: Type,
    pub sections: Vec<FormatSection>,
}

impl FormatExpression {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() < 2 {
            ctx.error("Expected at least one argument.");
            return None;
        }
        if args[1].is_object() {
            ctx.error("First argument must be an image or text section.");
            return None;
        }

        let mut sections: Vec<FormatSection> = Vec::new();
        let mut next_may_be_options = false;
        for (i, arg) in args.iter().enumerate().skip(1) {
            match (next_may_be_options, arg) {
                (true, Json::Object(options)) => {
                    next_may_be_options = false;
                    let mut option = |key: &str, ty: Type| -> Result<Option<Expression>, ()> {
                        match options.get(key) {
                            Some(json) if super::number_format::is_truthy_json(json) => {
                                ctx.parse(json, i, Some(ty)).map(Some).ok_or(())
                            }
                            _ => Ok(None),
                        }
                    };
                    let scale = option("font-scale", Type::Number).ok()?;
                    let font = option("text-font", Type::array(Type::String, None)).ok()?;
                    let text_color = option("text-color", Type::Color).ok()?;
                    if let Some(last) = sections.last_mut() {
                        last.scale = scale;
                        last.font = font;
                        last.text_color = text_color;
                    }
                }
                _ => {
                    let content = ctx.parse(arg, i, Some(Type::Value))?;
                    if !matches!(
                        content.ty(),
                        Type::String | Type::Value | Type::Null | Type::ResolvedImage
                    ) {
                        ctx.error("Formatted text type must be 'string', 'value', 'image' or 'null'.");
                        return None;
                    }
                    next_may_be_options = true;
                    sections.push(FormatSection {
                        content,
                        scale: None,
                        font: None,
                        text_color: None,
                    });
                }
            }
        }
        Some(Expression::Format(FormatExpression {
            ty: Type::Formatted,
            sections,
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let mut sections = Vec::with_capacity(self.sections.len());
        for section in &self.sections {
            let content = section.content.evaluate(ctx)?;
            if let Value::ResolvedImage(image) = content {
                sections.push(FormattedSection {
                    image: Some(image),
                    ..Default::default()
                });
                continue;
            }
            let scale = match &section.scale {
                Some(e) => Some(e.evaluate(ctx)?.to_number()),
                None => None,
            };
            let font_stack = match &section.font {
                Some(e) => match e.evaluate(ctx)? {
                    Value::Array(fonts) => Some(
                        fonts
                            .iter()
                            .map(Value::to_string)
                            .collect::<Vec<_>>()
                            .join(","),
                    ),
                    other => Some(other.to_string()),
                },
                None => None,
            };
            let text_color = match &section.text_color {
                Some(e) => match e.evaluate(ctx)? {
                    Value::Color(c) => Some(c),
                    _ => None,
                },
                None => None,
            };
            sections.push(FormattedSection {
                text: content.to_string(),
                image: None,
                scale,
                font_stack,
                text_color,
            });
        }
        Ok(Value::Formatted(Formatted::new(sections)))
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        for section in &self.sections {
            f(&section.content);
            for option in [&section.scale, &section.font, &section.text_color]
                .into_iter()
                .flatten()
            {
                f(option);
            }
        }
    }

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        let mut out = vec![Json::from("format")];
        for section in &self.sections {
            out.push(section.content.serialize());
            let mut options = Map::new();
            if let Some(scale) = &section.scale {
                options.insert("font-scale".into(), scale.serialize());
            }
            if let Some(font) = &section.font {
                options.insert("text-font".into(), font.serialize());
            }
            if let Some(color) = &section.text_color {
                options.insert("text-color".into(), color.serialize());
            }
            out.push(Json::Object(options));
        }
        Json::Array(out)
    }
}

/// Serialises a constant formatted value back into a `format` expression.
pub(crate) fn serialize_formatted(formatted: &Formatted) -> Json {
    let mut out = vec![Json::from("format")];
    for section in &formatted.sections {
        if let Some(image) = &section.image {
            out.push(json!(["image", image.name]));
            continue;
        }
        out.push(Json::from(section.text.as_str()));
        let mut options = Map::new();
        if let Some(font) = &section.font_stack {
            let fonts: Vec<&str> = font.split(',').collect();
            options.insert("text-font".into(), json!(["literal", fonts]));
        }
        if let Some(scale) = section.scale {
            options.insert("font-scale".into(), number_to_json(scale));
        }
        if let Some(color) = &section.text_color {
            let mut rgba = vec![Json::from("rgba")];
            rgba.extend(color.to_array().iter().map(|v| number_to_json(*v)));
            options.insert("text-color".into(), Json::Array(rgba));
        }
        out.push(Json::Object(options));
    }
    Json::Array(out)
}

/// Serialises an implicit text-to-formatted coercion as a one-section
/// `format`.
pub(crate) fn serialize_plain_section(content: &Expression) -> Json {
    Json::Array(vec![
        Json::from("format"),
        content.serialize(),
        Json::Object(Map::new()),
    ])
}
