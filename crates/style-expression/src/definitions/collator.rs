use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::{Collator, Value};
use serde_json::{Map, Value as Json};

#[derive(Debug, Clone)]
pub struct CollatorExpression {
    pub ty: Type,
    pub case_sensitive: Box<Expression>,
    pub diacritic_sensitive: Box<Expression>,
    pub locale: Option<Box<Expression>>,
}

impl CollatorExpression {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() != 2 {
            ctx.error("Expected one argument.");
            return None;
        }
        let Json::Object(options) = &args[1] else {
            ctx.error("Collator options argument must be an object.");
            return None;
        };
        let flag = |key: &str| options.get(key).cloned().unwrap_or(Json::Bool(false));
        let case_sensitive = ctx.parse(&flag("case-sensitive"), 1, Some(Type::Boolean))?;
        let diacritic_sensitive = ctx.parse(&flag("diacritic-sensitive"), 1, Some(Type::Boolean))?;
        let locale = match options.get("locale") {
            Some(locale) if super::number_format::is_truthy_json(locale) => {
                Some(Box::new(ctx.parse(locale, 1, Some(Type::String))?))
            }
            _ => None,
        };
        Some(Expression::Collator(CollatorExpression {
            ty: Type::Collator,
            case_sensitive: Box::new(case_sensitive),
            diacritic_sensitive: Box::new(diacritic_sensitive),
            locale,
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let case_sensitive = self.case_sensitive.evaluate(ctx)?.is_truthy();
        let diacritic_sensitive = self.diacritic_sensitive.evaluate(ctx)?.is_truthy();
        let locale = match &self.locale {
            Some(locale) => match locale.evaluate(ctx)? {
                Value::String(s) => Some(s),
                _ => None,
            },
            None => None,
        };
        Ok(Value::Collator(Collator::new(case_sensitive, diacritic_sensitive, locale)))
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.case_sensitive);
        f(&self.diacritic_sensitive);
        if let Some(locale) = &self.locale {
            f(locale);
        }
    }

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        let mut options = Map::new();
        options.insert("case-sensitive".into(), self.case_sensitive.serialize());
        options.insert("diacritic-sensitive".into(), self.diacritic_sensitive.serialize());
        if let Some(locale) = &self.locale {
            options.insert("locale".into(), locale.serialize());
        }
        Json::Array(vec![Json::from("collator"), Json::Object(options)])
    }
}
