use crate::error::RuntimeError;
use crate::eval_ctx::EvaluationContext;
use crate::expression::Expression;
use crate::parsing_context::ParsingContext;
use crate::types::Type;
use crate::values::Value;
use serde_json::{Map, Value as Json};

/// Option values that are absent when falsy, as in `{"min-fraction-digits": 0}`.
pub(crate) fn is_truthy_json(json: &Json) -> bool {
    match json {
        Json::Null => false,
        Json::Bool(b) => *b,
        Json::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Json::String(s) => !s.is_empty(),
        _ => true,
    }
}

/// Locale-aware number formatting, optionally as a currency amount.
#[derive(Debug, Clone)]
pub struct NumberFormat {
    pub ty: Type,
    pub number: Box<Expression>,
    pub locale: Option<Box<Expression>>,
    pub currency: Option<Box<Expression>>,
    pub min_fraction_digits: Option<Box<Expression>>,
    pub max_fraction_digits: Option<Box<Expression>>,
}

impl NumberFormat {
    pub fn parse(args: &[Json], ctx: &mut ParsingContext<'_>) -> Option<Expression> {
        if args.len() != 3 {
            ctx.error("Expected two arguments.");
            return None;
        }
        let number = ctx.parse(&args[1], 1, Some(Type::Number))?;
        let Json::Object(options) = &args[2] else {
            ctx.error("NumberFormat options argument must be an object.");
            return None;
        };

        let mut option = |key: &str, ty: Type| -> Result<Option<Box<Expression>>, ()> {
            match options.get(key) {
                Some(json) if is_truthy_json(json) => match ctx.parse(json, 1, Some(ty)) {
                    Some(e) => Ok(Some(Box::new(e))),
                    None => Err(()),
                },
                _ => Ok(None),
            }
        };
        let locale = option("locale", Type::String).ok()?;
        let currency = option("currency", Type::String).ok()?;
        let min_fraction_digits = option("min-fraction-digits", Type::Number).ok()?;
        let max_fraction_digits = option("max-fraction-digits", Type::Number).ok()?;

        Some(Expression::NumberFormat(NumberFormat {
            ty: Type::String,
            number: Box::new(number),
            locale,
            currency,
            min_fraction_digits,
            max_fraction_digits,
        }))
    }

    pub fn evaluate(&self, ctx: &mut EvaluationContext<'_>) -> Result<Value, RuntimeError> {
        let mut string_option = |e: &Option<Box<Expression>>| -> Result<Option<String>, RuntimeError> {
            Ok(match e {
                Some(e) => Some(e.evaluate(ctx)?.to_string()),
                None => None,
            })
        };
        let locale = string_option(&self.locale)?;
        let currency = string_option(&self.currency)?;
        let mut digits_option = |e: &Option<Box<Expression>>| -> Result<Option<usize>, RuntimeError> {
            Ok(match e {
                Some(e) => Some(e.evaluate(ctx)?.to_number().clamp(0.0, 20.0) as usize),
                None => None,
            })
        };
        let min = digits_option(&self.min_fraction_digits)?;
        let max = digits_option(&self.max_fraction_digits)?;
        let number = self.number.evaluate(ctx)?.to_number();

        let format = NumberFormatOptions {
            locale: locale.as_deref(),
            currency: currency.as_deref(),
            min_fraction_digits: min,
            max_fraction_digits: max,
        };
        Ok(Value::String(format.format(number)))
    }

    pub fn each_child<'s>(&'s self, f: &mut dyn FnMut(&'s Expression)) {
        f(&self.number);
        for option in [
            &self.locale,
            &self.currency,
            &self.min_fraction_digits,
            &self.max_fraction_digits,
        ]
        .into_iter()
        .flatten()
        {
            f(option);
        }
    }

    pub fn output_defined(&self) -> bool {
        false
    }

    pub fn serialize(&self) -> Json {
        let mut options = Map::new();
        for (key, option) in [
            ("locale", &self.locale),
            ("currency", &self.currency),
            ("min-fraction-digits", &self.min_fraction_digits),
            ("max-fraction-digits", &self.max_fraction_digits),
        ] {
            if let Some(e) = option {
                options.insert(key.to_string(), e.serialize());
            }
        }
        Json::Array(vec![
            Json::from("number-format"),
            self.number.serialize(),
            Json::Object(options),
        ])
    }
}

struct NumberFormatOptions<'a> {
    locale: Option<&'a str>,
    currency: Option<&'a str>,
    min_fraction_digits: Option<usize>,
    max_fraction_digits: Option<usize>,
}

/// Grouping and decimal separators for a locale's language.
fn separators(locale: Option<&str>) -> (&'static str, &'static str) {
    let language = locale
        .and_then(|l| l.split(['-', '_']).next())
        .unwrap_or("en")
        .to_ascii_lowercase();
    match language.as_str() {
        "de" | "es" | "it" | "nl" | "pt" | "id" | "tr" => (".", ","),
        "fr" | "ru" | "pl" | "cs" | "sv" | "fi" | "nb" | "uk" => ("\u{a0}", ","),
        _ => (",", "."),
    }
}

fn currency_digits(code: &str) -> usize {
    match code {
        "JPY" | "KRW" | "VND" | "CLP" | "ISK" | "UGX" | "XAF" | "XOF" | "PYG" => 0,
        "BHD" | "KWD" | "OMR" | "JOD" | "TND" | "IQD" | "LYD" => 3,
        _ => 2,
    }
}

fn currency_symbol(code: &str) -> String {
    match code {
        "USD" => "$".to_string(),
        "EUR" => "€".to_string(),
        "GBP" => "£".to_string(),
        "JPY" => "¥".to_string(),
        "CNY" => "CN¥".to_string(),
        "INR" => "₹".to_string(),
        "KRW" => "₩".to_string(),
        "CAD" => "CA$".to_string(),
        "AUD" => "A$".to_string(),
        other => format!("{}\u{a0}", other),
    }
}

fn group_digits(digits: &str, separator: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push_str(separator);
        }
        out.push(c);
    }
    out
}

impl NumberFormatOptions<'_> {
    fn format(&self, number: f64) -> String {
        if number.is_nan() {
            return "NaN".to_string();
        }
        let currency = self.currency.map(str::to_ascii_uppercase);
        let (default_min, default_max) = match &currency {
            Some(code) => (currency_digits(code), currency_digits(code)),
            None => (0, 3),
        };
        let min = self
            .min_fraction_digits
            .unwrap_or_else(|| default_min.min(self.max_fraction_digits.unwrap_or(default_min)));
        let max = self.max_fraction_digits.unwrap_or(default_max).max(min);

        let (group, decimal) = separators(self.locale);
        let body = if number.is_infinite() {
            "∞".to_string()
        } else {
            let scale = 10f64.powi(max as i32);
            let rounded = (number.abs() * scale).round() / scale;
            let fixed = format!("{:.*}", max, rounded);
            let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), ""));
            let mut frac = frac_part.to_string();
            while frac.len() > min && frac.ends_with('0') {
                frac.pop();
            }
            let mut body = group_digits(int_part, group);
            if !frac.is_empty() {
                body.push_str(decimal);
                body.push_str(&frac);
            }
            body
        };

        let sign = if number < 0.0 && body.chars().any(|c| c != '0' && c.is_ascii_digit()) {
            "-"
        } else {
            ""
        };
        match currency {
            Some(code) => format!("{}{}{}", sign, currency_symbol(&code), body),
            None => format!("{}{}", sign, body),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(number: f64, locale: Option<&str>, currency: Option<&str>, min: Option<usize>, max: Option<usize>) -> String {
        NumberFormatOptions {
            locale,
            currency,
            min_fraction_digits: min,
            max_fraction_digits: max,
        }
        .format(number)
    }

    #[test]
    fn test_decimal() {
        assert_eq!(fmt(1234567.891, None, None, None, None), "1,234,567.891");
        assert_eq!(fmt(3.14159, None, None, None, Some(2)), "3.14");
        assert_eq!(fmt(2.0, None, None, Some(2), None), "2.00");
        assert_eq!(fmt(-0.0001, None, None, None, None), "0");
        assert_eq!(fmt(-12.5, None, None, None, Some(0)), "-13");
    }

    #[test]
    fn test_currency() {
        assert_eq!(fmt(1234.5, None, Some("USD"), None, None), "$1,234.50");
        assert_eq!(fmt(-3.0, None, Some("JPY"), None, None), "-¥3");
    }

    #[test]
    fn test_locale_separators() {
        assert_eq!(fmt(1234.5, Some("de-DE"), None, None, None), "1.234,5");
    }
}
