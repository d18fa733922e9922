//! RGBA colours and CSS colour string parsing.

use crate::util::number_to_string;
use crate::values::Value;
use std::fmt;

/// An RGBA colour with premultiplied components in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    pub a: f64,
}

impl Color {
    pub const BLACK: Color = Color::new(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::new(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::new(0.0, 0.0, 0.0, 0.0);
    pub const RED: Color = Color::new(1.0, 0.0, 0.0, 1.0);
    pub const BLUE: Color = Color::new(0.0, 0.0, 1.0, 1.0);

    /// Builds a colour from already-premultiplied components.
    pub const fn new(r: f64, g: f64, b: f64, a: f64) -> Self {
        Color { r, g, b, a }
    }

    /// Builds a colour from 0–255 channels and an alpha in `[0, 1]`.
    pub fn from_rgba(r: f64, g: f64, b: f64, a: f64) -> Self {
        Color::new(r / 255.0 * a, g / 255.0 * a, b / 255.0 * a, a)
    }

    /// Parses a CSS colour string such as `#f0c`, `rgba(0, 0, 0, 0.5)`,
    /// `hsl(120, 50%, 50%)` or `steelblue`.
    pub fn parse(input: &str) -> Option<Color> {
        let [r, g, b, a] = parse_css_color(input)?;
        Some(Color::from_rgba(r, g, b, a))
    }

    /// Un-premultiplied `[r, g, b, a]` with 0–255 channels.
    pub fn to_array(&self) -> [f64; 4] {
        if self.a == 0.0 {
            return [0.0, 0.0, 0.0, 0.0];
        }
        [
            self.r * 255.0 / self.a,
            self.g * 255.0 / self.a,
            self.b * 255.0 / self.a,
            self.a,
        ]
    }

    pub fn interpolate(from: &Color, to: &Color, t: f64) -> Color {
        Color::new(
            lerp(from.r, to.r, t),
            lerp(from.g, to.g, t),
            lerp(from.b, to.b, t),
            lerp(from.a, to.a, t),
        )
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a * (1.0 - t) + b * t
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [r, g, b, a] = self.to_array();
        write!(
            f,
            "rgba({},{},{},{})",
            r.round(),
            g.round(),
            b.round(),
            number_to_string(a)
        )
    }
}

/// Checks 0–255 colour channels and an optional alpha in `[0, 1]`, returning
/// a message naming the offending value.
pub fn validate_rgba(r: &Value, g: &Value, b: &Value, a: Option<&Value>) -> Option<String> {
    let channel_ok = |v: &Value| v.as_f64().is_some_and(|n| (0.0..=255.0).contains(&n));
    let join = |vals: &[&Value]| {
        vals.iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    if !(channel_ok(r) && channel_ok(g) && channel_ok(b)) {
        let shown = match a {
            Some(a) if matches!(a, Value::Number(_)) => join(&[r, g, b, a]),
            _ => join(&[r, g, b]),
        };
        return Some(format!(
            "Invalid rgba value [{}]: 'r', 'g', and 'b' must be between 0 and 255.",
            shown
        ));
    }
    if let Some(a) = a {
        if !a.as_f64().is_some_and(|n| (0.0..=1.0).contains(&n)) {
            return Some(format!(
                "Invalid rgba value [{}]: 'a' must be between 0 and 1.",
                join(&[r, g, b, a])
            ));
        }
    }
    None
}

fn clamp_byte(v: f64) -> f64 {
    v.round().clamp(0.0, 255.0)
}

fn clamp_unit(v: f64) -> f64 {
    v.clamp(0.0, 1.0)
}

fn parse_int_channel(s: &str) -> Option<f64> {
    match s.strip_suffix('%') {
        Some(pct) => Some(clamp_byte(pct.parse::<f64>().ok()? / 100.0 * 255.0)),
        None => Some(clamp_byte(s.parse::<f64>().ok()?.trunc())),
    }
}

fn parse_float_channel(s: &str) -> Option<f64> {
    match s.strip_suffix('%') {
        Some(pct) => Some(clamp_unit(pct.parse::<f64>().ok()? / 100.0)),
        None => Some(clamp_unit(s.parse::<f64>().ok()?)),
    }
}

fn hue_to_rgb(m1: f64, m2: f64, mut h: f64) -> f64 {
    if h < 0.0 {
        h += 1.0;
    } else if h > 1.0 {
        h -= 1.0;
    }
    if h * 6.0 < 1.0 {
        return m1 + (m2 - m1) * h * 6.0;
    }
    if h * 2.0 < 1.0 {
        return m2;
    }
    if h * 3.0 < 2.0 {
        return m1 + (m2 - m1) * (2.0 / 3.0 - h) * 6.0;
    }
    m1
}

fn parse_hex(hex: &str) -> Option<[f64; 4]> {
    if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let nibble = |i: usize| u8::from_str_radix(&hex[i..i + 1], 16).ok().map(|v| f64::from(v * 17));
    let byte = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok().map(f64::from);
    match hex.len() {
        3 => Some([nibble(0)?, nibble(1)?, nibble(2)?, 1.0]),
        4 => Some([nibble(0)?, nibble(1)?, nibble(2)?, nibble(3)? / 255.0]),
        6 => Some([byte(0)?, byte(2)?, byte(4)?, 1.0]),
        8 => Some([byte(0)?, byte(2)?, byte(4)?, byte(6)? / 255.0]),
        _ => None,
    }
}

/// Returns `[r, g, b, a]` with 0–255 channels and alpha in `[0, 1]`.
pub fn parse_css_color(input: &str) -> Option<[f64; 4]> {
    let s: String = input
        .chars()
        .filter(|c| *c != ' ')
        .collect::<String>()
        .to_lowercase();

    if let Some(rgb) = named_color(&s) {
        return Some(rgb);
    }
    if let Some(hex) = s.strip_prefix('#') {
        return parse_hex(hex);
    }

    let open = s.find('(')?;
    let body = s.strip_suffix(')')?;
    let name = &s[..open];
    let mut params: Vec<&str> = body[open + 1..].split(',').collect();

    let mut alpha = 1.0;
    match name {
        "rgba" | "hsla" => {
            if params.len() != 4 {
                return None;
            }
            alpha = parse_float_channel(params.pop()?)?;
        }
        "rgb" | "hsl" => {
            if params.len() != 3 {
                return None;
            }
        }
        _ => return None,
    }

    if name.starts_with("rgb") {
        return Some([
            parse_int_channel(params[0])?,
            parse_int_channel(params[1])?,
            parse_int_channel(params[2])?,
            alpha,
        ]);
    }

    let h = ((params[0].parse::<f64>().ok()? % 360.0) + 360.0) % 360.0 / 360.0;
    let sat = parse_float_channel(params[1])?;
    let l = parse_float_channel(params[2])?;
    let m2 = if l <= 0.5 { l * (sat + 1.0) } else { l + sat - l * sat };
    let m1 = l * 2.0 - m2;
    Some([
        clamp_byte(hue_to_rgb(m1, m2, h + 1.0 / 3.0) * 255.0),
        clamp_byte(hue_to_rgb(m1, m2, h) * 255.0),
        clamp_byte(hue_to_rgb(m1, m2, h - 1.0 / 3.0) * 255.0),
        alpha,
    ])
}

fn named_color(name: &str) -> Option<[f64; 4]> {
    if name == "transparent" {
        return Some([0.0, 0.0, 0.0, 0.0]);
    }
    NAMED_COLORS
        .binary_search_by(|(n, _)| n.cmp(&name))
        .ok()
        .map(|i| {
            let [r, g, b] = NAMED_COLORS[i].1;
            [f64::from(r), f64::from(g), f64::from(b), 1.0]
        })
}

// Sorted by name for binary search.
static NAMED_COLORS: &[(&str, [u8; 3])] = &[
    ("aliceblue", [240, 248, 255]),
    ("antiquewhite", [250, 235, 215]),
    ("aqua", [0, 255, 255]),
    ("aquamarine", [127, 255, 212]),
    ("azure", [240, 255, 255]),
    ("beige", [245, 245, 220]),
    ("bisque", [255, 228, 196]),
    ("black", [0, 0, 0]),
    ("blanchedalmond", [255, 235, 205]),
    ("blue", [0, 0, 255]),
    ("blueviolet", [138, 43, 226]),
    ("brown", [165, 42, 42]),
    ("burlywood", [222, 184, 135]),
    ("cadetblue", [95, 158, 160]),
    ("chartreuse", [127, 255, 0]),
    ("chocolate", [210, 105, 30]),
    ("coral", [255, 127, 80]),
    ("cornflowerblue", [100, 149, 237]),
    ("cornsilk", [255, 248, 220]),
    ("crimson", [220, 20, 60]),
    ("cyan", [0, 255, 255]),
    ("darkblue", [0, 0, 139]),
    ("darkcyan", [0, 139, 139]),
    ("darkgoldenrod", [184, 134, 11]),
    ("darkgray", [169, 169, 169]),
    ("darkgreen", [0, 100, 0]),
    ("darkgrey", [169, 169, 169]),
    ("darkkhaki", [189, 183, 107]),
    ("darkmagenta", [139, 0, 139]),
    ("darkolivegreen", [85, 107, 47]),
    ("darkorange", [255, 140, 0]),
    ("darkorchid", [153, 50, 204]),
    ("darkred", [139, 0, 0]),
    ("darksalmon", [233, 150, 122]),
    ("darkseagreen", [143, 188, 143]),
    ("darkslateblue", [72, 61, 139]),
    ("darkslategray", [47, 79, 79]),
    ("darkslategrey", [47, 79, 79]),
    ("darkturquoise", [0, 206, 209]),
    ("darkviolet", [148, 0, 211]),
    ("deeppink", [255, 20, 147]),
    ("deepskyblue", [0, 191, 255]),
    ("dimgray", [105, 105, 105]),
    ("dimgrey", [105, 105, 105]),
    ("dodgerblue", [30, 144, 255]),
    ("firebrick", [178, 34, 34]),
    ("floralwhite", [255, 250, 240]),
    ("forestgreen", [34, 139, 34]),
    ("fuchsia", [255, 0, 255]),
    ("gainsboro", [220, 220, 220]),
    ("ghostwhite", [248, 248, 255]),
    ("gold", [255, 215, 0]),
    ("goldenrod", [218, 165, 32]),
    ("gray", [128, 128, 128]),
    ("green", [0, 128, 0]),
    ("greenyellow", [173, 255, 47]),
    ("grey", [128, 128, 128]),
    ("honeydew", [240, 255, 240]),
    ("hotpink", [255, 105, 180]),
    ("indianred", [205, 92, 92]),
    ("indigo", [75, 0, 130]),
    ("ivory", [255, 255, 240]),
    ("khaki", [240, 230, 140]),
    ("lavender", [230, 230, 250]),
    ("lavenderblush", [255, 240, 245]),
    ("lawngreen", [124, 252, 0]),
    ("lemonchiffon", [255, 250, 205]),
    ("lightblue", [173, 216, 230]),
    ("lightcoral", [240, 128, 128]),
    ("lightcyan", [224, 255, 255]),
    ("lightgoldenrodyellow", [250, 250, 210]),
    ("lightgray", [211, 211, 211]),
    ("lightgreen", [144, 238, 144]),
    ("lightgrey", [211, 211, 211]),
    ("lightpink", [255, 182, 193]),
    ("lightsalmon", [255, 160, 122]),
    ("lightseagreen", [32, 178, 170]),
    ("lightskyblue", [135, 206, 250]),
    ("lightslategray", [119, 136, 153]),
    ("lightslategrey", [119, 136, 153]),
    ("lightsteelblue", [176, 196, 222]),
    ("lightyellow", [255, 255, 224]),
    ("lime", [0, 255, 0]),
    ("limegreen", [50, 205, 50]),
    ("linen", [250, 240, 230]),
    ("magenta", [255, 0, 255]),
    ("maroon", [128, 0, 0]),
    ("mediumaquamarine", [102, 205, 170]),
    ("mediumblue", [0, 0, 205]),
    ("mediumorchid", [186, 85, 211]),
    ("mediumpurple", [147, 112, 219]),
    ("mediumseagreen", [60, 179, 113]),
    ("mediumslateblue", [123, 104, 238]),
    ("mediumspringgreen", [0, 250, 154]),
    ("mediumturquoise", [72, 209, 204]),
    ("mediumvioletred", [199, 21, 133]),
    ("midnightblue", [25, 25, 112]),
    ("mintcream", [245, 255, 250]),
    ("mistyrose", [255, 228, 225]),
    ("moccasin", [255, 228, 181]),
    ("navajowhite", [255, 222, 173]),
    ("navy", [0, 0, 128]),
    ("oldlace", [253, 245, 230]),
    ("olive", [128, 128, 0]),
    ("olivedrab", [107, 142, 35]),
    ("orange", [255, 165, 0]),
    ("orangered", [255, 69, 0]),
    ("orchid", [218, 112, 214]),
    ("palegoldenrod", [238, 232, 170]),
    ("palegreen", [152, 251, 152]),
    ("paleturquoise", [175, 238, 238]),
    ("palevioletred", [219, 112, 147]),
    ("papayawhip", [255, 239, 213]),
    ("peachpuff", [255, 218, 185]),
    ("peru", [205, 133, 63]),
    ("pink", [255, 192, 203]),
    ("plum", [221, 160, 221]),
    ("powderblue", [176, 224, 230]),
    ("purple", [128, 0, 128]),
    ("rebeccapurple", [102, 51, 153]),
    ("red", [255, 0, 0]),
    ("rosybrown", [188, 143, 143]),
    ("royalblue", [65, 105, 225]),
    ("saddlebrown", [139, 69, 19]),
    ("salmon", [250, 128, 114]),
    ("sandybrown", [244, 164, 96]),
    ("seagreen", [46, 139, 87]),
    ("seashell", [255, 245, 238]),
    ("sienna", [160, 82, 45]),
    ("silver", [192, 192, 192]),
    ("skyblue", [135, 206, 235]),
    ("slateblue", [106, 90, 205]),
    ("slategray", [112, 128, 144]),
    ("slategrey", [112, 128, 144]),
    ("snow", [255, 250, 250]),
    ("springgreen", [0, 255, 127]),
    ("steelblue", [70, 130, 180]),
    ("tan", [210, 180, 140]),
    ("teal", [0, 128, 128]),
    ("thistle", [216, 191, 216]),
    ("tomato", [255, 99, 71]),
    ("turquoise", [64, 224, 208]),
    ("violet", [238, 130, 238]),
    ("wheat", [245, 222, 179]),
    ("white", [255, 255, 255]),
    ("whitesmoke", [245, 245, 245]),
    ("yellow", [255, 255, 0]),
    ("yellowgreen", [154, 205, 50]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_table_is_sorted() {
        assert!(NAMED_COLORS.windows(2).all(|w| w[0].0 < w[1].0));
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(Color::parse("red"), Some(Color::RED));
        assert_eq!(Color::parse("#00f"), Some(Color::BLUE));
        assert_eq!(Color::parse("#ffffff"), Some(Color::WHITE));
        assert_eq!(Color::parse("rgb(255, 0, 0)"), Some(Color::RED));
        assert_eq!(Color::parse("hsl(0, 100%, 50%)"), Some(Color::RED));
        assert_eq!(Color::parse("transparent"), Some(Color::TRANSPARENT));
        let half = Color::parse("rgba(255, 255, 255, 0.5)").unwrap();
        assert_eq!(half, Color::new(0.5, 0.5, 0.5, 0.5));
        assert_eq!(Color::parse("not-a-color"), None);
        assert_eq!(Color::parse("#12345"), None);
        assert_eq!(Color::parse("rgb(1, 2)"), None);
    }

    #[test]
    fn test_validate_rgba() {
        let n = |v: f64| Value::Number(v);
        assert_eq!(validate_rgba(&n(0.0), &n(255.0), &n(10.0), Some(&n(1.0))), None);
        assert_eq!(
            validate_rgba(&n(300.0), &n(0.0), &n(0.0), None).as_deref(),
            Some("Invalid rgba value [300, 0, 0]: 'r', 'g', and 'b' must be between 0 and 255.")
        );
        assert_eq!(
            validate_rgba(&n(0.0), &n(0.0), &n(0.0), Some(&n(2.0))).as_deref(),
            Some("Invalid rgba value [0, 0, 0, 2]: 'a' must be between 0 and 1.")
        );
    }

    #[test]
    fn test_display_unpremultiplies() {
        assert_eq!(Color::new(0.5, 0.0, 0.0, 0.5).to_string(), "rgba(255,0,0,0.5)");
        assert_eq!(Color::TRANSPARENT.to_string(), "rgba(0,0,0,0)");
    }
}
