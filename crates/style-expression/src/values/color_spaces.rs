//! CIELAB and HCL colour spaces, used by `interpolate-lab` and
//! `interpolate-hcl`.
//!
//! Conversions work on un-premultiplied 0–255 sRGB channels.

use super::Color;

const XN: f64 = 0.950470;
const YN: f64 = 1.0;
const ZN: f64 = 1.088830;
const T0: f64 = 4.0 / 29.0;
const T1: f64 = 6.0 / 29.0;
const T2: f64 = 3.0 * T1 * T1;
const T3: f64 = T1 * T1 * T1;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lab {
    pub l: f64,
    pub a: f64,
    pub b: f64,
    pub alpha: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hcl {
    pub h: f64,
    pub c: f64,
    pub l: f64,
    pub alpha: f64,
}

fn xyz_to_lab(t: f64) -> f64 {
    if t > T3 {
        t.cbrt()
    } else {
        t / T2 + T0
    }
}

fn lab_to_xyz(t: f64) -> f64 {
    if t > T1 {
        t * t * t
    } else {
        T2 * (t - T0)
    }
}

fn xyz_to_rgb(x: f64) -> f64 {
    let v = if x <= 0.0031308 {
        12.92 * x
    } else {
        1.055 * x.powf(1.0 / 2.4) - 0.055
    };
    (255.0 * v).clamp(0.0, 255.0)
}

fn rgb_to_xyz(x: f64) -> f64 {
    let x = x / 255.0;
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

pub fn rgb_to_lab(color: &Color) -> Lab {
    let [r, g, b, alpha] = color.to_array();
    let (r, g, b) = (rgb_to_xyz(r), rgb_to_xyz(g), rgb_to_xyz(b));
    let x = xyz_to_lab((0.4124564 * r + 0.3575761 * g + 0.1804375 * b) / XN);
    let y = xyz_to_lab((0.2126729 * r + 0.7151522 * g + 0.0721750 * b) / YN);
    let z = xyz_to_lab((0.0193339 * r + 0.1191920 * g + 0.9503041 * b) / ZN);
    Lab {
        l: 116.0 * y - 16.0,
        a: 500.0 * (x - y),
        b: 200.0 * (y - z),
        alpha,
    }
}

pub fn lab_to_rgb(lab: &Lab) -> Color {
    let y = (lab.l + 16.0) / 116.0;
    let x = if lab.a.is_nan() { y } else { y + lab.a / 500.0 };
    let z = if lab.b.is_nan() { y } else { y - lab.b / 200.0 };
    let y = YN * lab_to_xyz(y);
    let x = XN * lab_to_xyz(x);
    let z = ZN * lab_to_xyz(z);
    Color::from_rgba(
        xyz_to_rgb(3.2404542 * x - 1.5371385 * y - 0.4985314 * z),
        xyz_to_rgb(-0.9692660 * x + 1.8760108 * y + 0.0415560 * z),
        xyz_to_rgb(0.0556434 * x - 0.2040259 * y + 1.0572252 * z),
        lab.alpha,
    )
}

pub fn rgb_to_hcl(color: &Color) -> Hcl {
    let Lab { l, a, b, alpha } = rgb_to_lab(color);
    let h = b.atan2(a).to_degrees();
    Hcl {
        h: if h < 0.0 { h + 360.0 } else { h },
        c: (a * a + b * b).sqrt(),
        l,
        alpha,
    }
}

pub fn hcl_to_rgb(hcl: &Hcl) -> Color {
    let h = hcl.h.to_radians();
    lab_to_rgb(&Lab {
        l: hcl.l,
        a: h.cos() * hcl.c,
        b: h.sin() * hcl.c,
        alpha: hcl.alpha,
    })
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + t * (b - a)
}

/// Hue interpolation that takes the shorter way around the circle.
fn interpolate_hue(a: f64, b: f64, t: f64) -> f64 {
    let d = b - a;
    let d = if !(-180.0..=180.0).contains(&d) {
        d - 360.0 * (d / 360.0).round()
    } else {
        d
    };
    a + t * d
}

pub fn interpolate_lab(from: &Color, to: &Color, t: f64) -> Color {
    let (from, to) = (rgb_to_lab(from), rgb_to_lab(to));
    lab_to_rgb(&Lab {
        l: lerp(from.l, to.l, t),
        a: lerp(from.a, to.a, t),
        b: lerp(from.b, to.b, t),
        alpha: lerp(from.alpha, to.alpha, t),
    })
}

pub fn interpolate_hcl(from: &Color, to: &Color, t: f64) -> Color {
    let (from, to) = (rgb_to_hcl(from), rgb_to_hcl(to));
    hcl_to_rgb(&Hcl {
        h: interpolate_hue(from.h, to.h, t),
        c: lerp(from.c, to.c, t),
        l: lerp(from.l, to.l, t),
        alpha: lerp(from.alpha, to.alpha, t),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: &Color, b: &Color) -> bool {
        let (a, b) = (a.to_array(), b.to_array());
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 0.5)
    }

    #[test]
    fn test_lab_round_trip() {
        for c in [Color::RED, Color::WHITE, Color::BLUE, Color::from_rgba(12.0, 200.0, 90.0, 0.5)] {
            assert!(close(&lab_to_rgb(&rgb_to_lab(&c)), &c), "{c}");
        }
    }

    #[test]
    fn test_white_is_l100() {
        let lab = rgb_to_lab(&Color::WHITE);
        assert!((lab.l - 100.0).abs() < 0.01);
        assert!(lab.a.abs() < 0.01);
    }

    #[test]
    fn test_hue_short_way() {
        assert_eq!(interpolate_hue(350.0, 10.0, 0.5), 360.0);
        assert_eq!(interpolate_hue(10.0, 30.0, 0.5), 20.0);
    }

    #[test]
    fn test_endpoints() {
        let mid = interpolate_hcl(&Color::RED, &Color::BLUE, 0.0);
        assert!(close(&mid, &Color::RED));
        let end = interpolate_lab(&Color::RED, &Color::BLUE, 1.0);
        assert!(close(&end, &Color::BLUE));
    }
}
