//! Numeric helpers shared by the interpolation nodes, the runtime values and
//! the legacy converters.

use crate::error::RuntimeError;

// ----------------------------------------------------------------- Formatting

/// Formats a number the way `String(n)` does in a browser: no trailing `.0`,
/// exponent notation outside `[1e-6, 1e21)`, and `NaN`/`Infinity` spelled out.
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }
    let abs = n.abs();
    if !(1e-6..1e21).contains(&abs) {
        let s = format!("{:e}", n);
        return match s.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => s,
        };
    }
    format!("{}", n)
}

// ----------------------------------------------------------------- Interpolation

pub fn interpolate_number(from: f64, to: f64, t: f64) -> f64 {
    from + t * (to - from)
}

pub fn interpolate_array(from: &[f64], to: &[f64], t: f64) -> Vec<f64> {
    from.iter()
        .zip(to.iter())
        .map(|(a, b)| interpolate_number(*a, *b, t))
        .collect()
}

/// Progress of `input` between two stops for an exponential curve of the
/// given base. A base of 1 is linear.
pub fn exponential_interpolation(input: f64, base: f64, lower: f64, upper: f64) -> f64 {
    let difference = upper - lower;
    let progress = input - lower;
    if difference == 0.0 {
        0.0
    } else if base == 1.0 {
        progress / difference
    } else {
        (base.powf(progress) - 1.0) / (base.powf(difference) - 1.0)
    }
}

/// Index of the last stop `<= input`, or 0 when `input` precedes every stop.
pub fn find_stop_less_than_or_equal_to(stops: &[f64], input: f64) -> Result<usize, RuntimeError> {
    if stops.is_empty() {
        return Ok(0);
    }
    let last = stops.len() - 1;
    let mut lower: isize = 0;
    let mut upper: isize = last as isize;
    while lower <= upper {
        let current = ((lower + upper) / 2) as usize;
        let value = stops[current];
        if value <= input {
            if current == last || input < stops[current + 1] {
                return Ok(current);
            }
            lower = current as isize + 1;
        } else if value > input {
            upper = current as isize - 1;
        } else {
            return Err(RuntimeError::InputNotNumber);
        }
    }
    Ok(0)
}

/// Cubic bezier easing through `(0,0)`, `(x1,y1)`, `(x2,y2)`, `(1,1)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitBezier {
    ax: f64,
    bx: f64,
    cx: f64,
    ay: f64,
    by: f64,
    cy: f64,
}

impl UnitBezier {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        let cx = 3.0 * x1;
        let bx = 3.0 * (x2 - x1) - cx;
        let cy = 3.0 * y1;
        let by = 3.0 * (y2 - y1) - cy;
        UnitBezier {
            ax: 1.0 - cx - bx,
            bx,
            cx,
            ay: 1.0 - cy - by,
            by,
            cy,
        }
    }

    fn sample_x(&self, t: f64) -> f64 {
        ((self.ax * t + self.bx) * t + self.cx) * t
    }

    fn sample_y(&self, t: f64) -> f64 {
        ((self.ay * t + self.by) * t + self.cy) * t
    }

    fn sample_derivative_x(&self, t: f64) -> f64 {
        (3.0 * self.ax * t + 2.0 * self.bx) * t + self.cx
    }

    fn solve_x(&self, x: f64, epsilon: f64) -> f64 {
        if x < 0.0 {
            return 0.0;
        }
        if x > 1.0 {
            return 1.0;
        }
        // Newton first, bisection if the slope flattens out.
        let mut t = x;
        for _ in 0..8 {
            let x2 = self.sample_x(t) - x;
            if x2.abs() < epsilon {
                return t;
            }
            let d2 = self.sample_derivative_x(t);
            if d2.abs() < 1e-6 {
                break;
            }
            t -= x2 / d2;
        }
        let (mut t0, mut t1) = (0.0, 1.0);
        t = x;
        for _ in 0..20 {
            let x2 = self.sample_x(t);
            if (x2 - x).abs() < epsilon {
                break;
            }
            if x > x2 {
                t0 = t;
            } else {
                t1 = t;
            }
            t = (t1 - t0) * 0.5 + t0;
        }
        t
    }

    pub fn solve(&self, x: f64) -> f64 {
        self.sample_y(self.solve_x(x, 1e-6))
    }
}

// ----------------------------------------------------------------- Slicing

/// Resolves JavaScript `slice(begin, end)` arguments against a length.
pub fn slice_bounds(len: usize, begin: f64, end: Option<f64>) -> (usize, usize) {
    let resolve = |i: f64| -> usize {
        let i = i.trunc();
        if i < 0.0 {
            (len as f64 + i).max(0.0) as usize
        } else {
            (i as usize).min(len)
        }
    };
    let start = resolve(begin);
    let stop = end.map(resolve).unwrap_or(len);
    (start, stop.max(start))
}
