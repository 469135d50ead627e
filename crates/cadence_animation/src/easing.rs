//! Easing functions for animations
//!
//! Every easing maps a linear ratio in `[0, 1]` to an eased ratio. Most
//! curves return exactly 0 and 1 at the endpoints; back and elastic curves
//! overshoot in between.

use std::f64::consts::PI;

/// Easing function type
#[derive(Clone, Copy, Debug, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    /// Simple in/out ease: negative amounts ease in, positive ease out (-1..=1)
    Amount(f64),
    PowIn(f64),
    PowOut(f64),
    PowInOut(f64),
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    SineIn,
    SineOut,
    SineInOut,
    /// Back ease with configurable overshoot
    BackIn(f64),
    BackOut(f64),
    BackInOut(f64),
    CircIn,
    CircOut,
    CircInOut,
    BounceIn,
    BounceOut,
    BounceInOut,
    ElasticIn { amplitude: f64, period: f64 },
    ElasticOut { amplitude: f64, period: f64 },
    ElasticInOut { amplitude: f64, period: f64 },
    CubicBezier(f64, f64, f64, f64),
    /// Arbitrary ratio mapping
    Custom(fn(f64) -> f64),
}

impl Easing {
    pub const BACK_IN: Easing = Easing::BackIn(1.7);
    pub const BACK_OUT: Easing = Easing::BackOut(1.7);
    pub const BACK_IN_OUT: Easing = Easing::BackInOut(1.7);
    pub const ELASTIC_IN: Easing = Easing::ElasticIn {
        amplitude: 1.0,
        period: 0.3,
    };
    pub const ELASTIC_OUT: Easing = Easing::ElasticOut {
        amplitude: 1.0,
        period: 0.3,
    };
    pub const ELASTIC_IN_OUT: Easing = Easing::ElasticInOut {
        amplitude: 1.0,
        period: 0.3 * 1.5,
    };

    /// Apply the easing function to a progress value (0.0 to 1.0)
    pub fn apply(&self, t: f64) -> f64 {
        match *self {
            Easing::Linear => t,
            Easing::EaseIn | Easing::EaseInCubic => pow_in(t, 3.0),
            Easing::EaseOut | Easing::EaseOutCubic => pow_out(t, 3.0),
            Easing::EaseInOut | Easing::EaseInOutCubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
            Easing::Amount(amount) => amount_ease(t, amount),
            Easing::PowIn(pow) => pow_in(t, pow),
            Easing::PowOut(pow) => pow_out(t, pow),
            Easing::PowInOut(pow) => pow_in_out(t, pow),
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::EaseInQuart => t * t * t * t,
            Easing::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Easing::EaseInOutQuart => {
                if t < 0.5 {
                    8.0 * t * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(4) / 2.0
                }
            }
            Easing::EaseInQuint => pow_in(t, 5.0),
            Easing::EaseOutQuint => pow_out(t, 5.0),
            Easing::EaseInOutQuint => pow_in_out(t, 5.0),
            Easing::SineIn => 1.0 - (t * PI / 2.0).cos(),
            Easing::SineOut => (t * PI / 2.0).sin(),
            Easing::SineInOut => -0.5 * ((PI * t).cos() - 1.0),
            Easing::BackIn(amount) => t * t * ((amount + 1.0) * t - amount),
            Easing::BackOut(amount) => {
                let t = t - 1.0;
                t * t * ((amount + 1.0) * t + amount) + 1.0
            }
            Easing::BackInOut(amount) => {
                let amount = amount * 1.525;
                let t = t * 2.0;
                if t < 1.0 {
                    0.5 * (t * t * ((amount + 1.0) * t - amount))
                } else {
                    let t = t - 2.0;
                    0.5 * (t * t * ((amount + 1.0) * t + amount) + 2.0)
                }
            }
            Easing::CircIn => -((1.0 - t * t).sqrt() - 1.0),
            Easing::CircOut => {
                let t = t - 1.0;
                (1.0 - t * t).sqrt()
            }
            Easing::CircInOut => {
                let t = t * 2.0;
                if t < 1.0 {
                    -0.5 * ((1.0 - t * t).sqrt() - 1.0)
                } else {
                    let t = t - 2.0;
                    0.5 * ((1.0 - t * t).sqrt() + 1.0)
                }
            }
            Easing::BounceIn => 1.0 - bounce_out(1.0 - t),
            Easing::BounceOut => bounce_out(t),
            Easing::BounceInOut => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - t * 2.0)) * 0.5
                } else {
                    bounce_out(t * 2.0 - 1.0) * 0.5 + 0.5
                }
            }
            Easing::ElasticIn { amplitude, period } => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let s = elastic_phase(amplitude, period);
                let t = t - 1.0;
                -(amplitude * 2f64.powf(10.0 * t) * ((t - s) * 2.0 * PI / period).sin())
            }
            Easing::ElasticOut { amplitude, period } => {
                if t == 0.0 || t == 1.0 {
                    return t;
                }
                let s = elastic_phase(amplitude, period);
                amplitude * 2f64.powf(-10.0 * t) * ((t - s) * 2.0 * PI / period).sin() + 1.0
            }
            Easing::ElasticInOut { amplitude, period } => {
                let s = elastic_phase(amplitude, period);
                let t = t * 2.0 - 1.0;
                if t < 0.0 {
                    -0.5 * (amplitude * 2f64.powf(10.0 * t) * ((t - s) * 2.0 * PI / period).sin())
                } else {
                    amplitude * 2f64.powf(-10.0 * t) * ((t - s) * 2.0 * PI / period).sin() * 0.5
                        + 1.0
                }
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier_ease(t, x1, y1, x2, y2),
            Easing::Custom(f) => f(t),
        }
    }
}

fn amount_ease(t: f64, amount: f64) -> f64 {
    let amount = amount.clamp(-1.0, 1.0);
    if amount == 0.0 {
        t
    } else if amount < 0.0 {
        t * (t * -amount + 1.0 + amount)
    } else {
        t * ((2.0 - t) * amount + (1.0 - amount))
    }
}

#[inline]
fn pow_in(t: f64, pow: f64) -> f64 {
    t.powf(pow)
}

#[inline]
fn pow_out(t: f64, pow: f64) -> f64 {
    1.0 - (1.0 - t).powf(pow)
}

fn pow_in_out(t: f64, pow: f64) -> f64 {
    let t = t * 2.0;
    if t < 1.0 {
        0.5 * t.powf(pow)
    } else {
        1.0 - 0.5 * (2.0 - t).powf(pow).abs()
    }
}

fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        let t = t - 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        let t = t - 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        let t = t - 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}

#[inline]
fn elastic_phase(amplitude: f64, period: f64) -> f64 {
    period / (2.0 * PI) * (1.0 / amplitude).asin()
}

/// Cubic bezier easing calculation (matches CSS spec / browser implementations).
///
/// Uses Newton-Raphson with binary-search fallback for robustness.
fn cubic_bezier_ease(t: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    // Endpoints are always exact
    if t <= 0.0 {
        return 0.0;
    }
    if t >= 1.0 {
        return 1.0;
    }

    // Solve for parameter `p` where bezier_x(p) == t using Newton-Raphson,
    // falling back to binary search if the slope is too flat.
    let mut p = t;
    for _ in 0..8 {
        let err = bezier_sample(p, x1, x2) - t;
        if err.abs() < 1e-7 {
            return bezier_sample(p, y1, y2);
        }
        let slope = bezier_slope(p, x1, x2);
        if slope.abs() < 1e-7 {
            break;
        }
        p -= err / slope;
    }

    let mut lo = 0.0_f64;
    let mut hi = 1.0_f64;
    p = t;
    for _ in 0..20 {
        let val = bezier_sample(p, x1, x2);
        if (val - t).abs() < 1e-7 {
            break;
        }
        if val < t {
            lo = p;
        } else {
            hi = p;
        }
        p = (lo + hi) * 0.5;
    }

    bezier_sample(p, y1, y2)
}

/// Evaluate cubic bezier at parameter t: B(t) = 3(1-t)²t·p1 + 3(1-t)t²·p2 + t³
#[inline]
fn bezier_sample(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    ((a * t + b) * t + c) * t
}

/// Derivative of cubic bezier: B'(t) = 3(1-t)²·p1 + 6(1-t)t·(p2-p1) + 3t²·(1-p2)
#[inline]
fn bezier_slope(t: f64, p1: f64, p2: f64) -> f64 {
    let a = 1.0 - 3.0 * p2 + 3.0 * p1;
    let b = 3.0 * p2 - 6.0 * p1;
    let c = 3.0 * p1;
    (3.0 * a * t + 2.0 * b) * t + c
}
