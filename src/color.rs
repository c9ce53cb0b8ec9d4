//! ColorBrewer ramps and linear color interpolation.

use clap::ValueEnum;

/// ColorBrewer YlGn 9-class sequential palette, light to dark.
const YLGN_9: [(u8, u8, u8); 9] = [
    (255, 255, 229),
    (247, 252, 185),
    (217, 240, 163),
    (173, 221, 142),
    (120, 198, 121),
    (65, 171, 93),
    (35, 132, 67),
    (0, 104, 55),
    (0, 69, 41),
];

/// ColorBrewer Reds 9-class sequential palette.
const REDS_9: [(u8, u8, u8); 9] = [
    (255, 245, 240),
    (254, 224, 210),
    (252, 187, 161),
    (252, 146, 114),
    (251, 106, 74),
    (239, 59, 44),
    (203, 24, 29),
    (165, 15, 21),
    (103, 0, 13),
];

/// ColorBrewer OrRd 9-class sequential palette.
const ORRD_9: [(u8, u8, u8); 9] = [
    (255, 247, 236),
    (254, 232, 200),
    (253, 212, 158),
    (253, 187, 132),
    (252, 141, 89),
    (239, 101, 72),
    (215, 48, 31),
    (179, 0, 0),
    (127, 0, 0),
];

const GREYS_2: [(u8, u8, u8); 2] = [(240, 240, 240), (0, 0, 0)];

/// A named color ramp. Values are mapped by linear interpolation between the
/// ramp's anchor colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Colormap {
    /// YlGn reversed: high values light, low values dark. The heatmap
    /// default, tuned for positive-only correlations.
    #[default]
    YlGnRev,
    /// Reds, light to dark. The edge-coloring default.
    Reds,
    /// OrRd, light to dark.
    OrRd,
    /// Greyscale, light to dark.
    Greys,
}

impl std::fmt::Display for Colormap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match clap::ValueEnum::to_possible_value(self) {
            Some(v) => write!(f, "{}", v.get_name()),
            None => Ok(()),
        }
    }
}

impl Colormap {
    fn ramp(self) -> &'static [(u8, u8, u8)] {
        match self {
            Colormap::YlGnRev => &YLGN_9,
            Colormap::Reds => &REDS_9,
            Colormap::OrRd => &ORRD_9,
            Colormap::Greys => &GREYS_2,
        }
    }

    /// Map a normalized value in [0,1] to a color. Out-of-range input is
    /// clamped.
    pub fn map(self, t: f64) -> (u8, u8, u8) {
        let t = t.clamp(0.0, 1.0);
        let t = if self == Colormap::YlGnRev { 1.0 - t } else { t };
        let ramp = self.ramp();
        let scaled = t * (ramp.len() - 1) as f64;
        let lo = scaled.floor() as usize;
        let hi = (lo + 1).min(ramp.len() - 1);
        let frac = scaled - lo as f64;

        let (r0, g0, b0) = ramp[lo];
        let (r1, g1, b1) = ramp[hi];
        (
            (r0 as f64 + (r1 as f64 - r0 as f64) * frac).round() as u8,
            (g0 as f64 + (g1 as f64 - g0 as f64) * frac).round() as u8,
            (b0 as f64 + (b1 as f64 - b0 as f64) * frac).round() as u8,
        )
    }
}

/// Color-scale bounds. Values are normalized linearly between `min` and
/// `max` and clamped at both ends.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Limits {
    pub min: f64,
    pub max: f64,
}

impl Limits {
    pub fn new(min: f64, max: f64) -> Self {
        Limits { min, max }
    }

    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span == 0.0 {
            return 0.0;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Limits::new(0.0, 1.0)
    }
}
