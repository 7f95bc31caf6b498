use palette::{LinSrgb, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Sequential colour maps
// ---------------------------------------------------------------------------

/// Matplotlib's "inferno", sampled every 0.1.
const INFERNO: [(u8, u8, u8); 11] = [
    (0x00, 0x00, 0x04),
    (0x16, 0x0b, 0x39),
    (0x42, 0x0a, 0x68),
    (0x6a, 0x17, 0x6e),
    (0x93, 0x26, 0x67),
    (0xbc, 0x37, 0x54),
    (0xdd, 0x51, 0x3a),
    (0xf3, 0x78, 0x19),
    (0xfc, 0xa5, 0x0a),
    (0xf6, 0xd7, 0x46),
    (0xfc, 0xff, 0xa4),
];

/// A continuous colour map built from evenly spaced stops, interpolated in
/// linear RGB.
#[derive(Debug, Clone)]
pub struct Colormap {
    stops: Vec<LinSrgb>,
}

impl Colormap {
    pub fn from_stops(stops: &[(u8, u8, u8)]) -> Self {
        let stops = stops
            .iter()
            .map(|&(r, g, b)| Srgb::new(r, g, b).into_format::<f32>().into_linear())
            .collect();
        Colormap { stops }
    }

    pub fn inferno() -> Self {
        Self::from_stops(&INFERNO)
    }

    /// Inferno reversed: pale yellow at 0, near-black at 1.
    pub fn inferno_r() -> Self {
        Self::inferno().reversed()
    }

    pub fn reversed(mut self) -> Self {
        self.stops.reverse();
        self
    }

    /// Colour at `t` in `[0, 1]`; out-of-range values clamp, NaN maps to 0.
    pub fn color_at(&self, t: f64) -> RGBColor {
        let Some(&first) = self.stops.first() else {
            return RGBColor(128, 128, 128);
        };
        let t = if t.is_nan() { 0.0 } else { t.clamp(0.0, 1.0) };

        let segments = self.stops.len() - 1;
        let color = if segments == 0 {
            first
        } else {
            let scaled = t * segments as f64;
            let i = (scaled.floor() as usize).min(segments - 1);
            let frac = (scaled - i as f64) as f32;
            self.stops[i].mix(self.stops[i + 1], frac)
        };

        let rgb: Srgb<u8> = Srgb::<f32>::from_linear(color).into_format();
        RGBColor(rgb.red, rgb.green, rgb.blue)
    }
}

// ---------------------------------------------------------------------------
// Value normalisation
// ---------------------------------------------------------------------------

/// Linear map from a data range onto `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueScale {
    pub min: f64,
    pub max: f64,
}

impl ValueScale {
    /// Range of the finite values, or `None` if there are none.
    pub fn from_values(values: impl IntoIterator<Item = f64>) -> Option<Self> {
        values
            .into_iter()
            .filter(|v| v.is_finite())
            .fold(None, |range, v| match range {
                None => Some(ValueScale { min: v, max: v }),
                Some(r) => Some(ValueScale {
                    min: r.min.min(v),
                    max: r.max.max(v),
                }),
            })
    }

    pub fn normalize(&self, v: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            0.0
        } else {
            (v - self.min) / span
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_hit_the_stops() {
        let cmap = Colormap::inferno();
        assert_eq!(cmap.color_at(0.0), RGBColor(0x00, 0x00, 0x04));
        assert_eq!(cmap.color_at(1.0), RGBColor(0xfc, 0xff, 0xa4));
        assert_eq!(cmap.color_at(0.5), RGBColor(0xbc, 0x37, 0x54));
    }

    #[test]
    fn reversed_map_swaps_ends() {
        let cmap = Colormap::inferno_r();
        assert_eq!(cmap.color_at(0.0), RGBColor(0xfc, 0xff, 0xa4));
        assert_eq!(cmap.color_at(1.0), RGBColor(0x00, 0x00, 0x04));
    }

    #[test]
    fn out_of_range_values_clamp() {
        let cmap = Colormap::inferno();
        assert_eq!(cmap.color_at(-3.0), cmap.color_at(0.0));
        assert_eq!(cmap.color_at(7.0), cmap.color_at(1.0));
        assert_eq!(cmap.color_at(f64::NAN), cmap.color_at(0.0));
    }

    #[test]
    fn value_scale_ignores_non_finite() {
        let scale = ValueScale::from_values([0.8, f64::NAN, 0.2, f64::INFINITY, 1.0]).unwrap();
        assert_eq!(scale, ValueScale { min: 0.2, max: 1.0 });
        assert!((scale.normalize(0.6) - 0.5).abs() < 1e-12);
        assert!(ValueScale::from_values([f64::NAN]).is_none());
    }

    #[test]
    fn degenerate_scale_maps_to_zero() {
        let scale = ValueScale { min: 0.9, max: 0.9 };
        assert_eq!(scale.normalize(0.9), 0.0);
    }
}
