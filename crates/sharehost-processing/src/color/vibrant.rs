//! "Vibrant" swatch selection.
//!
//! Swatches are scored on closeness to a target saturation and luma plus
//! relative population. When no swatch falls into the vibrant range, the
//! dark vibrant swatch is lifted to normal luma instead.

use super::palette::Swatch;

const TARGET_NORMAL_LUMA: f64 = 0.5;
const MIN_NORMAL_LUMA: f64 = 0.3;
const MAX_NORMAL_LUMA: f64 = 0.7;
const TARGET_DARK_LUMA: f64 = 0.26;
const MAX_DARK_LUMA: f64 = 0.45;
const TARGET_VIBRANT_SATURATION: f64 = 1.0;
const MIN_VIBRANT_SATURATION: f64 = 0.35;

const WEIGHT_SATURATION: f64 = 3.0;
const WEIGHT_LUMA: f64 = 6.5;
const WEIGHT_POPULATION: f64 = 0.5;

struct Range {
    target_luma: f64,
    min_luma: f64,
    max_luma: f64,
}

const VIBRANT: Range = Range {
    target_luma: TARGET_NORMAL_LUMA,
    min_luma: MIN_NORMAL_LUMA,
    max_luma: MAX_NORMAL_LUMA,
};

const DARK_VIBRANT: Range = Range {
    target_luma: TARGET_DARK_LUMA,
    min_luma: 0.0,
    max_luma: MAX_DARK_LUMA,
};

/// Hue, saturation, lightness, each in `0.0..=1.0`.
pub fn rgb_to_hsl([r, g, b]: [u8; 3]) -> [f64; 3] {
    let r = r as f64 / 255.0;
    let g = g as f64 / 255.0;
    let b = b as f64 / 255.0;
    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        return [0.0, 0.0, l];
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };
    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };
    [h / 6.0, s, l]
}

pub fn hsl_to_rgb([h, s, l]: [f64; 3]) -> [u8; 3] {
    let to_byte = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;

    if s == 0.0 {
        let v = to_byte(l);
        return [v, v, v];
    }

    let hue_to_rgb = |p: f64, q: f64, mut t: f64| {
        if t < 0.0 {
            t += 1.0;
        }
        if t > 1.0 {
            t -= 1.0;
        }
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    let q = if l < 0.5 {
        l * (1.0 + s)
    } else {
        l + s - l * s
    };
    let p = 2.0 * l - q;
    [
        to_byte(hue_to_rgb(p, q, h + 1.0 / 3.0)),
        to_byte(hue_to_rgb(p, q, h)),
        to_byte(hue_to_rgb(p, q, h - 1.0 / 3.0)),
    ]
}

fn invert_diff(value: f64, target: f64) -> f64 {
    1.0 - (value - target).abs()
}

fn score(saturation: f64, luma: f64, population: u32, max_population: u32, range: &Range) -> f64 {
    let population = population as f64 / max_population.max(1) as f64;
    let weighted = invert_diff(saturation, TARGET_VIBRANT_SATURATION) * WEIGHT_SATURATION
        + invert_diff(luma, range.target_luma) * WEIGHT_LUMA
        + population * WEIGHT_POPULATION;
    weighted / (WEIGHT_SATURATION + WEIGHT_LUMA + WEIGHT_POPULATION)
}

fn best_in(swatches: &[Swatch], range: &Range) -> Option<Swatch> {
    let max_population = swatches.iter().map(|s| s.population).max().unwrap_or(0);

    swatches
        .iter()
        .filter_map(|swatch| {
            let [_, s, l] = rgb_to_hsl(swatch.rgb);
            let in_range = s >= MIN_VIBRANT_SATURATION
                && l >= range.min_luma
                && l <= range.max_luma;
            in_range.then(|| (score(s, l, swatch.population, max_population, range), *swatch))
        })
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, swatch)| swatch)
}

/// Pick the vibrant color of a palette, if it has one.
pub fn vibrant(swatches: &[Swatch]) -> Option<[u8; 3]> {
    if let Some(swatch) = best_in(swatches, &VIBRANT) {
        return Some(swatch.rgb);
    }

    best_in(swatches, &DARK_VIBRANT).map(|dark| {
        let [h, s, _] = rgb_to_hsl(dark.rgb);
        hsl_to_rgb([h, s, TARGET_NORMAL_LUMA])
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn swatch(rgb: [u8; 3], population: u32) -> Swatch {
        Swatch { rgb, population }
    }

    #[test]
    fn test_hsl_round_trip_for_primary() {
        let hsl = rgb_to_hsl([255, 0, 0]);
        assert!((hsl[0] - 0.0).abs() < 1e-9);
        assert!((hsl[1] - 1.0).abs() < 1e-9);
        assert!((hsl[2] - 0.5).abs() < 1e-9);
        assert_eq!(hsl_to_rgb(hsl), [255, 0, 0]);
    }

    #[test]
    fn test_prefers_saturated_mid_luma_swatch() {
        let swatches = [
            swatch([128, 128, 128], 1000),
            swatch([230, 30, 30], 10),
            swatch([20, 20, 20], 500),
        ];
        assert_eq!(vibrant(&swatches), Some([230, 30, 30]));
    }

    #[test]
    fn test_falls_back_to_lifted_dark_vibrant() {
        let swatches = [swatch([100, 0, 0], 10), swatch([240, 240, 240], 100)];
        let color = vibrant(&swatches).unwrap();
        let [_, s, l] = rgb_to_hsl(color);
        assert!((l - 0.5).abs() < 0.01);
        assert!(s > 0.9);
    }

    #[test]
    fn test_greyscale_palette_has_no_vibrant() {
        let swatches = [swatch([10, 10, 10], 5), swatch([200, 200, 200], 5)];
        assert_eq!(vibrant(&swatches), None);
    }
}
