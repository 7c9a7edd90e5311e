//! Modified median cut quantization.
//!
//! Pixels are binned into a 5-bit-per-channel histogram. Boxes of that color
//! space are split at the population median of their longest axis, first by
//! population and then by population times volume, until the requested number
//! of colors is reached or nothing can be split any further.

const SIGBITS: u32 = 5;
const RSHIFT: u32 = 8 - SIGBITS;
const SIDE: usize = 1 << SIGBITS;
const HISTOGRAM_SIZE: usize = 1 << (3 * SIGBITS);
const FRACT_BY_POPULATION: f64 = 0.75;

/// A representative color and the number of sampled pixels it stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Swatch {
    pub rgb: [u8; 3],
    pub population: u32,
}

fn index(r: usize, g: usize, b: usize) -> usize {
    (r << (2 * SIGBITS)) + (g << SIGBITS) + b
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    R,
    G,
    B,
}

#[derive(Debug, Clone)]
struct ColorBox {
    lo: [usize; 3],
    hi: [usize; 3],
    count: u64,
}

impl ColorBox {
    fn volume(&self) -> u64 {
        (0..3).map(|i| (self.hi[i] - self.lo[i] + 1) as u64).product()
    }

    fn count_in(lo: [usize; 3], hi: [usize; 3], histogram: &[u32]) -> u64 {
        let mut count = 0u64;
        for r in lo[0]..=hi[0] {
            for g in lo[1]..=hi[1] {
                for b in lo[2]..=hi[2] {
                    count += histogram[index(r, g, b)] as u64;
                }
            }
        }
        count
    }

    /// Build a box and shrink it to the populated cells inside `lo..=hi`.
    fn new(lo: [usize; 3], hi: [usize; 3], histogram: &[u32]) -> Self {
        let mut min = hi;
        let mut max = lo;
        let mut count = 0u64;
        for r in lo[0]..=hi[0] {
            for g in lo[1]..=hi[1] {
                for b in lo[2]..=hi[2] {
                    let h = histogram[index(r, g, b)];
                    if h == 0 {
                        continue;
                    }
                    count += h as u64;
                    for (c, v) in [r, g, b].into_iter().enumerate() {
                        min[c] = min[c].min(v);
                        max[c] = max[c].max(v);
                    }
                }
            }
        }

        if count == 0 {
            return Self { lo, hi, count };
        }
        Self {
            lo: min,
            hi: max,
            count,
        }
    }

    fn longest_axis(&self) -> (Axis, usize) {
        let widths = [
            self.hi[0] - self.lo[0] + 1,
            self.hi[1] - self.lo[1] + 1,
            self.hi[2] - self.lo[2] + 1,
        ];
        if widths[0] >= widths[1] && widths[0] >= widths[2] {
            (Axis::R, widths[0])
        } else if widths[1] >= widths[2] {
            (Axis::G, widths[1])
        } else {
            (Axis::B, widths[2])
        }
    }

    fn can_split(&self) -> bool {
        self.count > 1 && self.longest_axis().1 > 1
    }

    fn average(&self, histogram: &[u32]) -> [u8; 3] {
        let mult = (1usize << RSHIFT) as f64;
        let mut total = 0f64;
        let mut sums = [0f64; 3];

        for r in self.lo[0]..=self.hi[0] {
            for g in self.lo[1]..=self.hi[1] {
                for b in self.lo[2]..=self.hi[2] {
                    let h = histogram[index(r, g, b)] as f64;
                    if h == 0.0 {
                        continue;
                    }
                    total += h;
                    sums[0] += h * (r as f64 + 0.5) * mult;
                    sums[1] += h * (g as f64 + 0.5) * mult;
                    sums[2] += h * (b as f64 + 0.5) * mult;
                }
            }
        }

        let channel = |i: usize| -> u8 {
            let value = if total > 0.0 {
                sums[i] / total
            } else {
                mult * (self.lo[i] + self.hi[i] + 1) as f64 / 2.0
            };
            value.round().clamp(0.0, 255.0) as u8
        };
        [channel(0), channel(1), channel(2)]
    }

    /// Split at the population median along the longest axis.
    fn split(&self, histogram: &[u32]) -> Option<(ColorBox, ColorBox)> {
        if !self.can_split() {
            return None;
        }

        let (axis, _) = self.longest_axis();
        let a = match axis {
            Axis::R => 0,
            Axis::G => 1,
            Axis::B => 2,
        };
        let (lo, hi) = (self.lo[a], self.hi[a]);

        // partial[i]: pixels in the slab lo..=i along the axis
        let mut partial = vec![0u64; hi - lo + 1];
        let mut running = 0u64;
        for (slot, i) in (lo..=hi).enumerate() {
            let mut slab_lo = self.lo;
            let mut slab_hi = self.hi;
            slab_lo[a] = i;
            slab_hi[a] = i;
            running += Self::count_in(slab_lo, slab_hi, histogram);
            partial[slot] = running;
        }
        let total = running;
        let at = |i: usize| partial[i - lo];

        let median = (lo..=hi).find(|&i| at(i) > total / 2)?;

        // cut further into the larger side, then nudge away from empty halves
        let left = median - lo;
        let right = hi - median;
        let mut cut = if left <= right {
            (median + right / 2).min(hi - 1)
        } else {
            median.saturating_sub(1 + left / 2).max(lo)
        };
        while cut < hi - 1 && at(cut) == 0 {
            cut += 1;
        }
        while cut > lo && total - at(cut) == 0 {
            cut -= 1;
        }

        let mut first_hi = self.hi;
        first_hi[a] = cut;
        let mut second_lo = self.lo;
        second_lo[a] = cut + 1;

        Some((
            ColorBox::new(self.lo, first_hi, histogram),
            ColorBox::new(second_lo, self.hi, histogram),
        ))
    }
}

fn split_until<F>(boxes: &mut Vec<ColorBox>, target: usize, histogram: &[u32], priority: F)
where
    F: Fn(&ColorBox) -> u64,
{
    while boxes.len() < target {
        let candidate = boxes
            .iter()
            .enumerate()
            .filter(|(_, b)| b.can_split())
            .max_by_key(|(_, b)| priority(b))
            .map(|(i, _)| i);

        let Some(i) = candidate else {
            break;
        };
        let Some((first, second)) = boxes[i].split(histogram) else {
            break;
        };
        boxes[i] = first;
        boxes.push(second);
    }
}

/// Quantize `pixels` down to at most `max_colors` swatches, most populous first.
pub fn quantize(pixels: &[[u8; 3]], max_colors: usize) -> Vec<Swatch> {
    if pixels.is_empty() || max_colors == 0 {
        return Vec::new();
    }

    let mut histogram = vec![0u32; HISTOGRAM_SIZE];
    for px in pixels {
        let r = (px[0] >> RSHIFT) as usize;
        let g = (px[1] >> RSHIFT) as usize;
        let b = (px[2] >> RSHIFT) as usize;
        histogram[index(r, g, b)] += 1;
    }

    let mut boxes = vec![ColorBox::new([0; 3], [SIDE - 1; 3], &histogram)];

    let by_population = ((FRACT_BY_POPULATION * max_colors as f64).ceil() as usize).max(1);
    split_until(&mut boxes, by_population, &histogram, |b| b.count);
    split_until(&mut boxes, max_colors, &histogram, |b| {
        b.count.saturating_mul(b.volume())
    });

    let mut swatches: Vec<Swatch> = boxes
        .iter()
        .filter(|b| b.count > 0)
        .map(|b| Swatch {
            rgb: b.average(&histogram),
            population: b.count.min(u32::MAX as u64) as u32,
        })
        .collect();
    swatches.sort_by(|a, b| b.population.cmp(&a.population));
    swatches
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_color_yields_one_swatch() {
        let pixels = vec![[200, 10, 10]; 50];
        let swatches = quantize(&pixels, 16);

        assert_eq!(swatches.len(), 1);
        assert_eq!(swatches[0].population, 50);
        let [r, g, b] = swatches[0].rgb;
        assert!(r >= 196 && g <= 16 && b <= 16);
    }

    #[test]
    fn test_two_clusters_are_separated() {
        let mut pixels = vec![[250, 0, 0]; 30];
        pixels.extend(vec![[0, 0, 250]; 10]);

        let swatches = quantize(&pixels, 8);

        assert_eq!(swatches.len(), 2);
        assert_eq!(swatches[0].population, 30);
        assert!(swatches[0].rgb[0] > 200);
        assert_eq!(swatches[1].population, 10);
        assert!(swatches[1].rgb[2] > 200);
    }

    #[test]
    fn test_never_exceeds_max_colors() {
        let pixels: Vec<[u8; 3]> = (0..=255u8)
            .flat_map(|r| [[r, 255 - r, r / 2], [r / 3, r, 255 - r]])
            .collect();

        let swatches = quantize(&pixels, 10);

        assert!(!swatches.is_empty());
        assert!(swatches.len() <= 10);
        let total: u32 = swatches.iter().map(|s| s.population).sum();
        assert_eq!(total as usize, pixels.len());
    }

    #[test]
    fn test_empty_input() {
        assert!(quantize(&[], 256).is_empty());
    }
}
