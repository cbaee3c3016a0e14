//! Deterministic colors for label-map previews.
//!
//! Two generators are provided, both plain iterators with their own state:
//! [`GoldenRatioPalette`] spreads hues by golden-ratio steps, and
//! [`CyclingPalette`] reproduces the stepped hue/saturation/lightness cycle
//! of earlier preview tools.

use std::collections::HashMap;

use image::{Rgb, RgbImage};

use super::buffers::LabelMap;

const GOLDEN_RATIO_CONJUGATE: f64 = 0.618_033_988_75;
const GOLDEN_SATURATIONS: [f64; 2] = [0.65, 0.9];
const GOLDEN_LIGHTNESSES: [f64; 3] = [0.5, 0.65, 0.35];

/// Golden-ratio hue stepping with short saturation and lightness cycles.
///
/// Color `k` has hue `k * 0.618... mod 1`, saturation alternating every
/// step and lightness cycling through three values.
#[derive(Clone, Debug, Default)]
pub struct GoldenRatioPalette {
    index: u64,
}

impl GoldenRatioPalette {
    pub fn new() -> Self {
        Self::default()
    }

    /// The `k`-th color, independent of iterator state.
    pub fn color_at(k: u64) -> [u8; 3] {
        let hue = (k as f64 * GOLDEN_RATIO_CONJUGATE).rem_euclid(1.0);
        let saturation = GOLDEN_SATURATIONS[(k % 2) as usize];
        let lightness = GOLDEN_LIGHTNESSES[(k % 3) as usize];
        to_rgb8(hls_to_rgb(hue, lightness, saturation))
    }
}

impl Iterator for GoldenRatioPalette {
    type Item = [u8; 3];

    fn next(&mut self) -> Option<Self::Item> {
        let color = Self::color_at(self.index);
        self.index += 1;
        Some(color)
    }
}

/// The stepped hue/saturation/lightness generator.
///
/// Each color advances one parameter in turn: lightness, then saturation,
/// then hue.
#[derive(Clone, Debug)]
pub struct CyclingPalette {
    hue: f64,
    saturation: f64,
    lightness: f64,
    step: u64,
}

impl CyclingPalette {
    pub fn new(hue: f64, saturation: f64, lightness: f64) -> Self {
        Self {
            hue,
            saturation,
            lightness,
            step: 0,
        }
    }

    fn advance(&mut self) {
        match self.step % 3 {
            0 => self.lightness = (self.lightness + 0.07).rem_euclid(0.5) + 0.07,
            1 => self.saturation = (self.saturation + 0.14).rem_euclid(1.0),
            _ => self.hue = (self.hue + 0.04).rem_euclid(1.0),
        }
        self.step += 1;
    }
}

impl Default for CyclingPalette {
    fn default() -> Self {
        Self::new(0.0, 0.0, 0.07)
    }
}

impl Iterator for CyclingPalette {
    type Item = [u8; 3];

    fn next(&mut self) -> Option<Self::Item> {
        let color = to_rgb8(hls_to_rgb(self.hue, self.lightness, self.saturation));
        self.advance();
        Some(color)
    }
}

/// The first `n` golden-ratio colors.
pub fn generate_colors(n: usize) -> Vec<[u8; 3]> {
    GoldenRatioPalette::new().take(n).collect()
}

/// Colors a label map with [`GoldenRatioPalette`]; label 0 is black.
///
/// Label `k` gets color `k - 1`. Colors are computed per distinct label, so
/// sparse keys from [`label_with_keys`](super::label_with_keys) cost no
/// more than dense ones.
pub fn colors_for(labels: &LabelMap) -> RgbImage {
    let mut image = RgbImage::new(labels.width(), labels.height());
    let mut cache: HashMap<u32, [u8; 3]> = HashMap::new();
    for (pixel, &label) in image.pixels_mut().zip(labels.as_slice()) {
        if label == 0 {
            continue;
        }
        let color = *cache
            .entry(label)
            .or_insert_with(|| GoldenRatioPalette::color_at(u64::from(label - 1)));
        *pixel = Rgb(color);
    }
    image
}

/// Colors a label map with any palette; label `k` gets the `k`-th color.
///
/// Stateful palettes such as [`CyclingPalette`] only know color `k` after
/// drawing the ones before it, so this draws `max_label` colors. Prefer
/// [`colors_for`] for sparse label spaces. An all-background map yields a
/// black image without drawing from the palette.
pub fn colors_for_with<P>(labels: &LabelMap, palette: P) -> RgbImage
where
    P: IntoIterator<Item = [u8; 3]>,
{
    let mut image = RgbImage::new(labels.width(), labels.height());
    let max_label = labels.max_label();
    if max_label == 0 {
        return image;
    }

    let mut colors = Vec::with_capacity(max_label as usize + 1);
    colors.push([0, 0, 0]);
    colors.extend(palette.into_iter().take(max_label as usize));
    // A short palette leaves the remaining labels black.
    colors.resize(max_label as usize + 1, [0, 0, 0]);

    for (pixel, &label) in image.pixels_mut().zip(labels.as_slice()) {
        *pixel = Rgb(colors[label as usize]);
    }
    image
}

/// HLS → RGB with the conventional piecewise hue ramp.
fn hls_to_rgb(h: f64, l: f64, s: f64) -> [f64; 3] {
    if s == 0.0 {
        return [l, l, l];
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    [
        hue_channel(m1, m2, h + 1.0 / 3.0),
        hue_channel(m1, m2, h),
        hue_channel(m1, m2, h - 1.0 / 3.0),
    ]
}

fn hue_channel(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

fn to_rgb8(rgb: [f64; 3]) -> [u8; 3] {
    rgb.map(|c| ((c as f32) * 255.0).clamp(0.0, 255.0) as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_zero_colors() {
        assert!(generate_colors(0).is_empty());
    }

    #[test]
    fn test_generate_is_deterministic() {
        assert_eq!(generate_colors(16), generate_colors(16));
        assert_eq!(generate_colors(8)[..4], generate_colors(4)[..]);
    }

    #[test]
    fn test_first_golden_color_is_red() {
        // hue 0, saturation 0.65, lightness 0.5
        let color = GoldenRatioPalette::color_at(0);
        assert_eq!(color[0], 210);
        assert_eq!(color[1], 44);
        assert_eq!(color[2], 44);
    }

    #[test]
    fn test_adjacent_colors_differ() {
        let colors = generate_colors(32);
        for pair in colors.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
    }

    #[test]
    fn test_cycling_palette_sequence() {
        let mut palette = CyclingPalette::default();
        // hue 0, saturation 0, lightness 0.07 → gray
        assert_eq!(palette.next(), Some([17, 17, 17]));
        // lightness advanced to 0.21, still no saturation
        assert_eq!(palette.next(), Some([53, 53, 53]));
        // saturation 0.14 now
        let third = palette.next().expect("color");
        assert_ne!(third[0], third[1]);
    }

    #[test]
    fn test_hls_gray_and_primary() {
        assert_eq!(hls_to_rgb(0.3, 0.25, 0.0), [0.25, 0.25, 0.25]);
        let red = hls_to_rgb(0.0, 0.5, 1.0);
        assert_eq!(to_rgb8(red), [255, 0, 0]);
        let green = hls_to_rgb(1.0 / 3.0, 0.5, 1.0);
        assert_eq!(to_rgb8(green), [0, 255, 0]);
    }

    #[test]
    fn test_background_only_is_black() {
        let labels = LabelMap::zeros(2, 3);
        let image = colors_for_with(&labels, std::iter::from_fn(|| -> Option<[u8; 3]> {
            panic!("palette must not be consulted")
        }));
        assert_eq!(image.dimensions(), (3, 2));
        assert!(image.pixels().all(|p| p.0 == [0, 0, 0]));
    }

    #[test]
    fn test_sparse_high_labels_are_cheap() {
        let full = crate::matte::Mask::filled(1, 2, 255);
        let key = (1 << 26) + 3;
        let labels = crate::matte::label_with_keys(1, 2, [(key, &full)]).expect("labels");
        let image = colors_for(&labels);
        let expected = GoldenRatioPalette::color_at(u64::from(key - 1));
        assert_eq!(image.get_pixel(0, 0).0, expected);
        assert_eq!(image.get_pixel(1, 0).0, expected);

        let max = LabelMap::from_vec(1, 2, vec![u32::MAX, 0]).expect("labels");
        let image = colors_for(&max);
        assert_eq!(
            image.get_pixel(0, 0).0,
            GoldenRatioPalette::color_at(u64::from(u32::MAX - 1))
        );
        assert_eq!(image.get_pixel(1, 0).0, [0, 0, 0]);
    }

    #[test]
    fn test_colors_for_matches_sequential_draw() {
        let labels = LabelMap::from_vec(1, 5, vec![3, 0, 1, 5, 3]).expect("labels");
        assert_eq!(colors_for(&labels), colors_for_with(&labels, GoldenRatioPalette::new()));
    }

    #[test]
    fn test_colors_follow_labels() {
        let labels = LabelMap::from_vec(1, 3, vec![0, 2, 1]).expect("labels");
        let image = colors_for(&labels);
        let colors = generate_colors(2);
        assert_eq!(image.get_pixel(0, 0).0, [0, 0, 0]);
        assert_eq!(image.get_pixel(1, 0).0, colors[1]);
        assert_eq!(image.get_pixel(2, 0).0, colors[0]);
    }
}
