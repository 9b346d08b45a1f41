//! Per-target measurements taken from tracked output frames.
//!
//! A tracked frame encodes each target as a constant intensity, so a target's position in that
//! frame can be read back from the pixels holding its intensity.

use image::GrayImage;

/// Returns the distinct intensities of `image` that are at least `min_gray`, ascending.
pub fn gray_levels(image: &GrayImage, min_gray: u8) -> Vec<u8> {
    let mut present = [false; 256];
    image.pixels().for_each(|pixel| present[pixel[0] as usize] = true);
    (min_gray..=u8::MAX)
        .filter(|&level| present[level as usize])
        .collect()
}

/// Returns, for each of `levels`, the mean row of the pixels holding that intensity.
///
/// The mean is truncated to an integer. A level with no pixels reports row `0`.
pub fn row_centroids(image: &GrayImage, levels: &[u8]) -> Vec<u32> {
    let mut sums = [0u64; 256];
    let mut counts = [0u64; 256];
    for (_, y, pixel) in image.enumerate_pixels() {
        sums[pixel[0] as usize] += y as u64;
        counts[pixel[0] as usize] += 1;
    }
    levels
        .iter()
        .map(|&level| match counts[level as usize] {
            0 => 0,
            count => (sums[level as usize] / count) as u32,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn bands() -> GrayImage {
        GrayImage::from_fn(10, 20, |x, y| match (x, y) {
            (0..=4, 2..=5) => Luma([81]),
            (5..=9, 10..=11) => Luma([82]),
            (_, 19) => Luma([255]),
            _ => Luma([0]),
        })
    }

    #[test]
    fn levels_above_threshold() {
        assert_eq!(gray_levels(&bands(), 81), vec![81, 82, 255]);
        assert_eq!(gray_levels(&bands(), 82), vec![82, 255]);
        assert_eq!(gray_levels(&bands(), 0), vec![0, 81, 82, 255]);
    }

    #[test]
    fn centroid_rows() {
        // rows 2..=5 average 3.5, rows 10..=11 average 10.5
        assert_eq!(row_centroids(&bands(), &[81, 82, 90]), vec![3, 10, 0]);
    }
}
