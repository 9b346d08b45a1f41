use crate::*;
use image::{imageops, GrayImage, Luma};
use imageproc::region_labelling::{connected_components, Connectivity};
use ndarray::*;
use std::collections::{HashMap, HashSet};

/// Pixel extent of one labelled component inside the search window.
#[derive(Debug)]
struct Extent {
    label: u32,
    min_x: u32,
    min_y: u32,
    max_x: u32,
    max_y: u32,
}

impl Extent {
    fn new(label: u32, x: u32, y: u32) -> Extent {
        Extent {
            label,
            min_x: x,
            min_y: y,
            max_x: x,
            max_y: y,
        }
    }

    fn extend(&mut self, x: u32, y: u32) {
        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }
}

/// Extract the outermost connected foreground components of `frame` inside `roi`.
///
/// Any non-zero intensity is foreground and everything outside `roi` is background. Each
/// component is returned as a filled mask in frame co-ordinates: holes are closed, and
/// components lying inside another component's hole are dropped, leaving only the outer
/// regions.
///
/// # Parameters
///
/// * `frame`: The grayscale frame.
/// * `roi`: The window to search.
/// * `connectivity`: Pixel adjacency used to join foreground pixels.
///
/// # Returns
///
/// The components in discovery order, i.e. by the raster position (row, then column) of each
/// component's first pixel.
pub fn extract_components(frame: &GrayImage, roi: &Roi, connectivity: Connectivity) -> Vec<Mask> {
    if roi.is_empty() {
        return vec![];
    }

    let window = imageops::crop_imm(frame, roi.x(), roi.y(), roi.width(), roi.height()).to_image();
    let binary = GrayImage::from_fn(window.width(), window.height(), |x, y| {
        if window.get_pixel(x, y)[0] > 0 {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    });
    let labels = connected_components(&binary, connectivity, Luma([0u8]));

    let mut order = HashMap::<u32, usize>::new();
    let mut extents = Vec::<Extent>::new();
    for (x, y, pixel) in labels.enumerate_pixels() {
        let label = pixel[0];
        if label == 0 {
            continue;
        }
        let index = *order.entry(label).or_insert_with(|| {
            extents.push(Extent::new(label, x, y));
            extents.len() - 1
        });
        extents[index].extend(x, y);
    }

    let filled = extents
        .iter()
        .map(|extent| {
            let pixels = Array2::from_shape_fn(
                (
                    (extent.max_y - extent.min_y + 1) as usize,
                    (extent.max_x - extent.min_x + 1) as usize,
                ),
                |(row, col)| {
                    labels.get_pixel(extent.min_x + col as u32, extent.min_y + row as u32)[0]
                        == extent.label
                },
            );
            Mask::new(
                roi.x() + extent.min_x,
                roi.y() + extent.min_y,
                fill_holes(&pixels, connectivity),
            )
        })
        .collect::<Vec<_>>();

    // a component is nested when its first pixel falls inside another component's filled region
    let first_pixels = extents
        .iter()
        .map(|extent| {
            let row = extent.min_y;
            let col = (extent.min_x..=extent.max_x)
                .find(|&x| labels.get_pixel(x, row)[0] == extent.label)
                .unwrap_or(extent.min_x);
            (roi.x() + col, roi.y() + row)
        })
        .collect::<Vec<_>>();

    filled
        .iter()
        .enumerate()
        .filter(|(i, _)| {
            let (x, y) = first_pixels[*i];
            !filled
                .iter()
                .enumerate()
                .any(|(j, other)| j != *i && other.contains(x, y))
        })
        .map(|(_, mask)| mask.clone())
        .collect()
}

/// Close every background region of `pixels` that cannot reach the window border.
///
/// Background is labelled with the connectivity dual to the foreground's so that a diagonal gap
/// in an 8-connected outline does not leak.
fn fill_holes(pixels: &Array2<bool>, connectivity: Connectivity) -> Array2<bool> {
    let (rows, cols) = pixels.dim();
    let background = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        if pixels[[y as usize, x as usize]] {
            Luma([0u8])
        } else {
            Luma([255u8])
        }
    });
    let dual = match connectivity {
        Connectivity::Eight => Connectivity::Four,
        Connectivity::Four => Connectivity::Eight,
    };
    let labels = connected_components(&background, dual, Luma([0u8]));

    let outside = labels
        .enumerate_pixels()
        .filter(|(x, y, _)| {
            *x == 0 || *y == 0 || *x + 1 == cols as u32 || *y + 1 == rows as u32
        })
        .map(|(_, _, label)| label[0])
        .filter(|&label| label != 0)
        .collect::<HashSet<_>>();

    Array2::from_shape_fn((rows, cols), |(row, col)| {
        !outside.contains(&labels.get_pixel(col as u32, row as u32)[0])
    })
}
