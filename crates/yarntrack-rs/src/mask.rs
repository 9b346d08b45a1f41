use crate::*;
use ndarray::*;

/// Mask is a binary foreground region of a frame.
///
/// Conceptually a mask spans the whole frame and is zero outside its region. Only the tight
/// bounding window of the region is stored, anchored at `(x, y)` in frame co-ordinates, so
/// comparisons between masks cost the size of their overlap rather than the size of the frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Mask {
    /// Left of the stored window in the frame.
    x: u32,
    /// Top of the stored window in the frame.
    y: u32,
    /// Foreground membership indexed `[row, column]`.
    pixels: Array2<bool>,
    /// Number of foreground pixels.
    area: usize,
}

impl Default for Mask {
    fn default() -> Self {
        Self::new(0, 0, Array2::from_elem((0, 0), false))
    }
}

impl Mask {
    /// Returns a new Mask
    ///
    /// # Parameters
    ///
    /// * `x`: Frame column of `pixels[[0, 0]]`.
    /// * `y`: Frame row of `pixels[[0, 0]]`.
    /// * `pixels`: Foreground membership indexed `[row, column]`.
    pub fn new(x: u32, y: u32, pixels: Array2<bool>) -> Mask {
        let area = pixels.iter().filter(|&&p| p).count();
        Mask { x, y, pixels, area }
    }

    /// Returns a Mask of a `width` x `height` frame whose foreground is where `f(x, y)` holds,
    /// trimmed to its bounding window.
    pub fn from_fn<F>(width: u32, height: u32, f: F) -> Mask
    where
        F: Fn(u32, u32) -> bool,
    {
        let pixels = Array2::from_shape_fn((height as usize, width as usize), |(row, col)| {
            f(col as u32, row as u32)
        });
        Mask::new(0, 0, pixels).trimmed()
    }

    /// Returns the number of foreground pixels
    pub fn area(&self) -> usize {
        self.area
    }

    /// Returns true if the mask holds no foreground
    pub fn is_empty(&self) -> bool {
        self.area == 0
    }

    /// Returns the stored window of the mask in frame co-ordinates
    pub fn bounds(&self) -> Roi {
        Roi::new(
            self.x,
            self.y,
            self.pixels.ncols() as u32,
            self.pixels.nrows() as u32,
        )
    }

    /// Returns the stored pixels, indexed `[row, column]` relative to `bounds()`
    pub fn pixels(&self) -> &Array2<bool> {
        &self.pixels
    }

    /// Returns true if the frame pixel `(x, y)` is foreground
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.bounds().contains(x, y)
            && self.pixels[[(y - self.y) as usize, (x - self.x) as usize]]
    }

    /// Returns an iterator over the frame co-ordinates `(x, y)` of every foreground pixel, in raster order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.pixels
            .indexed_iter()
            .filter(|(_, p)| **p)
            .map(move |((row, col), _)| (self.x + col as u32, self.y + row as u32))
    }

    /// Returns the mean foreground co-ordinate truncated to integers, or `None` for an empty mask.
    pub fn centroid(&self) -> Option<(u32, u32)> {
        if self.area == 0 {
            return None;
        }
        let (sum_x, sum_y) = self
            .iter()
            .fold((0u64, 0u64), |(sx, sy), (x, y)| (sx + x as u64, sy + y as u64));
        let area = self.area as u64;
        Some(((sum_x / area) as u32, (sum_y / area) as u32))
    }

    /// Returns the number of pixels that are foreground in both masks.
    pub fn intersection(&self, other: &Mask) -> usize {
        if self.is_empty() || other.is_empty() {
            return 0;
        }
        let (ax0, ay0, ax1, ay1) = self.bounds().to_tlbr();
        let (bx0, by0, bx1, by1) = other.bounds().to_tlbr();
        let (x0, y0) = (ax0.max(bx0), ay0.max(by0));
        let (x1, y1) = (ax1.min(bx1), ay1.min(by1));
        if x0 >= x1 || y0 >= y1 {
            return 0;
        }

        let a = self.pixels.slice(s![
            (y0 - ay0) as usize..(y1 - ay0) as usize,
            (x0 - ax0) as usize..(x1 - ax0) as usize
        ]);
        let b = other.pixels.slice(s![
            (y0 - by0) as usize..(y1 - by0) as usize,
            (x0 - bx0) as usize..(x1 - bx0) as usize
        ]);
        Zip::from(&a)
            .and(&b)
            .fold(0, |count, &p, &q| count + (p && q) as usize)
    }

    /// Returns the mask shrunk to the bounding window of its foreground.
    pub fn trimmed(self) -> Mask {
        if self.area == 0 {
            return Mask::default();
        }
        let rows = self
            .pixels
            .axis_iter(Axis(0))
            .enumerate()
            .filter(|(_, row)| row.iter().any(|&p| p))
            .map(|(i, _)| i);
        let cols = self
            .pixels
            .axis_iter(Axis(1))
            .enumerate()
            .filter(|(_, col)| col.iter().any(|&p| p))
            .map(|(i, _)| i);
        let (row0, row1) = min_max(rows);
        let (col0, col1) = min_max(cols);
        let pixels = self
            .pixels
            .slice(s![row0..=row1, col0..=col1])
            .to_owned();
        Mask {
            x: self.x + col0 as u32,
            y: self.y + row0 as u32,
            pixels,
            area: self.area,
        }
    }
}

fn min_max(indices: impl Iterator<Item = usize>) -> (usize, usize) {
    indices.fold((usize::MAX, 0), |(lo, hi), i| (lo.min(i), hi.max(i)))
}
