/// Roi represents the search window of a target, in frame pixel co-ordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Roi {
    /// Left of the window (i.e. min-x)
    x: u32,
    /// Top of the window (i.e. min-y)
    y: u32,
    /// Width of the window
    width: u32,
    /// Height of the window
    height: u32,
}

impl Roi {
    /// Returns a new Roi
    ///
    /// # Parameters
    ///
    /// * `x`: Window left.
    /// * `y`: Window top.
    /// * `width`: Window width.
    /// * `height`: Window height.
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Roi {
        Roi {
            x,
            y,
            width,
            height,
        }
    }

    /// Returns a Roi covering an entire frame.
    pub fn full(frame_width: u32, frame_height: u32) -> Roi {
        Roi::new(0, 0, frame_width, frame_height)
    }

    /// Returns the window of size `roi_width` x `roi_height` centred on `centroid`, clipped to the frame.
    ///
    /// Each side extends `roi_width / 2` (resp. `roi_height / 2`) pixels from the centroid, so the
    /// largest inter-frame displacement that can still be matched is half the window dimension.
    ///
    /// # Parameters
    ///
    /// * `centroid`: Last known `(x, y)` of the target.
    /// * `roi_width`: Configured window width.
    /// * `roi_height`: Configured window height.
    /// * `frame_width`: Frame width.
    /// * `frame_height`: Frame height.
    pub fn around(
        centroid: (u32, u32),
        roi_width: u32,
        roi_height: u32,
        frame_width: u32,
        frame_height: u32,
    ) -> Roi {
        let (x0, x1) = clip_span(centroid.0, roi_width / 2, frame_width);
        let (y0, y1) = clip_span(centroid.1, roi_height / 2, frame_height);
        Roi::new(x0, y0, x1 - x0, y1 - y0)
    }

    /// Returns the x of the window
    pub fn x(&self) -> u32 {
        self.x
    }

    /// Returns the y of the window
    pub fn y(&self) -> u32 {
        self.y
    }

    /// Returns the width of the window
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the height of the window
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the area of the window
    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns true if the window holds no pixels
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns the window in top-left, bottom-right format, i.e., `(min x, min y, max x, max y)` with exclusive maxima.
    pub fn to_tlbr(&self) -> (u32, u32, u32, u32) {
        (self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Returns true if `(x, y)` lies inside the window
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && y >= self.y && x < self.x + self.width && y < self.y + self.height
    }
}

/// `[center - half, center + half)` clipped to `[0, limit)`.
fn clip_span(center: u32, half: u32, limit: u32) -> (u32, u32) {
    let start = center.saturating_sub(half).min(limit);
    let end = center.saturating_add(half).min(limit);
    (start, end.max(start))
}

#[cfg(test)]
mod tests {
    use crate::*;

    #[test]
    fn around_interior() {
        let roi = Roi::around((100, 50), 40, 20, 640, 480);
        assert_eq!(roi, Roi::new(80, 40, 40, 20));
        assert_eq!(roi.to_tlbr(), (80, 40, 120, 60));
    }

    #[test]
    fn around_clipped_to_frame() {
        let roi = Roi::around((5, 470), 40, 20, 640, 480);
        assert_eq!(roi.to_tlbr(), (0, 460, 25, 480));
        assert!(roi.contains(0, 479));
        assert!(!roi.contains(25, 470));
    }

    #[test]
    fn around_larger_than_frame() {
        let roi = Roi::around((10, 10), 768, 180, 64, 32);
        assert_eq!(roi, Roi::full(64, 32));
        assert_eq!(roi.area(), 64 * 32);
    }

    #[test]
    fn zero_sized_window() {
        let roi = Roi::around((10, 10), 0, 1, 64, 32);
        assert!(roi.is_empty());
        assert!(!roi.contains(10, 10));
    }
}
