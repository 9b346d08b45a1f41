use crate::*;
use image::{GrayImage, Luma};
use imageproc::drawing::{draw_text_mut, text_size};
use rusttype::{Font, Scale};

/// Intensity of id labels, kept apart from every target code.
pub const LABEL_INTENSITY: u8 = 255;

static LABEL_SCALE: f32 = 24.0;

/// The output buffer of one frame.
///
/// Each pixel holds at most one target code. The canvas keeps a count of pixels per intensity
/// so that asking whether a code is present does not rescan the image.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: GrayImage,
    counts: [usize; 256],
}

impl Canvas {
    /// Returns a blank canvas of the frame size
    pub fn new(width: u32, height: u32) -> Canvas {
        let mut counts = [0; 256];
        counts[0] = width as usize * height as usize;
        Canvas {
            image: GrayImage::new(width, height),
            counts,
        }
    }

    /// Return the image drawn so far
    pub fn image(&self) -> &GrayImage {
        &self.image
    }

    /// Returns the number of pixels holding `code`
    pub fn count(&self, code: u8) -> usize {
        self.counts[code as usize]
    }

    /// Returns true if any pixel holds `code`
    pub fn contains(&self, code: u8) -> bool {
        self.count(code) > 0
    }

    /// Paint every foreground pixel of `mask` with `code`, overwriting what was there.
    pub fn fill(&mut self, mask: &Mask, code: u8) {
        let (width, height) = self.image.dimensions();
        for (x, y) in mask.iter().filter(|&(x, y)| x < width && y < height) {
            let pixel = self.image.get_pixel_mut(x, y);
            self.counts[pixel[0] as usize] -= 1;
            self.counts[code as usize] += 1;
            *pixel = Luma([code]);
        }
    }

    /// Draw `labels` as text centred on each position and return the finished image.
    ///
    /// Labels are not reflected in `count`, so this consumes the canvas. Glyphs are rendered
    /// without anti-aliasing: a blended edge pixel could otherwise land on another target's code.
    pub fn into_labelled(mut self, font: &Font, labels: &[(u32, (u32, u32))]) -> GrayImage {
        let scale = Scale::uniform(LABEL_SCALE);
        let mut glyphs = GrayImage::new(self.image.width(), self.image.height());
        for (id, (x, y)) in labels {
            let text = id.to_string();
            let (width, height) = text_size(scale, font, &text);
            draw_text_mut(
                &mut glyphs,
                Luma([u8::MAX]),
                *x as i32 - width / 2,
                *y as i32 - height / 2,
                scale,
                font,
                &text,
            );
        }
        self.image
            .pixels_mut()
            .zip(glyphs.pixels())
            .filter(|(_, glyph)| glyph[0] > u8::MAX / 2)
            .for_each(|(pixel, _)| *pixel = Luma([LABEL_INTENSITY]));
        self.image
    }

    /// Return the finished image
    pub fn into_image(self) -> GrayImage {
        self.image
    }
}
