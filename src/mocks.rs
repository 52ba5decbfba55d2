use std::sync::atomic::{AtomicUsize, Ordering};

use crate::errors::{Result, SilhouetteError};
use crate::traits::BackgroundRemover;
use image::{Rgba, RgbaImage};

/// Mask shapes produced by [`MockBackgroundRemover`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockMask {
    /// Same alpha everywhere.
    Constant(u8),
    /// Left half foreground, right half background.
    LeftHalf,
    /// Alpha taken from the red channel of the input.
    FromRed,
}

/// Deterministic stand-in for a segmentation model.
#[derive(Debug)]
pub struct MockBackgroundRemover {
    mask: MockMask,
    fail_on_call: Option<usize>,
    calls: AtomicUsize,
}

impl MockBackgroundRemover {
    pub const fn new(mask: MockMask) -> Self {
        Self {
            mask,
            fail_on_call: None,
            calls: AtomicUsize::new(0),
        }
    }

    /// Fails the `index`-th call (zero based) with a model error.
    pub fn failing_on_call(mut self, index: usize) -> Self {
        self.fail_on_call = Some(index);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn alpha_at(&self, image: &RgbaImage, x: u32, y: u32) -> u8 {
        match self.mask {
            MockMask::Constant(value) => value,
            MockMask::LeftHalf if x < image.width() / 2 => 255,
            MockMask::LeftHalf => 0,
            MockMask::FromRed => image.get_pixel(x, y)[0],
        }
    }
}

impl BackgroundRemover for MockBackgroundRemover {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_on_call == Some(call) {
            return Err(SilhouetteError::model(
                "モック推論",
                std::io::Error::other("simulated model failure"),
            ));
        }

        let mut output = image.clone();
        for (x, y, pixel) in output.enumerate_pixels_mut() {
            pixel[3] = self.alpha_at(image, x, y);
        }
        Ok(output)
    }
}

/// Remover that breaks the same-dimensions contract.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShrinkingRemover;

impl BackgroundRemover for ShrinkingRemover {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let width = (image.width() / 2).max(1);
        let height = (image.height() / 2).max(1);
        Ok(RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255])))
    }
}

/// Grayscale fixture whose red channel encodes a gradient, handy with
/// [`MockMask::FromRed`].
pub fn gradient_image(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, _| {
        let v = ((x * 255) / width.max(1)) as u8;
        Rgba([v, v, v, 255])
    })
}
