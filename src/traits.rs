use crate::errors::Result;
use image::RgbaImage;

/// Foreground segmentation capability the batch depends on.
///
/// Implementations return an image with the same dimensions as `image` whose
/// alpha channel is the foreground mask: 0 for background, 255 for
/// foreground. Intermediate values are passed through untouched.
pub trait BackgroundRemover: Send + Sync {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage>;
}

impl<R: BackgroundRemover + ?Sized> BackgroundRemover for &R {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
        (**self).remove_background(image)
    }
}

impl<R: BackgroundRemover + ?Sized> BackgroundRemover for Box<R> {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
        (**self).remove_background(image)
    }
}
