use image::{ImageBuffer, Luma, Pixel, Primitive, Rgba};

/// Splits the alpha channel off an image as a single-channel mask.
pub trait ExtractAlpha {
    type Mask;
    fn extract_alpha(&self) -> Self::Mask;
}

impl<S> ExtractAlpha for ImageBuffer<Rgba<S>, Vec<S>>
where
    Rgba<S>: Pixel<Subpixel = S>,
    Luma<S>: Pixel<Subpixel = S>,
    S: Primitive + 'static,
{
    type Mask = ImageBuffer<Luma<S>, Vec<S>>;

    fn extract_alpha(&self) -> Self::Mask {
        ImageBuffer::from_fn(self.width(), self.height(), |x, y| {
            let Rgba([_, _, _, a]) = *self.get_pixel(x, y);
            Luma([a])
        })
    }
}
