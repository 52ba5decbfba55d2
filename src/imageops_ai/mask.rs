use anyhow::{ensure, Result};
use image::{GenericImageView, ImageBuffer, Luma, Pixel, Primitive};
use num_traits::AsPrimitive;

use crate::imageops_ai::{get_max_value, is_floating_point};

/// Pastes `fill` onto `canvas` using `mask` as a per-pixel stencil.
///
/// Every channel, alpha included, becomes `fill * m + canvas * (1 - m)` where
/// `m` is the mask value scaled to `0.0..=1.0`. Integer channels are rounded.
pub fn paste_with_mask<I, P, S, SM>(
    canvas: &mut ImageBuffer<P, Vec<S>>,
    fill: &I,
    mask: &ImageBuffer<Luma<SM>, Vec<SM>>,
) -> Result<()>
where
    I: GenericImageView<Pixel = P>,
    P: Pixel<Subpixel = S>,
    Luma<SM>: Pixel<Subpixel = SM>,
    S: Primitive + AsPrimitive<f32> + 'static,
    SM: Primitive + AsPrimitive<f32> + 'static,
    f32: AsPrimitive<S>,
{
    ensure!(
        canvas.dimensions() == fill.dimensions(),
        "Canvas and fill dimensions do not match: {:?} vs {:?}",
        canvas.dimensions(),
        fill.dimensions()
    );
    ensure!(
        canvas.dimensions() == mask.dimensions(),
        "Canvas and mask dimensions do not match: {:?} vs {:?}",
        canvas.dimensions(),
        mask.dimensions()
    );

    let sm_max: f32 = get_max_value::<SM>().as_();

    for (x, y, dst) in canvas.enumerate_pixels_mut() {
        let src = fill.get_pixel(x, y);
        let Luma([m]) = *mask.get_pixel(x, y);
        let alpha = m.as_() / sm_max;
        dst.apply2(&src, |d, s| blend(d, s, alpha));
    }

    Ok(())
}

/// Keeps the parts of `image` selected by `mask` on a zeroed background.
pub fn cutout<P, S, SM>(
    image: &ImageBuffer<P, Vec<S>>,
    mask: &ImageBuffer<Luma<SM>, Vec<SM>>,
) -> Result<ImageBuffer<P, Vec<S>>>
where
    P: Pixel<Subpixel = S>,
    Luma<SM>: Pixel<Subpixel = SM>,
    S: Primitive + AsPrimitive<f32> + 'static,
    SM: Primitive + AsPrimitive<f32> + 'static,
    f32: AsPrimitive<S>,
{
    let mut canvas = ImageBuffer::new(image.width(), image.height());
    paste_with_mask(&mut canvas, image, mask)?;
    Ok(canvas)
}

fn blend<S>(dst: S, src: S, alpha: f32) -> S
where
    S: Primitive + AsPrimitive<f32> + 'static,
    f32: AsPrimitive<S>,
{
    let value = src.as_() * alpha + dst.as_() * (1.0 - alpha);
    if is_floating_point::<S>() {
        value.as_()
    } else {
        value.round().as_()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Rgba, RgbaImage};

    #[test]
    fn test_paste_full_and_empty_mask() -> Result<()> {
        let mut canvas = RgbaImage::new(2, 1);
        let fill = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        let mask = GrayImage::from_raw(2, 1, vec![0, 255]).unwrap();

        paste_with_mask(&mut canvas, &fill, &mask)?;

        assert_eq!(canvas.get_pixel(0, 0), &Rgba([0, 0, 0, 0]));
        assert_eq!(canvas.get_pixel(1, 0), &Rgba([0, 0, 0, 255]));
        Ok(())
    }

    #[test]
    fn test_paste_partial_mask_keeps_mask_as_alpha() -> Result<()> {
        let mut canvas = RgbaImage::new(256, 1);
        let fill = RgbaImage::from_pixel(256, 1, Rgba([0, 0, 0, 255]));
        let mask = GrayImage::from_fn(256, 1, |x, _| Luma([x as u8]));

        paste_with_mask(&mut canvas, &fill, &mask)?;

        for (x, _, pixel) in canvas.enumerate_pixels() {
            assert_eq!(*pixel, Rgba([0, 0, 0, x as u8]));
        }
        Ok(())
    }

    #[test]
    fn test_paste_rejects_mismatched_mask() {
        let mut canvas = RgbaImage::new(2, 2);
        let fill = RgbaImage::new(2, 2);
        let mask = GrayImage::new(3, 2);
        assert!(paste_with_mask(&mut canvas, &fill, &mask).is_err());
    }

    #[test]
    fn test_cutout_scales_every_channel() -> Result<()> {
        let image = RgbaImage::from_pixel(1, 2, Rgba([200, 100, 50, 255]));
        let mask = GrayImage::from_raw(1, 2, vec![255, 0]).unwrap();

        let result = cutout(&image, &mask)?;

        assert_eq!(result.get_pixel(0, 0), &Rgba([200, 100, 50, 255]));
        assert_eq!(result.get_pixel(0, 1), &Rgba([0, 0, 0, 0]));
        Ok(())
    }
}
