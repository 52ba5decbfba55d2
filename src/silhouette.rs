use std::path::Path;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};

use crate::errors::{Result, SilhouetteError};
use crate::imageops_ai::{paste_with_mask, ExtractAlpha};
use crate::traits::BackgroundRemover;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);
const BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Turns `source` into a black cutout whose alpha is the foreground mask
/// reported by `remover`.
pub fn render_silhouette<R>(source: &DynamicImage, remover: &R) -> Result<RgbaImage>
where
    R: BackgroundRemover + ?Sized,
{
    let rgba = source.to_rgba8();
    let foreground = remover.remove_background(&rgba)?;
    if foreground.dimensions() != rgba.dimensions() {
        return Err(SilhouetteError::DimensionMismatch {
            expected: rgba.dimensions(),
            actual: foreground.dimensions(),
        });
    }

    let mask = foreground.extract_alpha();
    let (width, height) = rgba.dimensions();
    let mut silhouette = RgbaImage::from_pixel(width, height, TRANSPARENT);
    let black_fill = RgbaImage::from_pixel(width, height, BLACK);
    paste_with_mask(&mut silhouette, &black_fill, &mask)?;

    Ok(silhouette)
}

/// Reads `source_path`, renders its silhouette and writes it as PNG to
/// `output_path`, replacing any existing file.
pub fn write_silhouette<R>(source_path: &Path, output_path: &Path, remover: &R) -> Result<()>
where
    R: BackgroundRemover + ?Sized,
{
    let source = image::open(source_path).map_err(|e| SilhouetteError::ImageProcessing {
        path: source_path.display().to_string(),
        operation: "画像読み込み".to_string(),
        source: Box::new(e),
    })?;

    let silhouette = render_silhouette(&source, remover)?;

    silhouette
        .save_with_format(output_path, ImageFormat::Png)
        .map_err(|e| SilhouetteError::ImageProcessing {
            path: output_path.display().to_string(),
            operation: "シルエット保存".to_string(),
            source: Box::new(e),
        })
}
