use std::path::Path;

use crate::{
    errors::{Result, SilhouetteError},
    imageops_ai::cutout,
    traits::BackgroundRemover,
};
use image::{
    buffer::ConvertBuffer, imageops, imageops::FilterType, GrayImage, Luma, RgbImage, RgbaImage,
};
use ndarray::prelude::*;
use nshare::AsNdarray3;
use ort::value::TensorRef;
use ort::{
    execution_providers::{CUDAExecutionProvider, TensorRTExecutionProvider},
    session::{builder::SessionBuilder, Session},
};
use parking_lot::Mutex;

const DEFAULT_IMAGE_SIZE: u32 = 320;
const MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// U²-Net style salient object segmentation backed by ONNX Runtime.
pub struct U2NetRemover {
    /// Model input as `(width, height)`.
    pub input_size: (u32, u32),
    input_name: String,
    output_name: String,
    session: Mutex<Session>,
}

impl U2NetRemover {
    pub fn new(model_path: &Path, device_id: i32) -> Result<Self> {
        // Builder errors carry the builder itself, so only their message is kept.
        let session = SessionBuilder::new()
            .map_err(|e| SilhouetteError::model_message("セッションビルダー初期化", e))?
            .with_execution_providers([
                TensorRTExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
                CUDAExecutionProvider::default()
                    .with_device_id(device_id)
                    .build(),
            ])
            .map_err(|e| SilhouetteError::model_message("実行プロバイダー設定", e))?
            .with_memory_pattern(true)
            .map_err(|e| SilhouetteError::model_message("メモリパターン設定", e))?
            .commit_from_file(model_path)
            .map_err(|e| {
                SilhouetteError::model_message(
                    format!("モデルファイル読み込み: {}", model_path.display()),
                    e,
                )
            })?;

        let input = session.inputs.first().ok_or_else(|| SilhouetteError::Model {
            operation: "モデル入力取得".to_string(),
            source: "model declares no inputs".into(),
        })?;
        let output = session.outputs.first().ok_or_else(|| SilhouetteError::Model {
            operation: "モデル出力取得".to_string(),
            source: "model declares no outputs".into(),
        })?;

        let input_size = input
            .input_type
            .tensor_shape()
            .map_or((DEFAULT_IMAGE_SIZE, DEFAULT_IMAGE_SIZE), |shape| {
                input_size_from_shape(shape)
            });

        let input_name = input.name.clone();
        let output_name = output.name.clone();

        Ok(Self {
            input_size,
            input_name,
            output_name,
            session: Mutex::new(session),
        })
    }

    pub fn predict(&self, tensor: ArrayView4<f32>) -> Result<Array4<f32>> {
        let mut binding = self.session.lock();
        let outputs = binding.run(ort::inputs![
            self.input_name.as_str() => TensorRef::from_array_view(&tensor.as_standard_layout())?
        ])?;
        Ok(outputs[self.output_name.as_str()]
            .try_extract_array::<f32>()?
            .into_dimensionality::<Ix4>()?
            .to_owned())
    }
}

impl BackgroundRemover for U2NetRemover {
    fn remove_background(&self, image: &RgbaImage) -> Result<RgbaImage> {
        let rgb: RgbImage = image.convert();
        let (width, height) = self.input_size;
        let tensor = preprocess(&rgb, width, height);
        let prediction = self.predict(tensor.view())?;
        let mask = postprocess_mask(prediction.view(), image.width(), image.height())?;
        Ok(cutout(image, &mask)?)
    }
}

/// Reads `(width, height)` from an NCHW input shape. Dynamic axes report -1
/// and fall back to the default side.
pub fn input_size_from_shape(shape: &[i64]) -> (u32, u32) {
    let side = |axis: usize| {
        shape
            .get(axis)
            .copied()
            .filter(|&side| side > 0)
            .map_or(DEFAULT_IMAGE_SIZE, |side| side as u32)
    };
    (side(3), side(2))
}

/// Resizes to `width`×`height` and converts to a normalized NCHW tensor.
pub fn preprocess(image: &RgbImage, width: u32, height: u32) -> Array4<f32> {
    let resized = imageops::resize(image, width, height, FilterType::Lanczos3);
    let max = resized
        .as_raw()
        .iter()
        .copied()
        .max()
        .map_or(1e-6, |v| f32::from(v).max(1e-6));

    let mut tensor = resized.as_ndarray3().mapv(|v| f32::from(v) / max);
    for (channel, mut plane) in tensor.axis_iter_mut(Axis(0)).enumerate() {
        plane.mapv_inplace(|v| (v - MEAN[channel]) / STD[channel]);
    }
    tensor.insert_axis(Axis(0))
}

/// Min/max normalizes the first mask of `prediction` and scales it back to
/// `width`×`height`.
pub fn postprocess_mask(
    prediction: ArrayView4<f32>,
    width: u32,
    height: u32,
) -> Result<GrayImage> {
    let (batch, channels, rows, cols) = prediction.dim();
    if batch == 0 || channels == 0 || rows == 0 || cols == 0 {
        return Err(SilhouetteError::Model {
            operation: "推論結果読み取り".to_string(),
            source: format!("empty prediction of shape {:?}", prediction.shape()).into(),
        });
    }

    let plane = prediction.slice(s![0, 0, .., ..]);
    let (min, max) = plane
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        });
    let range = (max - min).max(f32::EPSILON);

    let mask = GrayImage::from_fn(cols as u32, rows as u32, |x, y| {
        let value = (plane[[y as usize, x as usize]] - min) / range;
        Luma([(value * 255.0) as u8])
    });
    Ok(imageops::resize(&mask, width, height, FilterType::Lanczos3))
}
