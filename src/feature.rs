use std::ops::Range;

use ndarray::prelude::*;
use serde::Serialize;

use crate::histogram::{
    self, COLOR_CODE_BINS, ColorCodeHistogram, INTENSITY_BINS, IntensityHistogram,
};
use crate::raster::RasterImage;
use crate::texture::{self, TextureFeatures};

/// 特征向量布局：[能量, 熵, 对比度] ++ 颜色码直方图 ++ 亮度直方图
pub const TEXTURE_DIMS: Range<usize> = 0..3;
pub const COLOR_CODE_DIMS: Range<usize> = 3..3 + COLOR_CODE_BINS;
pub const INTENSITY_DIMS: Range<usize> = 3 + COLOR_CODE_BINS..3 + COLOR_CODE_BINS + INTENSITY_BINS;
pub const FEATURE_DIM: usize = 3 + COLOR_CODE_BINS + INTENSITY_BINS;

/// 单张图片的全部原始特征，提取完成后只读
#[derive(Debug, Clone, Serialize)]
pub struct ImageFeatures {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub texture: TextureFeatures,
    /// 共生矩阵的边长，即图片中不同亮度值的数量
    pub glcm_levels: usize,
    pub color_code: ColorCodeHistogram,
    pub intensity: IntensityHistogram,
}

impl ImageFeatures {
    pub fn extract(image: &RasterImage) -> Self {
        let (color_code, intensity) = histogram::encode(image);
        let (texture, glcm_levels) = texture::analyze(image);
        Self {
            id: image.id().to_owned(),
            width: image.width(),
            height: image.height(),
            texture,
            glcm_levels,
            color_code,
            intensity,
        }
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// 未归一化的特征向量
    pub fn to_vector(&self) -> [f64; FEATURE_DIM] {
        let mut v = [0.0; FEATURE_DIM];
        v[TEXTURE_DIMS].copy_from_slice(&self.texture.to_array());
        for (dst, &c) in v[COLOR_CODE_DIMS].iter_mut().zip(self.color_code.bins()) {
            *dst = c as f64;
        }
        for (dst, &c) in v[INTENSITY_DIMS].iter_mut().zip(self.intensity.bins()) {
            *dst = c as f64;
        }
        v
    }
}

/// 按列 z-score 归一化后的特征矩阵，形状为 (图片数量, FEATURE_DIM)
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix(Array2<f64>);

impl FeatureMatrix {
    pub fn from_features(features: &[ImageFeatures]) -> Self {
        let vectors = features.iter().map(ImageFeatures::to_vector).collect::<Vec<_>>();
        let raw = Array2::from_shape_fn((vectors.len(), FEATURE_DIM), |(i, j)| vectors[i][j]);
        Self::normalize(raw)
    }

    /// 每列减去均值再除以总体标准差；标准差为 0 的列整列置 0
    pub fn normalize(mut raw: Array2<f64>) -> Self {
        for mut col in raw.axis_iter_mut(Axis(1)) {
            let (mean, std) = column_stats(col.view());
            if std == 0.0 {
                col.fill(0.0);
            } else {
                col.mapv_inplace(|x| (x - mean) / std);
            }
        }
        Self(raw)
    }

    pub fn rows(&self) -> usize {
        self.0.nrows()
    }

    pub fn row(&self, i: usize) -> ArrayView1<'_, f64> {
        self.0.row(i)
    }

    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.0.view()
    }
}

/// 总体均值与标准差
///
/// 所有值完全相同时标准差严格为 0，不受浮点累加误差影响。
pub(crate) fn column_stats(col: ArrayView1<f64>) -> (f64, f64) {
    let Some(&first) = col.first() else {
        return (0.0, 0.0);
    };
    if col.iter().all(|&x| x == first) {
        return (first, 0.0);
    }
    let n = col.len() as f64;
    let mean = col.sum() / n;
    let var = col.iter().map(|&x| (x - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}
