use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use indicatif::{ParallelProgressIterator, ProgressBar};
use log::info;
use rayon::prelude::*;

use crate::error::{Error, Result};
use crate::feature::{FeatureMatrix, ImageFeatures};
use crate::raster::RasterImage;

/// 提取完成的图库：逐图特征与归一化后的特征矩阵，两者按图库序号对齐
#[derive(Debug, Clone)]
pub struct Corpus {
    images: Vec<ImageFeatures>,
    matrix: FeatureMatrix,
}

impl Corpus {
    /// 由已提取的逐图特征构建图库
    pub fn from_features(images: Vec<ImageFeatures>) -> Result<Self> {
        if images.is_empty() {
            return Err(Error::EmptyCorpus);
        }
        let matrix = FeatureMatrix::from_features(&images);
        Ok(Self { images, matrix })
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn images(&self) -> &[ImageFeatures] {
        &self.images
    }

    pub fn matrix(&self) -> &FeatureMatrix {
        &self.matrix
    }

    pub fn image(&self, index: usize) -> Result<&ImageFeatures> {
        self.images.get(index).ok_or(Error::InvalidSelection { index, len: self.len() })
    }

    pub fn check_index(&self, index: usize) -> Result<()> {
        self.image(index).map(|_| ())
    }

    /// 按标识查找图片序号，也可以只给出路径的末尾部分（如文件名）
    pub fn position(&self, name: &str) -> Result<usize> {
        self.images
            .iter()
            .position(|img| img.id == name)
            .or_else(|| self.images.iter().position(|img| Path::new(&img.id).ends_with(name)))
            .ok_or_else(|| Error::UnknownImage(name.to_owned()))
    }
}

/// 并行提取图库特征
///
/// 每张图片的结果写入其图库序号对应的位置，与线程调度顺序无关。
pub struct Extractor {
    cancel: Arc<AtomicBool>,
    progress: ProgressBar,
}

impl Default for Extractor {
    fn default() -> Self {
        Self { cancel: Arc::new(AtomicBool::new(false)), progress: ProgressBar::hidden() }
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// 使用外部的取消标志，每处理一张图片前检查一次
    pub fn with_cancel(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        self.cancel.clone()
    }

    pub fn extract(&self, images: &[RasterImage]) -> Result<Corpus> {
        if images.is_empty() {
            return Err(Error::EmptyCorpus);
        }

        let start = Instant::now();
        self.progress.set_length(images.len() as u64);
        self.progress.set_message("提取特征");

        let features = images
            .par_iter()
            .progress_with(self.progress.clone())
            .map(|image| {
                if self.cancel.load(Ordering::Relaxed) {
                    return None;
                }
                Some(ImageFeatures::extract(image))
            })
            .collect::<Option<Vec<_>>>()
            .ok_or(Error::Cancelled)?;

        info!(
            "特征提取完成，共 {} 张图片，耗时 {:.2}s",
            features.len(),
            start.elapsed().as_secs_f32()
        );

        Corpus::from_features(features)
    }
}

/// 使用默认配置提取图库特征
pub fn extract_corpus(images: &[RasterImage]) -> Result<Corpus> {
    Extractor::new().extract(images)
}
