use std::ops::Range;

use clap::ValueEnum;
use ndarray::ArrayView1;
use serde::Serialize;

use crate::corpus::Corpus;
use crate::error::Result;
use crate::feature::{COLOR_CODE_DIMS, FEATURE_DIM, ImageFeatures, TEXTURE_DIMS};
use crate::feedback::WeightVector;
use crate::histogram::Histogram;

/// 查询方式
#[derive(ValueEnum, Serialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum QueryMode {
    /// 颜色码直方图
    #[value(alias = "cc")]
    ColorCode,
    /// 亮度直方图
    #[value(alias = "inten")]
    Intensity,
    /// 纹理能量
    #[value(alias = "energy")]
    TextureEnergy,
    /// 纹理熵
    #[value(alias = "entropy")]
    TextureEntropy,
    /// 纹理对比度
    #[value(alias = "contrast")]
    TextureContrast,
    /// 纹理 + 颜色码，加权
    #[value(alias = "cct")]
    RelTexColor,
    /// 颜色码 + 亮度，加权
    #[value(alias = "cci")]
    RelColorIntensity,
    /// 全部特征，加权
    #[value(alias = "all")]
    RelAll,
}

impl QueryMode {
    /// 加权查询所使用的特征子集，非加权查询返回 None
    pub fn subset(self) -> Option<FeatureSubset> {
        match self {
            Self::RelTexColor => Some(FeatureSubset::TextureColorCode),
            Self::RelColorIntensity => Some(FeatureSubset::ColorCodeIntensity),
            Self::RelAll => Some(FeatureSubset::All),
            _ => None,
        }
    }

    pub fn is_weighted(self) -> bool {
        self.subset().is_some()
    }
}

/// 加权距离所覆盖的特征维度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureSubset {
    TextureColorCode,
    ColorCodeIntensity,
    All,
}

impl FeatureSubset {
    pub fn dims(self) -> Range<usize> {
        match self {
            Self::TextureColorCode => TEXTURE_DIMS.start..COLOR_CODE_DIMS.end,
            Self::ColorCodeIntensity => COLOR_CODE_DIMS.start..FEATURE_DIM,
            Self::All => 0..FEATURE_DIM,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Ranked {
    pub index: usize,
    pub distance: f64,
}

/// 按距离升序排列的查询结果，距离相同的保持图库顺序
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct DistanceRanking(Vec<Ranked>);

impl DistanceRanking {
    pub fn from_distances(distances: impl IntoIterator<Item = f64>) -> Self {
        let mut ranked = distances
            .into_iter()
            .enumerate()
            .map(|(index, distance)| Ranked { index, distance })
            .collect::<Vec<_>>();
        // sort_by 是稳定排序
        ranked.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Self(ranked)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Ranked> {
        self.0.iter()
    }

    pub fn first(&self) -> Option<&Ranked> {
        self.0.first()
    }

    /// 图库中某张图片的距离
    pub fn distance_of(&self, index: usize) -> Option<f64> {
        self.0.iter().find(|r| r.index == index).map(|r| r.distance)
    }

    pub fn truncate(&mut self, len: usize) {
        self.0.truncate(len);
    }

    pub fn into_inner(self) -> Vec<Ranked> {
        self.0
    }
}

impl<'a> IntoIterator for &'a DistanceRanking {
    type Item = &'a Ranked;
    type IntoIter = std::slice::Iter<'a, Ranked>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// 加权曼哈顿距离，只计算 `dims` 范围内的维度
pub fn weighted_l1(
    q: ArrayView1<f64>,
    v: ArrayView1<f64>,
    weights: &WeightVector,
    dims: Range<usize>,
) -> f64 {
    dims.map(|j| weights.get(j) * (q[j] - v[j]).abs()).sum()
}

/// 按各自面积归一化后的直方图 L1 距离
fn histogram_l1<const N: usize>(
    q: &Histogram<N>,
    q_area: u64,
    v: &Histogram<N>,
    v_area: u64,
) -> f64 {
    q.proportions(q_area).zip(v.proportions(v_area)).map(|(a, b)| (a - b).abs()).sum()
}

/// 不经过特征矩阵与权重的单一特征距离
pub fn raw_distance(mode: QueryMode, q: &ImageFeatures, v: &ImageFeatures) -> Option<f64> {
    let d = match mode {
        QueryMode::ColorCode => histogram_l1(&q.color_code, q.area(), &v.color_code, v.area()),
        QueryMode::Intensity => histogram_l1(&q.intensity, q.area(), &v.intensity, v.area()),
        QueryMode::TextureEnergy => (q.texture.energy - v.texture.energy).abs(),
        QueryMode::TextureEntropy => (q.texture.entropy - v.texture.entropy).abs(),
        QueryMode::TextureContrast => (q.texture.contrast - v.texture.contrast).abs(),
        _ => return None,
    };
    Some(d)
}

/// 计算查询图片与图库中每张图片的距离并排序
pub fn query(
    corpus: &Corpus,
    query: usize,
    mode: QueryMode,
    weights: &WeightVector,
) -> Result<DistanceRanking> {
    let q = corpus.image(query)?;

    let ranking = match mode.subset() {
        Some(subset) => {
            let matrix = corpus.matrix();
            let qv = matrix.row(query);
            let dims = subset.dims();
            let distances = (0..matrix.rows())
                .map(|k| weighted_l1(qv, matrix.row(k), weights, dims.clone()))
                .collect::<Vec<_>>();
            DistanceRanking::from_distances(distances)
        }
        None => DistanceRanking::from_distances(
            corpus.images().iter().map(|v| raw_distance(mode, q, v).unwrap_or(f64::INFINITY)),
        ),
    };
    Ok(ranking)
}
