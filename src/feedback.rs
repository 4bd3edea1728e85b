use ndarray::prelude::*;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::feature::{FEATURE_DIM, FeatureMatrix, column_stats};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Relevance {
    Relevant,
    Irrelevant,
    #[default]
    Unjudged,
}

/// 当前查询下用户对每张图片的相关性判断
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelevanceSet {
    marks: Vec<Relevance>,
}

impl RelevanceSet {
    pub fn new(len: usize) -> Self {
        Self { marks: vec![Relevance::Unjudged; len] }
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    pub fn get(&self, index: usize) -> Relevance {
        self.marks.get(index).copied().unwrap_or_default()
    }

    pub fn record(&mut self, index: usize, relevant: bool) -> Result<()> {
        let mark = if relevant { Relevance::Relevant } else { Relevance::Irrelevant };
        self.set(index, mark)
    }

    pub fn set(&mut self, index: usize, mark: Relevance) -> Result<()> {
        let len = self.len();
        let slot = self.marks.get_mut(index).ok_or(Error::InvalidSelection { index, len })?;
        *slot = mark;
        Ok(())
    }

    /// 清除所有判断
    pub fn clear(&mut self) {
        self.marks.fill(Relevance::Unjudged);
    }

    /// 被标记为相关的图片序号，升序
    pub fn relevant(&self) -> impl Iterator<Item = usize> + '_ {
        self.marks.iter().enumerate().filter(|(_, m)| **m == Relevance::Relevant).map(|(i, _)| i)
    }
}

/// 每个特征维度的权重
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightVector(Vec<f64>);

impl WeightVector {
    /// 没有相关反馈时的初始权重，每一维均为 1 / 图库大小
    pub fn uniform(corpus_size: usize) -> Self {
        Self(vec![1.0 / corpus_size.max(1) as f64; FEATURE_DIM])
    }

    pub fn from_vec(weights: Vec<f64>) -> Self {
        assert_eq!(weights.len(), FEATURE_DIM, "权重维度必须与特征维度一致");
        Self(weights)
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn get(&self, dim: usize) -> f64 {
        self.0[dim]
    }

    pub fn sum(&self) -> f64 {
        self.0.iter().sum()
    }
}

/// 根据相关图片重新计算特征权重
///
/// 只使用被标记为相关的行：
/// - 标准差不为 0：w = 1 / std
/// - 标准差为 0 且均值不为 0：以该列非零值绝对值最小者的一半代替标准差
/// - 标准差与均值均为 0：w = 0
///
/// 结果归一化为和为 1。没有相关图片时退回 [`WeightVector::uniform`]。
pub fn recompute_weights(relevance: &RelevanceSet, matrix: &FeatureMatrix) -> WeightVector {
    let rows = relevance.relevant().filter(|&i| i < matrix.rows()).collect::<Vec<_>>();
    if rows.is_empty() {
        return WeightVector::uniform(matrix.rows());
    }

    let selected = matrix.view().select(Axis(0), &rows);
    let raw = selected
        .axis_iter(Axis(1))
        .map(|col| {
            let (mean, std) = column_stats(col);
            if std != 0.0 {
                1.0 / std
            } else if mean != 0.0 {
                1.0 / (0.5 * min_nonzero_abs(col))
            } else {
                0.0
            }
        })
        .collect::<Vec<_>>();

    let total = raw.iter().sum::<f64>();
    if total == 0.0 || !total.is_finite() {
        // 所有相关图片在每一维上都为 0，无法区分任何特征
        return WeightVector::uniform(matrix.rows());
    }
    WeightVector(raw.into_iter().map(|w| w / total).collect())
}

fn min_nonzero_abs(col: ArrayView1<f64>) -> f64 {
    col.iter().map(|x| x.abs()).filter(|&x| x != 0.0).fold(f64::INFINITY, f64::min)
}
