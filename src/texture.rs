//! 基于灰度共生矩阵（GLCM）的纹理特征
//!
//! 灰度图中只出现过的亮度级别参与建表，共生矩阵的大小等于图片中不同亮度值的数量，
//! 而不是固定的 256 x 256。

use ndarray::prelude::*;
use ndarray::Zip;
use serde::Serialize;

use crate::histogram::luma_milli;
use crate::raster::RasterImage;

/// 共生像素对的偏移量 (行, 列)
pub const OFFSET: (usize, usize) = (1, 1);

/// 灰度化，亮度向下取整，数组形状为 (高, 宽)
pub fn grayscale(image: &RasterImage) -> Array2<u8> {
    let (w, h) = (image.width() as usize, image.height() as usize);
    Array2::from_shape_fn((h, w), |(r, c)| {
        (luma_milli(image.pixel(c as u32, r as u32)) / 1000) as u8
    })
}

/// 亮度值到其在已出现亮度级别中排名的查找表
#[derive(Debug, Clone)]
pub struct LevelIndex {
    levels: Vec<u8>,
    rank: [u8; 256],
}

impl LevelIndex {
    pub fn from_gray(gray: &Array2<u8>) -> Self {
        let mut present = [false; 256];
        gray.iter().for_each(|&v| present[v as usize] = true);

        let mut levels = Vec::new();
        let mut rank = [0; 256];
        for (v, _) in present.iter().enumerate().filter(|(_, p)| **p) {
            rank[v] = levels.len() as u8;
            levels.push(v as u8);
        }
        Self { levels, rank }
    }

    /// 升序排列的亮度级别
    pub fn levels(&self) -> &[u8] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    #[inline(always)]
    pub fn rank(&self, value: u8) -> usize {
        self.rank[value as usize] as usize
    }
}

/// 灰度共生矩阵
#[derive(Debug, Clone)]
pub struct CoOccurrence {
    index: LevelIndex,
    counts: Array2<u32>,
}

impl CoOccurrence {
    /// C[i, j] = |{ (r, c) | I[r, c] = i, I[r + 1, c + 1] = j }|，i 与 j 为亮度排名
    pub fn from_gray(gray: &Array2<u8>) -> Self {
        let index = LevelIndex::from_gray(gray);
        let n = index.len();
        let mut counts = Array2::<u32>::zeros((n, n));

        let (h, w) = gray.dim();
        let (dr, dc) = OFFSET;
        // 最后一行和最后一列没有对应的像素
        if h > dr && w > dc {
            let src = gray.slice(s![..h - dr, ..w - dc]);
            let dst = gray.slice(s![dr.., dc..]);
            Zip::from(src).and(dst).for_each(|&a, &b| {
                counts[[index.rank(a), index.rank(b)]] += 1;
            });
        }

        Self { index, counts }
    }

    pub fn index(&self) -> &LevelIndex {
        &self.index
    }

    pub fn counts(&self) -> ArrayView2<'_, u32> {
        self.counts.view()
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// 归一化为联合概率表；没有任何像素对时返回全零矩阵
    pub fn normalize(&self) -> Array2<f64> {
        let total = self.total();
        if total == 0 {
            return Array2::zeros(self.counts.raw_dim());
        }
        let total = total as f64;
        self.counts.mapv(|c| c as f64 / total)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TextureFeatures {
    pub energy: f64,
    /// 累加 p * log2(p)，没有取负，因此不大于 0
    pub entropy: f64,
    /// 基于亮度排名而不是亮度值本身
    pub contrast: f64,
}

impl TextureFeatures {
    pub fn from_probabilities(p: &Array2<f64>) -> Self {
        let mut tex = Self { energy: 0.0, entropy: 0.0, contrast: 0.0 };
        for ((i, j), &n) in p.indexed_iter() {
            if n > 0.0 {
                let d = i as f64 - j as f64;
                tex.energy += n * n;
                tex.entropy += n * n.log2();
                tex.contrast += n * d * d;
            }
        }
        tex
    }

    pub fn to_array(self) -> [f64; 3] {
        [self.energy, self.entropy, self.contrast]
    }
}

/// 完整的纹理分析流程，同时返回共生矩阵的级别数
pub fn analyze(image: &RasterImage) -> (TextureFeatures, usize) {
    let gray = grayscale(image);
    let glcm = CoOccurrence::from_gray(&gray);
    let texture = TextureFeatures::from_probabilities(&glcm.normalize());
    (texture, glcm.index().len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(w: u32, h: u32) -> RasterImage {
        RasterImage::from_fn("checker", w, h, |x, y| {
            if (x + y) % 2 == 0 { [0, 0, 0] } else { [200, 200, 200] }
        })
    }

    #[test]
    fn test_grayscale_truncates() {
        // 0.299 * 255 = 76.245
        let img = RasterImage::from_fn("rgb", 3, 1, |x, _| match x {
            0 => [255, 0, 0],
            1 => [0, 255, 0],
            _ => [0, 0, 255],
        });
        let gray = grayscale(&img);
        assert_eq!(gray.dim(), (1, 3));
        assert_eq!(gray.row(0).to_vec(), vec![76, 149, 29]);
    }

    #[test]
    fn test_level_index_is_sorted_rank() {
        let gray = array![[200u8, 7, 7], [42, 200, 0]];
        let index = LevelIndex::from_gray(&gray);
        assert_eq!(index.levels(), &[0, 7, 42, 200]);
        assert_eq!(index.rank(0), 0);
        assert_eq!(index.rank(7), 1);
        assert_eq!(index.rank(42), 2);
        assert_eq!(index.rank(200), 3);
    }

    #[test]
    fn test_co_occurrence_diagonal_offset() {
        let gray = array![[1u8, 2, 3], [4, 1, 2], [5, 6, 1]];
        let glcm = CoOccurrence::from_gray(&gray);
        // 级别 [1, 2, 3, 4, 5, 6]
        assert_eq!(glcm.index().len(), 6);
        assert_eq!(glcm.total(), 4);
        let c = glcm.counts();
        assert_eq!(c[[0, 0]], 2); // (0,0)->(1,1) 与 (1,1)->(2,2)
        assert_eq!(c[[1, 1]], 1); // (0,1)->(1,2)
        assert_eq!(c[[3, 5]], 1); // (1,0)->(2,1)
    }

    #[test]
    fn test_co_occurrence_total_matches_pair_count() {
        let img = RasterImage::from_fn("noise", 13, 7, |x, y| {
            let v = ((x * 37 + y * 91) % 256) as u8;
            [v, v.wrapping_mul(3), v.wrapping_add(11)]
        });
        let glcm = CoOccurrence::from_gray(&grayscale(&img));
        assert_eq!(glcm.total(), 12 * 6);
        let sum = glcm.normalize().sum();
        assert!((sum - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_single_level_image() {
        let (tex, levels) = analyze(&RasterImage::filled("gray", 6, 4, [90, 90, 90]));
        assert_eq!(levels, 1);
        assert_eq!(tex, TextureFeatures { energy: 1.0, entropy: 0.0, contrast: 0.0 });
    }

    #[test]
    fn test_thin_image_has_no_pairs() {
        let glcm = CoOccurrence::from_gray(&grayscale(&checker(1, 5)));
        assert_eq!(glcm.total(), 0);
        assert!(glcm.normalize().iter().all(|&p| p == 0.0));
        let tex = TextureFeatures::from_probabilities(&glcm.normalize());
        assert_eq!(tex.to_array(), [0.0; 3]);
    }

    #[test]
    fn test_checkerboard_texture() {
        // 对角线方向的相邻像素颜色相同
        let (tex, levels) = analyze(&checker(9, 9));
        assert_eq!(levels, 2);
        // p = [[0.5, 0], [0, 0.5]]
        assert!((tex.energy - 0.5).abs() < 1e-12);
        assert!((tex.entropy + 1.0).abs() < 1e-12);
        assert_eq!(tex.contrast, 0.0);
    }

    #[test]
    fn test_stripes_contrast_uses_ranks() {
        // 竖条纹：偏移 (1,1) 后亮度总是交替
        let img = RasterImage::from_fn("stripes", 6, 6, |x, _| {
            if x % 2 == 0 { [10, 10, 10] } else { [250, 250, 250] }
        });
        let (tex, _) = analyze(&img);
        assert!((tex.contrast - 1.0).abs() < 1e-12);
        assert!(tex.entropy <= 0.0);
    }
}
