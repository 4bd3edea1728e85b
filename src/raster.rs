use std::path::{Path, PathBuf};

use image::RgbImage;
use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{info, warn};
use rayon::prelude::*;
use regex::Regex;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// 解码后的 RGB8 图片，像素按行优先排列
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterImage {
    id: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterImage {
    pub fn new(id: impl Into<String>, width: u32, height: u32, pixels: Vec<u8>) -> Result<Self> {
        let id = id.into();
        let expected = width as usize * height as usize * 3;
        if pixels.len() != expected {
            return Err(Error::InvalidRaster { id, expected, actual: pixels.len() });
        }
        Ok(Self { id, width, height, pixels })
    }

    /// 按坐标 (x, y) 生成每个像素
    pub fn from_fn<F>(id: impl Into<String>, width: u32, height: u32, mut f: F) -> Self
    where
        F: FnMut(u32, u32) -> [u8; 3],
    {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 3);
        for y in 0..height {
            for x in 0..width {
                pixels.extend_from_slice(&f(x, y));
            }
        }
        Self { id: id.into(), width, height, pixels }
    }

    /// 纯色图片
    pub fn filled(id: impl Into<String>, width: u32, height: u32, rgb: [u8; 3]) -> Self {
        Self::from_fn(id, width, height, |_, _| rgb)
    }

    pub fn from_rgb(id: impl Into<String>, image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self { id: id.into(), width, height, pixels: image.into_raw() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 3] {
        let i = (y as usize * self.width as usize + x as usize) * 3;
        [self.pixels[i], self.pixels[i + 1], self.pixels[i + 2]]
    }

    /// 按行优先顺序遍历所有像素
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.pixels.chunks_exact(3).map(|p| [p[0], p[1], p[2]])
    }
}

/// 图片来源，负责把文件解码为 [`RasterImage`]
///
/// 无法解码的图片直接跳过，返回的列表顺序即为图库序号。
pub trait RasterSource {
    fn load(&self) -> Result<Vec<RasterImage>>;
}

impl RasterSource for Vec<RasterImage> {
    fn load(&self) -> Result<Vec<RasterImage>> {
        Ok(self.clone())
    }
}

/// 扫描目录中的图片文件
pub struct DirectorySource {
    root: PathBuf,
    suffix: Regex,
    progress: ProgressBar,
}

impl DirectorySource {
    /// `suffix` 为逗号分隔的后缀名列表，大小写不敏感
    pub fn new(root: impl Into<PathBuf>, suffix: &str) -> Result<Self> {
        let re = format!("(?i)^({})$", suffix.replace(',', "|"));
        Ok(Self { root: root.into(), suffix: Regex::new(&re)?, progress: ProgressBar::hidden() })
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    fn scan(&self) -> Vec<PathBuf> {
        let mut entries = WalkDir::new(&self.root)
            .into_iter()
            .filter_map(|entry| {
                let entry = entry.ok()?;
                let path = entry.path();
                if !path.is_file() {
                    return None;
                }
                let ext = path.extension()?;
                self.suffix.is_match(&ext.to_string_lossy()).then(|| path.to_path_buf())
            })
            .collect::<Vec<_>>();
        // 按路径排序，保证多次运行的图库序号一致
        entries.sort();
        entries
    }
}

impl RasterSource for DirectorySource {
    fn load(&self) -> Result<Vec<RasterImage>> {
        info!("开始扫描目录: {}", self.root.display());
        let entries = self.scan();
        info!("扫描完成，共 {} 张图片", entries.len());

        self.progress.set_length(entries.len() as u64);
        self.progress.set_message("解码图片");

        let images = entries
            .par_iter()
            .progress_with(self.progress.clone())
            .map(|path| match decode_file(path) {
                Ok(image) => Some(image),
                Err(e) => {
                    warn!("跳过无法解码的图片 {}: {}", path.display(), e);
                    None
                }
            })
            .collect::<Vec<_>>();

        Ok(images.into_iter().flatten().collect())
    }
}

pub fn decode_file(path: &Path) -> Result<RasterImage> {
    let image = image::open(path)?.to_rgb8();
    Ok(RasterImage::from_rgb(path.to_string_lossy(), image))
}
