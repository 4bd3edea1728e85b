use serde::{Serialize, Serializer};

use crate::raster::RasterImage;

pub const COLOR_CODE_BINS: usize = 64;
pub const INTENSITY_BINS: usize = 25;

/// 亮度超过该值的像素全部归入最后一个桶
const INTENSITY_OVERFLOW: u32 = 239;
const INTENSITY_BIN_WIDTH: u32 = 10;

pub type ColorCodeHistogram = Histogram<COLOR_CODE_BINS>;
pub type IntensityHistogram = Histogram<INTENSITY_BINS>;

/// 定长计数直方图
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Histogram<const N: usize>([u64; N]);

impl<const N: usize> Histogram<N> {
    pub fn new() -> Self {
        Self([0; N])
    }

    #[inline(always)]
    pub fn inc(&mut self, bin: usize) {
        self.0[bin] += 1;
    }

    pub fn bins(&self) -> &[u64; N] {
        &self.0
    }

    pub fn total(&self) -> u64 {
        self.0.iter().sum()
    }

    /// 按图片面积归一化后的各桶占比
    pub fn proportions(&self, area: u64) -> impl Iterator<Item = f64> + '_ {
        let area = area.max(1) as f64;
        self.0.iter().map(move |&c| c as f64 / area)
    }
}

impl<const N: usize> Default for Histogram<N> {
    fn default() -> Self {
        Self::new()
    }
}

// serde 不支持长度超过 32 的数组
impl<const N: usize> Serialize for Histogram<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.0.iter())
    }
}

/// 亮度 0.299R + 0.587G + 0.114B 的千分之一定点表示
#[inline(always)]
pub(crate) fn luma_milli([r, g, b]: [u8; 3]) -> u32 {
    299 * r as u32 + 587 * g as u32 + 114 * b as u32
}

/// 每个通道取最高两位，拼成 6 位颜色码
#[inline(always)]
pub fn color_code([r, g, b]: [u8; 3]) -> usize {
    (((r >> 6) << 4) | ((g >> 6) << 2) | (b >> 6)) as usize
}

/// 亮度四舍五入后每 10 个级别一个桶，大于 239 的进入溢出桶
#[inline(always)]
pub fn intensity_bin(rgb: [u8; 3]) -> usize {
    let luma = (luma_milli(rgb) + 500) / 1000;
    if luma > INTENSITY_OVERFLOW {
        INTENSITY_BINS - 1
    } else {
        (luma / INTENSITY_BIN_WIDTH) as usize
    }
}

/// 一次遍历同时计算颜色码直方图与亮度直方图
pub fn encode(image: &RasterImage) -> (ColorCodeHistogram, IntensityHistogram) {
    let mut cc = ColorCodeHistogram::new();
    let mut inten = IntensityHistogram::new();
    for pix in image.pixels() {
        cc.inc(color_code(pix));
        inten.inc(intensity_bin(pix));
    }
    (cc, inten)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_code_uses_two_msb() {
        assert_eq!(color_code([0, 0, 0]), 0);
        assert_eq!(color_code([255, 255, 255]), 63);
        assert_eq!(color_code([0xC0, 0, 0]), 0b110000);
        assert_eq!(color_code([0, 0x80, 0x40]), 0b001001);
        assert_eq!(color_code([0x3F, 0x7F, 0xBF]), 0b000110);
    }

    #[test]
    fn test_intensity_bin_boundaries() {
        assert_eq!(intensity_bin([0, 0, 0]), 0);
        assert_eq!(intensity_bin([9, 9, 9]), 0);
        assert_eq!(intensity_bin([10, 10, 10]), 1);
        assert_eq!(intensity_bin([239, 239, 239]), 23);
        assert_eq!(intensity_bin([240, 240, 240]), 24);
        assert_eq!(intensity_bin([255, 255, 255]), 24);
        // 0.299 * 255 = 76.245，四舍五入为 76
        assert_eq!(intensity_bin([255, 0, 0]), 7);
        // 0.587 * 255 = 149.685，四舍五入为 150
        assert_eq!(intensity_bin([0, 255, 0]), 15);
    }

    #[test]
    fn test_encode_counts_every_pixel() {
        let img = RasterImage::from_fn("grad", 17, 9, |x, y| {
            [(x * 15) as u8, (y * 28) as u8, ((x + y) * 10) as u8]
        });
        let (cc, inten) = encode(&img);
        assert_eq!(cc.total(), img.area());
        assert_eq!(inten.total(), img.area());
    }

    #[test]
    fn test_encode_uniform_image() {
        let img = RasterImage::filled("red", 4, 5, [255, 0, 0]);
        let (cc, inten) = encode(&img);
        assert_eq!(cc.bins()[48], 20);
        assert_eq!(inten.bins()[7], 20);
        let props = cc.proportions(img.area()).collect::<Vec<_>>();
        assert_eq!(props[48], 1.0);
        assert_eq!(props.iter().sum::<f64>(), 1.0);
    }

    #[test]
    fn test_histogram_serializes_as_list() {
        let mut h = Histogram::<40>::new();
        h.inc(39);
        let json = serde_json::to_string(&h).unwrap();
        assert!(json.starts_with("[0,0,"));
        assert!(json.ends_with(",1]"));
    }
}
