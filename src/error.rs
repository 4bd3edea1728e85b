use thiserror::Error;

/// 检索引擎的错误类型
#[derive(Debug, Error)]
pub enum Error {
    /// 图库中没有任何可用图片
    #[error("图库为空，无法提取特征")]
    EmptyCorpus,
    /// 选中的图片序号超出图库范围
    #[error("无效的图片序号 {index}，图库共 {len} 张图片")]
    InvalidSelection { index: usize, len: usize },
    /// 按名称查找图片失败
    #[error("图库中找不到图片: {0}")]
    UnknownImage(String),
    /// 特征提取被取消
    #[error("特征提取已取消")]
    Cancelled,
    /// 像素缓冲区与宽高不匹配
    #[error("图片 {id} 的像素数据长度为 {actual}，应为 {expected}")]
    InvalidRaster { id: String, expected: usize, actual: usize },
    #[error("图片解码失败: {0}")]
    Decode(#[from] image::ImageError),
    #[error("无效的后缀匹配规则: {0}")]
    Pattern(#[from] regex::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
