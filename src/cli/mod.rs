mod export;
mod search;
mod show;

pub use export::*;
pub use search::*;
pub use show::*;

use anyhow::Result;
use log::info;
use tokio::task::block_in_place;

use crate::config::{Opts, ScanOptions};
use crate::corpus::{Corpus, Extractor};
use crate::raster::{DirectorySource, RasterSource};
use crate::utils::{pb_style, pb_style_speed, progress_bar};

pub trait SubCommandExtend {
    fn run(&self, opts: &Opts) -> impl std::future::Future<Output = anyhow::Result<()>> + Send;
}

/// 扫描目录、解码并提取整个图库的特征
pub fn load_corpus(scan: &ScanOptions) -> Result<Corpus> {
    block_in_place(|| {
        let decode_pb = progress_bar(scan.quiet, pb_style_speed());
        let source =
            DirectorySource::new(&scan.path, &scan.suffix)?.with_progress(decode_pb.clone());
        let images = source.load()?;
        decode_pb.finish_and_clear();

        let extract_pb = progress_bar(scan.quiet, pb_style());
        let corpus = Extractor::new().with_progress(extract_pb.clone()).extract(&images)?;
        extract_pb.finish_and_clear();

        info!("图库加载完成，共 {} 张图片", corpus.len());
        Ok(corpus)
    })
}
