use std::fs;
use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use log::info;
use ndarray_npy::write_npy;

use crate::Opts;
use crate::cli::{SubCommandExtend, load_corpus};
use crate::config::ScanOptions;

#[derive(Parser, Debug, Clone)]
pub struct ExportCommand {
    #[command(flatten)]
    pub scan: ScanOptions,
    /// 输出目录，写入 features.npy 与 images.json
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,
}

impl SubCommandExtend for ExportCommand {
    async fn run(&self, _opts: &Opts) -> Result<()> {
        let corpus = load_corpus(&self.scan)?;

        fs::create_dir_all(&self.output)?;
        let npy = self.output.join("features.npy");
        write_npy(&npy, &corpus.matrix().view())?;

        let ids = corpus.images().iter().map(|img| img.id.as_str()).collect::<Vec<_>>();
        fs::write(self.output.join("images.json"), serde_json::to_string_pretty(&ids)?)?;

        info!("导出完成: {}", npy.display());
        Ok(())
    }
}
