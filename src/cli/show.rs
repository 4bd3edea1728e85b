use anyhow::Result;
use clap::Parser;

use crate::Opts;
use crate::cli::{SubCommandExtend, load_corpus};
use crate::config::{OutputFormat, ScanOptions};

#[derive(Parser, Debug, Clone)]
pub struct ShowCommand {
    #[command(flatten)]
    pub scan: ScanOptions,
    /// 图片路径或文件名
    pub image: String,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

impl SubCommandExtend for ShowCommand {
    async fn run(&self, _opts: &Opts) -> Result<()> {
        let corpus = load_corpus(&self.scan)?;
        let index = corpus.position(&self.image)?;
        let image = corpus.image(index)?;

        match self.output_format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(image)?)
            }
            OutputFormat::Table => {
                let tex = &image.texture;
                println!("图片    : {}", image.id);
                println!("序号    : {}", index);
                println!("尺寸    : {}x{}", image.width, image.height);
                println!("能量    : {:.6}", tex.energy);
                println!("熵      : {:.6}", tex.entropy);
                println!("对比度  : {:.6}", tex.contrast);
                println!("灰度级  : {}", image.glcm_levels);
                println!("颜色码  : {:?}", image.color_code.bins());
                println!("亮度    : {:?}", image.intensity.bins());
                let row = corpus.matrix().row(index);
                println!("归一化  : {:.3}", row);
            }
        }
        Ok(())
    }
}
