use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::cli::*;

#[derive(Parser, Debug, Clone)]
pub struct ScanOptions {
    /// 图库所在目录
    pub path: PathBuf,
    /// 扫描的文件后缀名，多个后缀用逗号分隔
    #[arg(short, long, default_value = "jpg,jpeg,png")]
    pub suffix: String,
    /// 不显示进度条
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// 显示的结果数量，0 表示全部
    #[arg(long, value_name = "COUNT", default_value_t = 10)]
    pub count: usize,
    /// 输出格式
    #[arg(long, value_name = "FORMAT", value_enum, default_value_t = OutputFormat::Table)]
    pub output_format: OutputFormat,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "imrank", version)]
pub struct Opts {
    #[command(subcommand)]
    pub subcmd: SubCommand,
    /// 特征提取使用的线程数
    #[arg(short = 'j', long, global = true, default_value_t = num_cpus::get())]
    pub threads: usize,
}

#[derive(Subcommand, Debug, Clone)]
pub enum SubCommand {
    /// 以图搜图，可附带相关反馈
    Search(SearchCommand),
    /// 查看单张图片的特征
    Show(ShowCommand),
    /// 导出归一化后的特征矩阵
    Export(ExportCommand),
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Table,
}
