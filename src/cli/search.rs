use std::time::Instant;

use anyhow::Result;
use clap::Parser;
use log::debug;
use serde::Serialize;

use crate::cli::{SubCommandExtend, load_corpus};
use crate::config::{OutputFormat, ScanOptions, SearchOptions};
use crate::distance::{DistanceRanking, QueryMode};
use crate::session::Session;
use crate::{Corpus, Opts};

#[derive(Parser, Debug, Clone)]
pub struct SearchCommand {
    #[command(flatten)]
    pub scan: ScanOptions,
    #[command(flatten)]
    pub search: SearchOptions,
    /// 被搜索的图片，可以是完整路径或文件名
    pub image: String,
    /// 查询方式
    #[arg(short, long, value_enum, default_value_t = QueryMode::RelAll)]
    pub mode: QueryMode,
    /// 标记为相关的图片，可多次指定
    #[arg(short, long, value_name = "IMAGE")]
    pub relevant: Vec<String>,
    /// 标记为不相关的图片，可多次指定
    #[arg(short = 'R', long, value_name = "IMAGE")]
    pub irrelevant: Vec<String>,
    /// 开启相关反馈（指定了相关或不相关图片时自动开启）
    #[arg(long)]
    pub feedback: bool,
}

impl SubCommandExtend for SearchCommand {
    async fn run(&self, _opts: &Opts) -> Result<()> {
        let corpus = load_corpus(&self.scan)?;
        let mut session = Session::new(corpus);

        let feedback = self.feedback || !self.relevant.is_empty() || !self.irrelevant.is_empty();
        session.set_feedback(feedback);
        for name in &self.relevant {
            let index = session.corpus().position(name)?;
            session.record_relevance(index, true)?;
        }
        for name in &self.irrelevant {
            let index = session.corpus().position(name)?;
            session.record_relevance(index, false)?;
        }

        let start = Instant::now();
        let mut ranking = session.query_by_id(&self.image, self.mode)?;
        debug!("查询耗时: {:.2}ms", start.elapsed().as_secs_f64() * 1000.0);

        if self.search.count > 0 {
            ranking.truncate(self.search.count);
        }
        print_result(session.corpus(), &ranking, self.search.output_format)
    }
}

#[derive(Serialize)]
struct ResultRow<'a> {
    index: usize,
    id: &'a str,
    distance: f64,
}

fn print_result(corpus: &Corpus, ranking: &DistanceRanking, format: OutputFormat) -> Result<()> {
    let rows = ranking
        .iter()
        .map(|r| ResultRow {
            index: r.index,
            id: &corpus.images()[r.index].id,
            distance: r.distance,
        })
        .collect::<Vec<_>>();
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&rows)?)
        }
        OutputFormat::Table => {
            for row in rows {
                println!("{:.4}\t{}", row.distance, row.id);
            }
        }
    }
    Ok(())
}
