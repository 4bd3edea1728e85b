use clap::Parser;
use log::debug;

use imrank::Opts;
use imrank::cli::SubCommandExtend;
use imrank::config::SubCommand;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let opts = Opts::parse();

    rayon::ThreadPoolBuilder::new().num_threads(opts.threads).build_global()?;
    debug!("特征提取线程数: {}", opts.threads);

    match &opts.subcmd {
        SubCommand::Search(config) => config.run(&opts).await,
        SubCommand::Show(config) => config.run(&opts).await,
        SubCommand::Export(config) => config.run(&opts).await,
    }
}
