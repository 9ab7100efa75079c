use anyhow::Result;
use clap::Parser;

use question_paper_gen::cli::Cli;
use question_paper_gen::orchestrator::App;
use question_paper_gen::{logger, Config};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let config = Config::from_env();

    // 初始化日志
    logger::init(cli.verbose || config.verbose_logging);

    // 初始化并运行应用
    App::initialize(config, cli.in_memory)
        .await?
        .run(cli.command)
        .await
}
