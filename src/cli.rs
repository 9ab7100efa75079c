//! 命令行参数

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "question-paper-gen",
    version,
    about = "Generate exam questions from a syllabus PDF and assemble question papers",
    after_help = "EXAMPLES:\n  \
                  question-paper-gen generate --syllabus syllabus.pdf --template last_year.pdf\n  \
                  question-paper-gen list --json\n  \
                  question-paper-gen paper --request request.toml --out paper.pdf\n  \
                  question-paper-gen papers --request request.toml --count 3 --seed 42"
)]
pub struct Cli {
    /// 显示详细日志（等同于 VERBOSE_LOGGING=true）
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// 使用内存题库，不读写数据库文件
    #[arg(long, global = true)]
    pub in_memory: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// 从大纲 PDF 生成题目并替换题库
    Generate {
        /// 课程大纲 PDF
        #[arg(long)]
        syllabus: PathBuf,
        /// 往年试卷模板 PDF
        #[arg(long)]
        template: Option<PathBuf>,
        /// 参考资料 PDF（可重复）
        #[arg(long)]
        reference: Vec<PathBuf>,
        /// 附加的出题要求
        #[arg(long, env = "BASE_PROMPT")]
        prompt: Option<String>,
    },
    /// 列出题库中的全部题目
    List {
        /// 以 JSON Lines 输出
        #[arg(long)]
        json: bool,
    },
    /// 按组卷请求生成一份试卷
    Paper {
        /// 组卷请求 TOML 文件
        #[arg(long)]
        request: PathBuf,
        /// 输出 PDF 路径（默认输出目录下的 question_paper.pdf）
        #[arg(long)]
        out: Option<PathBuf>,
        /// 随机抽题的种子
        #[arg(long, conflicts_with = "random")]
        seed: Option<u64>,
        /// 随机抽题（不指定种子）
        #[arg(long)]
        random: bool,
    },
    /// 按组卷请求批量生成多份试卷
    Papers {
        /// 组卷请求 TOML 文件
        #[arg(long)]
        request: PathBuf,
        /// 试卷份数（默认 PAPER_COUNT）
        #[arg(long)]
        count: Option<usize>,
        /// 随机抽题的种子
        #[arg(long)]
        seed: Option<u64>,
    },
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Generate { .. } => "出题",
            Command::List { .. } => "查看题库",
            Command::Paper { .. } => "组卷",
            Command::Papers { .. } => "批量组卷",
        }
    }
}
