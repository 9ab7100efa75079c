//! # Question Paper Generator
//!
//! 从课程大纲 PDF 生成题目、存入题库，再按要求组卷并输出 PDF
//!
//! ## 架构设计
//!
//! 本系统采用严格的四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 持有稀缺资源，只暴露能力
//! - `pdf_reader` - PDF 文本提取
//! - `PaperRenderer` - 试卷 PDF 渲染
//! - `SqliteQuestionStore` - 唯一的数据库连接持有者
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `UnitSegmenter` - 大纲单元切分
//! - `PromptBuilder` / `TemplateAnalyzer` - 出题提示词
//! - `LlmService` / `OllamaClient` - 文本生成能力
//! - `ResponseParser` - LLM 输出解析
//! - `QuestionRepository` - 题库读写接口
//! - `PaperAssembler` / `SelectionStrategy` - 组卷
//!
//! ### ③ 流程层（Workflow）
//! - `GenerationFlow` - 大纲 → 提示词 → LLM → 解析 → 题库
//! - `PaperFlow` - 请求校验 → 题库快照 → 组卷
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 命令调度和并发渲染
//!
//! ## 模块结构

pub mod cli;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{Paper, Question, QuestionBank, SelectionRequest, Unit};
pub use orchestrator::App;
pub use services::{PaperAssembler, QuestionRepository, TextGenerator};
pub use workflow::{GenerationFlow, GenerationInput, PaperFlow};
