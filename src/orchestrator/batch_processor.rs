//! 应用编排 - 编排层
//!
//! ## 职责
//!
//! 本模块是整个应用的入口，负责资源管理和命令调度。
//!
//! ## 核心功能
//!
//! 1. **应用初始化**：写日志文件头、打开题库
//! 2. **出题**：提取 PDF 文本，交给 `GenerationFlow`
//! 3. **组卷**：加载请求，交给 `PaperFlow`
//! 4. **并发渲染**：使用 Semaphore 限制同时渲染的 PDF 数量
//! 5. **全局统计**：汇总渲染结果
//!
//! 选题在渲染之前顺序完成，固定种子时输出可复现

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::join_all;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::cli::Command;
use crate::config::Config;
use crate::error::AppError;
use crate::infrastructure::{pdf_reader, PaperRenderer, SqliteQuestionStore};
use crate::models::{load_selection_request, Paper};
use crate::services::{
    Generator, InMemoryQuestionRepository, InOrder, QuestionRepository, SelectionStrategy,
    Shuffled,
};
use crate::utils::logging::{
    append_log_line, init_log_file, log_generation_complete, log_startup, print_final_stats,
    truncate_text,
};
use crate::workflow::{GenerationFlow, GenerationInput, PaperFlow};

/// 应用主结构
pub struct App {
    config: Config,
    repository: Arc<dyn QuestionRepository>,
    renderer: PaperRenderer,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config, in_memory: bool) -> Result<Self> {
        init_log_file(&config.output_log_file)?;

        let repository: Arc<dyn QuestionRepository> = if in_memory {
            info!("🧪 使用内存题库（不会持久化）");
            Arc::new(InMemoryQuestionRepository::new())
        } else {
            Arc::new(
                SqliteQuestionStore::open(&config.database_path)
                    .with_context(|| format!("无法打开题库: {}", config.database_path))?,
            )
        };

        Ok(Self::with_repository(config, repository))
    }

    /// 使用指定题库创建应用
    pub fn with_repository(config: Config, repository: Arc<dyn QuestionRepository>) -> Self {
        Self {
            config,
            repository,
            renderer: PaperRenderer::new(),
        }
    }

    /// 执行一个命令
    pub async fn run(&self, command: Command) -> Result<()> {
        log_startup(command.name(), &self.config);

        let result = self.dispatch(command).await;
        if let Err(err) = &result {
            if is_user_failure(err) {
                warn!("⚠️ 请求无法完成: {:#}", err);
            } else {
                error!("❌ 执行失败: {:#}", err);
            }
        }
        result
    }

    async fn dispatch(&self, command: Command) -> Result<()> {
        match command {
            Command::Generate {
                syllabus,
                template,
                reference,
                prompt,
            } => {
                let input = self
                    .read_materials(&syllabus, template.as_deref(), &reference, prompt)
                    .await?;
                self.generate(&Generator::from_config(&self.config), input)
                    .await
            }
            Command::List { json } => self.list(json),
            Command::Paper {
                request,
                out,
                seed,
                random,
            } => {
                let mut strategy = strategy_for(seed, random);
                let out = out.unwrap_or_else(|| {
                    Path::new(&self.config.output_dir).join("question_paper.pdf")
                });
                self.paper(&request, &out, strategy.as_mut()).await
            }
            Command::Papers {
                request,
                count,
                seed,
            } => {
                // 批量组卷默认随机，否则每份试卷都相同
                let mut strategy = strategy_for(seed, true);
                let count = count.unwrap_or(self.config.paper_count);
                if count == 0 {
                    return Err(AppError::InvalidRequest("试卷份数必须大于 0".to_string()).into());
                }
                self.papers(&request, count, strategy.as_mut()).await
            }
        }
    }

    /// 读取出题材料
    async fn read_materials(
        &self,
        syllabus: &Path,
        template: Option<&Path>,
        references: &[PathBuf],
        base_prompt: Option<String>,
    ) -> Result<GenerationInput> {
        info!("\n📁 正在读取 PDF...");
        let syllabus_text = pdf_reader::extract_text(syllabus).await?;

        let template_text = match template {
            Some(path) => Some(pdf_reader::extract_text(path).await?),
            None => None,
        };

        let mut reference_texts = Vec::with_capacity(references.len());
        for path in references {
            reference_texts.push(pdf_reader::extract_text(path).await?);
        }

        Ok(GenerationInput {
            syllabus_text,
            template_text,
            reference_texts,
            base_prompt,
        })
    }

    /// 出题并替换题库
    pub async fn generate(&self, generator: &Generator, input: GenerationInput) -> Result<()> {
        let flow = GenerationFlow::new(
            self.config.four_mark_per_unit,
            self.config.six_mark_per_unit,
        );

        let report = flow
            .run(generator, self.repository.as_ref(), &input)
            .await
            .context("出题失败")?;

        log_generation_complete(report.units.len(), report.stored, report.skipped_lines);
        append_log_line(
            &self.config.output_log_file,
            &format!("出题: {} 个单元, {} 道题目", report.units.len(), report.stored),
        )?;
        Ok(())
    }

    /// 列出题库
    fn list(&self, json: bool) -> Result<()> {
        let rows = self.repository.list_all()?;
        if rows.is_empty() {
            warn!("⚠️ 题库为空，请先运行 generate");
            return Ok(());
        }

        for row in &rows {
            if json {
                println!("{}", serde_json::to_string(row)?);
            } else {
                println!(
                    "{:>4}  {:<10} {:>2} 分  {}",
                    row.id,
                    row.question.unit,
                    row.question.marks,
                    truncate_text(&row.question.display_text(), 90)
                );
            }
        }
        info!("共 {} 道题目", rows.len());
        Ok(())
    }

    /// 生成一份试卷
    async fn paper(
        &self,
        request_path: &Path,
        out: &Path,
        strategy: &mut dyn SelectionStrategy,
    ) -> Result<()> {
        let request = load_selection_request(request_path).await?;
        let paper = PaperFlow::new()
            .single(self.repository.as_ref(), &request, strategy)
            .context("组卷失败")?;

        let renderer = self.renderer.clone();
        let target = out.to_path_buf();
        tokio::task::spawn_blocking(move || renderer.write_to(&paper, &target))
            .await
            .context("渲染任务异常退出")??;

        info!("📄 试卷已保存: {}", out.display());
        append_log_line(&self.config.output_log_file, &format!("试卷: {}", out.display()))?;
        Ok(())
    }

    /// 批量生成试卷
    async fn papers(
        &self,
        request_path: &Path,
        count: usize,
        strategy: &mut dyn SelectionStrategy,
    ) -> Result<()> {
        let request = load_selection_request(request_path).await?;
        let papers = PaperFlow::new()
            .batch(self.repository.as_ref(), &request, count, strategy)
            .context("组卷失败")?;

        let total = papers.len();
        let written = self.render_all(papers).await?;

        for path in &written {
            append_log_line(&self.config.output_log_file, &format!("试卷: {}", path.display()))?;
        }
        print_final_stats(
            written.len(),
            total - written.len(),
            total,
            &self.config.output_log_file,
        );

        if written.len() < total {
            anyhow::bail!("{} 份试卷渲染失败", total - written.len());
        }
        Ok(())
    }

    /// 并发渲染，返回成功写入的文件
    async fn render_all(&self, papers: Vec<Paper>) -> Result<Vec<PathBuf>> {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrent_renders));
        let output_dir = PathBuf::from(&self.config.output_dir);
        let mut handles = Vec::with_capacity(papers.len());

        for paper in papers {
            let permit = semaphore.clone().acquire_owned().await?;
            let renderer = self.renderer.clone();
            let path = output_dir.join(paper.file_name());
            let number = paper.number;

            let handle = tokio::task::spawn_blocking(move || {
                let _permit = permit;
                renderer.write_to(&paper, &path).map(|_| path)
            });
            handles.push((number, handle));
        }

        let results = join_all(handles.into_iter().map(|(number, handle)| async move {
            (number, handle.await)
        }))
        .await;

        let mut written = Vec::new();
        for (number, result) in results {
            match result {
                Ok(Ok(path)) => {
                    info!("[试卷 {}] 📄 已保存: {}", number, path.display());
                    written.push(path);
                }
                Ok(Err(e)) => error!("[试卷 {}] ❌ 渲染失败: {}", number, e),
                Err(e) => error!("[试卷 {}] 任务执行失败: {}", number, e),
            }
        }
        Ok(written)
    }
}

/// 失败是否由请求本身引起（可由调用方修正）
fn is_user_failure(err: &anyhow::Error) -> bool {
    err.chain()
        .find_map(|cause| cause.downcast_ref::<AppError>())
        .map_or(false, AppError::is_user_error)
}

/// 根据参数选择选题策略
fn strategy_for(seed: Option<u64>, random: bool) -> Box<dyn SelectionStrategy> {
    match (seed, random) {
        (Some(seed), _) => Box::new(Shuffled::seeded(seed)),
        (None, true) => Box::new(Shuffled::from_entropy()),
        (None, false) => Box::new(InOrder),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;
    use crate::services::question_repository::bank_of;

    fn app(dir: &Path) -> App {
        let config = Config {
            output_dir: dir.join("papers").to_string_lossy().into_owned(),
            output_log_file: dir.join("output.txt").to_string_lossy().into_owned(),
            max_concurrent_renders: 2,
            ..Config::default()
        };
        let repository = Arc::new(InMemoryQuestionRepository::new());
        repository
            .replace_all(&bank_of(
                (0..4).map(|i| Question::new("Unit 1", format!("Question {}", i), 4)),
            ))
            .unwrap();
        init_log_file(&config.output_log_file).unwrap();
        App::with_repository(config, repository)
    }

    #[test]
    fn test_strategy_for_flags() {
        assert_eq!(strategy_for(None, false).name(), "in-order");
        assert_eq!(strategy_for(Some(3), false).name(), "shuffled");
        assert_eq!(strategy_for(None, true).name(), "shuffled");
    }

    #[tokio::test]
    async fn test_papers_command_writes_numbered_files() {
        let dir = tempfile::tempdir().unwrap();
        let request = dir.path().join("request.toml");
        std::fs::write(
            &request,
            "total_marks = 8\n[[units]]\nunit = \"Unit 1\"\nquestions = [{ marks = 4, count = 2 }]\n",
        )
        .unwrap();

        let app = app(dir.path());
        app.run(Command::Papers {
            request,
            count: Some(3),
            seed: Some(42),
        })
        .await
        .unwrap();

        for n in 1..=3 {
            let path = dir.path().join("papers").join(format!("question_paper_{}.pdf", n));
            assert!(path.exists(), "missing {}", path.display());
        }
    }

    #[tokio::test]
    async fn test_paper_command_reports_mismatch() {
        let dir = tempfile::tempdir().unwrap();
        let request = dir.path().join("request.toml");
        std::fs::write(
            &request,
            "total_marks = 9\n[[units]]\nunit = \"Unit 1\"\nquestions = [{ marks = 4, count = 2 }]\n",
        )
        .unwrap();

        let err = app(dir.path())
            .run(Command::Paper {
                request,
                out: None,
                seed: None,
                random: false,
            })
            .await
            .unwrap_err();

        let app_err = err.downcast_ref::<AppError>().unwrap();
        assert!(matches!(app_err, AppError::MarksMismatch { expected: 9, got: 8 }));
        assert!(is_user_failure(&err));
    }

    #[tokio::test]
    async fn test_papers_command_rejects_zero_count() {
        let dir = tempfile::tempdir().unwrap();
        let request = dir.path().join("request.toml");
        std::fs::write(
            &request,
            "total_marks = 8\n[[units]]\nunit = \"Unit 1\"\nquestions = [{ marks = 4, count = 2 }]\n",
        )
        .unwrap();

        let err = app(dir.path())
            .run(Command::Papers {
                request,
                count: Some(0),
                seed: Some(1),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::InvalidRequest(_))
        ));
        assert!(is_user_failure(&err));
        assert!(!dir.path().join("papers").exists());
    }

    #[test]
    fn test_storage_failure_is_not_a_user_failure() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = anyhow::Error::new(AppError::storage("replace_all", io)).context("出题失败");
        assert!(!is_user_failure(&err));

        let err = anyhow::Error::new(AppError::UnknownUnit("Unit 9".to_string())).context("组卷失败");
        assert!(is_user_failure(&err));

        assert!(!is_user_failure(&anyhow::anyhow!("渲染任务异常退出")));
    }
}
