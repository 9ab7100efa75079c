//! 出题流程 - 流程层
//!
//! 流程顺序：
//! 1. 大纲文本 → 单元切分（没有单元立即失败）
//! 2. 模板/参考资料 → 提示词
//! 3. 调用 LLM → 解析输出
//! 4. 一道题都没解析出来 → 上游失败；否则整体替换题库

use tracing::{debug, info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{QuestionBank, Unit};
use crate::services::{
    PromptBuilder, PromptInput, QuestionRepository, ResponseParser, TemplateAnalyzer,
    TextGenerator, UnitSegmenter,
};
use crate::utils::logging::truncate_text;

/// 出题所需的原始材料（均为已提取的文本）
#[derive(Debug, Clone, Default)]
pub struct GenerationInput {
    pub syllabus_text: String,
    pub template_text: Option<String>,
    pub reference_texts: Vec<String>,
    pub base_prompt: Option<String>,
}

/// 出题结果统计
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub units: Vec<Unit>,
    pub bank: QuestionBank,
    pub stored: usize,
    pub skipped_lines: usize,
}

/// 出题流程
///
/// - 不持有任何资源，生成器和题库由调用方注入
/// - 题库只在解析成功后才被替换
pub struct GenerationFlow {
    segmenter: UnitSegmenter,
    template_analyzer: TemplateAnalyzer,
    prompt_builder: PromptBuilder,
}

impl GenerationFlow {
    pub fn new(four_mark_per_unit: usize, six_mark_per_unit: usize) -> Self {
        Self {
            segmenter: UnitSegmenter::new(),
            template_analyzer: TemplateAnalyzer::new(),
            prompt_builder: PromptBuilder::new(four_mark_per_unit, six_mark_per_unit),
        }
    }

    pub async fn run<G, R>(
        &self,
        generator: &G,
        repository: &R,
        input: &GenerationInput,
    ) -> AppResult<GenerationReport>
    where
        G: TextGenerator,
        R: QuestionRepository + ?Sized,
    {
        // ========== 1. 单元切分 ==========
        let units = self.segmenter.require_units(&input.syllabus_text)?;
        info!("📚 大纲中识别到 {} 个单元", units.len());
        for (unit, body) in self.segmenter.sections(&input.syllabus_text, &units) {
            debug!("  {} ({} 字符)", unit, body.len());
        }

        // ========== 2. 构建提示词 ==========
        let template = input.template_text.as_deref().map(|text| {
            let info = self.template_analyzer.analyze(text);
            info!(
                "📐 模板分析: {} 个题型, 分值 {:?}",
                info.question_patterns.len(),
                info.mark_values()
            );
            info
        });
        let reference = input.reference_texts.join("\n\n");

        let system_prompt = self.prompt_builder.system_prompt();
        let user_prompt = self.prompt_builder.user_prompt(&PromptInput {
            units: &units,
            syllabus_text: &input.syllabus_text,
            template: template.as_ref(),
            reference_text: Some(reference.as_str()),
            base_prompt: input.base_prompt.as_deref(),
        });
        debug!("用户提示词长度: {} 字符", user_prompt.len());

        // ========== 3. 调用 LLM 并解析 ==========
        info!("🤖 正在调用 {} 生成题目...", generator.provider());
        let response = generator.generate(&system_prompt, &user_prompt).await?;
        debug!("LLM 输出预览: {}", truncate_text(&response, 200));

        let outcome = ResponseParser::new().with_units(&units).parse(&response);
        if outcome.recognized() == 0 {
            return Err(AppError::upstream(
                generator.provider(),
                format!(
                    "输出中没有可识别的题目 ({} 行无法识别)",
                    outcome.unrecognized.len()
                ),
            ));
        }
        if !outcome.unrecognized.is_empty() {
            warn!("⚠️ 跳过 {} 行无法识别的输出", outcome.unrecognized.len());
        }
        for unit in &units {
            if outcome.bank.unit(&unit.id).is_none() {
                warn!("⚠️ {} 没有生成任何题目", unit.id);
            }
        }

        // ========== 4. 替换题库 ==========
        let stored = repository.replace_all(&outcome.bank)?;
        info!("✓ 已写入 {} 道题目", stored);

        Ok(GenerationReport {
            units,
            bank: outcome.bank,
            stored,
            skipped_lines: outcome.unrecognized.len(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Question;
    use crate::services::question_repository::bank_of;
    use crate::services::InMemoryQuestionRepository;
    use std::sync::Mutex;

    /// 返回固定文本的生成器，并记录收到的提示词
    struct Scripted {
        reply: String,
        seen: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn replying(text: &str) -> Self {
            Self {
                reply: text.to_string(),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl TextGenerator for Scripted {
        fn provider(&self) -> &str {
            "scripted"
        }

        async fn generate(&self, _system: &str, user: &str) -> AppResult<String> {
            self.seen.lock().unwrap().push(user.to_string());
            Ok(self.reply.clone())
        }
    }

    fn input(syllabus: &str) -> GenerationInput {
        GenerationInput {
            syllabus_text: syllabus.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_no_units_fails_before_calling_llm() {
        let generator = Scripted::replying("1. unused (4 marks)");
        let repo = InMemoryQuestionRepository::new();

        let result = GenerationFlow::new(3, 3)
            .run(&generator, &repo, &input("just prose, no headings"))
            .await;

        assert!(matches!(result, Err(AppError::NoUnitsFound)));
        assert!(generator.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unparseable_reply_keeps_existing_bank() {
        let repo = InMemoryQuestionRepository::new();
        repo.replace_all(&bank_of(vec![Question::new("Unit 1", "old", 4)]))
            .unwrap();

        let generator = Scripted::replying("Sorry, I cannot help with that.");
        let result = GenerationFlow::new(3, 3)
            .run(&generator, &repo, &input("Unit 1: Sets"))
            .await;

        assert!(matches!(result, Err(AppError::UpstreamGenerationFailure { .. })));
        assert_eq!(repo.list_all().unwrap()[0].question.text, "old");
    }

    #[tokio::test]
    async fn test_reply_is_parsed_and_stored() {
        let generator = Scripted::replying(
            "Here are your questions:\n\
             Unit 1:\n\
             1. Define a set. [CO:1] [BT:1] (4 marks).\n\
             2. Prove De Morgan's law. [CO:1] [BT:3] (6 marks).\n\
             **Unit 2 - Graphs:**\n\
             1. What is a tree? [CO:2] [BT:2] (4 marks).\n",
        );
        let repo = InMemoryQuestionRepository::new();

        let mut material = input("Unit 1: Sets\nunions\nUnit 2: Graphs\ntrees");
        material.template_text = Some("SECTION-A\n1. Define X (4 marks)".to_string());
        material.reference_texts = vec!["Rosen, chapter 2".to_string()];

        let report = GenerationFlow::new(1, 1)
            .run(&generator, &repo, &material)
            .await
            .unwrap();

        assert_eq!(report.units.len(), 2);
        assert_eq!(report.stored, 3);
        assert_eq!(report.skipped_lines, 1);

        let bank = repo.group_by_unit_and_marks().unwrap();
        assert_eq!(bank.unit("Unit 2").unwrap().bucket(4)[0].text, "What is a tree?");

        let prompt = generator.seen.lock().unwrap()[0].clone();
        assert!(prompt.contains("Template Structure"));
        assert!(prompt.contains("Rosen, chapter 2"));
    }
}
