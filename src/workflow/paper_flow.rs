//! 组卷流程 - 流程层
//!
//! 流程顺序：
//! 1. 校验请求（格式、总分），不读题库
//! 2. 读取题库快照
//! 3. 组卷（单份或批量）

use tracing::info;

use crate::error::AppResult;
use crate::models::{Paper, SelectionRequest};
use crate::services::{PaperAssembler, QuestionRepository, SelectionStrategy};

/// 组卷流程
#[derive(Debug, Clone, Copy, Default)]
pub struct PaperFlow {
    assembler: PaperAssembler,
}

impl PaperFlow {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读题库之前的校验
    pub fn check(&self, request: &SelectionRequest) -> AppResult<()> {
        request.validate_shape()?;
        request.validate_total()
    }

    /// 组一份试卷
    pub fn single<R>(
        &self,
        repository: &R,
        request: &SelectionRequest,
        strategy: &mut dyn SelectionStrategy,
    ) -> AppResult<Paper>
    where
        R: QuestionRepository + ?Sized,
    {
        self.check(request)?;
        let bank = repository.group_by_unit_and_marks()?;
        info!("📦 题库快照: {} 个单元, {} 道题目", bank.units().len(), bank.len());

        let paper = self.assembler.assemble(&bank, request, strategy)?;
        info!(
            "✓ 组卷完成: {} 道题, 共 {} 分 ({})",
            paper.question_count(),
            paper.total_marks(),
            strategy.name()
        );
        Ok(paper)
    }

    /// 批量组卷
    pub fn batch<R>(
        &self,
        repository: &R,
        request: &SelectionRequest,
        papers: usize,
        strategy: &mut dyn SelectionStrategy,
    ) -> AppResult<Vec<Paper>>
    where
        R: QuestionRepository + ?Sized,
    {
        self.check(request)?;
        let bank = repository.group_by_unit_and_marks()?;
        info!(
            "📦 题库快照: {} 个单元, {} 道题目, 计划组 {} 份试卷",
            bank.units().len(),
            bank.len(),
            papers
        );
        self.assembler.assemble_batch(&bank, request, papers, strategy)
    }
}
