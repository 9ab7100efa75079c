//! 组卷服务 - 业务能力层
//!
//! 根据题库快照和组卷请求挑选题目，只读，不修改题库
//!
//! ## 校验顺序（遇到第一个错误立即返回）
//! 1. 声明总分 = Σ 数量 × 分值
//! 2. 按请求顺序检查每个 (单元, 分值)：单元存在、题目数量足够
//!
//! 同一单元在请求中出现多次时，同一分值的需求会累加后再与题库数量比较，
//! 保证一份试卷中不会出现重复题目。

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};
use crate::models::{Paper, PaperSection, Question, QuestionBank, SelectionRequest};
use crate::services::selection::SelectionStrategy;

/// (单元, 分值) 的累计需求
struct Demand<'a> {
    unit: &'a str,
    marks: u32,
    requested: usize,
}

/// 组卷器
#[derive(Debug, Clone, Copy, Default)]
pub struct PaperAssembler;

impl PaperAssembler {
    pub fn new() -> Self {
        Self
    }

    /// 组一份试卷
    pub fn assemble(
        &self,
        bank: &QuestionBank,
        request: &SelectionRequest,
        strategy: &mut dyn SelectionStrategy,
    ) -> AppResult<Paper> {
        self.assemble_numbered(bank, request, strategy, 1)
    }

    /// 批量组卷
    ///
    /// 每份试卷内部不重复，不同试卷之间允许出现相同题目
    pub fn assemble_batch(
        &self,
        bank: &QuestionBank,
        request: &SelectionRequest,
        papers: usize,
        strategy: &mut dyn SelectionStrategy,
    ) -> AppResult<Vec<Paper>> {
        let mut result = Vec::with_capacity(papers);
        for number in 1..=papers {
            let paper = self.assemble_numbered(bank, request, strategy, number)?;
            info!(
                "✓ 试卷 {} 组卷完成: {} 道题, 共 {} 分",
                number,
                paper.question_count(),
                paper.total_marks()
            );
            result.push(paper);
        }
        Ok(result)
    }

    fn assemble_numbered(
        &self,
        bank: &QuestionBank,
        request: &SelectionRequest,
        strategy: &mut dyn SelectionStrategy,
        number: usize,
    ) -> AppResult<Paper> {
        request.validate_total()?;

        let demands = self.check_availability(bank, request)?;

        // 每个 (单元, 分值) 一次性挑够，再按请求顺序分发
        let mut picked: Vec<VecDeque<&Question>> = Vec::with_capacity(demands.len());
        for demand in &demands {
            let bucket = bank
                .unit(demand.unit)
                .map(|u| u.bucket(demand.marks))
                .unwrap_or(&[]);
            let indices = strategy.pick(bucket.len(), demand.requested);
            debug!(
                "{} 的 {} 分题目 ({}): 选中下标 {:?}",
                demand.unit,
                demand.marks,
                strategy.name(),
                indices
            );
            picked.push(indices.into_iter().map(|i| &bucket[i]).collect());
        }

        let mut sections: Vec<PaperSection> = Vec::new();
        for (unit, marks, count) in request.tuples() {
            let slot = demands
                .iter()
                .position(|d| d.unit == unit && d.marks == marks)
                .ok_or_else(|| AppError::UnknownUnit(unit.to_string()))?;

            let section_idx = match sections.iter().position(|s| s.unit == unit) {
                Some(idx) => idx,
                None => {
                    sections.push(PaperSection {
                        unit: unit.to_string(),
                        questions: Vec::new(),
                    });
                    sections.len() - 1
                }
            };

            for _ in 0..count {
                if let Some(question) = picked[slot].pop_front() {
                    sections[section_idx].questions.push(question.clone());
                }
            }
        }

        Ok(Paper { number, sections })
    }

    /// 按请求顺序检查单元和题目数量，返回累计需求
    fn check_availability<'a>(
        &self,
        bank: &QuestionBank,
        request: &'a SelectionRequest,
    ) -> AppResult<Vec<Demand<'a>>> {
        let mut demands: Vec<Demand<'a>> = Vec::new();

        for (unit, marks, count) in request.tuples() {
            let stored = bank
                .unit(unit)
                .ok_or_else(|| AppError::UnknownUnit(unit.to_string()))?;

            let requested = match demands
                .iter_mut()
                .find(|d| d.unit == unit && d.marks == marks)
            {
                Some(demand) => {
                    demand.requested = demand.requested.saturating_add(count);
                    demand.requested
                }
                None => {
                    demands.push(Demand {
                        unit,
                        marks,
                        requested: count,
                    });
                    count
                }
            };

            let available = stored.bucket(marks).len();
            if requested > available {
                return Err(AppError::InsufficientQuestions {
                    unit: unit.to_string(),
                    marks,
                    requested,
                    available,
                });
            }
        }

        Ok(demands)
    }
}
