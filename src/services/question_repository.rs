//! 题库仓储 - 业务能力层
//!
//! 组卷和出题流程只依赖这里的窄接口，具体存储可以替换

use std::sync::RwLock;

use tracing::debug;

use crate::error::{AppError, AppResult};
use crate::models::{Question, QuestionBank, StoredQuestion};

/// 题库仓储接口
///
/// 实现方必须保证 `replace_all` 要么整体成功、要么保持原有内容，
/// 并且读操作不会看到清空了一半的题库。
pub trait QuestionRepository: Send + Sync {
    /// 清空题库并写入新的一批题目，返回写入数量
    fn replace_all(&self, bank: &QuestionBank) -> AppResult<usize>;

    /// 按单元和分值分组读取全部题目（桶内保持插入顺序）
    fn group_by_unit_and_marks(&self) -> AppResult<QuestionBank>;

    /// 按插入顺序列出全部题目及其编号
    fn list_all(&self) -> AppResult<Vec<StoredQuestion>>;
}

/// 写入前的统一校验：题干不能为空，分值必须为正
pub fn validate_bank(bank: &QuestionBank) -> AppResult<()> {
    for question in bank.questions() {
        if question.marks == 0 || question.text.trim().is_empty() {
            return Err(AppError::InvalidRequest(format!(
                "{} 中存在无效题目 (分值 {}, 题干 {:?})",
                question.unit, question.marks, question.text
            )));
        }
    }
    Ok(())
}

/// 内存题库
#[derive(Default)]
pub struct InMemoryQuestionRepository {
    rows: RwLock<Vec<StoredQuestion>>,
}

impl InMemoryQuestionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl QuestionRepository for InMemoryQuestionRepository {
    fn replace_all(&self, bank: &QuestionBank) -> AppResult<usize> {
        validate_bank(bank)?;

        let new_rows: Vec<StoredQuestion> = bank
            .questions()
            .cloned()
            .enumerate()
            .map(|(i, question)| StoredQuestion {
                id: i as i64 + 1,
                question,
            })
            .collect();
        let count = new_rows.len();

        let mut rows = self
            .rows
            .write()
            .map_err(|e| AppError::storage("replace_all", PoisonedLock(e.to_string())))?;
        *rows = new_rows;

        debug!("内存题库已替换为 {} 道题目", count);
        Ok(count)
    }

    fn group_by_unit_and_marks(&self) -> AppResult<QuestionBank> {
        let rows = self
            .rows
            .read()
            .map_err(|e| AppError::storage("group_by_unit_and_marks", PoisonedLock(e.to_string())))?;
        Ok(rows.iter().map(|r| r.question.clone()).collect::<QuestionBank>())
    }

    fn list_all(&self) -> AppResult<Vec<StoredQuestion>> {
        let rows = self
            .rows
            .read()
            .map_err(|e| AppError::storage("list_all", PoisonedLock(e.to_string())))?;
        Ok(rows.clone())
    }
}

/// 锁被毒化时的错误
#[derive(Debug, thiserror::Error)]
#[error("锁已失效: {0}")]
pub struct PoisonedLock(pub String);

/// 把题目按顺序收集成题库
pub fn bank_of(questions: impl IntoIterator<Item = Question>) -> QuestionBank {
    questions.into_iter().collect()
}
