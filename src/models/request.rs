use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// 某个分值要抽取的题目数量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkCount {
    pub marks: u32,
    pub count: usize,
}

/// 单个单元的组卷要求
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRequest {
    pub unit: String,
    #[serde(default)]
    pub questions: Vec<MarkCount>,
}

impl UnitRequest {
    pub fn new(unit: impl Into<String>) -> Self {
        Self {
            unit: unit.into(),
            questions: Vec::new(),
        }
    }

    pub fn with(mut self, marks: u32, count: usize) -> Self {
        self.questions.push(MarkCount { marks, count });
        self
    }

    /// 本单元要求的总分，溢出时返回 `None`
    pub fn marks_total(&self) -> Option<u64> {
        self.questions.iter().try_fold(0u64, |acc, q| {
            let count = u64::try_from(q.count).ok()?;
            acc.checked_add(u64::from(q.marks).checked_mul(count)?)
        })
    }
}

/// 组卷请求
///
/// ```toml
/// total_marks = 20
///
/// [[units]]
/// unit = "Unit 1"
/// questions = [{ marks = 4, count = 2 }, { marks = 6, count = 2 }]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRequest {
    /// 声明的试卷总分
    pub total_marks: u32,
    /// 按顺序排列的单元要求
    #[serde(default)]
    pub units: Vec<UnitRequest>,
}

impl SelectionRequest {
    pub fn new(total_marks: u32) -> Self {
        Self {
            total_marks,
            units: Vec::new(),
        }
    }

    pub fn unit(mut self, unit: UnitRequest) -> Self {
        self.units.push(unit);
        self
    }

    /// 按请求顺序展开为 (单元, 分值, 数量)
    pub fn tuples(&self) -> impl Iterator<Item = (&str, u32, usize)> {
        self.units.iter().flat_map(|u| {
            u.questions
                .iter()
                .map(move |q| (u.unit.as_str(), q.marks, q.count))
        })
    }

    /// 各题数量 × 分值之和，溢出时返回 `None`
    pub fn computed_total(&self) -> Option<u64> {
        self.units
            .iter()
            .try_fold(0u64, |acc, u| acc.checked_add(u.marks_total()?))
    }

    /// 纯算术校验：声明总分必须等于计算出的总分
    ///
    /// 合计超出 u32 范围（包括乘法溢出）时按 `u32::MAX` 报告
    pub fn validate_total(&self) -> AppResult<()> {
        let got = self
            .computed_total()
            .and_then(|total| u32::try_from(total).ok())
            .unwrap_or(u32::MAX);
        if self.computed_total() != Some(u64::from(self.total_marks)) {
            return Err(AppError::MarksMismatch {
                expected: self.total_marks,
                got,
            });
        }
        Ok(())
    }

    /// 结构校验：总分、单元名和分值都必须有意义
    pub fn validate_shape(&self) -> AppResult<()> {
        if self.total_marks == 0 || self.units.is_empty() {
            return Err(AppError::InvalidRequest("总分和单元要求不能为空".to_string()));
        }
        for unit in &self.units {
            if unit.unit.trim().is_empty() {
                return Err(AppError::InvalidRequest("单元名称不能为空".to_string()));
            }
            if let Some(q) = unit.questions.iter().find(|q| q.marks == 0) {
                return Err(AppError::InvalidRequest(format!(
                    "{} 中存在 0 分题目要求 (数量 {})",
                    unit.unit, q.count
                )));
            }
        }
        Ok(())
    }
}
