use serde::Serialize;

use crate::models::Question;

/// 试卷中一个单元的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaperSection {
    pub unit: String,
    pub questions: Vec<Question>,
}

impl PaperSection {
    pub fn marks_total(&self) -> u32 {
        self.questions.iter().map(|q| q.marks).sum()
    }
}

/// 组好的一份试卷
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Paper {
    /// 批量组卷中的编号（从 1 开始）
    pub number: usize,
    pub sections: Vec<PaperSection>,
}

impl Paper {
    pub fn total_marks(&self) -> u32 {
        self.sections.iter().map(PaperSection::marks_total).sum()
    }

    pub fn question_count(&self) -> usize {
        self.sections.iter().map(|s| s.questions.len()).sum()
    }

    pub fn section(&self, unit: &str) -> Option<&PaperSection> {
        self.sections.iter().find(|s| s.unit == unit)
    }

    /// 按顺序遍历 (题号, 单元, 题目)，题号从 1 开始
    pub fn numbered(&self) -> impl Iterator<Item = (usize, &str, &Question)> {
        self.sections
            .iter()
            .flat_map(|s| s.questions.iter().map(move |q| (s.unit.as_str(), q)))
            .enumerate()
            .map(|(i, (unit, q))| (i + 1, unit, q))
    }

    /// 文件名，例如 `question_paper_1.pdf`
    pub fn file_name(&self) -> String {
        format!("question_paper_{}.pdf", self.number)
    }
}
