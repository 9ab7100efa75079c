use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::BloomLevel;

/// 一道生成的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// 所属单元标识
    pub unit: String,
    /// 题干（不含分值后缀和 CO/BT 标记）
    pub text: String,
    /// 分值
    pub marks: u32,
    /// 课程目标编号 `[CO:X]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub course_outcome: Option<u32>,
    /// 认知层级 `[BT:Y]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bloom_level: Option<BloomLevel>,
}

impl Question {
    pub fn new(unit: impl Into<String>, text: impl Into<String>, marks: u32) -> Self {
        Self {
            unit: unit.into(),
            text: text.into(),
            marks,
            course_outcome: None,
            bloom_level: None,
        }
    }

    pub fn with_tags(mut self, course_outcome: Option<u32>, bloom_level: Option<BloomLevel>) -> Self {
        self.course_outcome = course_outcome;
        self.bloom_level = bloom_level;
        self
    }

    /// 试卷中显示的题干，带上 CO/BT 标记
    pub fn display_text(&self) -> String {
        let mut text = self.text.clone();
        if let Some(co) = self.course_outcome {
            text.push_str(&format!(" [CO:{}]", co));
        }
        if let Some(bt) = self.bloom_level {
            text.push_str(&format!(" [BT:{}]", bt.level()));
        }
        text
    }
}

/// 数据库中带行号的题目（用于查看题库）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredQuestion {
    pub id: i64,
    #[serde(flatten)]
    pub question: Question,
}

/// 同一分值的题目桶
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkBucket {
    /// 分值的字符串形式，作为桶的键
    pub key: String,
    pub marks: u32,
    pub questions: Vec<Question>,
}

/// 一个单元下按分值分组的题目
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitQuestions {
    pub unit: String,
    buckets: Vec<MarkBucket>,
}

impl UnitQuestions {
    fn new(unit: String) -> Self {
        Self {
            unit,
            buckets: Vec::new(),
        }
    }

    /// 取某个分值的题目，没有该分值时返回空切片
    pub fn bucket(&self, marks: u32) -> &[Question] {
        self.bucket_by_key(&marks.to_string())
            .map(|b| b.questions.as_slice())
            .unwrap_or(&[])
    }

    /// 按字符串键取题目桶
    pub fn bucket_by_key(&self, key: &str) -> Option<&MarkBucket> {
        self.buckets.iter().find(|b| b.key == key)
    }

    pub fn buckets(&self) -> &[MarkBucket] {
        &self.buckets
    }

    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.questions.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn push(&mut self, question: Question) {
        match self.buckets.iter_mut().find(|b| b.marks == question.marks) {
            Some(bucket) => bucket.questions.push(question),
            None => self.buckets.push(MarkBucket {
                key: question.marks.to_string(),
                marks: question.marks,
                questions: vec![question],
            }),
        }
    }
}

/// 题库快照：单元 → 分值 → 题目列表
///
/// 单元和分值桶都保持首次插入的顺序，桶内保持插入顺序
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QuestionBank {
    units: Vec<UnitQuestions>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl QuestionBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// 按题目自身的单元和分值归档
    pub fn insert(&mut self, question: Question) {
        let idx = match self.index.get(&question.unit) {
            Some(&idx) => idx,
            None => {
                self.units.push(UnitQuestions::new(question.unit.clone()));
                let idx = self.units.len() - 1;
                self.index.insert(question.unit.clone(), idx);
                idx
            }
        };
        self.units[idx].push(question);
    }

    pub fn unit(&self, unit: &str) -> Option<&UnitQuestions> {
        self.index.get(unit).map(|&idx| &self.units[idx])
    }

    pub fn units(&self) -> &[UnitQuestions] {
        &self.units
    }

    /// 按单元、分值、插入顺序遍历所有题目
    pub fn questions(&self) -> impl Iterator<Item = &Question> {
        self.units
            .iter()
            .flat_map(|u| u.buckets.iter())
            .flat_map(|b| b.questions.iter())
    }

    pub fn len(&self) -> usize {
        self.units.iter().map(UnitQuestions::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<Question> for QuestionBank {
    fn from_iter<I: IntoIterator<Item = Question>>(iter: I) -> Self {
        let mut bank = QuestionBank::new();
        for question in iter {
            bank.insert(question);
        }
        bank
    }
}
