//! LLM 输出解析服务 - 业务能力层
//!
//! 只负责"把 LLM 的自由文本解析为题目"，不关心题目从哪来、存到哪去
//!
//! ## 识别的行格式
//! - `Unit X:`：切换当前单元
//! - `<n>. <题干> (<k> marks)`
//! - `<题干> [CO:X] [BT:Y] (<k> marks)`（题号可选）
//!
//! 其他行一律跳过，不会导致整批失败

use regex::Regex;
use tracing::debug;

use crate::models::{BloomLevel, Question, QuestionBank, Unit};
use crate::services::unit_segmenter::UnitSegmenter;

/// 单行解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedLine {
    /// 单元标题，切换后续题目的归属单元
    UnitHeading(String),
    /// 识别出的题目
    Recognized(Question),
    /// 无法识别的行（原样保留，便于日志排查）
    Unrecognized(String),
}

/// 整段文本的解析结果
#[derive(Debug, Clone, Default)]
pub struct ParseOutcome {
    pub bank: QuestionBank,
    pub unrecognized: Vec<String>,
}

impl ParseOutcome {
    pub fn recognized(&self) -> usize {
        self.bank.len()
    }
}

/// LLM 输出解析器
pub struct ResponseParser {
    segmenter: UnitSegmenter,
    unit_number: Regex,
    question: Regex,
    course_outcome: Regex,
    bloom_level: Regex,
    known_units: Vec<Unit>,
}

impl ResponseParser {
    /// 创建不依赖大纲单元的解析器
    pub fn new() -> Self {
        Self {
            segmenter: UnitSegmenter::new(),
            unit_number: Regex::new(r"(?i)^unit\s+(\d+)").expect("unit number pattern"),
            question: Regex::new(r"(?i)^(?:(\d+)\s*[.)]\s*)?(.+?)\s*\(\s*(\d+)\s*marks?\s*\)\s*\.?$")
                .expect("question line pattern"),
            course_outcome: Regex::new(r"(?i)\[\s*CO\s*:\s*(\d+)\s*\]").expect("CO tag pattern"),
            bloom_level: Regex::new(r"(?i)\[\s*BT\s*:\s*(\d+)\s*\]").expect("BT tag pattern"),
            known_units: Vec::new(),
        }
    }

    /// 用大纲中的单元校正 LLM 输出里的单元名
    ///
    /// 例如 LLM 写了 `Unit 2 - Trees:`，会被归到大纲里的 `Unit 2`
    pub fn with_units(mut self, units: &[Unit]) -> Self {
        self.known_units = units.to_vec();
        self
    }

    /// 解析整段 LLM 输出
    pub fn parse(&self, text: &str) -> ParseOutcome {
        let mut outcome = ParseOutcome::default();
        let mut current_unit: Option<String> = None;

        for raw in text.lines() {
            if raw.trim().is_empty() {
                continue;
            }
            match self.parse_line(raw, current_unit.as_deref()) {
                ParsedLine::UnitHeading(unit) => {
                    debug!("切换到单元: {}", unit);
                    current_unit = Some(unit);
                }
                ParsedLine::Recognized(question) => {
                    outcome.bank.insert(question);
                }
                ParsedLine::Unrecognized(line) => {
                    debug!("跳过无法识别的行: {}", line);
                    outcome.unrecognized.push(line);
                }
            }
        }

        outcome
    }

    /// 解析单行
    ///
    /// `current_unit` 为之前最近一次出现的单元标题
    pub fn parse_line(&self, raw: &str, current_unit: Option<&str>) -> ParsedLine {
        let line = clean_line(raw);

        if let Some(caps) = self.question.captures(&line) {
            if let Some(question) = self.build_question(&caps, current_unit) {
                return ParsedLine::Recognized(question);
            }
        }

        if self.segmenter.is_heading(&line) {
            let id = line.split(':').next().unwrap_or(&line).trim();
            return ParsedLine::UnitHeading(self.canonical_unit(id));
        }

        ParsedLine::Unrecognized(raw.trim().to_string())
    }

    fn build_question(&self, caps: &regex::Captures<'_>, current_unit: Option<&str>) -> Option<Question> {
        let numbered = caps.get(1).is_some();
        let body = caps.get(2)?.as_str();
        let marks: u32 = caps.get(3)?.as_str().parse().ok()?;
        if marks == 0 {
            return None;
        }

        let course_outcome = self
            .course_outcome
            .captures(body)
            .and_then(|c| c[1].parse::<u32>().ok());
        let bloom_level = self
            .bloom_level
            .captures(body)
            .and_then(|c| c[1].parse::<u8>().ok())
            .and_then(BloomLevel::from_level);
        let tagged = self.course_outcome.is_match(body) || self.bloom_level.is_match(body);

        // 两种格式都要求有题号或标记，否则视为普通说明文字
        if !numbered && !tagged {
            return None;
        }

        let without_co = self.course_outcome.replace_all(body, "");
        let text = self.bloom_level.replace_all(&without_co, "");
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        let text = text.trim_end_matches(['-', ':', '.']).trim().to_string();
        if text.is_empty() {
            return None;
        }

        let unit = match current_unit {
            Some(unit) => unit.to_string(),
            None => self.canonical_unit(&format!("Unit {}", course_outcome?)),
        };

        Some(Question::new(unit, text, marks).with_tags(course_outcome, bloom_level))
    }

    /// 把单元名映射为大纲中的单元标识（按单元编号匹配）
    fn canonical_unit(&self, id: &str) -> String {
        if self.known_units.iter().any(|u| u.id == id) {
            return id.to_string();
        }
        let number = self.unit_number(id);
        number
            .and_then(|n| {
                self.known_units
                    .iter()
                    .find(|u| self.unit_number(&u.id) == Some(n))
            })
            .map(|u| u.id.clone())
            .unwrap_or_else(|| id.to_string())
    }

    fn unit_number(&self, id: &str) -> Option<u32> {
        self.unit_number
            .captures(id)
            .and_then(|c| c[1].parse().ok())
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// 去掉 Markdown 强调符号和列表前缀
fn clean_line(raw: &str) -> String {
    let line = raw.trim().replace("**", "").replace("__", "");
    let line = line.trim();
    let line = line
        .strip_prefix("- ")
        .or_else(|| line.strip_prefix("* "))
        .or_else(|| line.strip_prefix("• "))
        .or_else(|| line.strip_prefix('#').map(|l| l.trim_start_matches('#')))
        .unwrap_or(line);
    line.trim().to_string()
}
