//! 单元分段服务 - 业务能力层
//!
//! 只负责"把大纲文本切成有序的单元"，不关心出题流程

use regex::Regex;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::models::Unit;

/// 单元分段器
///
/// 职责：
/// - 逐行扫描大纲文本，识别 `Unit <数字>` 开头的标题行（不区分大小写）
/// - 单元标识取第一个冒号之前的部分
/// - 找不到标题时返回空列表，由调用方决定是否报错
pub struct UnitSegmenter {
    heading: Regex,
}

impl UnitSegmenter {
    /// 创建新的单元分段器
    pub fn new() -> Self {
        Self {
            heading: Regex::new(r"(?i)^unit\s+\d+").expect("unit heading pattern"),
        }
    }

    /// 判断一行（已去掉首尾空白）是否是单元标题
    pub fn is_heading(&self, line: &str) -> bool {
        self.heading.is_match(line)
    }

    /// 把大纲文本切分为有序的单元列表
    ///
    /// 重复的单元标识不会产生新条目：保留首次出现的顺序，
    /// 标题和行号被后一次出现覆盖。
    pub fn segment(&self, text: &str) -> Vec<Unit> {
        let mut units: Vec<Unit> = Vec::new();

        for (line_no, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if !self.is_heading(line) {
                continue;
            }

            let (id, title) = split_heading(line);

            if let Some(existing) = units.iter_mut().find(|u| u.id == id) {
                warn!(
                    "⚠️ 单元 {} 重复出现 (第 {} 行 和 第 {} 行)，以后者为准",
                    id,
                    existing.line + 1,
                    line_no + 1
                );
                existing.title = title;
                existing.heading = line.to_string();
                existing.line = line_no;
                continue;
            }

            debug!("识别到单元标题 (第 {} 行): {}", line_no + 1, line);
            let ordinal = units.len();
            units.push(Unit {
                id,
                title,
                heading: line.to_string(),
                line: line_no,
                ordinal,
            });
        }

        units
    }

    /// 切分大纲，没有任何单元时返回 `NoUnitsFound`
    pub fn require_units(&self, text: &str) -> AppResult<Vec<Unit>> {
        let units = self.segment(text);
        if units.is_empty() {
            return Err(AppError::NoUnitsFound);
        }
        Ok(units)
    }

    /// 每个单元标题之后、下一个单元标题之前的正文
    ///
    /// 区间按标题行号计算，结果按行号排序
    pub fn sections<'a>(&self, text: &str, units: &'a [Unit]) -> Vec<(&'a Unit, String)> {
        let lines: Vec<&str> = text.lines().collect();
        let mut ordered: Vec<&Unit> = units.iter().collect();
        ordered.sort_by_key(|u| u.line);

        ordered
            .iter()
            .enumerate()
            .map(|(i, unit)| {
                let start = (unit.line + 1).min(lines.len());
                let end = ordered
                    .get(i + 1)
                    .map(|next| next.line)
                    .unwrap_or(lines.len())
                    .max(start);
                let body = lines[start..end]
                    .iter()
                    .map(|l| l.trim())
                    .filter(|l| !l.is_empty())
                    .collect::<Vec<_>>()
                    .join("\n");
                (*unit, body)
            })
            .collect()
    }
}

impl Default for UnitSegmenter {
    fn default() -> Self {
        Self::new()
    }
}

/// 拆分标题行为 (单元标识, 冒号后的标题)
fn split_heading(line: &str) -> (String, Option<String>) {
    match line.split_once(':') {
        Some((id, title)) => {
            let title = title.trim();
            (
                id.trim().to_string(),
                (!title.is_empty()).then(|| title.to_string()),
            )
        }
        None => (line.trim().to_string(), None),
    }
}
