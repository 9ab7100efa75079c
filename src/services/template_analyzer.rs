//! 模板分析服务 - 业务能力层
//!
//! 从往年试卷（模板）文本中提取题目样式和分部结构，供出题提示词参考

use regex::Regex;
use serde::Serialize;

/// 模板中识别到的一道题目样式
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionPattern {
    /// 原文片段，例如 `1. Explain ... (4 marks)`
    pub format: String,
    pub marks: u32,
}

/// 模板结构信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TemplateInfo {
    /// 依次出现的分部标记，例如 `SECTION-A`、`PART B`
    pub structure: Vec<String>,
    pub question_patterns: Vec<QuestionPattern>,
    pub has_sections: bool,
}

impl TemplateInfo {
    /// 模板中出现过的分值（去重，按出现顺序）
    pub fn mark_values(&self) -> Vec<u32> {
        let mut marks = Vec::new();
        for pattern in &self.question_patterns {
            if !marks.contains(&pattern.marks) {
                marks.push(pattern.marks);
            }
        }
        marks
    }

    /// 渲染为提示词中的 "Template Structure" 段落
    pub fn to_prompt_block(&self) -> String {
        let mut block = String::new();
        if self.has_sections {
            block.push_str(&format!("Sections: {}\n", self.structure.join(", ")));
        } else {
            block.push_str("Sections: none\n");
        }
        let marks = self.mark_values();
        if !marks.is_empty() {
            let marks: Vec<String> = marks.iter().map(|m| m.to_string()).collect();
            block.push_str(&format!("Mark values used: {}\n", marks.join(", ")));
        }
        if !self.question_patterns.is_empty() {
            block.push_str("Example questions:\n");
            for pattern in self.question_patterns.iter().take(5) {
                block.push_str(&format!("- {}\n", pattern.format));
            }
        }
        block
    }
}

/// 模板分析器
pub struct TemplateAnalyzer {
    question: Regex,
    section: Regex,
}

impl TemplateAnalyzer {
    pub fn new() -> Self {
        Self {
            question: Regex::new(r"(?i)\d+\.\s*(.*?)\s*\((\d+)\s*marks?\)").expect("template question pattern"),
            section: Regex::new(r"(SECTION[- ][A-Z]|PART[- ][A-Z])\b").expect("template section pattern"),
        }
    }

    pub fn analyze(&self, text: &str) -> TemplateInfo {
        let question_patterns: Vec<QuestionPattern> = self
            .question
            .captures_iter(text)
            .filter_map(|caps| {
                let marks = caps[2].parse().ok()?;
                Some(QuestionPattern {
                    format: caps[0].trim().to_string(),
                    marks,
                })
            })
            .collect();

        let structure: Vec<String> = self
            .section
            .captures_iter(text)
            .map(|caps| caps[1].to_string())
            .collect();

        TemplateInfo {
            has_sections: !structure.is_empty(),
            structure,
            question_patterns,
        }
    }
}

impl Default for TemplateAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analyze_sections_and_patterns() {
        let text = "SECTION-A\n1. Define a stack (4 marks)\n2. Explain queues (4 marks)\nPART B\n3. Design a heap (6 marks)";
        let info = TemplateAnalyzer::new().analyze(text);

        assert!(info.has_sections);
        assert_eq!(info.structure, vec!["SECTION-A", "PART B"]);
        assert_eq!(info.question_patterns.len(), 3);
        assert_eq!(info.question_patterns[0].format, "1. Define a stack (4 marks)");
        assert_eq!(info.mark_values(), vec![4, 6]);

        let block = info.to_prompt_block();
        assert!(block.contains("Sections: SECTION-A, PART B"));
        assert!(block.contains("Mark values used: 4, 6"));
    }

    #[test]
    fn test_analyze_plain_text() {
        let info = TemplateAnalyzer::new().analyze("Answer all questions.");
        assert_eq!(info, TemplateInfo::default());
        assert_eq!(info.to_prompt_block(), "Sections: none\n");
    }
}
