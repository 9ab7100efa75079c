//! 出题提示词构建

use crate::models::Unit;
use crate::services::template_analyzer::TemplateInfo;

/// 出题提示词构建器
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    four_mark_per_unit: usize,
    six_mark_per_unit: usize,
}

/// 一次出题请求的输入材料
#[derive(Debug, Clone, Default)]
pub struct PromptInput<'a> {
    pub units: &'a [Unit],
    pub syllabus_text: &'a str,
    pub template: Option<&'a TemplateInfo>,
    pub reference_text: Option<&'a str>,
    /// 用户补充的要求
    pub base_prompt: Option<&'a str>,
}

impl PromptBuilder {
    pub fn new(four_mark_per_unit: usize, six_mark_per_unit: usize) -> Self {
        Self {
            four_mark_per_unit,
            six_mark_per_unit,
        }
    }

    /// 系统消息：严格规定输出格式，保证解析器能识别
    pub fn system_prompt(&self) -> String {
        let four = self.four_mark_per_unit;
        let six = self.six_mark_per_unit;
        let total = four + six;

        let mut example = String::new();
        for i in 1..=total {
            let marks = if i <= four { 4 } else { 6 };
            example.push_str(&format!("{}. Question text [CO:X] [BT:Y] ({} marks).\n", i, marks));
        }

        format!(
            "As an AI assistant, your task is to generate exam questions from the provided text. \
For each unit listed in the 'Units' section below, you must generate exactly {total} questions: \
{four} four-mark questions and {six} six-mark questions. \
Do not generate more or fewer questions for any unit. \
Each question should be relevant to the corresponding unit and cover key concepts. \
Use the following strict format for each unit and question:\n\n\
Unit X:\n{example}\n\
Important Guidelines:\n\
- CO Number Must Match Unit Number: questions in Unit 1 must have [CO:1].\n\
- Single CO Number: only a single CO number is allowed.\n\
- Bloom's Taxonomy (BT): [BT:Y] must be a level between 1 and 6, appropriate for the question.\n\
- Exact Format: use square brackets '[ ]' and colons ':' exactly as shown.\n\
- No Additional Text: do not add introductions, notes, explanations or conclusions.\n\
- Use Provided Units: use the unit names exactly as listed in the 'Units' section.\n\
- Do Not Omit Anything: do not omit any units or questions."
        )
    }

    /// 用户消息：单元列表 + 模板结构 + 大纲 + 参考资料
    pub fn user_prompt(&self, input: &PromptInput<'_>) -> String {
        let mut prompt = String::new();

        if let Some(base) = input.base_prompt.map(str::trim).filter(|b| !b.is_empty()) {
            prompt.push_str(&format!("Base prompt: {}\n\n", base));
        }

        prompt.push_str("Units:\n");
        for unit in input.units {
            prompt.push_str(&format!("{}\n", unit));
        }

        if let Some(template) = input.template {
            prompt.push_str("\nTemplate Structure:\n");
            prompt.push_str(&template.to_prompt_block());
        }

        prompt.push_str("\nSyllabus:\n");
        prompt.push_str(input.syllabus_text.trim());
        prompt.push('\n');

        if let Some(reference) = input.reference_text.map(str::trim).filter(|r| !r.is_empty()) {
            prompt.push_str("\nReference Materials:\n");
            prompt.push_str(reference);
            prompt.push('\n');
        }

        prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::unit_segmenter::UnitSegmenter;

    #[test]
    fn test_system_prompt_lists_expected_counts() {
        let prompt = PromptBuilder::new(2, 1).system_prompt();
        assert!(prompt.contains("exactly 3 questions: 2 four-mark questions and 1 six-mark questions"));
        assert!(prompt.contains("1. Question text [CO:X] [BT:Y] (4 marks)."));
        assert!(prompt.contains("3. Question text [CO:X] [BT:Y] (6 marks)."));
        assert!(!prompt.contains("4. Question text"));
    }

    #[test]
    fn test_user_prompt_sections() {
        let syllabus = "Unit 1: Intro\nsets\nUnit 2: Advanced\ngraphs";
        let units = UnitSegmenter::new().segment(syllabus);
        let builder = PromptBuilder::new(3, 3);

        let prompt = builder.user_prompt(&PromptInput {
            units: &units,
            syllabus_text: syllabus,
            reference_text: Some("  "),
            base_prompt: Some("Focus on proofs"),
            ..Default::default()
        });

        assert!(prompt.starts_with("Base prompt: Focus on proofs\n\nUnits:\nUnit 1: Intro\nUnit 2: Advanced\n"));
        assert!(prompt.contains("\nSyllabus:\nUnit 1: Intro"));
        assert!(!prompt.contains("Reference Materials"));
        assert!(!prompt.contains("Template Structure"));
    }
}
