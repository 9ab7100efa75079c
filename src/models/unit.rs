use serde::Serialize;

/// 大纲中的一个单元
///
/// 由单元分段器从标题行识别得到，创建后不再修改
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Unit {
    /// 单元标识，例如 "Unit 1"
    pub id: String,
    /// 冒号后面的标题文字（可能没有）
    pub title: Option<String>,
    /// 完整的标题行（已去掉首尾空白）
    pub heading: String,
    /// 标题行在原文中的行号（从 0 开始）
    pub line: usize,
    /// 单元首次出现的顺序（从 0 开始）
    pub ordinal: usize,
}

impl std::fmt::Display for Unit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.title {
            Some(title) => write!(f, "{}: {}", self.id, title),
            None => write!(f, "{}", self.id),
        }
    }
}
