/// 布鲁姆认知层级（题目中的 `[BT:Y]` 标记）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BloomLevel {
    /// 记忆
    Remember = 1,
    /// 理解
    Understand = 2,
    /// 应用
    Apply = 3,
    /// 分析
    Analyze = 4,
    /// 评价
    Evaluate = 5,
    /// 创造
    Create = 6,
}

impl BloomLevel {
    /// 获取层级数字
    pub fn level(self) -> u8 {
        self as u8
    }

    /// 获取标准名称
    pub fn name(self) -> &'static str {
        match self {
            BloomLevel::Remember => "Remember",
            BloomLevel::Understand => "Understand",
            BloomLevel::Apply => "Apply",
            BloomLevel::Analyze => "Analyze",
            BloomLevel::Evaluate => "Evaluate",
            BloomLevel::Create => "Create",
        }
    }

    /// 从层级数字解析
    pub fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(BloomLevel::Remember),
            2 => Some(BloomLevel::Understand),
            3 => Some(BloomLevel::Apply),
            4 => Some(BloomLevel::Analyze),
            5 => Some(BloomLevel::Evaluate),
            6 => Some(BloomLevel::Create),
            _ => None,
        }
    }
}

impl std::fmt::Display for BloomLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "BT{} {}", self.level(), self.name())
    }
}
