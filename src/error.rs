use thiserror::Error;

/// 应用程序错误类型
///
/// 所有错误都以面向用户的消息呈现，核心逻辑不做任何自动重试
#[derive(Debug, Error)]
pub enum AppError {
    /// 大纲文本中没有识别到任何单元标题
    #[error("大纲中没有找到任何单元 (需要形如 \"Unit 1: ...\" 的标题行)")]
    NoUnitsFound,

    /// 请求声明的总分与各题目分值之和不一致
    #[error("总分不匹配: 声明 {expected} 分, 实际合计 {got} 分")]
    MarksMismatch { expected: u32, got: u32 },

    /// 请求中引用了题库中不存在的单元
    #[error("题库中不存在单元: {0}")]
    UnknownUnit(String),

    /// 某个单元某个分值的题目数量不足
    #[error("{unit} 的 {marks} 分题目不足: 需要 {requested} 道, 题库中只有 {available} 道")]
    InsufficientQuestions {
        unit: String,
        marks: u32,
        requested: usize,
        available: usize,
    },

    /// LLM 调用失败或返回内容无法解析
    #[error("题目生成失败 ({provider}): {reason}")]
    UpstreamGenerationFailure { provider: String, reason: String },

    /// 题库存储操作失败
    #[error("题库存储失败 ({operation}): {source}")]
    StorageFailure {
        operation: &'static str,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// PDF 文本提取失败
    #[error("PDF文本提取失败 ({path}): {reason}")]
    PdfExtraction { path: String, reason: String },

    /// PDF 渲染失败
    #[error("PDF生成失败: {0}")]
    PdfRender(String),

    /// 组卷请求本身不合法
    #[error("组卷请求无效: {0}")]
    InvalidRequest(String),

    #[error("文件读写失败: {0}")]
    Io(#[from] std::io::Error),
}

// ========== 便捷构造函数 ==========

impl AppError {
    /// 创建存储失败错误
    pub fn storage(
        operation: &'static str,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        AppError::StorageFailure {
            operation,
            source: Box::new(source),
        }
    }

    /// 创建上游生成失败错误
    pub fn upstream(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        AppError::UpstreamGenerationFailure {
            provider: provider.into(),
            reason: reason.into(),
        }
    }

    /// 是否属于调用方可以修正的请求错误（而不是内部错误）
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            AppError::NoUnitsFound
                | AppError::MarksMismatch { .. }
                | AppError::UnknownUnit(_)
                | AppError::InsufficientQuestions { .. }
                | AppError::InvalidRequest(_)
        )
    }
}

// ========== Result 类型别名 ==========

/// 应用程序结果类型
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_message_names_unit_and_marks() {
        let err = AppError::InsufficientQuestions {
            unit: "Unit 1".to_string(),
            marks: 6,
            requested: 2,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("Unit 1"));
        assert!(msg.contains("6 分"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_storage_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = AppError::storage("replace_all", io);
        assert!(!err.is_user_error());
        assert!(std::error::Error::source(&err).is_some());
    }
}
