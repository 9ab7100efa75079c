//! PDF 文本提取 - 基础设施层
//!
//! `pdf-extract` 遇到格式异常的文件可能直接 panic，这里统一捕获并转成错误

use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use tracing::{debug, info};

use crate::error::{AppError, AppResult};

/// 读取 PDF 文件并提取全部文本
pub async fn extract_text(path: &Path) -> AppResult<String> {
    let bytes = tokio::fs::read(path).await?;
    let display_path = path.display().to_string();

    let text = tokio::task::spawn_blocking(move || extract_text_from_bytes(&bytes))
        .await
        .map_err(|e| AppError::PdfExtraction {
            path: display_path.clone(),
            reason: format!("提取任务异常退出: {}", e),
        })?
        .map_err(|reason| AppError::PdfExtraction {
            path: display_path.clone(),
            reason,
        })?;

    info!("📄 已读取 {} ({} 字符)", display_path, text.len());
    Ok(text)
}

/// 从内存中的 PDF 数据提取文本
pub fn extract_text_from_bytes(bytes: &[u8]) -> Result<String, String> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }));

    match result {
        Ok(Ok(text)) => {
            debug!("PDF 提取到 {} 行文本", text.lines().count());
            Ok(text)
        }
        Ok(Err(e)) => Err(format!("无法解析 PDF: {}", e)),
        Err(_) => Err("PDF 格式异常，解析过程中断".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_garbage_bytes_are_an_error_not_a_panic() {
        assert!(extract_text_from_bytes(b"definitely not a pdf").is_err());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let result = tokio_test::block_on(extract_text(Path::new("/nonexistent/syllabus.pdf")));
        assert!(matches!(result, Err(AppError::Io(_))));
    }
}
