use crate::error::AppError;
use crate::models::request::SelectionRequest;
use anyhow::{Context, Result};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文本解析组卷请求
pub fn parse_selection_request(content: &str) -> Result<SelectionRequest> {
    let request: SelectionRequest = toml::from_str(content)
        .map_err(|e| AppError::InvalidRequest(format!("无法解析组卷请求: {}", e)))?;
    Ok(request)
}

/// 从 TOML 文件加载组卷请求
pub async fn load_selection_request(toml_file_path: &Path) -> Result<SelectionRequest> {
    let content = fs::read_to_string(toml_file_path)
        .await
        .with_context(|| format!("无法读取TOML文件: {}", toml_file_path.display()))?;

    let request = parse_selection_request(&content)
        .with_context(|| format!("无法解析TOML文件: {}", toml_file_path.display()))?;

    tracing::info!(
        "成功加载组卷请求: {} 个单元, 总分 {}",
        request.units.len(),
        request.total_marks
    );

    Ok(request)
}
