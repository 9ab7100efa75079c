//! 本地 Ollama 客户端
//!
//! 调用 `POST {base}/api/generate`，关闭流式输出，读取 `response` 字段

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::services::llm_service::TextGenerator;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

/// Ollama 客户端
pub struct OllamaClient {
    http: reqwest::Client,
    endpoint: String,
    model_name: String,
    provider: String,
}

impl OllamaClient {
    pub fn new(config: &Config) -> Self {
        let base = config.ollama_base_url.trim_end_matches('/');
        Self {
            http: reqwest::Client::new(),
            endpoint: format!("{}/api/generate", base),
            model_name: config.llm_model_name.clone(),
            provider: format!("ollama/{}", config.llm_model_name),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl TextGenerator for OllamaClient {
    fn provider(&self) -> &str {
        &self.provider
    }

    async fn generate(&self, system_message: &str, user_message: &str) -> AppResult<String> {
        debug!("调用 Ollama: {} (模型 {})", self.endpoint, self.model_name);

        let body = GenerateRequest {
            model: &self.model_name,
            prompt: user_message,
            system: system_message,
            stream: false,
        };

        let response = self
            .http
            .post(&self.endpoint)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                warn!("Ollama 请求失败: {}", e);
                AppError::upstream(self.provider.clone(), e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AppError::upstream(
                self.provider.clone(),
                format!("HTTP {}: {}", status, detail.trim()),
            ));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| AppError::upstream(self.provider.clone(), format!("响应解析失败: {}", e)))?;

        let text = parsed.response.trim();
        if text.is_empty() {
            return Err(AppError::upstream(self.provider.clone(), "返回内容为空"));
        }
        Ok(text.to_string())
    }
}
